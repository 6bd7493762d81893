use crate::core::error::{Error, Result};
use axum::{extract::FromRequestParts, http::request::Parts};

/// Authenticated caller, inserted by the auth middleware.
///
/// Handlers taking a `Ctx` must sit behind `mw_require_auth`; a missing
/// extension is reported as an internal error.
#[derive(Clone, Debug)]
pub struct Ctx {
    user_id: String,
}

impl Ctx {
    pub fn new(user_id: String) -> Self {
        Self { user_id }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

impl<S> FromRequestParts<S> for Ctx
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts
            .extensions
            .get::<Ctx>()
            .cloned()
            .ok_or_else(|| Error::Internal("Ctx not in request extensions".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[tokio::test]
    async fn test_reads_ctx_from_extensions() {
        let mut request = Request::new(());
        request.extensions_mut().insert(Ctx::new("u1".to_string()));
        let (mut parts, _) = request.into_parts();

        let ctx = Ctx::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(ctx.user_id(), "u1");
    }

    #[tokio::test]
    async fn test_missing_ctx_is_internal() {
        // A handler behind no auth layer is a routing bug, not a client error.
        let (mut parts, _) = Request::new(()).into_parts();

        let err = Ctx::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert!(matches!(err, Error::Internal(_)));
    }
}
