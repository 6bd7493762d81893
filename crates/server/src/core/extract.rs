//! Request extractors
//!
//! `ApiJson` wraps axum's `Json` so body rejections (bad syntax, wrong
//! content type, mismatched fields) go out as an `invalid_input` error
//! envelope like every other failure.

use crate::core::error::{Error, Result};
use axum::extract::{rejection::JsonRejection, FromRequest, Request};
use axum::Json;

pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}
