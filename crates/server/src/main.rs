#[tokio::main]
async fn main() -> anyhow::Result<()> {
    streamify_server::run().await
}
