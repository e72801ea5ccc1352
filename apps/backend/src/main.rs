#[tokio::main]
async fn main() -> anyhow::Result<()> {
    deck_backend::run().await
}
