#[tokio::main]
async fn main() -> anyhow::Result<()> {
    modlock_lib::main().await
}
