use anyhow::{Context, Result};
use upload_notifier::{app, client};

/// Poll the queue once and publish a notification about the received
/// uploads, outside of AWS Lambda.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .without_time()
        .init();
    app::init_with_queue()?;
    client::init(&app::current().settings).await?;

    let status = app::current()
        .poll_and_relay(client::queue(), client::topic())
        .await
        .context("Failed to relay queued uploads")?;
    println!("{}", status);
    Ok(())
}
