use anyhow::{anyhow, Result};
use lambda_runtime::{run, service_fn, LambdaEvent};
use serde_json::Value;
use upload_notifier::{app, client};

/// Poll the queue and publish a notification about the received
/// uploads. The input payload is ignored.
async fn function_handler(_event: LambdaEvent<Value>) -> Result<String> {
    Ok(app::current()
        .poll_and_relay(client::queue(), client::topic())
        .await?)
}

/// Run an AWS Lambda function, invoked on demand or on a schedule,
/// that drains a batch of S3 upload events from an SQS queue and
/// publishes a notification about the uploaded objects to an SNS
/// topic.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .without_time()
        .init();
    app::init_with_queue()?;
    client::init(&app::current().settings).await?;

    run(service_fn(function_handler))
        .await
        .map_err(|e| anyhow!("{:?}", e))
}
