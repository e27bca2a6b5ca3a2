use anyhow::{anyhow, Context, Result};
use aws_lambda_events::event::sqs::SqsEvent;
use lambda_runtime::{run, service_fn, LambdaEvent};
use upload_notifier::{app, client};

/// Publish a notification about the uploads carried by the delivery.
async fn function_handler(event: LambdaEvent<SqsEvent>) -> Result<String> {
    app::current()
        .relay_delivery(&event.payload, client::topic())
        .await
        .with_context(|| format!("Failed to relay delivery {:?}", event.context.request_id))
}

/// Run an AWS Lambda function triggered by an SQS queue, whose
/// messages carry S3 upload events, that publishes a notification
/// about the uploaded objects to an SNS topic.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .without_time()
        .init();
    app::init()?;
    client::init(&app::current().settings).await?;

    run(service_fn(function_handler))
        .await
        .map_err(|e| anyhow!("{:?}", e))
}
