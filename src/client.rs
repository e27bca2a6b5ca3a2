//! Defines the queue and topic the relay talks to, and the global AWS
//! clients backing them.

use crate::conf::Settings;
use crate::error::RelayError;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use aws_config::{from_env, SdkConfig};
use aws_sdk_sns::config::Region;
use aws_sdk_sqs::types::DeleteMessageBatchRequestEntry;
use once_cell::sync::OnceCell;

/// A message fetched from the queue, pending deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMessage {
    pub id: String,
    pub receipt_handle: String,
    pub body: String,
}

/// The per-message result of a batch deletion.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DeleteOutcome {
    /// How many messages were deleted.
    pub successful: usize,

    /// The ids of the messages that couldn't be deleted.
    pub failed: Vec<String>,
}

/// A queue holding upload event notifications.
#[async_trait]
pub trait MessageQueue: Send + Sync {
    /// Receive up to `max_number_of_messages` messages, waiting at most
    /// `wait_time_seconds` for them to arrive.
    async fn receive(
        &self,
        queue_url: &str,
        max_number_of_messages: i32,
        wait_time_seconds: i32,
    ) -> Result<Vec<PendingMessage>, RelayError>;

    /// Delete the given messages in a single batch request.
    async fn delete_batch(
        &self,
        queue_url: &str,
        messages: &[PendingMessage],
    ) -> Result<DeleteOutcome, RelayError>;
}

/// A topic accepting notification texts. Publishing returns the
/// message id assigned by the topic, if any.
#[async_trait]
pub trait NotificationTopic: Send + Sync {
    async fn publish(&self, topic_arn: &str, message: &str) -> Result<Option<String>, RelayError>;
}

/// The SQS-backed queue.
#[derive(Clone)]
pub struct SqsQueue {
    client: aws_sdk_sqs::Client,
}

impl SqsQueue {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_sqs::Client::new(config),
        }
    }
}

#[async_trait]
impl MessageQueue for SqsQueue {
    async fn receive(
        &self,
        queue_url: &str,
        max_number_of_messages: i32,
        wait_time_seconds: i32,
    ) -> Result<Vec<PendingMessage>, RelayError> {
        let result = self
            .client
            .receive_message()
            .queue_url(queue_url)
            .max_number_of_messages(max_number_of_messages)
            .wait_time_seconds(wait_time_seconds)
            .send()
            .await
            .map_err(|e| RelayError::Receive(format!("{:?}", e)))?;
        Ok(result
            .messages()
            .unwrap_or_default()
            .iter()
            .map(|message| PendingMessage {
                id: message.message_id().unwrap_or_default().to_string(),
                receipt_handle: message.receipt_handle().unwrap_or_default().to_string(),
                body: message.body().unwrap_or_default().to_string(),
            })
            .collect())
    }

    async fn delete_batch(
        &self,
        queue_url: &str,
        messages: &[PendingMessage],
    ) -> Result<DeleteOutcome, RelayError> {
        let result = self
            .client
            .delete_message_batch()
            .queue_url(queue_url)
            .set_entries(Some(
                messages
                    .iter()
                    .map(|message| {
                        DeleteMessageBatchRequestEntry::builder()
                            .id(&message.id)
                            .receipt_handle(&message.receipt_handle)
                            .build()
                    })
                    .collect(),
            ))
            .send()
            .await
            .map_err(|e| RelayError::Delete(format!("{:?}", e)))?;
        Ok(DeleteOutcome {
            successful: result.successful().unwrap_or_default().len(),
            failed: result
                .failed()
                .unwrap_or_default()
                .iter()
                .map(|entry| entry.id().unwrap_or_default().to_string())
                .collect(),
        })
    }
}

/// The SNS-backed topic.
#[derive(Clone)]
pub struct SnsTopic {
    client: aws_sdk_sns::Client,
}

impl SnsTopic {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_sns::Client::new(config),
        }
    }
}

#[async_trait]
impl NotificationTopic for SnsTopic {
    async fn publish(&self, topic_arn: &str, message: &str) -> Result<Option<String>, RelayError> {
        let result = self
            .client
            .publish()
            .topic_arn(topic_arn)
            .message(message)
            .send()
            .await
            .map_err(|e| RelayError::Publish(format!("{:?}", e)))?;
        Ok(result.message_id().map(String::from))
    }
}

/// Global AWS configuration, loaded once.
static CONFIG: OnceCell<SdkConfig> = OnceCell::new();

/// Global SQS queue, created on first use.
static QUEUE: OnceCell<SqsQueue> = OnceCell::new();

/// Global SNS topic, created on first use.
static TOPIC: OnceCell<SnsTopic> = OnceCell::new();

/// Load the global AWS configuration for the configured region and
/// endpoint.
pub async fn init(settings: &Settings) -> Result<()> {
    let mut loader = from_env().region(Region::new(settings.region.clone()));
    if let Some(endpoint_url) = settings.endpoint_url() {
        loader = loader.endpoint_url(endpoint_url);
    }
    let config = loader.load().await;
    CONFIG
        .set(config)
        .map_err(|_| anyhow!("client::CONFIG was already initialized"))
}

/// Get the global AWS configuration, or panic if it hasn't been
/// initialized.
fn config() -> &'static SdkConfig {
    CONFIG.get().expect("client is not initialized")
}

/// Get the global SQS queue.
pub fn queue() -> &'static SqsQueue {
    QUEUE.get_or_init(|| SqsQueue::new(config()))
}

/// Get the global SNS topic.
pub fn topic() -> &'static SnsTopic {
    TOPIC.get_or_init(|| SnsTopic::new(config()))
}
