//! Defines the read-only application state and the two relay entry
//! points: polling the queue, and relaying a pushed delivery.

use crate::client::{MessageQueue, NotificationTopic, PendingMessage};
use crate::conf::{QueueSettings, Settings, SQS_MAX_NUMBER_OF_MESSAGES};
use crate::error::RelayError;
use crate::event::UploadEvent;
use crate::notification;
use anyhow::{anyhow, Result};
use aws_lambda_events::event::sqs::SqsEvent;
use once_cell::sync::OnceCell;
use tracing::{error, info, instrument, warn};

/// An App is an initialized application state, derived from
/// settings.
#[derive(Debug)]
pub struct App {
    /// The settings shared by both entry points.
    pub settings: Settings,

    /// The queue settings, present only when the app polls.
    pub queue: Option<QueueSettings>,
}

impl App {
    /// Initialize an App that only relays pushed deliveries.
    pub fn new(settings: Settings) -> Self {
        App {
            settings,
            queue: None,
        }
    }

    /// Initialize an App able to poll the given queue.
    pub fn with_queue(settings: Settings, queue: QueueSettings) -> Self {
        App {
            settings,
            queue: Some(queue),
        }
    }

    /// Poll the queue once, delete every received message, and
    /// publish a single notification about all of them. Messages are
    /// deleted before publishing, so a failed publish loses them.
    #[instrument(skip_all)]
    pub async fn poll_and_relay(
        &self,
        queue: &dyn MessageQueue,
        topic: &dyn NotificationTopic,
    ) -> Result<String, RelayError> {
        let queue_settings = self.queue.as_ref().ok_or(RelayError::NoQueue)?;
        let messages = queue
            .receive(
                &queue_settings.sqs_queue_name,
                SQS_MAX_NUMBER_OF_MESSAGES,
                queue_settings.sqs_wait_time_seconds,
            )
            .await?;
        info!("Received {} messages from SQS", messages.len());
        if messages.is_empty() {
            return Ok(poll_status(0));
        }

        self.delete(queue, &queue_settings.sqs_queue_name, &messages)
            .await?;
        let text = notification::from_message_bodies(
            messages.iter().map(|message| message.body.as_str()),
        )?;
        self.publish(topic, &text).await?;
        Ok(poll_status(messages.len()))
    }

    /// Relay the upload event carried by a pushed queue delivery. The
    /// delivery is acknowledged by the trigger itself once the
    /// invocation succeeds.
    #[instrument(skip_all)]
    pub async fn relay_delivery(
        &self,
        delivery: &SqsEvent,
        topic: &dyn NotificationTopic,
    ) -> Result<String, RelayError> {
        let message = delivery
            .records
            .first()
            .ok_or_else(|| RelayError::Parse(String::from("the delivery carries no message")))?;
        if delivery.records.len() > 1 {
            warn!(
                "The delivery carries {} messages; only the first one is relayed",
                delivery.records.len()
            );
        }
        let body = message
            .body
            .as_deref()
            .ok_or_else(|| RelayError::Parse(String::from("the delivered message has no body")))?;
        let event = UploadEvent::parse(body)?;
        if !event.records.is_empty() {
            let text = notification::from_event_records(&event.records)?;
            self.publish(topic, &text).await?;
        }
        Ok(push_status(event.records.len()))
    }

    async fn delete(
        &self,
        queue: &dyn MessageQueue,
        queue_url: &str,
        messages: &[PendingMessage],
    ) -> Result<(), RelayError> {
        let outcome = queue.delete_batch(queue_url, messages).await?;
        info!("Successfully deleted {} messages from SQS", outcome.successful);
        if !outcome.failed.is_empty() {
            warn!(
                "Failed to delete {} more messages from SQS: {:?}",
                outcome.failed.len(),
                outcome.failed
            );
        }
        Ok(())
    }

    async fn publish(&self, topic: &dyn NotificationTopic, text: &str) -> Result<(), RelayError> {
        match topic.publish(&self.settings.sns_topic_arn, text).await {
            Ok(message_id) => {
                info!(
                    "SNS message has been sent with id {}",
                    message_id.as_deref().unwrap_or("<none>")
                );
                Ok(())
            }
            Err(e) => {
                error!("Error while sending message to SNS: {:?}", text);
                Err(e)
            }
        }
    }
}

/// The status reported by the polling entry point, counting queue
/// messages.
pub fn poll_status(messages: usize) -> String {
    format!("{} messages has been processed.", messages)
}

/// The status reported by the push entry point, counting the upload
/// records embedded in the delivery.
pub fn push_status(records: usize) -> String {
    format!("{} SQS messages has been processed.", records)
}

/// Global App instance.
static CURRENT: OnceCell<App> = OnceCell::new();

fn set(app: App) -> Result<()> {
    CURRENT
        .set(app)
        .map_err(|_| anyhow!("app::CURRENT was already initialized"))
}

/// Initialize the global App instance for relaying pushed
/// deliveries.
pub fn init() -> Result<()> {
    set(App::new(Settings::from_env()?))
}

/// Initialize the global App instance for polling the queue.
pub fn init_with_queue() -> Result<()> {
    set(App::with_queue(
        Settings::from_env()?,
        QueueSettings::from_env()?,
    ))
}

/// Get the current App instance, or panic if it hasn't been
/// initialized.
pub fn current() -> &'static App {
    CURRENT.get().expect("app is not initialized")
}
