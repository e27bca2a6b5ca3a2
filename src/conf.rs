//! Defines configuration as read from the environment.

use anyhow::{Context, Result};
use serde::Deserialize;

/// The maximum amount of messages requested from the queue in a
/// single poll. This is also the ceiling SQS imposes on a receive
/// request.
pub const SQS_MAX_NUMBER_OF_MESSAGES: i32 = 10;

/// Settings shared by both relay entry points: where to publish
/// notifications, and how to reach AWS. The configuration must be
/// given as environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// The ARN of the SNS topic that receives the notifications.
    pub sns_topic_arn: String,

    /// The AWS region of both the topic and the queue.
    pub region: String,

    /// Overrides the AWS endpoint, e.g. to point the relay at a local
    /// stack. A value without a scheme is assumed to be https.
    #[serde(default)]
    pub aws_endpoint_url: Option<String>,
}

/// Settings required only by the polling entry point.
#[derive(Debug, Clone, Deserialize)]
pub struct QueueSettings {
    /// The URL of the SQS queue to poll. The variable name is kept
    /// for compatibility with existing deployments, even though the
    /// value is a URL.
    pub sqs_queue_name: String,

    /// How long a receive request waits for messages to arrive, in
    /// seconds.
    pub sqs_wait_time_seconds: i32,
}

impl Settings {
    /// Read the settings from the process environment.
    pub fn from_env() -> Result<Self> {
        envy::from_env().context("Invalid relay settings (SNS_TOPIC_ARN, REGION)")
    }

    /// The endpoint override, normalized to carry a scheme.
    pub fn endpoint_url(&self) -> Option<String> {
        self.aws_endpoint_url.as_ref().map(|endpoint_url| {
            if endpoint_url.starts_with("http://") || endpoint_url.starts_with("https://") {
                endpoint_url.clone()
            } else {
                format!("https://{}", endpoint_url)
            }
        })
    }
}

impl QueueSettings {
    /// Read the queue settings from the process environment.
    pub fn from_env() -> Result<Self> {
        envy::from_env()
            .context("Invalid queue settings (SQS_QUEUE_NAME, SQS_WAIT_TIME_SECONDS)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn reads_settings() {
        let settings: Settings = envy::from_iter(vars(&[
            ("SNS_TOPIC_ARN", "arn:aws:sns:eu-west-1:123456789012:uploads"),
            ("REGION", "eu-west-1"),
        ]))
        .unwrap();
        assert_eq!(
            settings.sns_topic_arn,
            "arn:aws:sns:eu-west-1:123456789012:uploads"
        );
        assert_eq!(settings.region, "eu-west-1");
        assert_eq!(settings.endpoint_url(), None);
    }

    #[test]
    fn rejects_missing_topic() {
        let settings = envy::from_iter::<_, Settings>(vars(&[("REGION", "eu-west-1")]));
        assert!(settings.is_err());
    }

    #[test]
    fn normalizes_endpoint_url() {
        let mut settings: Settings = envy::from_iter(vars(&[
            ("SNS_TOPIC_ARN", "topic"),
            ("REGION", "us-east-1"),
            ("AWS_ENDPOINT_URL", "localhost:4566"),
        ]))
        .unwrap();
        assert_eq!(
            settings.endpoint_url().as_deref(),
            Some("https://localhost:4566")
        );
        settings.aws_endpoint_url = Some(String::from("http://localhost:4566"));
        assert_eq!(
            settings.endpoint_url().as_deref(),
            Some("http://localhost:4566")
        );
    }

    #[test]
    fn reads_queue_settings() {
        let queue: QueueSettings = envy::from_iter(vars(&[
            (
                "SQS_QUEUE_NAME",
                "https://sqs.eu-west-1.amazonaws.com/123456789012/uploads",
            ),
            ("SQS_WAIT_TIME_SECONDS", "5"),
        ]))
        .unwrap();
        assert_eq!(queue.sqs_wait_time_seconds, 5);
    }

    #[test]
    fn rejects_malformed_wait_time() {
        let queue = envy::from_iter::<_, QueueSettings>(vars(&[
            ("SQS_QUEUE_NAME", "queue"),
            ("SQS_WAIT_TIME_SECONDS", "soon"),
        ]));
        assert!(queue.is_err());
    }
}
