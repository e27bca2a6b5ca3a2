//! Relays S3 upload events, received through an SQS queue, as
//! human-readable notifications published to an SNS topic.

pub mod app;
pub mod client;
pub mod conf;
pub mod error;
pub mod event;
pub mod notification;
