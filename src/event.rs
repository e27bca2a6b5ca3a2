//! Defines the upload event envelope, the S3 event notification
//! carried in the body of each queue message, and the upload record
//! extracted from it.

use crate::error::RelayError;
use serde::Deserialize;
use tracing::warn;

/// An S3 event notification. Only the fields the relay reads are
/// modelled; everything else is ignored.
#[derive(Debug, Deserialize)]
pub struct UploadEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<UploadEventRecord>,
}

/// A single storage event inside an envelope.
#[derive(Debug, Deserialize)]
pub struct UploadEventRecord {
    pub s3: S3Entity,
}

#[derive(Debug, Deserialize)]
pub struct S3Entity {
    pub object: S3Object,
}

#[derive(Debug, Deserialize)]
pub struct S3Object {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

/// The metadata of an uploaded object, as reported in the
/// notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRecord {
    pub key: String,
    pub size: u64,
}

impl UploadEvent {
    /// Parse an envelope from the raw body of a queue message.
    pub fn parse(body: &str) -> Result<Self, RelayError> {
        serde_json::from_str(body).map_err(|e| {
            warn!("Couldn't parse upload event {:?}: {:?}", body, e);
            RelayError::from(e)
        })
    }

    /// The first record of the envelope as an upload record. An
    /// envelope without records is an error.
    pub fn first_upload(&self) -> Result<UploadRecord, RelayError> {
        self.records
            .first()
            .ok_or_else(|| RelayError::Parse(String::from("upload event has no records")))?
            .upload()
    }
}

impl UploadEventRecord {
    /// Extract the object key and size of the record.
    pub fn upload(&self) -> Result<UploadRecord, RelayError> {
        let object = &self.s3.object;
        match (&object.key, object.size) {
            (Some(key), Some(size)) => Ok(UploadRecord {
                key: key.clone(),
                size,
            }),
            (None, _) => Err(RelayError::Parse(String::from(
                "upload event record has no object key",
            ))),
            (_, None) => Err(RelayError::Parse(format!(
                "upload event record for {:?} has no object size",
                object.key.as_deref().unwrap_or_default()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "Records": [
            {
                "eventVersion": "2.1",
                "eventSource": "aws:s3",
                "awsRegion": "eu-west-1",
                "eventTime": "2023-09-01T10:00:00.000Z",
                "eventName": "ObjectCreated:Put",
                "s3": {
                    "s3SchemaVersion": "1.0",
                    "bucket": { "name": "images", "arn": "arn:aws:s3:::images" },
                    "object": { "key": "cat.png", "size": 2048, "eTag": "abc" }
                }
            },
            {
                "eventName": "ObjectCreated:Put",
                "s3": { "object": { "key": "dog.png", "size": 1 } }
            }
        ]
    }"#;

    #[test]
    fn parses_full_notification() {
        let event = UploadEvent::parse(BODY).unwrap();
        assert_eq!(event.records.len(), 2);
        assert_eq!(
            event.first_upload().unwrap(),
            UploadRecord {
                key: String::from("cat.png"),
                size: 2048
            }
        );
    }

    #[test]
    fn empty_envelope_has_no_first_upload() {
        let event = UploadEvent::parse(r#"{"Records": []}"#).unwrap();
        assert!(event.records.is_empty());
        assert!(matches!(event.first_upload(), Err(RelayError::Parse(_))));
    }

    #[test]
    fn rejects_malformed_body() {
        assert!(matches!(
            UploadEvent::parse("not json"),
            Err(RelayError::Parse(_))
        ));
    }

    #[test]
    fn rejects_record_without_key() {
        let event =
            UploadEvent::parse(r#"{"Records": [{"s3": {"object": {"size": 100}}}]}"#).unwrap();
        match event.first_upload() {
            Err(RelayError::Parse(message)) => assert!(message.contains("no object key")),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn rejects_record_without_size() {
        let event =
            UploadEvent::parse(r#"{"Records": [{"s3": {"object": {"key": "a.jpg"}}}]}"#).unwrap();
        assert!(matches!(event.first_upload(), Err(RelayError::Parse(_))));
    }
}
