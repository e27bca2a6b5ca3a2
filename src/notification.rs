//! Builds the notification text published to the topic.

use crate::error::RelayError;
use crate::event::{UploadEvent, UploadEventRecord, UploadRecord};
use tracing::{info, warn};

/// Format the line announcing a single upload.
pub fn line(record: &UploadRecord) -> String {
    format!(
        "The image has been uploaded. Name: '{}'. Size: '{}'.\n",
        record.key, record.size
    )
}

/// Concatenate the lines of the given uploads, in order.
pub fn text(records: &[UploadRecord]) -> String {
    let text: String = records.iter().map(line).collect();
    info!("Built message text for SNS:\n{}", text);
    text
}

/// Build the notification for a sequence of raw queue message
/// bodies. Each body is an upload event envelope, and only its first
/// record is announced. Any unparseable body aborts the whole
/// notification.
pub fn from_message_bodies<'a, I>(bodies: I) -> Result<String, RelayError>
where
    I: IntoIterator<Item = &'a str>,
{
    let records = bodies
        .into_iter()
        .map(|body| {
            UploadEvent::parse(body)?.first_upload().map_err(|e| {
                warn!("Error while parsing SQS message {:?}: {}", body, e);
                e
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(text(&records))
}

/// Build the notification for already parsed event records, one line
/// per record.
pub fn from_event_records(records: &[UploadEventRecord]) -> Result<String, RelayError> {
    let records = records
        .iter()
        .map(UploadEventRecord::upload)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(text(&records))
}
