//! S3 object-created notifications.
//!
//! Only the fields the pipeline reads are modelled; everything else in the
//! notification is ignored on deserialization.

use std::borrow::Cow;

use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::PipelineError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct S3Event {
    #[serde(rename = "Records", default)]
    pub records: Vec<S3EventRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S3EventRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,
    pub s3: S3Entity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Entity {
    pub bucket: S3Bucket,
    pub object: S3Object,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Bucket {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Object {
    /// URL-encoded, with `+` standing for a space.
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl S3Event {
    /// Builds a single-record event.
    #[cfg(test)]
    pub fn single(bucket: &str, encoded_key: &str) -> Self {
        Self {
            records: vec![S3EventRecord {
                event_name: Some("ObjectCreated:Put".to_string()),
                s3: S3Entity {
                    bucket: S3Bucket {
                        name: bucket.to_string(),
                    },
                    object: S3Object {
                        key: encoded_key.to_string(),
                        size: None,
                    },
                },
            }],
        }
    }
}

/// The object a pipeline run works on, with its key already decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRef {
    pub bucket: String,
    pub key: String,
}

/// Picks the first record of the event. Further records are ignored.
pub fn first_object(event: &S3Event) -> Result<ObjectRef, PipelineError> {
    let record = event
        .records
        .first()
        .ok_or_else(|| PipelineError::BadEvent("No records found in S3 event".to_string()))?;

    if event.records.len() > 1 {
        warn!(
            "S3 event carries {} records; only the first is processed",
            event.records.len()
        );
    }

    let bucket = record.s3.bucket.name.trim();
    if bucket.is_empty() {
        return Err(PipelineError::BadEvent(
            "S3 event record has an empty bucket name".to_string(),
        ));
    }

    let key = decode_object_key(&record.s3.object.key)?;
    if key.is_empty() {
        return Err(PipelineError::BadEvent(
            "S3 event record has an empty object key".to_string(),
        ));
    }

    Ok(ObjectRef {
        bucket: bucket.to_string(),
        key,
    })
}

/// Undoes S3's key encoding: `+` becomes a space first, then `%XX` escapes are
/// decoded. So `jane%2Bsmith+resume.pdf` becomes `jane+smith resume.pdf`.
///
/// A `%` not followed by two hex digits makes the key a `BadEvent`.
pub fn decode_object_key(encoded: &str) -> Result<String, PipelineError> {
    let spaced: Cow<'_, str> = if encoded.contains('+') {
        Cow::Owned(encoded.replace('+', " "))
    } else {
        Cow::Borrowed(encoded)
    };
    if let Some(pos) = malformed_escape(&spaced) {
        return Err(PipelineError::BadEvent(format!(
            "object key has a malformed percent escape at byte {pos}"
        )));
    }
    percent_decode_str(&spaced)
        .decode_utf8()
        .map(Cow::into_owned)
        .map_err(|e| PipelineError::BadEvent(format!("object key is not valid UTF-8: {e}")))
}

/// Position of the first `%` that does not start a `%XX` escape.
fn malformed_escape(key: &str) -> Option<usize> {
    let bytes = key.as_bytes();
    bytes.iter().enumerate().find_map(|(i, &b)| {
        let well_formed = bytes
            .get(i + 1..i + 3)
            .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
        (b == b'%' && !well_formed).then_some(i)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_plus_and_percent() {
        assert_eq!(
            decode_object_key("jane%2Bsmith+resume.pdf").unwrap(),
            "jane+smith resume.pdf"
        );
    }

    #[test]
    fn test_decode_plain_key_unchanged() {
        assert_eq!(
            decode_object_key("uploads/cv-2024.pdf").unwrap(),
            "uploads/cv-2024.pdf"
        );
    }

    #[test]
    fn test_decode_multibyte() {
        assert_eq!(
            decode_object_key("Jos%C3%A9+Garc%C3%ADa.pdf").unwrap(),
            "José García.pdf"
        );
    }

    #[test]
    fn test_decode_invalid_utf8_is_bad_event() {
        let err = decode_object_key("cv%FF.pdf").unwrap_err();
        assert!(matches!(err, PipelineError::BadEvent(_)));
    }

    #[test]
    fn test_decode_malformed_escapes_are_bad_events() {
        for key in ["cv%zz+report.pdf", "report%.pdf", "cv%4", "cv%zz+report%.pdf"] {
            let err = decode_object_key(key).unwrap_err();
            assert!(matches!(err, PipelineError::BadEvent(_)), "accepted {key}");
        }
    }

    #[test]
    fn test_decode_literal_percent_escape() {
        assert_eq!(decode_object_key("100%25+done.pdf").unwrap(), "100% done.pdf");
    }

    #[test]
    fn test_parses_s3_notification() {
        let raw = r#"{
            "Records": [{
                "eventVersion": "2.1",
                "eventSource": "aws:s3",
                "awsRegion": "us-east-1",
                "eventName": "ObjectCreated:Put",
                "s3": {
                    "s3SchemaVersion": "1.0",
                    "bucket": {"name": "cv-uploads", "arn": "arn:aws:s3:::cv-uploads"},
                    "object": {"key": "jane%2Bsmith+resume.pdf", "size": 48213, "eTag": "abc"}
                }
            }]
        }"#;
        let event: S3Event = serde_json::from_str(raw).unwrap();
        let object = first_object(&event).unwrap();
        assert_eq!(
            object,
            ObjectRef {
                bucket: "cv-uploads".to_string(),
                key: "jane+smith resume.pdf".to_string(),
            }
        );
        assert_eq!(event.records[0].s3.object.size, Some(48213));
    }

    #[test]
    fn test_missing_records_field_is_empty_event() {
        let event: S3Event = serde_json::from_str("{}").unwrap();
        let err = first_object(&event).unwrap_err();
        assert!(err.to_string().contains("No records found"));
    }

    #[test]
    fn test_only_first_record_is_used() {
        let mut event = S3Event::single("bucket-a", "first.pdf");
        event
            .records
            .extend(S3Event::single("bucket-b", "second.pdf").records);
        let object = first_object(&event).unwrap();
        assert_eq!(object.bucket, "bucket-a");
        assert_eq!(object.key, "first.pdf");
    }

    #[test]
    fn test_empty_key_is_bad_event() {
        let event = S3Event::single("cv-uploads", "");
        assert!(matches!(
            first_object(&event).unwrap_err(),
            PipelineError::BadEvent(_)
        ));
    }
}
