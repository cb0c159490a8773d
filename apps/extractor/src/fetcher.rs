use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("object s3://{bucket}/{key} does not exist")]
    NotFound { bucket: String, key: String },

    #[error("GetObject failed for s3://{bucket}/{key}: {message}")]
    Request {
        bucket: String,
        key: String,
        message: String,
    },

    #[error("could not read body of s3://{bucket}/{key}: {message}")]
    Body {
        bucket: String,
        key: String,
        message: String,
    },

    #[error("no content found in s3://{bucket}/{key}")]
    Empty { bucket: String, key: String },
}

/// Read-only access to uploaded documents.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Returns the full, non-empty object body. `key` must already be decoded.
    async fn fetch(&self, bucket: &str, key: &str) -> Result<Bytes, RetrievalError>;
}

#[derive(Clone)]
pub struct S3Fetcher {
    client: aws_sdk_s3::Client,
}

impl S3Fetcher {
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DocumentFetcher for S3Fetcher {
    async fn fetch(&self, bucket: &str, key: &str) -> Result<Bytes, RetrievalError> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    RetrievalError::NotFound {
                        bucket: bucket.to_string(),
                        key: key.to_string(),
                    }
                } else {
                    RetrievalError::Request {
                        bucket: bucket.to_string(),
                        key: key.to_string(),
                        message: DisplayErrorContext(&e).to_string(),
                    }
                }
            })?;

        let content = output
            .body
            .collect()
            .await
            .map_err(|e| RetrievalError::Body {
                bucket: bucket.to_string(),
                key: key.to_string(),
                message: e.to_string(),
            })?
            .into_bytes();

        ensure_non_empty(content, bucket, key)
    }
}

fn ensure_non_empty(content: Bytes, bucket: &str, key: &str) -> Result<Bytes, RetrievalError> {
    if content.is_empty() {
        return Err(RetrievalError::Empty {
            bucket: bucket.to_string(),
            key: key.to_string(),
        });
    }
    debug!("Fetched {} bytes from s3://{}/{}", content.len(), bucket, key);
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_body_is_an_error() {
        let err = ensure_non_empty(Bytes::new(), "uploads", "cv.pdf").unwrap_err();
        assert!(matches!(err, RetrievalError::Empty { .. }));
        assert_eq!(err.to_string(), "no content found in s3://uploads/cv.pdf");
    }

    #[test]
    fn test_non_empty_body_passes() {
        let body = ensure_non_empty(Bytes::from_static(b"%PDF"), "uploads", "cv.pdf").unwrap();
        assert_eq!(&body[..], b"%PDF");
    }

    #[test]
    fn test_not_found_message_names_object() {
        let err = RetrievalError::NotFound {
            bucket: "uploads".to_string(),
            key: "jane smith.pdf".to_string(),
        };
        assert_eq!(err.to_string(), "object s3://uploads/jane smith.pdf does not exist");
    }
}
