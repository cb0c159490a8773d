use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::errors::PipelineError;
use crate::models::candidate::CandidateRecord;

pub const SUCCESS_MESSAGE: &str = "CV processed successfully";
pub const FAILURE_MESSAGE: &str = "Error processing CV";

/// The only two shapes a pipeline run ever returns.
///
/// ```json
/// { "statusCode": 200, "body": { "message": "...", "result": { ... } } }
/// { "statusCode": 500, "body": { "message": "...", "error": "..." } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub status_code: u16,
    pub body: EnvelopeBody,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EnvelopeBody {
    Success {
        message: String,
        result: CandidateRecord,
    },
    Failure {
        message: String,
        error: String,
    },
}

impl ResponseEnvelope {
    pub fn success(result: CandidateRecord) -> Self {
        Self {
            status_code: StatusCode::OK.as_u16(),
            body: EnvelopeBody::Success {
                message: SUCCESS_MESSAGE.to_string(),
                result,
            },
        }
    }

    pub fn failure(error: &PipelineError) -> Self {
        Self {
            status_code: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            body: EnvelopeBody::Failure {
                message: FAILURE_MESSAGE.to_string(),
                error: error.to_string(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.body, EnvelopeBody::Success { .. })
    }
}

impl IntoResponse for ResponseEnvelope {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::candidate::sample_record;
    use serde_json::json;

    #[test]
    fn test_success_shape() {
        let envelope = ResponseEnvelope::success(sample_record());
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["statusCode"], 200);
        assert_eq!(value["body"]["message"], SUCCESS_MESSAGE);
        assert_eq!(value["body"]["result"]["fullName"], "Jane Smith");
        assert!(value["body"].get("error").is_none());
        assert!(envelope.is_success());
    }

    #[test]
    fn test_failure_shape() {
        let err = PipelineError::BadEvent("No records found in S3 event".to_string());
        let value = serde_json::to_value(ResponseEnvelope::failure(&err)).unwrap();
        assert_eq!(
            value,
            json!({
                "statusCode": 500,
                "body": {
                    "message": FAILURE_MESSAGE,
                    "error": "Bad event: No records found in S3 event"
                }
            })
        );
    }

    #[test]
    fn test_into_response_uses_status_code() {
        let err = PipelineError::BadEvent("empty".to_string());
        let response = ResponseEnvelope::failure(&err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = ResponseEnvelope::success(sample_record()).into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
