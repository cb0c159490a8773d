//! JSON schema bound to the extraction tool.
//!
//! Mirrors `CandidateRecord`: every property listed in a `required` array is a
//! non-`Option` field on the Rust side, everything else is optional.

use serde_json::{json, Value};

/// Name of the tool the model must call with the extracted data.
pub const TOOL_NAME: &str = "CVDetailsSchema";

pub const TOOL_DESCRIPTION: &str =
    "Contains a schema for the details to be extracted from the cv";

/// A named, schema-bound tool offered to the model.
#[derive(Debug, Clone)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

impl ToolDefinition {
    /// The candidate-extraction tool.
    pub fn candidate() -> Self {
        Self {
            name: TOOL_NAME,
            description: TOOL_DESCRIPTION,
            input_schema: candidate_schema(),
        }
    }
}

pub fn candidate_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "fullName": {
                "type": "string",
                "description": "The full name of the candidate"
            },
            "email": {
                "type": "string",
                "format": "email",
                "description": "The email address of the candidate"
            },
            "phoneNumber": {
                "type": "string",
                "description": "The contact phone number of the candidate"
            },
            "location": {
                "type": "string",
                "description": "The geographic location of the candidate"
            },
            "professionalSummary": {
                "type": "string",
                "description": "A summary of the candidate's professional background and expertise"
            },
            "workExperience": {
                "type": "array",
                "description": "The candidate's work history",
                "items": work_experience_schema()
            },
            "education": {
                "type": "array",
                "description": "The candidate's educational background",
                "items": education_schema()
            }
        },
        "required": ["fullName", "email", "workExperience", "education"],
        "additionalProperties": false
    })
}

fn work_experience_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "companyName": {
                "type": "string",
                "description": "Name of the company where the candidate worked"
            },
            "position": {
                "type": "string",
                "description": "Job title or position held by the candidate"
            },
            "startDate": {
                "type": "string",
                "description": "Start date of employment (YYYY-MM)"
            },
            "endDate": {
                "type": "string",
                "description": "End date of employment (YYYY-MM)"
            },
            "isCurrentPosition": {
                "type": "boolean",
                "description": "Indicates if this is the candidate's current position"
            },
            "responsibilities": {
                "type": "array",
                "items": { "type": "string" },
                "description": "List of job responsibilities"
            }
        },
        "required": ["companyName", "position", "startDate", "responsibilities"],
        "additionalProperties": false
    })
}

fn education_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "institution": {
                "type": "string",
                "description": "Name of the educational institution attended"
            },
            "degree": {
                "type": "string",
                "description": "Type of degree obtained"
            },
            "fieldOfStudy": {
                "type": "string",
                "description": "Major or field of study"
            },
            "graduationDate": {
                "type": "string",
                "description": "Date of graduation (YYYY-MM)"
            }
        },
        "required": ["institution", "degree", "fieldOfStudy"],
        "additionalProperties": false
    })
}
