use serde::{Deserialize, Serialize};

/// Placeholder the model is told to use for required fields the CV does not contain.
pub const NOT_FOUND: &str = "Not found in document";

/// Structured candidate data extracted from a single CV.
///
/// Field names follow the camelCase wire format of the extraction schema.
/// Optional fields are omitted rather than serialized as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CandidateRecord {
    pub full_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub professional_summary: Option<String>,
    pub work_experience: Vec<WorkExperienceEntry>,
    pub education: Vec<EducationEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WorkExperienceEntry {
    pub company_name: String,
    pub position: String,
    /// Best-effort `YYYY-MM`; never parsed.
    pub start_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_current_position: Option<bool>,
    pub responsibilities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EducationEntry {
    pub institution: String,
    pub degree: String,
    pub field_of_study: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graduation_date: Option<String>,
}

#[cfg(test)]
pub(crate) fn sample_record() -> CandidateRecord {
    CandidateRecord {
        full_name: "Jane Smith".to_string(),
        email: "jane.smith@email.com".to_string(),
        phone_number: Some("555-123-4567".to_string()),
        location: Some("Seattle, WA".to_string()),
        professional_summary: None,
        work_experience: vec![WorkExperienceEntry {
            company_name: "Tech Solutions Inc.".to_string(),
            position: "Senior Software Engineer".to_string(),
            start_date: "2020-06".to_string(),
            end_date: None,
            is_current_position: Some(true),
            responsibilities: vec![
                "Led development of cloud-native microservices".to_string(),
                "Implemented CI/CD pipelines using GitHub Actions".to_string(),
            ],
        }],
        education: vec![EducationEntry {
            institution: "University of Washington".to_string(),
            degree: "Bachelor of Science".to_string(),
            field_of_study: "Computer Science".to_string(),
            graduation_date: Some("2015-06".to_string()),
        }],
    }
}
