use std::fmt;

use crate::models::candidate::{CandidateRecord, NOT_FOUND};

/// A required-field rule the model output broke.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaViolation {
    /// Path in wire naming, e.g. `workExperience[1].startDate`.
    pub field: String,
    pub reason: String,
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecordValidation {
    pub violations: Vec<SchemaViolation>,
    /// Non-fatal findings, currently only non-normalized dates.
    pub warnings: Vec<String>,
}

impl RecordValidation {
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }

    fn require(&mut self, field: impl Into<String>, value: &str) {
        if value.trim().is_empty() {
            self.violations.push(SchemaViolation {
                field: field.into(),
                reason: "required field is empty".to_string(),
            });
        }
    }

    fn check_date(&mut self, field: impl Into<String>, value: &str) {
        if value != NOT_FOUND && !is_normalized_date(value) {
            self.warnings.push(format!(
                "{}: date '{}' is not in YYYY-MM form",
                field.into(),
                value
            ));
        }
    }
}

/// Checks a decoded record against the required-field rules of the schema.
///
/// Collects every violation rather than stopping at the first.
///
/// FAIL conditions:
/// - `fullName` or `email` blank
/// - `email` not email-shaped (the "Not found" placeholder is accepted)
/// - `workExperience` or `education` empty
/// - any required string inside an entry blank
pub fn validate_record(record: &CandidateRecord) -> RecordValidation {
    let mut result = RecordValidation::default();

    result.require("fullName", &record.full_name);
    result.require("email", &record.email);
    if !record.email.trim().is_empty() && record.email != NOT_FOUND && !is_email_shaped(&record.email)
    {
        result.violations.push(SchemaViolation {
            field: "email".to_string(),
            reason: format!("'{}' is not a valid email address", record.email),
        });
    }

    if record.work_experience.is_empty() {
        result.violations.push(SchemaViolation {
            field: "workExperience".to_string(),
            reason: "must contain at least one entry".to_string(),
        });
    }
    for (i, entry) in record.work_experience.iter().enumerate() {
        result.require(format!("workExperience[{i}].companyName"), &entry.company_name);
        result.require(format!("workExperience[{i}].position"), &entry.position);
        result.require(format!("workExperience[{i}].startDate"), &entry.start_date);
        result.check_date(format!("workExperience[{i}].startDate"), &entry.start_date);
        if let Some(end) = &entry.end_date {
            result.check_date(format!("workExperience[{i}].endDate"), end);
        }
    }

    if record.education.is_empty() {
        result.violations.push(SchemaViolation {
            field: "education".to_string(),
            reason: "must contain at least one entry".to_string(),
        });
    }
    for (i, entry) in record.education.iter().enumerate() {
        result.require(format!("education[{i}].institution"), &entry.institution);
        result.require(format!("education[{i}].degree"), &entry.degree);
        result.require(format!("education[{i}].fieldOfStudy"), &entry.field_of_study);
        if let Some(date) = &entry.graduation_date {
            result.check_date(format!("education[{i}].graduationDate"), date);
        }
    }

    result
}

/// One `@`, a non-empty local part, and a dotted domain without whitespace.
fn is_email_shaped(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

/// Accepts `YYYY`, `YYYY-MM` and `YYYY-MM-DD`.
fn is_normalized_date(value: &str) -> bool {
    let parts: Vec<&str> = value.split('-').collect();
    let digits = |s: &str, n: usize| s.len() == n && s.chars().all(|c| c.is_ascii_digit());
    match parts.as_slice() {
        [y] => digits(y, 4),
        [y, m] => digits(y, 4) && digits(m, 2),
        [y, m, d] => digits(y, 4) && digits(m, 2) && digits(d, 2),
        _ => false,
    }
}
