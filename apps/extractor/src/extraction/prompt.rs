// Instruction text sent alongside the CV document.
// The tool name and the "Not found" placeholder must stay in sync with
// `schema::TOOL_NAME` and `candidate::NOT_FOUND`; the tests below enforce it.

pub const CV_EXTRACTION_PROMPT: &str = r#"# CV Data Extraction

The attached document is a CV/resume. Extract the candidate's details into the structure defined by the CVDetailsSchema tool.

## Instructions
1. Read the entire document before extracting anything.
2. Capture every piece of information that has a place in the schema.
3. Follow the schema structure exactly; do not add properties it does not define.
4. Submit the result by calling the CVDetailsSchema tool. Do not answer in prose.

## Field guidance
- professionalSummary: if the CV has no summary, write a concise 2-3 sentence one from its content.
- workExperience:
  * Turn bullet points into individual responsibilities and achievements.
  * Write dates as YYYY-MM whenever the month is known.
  * When a role is marked "Present", "Current" or similar, set isCurrentPosition to true and omit endDate.
- education:
  * Spell degrees out in full (e.g. "BS" becomes "Bachelor of Science", "MA" becomes "Master of Arts").

## Edge cases
- Ambiguous information: use your best judgment and favour accuracy over completeness.
- Missing required fields (fullName, email, workExperience, education): use the text "Not found in document". For workExperience and education, supply a single entry whose required fields hold that text.
- Missing optional fields: leave them out entirely. Never use null or empty strings.
- Unclear dates: give your best approximation.

## Example (abbreviated)
```json
{
  "fullName": "Jane Smith",
  "email": "jane.smith@email.com",
  "phoneNumber": "555-123-4567",
  "location": "Seattle, WA",
  "professionalSummary": "Senior software engineer with 8 years of experience in cloud architecture and distributed systems.",
  "workExperience": [
    {
      "companyName": "Tech Solutions Inc.",
      "position": "Senior Software Engineer",
      "startDate": "2020-06",
      "isCurrentPosition": true,
      "responsibilities": [
        "Led development of cloud-native microservices using AWS Lambda and API Gateway",
        "Implemented CI/CD pipelines using GitHub Actions"
      ]
    }
  ],
  "education": [
    {
      "institution": "University of Washington",
      "degree": "Bachelor of Science",
      "fieldOfStudy": "Computer Science",
      "graduationDate": "2015-06"
    }
  ]
}
```

The extracted data is used to evaluate candidates, so completeness and correctness both matter."#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::schema::TOOL_NAME;
    use crate::models::candidate::{CandidateRecord, NOT_FOUND};

    #[test]
    fn test_prompt_names_the_tool() {
        assert!(CV_EXTRACTION_PROMPT.contains(TOOL_NAME));
    }

    #[test]
    fn test_prompt_uses_not_found_sentinel() {
        assert!(CV_EXTRACTION_PROMPT.contains(NOT_FOUND));
    }

    /// The worked example must itself be a valid record.
    #[test]
    fn test_prompt_example_decodes() {
        let start = CV_EXTRACTION_PROMPT.find("```json").unwrap() + "```json".len();
        let rest = &CV_EXTRACTION_PROMPT[start..];
        let end = rest.find("```").unwrap();
        let record: CandidateRecord = serde_json::from_str(rest[..end].trim()).unwrap();
        assert_eq!(record.full_name, "Jane Smith");
        assert_eq!(record.work_experience[0].is_current_position, Some(true));
    }
}
