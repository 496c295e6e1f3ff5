//! Job description analysis: validated free text in, typed [`JobAnalysis`] out.
//!
//! The analyzer validates the raw description locally (the backend is never
//! contacted for invalid input), issues a structured-extraction request
//! through the resilient client, recovers JSON from the completion, and maps
//! it tolerantly into a [`JobAnalysis`]: omitted optional fields default
//! rather than fail, and a missing job title falls back to the `"Unknown"`
//! sentinel.

use crate::client::InferenceClient;
use crate::types::Message;
use crate::{extract, Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

pub(crate) const MIN_DESCRIPTION_CHARS: usize = 50;
pub(crate) const MAX_DESCRIPTION_CHARS: usize = 10_000;
const MIN_KEYWORDS: usize = 5;
const MAX_KEYWORDS: usize = 50;

/// Importance level of a single job requirement.
///
/// Backend output is normalized case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    Required,
    Preferred,
    Optional,
}

impl Importance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Importance::Required => "required",
            Importance::Preferred => "preferred",
            Importance::Optional => "optional",
        }
    }
}

impl FromStr for Importance {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "required" => Ok(Importance::Required),
            "preferred" => Ok(Importance::Preferred),
            "optional" => Ok(Importance::Optional),
            other => Err(format!(
                "importance must be required|preferred|optional, got '{}'",
                other
            )),
        }
    }
}

/// One parsed requirement from a job posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRequirement {
    /// Requirement category (e.g. "technical_skill", "experience"), trimmed
    pub category: String,
    pub skill: String,
    pub importance: Importance,
    pub years_experience: Option<u32>,
}

impl JobRequirement {
    /// Map one requirement entry from backend JSON, rejecting empty category
    /// or skill, unknown importance levels, and negative experience years.
    fn from_value(value: &serde_json::Value) -> Result<Self> {
        let category = value
            .get("category")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| malformed_field("requirement category is missing or empty", value))?
            .to_string();
        let skill = value
            .get("skill")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| malformed_field("requirement skill is missing or empty", value))?
            .to_string();
        let importance = value
            .get("importance")
            .and_then(|v| v.as_str())
            .ok_or_else(|| malformed_field("requirement importance is missing", value))
            .and_then(|s| {
                Importance::from_str(s).map_err(|e| malformed_field(&e, value))
            })?;
        let years_experience = match value.get("years_experience") {
            None | Some(serde_json::Value::Null) => None,
            Some(v) => Some(
                v.as_u64()
                    .and_then(|n| u32::try_from(n).ok())
                    .ok_or_else(|| {
                        malformed_field("years_experience must be a non-negative integer", value)
                    })?,
            ),
        };
        Ok(Self {
            category,
            skill,
            importance,
            years_experience,
        })
    }
}

fn malformed_field(message: &str, value: &serde_json::Value) -> Error {
    let preview: String = value.to_string().chars().take(200).collect();
    Error::invalid_response(
        message,
        ErrorContext::new()
            .with_preview(preview)
            .with_source("job_analyzer"),
    )
}

/// Structured analysis of a free-text job description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobAnalysis {
    pub job_title: String,
    pub company: Option<String>,
    pub requirements: Vec<JobRequirement>,
    /// Deduplicated skill names
    pub skills: BTreeSet<String>,
    pub keywords: Vec<String>,
    pub experience_level: Option<String>,
    pub education_requirements: Vec<String>,
    pub responsibilities: Vec<String>,
}

impl JobAnalysis {
    /// Tolerant mapping from extracted backend JSON.
    ///
    /// Optional fields omitted by the backend default to None/empty; a
    /// missing job title falls back to the `"Unknown"` sentinel rather than
    /// failing. Individually malformed requirement entries are still errors.
    pub fn from_value(value: &serde_json::Value) -> Result<Self> {
        let requirements = value
            .get("requirements")
            .and_then(|v| v.as_array())
            .map(|entries| {
                entries
                    .iter()
                    .map(JobRequirement::from_value)
                    .collect::<Result<Vec<_>>>()
            })
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            job_title: value
                .get("job_title")
                .and_then(|v| v.as_str())
                .filter(|s| !s.trim().is_empty())
                .unwrap_or("Unknown")
                .to_string(),
            company: optional_string(value, "company"),
            requirements,
            skills: string_items(value, "skills").collect(),
            keywords: string_items(value, "keywords").collect(),
            experience_level: optional_string(value, "experience_level"),
            education_requirements: string_items(value, "education_requirements").collect(),
            responsibilities: string_items(value, "responsibilities").collect(),
        })
    }
}

fn optional_string(value: &serde_json::Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn string_items<'a>(
    value: &'a serde_json::Value,
    key: &str,
) -> impl Iterator<Item = String> + 'a {
    value
        .get(key)
        .and_then(|v| v.as_array())
        .into_iter()
        .flatten()
        .filter_map(|v| v.as_str())
        .map(str::to_string)
}

/// Analyzer for free-text job descriptions.
pub struct JobAnalyzer {
    client: Arc<InferenceClient>,
}

impl JobAnalyzer {
    pub fn new(client: Arc<InferenceClient>) -> Self {
        Self { client }
    }

    /// Analyze a job description into requirements, skills, and keywords.
    ///
    /// Validation failures and backend failures propagate unchanged; a
    /// failure while mapping the extracted JSON wraps into
    /// [`Error::AnalysisFailed`] with the cause preserved.
    pub async fn analyze(&self, job_description: &str) -> Result<JobAnalysis> {
        let trimmed = validate_description(job_description)?;

        info!(
            description_chars = trimmed.chars().count(),
            "analyzing job description"
        );

        let messages = [
            Message::system(
                "You are an expert job description analyzer. Always respond with valid JSON.",
            ),
            Message::user(analysis_prompt(trimmed)),
        ];

        let response = self.client.send(&messages, None).await?;
        let content = response.content()?;
        let value = extract::json_object(content)?;

        let analysis = JobAnalysis::from_value(&value)
            .map_err(|e| Error::analysis_failed("could not map extracted job analysis", e))?;

        info!(
            job_title = analysis.job_title.as_str(),
            skills = analysis.skills.len(),
            keywords = analysis.keywords.len(),
            "job description analysis complete"
        );
        Ok(analysis)
    }
}

/// Local input validation; runs before any network activity.
///
/// Bounds are in characters, not bytes, so multibyte descriptions are
/// measured the same way an ASCII one is.
pub(crate) fn validate_description(job_description: &str) -> Result<&str> {
    let trimmed = job_description.trim();
    if trimmed.is_empty() {
        return Err(Error::input_validation(
            "job description is empty",
            ErrorContext::new()
                .with_input_length(0)
                .with_source("job_analyzer"),
        ));
    }
    let char_count = trimmed.chars().count();
    if char_count < MIN_DESCRIPTION_CHARS {
        return Err(Error::input_validation(
            format!(
                "job description is too short (minimum {} characters)",
                MIN_DESCRIPTION_CHARS
            ),
            ErrorContext::new()
                .with_input_length(char_count)
                .with_source("job_analyzer"),
        ));
    }
    if char_count > MAX_DESCRIPTION_CHARS {
        return Err(Error::input_validation(
            format!(
                "job description is too long (maximum {} characters)",
                MAX_DESCRIPTION_CHARS
            ),
            ErrorContext::new()
                .with_input_length(char_count)
                .with_source("job_analyzer"),
        ));
    }
    Ok(trimmed)
}

fn analysis_prompt(job_description: &str) -> String {
    format!(
        r#"Analyze the following job description and extract structured information in JSON format.

Job Description:
{job_description}

Please provide a JSON response with the following structure:
{{
  "job_title": "extracted job title",
  "company": "company name if mentioned",
  "requirements": [
    {{"category": "technical_skill|soft_skill|experience|education", "skill": "specific skill", "importance": "required|preferred|optional", "years_experience": null or number}}
  ],
  "skills": ["skill1", "skill2"],
  "keywords": ["keyword1", "keyword2"],
  "experience_level": "entry|mid|senior|lead",
  "education_requirements": ["requirement1", "requirement2"],
  "responsibilities": ["responsibility1", "responsibility2"]
}}

Extract at least {MIN_KEYWORDS} but no more than {MAX_KEYWORDS} relevant keywords for ATS optimization."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_description_rejected() {
        for input in ["", "   ", "\n\t "] {
            let err = validate_description(input).unwrap_err();
            assert_eq!(err.kind(), "input_validation");
            assert!(err.to_string().contains("empty"));
        }
    }

    #[test]
    fn test_short_description_rejected_at_49_chars() {
        let input = "x".repeat(49);
        let err = validate_description(&input).unwrap_err();
        assert_eq!(err.kind(), "input_validation");
        assert!(err.to_string().contains("too short"));
        assert_eq!(err.context().unwrap().input_length, Some(49));
    }

    #[test]
    fn test_description_accepted_at_exactly_50_chars() {
        let input = "x".repeat(50);
        assert_eq!(validate_description(&input).unwrap().len(), 50);
    }

    #[test]
    fn test_length_measured_after_trim() {
        let input = format!("   {}   ", "x".repeat(49));
        assert!(validate_description(&input).is_err());
    }

    #[test]
    fn test_long_description_rejected_past_10k() {
        let input = "x".repeat(10_001);
        let err = validate_description(&input).unwrap_err();
        assert!(err.to_string().contains("too long"));

        let input = "x".repeat(10_000);
        assert!(validate_description(&input).is_ok());
    }

    #[test]
    fn test_length_bounds_count_characters_not_bytes() {
        // 5,001 Cyrillic characters encode to 10,002 bytes but are still
        // under the 10,000-character maximum.
        let input = "д".repeat(5_001);
        assert!(validate_description(&input).is_ok());

        // 17 CJK characters encode to 51 bytes but stay below the
        // 50-character minimum.
        let input = "日".repeat(17);
        let err = validate_description(&input).unwrap_err();
        assert!(err.to_string().contains("too short"));
        assert_eq!(err.context().unwrap().input_length, Some(17));

        let input = "日".repeat(10_001);
        let err = validate_description(&input).unwrap_err();
        assert!(err.to_string().contains("too long"));
        assert_eq!(err.context().unwrap().input_length, Some(10_001));
    }

    #[test]
    fn test_importance_parses_case_insensitive() {
        assert_eq!(Importance::from_str("REQUIRED").unwrap(), Importance::Required);
        assert_eq!(Importance::from_str("Preferred").unwrap(), Importance::Preferred);
        assert_eq!(Importance::from_str("optional").unwrap(), Importance::Optional);
        assert!(Importance::from_str("mandatory").is_err());
    }

    #[test]
    fn test_requirement_mapping_trims_category() {
        let req = JobRequirement::from_value(&json!({
            "category": "  technical_skill  ",
            "skill": "Rust",
            "importance": "Required",
            "years_experience": 3
        }))
        .unwrap();

        assert_eq!(req.category, "technical_skill");
        assert_eq!(req.importance, Importance::Required);
        assert_eq!(req.years_experience, Some(3));
    }

    #[test]
    fn test_requirement_rejects_empty_category() {
        let err = JobRequirement::from_value(&json!({
            "category": "   ",
            "skill": "Rust",
            "importance": "required"
        }))
        .unwrap_err();
        assert!(err.to_string().contains("category"));
    }

    #[test]
    fn test_requirement_rejects_negative_years() {
        let err = JobRequirement::from_value(&json!({
            "category": "experience",
            "skill": "backend",
            "importance": "required",
            "years_experience": -2
        }))
        .unwrap_err();
        assert!(err.to_string().contains("years_experience"));
    }

    #[test]
    fn test_requirement_rejects_years_beyond_u32() {
        let err = JobRequirement::from_value(&json!({
            "category": "experience",
            "skill": "backend",
            "importance": "required",
            "years_experience": u64::from(u32::MAX) + 1
        }))
        .unwrap_err();
        assert!(err.to_string().contains("years_experience"));
    }

    #[test]
    fn test_requirement_null_years_is_none() {
        let req = JobRequirement::from_value(&json!({
            "category": "experience",
            "skill": "backend",
            "importance": "preferred",
            "years_experience": null
        }))
        .unwrap();
        assert_eq!(req.years_experience, None);
    }

    #[test]
    fn test_analysis_mapping_full_payload() {
        let analysis = JobAnalysis::from_value(&json!({
            "job_title": "Senior Rust Engineer",
            "company": "Acme",
            "requirements": [
                {"category": "technical_skill", "skill": "Rust", "importance": "required", "years_experience": 5}
            ],
            "skills": ["Rust", "Tokio", "Rust"],
            "keywords": ["rust", "async", "backend", "systems", "api"],
            "experience_level": "senior",
            "education_requirements": ["BSc Computer Science"],
            "responsibilities": ["Design services"]
        }))
        .unwrap();

        assert_eq!(analysis.job_title, "Senior Rust Engineer");
        assert_eq!(analysis.company.as_deref(), Some("Acme"));
        assert_eq!(analysis.requirements.len(), 1);
        // Skills are deduplicated
        assert_eq!(analysis.skills.len(), 2);
        assert_eq!(analysis.keywords.len(), 5);
    }

    #[test]
    fn test_analysis_mapping_tolerates_partial_payload() {
        let analysis = JobAnalysis::from_value(&json!({
            "keywords": ["one", "two"]
        }))
        .unwrap();

        assert_eq!(analysis.job_title, "Unknown");
        assert_eq!(analysis.company, None);
        assert!(analysis.requirements.is_empty());
        assert!(analysis.skills.is_empty());
        assert_eq!(analysis.keywords, vec!["one", "two"]);
        assert_eq!(analysis.experience_level, None);
    }

    #[test]
    fn test_analysis_blank_title_falls_back_to_sentinel() {
        let analysis = JobAnalysis::from_value(&json!({"job_title": "  "})).unwrap();
        assert_eq!(analysis.job_title, "Unknown");
    }

    #[test]
    fn test_analysis_malformed_requirement_is_error() {
        let err = JobAnalysis::from_value(&json!({
            "job_title": "Engineer",
            "requirements": [{"category": "x", "skill": "y", "importance": "sometimes"}]
        }))
        .unwrap_err();
        assert_eq!(err.kind(), "invalid_response");
    }

    #[test]
    fn test_prompt_carries_keyword_bounds() {
        let prompt = analysis_prompt("some description");
        assert!(prompt.contains("at least 5"));
        assert!(prompt.contains("no more than 50"));
    }
}
