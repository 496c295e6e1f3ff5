//! Resume optimization against an analyzed job description.
//!
//! Combines the candidate profile with a [`JobAnalysis`] and a depth level,
//! asks the backend for a structured comparison, and returns a validated
//! [`ResumeOptimization`]. Scores outside `[0, 100]` are rejected at
//! construction rather than clamped, so backend misbehavior is visible
//! instead of silently masked.

use crate::analyzer::JobAnalysis;
use crate::client::InferenceClient;
use crate::types::Message;
use crate::{extract, Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

/// Requested depth of optimization suggestions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizationLevel {
    /// Quick keyword matching and formatting
    Basic,
    /// Detailed content optimization with ATS compliance
    #[default]
    Standard,
    /// Deep analysis with personalized suggestions
    Advanced,
}

impl OptimizationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptimizationLevel::Basic => "basic",
            OptimizationLevel::Standard => "standard",
            OptimizationLevel::Advanced => "advanced",
        }
    }
}

impl FromStr for OptimizationLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "basic" => Ok(OptimizationLevel::Basic),
            "standard" => Ok(OptimizationLevel::Standard),
            "advanced" => Ok(OptimizationLevel::Advanced),
            other => Err(format!(
                "optimization level must be basic|standard|advanced, got '{}'",
                other
            )),
        }
    }
}

/// Candidate profile data the optimizer reads.
///
/// Only the fields the optimizer actually consumes are typed; anything else
/// the platform stores on a profile passes through opaquely in `extra` and is
/// forwarded to the backend verbatim.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default)]
    pub projects: Vec<ProjectEntry>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One targeted content suggestion for a resume section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentImprovement {
    pub section: String,
    pub suggestion: String,
}

/// Optimization result with both scores validated into `[0, 100]`.
///
/// Deliberately not `Deserialize`: the only way in is through the validating
/// constructors, so an out-of-range score can never enter the type.
#[derive(Debug, Clone, Serialize)]
pub struct ResumeOptimization {
    match_score: f64,
    pub missing_skills: Vec<String>,
    pub matching_skills: Vec<String>,
    pub keyword_suggestions: Vec<String>,
    pub content_improvements: Vec<ContentImprovement>,
    pub formatting_suggestions: Vec<String>,
    ats_compatibility_score: f64,
}

impl ResumeOptimization {
    /// Construct with score-bound enforcement. Out-of-range scores are
    /// rejected, never clamped.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        match_score: f64,
        missing_skills: Vec<String>,
        matching_skills: Vec<String>,
        keyword_suggestions: Vec<String>,
        content_improvements: Vec<ContentImprovement>,
        formatting_suggestions: Vec<String>,
        ats_compatibility_score: f64,
    ) -> Result<Self> {
        check_score("match_score", match_score)?;
        check_score("ats_compatibility_score", ats_compatibility_score)?;
        Ok(Self {
            match_score,
            missing_skills,
            matching_skills,
            keyword_suggestions,
            content_improvements,
            formatting_suggestions,
            ats_compatibility_score,
        })
    }

    /// Map from extracted backend JSON, failing on missing or out-of-range
    /// scores and defaulting omitted suggestion lists to empty.
    pub fn from_value(value: &serde_json::Value) -> Result<Self> {
        let match_score = score_field(value, "match_score")?;
        let ats_compatibility_score = score_field(value, "ats_compatibility_score")?;
        let content_improvements = value
            .get("content_improvements")
            .and_then(|v| v.as_array())
            .into_iter()
            .flatten()
            .filter_map(|entry| {
                let section = entry.get("section")?.as_str()?;
                let suggestion = entry.get("suggestion")?.as_str()?;
                Some(ContentImprovement {
                    section: section.to_string(),
                    suggestion: suggestion.to_string(),
                })
            })
            .collect();
        Self::new(
            match_score,
            string_list(value, "missing_skills"),
            string_list(value, "matching_skills"),
            string_list(value, "keyword_suggestions"),
            content_improvements,
            string_list(value, "formatting_suggestions"),
            ats_compatibility_score,
        )
    }

    pub fn match_score(&self) -> f64 {
        self.match_score
    }

    pub fn ats_compatibility_score(&self) -> f64 {
        self.ats_compatibility_score
    }
}

fn check_score(name: &str, score: f64) -> Result<()> {
    if !(0.0..=100.0).contains(&score) {
        return Err(Error::invalid_response(
            format!("{} {} is outside the 0-100 range", name, score),
            ErrorContext::new().with_source("resume_optimizer"),
        ));
    }
    Ok(())
}

fn score_field(value: &serde_json::Value, key: &str) -> Result<f64> {
    value.get(key).and_then(|v| v.as_f64()).ok_or_else(|| {
        Error::invalid_response(
            format!("{} is missing or not a number", key),
            ErrorContext::new().with_source("resume_optimizer"),
        )
    })
}

fn string_list(value: &serde_json::Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(|v| v.as_array())
        .into_iter()
        .flatten()
        .filter_map(|v| v.as_str())
        .map(str::to_string)
        .collect()
}

/// Optimizer combining a candidate profile with an analyzed job.
pub struct ResumeOptimizer {
    client: Arc<InferenceClient>,
}

impl ResumeOptimizer {
    pub fn new(client: Arc<InferenceClient>) -> Self {
        Self { client }
    }

    /// Produce optimization suggestions for a profile against a job analysis.
    ///
    /// Callers handle exactly one error type here: any stage failure is
    /// wrapped into [`Error::OptimizationFailed`] with the cause preserved.
    pub async fn optimize(
        &self,
        profile: &CandidateProfile,
        analysis: &JobAnalysis,
        level: OptimizationLevel,
    ) -> Result<ResumeOptimization> {
        info!(
            job_title = analysis.job_title.as_str(),
            level = level.as_str(),
            "optimizing resume content"
        );

        let optimization = self
            .optimize_inner(profile, analysis, level)
            .await
            .map_err(|e| Error::optimization_failed("could not optimize resume content", e))?;

        info!(
            match_score = optimization.match_score(),
            ats_score = optimization.ats_compatibility_score(),
            missing_skills = optimization.missing_skills.len(),
            "resume optimization complete"
        );
        Ok(optimization)
    }

    async fn optimize_inner(
        &self,
        profile: &CandidateProfile,
        analysis: &JobAnalysis,
        level: OptimizationLevel,
    ) -> Result<ResumeOptimization> {
        let prompt = optimization_prompt(profile, analysis, level)?;
        let messages = [
            Message::system(
                "You are an expert resume optimization advisor. Always respond with valid JSON.",
            ),
            Message::user(prompt),
        ];

        let response = self.client.send(&messages, None).await?;
        let content = response.content()?;
        let value = extract::json_object(content)?;
        ResumeOptimization::from_value(&value)
    }
}

fn optimization_prompt(
    profile: &CandidateProfile,
    analysis: &JobAnalysis,
    level: OptimizationLevel,
) -> Result<String> {
    let profile_json = serde_json::to_string_pretty(profile).map_err(|e| {
        Error::invalid_response(
            "candidate profile could not be serialized",
            ErrorContext::new()
                .with_source("resume_optimizer")
                .with_details(e.to_string()),
        )
    })?;
    let skills: Vec<&str> = analysis.skills.iter().map(String::as_str).collect();

    Ok(format!(
        r#"Analyze the user's profile against the job requirements and provide optimization suggestions.

Job Title: {job_title}
Required Skills: {skills}
Keywords: {keywords}

User Profile:
{profile_json}

Optimization Level: {level}

Provide a JSON response with:
{{
  "match_score": 0-100,
  "missing_skills": ["skill1", "skill2"],
  "matching_skills": ["skill1", "skill2"],
  "keyword_suggestions": ["keyword1", "keyword2"],
  "content_improvements": [
    {{"section": "section name", "suggestion": "specific improvement"}}
  ],
  "formatting_suggestions": ["suggestion1", "suggestion2"],
  "ats_compatibility_score": 0-100
}}"#,
        job_title = analysis.job_title,
        skills = skills.join(", "),
        keywords = analysis.keywords.join(", "),
        level = level.as_str(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_lists() -> (Vec<String>, Vec<String>) {
        (vec!["Go".to_string()], vec!["Rust".to_string()])
    }

    #[test]
    fn test_scores_accepted_at_boundaries() {
        let (missing, matching) = sample_lists();
        for score in [0.0, 50.0, 100.0] {
            let opt = ResumeOptimization::new(
                score,
                missing.clone(),
                matching.clone(),
                vec![],
                vec![],
                vec![],
                score,
            )
            .unwrap();
            assert_eq!(opt.match_score(), score);
        }
    }

    #[test]
    fn test_out_of_range_scores_rejected() {
        let (missing, matching) = sample_lists();
        for score in [150.0, -10.0, 100.01] {
            let err = ResumeOptimization::new(
                score,
                missing.clone(),
                matching.clone(),
                vec![],
                vec![],
                vec![],
                50.0,
            )
            .unwrap_err();
            assert_eq!(err.kind(), "invalid_response");
        }
    }

    #[test]
    fn test_ats_score_validated_independently() {
        let err =
            ResumeOptimization::new(50.0, vec![], vec![], vec![], vec![], vec![], 101.0)
                .unwrap_err();
        assert!(err.to_string().contains("ats_compatibility_score"));
    }

    #[test]
    fn test_from_value_full_payload() {
        let opt = ResumeOptimization::from_value(&json!({
            "match_score": 72.5,
            "missing_skills": ["Kubernetes"],
            "matching_skills": ["Rust", "Tokio"],
            "keyword_suggestions": ["distributed systems"],
            "content_improvements": [
                {"section": "experience", "suggestion": "Quantify throughput gains"}
            ],
            "formatting_suggestions": ["Use bullet points"],
            "ats_compatibility_score": 88.0
        }))
        .unwrap();

        assert_eq!(opt.match_score(), 72.5);
        assert_eq!(opt.matching_skills.len(), 2);
        assert_eq!(opt.content_improvements[0].section, "experience");
    }

    #[test]
    fn test_from_value_missing_score_fails() {
        let err = ResumeOptimization::from_value(&json!({
            "match_score": 50.0
        }))
        .unwrap_err();
        assert!(err.to_string().contains("ats_compatibility_score"));
    }

    #[test]
    fn test_from_value_defaults_suggestion_lists() {
        let opt = ResumeOptimization::from_value(&json!({
            "match_score": 10.0,
            "ats_compatibility_score": 20.0
        }))
        .unwrap();
        assert!(opt.missing_skills.is_empty());
        assert!(opt.content_improvements.is_empty());
    }

    #[test]
    fn test_optimization_level_round_trip() {
        assert_eq!(
            OptimizationLevel::from_str("ADVANCED").unwrap(),
            OptimizationLevel::Advanced
        );
        assert_eq!(OptimizationLevel::default(), OptimizationLevel::Standard);
        assert!(OptimizationLevel::from_str("extreme").is_err());
    }

    #[test]
    fn test_profile_extra_fields_pass_through() {
        let profile: CandidateProfile = serde_json::from_value(json!({
            "skills": ["Rust"],
            "certifications": ["AWS SAA"]
        }))
        .unwrap();

        let round_tripped = serde_json::to_value(&profile).unwrap();
        assert_eq!(round_tripped["certifications"][0], "AWS SAA");
    }

    #[test]
    fn test_prompt_includes_job_and_level() {
        let analysis = JobAnalysis::from_value(&json!({
            "job_title": "Platform Engineer",
            "skills": ["Rust", "Kubernetes"],
            "keywords": ["infrastructure"]
        }))
        .unwrap();
        let prompt = optimization_prompt(
            &CandidateProfile::default(),
            &analysis,
            OptimizationLevel::Advanced,
        )
        .unwrap();

        assert!(prompt.contains("Platform Engineer"));
        assert!(prompt.contains("Kubernetes, Rust"));
        assert!(prompt.contains("Optimization Level: advanced"));
    }
}
