//! Resume Structuring
//!
//! Turns extracted resume text into a [`ResumeProfile`]. A backend call does
//! the structuring when one is configured; a keyword and regex scan covers
//! every case where it is missing or fails, so parsing never errors once the
//! file itself has been accepted.

use std::path::Path;
use std::sync::{Arc, OnceLock};

use interview_agent_core::{ContactInfo, ResumeProfile};
use interview_agent_llm::{LlmProvider, LlmRequestOptions, Message};
use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use super::extract::{extract_text, validate_resume_file};
use crate::utils::error::{AppError, AppResult};

/// Characters of resume text sent to the backend
const PROMPT_TEXT_LIMIT: usize = 3000;

/// Most skills reported by the keyword scan
const MAX_FALLBACK_SKILLS: usize = 15;

const SKILL_KEYWORDS: &[&str] = &[
    "Python",
    "Java",
    "JavaScript",
    "C++",
    "SQL",
    "Django",
    "React",
    "AWS",
    "Docker",
    "Machine Learning",
    "AI",
    "Data Science",
    "HTML",
    "CSS",
    "Node.js",
    "MongoDB",
    "PostgreSQL",
    "Git",
    "Agile",
    "Scrum",
    "Leadership",
    "Communication",
    "Problem Solving",
];

const NOT_AVAILABLE: &str = "N/A";

/// Resume parsing collaborator
#[derive(Clone)]
pub struct ResumeParser {
    backend: Option<Arc<dyn LlmProvider>>,
    max_tokens: u32,
}

impl ResumeParser {
    pub fn new(backend: Option<Arc<dyn LlmProvider>>, max_tokens: u32) -> Self {
        Self {
            backend,
            max_tokens,
        }
    }

    /// Parser that never calls a backend
    pub fn offline() -> Self {
        Self::new(None, 0)
    }

    /// Validate, extract and structure the resume at `path`.
    ///
    /// Only an unsupported or oversized file is an error. Unreadable contents
    /// degrade to the fallback profile.
    pub async fn parse_file(&self, path: &Path) -> AppResult<ResumeProfile> {
        let format = validate_resume_file(path)?;

        let owned = path.to_path_buf();
        let extracted = tokio::task::spawn_blocking(move || extract_text(&owned, format))
            .await
            .map_err(|e| AppError::internal(format!("resume extraction task failed: {}", e)))?;

        let text = match extracted {
            Ok(text) => text,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "resume text extraction failed");
                String::new()
            }
        };

        Ok(self.structure(&text).await)
    }

    /// Structure already extracted text.
    pub async fn structure(&self, text: &str) -> ResumeProfile {
        let backend = match &self.backend {
            Some(backend) if !text.trim().is_empty() => backend,
            _ => return fallback_profile(text),
        };

        let options = LlmRequestOptions::with_max_tokens(self.max_tokens);
        let prompt = structuring_prompt(text);
        match backend.complete("", vec![Message::user(prompt)], options).await {
            Ok(reply) => match profile_from_reply(&reply) {
                Some(profile) => {
                    debug!(skills = profile.skills.len(), "resume structured by backend");
                    profile
                }
                None => {
                    warn!("resume structuring reply was not valid JSON, using keyword scan");
                    fallback_profile(text)
                }
            },
            Err(e) => {
                warn!(error = %e, "resume structuring failed, using keyword scan");
                fallback_profile(text)
            }
        }
    }
}

fn structuring_prompt(text: &str) -> String {
    let excerpt: String = text.chars().take(PROMPT_TEXT_LIMIT).collect();
    format!(
        r#"Analyze this resume and extract structured information in JSON format.

RESUME TEXT:
{excerpt}

Please extract and return ONLY a JSON object with these fields:
{{
    "skills": ["skill1", "skill2"],
    "experience_summary": "Brief summary of work experience",
    "education": "Highest degree and institution",
    "years_of_experience": 0,
    "current_role": "Most recent job title",
    "key_projects": ["project1", "project2"],
    "certifications": ["cert1", "cert2"],
    "languages": ["language1", "language2"]
}}

Be thorough but concise. Return only the JSON, no other text."#
    )
}

/// Parse the first `{` .. last `}` span of a structuring reply.
fn profile_from_reply(raw: &str) -> Option<ResumeProfile> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end <= start {
        return None;
    }

    let mut value: Value = serde_json::from_str(&raw[start..=end]).ok()?;
    let object = value.as_object_mut()?;

    // Nulls would defeat the field defaults
    object.retain(|_, v| !v.is_null());
    if let Some(years) = object.get("years_of_experience").map(coerce_years) {
        object.insert("years_of_experience".to_string(), Value::from(years));
    }

    serde_json::from_value(value).ok()
}

/// Accept 4, 4.5, "4" and "4+ years".
fn coerce_years(value: &Value) -> u32 {
    match value {
        Value::Number(n) => n
            .as_u64()
            .map(|v| v.min(u32::MAX as u64) as u32)
            .or_else(|| n.as_f64().map(|f| f.max(0.0).floor() as u32))
            .unwrap_or(0),
        Value::String(s) => s
            .trim()
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect::<String>()
            .parse()
            .unwrap_or(0),
        _ => 0,
    }
}

fn email_regex() -> Option<&'static Regex> {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").ok())
        .as_ref()
}

fn phone_regex() -> Option<&'static Regex> {
    static PHONE: OnceLock<Option<Regex>> = OnceLock::new();
    PHONE
        .get_or_init(|| Regex::new(r"\b\d{3}[-.]?\d{3}[-.]?\d{4}\b").ok())
        .as_ref()
}

/// Keyword and regex scan used whenever the backend cannot structure the text.
pub fn fallback_profile(text: &str) -> ResumeProfile {
    let lower = text.to_lowercase();
    let skills = SKILL_KEYWORDS
        .iter()
        .filter(|skill| contains_term(&lower, &skill.to_lowercase()))
        .take(MAX_FALLBACK_SKILLS)
        .map(|skill| skill.to_string())
        .collect();

    let find = |re: Option<&Regex>| {
        re.and_then(|re| re.find(text))
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    };

    ResumeProfile {
        skills,
        experience_summary: "Experience details found in resume".to_string(),
        education: "Education details found in resume".to_string(),
        years_of_experience: 0,
        current_role: NOT_AVAILABLE.to_string(),
        key_projects: Vec::new(),
        certifications: Vec::new(),
        languages: vec!["English".to_string()],
        contact: Some(ContactInfo {
            email: find(email_regex()),
            phone: find(phone_regex()),
        }),
    }
}

/// Occurrence of `term` not embedded in a longer word ("AI" must not match "email").
fn contains_term(haystack: &str, term: &str) -> bool {
    haystack.match_indices(term).any(|(idx, _)| {
        let before = haystack[..idx].chars().next_back();
        let after = haystack[idx + term.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}
