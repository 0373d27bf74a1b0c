//! Structured resume data attached to a session.

use serde::{Deserialize, Serialize};

/// Contact details found in the resume
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

/// Normalized output of the resume parsing collaborator
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResumeProfile {
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience_summary: String,
    #[serde(default)]
    pub education: String,
    #[serde(default)]
    pub years_of_experience: u32,
    #[serde(default)]
    pub current_role: String,
    #[serde(default)]
    pub key_projects: Vec<String>,
    #[serde(default)]
    pub certifications: Vec<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<ContactInfo>,
}
