//! Resume Parsing
//!
//! Extracts text from PDF and DOCX resumes and structures it into a
//! [`interview_agent_core::ResumeProfile`].

pub mod extract;
pub mod parser;

pub use extract::{validate_resume_file, ResumeFormat, MAX_RESUME_SIZE};
pub use parser::{fallback_profile, ResumeParser};
