//! Resume Attachment Integration Tests

use std::io::Write;
use std::sync::Arc;

use serde_json::json;

use interview_agent::services::resume::ResumeParser;
use interview_agent::AppError;

use crate::support::{create_agent, MockLlmProvider};

fn write_docx(dir: &std::path::Path, paragraphs: &[&str]) -> std::path::PathBuf {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", p))
        .collect();
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
        body
    );

    let path = dir.join("resume.docx");
    let file = std::fs::File::create(&path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    zip.start_file("word/document.xml", zip::write::SimpleFileOptions::default())
        .unwrap();
    zip.write_all(xml.as_bytes()).unwrap();
    zip.finish().unwrap();
    path
}

#[tokio::test]
async fn test_attach_resume_uses_backend_structuring() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_docx(dir.path(), &["Ada Lovelace", "Rust, SQL, Docker", "8 years"]);

    let mock = Arc::new(MockLlmProvider::new(vec![]));
    let agent = create_agent(mock.clone());
    let session = agent
        .create_session("Ada Lovelace", "ada@example.com", None)
        .await
        .unwrap();

    mock.push_text(
        &json!({
            "skills": ["Rust", "SQL", "Docker"],
            "experience_summary": "Eight years of systems work",
            "education": "BSc Mathematics",
            "years_of_experience": 8,
            "current_role": "Staff Engineer"
        })
        .to_string(),
    );
    let profile = agent.attach_resume(&session.token, &path).await.unwrap();
    assert_eq!(profile.years_of_experience, 8);

    let request = mock.last_request();
    assert!(request.messages[0].content.contains("Rust, SQL, Docker"));
    assert!(request.system.is_none());

    let stored = agent.get_session(&session.token).unwrap();
    assert_eq!(stored.parsed_resume_data, Some(profile));
    assert!(stored.resume_path.unwrap().ends_with("resume.docx"));

    // The resume now shapes the interview prompt
    mock.push_text(r#"{"message": "Tell me about your Rust work.", "stage": "personal"}"#);
    agent.start(&session.token, true, true).await.unwrap();
    let system = mock.last_request().system.unwrap();
    assert!(system.contains("CANDIDATE RESUME SUMMARY:"));
    assert!(system.contains("- Skills: Rust, SQL, Docker"));
    assert!(system.contains("- Current role: Staff Engineer"));
}

#[tokio::test]
async fn test_attach_resume_falls_back_without_backend() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_docx(dir.path(), &["Contact: ada@example.com 555.123.4567", "Python and Git"]);

    let mock = Arc::new(MockLlmProvider::new(vec![]));
    let agent = create_agent(mock.clone()).with_resume_parser(ResumeParser::offline());
    let session = agent
        .create_session("Ada", "ada@example.com", None)
        .await
        .unwrap();

    let profile = agent.attach_resume(&session.token, &path).await.unwrap();
    assert_eq!(profile.skills, vec!["Python", "Git"]);
    let contact = profile.contact.unwrap();
    assert_eq!(contact.email, "ada@example.com");
    assert_eq!(contact.phone, "555.123.4567");
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_attach_resume_rejects_unsupported_format() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("resume.txt");
    std::fs::write(&path, "plain text").unwrap();

    let mock = Arc::new(MockLlmProvider::new(vec![]));
    let agent = create_agent(mock);
    let session = agent
        .create_session("Ada", "ada@example.com", None)
        .await
        .unwrap();

    let err = agent.attach_resume(&session.token, &path).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert!(agent
        .get_session(&session.token)
        .unwrap()
        .parsed_resume_data
        .is_none());
}
