//! Interview Session Persistence
//!
//! Sessions are keyed by token. Scored questions and cheating events live in
//! their own tables, ordered by `asked_at` and `timestamp` respectively. The
//! session row keeps the conversation history, agent state and the inline
//! cheating mirror as JSON columns.
//!
//! Writes that touch more than one table run in a single transaction so the
//! cheating counter, the inline mirror and the event rows never disagree.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use interview_agent_core::{
    CheatingEvent, CoreError, InterviewSession, Question, SessionStatus,
};
use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension, Row};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::storage::database::Database;
use crate::utils::error::{AppError, AppResult};

const SESSION_COLUMNS: &str = "token, candidate_name, candidate_email, candidate_phone,
    resume_path, parsed_resume_data, status, current_stage, conversation_history,
    agent_state, cheating_score, cheating_events, score, technical_score,
    communication_score, evaluation_report, camera_enabled, microphone_enabled,
    created_at, started_at, completed_at";

/// SQLite-backed store for interview sessions and their child records
#[derive(Clone)]
pub struct SessionStore {
    db: Database,
}

impl SessionStore {
    /// Create a store over `db`, making sure the schema exists.
    pub fn new(db: Database) -> AppResult<Self> {
        let store = Self { db };
        store.init_schema()?;
        Ok(store)
    }

    /// Create the interview tables (idempotent)
    pub fn init_schema(&self) -> AppResult<()> {
        let conn = self.db.get_connection()?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS interview_sessions (
                token TEXT PRIMARY KEY,
                candidate_name TEXT NOT NULL,
                candidate_email TEXT NOT NULL,
                candidate_phone TEXT,
                resume_path TEXT,
                parsed_resume_data TEXT,
                status TEXT NOT NULL DEFAULT 'CREATED',
                current_stage TEXT NOT NULL DEFAULT 'greeting',
                conversation_history TEXT NOT NULL DEFAULT '[]',
                agent_state TEXT NOT NULL DEFAULT '{}',
                cheating_score INTEGER NOT NULL DEFAULT 0,
                cheating_events TEXT NOT NULL DEFAULT '[]',
                score REAL,
                technical_score REAL,
                communication_score REAL,
                evaluation_report TEXT,
                camera_enabled INTEGER NOT NULL DEFAULT 0,
                microphone_enabled INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                started_at TEXT,
                completed_at TEXT
            );

            CREATE TABLE IF NOT EXISTS interview_questions (
                id TEXT PRIMARY KEY,
                session_token TEXT NOT NULL,
                question_text TEXT NOT NULL,
                category TEXT NOT NULL,
                asked_at TEXT NOT NULL,
                answer_text TEXT NOT NULL DEFAULT '',
                received_at TEXT NOT NULL,
                score REAL,
                feedback TEXT,
                FOREIGN KEY (session_token) REFERENCES interview_sessions(token) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS cheating_events (
                id TEXT PRIMARY KEY,
                session_token TEXT NOT NULL,
                event_type TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                metadata TEXT NOT NULL DEFAULT '{}',
                FOREIGN KEY (session_token) REFERENCES interview_sessions(token) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_interview_sessions_status
                ON interview_sessions(status);
            CREATE INDEX IF NOT EXISTS idx_interview_questions_session
                ON interview_questions(session_token, asked_at);
            CREATE INDEX IF NOT EXISTS idx_cheating_events_session
                ON cheating_events(session_token, timestamp);",
        )?;

        Ok(())
    }

    // ========================================================================
    // Session operations
    // ========================================================================

    /// Insert a new session row
    pub fn create_session(&self, session: &InterviewSession) -> AppResult<()> {
        let conn = self.db.get_connection()?;

        conn.execute(
            &format!(
                "INSERT INTO interview_sessions ({}) VALUES
                 (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21)",
                SESSION_COLUMNS
            ),
            params![
                session.token,
                session.candidate_name,
                session.candidate_email,
                session.candidate_phone,
                session.resume_path,
                to_json_opt(&session.parsed_resume_data)?,
                session.status.as_str(),
                session.current_stage.as_str(),
                to_json(&session.conversation_history)?,
                to_json(&session.agent_state)?,
                session.cheating_score,
                to_json(&session.cheating_events)?,
                session.score,
                session.technical_score,
                session.communication_score,
                session.evaluation_report,
                session.camera_enabled,
                session.microphone_enabled,
                session.created_at,
                session.started_at,
                session.completed_at,
            ],
        )
        .map_err(|e| match e {
            rusqlite::Error::SqliteFailure(err, _)
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                AppError::validation(format!("session {} already exists", session.token))
            }
            other => AppError::from(other),
        })?;

        Ok(())
    }

    /// Get a session by token
    pub fn get_session(&self, token: &str) -> AppResult<Option<InterviewSession>> {
        let conn = self.db.get_connection()?;

        let session = conn
            .query_row(
                &format!("SELECT {} FROM interview_sessions WHERE token = ?1", SESSION_COLUMNS),
                params![token],
                row_to_session,
            )
            .optional()?;

        Ok(session)
    }

    /// Get a session by token, failing with `NotFound` when it does not exist
    pub fn require_session(&self, token: &str) -> AppResult<InterviewSession> {
        self.get_session(token)?
            .ok_or_else(|| AppError::not_found(format!("interview session {}", token)))
    }

    /// List sessions, newest first, optionally filtered by status
    pub fn list_sessions(&self, status: Option<SessionStatus>) -> AppResult<Vec<InterviewSession>> {
        let conn = self.db.get_connection()?;

        let sessions = match status {
            Some(status) => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM interview_sessions WHERE status = ?1 ORDER BY created_at DESC",
                    SESSION_COLUMNS
                ))?;
                let rows = stmt.query_map(params![status.as_str()], row_to_session)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            }
            None => {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM interview_sessions ORDER BY created_at DESC",
                    SESSION_COLUMNS
                ))?;
                let rows = stmt.query_map([], row_to_session)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()?
            }
        };

        Ok(sessions)
    }

    /// Overwrite the mutable columns of an existing session
    pub fn save_session(&self, session: &InterviewSession) -> AppResult<()> {
        let conn = self.db.get_connection()?;
        update_session_row(&conn, session)
    }

    /// Delete a session together with its questions and cheating events.
    /// Returns false when no such session existed.
    pub fn delete_session(&self, token: &str) -> AppResult<bool> {
        let mut conn = self.db.get_connection()?;
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM interview_questions WHERE session_token = ?1", params![token])?;
        tx.execute("DELETE FROM cheating_events WHERE session_token = ?1", params![token])?;
        let deleted = tx.execute("DELETE FROM interview_sessions WHERE token = ?1", params![token])?;

        tx.commit()?;
        Ok(deleted > 0)
    }

    // ========================================================================
    // Transactional writes
    // ========================================================================

    /// Persist the outcome of one conversational turn: the session row and,
    /// when an answer was scored, its question row.
    pub fn commit_turn(&self, session: &InterviewSession, question: Option<&Question>) -> AppResult<()> {
        let mut conn = self.db.get_connection()?;
        let tx = conn.transaction()?;

        update_session_row(&tx, session)?;
        if let Some(question) = question {
            insert_question(&tx, question)?;
        }

        tx.commit()?;
        Ok(())
    }

    /// Persist a cheating event row and the session's updated counter and
    /// inline mirror atomically.
    pub fn commit_cheating_event(&self, session: &InterviewSession, event: &CheatingEvent) -> AppResult<()> {
        let mut conn = self.db.get_connection()?;
        let tx = conn.transaction()?;

        update_session_row(&tx, session)?;
        tx.execute(
            "INSERT INTO cheating_events (id, session_token, event_type, timestamp, metadata)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                event.id,
                session.token,
                event.event_type.as_str(),
                event.timestamp,
                to_json(&event.metadata)?,
            ],
        )?;

        tx.commit()?;
        Ok(())
    }

    // ========================================================================
    // Child records
    // ========================================================================

    /// Scored questions for a session, ordered by `asked_at`
    pub fn get_questions(&self, token: &str) -> AppResult<Vec<Question>> {
        let conn = self.db.get_connection()?;

        let mut stmt = conn.prepare(
            "SELECT id, session_token, question_text, category, asked_at, answer_text,
             received_at, score, feedback
             FROM interview_questions WHERE session_token = ?1
             ORDER BY asked_at ASC, received_at ASC",
        )?;

        let questions = stmt
            .query_map(params![token], |row| {
                Ok(Question {
                    id: row.get(0)?,
                    session_token: row.get(1)?,
                    question_text: row.get(2)?,
                    category: parsed_column(row, 3)?,
                    asked_at: row.get(4)?,
                    answer_text: row.get(5)?,
                    received_at: row.get(6)?,
                    score: row.get(7)?,
                    feedback: row.get(8)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(questions)
    }

    /// Cheating events for a session, ordered by timestamp
    pub fn get_cheating_events(&self, token: &str) -> AppResult<Vec<CheatingEvent>> {
        let conn = self.db.get_connection()?;

        let mut stmt = conn.prepare(
            "SELECT id, event_type, timestamp, metadata
             FROM cheating_events WHERE session_token = ?1
             ORDER BY timestamp ASC, rowid ASC",
        )?;

        let events = stmt
            .query_map(params![token], |row| {
                Ok(CheatingEvent {
                    id: row.get(0)?,
                    event_type: parsed_column(row, 1)?,
                    timestamp: row.get::<_, DateTime<Utc>>(2)?,
                    metadata: json_column(row, 3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(events)
    }

    /// Number of cheating event rows for a session
    pub fn count_cheating_events(&self, token: &str) -> AppResult<u32> {
        let conn = self.db.get_connection()?;

        let count: u32 = conn.query_row(
            "SELECT COUNT(*) FROM cheating_events WHERE session_token = ?1",
            params![token],
            |row| row.get(0),
        )?;

        Ok(count)
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").finish()
    }
}

fn update_session_row(conn: &rusqlite::Connection, session: &InterviewSession) -> AppResult<()> {
    let updated = conn.execute(
        "UPDATE interview_sessions SET
            candidate_name = ?2, candidate_email = ?3, candidate_phone = ?4,
            resume_path = ?5, parsed_resume_data = ?6, status = ?7, current_stage = ?8,
            conversation_history = ?9, agent_state = ?10, cheating_score = ?11,
            cheating_events = ?12, score = ?13, technical_score = ?14,
            communication_score = ?15, evaluation_report = ?16, camera_enabled = ?17,
            microphone_enabled = ?18, started_at = ?19, completed_at = ?20
         WHERE token = ?1",
        params![
            session.token,
            session.candidate_name,
            session.candidate_email,
            session.candidate_phone,
            session.resume_path,
            to_json_opt(&session.parsed_resume_data)?,
            session.status.as_str(),
            session.current_stage.as_str(),
            to_json(&session.conversation_history)?,
            to_json(&session.agent_state)?,
            session.cheating_score,
            to_json(&session.cheating_events)?,
            session.score,
            session.technical_score,
            session.communication_score,
            session.evaluation_report,
            session.camera_enabled,
            session.microphone_enabled,
            session.started_at,
            session.completed_at,
        ],
    )?;

    if updated == 0 {
        return Err(AppError::not_found(format!("interview session {}", session.token)));
    }
    Ok(())
}

fn insert_question(conn: &rusqlite::Connection, question: &Question) -> AppResult<()> {
    conn.execute(
        "INSERT INTO interview_questions (id, session_token, question_text, category, asked_at,
         answer_text, received_at, score, feedback)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            question.id,
            question.session_token,
            question.question_text,
            question.category.as_str(),
            question.asked_at,
            question.answer_text,
            question.received_at,
            question.score,
            question.feedback,
        ],
    )?;
    Ok(())
}

fn row_to_session(row: &Row) -> rusqlite::Result<InterviewSession> {
    let parsed_resume: Option<String> = row.get(5)?;
    let parsed_resume_data = match parsed_resume {
        Some(raw) => Some(
            serde_json::from_str(&raw)
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?,
        ),
        None => None,
    };

    Ok(InterviewSession {
        token: row.get(0)?,
        candidate_name: row.get(1)?,
        candidate_email: row.get(2)?,
        candidate_phone: row.get(3)?,
        resume_path: row.get(4)?,
        parsed_resume_data,
        status: parsed_column(row, 6)?,
        current_stage: parsed_column(row, 7)?,
        conversation_history: json_column(row, 8)?,
        agent_state: json_column(row, 9)?,
        cheating_score: row.get(10)?,
        cheating_events: json_column(row, 11)?,
        score: row.get(12)?,
        technical_score: row.get(13)?,
        communication_score: row.get(14)?,
        evaluation_report: row.get(15)?,
        camera_enabled: row.get(16)?,
        microphone_enabled: row.get(17)?,
        created_at: row.get(18)?,
        started_at: row.get(19)?,
        completed_at: row.get(20)?,
    })
}

/// Decode a JSON text column.
fn json_column<T: DeserializeOwned>(row: &Row, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Decode a text column holding an enum label.
fn parsed_column<T>(row: &Row, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = CoreError>,
{
    let raw: String = row.get(idx)?;
    raw.parse::<T>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn to_json<T: Serialize>(value: &T) -> AppResult<String> {
    Ok(serde_json::to_string(value)?)
}

fn to_json_opt<T: Serialize>(value: &Option<T>) -> AppResult<Option<String>> {
    value.as_ref().map(to_json).transpose()
}
