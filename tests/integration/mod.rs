//! Integration Tests Module
//!
//! End-to-end tests for the interview agent against an in-memory database
//! and a scripted LLM backend.

// Scripted backend and fixtures
mod support;

// Conversation turns, scoring and stage transitions
mod agent_test;

// Cheating event log and termination
mod cheating_test;



// Resume attachment
mod resume_test;

// Terminal command handlers
mod cli_test;
