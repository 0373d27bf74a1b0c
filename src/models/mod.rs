//! Data Models
//!
//! Application-level data structures. Interview domain types live in the
//! `interview-agent-core` crate.

pub mod settings;

pub use settings::*;
