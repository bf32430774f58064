//! Retrieval-augmented analytics over software-engineering telemetry.
//!
//! Free-text questions about commits, pull requests, issues, CI/CD and code
//! quality are classified, enriched with similarity-searched context,
//! answered by an LLM, and parsed into chart-or-text shaped results with
//! bounded per-session conversational memory.

pub mod api;
pub mod config;
pub mod error;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod retrieval;
pub mod services;
pub mod session;
