//! Researchbot answers research questions in three stages.
//!
//! 1. [`QueryGenerator`] turns the question into a web search query.
//! 2. [`EvidenceCollector`](research_search::EvidenceCollector) gathers
//!    deduplicated evidence from custom URLs, web search and news search.
//! 3. [`SynthesisEngine`] asks an LLM to answer from that evidence.
//!
//! [`Orchestrator`] runs the stages for one prompt or a list of prompts.

pub mod config;
pub mod error;
pub mod llm;
pub mod orchestrator;
pub mod query;
pub mod request;
pub mod sources;
pub mod synthesis;
pub mod web;

pub use config::ResearchConfig;
pub use error::{ResearchError, Result, Stage};
pub use orchestrator::{BatchOutcome, Orchestrator};
pub use query::QueryGenerator;
pub use request::{ResearchReport, ResearchRequest};
pub use sources::ListInputs;
pub use synthesis::SynthesisEngine;

pub use research_search::{Evidence, SourceKind};
