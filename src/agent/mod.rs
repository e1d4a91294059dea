//! Agent Module
//!
//! The generate-validate-submit core: candidate parsing, prompt
//! assembly, and the per-cycle runtime that gates, generates, and
//! submits. When this runs, the herald is alive.

pub mod candidate;
pub mod prompts;
pub mod runtime;

pub use candidate::parse_candidate;
pub use runtime::{Agent, CycleReport, PostOutcome, ReplyOutcome};
