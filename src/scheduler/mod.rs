//! Scheduler Module
//!
//! Rate-limit gating and duplicate-title tracking for the agent.
//! Every decision is a pure in-memory computation over agent state;
//! nothing here blocks or touches the network.

pub mod fingerprint;
pub mod gate;

pub use fingerprint::title_fingerprint;
pub use gate::{RateLimitPolicy, Scheduler};
