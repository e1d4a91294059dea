//! Herald -- Autonomous Board-Posting Agent
//!
//! A periodic agent that generates posts with a remote text-generation
//! API, gates itself with rate limits and duplicate detection, and
//! publishes to a remote content board.

pub mod types;
pub mod error;
pub mod config;
pub mod transport;
pub mod board;
pub mod generation;
pub mod scheduler;
pub mod agent;
pub mod heartbeat;
