//! Heartbeat Module
//!
//! Fixed-interval daemon that drives the agent's cycles while the
//! process stays up.

pub mod daemon;

pub use daemon::{create_heartbeat_daemon, HeartbeatDaemon};
