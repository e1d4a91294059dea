//! Board Module
//!
//! Typed client for the remote content board: trending feeds, posts,
//! comments, votes, search, and the agent's own profile.

pub mod client;

pub use client::BoardHttpClient;
