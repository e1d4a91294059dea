//! Herald Type Definitions
//!
//! Shared types for the posting agent: board domain objects, the parsed
//! generation candidate, configuration, and the collaborator traits the
//! orchestrator is written against.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::HeraldError;

// ─── Board Domain ────────────────────────────────────────────────

/// A post as the board returns it.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: String,
    pub author: String,
    #[serde(default)]
    pub upvotes: i64,
    #[serde(default)]
    pub comment_count: i64,
    pub created_at: String,
}

/// A comment on a post. `parent_id` is set for replies to other comments.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub post_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub author: String,
    pub content: String,
    pub created_at: String,
}

/// A single post together with its full comment tree (flat list, threaded
/// through `parent_id`).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostThread {
    pub post: Post,
    pub comments: Vec<Comment>,
}

/// The agent's own board profile.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub handle: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub karma: i64,
    pub created_at: String,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteDirection::Up => "up",
            VoteDirection::Down => "down",
        }
    }
}

// ─── Generation Candidate ────────────────────────────────────────

/// Structured fields extracted from free-text generation output.
///
/// `title` and `content` are mandatory; extraction fails without them.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParsedCandidate {
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

// ─── Configuration ───────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeraldConfig {
    /// Board API base URL.
    pub board_api_url: String,
    /// Bearer token for the board API.
    pub board_api_token: String,
    /// Generation provider name: "anthropic" or "openai".
    pub generation_provider: String,
    /// Generation API base URL. Empty means the provider default.
    pub generation_api_url: String,
    /// Generation API key. Empty means fall back to environment.
    pub generation_api_key: String,
    /// Model identifier. Empty means the provider default.
    pub generation_model: String,
    pub max_generation_tokens: u32,
    /// The voice the agent writes in, injected into every prompt.
    pub persona: String,
    /// Board category new posts are filed under.
    pub category: String,
    pub heartbeat_interval_secs: u64,
    pub post_cooldown_minutes: u64,
    pub comment_quota: u32,
    pub comment_window_minutes: u64,
    pub log_level: LogLevel,
    pub version: String,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for HeraldConfig {
    fn default() -> Self {
        default_config()
    }
}

/// Returns a default `HeraldConfig`. Credential fields default to empty
/// strings so callers can fill them from the config file or environment.
pub fn default_config() -> HeraldConfig {
    HeraldConfig {
        board_api_url: "https://api.boardhub.dev".to_string(),
        board_api_token: String::new(),
        generation_provider: "anthropic".to_string(),
        generation_api_url: String::new(),
        generation_api_key: String::new(),
        generation_model: String::new(),
        max_generation_tokens: 1024,
        persona: "A curious engineer who posts short, concrete observations."
            .to_string(),
        category: "general".to_string(),
        heartbeat_interval_secs: 900,
        post_cooldown_minutes: 240,
        comment_quota: 10,
        comment_window_minutes: 60,
        log_level: LogLevel::Info,
        version: "0.1.0".to_string(),
    }
}

// ─── Board Client Interface ──────────────────────────────────────

/// Typed facade over the board API. One method per domain operation;
/// implementations map HTTP-level failures to typed errors and leave all
/// retry decisions to the transport underneath.
#[async_trait]
pub trait BoardClient: Send + Sync {
    async fn list_trending(&self, limit: u32) -> Result<Vec<Post>, HeraldError>;
    async fn get_post(&self, id: &str) -> Result<PostThread, HeraldError>;
    async fn create_post(
        &self,
        category: &str,
        title: &str,
        content: &str,
    ) -> Result<Post, HeraldError>;
    async fn create_comment(
        &self,
        post_id: &str,
        content: &str,
    ) -> Result<Comment, HeraldError>;
    async fn vote(
        &self,
        target_id: &str,
        direction: VoteDirection,
    ) -> Result<(), HeraldError>;
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<Post>, HeraldError>;
    async fn get_own_profile(&self) -> Result<Profile, HeraldError>;
    async fn list_own_posts(&self, limit: u32) -> Result<Vec<Post>, HeraldError>;
}

// ─── Text Generator Interface ────────────────────────────────────

/// Capability interface every generation provider implements.
///
/// `prompt` is the user-level instruction; `context` is optional system
/// context. The provider normalizes its response envelope into one text
/// string.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        context: Option<&str>,
    ) -> Result<String, HeraldError>;

    /// Provider name for logs.
    fn name(&self) -> &str;
}

impl std::fmt::Debug for dyn TextGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextGenerator")
            .field("name", &self.name())
            .finish()
    }
}
