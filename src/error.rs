//! Error Taxonomy
//!
//! Typed failures for the transport, board, and generation layers.
//! Control states (cooldown, quota) are not errors and live in the
//! cycle outcome enums instead.

use thiserror::Error;

/// Structured error hierarchy for herald.
///
/// The transport and the two API clients return these directly so callers
/// can match on them to pick a recovery strategy; orchestration code wraps
/// them in `anyhow` context chains at the boundary.
#[derive(Debug, Error)]
pub enum HeraldError {
    /// Network-level failure that survived every retry attempt.
    #[error("transport exhausted after {attempts} attempts: {source}")]
    TransportExhausted {
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },

    /// The board answered with an application-level error status.
    #[error("board api error ({status}): {body}")]
    BoardApi { status: u16, body: String },

    /// The generation provider answered with an error status or an
    /// envelope missing the expected text field.
    #[error("generation api error ({status}): {body}")]
    GenerationApi { status: u16, body: String },

    /// A response body did not match the shape the client expected.
    /// Indicates a collaborator-contract violation, never retried.
    #[error("failed to decode {what}: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Generation output was missing a mandatory labeled section.
    #[error("candidate parse failed: {0}")]
    Parse(String),
}

/// Whether a submission failure is the board rejecting a duplicate.
///
/// The board reports duplicates as a plain application error; the only
/// contract is that the body mentions the word "duplicate". Such failures
/// are worth another generation attempt, anything else is not.
pub fn is_duplicate_rejection(err: &HeraldError) -> bool {
    match err {
        HeraldError::BoardApi { body, .. } => body.to_lowercase().contains("duplicate"),
        _ => false,
    }
}
