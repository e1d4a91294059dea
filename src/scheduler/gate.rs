//! Agent Gate
//!
//! Owns the agent's mutable rate-limit state and decides whether a post
//! or comment is currently permitted. Tracks the post cooldown, a
//! rolling comment quota window, and the set of title fingerprints seen
//! during this process lifetime. State lives in memory only; a restart
//! forgets everything, which is why the agent re-seeds fingerprints from
//! its own post history at startup.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use super::fingerprint::title_fingerprint;

/// Constant rate-limit configuration, fixed at startup.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitPolicy {
    pub post_cooldown: Duration,
    pub comment_quota: u32,
    pub comment_window: Duration,
}

impl RateLimitPolicy {
    pub fn new(post_cooldown_minutes: u64, comment_quota: u32, comment_window_minutes: u64) -> Self {
        Self {
            post_cooldown: Duration::minutes(post_cooldown_minutes as i64),
            comment_quota,
            comment_window: Duration::minutes(comment_window_minutes as i64),
        }
    }
}

/// Mutable state owned exclusively by the scheduler.
struct AgentState {
    last_post_at: Option<DateTime<Utc>>,
    comment_count: u32,
    comment_window_start: DateTime<Utc>,
    seen_title_fingerprints: HashSet<String>,
}

/// The gate itself. One instance per agent; never shared across
/// processes.
pub struct Scheduler {
    policy: RateLimitPolicy,
    state: AgentState,
}

impl Scheduler {
    pub fn new(policy: RateLimitPolicy) -> Self {
        Self {
            policy,
            state: AgentState {
                last_post_at: None,
                comment_count: 0,
                comment_window_start: Utc::now(),
                seen_title_fingerprints: HashSet::new(),
            },
        }
    }

    /// Whether the post cooldown has elapsed. True on fresh state.
    pub fn can_post(&self) -> bool {
        match self.state.last_post_at {
            None => true,
            Some(at) => Utc::now() - at >= self.policy.post_cooldown,
        }
    }

    /// Time left until the next post is permitted. Zero when posting is
    /// currently allowed.
    pub fn post_cooldown_remaining(&self) -> Duration {
        match self.state.last_post_at {
            None => Duration::zero(),
            Some(at) => {
                let remaining = self.policy.post_cooldown - (Utc::now() - at);
                remaining.max(Duration::zero())
            }
        }
    }

    /// Whether the comment quota has room. Rolls the window first, so
    /// an expired window grants a fresh quota.
    pub fn can_comment(&mut self) -> bool {
        self.roll_comment_window();
        self.state.comment_count < self.policy.comment_quota
    }

    /// Time left until the current comment window resets.
    pub fn comment_window_remaining(&self) -> Duration {
        let remaining = self.policy.comment_window - (Utc::now() - self.state.comment_window_start);
        remaining.max(Duration::zero())
    }

    /// Mark a successful post: start the cooldown and remember the
    /// title's fingerprint.
    pub fn record_post(&mut self, title: &str) {
        self.state.last_post_at = Some(Utc::now());
        self.state
            .seen_title_fingerprints
            .insert(title_fingerprint(title));
    }

    /// Mark a successful comment against the current window.
    pub fn record_comment(&mut self) {
        self.roll_comment_window();
        self.state.comment_count += 1;
    }

    /// Membership test against the seen-fingerprint set.
    pub fn is_duplicate_title(&self, title: &str) -> bool {
        self.state
            .seen_title_fingerprints
            .contains(&title_fingerprint(title))
    }

    /// Bulk-insert fingerprints of previously published titles.
    ///
    /// Called once at startup with externally fetched history to recover
    /// dedup context lost on restart. Returns how many new fingerprints
    /// were added.
    pub fn seed_from_history<I, S>(&mut self, titles: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut added = 0;
        for title in titles {
            if self
                .state
                .seen_title_fingerprints
                .insert(title_fingerprint(title.as_ref()))
            {
                added += 1;
            }
        }
        debug!("seeded {} title fingerprints from history", added);
        added
    }

    /// Reset the comment counter once the window has fully elapsed.
    fn roll_comment_window(&mut self) {
        let now = Utc::now();
        if now - self.state.comment_window_start >= self.policy.comment_window {
            self.state.comment_count = 0;
            self.state.comment_window_start = now;
        }
    }
}
