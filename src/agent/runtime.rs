//! Agent Runtime
//!
//! The generate-validate-submit loop and the comment-reply loop, driven
//! once per heartbeat cycle. Owns the scheduler; every gating decision
//! and every submission flows through here.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{is_duplicate_rejection, HeraldError};
use crate::scheduler::Scheduler;
use crate::types::{BoardClient, Comment, Post, TextGenerator, VoteDirection};

use super::candidate::parse_candidate;
use super::prompts::{build_generation_context, build_post_prompt, build_reply_prompt};

/// Generation attempts per post cycle.
pub const MAX_POST_ATTEMPTS: u32 = 5;
/// Generation attempts per reply cycle.
pub const MAX_REPLY_ATTEMPTS: u32 = 3;
/// Trending posts fetched for prompt context.
const TRENDING_CONTEXT_LIMIT: u32 = 10;
/// Own recent titles fetched for prompt context.
const OWN_TITLES_CONTEXT_LIMIT: u32 = 5;
/// Own posts fetched once at startup to seed the dedup set.
const HISTORY_SEED_LIMIT: u32 = 25;
/// Own posts scanned for unanswered comments per reply cycle.
const REPLY_SCAN_LIMIT: u32 = 10;

/// Terminal outcome of one post cycle. Cooldown and attempt exhaustion
/// are expected control states, not errors.
#[derive(Debug)]
pub enum PostOutcome {
    Posted(Post),
    OnCooldown { remaining: Duration },
    AttemptsExhausted { attempts: u32 },
}

/// Terminal outcome of one reply cycle.
#[derive(Debug)]
pub enum ReplyOutcome {
    Replied { post_id: String, comment_id: String },
    QuotaExhausted { window_remaining: Duration },
    NothingToReply,
    AttemptsExhausted { attempts: u32 },
}

/// What one heartbeat cycle did.
#[derive(Debug)]
pub struct CycleReport {
    pub post: PostOutcome,
    pub reply: ReplyOutcome,
}

/// The posting agent. One instance per process; the heartbeat daemon
/// drives it serially, one cycle at a time.
pub struct Agent {
    board: Arc<dyn BoardClient>,
    generator: Arc<dyn TextGenerator>,
    scheduler: Scheduler,
    persona: String,
    category: String,
    own_handle: Option<String>,
}

impl Agent {
    pub fn new(
        board: Arc<dyn BoardClient>,
        generator: Arc<dyn TextGenerator>,
        scheduler: Scheduler,
        persona: String,
        category: String,
    ) -> Self {
        Self {
            board,
            generator,
            scheduler,
            persona,
            category,
            own_handle: None,
        }
    }

    /// Best-effort startup pass: learn the agent's own handle and re-seed
    /// the dedup set from published history. Failures leave the agent
    /// with degraded context, never stop it.
    pub async fn bootstrap(&mut self) {
        match self.board.get_own_profile().await {
            Ok(profile) => {
                info!("signed in as {}", profile.handle);
                self.own_handle = Some(profile.handle);
            }
            Err(err) => {
                warn!("profile fetch failed, cannot recognize own comments: {}", err);
            }
        }

        match self.board.list_own_posts(HISTORY_SEED_LIMIT).await {
            Ok(posts) => {
                let seeded = self
                    .scheduler
                    .seed_from_history(posts.iter().map(|p| p.title.as_str()));
                info!(
                    "seeded {} title fingerprints from {} published posts",
                    seeded,
                    posts.len()
                );
            }
            Err(err) => {
                warn!("history fetch failed, dedup set starts empty: {}", err);
            }
        }
    }

    /// One heartbeat cycle: a post attempt, then a reply attempt. A hard
    /// submission failure aborts the cycle; the daemon decides whether
    /// the process keeps running.
    pub async fn run_cycle(&mut self) -> Result<CycleReport> {
        let cycle_id = Uuid::new_v4();
        info!("cycle {} started", cycle_id);

        let post = self.run_post_cycle().await.context("post cycle failed")?;
        match &post {
            PostOutcome::Posted(created) => {
                info!("cycle {}: published \"{}\" as {}", cycle_id, created.title, created.id);
            }
            PostOutcome::OnCooldown { remaining } => {
                info!(
                    "cycle {}: posting on cooldown for another {}m",
                    cycle_id,
                    remaining.num_minutes()
                );
            }
            PostOutcome::AttemptsExhausted { attempts } => {
                warn!(
                    "cycle {}: no publishable candidate after {} attempts",
                    cycle_id, attempts
                );
            }
        }

        let reply = self.run_reply_cycle().await.context("reply cycle failed")?;
        match &reply {
            ReplyOutcome::Replied { post_id, comment_id } => {
                info!("cycle {}: replied on {} with {}", cycle_id, post_id, comment_id);
            }
            ReplyOutcome::QuotaExhausted { window_remaining } => {
                info!(
                    "cycle {}: comment quota spent, window resets in {}m",
                    cycle_id,
                    window_remaining.num_minutes()
                );
            }
            ReplyOutcome::NothingToReply => {
                debug!("cycle {}: no unanswered comments", cycle_id);
            }
            ReplyOutcome::AttemptsExhausted { attempts } => {
                warn!("cycle {}: no usable reply after {} attempts", cycle_id, attempts);
            }
        }

        Ok(CycleReport { post, reply })
    }

    /// Generate-validate-submit for one new post.
    pub async fn run_post_cycle(&mut self) -> Result<PostOutcome, HeraldError> {
        if !self.scheduler.can_post() {
            return Ok(PostOutcome::OnCooldown {
                remaining: self.scheduler.post_cooldown_remaining(),
            });
        }

        // Context is fetched once per cycle, best-effort: a degraded
        // prompt beats a dead cycle.
        let trending_titles: Vec<String> = match self.board.list_trending(TRENDING_CONTEXT_LIMIT).await
        {
            Ok(posts) => posts.into_iter().map(|p| p.title).collect(),
            Err(err) => {
                warn!("trending fetch failed, prompting without it: {}", err);
                Vec::new()
            }
        };

        let own_titles: Vec<String> = match self.board.list_own_posts(OWN_TITLES_CONTEXT_LIMIT).await
        {
            Ok(posts) => posts.into_iter().map(|p| p.title).collect(),
            Err(err) => {
                warn!("own-post fetch failed, prompting without it: {}", err);
                Vec::new()
            }
        };
        // Published titles are seen titles, wherever we learn of them.
        self.scheduler
            .seed_from_history(own_titles.iter().map(|t| t.as_str()));

        let context = build_generation_context(&self.persona);

        for attempt in 1..=MAX_POST_ATTEMPTS {
            let prompt = build_post_prompt(&self.category, &trending_titles, &own_titles);
            let raw = self.generator.generate(&prompt, Some(&context)).await?;

            let candidate = match parse_candidate(&raw) {
                Ok(candidate) => candidate,
                Err(err) => {
                    debug!(
                        "attempt {}/{}: unparseable output: {}",
                        attempt, MAX_POST_ATTEMPTS, err
                    );
                    continue;
                }
            };

            if self.scheduler.is_duplicate_title(&candidate.title) {
                debug!(
                    "attempt {}/{}: already posted \"{}\"",
                    attempt, MAX_POST_ATTEMPTS, candidate.title
                );
                continue;
            }

            if !candidate.tags.is_empty() {
                debug!("candidate tags: {}", candidate.tags.join(", "));
            }

            match self
                .board
                .create_post(&self.category, &candidate.title, &candidate.content)
                .await
            {
                Ok(created) => {
                    self.scheduler.record_post(&candidate.title);
                    return Ok(PostOutcome::Posted(created));
                }
                Err(err) if is_duplicate_rejection(&err) => {
                    warn!(
                        "attempt {}/{}: board rejected \"{}\" as duplicate",
                        attempt, MAX_POST_ATTEMPTS, candidate.title
                    );
                    continue;
                }
                Err(err) => return Err(err),
            }
        }

        Ok(PostOutcome::AttemptsExhausted {
            attempts: MAX_POST_ATTEMPTS,
        })
    }

    /// Answer the oldest unanswered reader comment on a recent own post.
    pub async fn run_reply_cycle(&mut self) -> Result<ReplyOutcome, HeraldError> {
        if !self.scheduler.can_comment() {
            return Ok(ReplyOutcome::QuotaExhausted {
                window_remaining: self.scheduler.comment_window_remaining(),
            });
        }

        let (post, comment) = match self.find_unanswered_comment().await? {
            Some(target) => target,
            None => return Ok(ReplyOutcome::NothingToReply),
        };

        info!("replying to {} on \"{}\"", comment.author, post.title);
        let context = build_generation_context(&self.persona);

        let mut reply_text: Option<String> = None;
        for attempt in 1..=MAX_REPLY_ATTEMPTS {
            let prompt =
                build_reply_prompt(&post.title, &post.content, &comment.author, &comment.content);
            let raw = self.generator.generate(&prompt, Some(&context)).await?;

            let trimmed = raw.trim();
            if trimmed.is_empty() {
                debug!("attempt {}/{}: empty reply output", attempt, MAX_REPLY_ATTEMPTS);
                continue;
            }
            reply_text = Some(trimmed.to_string());
            break;
        }

        let reply_text = match reply_text {
            Some(text) => text,
            None => {
                return Ok(ReplyOutcome::AttemptsExhausted {
                    attempts: MAX_REPLY_ATTEMPTS,
                })
            }
        };

        let created = self.board.create_comment(&post.id, &reply_text).await?;
        self.scheduler.record_comment();

        // Courtesy upvote for the comment we answered; losing it costs
        // nothing.
        if let Err(err) = self.board.vote(&comment.id, VoteDirection::Up).await {
            warn!("upvote of {} failed: {}", comment.id, err);
        }

        Ok(ReplyOutcome::Replied {
            post_id: post.id,
            comment_id: created.id,
        })
    }

    /// Find the oldest reader comment we have not answered yet.
    ///
    /// Comments arrive oldest-first; anything the agent itself wrote
    /// counts as the answer to every reader comment before it.
    async fn find_unanswered_comment(&self) -> Result<Option<(Post, Comment)>, HeraldError> {
        let own_posts = self.board.list_own_posts(REPLY_SCAN_LIMIT).await?;

        for post in own_posts {
            if post.comment_count == 0 {
                continue;
            }
            let thread = self.board.get_post(&post.id).await?;

            let mut candidate: Option<Comment> = None;
            for comment in thread.comments {
                if self.is_own_comment(&comment) {
                    candidate = None;
                } else if candidate.is_none() {
                    candidate = Some(comment);
                }
            }

            if let Some(comment) = candidate {
                return Ok(Some((thread.post, comment)));
            }
        }

        Ok(None)
    }

    fn is_own_comment(&self, comment: &Comment) -> bool {
        match &self.own_handle {
            Some(handle) => comment.author == *handle,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::scheduler::RateLimitPolicy;
    use crate::types::{PostThread, Profile};

    fn make_post(id: &str, title: &str, comment_count: i64) -> Post {
        Post {
            id: id.to_string(),
            title: title.to_string(),
            content: "body".to_string(),
            category: "general".to_string(),
            author: "herald".to_string(),
            upvotes: 0,
            comment_count,
            created_at: "2026-08-01T00:00:00Z".to_string(),
        }
    }

    fn make_comment(id: &str, post_id: &str, author: &str, content: &str) -> Comment {
        Comment {
            id: id.to_string(),
            post_id: post_id.to_string(),
            parent_id: None,
            author: author.to_string(),
            content: content.to_string(),
            created_at: "2026-08-01T01:00:00Z".to_string(),
        }
    }

    #[derive(Default)]
    struct MockBoard {
        trending: Vec<Post>,
        trending_fails: bool,
        own_posts: Vec<Post>,
        own_posts_fail: bool,
        threads: Vec<PostThread>,
        profile_fails: bool,
        vote_fails: bool,
        create_post_errors: Mutex<VecDeque<HeraldError>>,
        created_posts: Mutex<Vec<(String, String)>>,
        created_comments: Mutex<Vec<(String, String)>>,
        votes: Mutex<Vec<(String, VoteDirection)>>,
    }

    fn board_error(status: u16, body: &str) -> HeraldError {
        HeraldError::BoardApi {
            status,
            body: body.to_string(),
        }
    }

    #[async_trait]
    impl BoardClient for MockBoard {
        async fn list_trending(&self, _limit: u32) -> Result<Vec<Post>, HeraldError> {
            if self.trending_fails {
                return Err(board_error(500, "trending down"));
            }
            Ok(self.trending.clone())
        }

        async fn get_post(&self, id: &str) -> Result<PostThread, HeraldError> {
            self.threads
                .iter()
                .find(|thread| thread.post.id == id)
                .cloned()
                .ok_or_else(|| board_error(404, "no such post"))
        }

        async fn create_post(
            &self,
            _category: &str,
            title: &str,
            content: &str,
        ) -> Result<Post, HeraldError> {
            self.created_posts
                .lock()
                .unwrap()
                .push((title.to_string(), content.to_string()));
            if let Some(err) = self.create_post_errors.lock().unwrap().pop_front() {
                return Err(err);
            }
            Ok(make_post("created-1", title, 0))
        }

        async fn create_comment(
            &self,
            post_id: &str,
            content: &str,
        ) -> Result<Comment, HeraldError> {
            self.created_comments
                .lock()
                .unwrap()
                .push((post_id.to_string(), content.to_string()));
            Ok(make_comment("reply-1", post_id, "herald", content))
        }

        async fn vote(&self, target_id: &str, direction: VoteDirection) -> Result<(), HeraldError> {
            if self.vote_fails {
                return Err(board_error(500, "votes down"));
            }
            self.votes
                .lock()
                .unwrap()
                .push((target_id.to_string(), direction));
            Ok(())
        }

        async fn search(&self, _query: &str, _limit: u32) -> Result<Vec<Post>, HeraldError> {
            Ok(Vec::new())
        }

        async fn get_own_profile(&self) -> Result<Profile, HeraldError> {
            if self.profile_fails {
                return Err(board_error(500, "profile down"));
            }
            Ok(Profile {
                id: "u1".to_string(),
                handle: "herald".to_string(),
                display_name: None,
                karma: 0,
                created_at: "2026-07-01T00:00:00Z".to_string(),
            })
        }

        async fn list_own_posts(&self, _limit: u32) -> Result<Vec<Post>, HeraldError> {
            if self.own_posts_fail {
                return Err(board_error(500, "history down"));
            }
            Ok(self.own_posts.clone())
        }
    }

    struct MockGenerator {
        outputs: Mutex<VecDeque<String>>,
        fallback: String,
        calls: AtomicUsize,
        fails: bool,
    }

    impl MockGenerator {
        fn repeating(fallback: &str) -> Self {
            Self {
                outputs: Mutex::new(VecDeque::new()),
                fallback: fallback.to_string(),
                calls: AtomicUsize::new(0),
                fails: false,
            }
        }

        fn scripted(outputs: Vec<String>, fallback: &str) -> Self {
            Self {
                outputs: Mutex::new(outputs.into()),
                fallback: fallback.to_string(),
                calls: AtomicUsize::new(0),
                fails: false,
            }
        }

        fn failing() -> Self {
            Self {
                outputs: Mutex::new(VecDeque::new()),
                fallback: String::new(),
                calls: AtomicUsize::new(0),
                fails: true,
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextGenerator for MockGenerator {
        async fn generate(
            &self,
            _prompt: &str,
            _context: Option<&str>,
        ) -> Result<String, HeraldError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fails {
                return Err(HeraldError::GenerationApi {
                    status: 500,
                    body: "generator down".to_string(),
                });
            }
            Ok(self
                .outputs
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| self.fallback.clone()))
        }

        fn name(&self) -> &str {
            "mock"
        }
    }

    fn labeled(title: &str) -> String {
        format!("TITLE: {}\nCONTENT: Generated body for {}.", title, title)
    }

    fn fresh_scheduler() -> Scheduler {
        Scheduler::new(RateLimitPolicy::new(240, 10, 60))
    }

    fn agent_with(
        board: Arc<MockBoard>,
        generator: Arc<MockGenerator>,
        scheduler: Scheduler,
    ) -> Agent {
        Agent::new(
            board,
            generator,
            scheduler,
            "Test persona.".to_string(),
            "general".to_string(),
        )
    }

    #[tokio::test]
    async fn test_post_cycle_first_attempt_success() {
        let board = Arc::new(MockBoard::default());
        let generator = Arc::new(MockGenerator::repeating(&labeled("Fresh Take")));
        let mut agent = agent_with(board.clone(), generator.clone(), fresh_scheduler());

        let outcome = agent.run_post_cycle().await.unwrap();
        match outcome {
            PostOutcome::Posted(post) => assert_eq!(post.title, "Fresh Take"),
            other => panic!("expected Posted, got {:?}", other),
        }
        assert_eq!(generator.call_count(), 1);
        assert_eq!(board.created_posts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_post_cycle_cooldown_short_circuits() {
        let board = Arc::new(MockBoard::default());
        let generator = Arc::new(MockGenerator::repeating(&labeled("Fresh Take")));
        let mut agent = agent_with(board.clone(), generator.clone(), fresh_scheduler());

        agent.run_post_cycle().await.unwrap();
        let outcome = agent.run_post_cycle().await.unwrap();

        match outcome {
            PostOutcome::OnCooldown { remaining } => {
                assert!(remaining > Duration::zero());
            }
            other => panic!("expected OnCooldown, got {:?}", other),
        }
        // the gated cycle never touched the generator
        assert_eq!(generator.call_count(), 1);
    }

    #[tokio::test]
    async fn test_post_cycle_retries_seen_titles_until_fresh() {
        let board = Arc::new(MockBoard::default());
        let generator = Arc::new(MockGenerator::scripted(
            vec![
                labeled("Old News"),
                labeled("Old News"),
                labeled("Old News"),
                labeled("Old News"),
                labeled("Fresh Take"),
            ],
            &labeled("Fresh Take"),
        ));
        let mut scheduler = fresh_scheduler();
        scheduler.seed_from_history(["Old News"]);
        let mut agent = agent_with(board.clone(), generator.clone(), scheduler);

        let outcome = agent.run_post_cycle().await.unwrap();
        match outcome {
            PostOutcome::Posted(post) => assert_eq!(post.title, "Fresh Take"),
            other => panic!("expected Posted, got {:?}", other),
        }
        assert_eq!(generator.call_count(), 5);
        let created = board.created_posts.lock().unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].0, "Fresh Take");
    }

    #[tokio::test]
    async fn test_post_cycle_exhausts_on_malformed_output() {
        let board = Arc::new(MockBoard::default());
        let generator = Arc::new(MockGenerator::repeating("no labels in sight"));
        let mut agent = agent_with(board.clone(), generator.clone(), fresh_scheduler());

        let outcome = agent.run_post_cycle().await.unwrap();
        match outcome {
            PostOutcome::AttemptsExhausted { attempts } => {
                assert_eq!(attempts, MAX_POST_ATTEMPTS)
            }
            other => panic!("expected AttemptsExhausted, got {:?}", other),
        }
        assert_eq!(generator.call_count(), MAX_POST_ATTEMPTS as usize);
        assert!(board.created_posts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_post_cycle_exhausts_on_persistent_duplicates() {
        let board = Arc::new(MockBoard::default());
        let generator = Arc::new(MockGenerator::repeating(&labeled("Old News")));
        let mut scheduler = fresh_scheduler();
        scheduler.seed_from_history(["Old News"]);
        let mut agent = agent_with(board.clone(), generator.clone(), scheduler);

        let outcome = agent.run_post_cycle().await.unwrap();
        assert!(matches!(outcome, PostOutcome::AttemptsExhausted { .. }));
        assert_eq!(generator.call_count(), MAX_POST_ATTEMPTS as usize);
        assert!(board.created_posts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_server_duplicate_rejection_continues_loop() {
        let board = Arc::new(MockBoard::default());
        board
            .create_post_errors
            .lock()
            .unwrap()
            .push_back(board_error(409, "a post with a Duplicate title exists"));
        let generator = Arc::new(MockGenerator::scripted(
            vec![labeled("Take One"), labeled("Take Two")],
            &labeled("Take Two"),
        ));
        let mut agent = agent_with(board.clone(), generator.clone(), fresh_scheduler());

        let outcome = agent.run_post_cycle().await.unwrap();
        match outcome {
            PostOutcome::Posted(post) => assert_eq!(post.title, "Take Two"),
            other => panic!("expected Posted, got {:?}", other),
        }
        assert_eq!(board.created_posts.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_other_submission_error_aborts_cycle() {
        let board = Arc::new(MockBoard::default());
        board
            .create_post_errors
            .lock()
            .unwrap()
            .push_back(board_error(500, "internal error"));
        let generator = Arc::new(MockGenerator::repeating(&labeled("Take One")));
        let mut agent = agent_with(board.clone(), generator.clone(), fresh_scheduler());

        let err = agent.run_post_cycle().await.unwrap_err();
        match err {
            HeraldError::BoardApi { status, .. } => assert_eq!(status, 500),
            other => panic!("expected BoardApi, got {:?}", other),
        }
        // no further generation after the hard failure
        assert_eq!(generator.call_count(), 1);
    }

    #[tokio::test]
    async fn test_generation_api_error_aborts_cycle() {
        let board = Arc::new(MockBoard::default());
        let generator = Arc::new(MockGenerator::failing());
        let mut agent = agent_with(board.clone(), generator.clone(), fresh_scheduler());

        let err = agent.run_post_cycle().await.unwrap_err();
        assert!(matches!(err, HeraldError::GenerationApi { .. }));
        assert!(board.created_posts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_context_fetch_failure_degrades_gracefully() {
        let board = Arc::new(MockBoard {
            trending_fails: true,
            own_posts_fail: true,
            ..MockBoard::default()
        });
        let generator = Arc::new(MockGenerator::repeating(&labeled("Resilient Post")));
        let mut agent = agent_with(board.clone(), generator.clone(), fresh_scheduler());

        let outcome = agent.run_post_cycle().await.unwrap();
        assert!(matches!(outcome, PostOutcome::Posted(_)));
    }

    #[tokio::test]
    async fn test_bootstrap_seeds_dedup_from_history() {
        let board = Arc::new(MockBoard {
            own_posts: vec![make_post("p1", "Old News", 0)],
            ..MockBoard::default()
        });
        let generator = Arc::new(MockGenerator::repeating(&labeled("Old News")));
        let mut agent = agent_with(board.clone(), generator.clone(), fresh_scheduler());

        agent.bootstrap().await;
        let outcome = agent.run_post_cycle().await.unwrap();

        assert!(matches!(outcome, PostOutcome::AttemptsExhausted { .. }));
        assert!(board.created_posts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bootstrap_survives_api_failure() {
        let board = Arc::new(MockBoard {
            profile_fails: true,
            own_posts_fail: true,
            ..MockBoard::default()
        });
        let generator = Arc::new(MockGenerator::repeating(&labeled("Still Works")));
        let mut agent = agent_with(board.clone(), generator.clone(), fresh_scheduler());

        agent.bootstrap().await;
        let outcome = agent.run_post_cycle().await.unwrap();
        assert!(matches!(outcome, PostOutcome::Posted(_)));
    }

    #[tokio::test]
    async fn test_reply_cycle_answers_reader_comment() {
        let post = make_post("p1", "A Post", 1);
        let board = Arc::new(MockBoard {
            own_posts: vec![post.clone()],
            threads: vec![PostThread {
                post,
                comments: vec![make_comment("c1", "p1", "visitor", "What about edge cases?")],
            }],
            ..MockBoard::default()
        });
        let generator = Arc::new(MockGenerator::repeating("Good question. Covered in part two."));
        let mut agent = agent_with(board.clone(), generator.clone(), fresh_scheduler());

        agent.bootstrap().await;
        let outcome = agent.run_reply_cycle().await.unwrap();

        match outcome {
            ReplyOutcome::Replied { post_id, comment_id } => {
                assert_eq!(post_id, "p1");
                assert_eq!(comment_id, "reply-1");
            }
            other => panic!("expected Replied, got {:?}", other),
        }
        let comments = board.created_comments.lock().unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].0, "p1");
        assert!(board
            .votes
            .lock()
            .unwrap()
            .contains(&("c1".to_string(), VoteDirection::Up)));
    }

    #[tokio::test]
    async fn test_reply_cycle_skips_already_answered_threads() {
        let post = make_post("p1", "A Post", 2);
        let board = Arc::new(MockBoard {
            own_posts: vec![post.clone()],
            threads: vec![PostThread {
                post,
                comments: vec![
                    make_comment("c1", "p1", "visitor", "First question"),
                    make_comment("c2", "p1", "herald", "Already answered"),
                ],
            }],
            ..MockBoard::default()
        });
        let generator = Arc::new(MockGenerator::repeating("unused"));
        let mut agent = agent_with(board.clone(), generator.clone(), fresh_scheduler());

        agent.bootstrap().await;
        let outcome = agent.run_reply_cycle().await.unwrap();

        assert!(matches!(outcome, ReplyOutcome::NothingToReply));
        assert!(board.created_comments.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reply_cycle_respects_quota() {
        let board = Arc::new(MockBoard::default());
        let generator = Arc::new(MockGenerator::repeating("unused"));
        let scheduler = Scheduler::new(RateLimitPolicy::new(240, 0, 60));
        let mut agent = agent_with(board.clone(), generator.clone(), scheduler);

        let outcome = agent.run_reply_cycle().await.unwrap();
        match outcome {
            ReplyOutcome::QuotaExhausted { window_remaining } => {
                assert!(window_remaining > Duration::zero());
            }
            other => panic!("expected QuotaExhausted, got {:?}", other),
        }
        assert_eq!(generator.call_count(), 0);
    }

    #[tokio::test]
    async fn test_reply_cycle_exhausts_on_empty_output() {
        let post = make_post("p1", "A Post", 1);
        let board = Arc::new(MockBoard {
            own_posts: vec![post.clone()],
            threads: vec![PostThread {
                post,
                comments: vec![make_comment("c1", "p1", "visitor", "Anyone home?")],
            }],
            ..MockBoard::default()
        });
        let generator = Arc::new(MockGenerator::repeating("   \n  "));
        let mut agent = agent_with(board.clone(), generator.clone(), fresh_scheduler());

        agent.bootstrap().await;
        let outcome = agent.run_reply_cycle().await.unwrap();

        match outcome {
            ReplyOutcome::AttemptsExhausted { attempts } => {
                assert_eq!(attempts, MAX_REPLY_ATTEMPTS)
            }
            other => panic!("expected AttemptsExhausted, got {:?}", other),
        }
        assert_eq!(generator.call_count(), MAX_REPLY_ATTEMPTS as usize);
        assert!(board.created_comments.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reply_cycle_tolerates_upvote_failure() {
        let post = make_post("p1", "A Post", 1);
        let board = Arc::new(MockBoard {
            own_posts: vec![post.clone()],
            threads: vec![PostThread {
                post,
                comments: vec![make_comment("c1", "p1", "visitor", "Thoughts?")],
            }],
            vote_fails: true,
            ..MockBoard::default()
        });
        let generator = Arc::new(MockGenerator::repeating("Replying anyway."));
        let mut agent = agent_with(board.clone(), generator.clone(), fresh_scheduler());

        agent.bootstrap().await;
        let outcome = agent.run_reply_cycle().await.unwrap();

        assert!(matches!(outcome, ReplyOutcome::Replied { .. }));
        assert_eq!(board.created_comments.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_run_cycle_reports_both_halves() {
        let board = Arc::new(MockBoard::default());
        let generator = Arc::new(MockGenerator::repeating(&labeled("Cycle Post")));
        let mut agent = agent_with(board.clone(), generator.clone(), fresh_scheduler());

        let report = agent.run_cycle().await.unwrap();
        assert!(matches!(report.post, PostOutcome::Posted(_)));
        assert!(matches!(report.reply, ReplyOutcome::NothingToReply));
    }
}
