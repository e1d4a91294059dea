//! Board API Client
//!
//! Typed facade over the content board's HTTP API. Each method builds an
//! endpoint and payload, delegates to the resilient transport, and
//! decodes the response into its expected shape. No retry logic lives
//! here; transient-failure retries are entirely the transport's concern.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::HeraldError;
use crate::transport::{RequestSpec, Transport};
use crate::types::{BoardClient, Comment, Post, PostThread, Profile, VoteDirection};

/// Per-attempt timeout for board calls.
const BOARD_TIMEOUT: Duration = Duration::from_secs(30);

/// List responses arrive wrapped, not as bare arrays.
#[derive(Debug, Deserialize)]
struct PostList {
    posts: Vec<Post>,
}

#[derive(Debug, Deserialize)]
struct SearchResults {
    results: Vec<Post>,
}

fn decode<T: DeserializeOwned>(what: &'static str, body: &str) -> Result<T, HeraldError> {
    serde_json::from_str(body).map_err(|source| HeraldError::Decode { what, source })
}

/// HTTP implementation of [`BoardClient`], authenticated with a bearer
/// token.
pub struct BoardHttpClient {
    base_url: String,
    token: String,
    transport: Transport,
}

impl BoardHttpClient {
    pub fn new(base_url: String, token: String) -> Self {
        Self {
            base_url,
            token,
            transport: Transport::new(),
        }
    }

    /// Internal helper: send a request and surface `status >= 400` as a
    /// typed board error. Returns the raw body for the caller to decode.
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<String, HeraldError> {
        let mut spec = RequestSpec::new(method, format!("{}{}", self.base_url, path))
            .bearer(&self.token)
            .timeout(BOARD_TIMEOUT);

        if let Some(body) = body {
            spec = spec.json(body);
        }

        let response = self.transport.send(&spec).await?;
        if response.status >= 400 {
            return Err(HeraldError::BoardApi {
                status: response.status,
                body: response.body,
            });
        }

        Ok(response.body)
    }
}

#[async_trait]
impl BoardClient for BoardHttpClient {
    /// Fetch the current trending posts.
    async fn list_trending(&self, limit: u32) -> Result<Vec<Post>, HeraldError> {
        let body = self
            .request(
                Method::GET,
                &format!("/api/v1/posts/trending?limit={}", limit),
                None,
            )
            .await?;
        let list: PostList = decode("trending posts", &body)?;
        Ok(list.posts)
    }

    /// Fetch one post together with its full comment list.
    async fn get_post(&self, id: &str) -> Result<PostThread, HeraldError> {
        let encoded = urlencoding::encode(id);
        let body = self
            .request(Method::GET, &format!("/api/v1/posts/{}", encoded), None)
            .await?;
        decode("post thread", &body)
    }

    /// Publish a new post.
    async fn create_post(
        &self,
        category: &str,
        title: &str,
        content: &str,
    ) -> Result<Post, HeraldError> {
        let payload = serde_json::json!({
            "category": category,
            "title": title,
            "content": content,
        });
        let body = self
            .request(Method::POST, "/api/v1/posts", Some(payload))
            .await?;
        decode("created post", &body)
    }

    /// Reply to a post.
    async fn create_comment(&self, post_id: &str, content: &str) -> Result<Comment, HeraldError> {
        let encoded = urlencoding::encode(post_id);
        let payload = serde_json::json!({ "content": content });
        let body = self
            .request(
                Method::POST,
                &format!("/api/v1/posts/{}/comments", encoded),
                Some(payload),
            )
            .await?;
        decode("created comment", &body)
    }

    /// Vote on a post or comment. The response body is ignored.
    async fn vote(&self, target_id: &str, direction: VoteDirection) -> Result<(), HeraldError> {
        let payload = serde_json::json!({
            "targetId": target_id,
            "direction": direction.as_str(),
        });
        self.request(Method::POST, "/api/v1/votes", Some(payload))
            .await?;
        Ok(())
    }

    /// Full-text search over posts.
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<Post>, HeraldError> {
        let encoded = urlencoding::encode(query);
        let body = self
            .request(
                Method::GET,
                &format!("/api/v1/search?q={}&limit={}", encoded, limit),
                None,
            )
            .await?;
        let results: SearchResults = decode("search results", &body)?;
        Ok(results.results)
    }

    /// Fetch the agent's own profile.
    async fn get_own_profile(&self) -> Result<Profile, HeraldError> {
        let body = self.request(Method::GET, "/api/v1/me", None).await?;
        decode("own profile", &body)
    }

    /// Fetch the agent's most recent posts, newest first.
    async fn list_own_posts(&self, limit: u32) -> Result<Vec<Post>, HeraldError> {
        let body = self
            .request(Method::GET, &format!("/api/v1/me/posts?limit={}", limit), None)
            .await?;
        let list: PostList = decode("own posts", &body)?;
        Ok(list.posts)
    }
}
