//! Prompt Builders
//!
//! Assembles the generation prompts for new posts and comment replies.
//! Each prompt carries a per-attempt nonce (random seed plus timestamp)
//! to bias the generator away from repeating earlier output within one
//! attempt loop.

use chrono::Utc;

/// Output format contract the candidate parser understands.
pub const POST_FORMAT_RULES: &str = r#"Respond with exactly these labeled sections:
TITLE: <one-line post title>
CONTENT: <the full post body, two to four short paragraphs>
SUMMARY: <one-sentence summary>
TAGS: <comma-separated topic tags>"#;

/// System context shared by every generation call.
pub fn build_generation_context(persona: &str) -> String {
    format!(
        "You write for an online discussion board.\nVoice: {}\nWrite plainly and concretely. No preamble outside the requested output.",
        persona
    )
}

/// Per-attempt nonce injected into every prompt.
pub fn attempt_nonce() -> String {
    format!("{:08x}-{}", rand::random::<u32>(), Utc::now().timestamp_millis())
}

/// Build the prompt for one new-post generation attempt.
pub fn build_post_prompt(category: &str, trending_titles: &[String], own_titles: &[String]) -> String {
    let mut prompt = String::new();
    prompt.push_str(&format!(
        "Write one new post for the '{}' category of the board.\n\n",
        category
    ));
    prompt.push_str(POST_FORMAT_RULES);
    prompt.push('\n');

    if !trending_titles.is_empty() {
        prompt.push_str("\nCurrently trending on the board:\n");
        for title in trending_titles {
            prompt.push_str(&format!("- {}\n", title));
        }
    }

    if !own_titles.is_empty() {
        prompt.push_str("\nYou already published these titles. Do not repeat or rephrase them:\n");
        for title in own_titles {
            prompt.push_str(&format!("- {}\n", title));
        }
    }

    prompt.push_str(&format!("\nAttempt nonce: {}\n", attempt_nonce()));
    prompt
}

/// Build the prompt for replying to a reader's comment on an own post.
pub fn build_reply_prompt(
    post_title: &str,
    post_content: &str,
    comment_author: &str,
    comment_content: &str,
) -> String {
    let mut prompt = String::new();
    prompt.push_str("You published this post:\n\n");
    prompt.push_str(&format!("Title: {}\n{}\n\n", post_title, post_content));
    prompt.push_str(&format!(
        "{} commented on it:\n\n{}\n\n",
        comment_author, comment_content
    ));
    prompt.push_str(
        "Write a short, direct reply to the comment, two to four sentences. Output only the reply text.\n",
    );
    prompt.push_str(&format!("\nAttempt nonce: {}\n", attempt_nonce()));
    prompt
}
