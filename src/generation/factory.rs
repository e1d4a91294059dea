//! Generator Factory
//!
//! Startup-time provider selection. Reads the configured provider name
//! once and produces the matching concrete generator; everything past
//! this point is polymorphic over [`TextGenerator`].

use std::sync::Arc;

use anyhow::{bail, Result};
use tracing::info;

use crate::types::{HeraldConfig, TextGenerator};

use super::{AnthropicGenerator, OpenAiGenerator};

const DEFAULT_ANTHROPIC_URL: &str = "https://api.anthropic.com";
const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-5";
const DEFAULT_OPENAI_URL: &str = "https://api.openai.com";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";

/// Resolve the generation API key: config first, then the provider's
/// environment variable.
fn resolve_api_key(config: &HeraldConfig, env_var: &str) -> Result<String> {
    if !config.generation_api_key.is_empty() {
        return Ok(config.generation_api_key.clone());
    }
    match std::env::var(env_var) {
        Ok(key) if !key.is_empty() => Ok(key),
        _ => bail!(
            "No generation API key: set generationApiKey in the config or export {}",
            env_var
        ),
    }
}

fn pick<'a>(configured: &'a str, fallback: &'a str) -> &'a str {
    if configured.is_empty() {
        fallback
    } else {
        configured
    }
}

/// Build the configured text generator.
///
/// Unknown provider names fail here, at startup, rather than surfacing
/// mid-cycle as confusing generation errors.
pub fn create_generator(config: &HeraldConfig) -> Result<Arc<dyn TextGenerator>> {
    let provider = config.generation_provider.to_lowercase();

    let generator: Arc<dyn TextGenerator> = match provider.as_str() {
        "anthropic" => {
            let api_key = resolve_api_key(config, "ANTHROPIC_API_KEY")?;
            Arc::new(AnthropicGenerator::new(
                pick(&config.generation_api_url, DEFAULT_ANTHROPIC_URL).to_string(),
                api_key,
                pick(&config.generation_model, DEFAULT_ANTHROPIC_MODEL).to_string(),
                config.max_generation_tokens,
            ))
        }
        "openai" => {
            let api_key = resolve_api_key(config, "OPENAI_API_KEY")?;
            Arc::new(OpenAiGenerator::new(
                pick(&config.generation_api_url, DEFAULT_OPENAI_URL).to_string(),
                api_key,
                pick(&config.generation_model, DEFAULT_OPENAI_MODEL).to_string(),
                config.max_generation_tokens,
            ))
        }
        other => bail!("Unknown generation provider: {}", other),
    };

    info!("using generation provider: {}", generator.name());
    Ok(generator)
}
