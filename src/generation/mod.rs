//! Generation Module
//!
//! Text-generation providers behind the single `generate` capability.
//! Provider selection happens once at startup through the factory; the
//! rest of the agent never knows which provider it is talking to.

use std::time::Duration;

pub mod anthropic;
pub mod factory;
pub mod openai;

pub use anthropic::AnthropicGenerator;
pub use factory::create_generator;
pub use openai::OpenAiGenerator;

/// Per-attempt timeout for generation calls. Generation is slower than
/// board traffic, so it gets a longer budget.
pub(crate) const GENERATION_TIMEOUT: Duration = Duration::from_secs(60);
