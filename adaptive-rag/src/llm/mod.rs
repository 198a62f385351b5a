//! LLM client abstraction used by every model-backed pipeline step.
//!
//! A step builds a short message list (system instruction + user content),
//! calls [`LlmClient::invoke`] and parses the returned text defensively.
//! Implementations: [`MockLlm`] (scripted, for tests), [`ChatOpenAI`]
//! (feature `openai`) and the [`TimeoutLlm`] decorator.

mod mock;
mod timeout;

#[cfg(feature = "openai")]
mod openai;

pub use mock::MockLlm;
pub use timeout::TimeoutLlm;

#[cfg(feature = "openai")]
pub use openai::ChatOpenAI;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::message::Message;

/// Response from an LLM completion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LlmResponse {
    /// Assistant message content (plain text). May be free text even when the
    /// prompt asked for a label or JSON; callers must parse defensively.
    pub content: String,
}

/// LLM client: given messages, returns the assistant text.
///
/// **Interaction**: Shared as `Arc<dyn LlmClient>` by the classifier, entity
/// extractor, grader, generator, hallucination checker and decomposer nodes.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Invoke one turn: read messages, return assistant content.
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError>;
}
