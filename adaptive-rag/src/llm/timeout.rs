//! Per-call timeout decorator for any `LlmClient`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::message::Message;

use super::{LlmClient, LlmResponse};

/// Wraps an LLM client so that each `invoke` fails with `AgentError::Timeout`
/// after `timeout` instead of blocking the pipeline.
pub struct TimeoutLlm {
    inner: Arc<dyn LlmClient>,
    timeout: Duration,
}

impl TimeoutLlm {
    pub fn new(inner: Arc<dyn LlmClient>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

#[async_trait]
impl LlmClient for TimeoutLlm {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError> {
        match tokio::time::timeout(self.timeout, self.inner.invoke(messages)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(timeout = ?self.timeout, "LLM call timed out");
                Err(AgentError::Timeout {
                    operation: "llm invoke",
                    after: self.timeout,
                })
            }
        }
    }
}
