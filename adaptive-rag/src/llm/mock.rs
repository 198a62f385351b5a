//! Scripted LLM for tests and offline runs.
//!
//! Replies are chosen by substring rules over the full prompt text, so one
//! mock can stand in for the classifier, grader and generator at once. A rule
//! may hold a sequence of replies for scripting multi-turn behavior. Every
//! call is recorded for assertions on call counts.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::message::Message;

use super::{LlmClient, LlmResponse};

/// Mock LLM: rule-based replies plus a call log.
///
/// Rules are checked in insertion order against all message contents joined
/// with newlines; the first rule whose needle occurs wins, otherwise the
/// default reply is returned.
///
/// ```rust
/// use adaptive_rag::MockLlm;
///
/// let llm = MockLlm::new("I don't know.")
///     .when("Classify", "simple")
///     .when("Is the document relevant", "yes");
/// assert_eq!(llm.call_count(), 0);
/// ```
pub struct MockLlm {
    rules: Vec<Rule>,
    default_reply: String,
    failure: Option<String>,
    calls: Mutex<Vec<Vec<Message>>>,
}

/// Replies for prompts containing `needle`; the last reply repeats once the
/// sequence is used up.
struct Rule {
    needle: String,
    replies: Vec<String>,
    hits: AtomicUsize,
}

impl Rule {
    fn next_reply(&self) -> String {
        let hit = self.hits.fetch_add(1, Ordering::SeqCst);
        let index = hit.min(self.replies.len().saturating_sub(1));
        self.replies.get(index).cloned().unwrap_or_default()
    }
}

impl MockLlm {
    /// Mock that answers every prompt no rule matches with `default_reply`.
    pub fn new(default_reply: impl Into<String>) -> Self {
        Self {
            rules: Vec::new(),
            default_reply: default_reply.into(),
            failure: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Mock whose every call fails with `AgentError::ExecutionFailed(message)`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::new("")
        }
    }

    /// Adds a rule: when the prompt contains `needle`, reply with `reply`.
    pub fn when(self, needle: impl Into<String>, reply: impl Into<String>) -> Self {
        self.when_sequence(needle, [reply])
    }

    /// Adds a rule whose successive matches get successive `replies`; after
    /// the last one it keeps repeating it.
    pub fn when_sequence<I, T>(mut self, needle: impl Into<String>, replies: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.rules.push(Rule {
            needle: needle.into(),
            replies: replies.into_iter().map(Into::into).collect(),
            hits: AtomicUsize::new(0),
        });
        self
    }

    /// Number of `invoke` calls so far.
    pub fn call_count(&self) -> usize {
        self.lock_calls().len()
    }

    /// Number of calls whose prompt contained `needle`.
    pub fn calls_containing(&self, needle: &str) -> usize {
        self.lock_calls()
            .iter()
            .filter(|messages| Self::prompt_text(messages).contains(needle))
            .count()
    }

    /// All recorded prompts, oldest first.
    pub fn calls(&self) -> Vec<Vec<Message>> {
        self.lock_calls().clone()
    }

    fn lock_calls(&self) -> std::sync::MutexGuard<'_, Vec<Vec<Message>>> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn prompt_text(messages: &[Message]) -> String {
        messages
            .iter()
            .map(Message::content)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError> {
        self.lock_calls().push(messages.to_vec());
        if let Some(msg) = &self.failure {
            return Err(AgentError::ExecutionFailed(msg.clone()));
        }
        let prompt = Self::prompt_text(messages);
        let content = self
            .rules
            .iter()
            .find(|rule| prompt.contains(rule.needle.as_str()))
            .map(Rule::next_reply)
            .unwrap_or_else(|| self.default_reply.clone());
        Ok(LlmResponse { content })
    }
}
