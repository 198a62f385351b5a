//! Prompt text for every model-backed step.
//!
//! Each prompt opens with a distinct instruction so logs (and scripted test
//! models) can tell the steps apart.

use crate::message::Message;

use super::parse::REFUSAL_PHRASE;

pub const CLASSIFY_PROMPT: &str = "Classify the complexity of the user's question. \
Reply with exactly one word:\n\
- simple: greetings, small talk or general knowledge that needs no documents\n\
- moderate: a question about specific technologies or concepts that needs document search\n\
- complex: a question that combines or compares several topics and needs multi-step reasoning";

pub const DIRECT_PROMPT: &str =
    "Answer the user's question directly and concisely. You are a friendly assistant.";

pub const EXTRACT_ENTITIES_PROMPT: &str = "Extract the named entities from the question. \
Reply with JSON only, in the form \
{\"entities\": [{\"name\": \"...\", \"type\": \"technology|concept|organization|person\"}]}. \
Use an empty list when there are none.";

pub const GRADE_PROMPT: &str = "Grade whether the document is relevant to the question. \
Reply with only \"yes\" or \"no\".";

pub const HALLUCINATION_PROMPT: &str = "Check whether the answer is grounded in the documents. \
Reply with only \"grounded\" if every claim is supported by the documents, \
otherwise \"hallucinated\".";

pub const RERANK_PROMPT: &str = "Rate how relevant the document is to the question \
on a scale from 0 to 10, where 0-3 is unrelated, 4-6 is partly related and 7-10 is highly \
related. Reply with the number only.";

pub const HYPOTHETICAL_DOCUMENT_PROMPT: &str = "Write a short passage that answers the \
question the way a textbook or reference document would. Use precise technical vocabulary \
even where you are unsure of the facts.";

pub const DECOMPOSE_PROMPT: &str = "Break the question into at most three simpler sub-questions. \
Write one sub-question per line with no other text.";

pub const SYNTHESIZE_PROMPT: &str = "Combine the retrieved information to answer the question \
step by step. Base every claim on the information given.";

/// Generator system prompt; names the refusal phrase the pipeline keys off.
pub fn generate_prompt() -> String {
    format!(
        "Answer the question using only the context below. \
If the context is insufficient, say that you {}.",
        REFUSAL_PHRASE
    )
}

pub fn classify(query: &str) -> Vec<Message> {
    vec![Message::system(CLASSIFY_PROMPT), Message::user(query)]
}

/// Direct answer prompt with prior turns of the session before the question.
pub fn direct(query: &str, history: &[Message]) -> Vec<Message> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(Message::system(DIRECT_PROMPT));
    messages.extend(history.iter().cloned());
    messages.push(Message::user(query));
    messages
}

pub fn extract_entities(query: &str) -> Vec<Message> {
    vec![
        Message::system(EXTRACT_ENTITIES_PROMPT),
        Message::user(query),
    ]
}

pub fn grade(query: &str, document: &str) -> Vec<Message> {
    vec![
        Message::system(GRADE_PROMPT),
        Message::user(format!("Question: {}\n\nGrade this document: {}", query, document)),
    ]
}

pub fn rerank(query: &str, document: &str) -> Vec<Message> {
    vec![
        Message::system(RERANK_PROMPT),
        Message::user(format!("Question: {}\n\nScore this document: {}", query, document)),
    ]
}

/// Passage used as the search text when the fallback rewrites the query (HyDE).
pub fn hypothetical_document(query: &str) -> Vec<Message> {
    vec![
        Message::system(HYPOTHETICAL_DOCUMENT_PROMPT),
        Message::user(query),
    ]
}

pub fn generate(query: &str, context: &str) -> Vec<Message> {
    vec![
        Message::system(generate_prompt()),
        Message::user(format!("Context:\n{}\n\nQuestion: {}", context, query)),
    ]
}

pub fn check_hallucination(context: &str, answer: &str) -> Vec<Message> {
    vec![
        Message::system(HALLUCINATION_PROMPT),
        Message::user(format!("Documents:\n{}\n\nAnswer to check: {}", context, answer)),
    ]
}

pub fn decompose(query: &str) -> Vec<Message> {
    vec![Message::system(DECOMPOSE_PROMPT), Message::user(query)]
}

pub fn synthesize(query: &str, sub_queries: &[String], context: &str) -> Vec<Message> {
    vec![
        Message::system(SYNTHESIZE_PROMPT),
        Message::user(format!(
            "Question: {}\n\nSub-questions:\n{}\n\nRetrieved information:\n{}",
            query,
            sub_queries.join("\n"),
            context
        )),
    ]
}

/// Canned answer when the loop ends without a usable answer.
pub fn not_found(query: &str) -> String {
    format!("Sorry, I could not find information for '{}'.", query)
}
