//! Parsers that turn free-form model output into closed enums.
//!
//! Every function here is total: malformed output maps to a documented
//! default and is logged at `warn`, never returned as an error.

use serde::Deserialize;

use super::state::{Complexity, EntityKind, EntityMention, HallucinationVerdict};

/// Classification used when the model's label is unrecognized.
pub const DEFAULT_COMPLEXITY: Complexity = Complexity::Moderate;

/// Rerank score used when the model's reply carries no number.
pub const DEFAULT_RERANK_SCORE: u8 = 5;

/// Phrase the generator is told to use when the context is insufficient.
pub const REFUSAL_PHRASE: &str = "cannot find the answer in the provided information";

/// Maps the classifier reply to a label.
///
/// Exact match after trim + lowercase wins; otherwise, if exactly one label
/// occurs in the text, that one; otherwise [`DEFAULT_COMPLEXITY`].
pub fn parse_complexity(raw: &str) -> Complexity {
    let text = raw
        .trim()
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '.' || c == '`')
        .to_lowercase();
    let labels = [
        Complexity::Simple,
        Complexity::Moderate,
        Complexity::Complex,
    ];
    if let Some(exact) = labels.iter().find(|l| l.as_str() == text) {
        return *exact;
    }
    let found: Vec<_> = labels
        .iter()
        .filter(|l| text.contains(l.as_str()))
        .collect();
    match found.as_slice() {
        [one] => **one,
        _ => {
            tracing::warn!(raw, default = %DEFAULT_COMPLEXITY, "unrecognized complexity label");
            DEFAULT_COMPLEXITY
        }
    }
}

#[derive(Deserialize)]
struct RawEntities {
    #[serde(default)]
    entities: Vec<RawEntity>,
}

#[derive(Deserialize)]
struct RawEntity {
    #[serde(default)]
    name: String,
    #[serde(rename = "type", default)]
    kind: String,
}

fn entity_kind(label: &str) -> EntityKind {
    match label.trim().to_lowercase().as_str() {
        "technology" | "tech" | "framework" | "tool" | "library" => EntityKind::Technology,
        "concept" => EntityKind::Concept,
        "organization" | "company" | "org" => EntityKind::Organization,
        "person" => EntityKind::Person,
        _ => EntityKind::Other,
    }
}

/// Parses `{"entities":[{"name":..,"type":..}]}`, tolerating code fences and
/// prose around the object. Anything unparseable yields an empty list.
pub fn parse_entities(raw: &str) -> Vec<EntityMention> {
    let body = match (raw.find('{'), raw.rfind('}')) {
        (Some(start), Some(end)) if start < end => &raw[start..=end],
        _ => {
            tracing::warn!(raw, "entity extraction returned no JSON object");
            return Vec::new();
        }
    };
    match serde_json::from_str::<RawEntities>(body) {
        Ok(parsed) => parsed
            .entities
            .into_iter()
            .filter_map(|e| {
                let name = e.name.trim();
                (!name.is_empty()).then(|| EntityMention::new(name, entity_kind(&e.kind)))
            })
            .collect(),
        Err(e) => {
            tracing::warn!(raw, error = %e, "entity extraction returned malformed JSON");
            Vec::new()
        }
    }
}

/// First word of a reply, lowercased, without surrounding quotes or markup.
fn first_word(raw: &str) -> String {
    raw.trim()
        .trim_start_matches(['"', '\'', '*', '`'])
        .split(|c: char| !c.is_alphanumeric())
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

/// Grader reply → relevant? Only a leading word "yes" counts; anything else is not relevant.
pub fn parse_yes_no(raw: &str) -> bool {
    match first_word(raw).as_str() {
        "yes" => true,
        "no" => false,
        _ => {
            tracing::warn!(raw, "unrecognized grade, treating as not relevant");
            false
        }
    }
}

/// Rerank reply → score in `0..=10`. The leading number is taken and clamped;
/// no number yields [`DEFAULT_RERANK_SCORE`].
pub fn parse_score(raw: &str) -> u8 {
    let digits: String = raw
        .trim()
        .trim_start_matches(['"', '\'', '*', '`'])
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    match digits.parse::<u64>() {
        Ok(score) => score.min(10) as u8,
        Err(_) if !digits.is_empty() => 10,
        Err(_) => {
            tracing::warn!(raw, default = DEFAULT_RERANK_SCORE, "unrecognized rerank score");
            DEFAULT_RERANK_SCORE
        }
    }
}

/// Checker reply → verdict. Unrecognized output is `Hallucinated`.
pub fn parse_hallucination(raw: &str) -> HallucinationVerdict {
    let text = raw.trim().to_lowercase();
    if text.contains("hallucinated") || text.contains("not grounded") {
        return HallucinationVerdict::Hallucinated;
    }
    let text = text.trim_start_matches(['"', '\'', '*', '`']);
    if text.starts_with("grounded") {
        HallucinationVerdict::Grounded
    } else {
        tracing::warn!(raw, "unrecognized hallucination verdict, treating as hallucinated");
        HallucinationVerdict::Hallucinated
    }
}

/// One sub-question per line; bullets and numbering stripped, blanks dropped,
/// at most `max` kept. No usable line yields `[query]`.
pub fn parse_sub_queries(raw: &str, query: &str, max: usize) -> Vec<String> {
    let subs: Vec<String> = raw
        .lines()
        .map(|line| {
            line.trim()
                .trim_start_matches(|c: char| {
                    c.is_ascii_digit() || matches!(c, '-' | '*' | '•' | '.' | ')' | ' ')
                })
                .trim()
                .to_string()
        })
        .filter(|line| !line.is_empty())
        .take(max)
        .collect();
    if subs.is_empty() {
        vec![query.to_string()]
    } else {
        subs
    }
}

/// Whether `answer` is (or contains) the generator's refusal.
pub fn is_refusal(answer: &str) -> bool {
    answer.to_lowercase().contains(REFUSAL_PHRASE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::state::HallucinationVerdict::{Grounded, Hallucinated};

    /// **Scenario**: exact labels parse regardless of case and whitespace.
    #[test]
    fn complexity_exact_labels() {
        assert_eq!(parse_complexity("simple"), Complexity::Simple);
        assert_eq!(parse_complexity("  MODERATE\n"), Complexity::Moderate);
        assert_eq!(parse_complexity("Complex."), Complexity::Complex);
        assert_eq!(parse_complexity("\"simple\""), Complexity::Simple);
    }

    /// **Scenario**: one label inside prose is taken; none or several fall back to Moderate.
    #[test]
    fn complexity_in_prose_and_default() {
        assert_eq!(
            parse_complexity("This question is complex because..."),
            Complexity::Complex
        );
        assert_eq!(parse_complexity(""), Complexity::Moderate);
        assert_eq!(parse_complexity("I am not sure"), Complexity::Moderate);
        assert_eq!(
            parse_complexity("either simple or complex"),
            Complexity::Moderate
        );
    }

    /// **Scenario**: valid JSON, fenced JSON and prose-wrapped JSON all parse.
    #[test]
    fn entities_valid_shapes() {
        let plain = r#"{"entities":[{"name":"LangGraph","type":"technology"},{"name":"OpenAI","type":"Organization"}]}"#;
        let got = parse_entities(plain);
        assert_eq!(
            got,
            vec![
                EntityMention::new("LangGraph", EntityKind::Technology),
                EntityMention::new("OpenAI", EntityKind::Organization),
            ]
        );

        let fenced = "```json\n{\"entities\": [{\"name\": \"RAG\", \"type\": \"concept\"}]}\n```";
        assert_eq!(
            parse_entities(fenced),
            vec![EntityMention::new("RAG", EntityKind::Concept)]
        );

        let prose = "Sure! {\"entities\": [{\"name\": \"Rust\"}]} Hope that helps.";
        assert_eq!(
            parse_entities(prose),
            vec![EntityMention::new("Rust", EntityKind::Other)]
        );
    }

    /// **Scenario**: malformed output degrades to an empty list.
    #[test]
    fn entities_malformed_is_empty() {
        assert!(parse_entities("").is_empty());
        assert!(parse_entities("LangGraph, OpenAI").is_empty());
        assert!(parse_entities("{\"entities\": [").is_empty());
        assert!(parse_entities("{\"entities\": \"LangGraph\"}").is_empty());
        assert!(parse_entities("{}").is_empty());
        assert!(parse_entities(r#"{"entities":[{"name":"  ","type":"concept"}]}"#).is_empty());
    }

    /// **Scenario**: grader parsing only accepts a leading yes.
    #[test]
    fn yes_no() {
        assert!(parse_yes_no("yes"));
        assert!(parse_yes_no("Yes, it is relevant."));
        assert!(parse_yes_no("**YES**"));
        assert!(!parse_yes_no("no"));
        assert!(!parse_yes_no("maybe yes"));
        assert!(!parse_yes_no(""));
    }

    /// **Scenario**: words that merely start with "yes" or "no" are not verdicts.
    #[test]
    fn yes_no_needs_the_whole_word() {
        assert!(!parse_yes_no("Yesterday's release notes mention it."));
        assert!(!parse_yes_no("yesno"));
        assert!(!parse_yes_no("Nothing here is relevant"));
        assert!(parse_yes_no("yes."));
        assert!(parse_yes_no("`yes`"));
    }

    /// **Scenario**: rerank scores take the leading number, clamp to 10 and default to 5.
    #[test]
    fn rerank_scores() {
        assert_eq!(parse_score("7"), 7);
        assert_eq!(parse_score(" 8/10\n"), 8);
        assert_eq!(parse_score("**9**"), 9);
        assert_eq!(parse_score("42"), 10);
        assert_eq!(parse_score("99999999999999999999999"), 10);
        assert_eq!(parse_score("0"), 0);
        assert_eq!(parse_score("very relevant"), DEFAULT_RERANK_SCORE);
        assert_eq!(parse_score(""), DEFAULT_RERANK_SCORE);
    }

    /// **Scenario**: hallucination parsing defaults to Hallucinated.
    #[test]
    fn hallucination_verdicts() {
        assert_eq!(parse_hallucination("grounded"), Grounded);
        assert_eq!(parse_hallucination(" Grounded.\n"), Grounded);
        assert_eq!(parse_hallucination("hallucinated"), Hallucinated);
        assert_eq!(parse_hallucination("not grounded"), Hallucinated);
        assert_eq!(parse_hallucination("grounded? no, hallucinated"), Hallucinated);
        assert_eq!(parse_hallucination("I think it's fine"), Hallucinated);
        assert_eq!(parse_hallucination(""), Hallucinated);
    }

    /// **Scenario**: sub-queries strip list markers, cap at max, fall back to the query.
    #[test]
    fn sub_queries() {
        let raw = "1. What is RAG?\n- What is Self-RAG?\n\n* How do they differ?\n4) Extra";
        assert_eq!(
            parse_sub_queries(raw, "q", 3),
            vec![
                "What is RAG?".to_string(),
                "What is Self-RAG?".to_string(),
                "How do they differ?".to_string(),
            ]
        );
        assert_eq!(parse_sub_queries("  \n\n", "orig", 3), vec!["orig".to_string()]);
    }

    /// **Scenario**: refusal detection is case-insensitive.
    #[test]
    fn refusal_detection() {
        assert!(is_refusal(
            "I cannot find the answer in the provided information."
        ));
        assert!(is_refusal("Cannot find the answer in the provided information"));
        assert!(!is_refusal("LangGraph is a library."));
    }
}
