//! Pipeline state, partial updates and the closed enums the steps produce.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::graph::GraphState;
use crate::message::Message;

/// Query complexity decided once per run by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    Moderate,
    Complex,
}

impl Complexity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Simple => "simple",
            Complexity::Moderate => "moderate",
            Complexity::Complex => "complex",
        }
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which search produced a retrieved item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemSource {
    Entity,
    Semantic,
}

/// One search result carried through merge, grading and generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievedItem {
    pub content: String,
    pub metadata: HashMap<String, String>,
    pub source: ItemSource,
}

impl RetrievedItem {
    pub fn new(content: impl Into<String>, source: ItemSource) -> Self {
        Self {
            content: content.into(),
            metadata: HashMap::new(),
            source,
        }
    }
}

/// Kind of a named entity; unknown model labels map to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Technology,
    Concept,
    Organization,
    Person,
    #[serde(other)]
    Other,
}

/// Entity named in the query, as extracted by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMention {
    pub name: String,
    #[serde(rename = "type", default = "EntityMention::default_kind")]
    pub kind: EntityKind,
}

impl EntityMention {
    pub fn new(name: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    fn default_kind() -> EntityKind {
        EntityKind::Other
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelevanceVerdict {
    Relevant,
    NotRelevant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HallucinationVerdict {
    Grounded,
    Hallucinated,
}

/// Branch the dispatcher took; reported with the answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strategy {
    /// Simple query: answered without retrieval.
    Direct,
    /// Moderate query: entity + semantic retrieval with the self-correcting loop.
    Hybrid,
    /// Complex query: sub-question decomposition and synthesis.
    Decomposition,
}

impl Strategy {
    pub fn label(&self) -> &'static str {
        match self {
            Strategy::Direct => "direct answer",
            Strategy::Hybrid => "hybrid search (entity + semantic)",
            Strategy::Decomposition => "multi-query decomposition",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Shared state threaded through every pipeline step.
///
/// `query` is fixed for the run; `search_query` starts equal to it and is
/// rewritten by the fallback step. `history` holds earlier turns of the
/// session and is the only field carried from one query to the next.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineState {
    pub query: String,
    pub search_query: String,
    pub history: Vec<Message>,
    pub complexity: Option<Complexity>,
    pub entities: Vec<EntityMention>,
    pub entity_items: Vec<RetrievedItem>,
    pub semantic_items: Vec<RetrievedItem>,
    pub merged_context: Vec<RetrievedItem>,
    pub relevant_items: Vec<RetrievedItem>,
    pub retrieved_items: Vec<RetrievedItem>,
    pub sub_queries: Vec<String>,
    pub relevance_verdict: Option<RelevanceVerdict>,
    pub hallucination_verdict: Option<HallucinationVerdict>,
    pub retry_counter: u32,
    pub answer: Option<String>,
    pub strategy: Option<Strategy>,
    /// Names of the steps that ran, in order.
    pub steps: Vec<String>,
}

impl PipelineState {
    /// Fresh state for `query` with no history.
    pub fn new(query: impl Into<String>) -> Self {
        let query = query.into();
        Self {
            search_query: query.clone(),
            query,
            ..Default::default()
        }
    }

    /// State for the next query of a session: keeps `history`, resets everything else.
    pub fn next_query(&self, query: impl Into<String>) -> Self {
        Self {
            history: self.history.clone(),
            ..Self::new(query)
        }
    }

    /// Relevant item contents joined into one context string.
    pub fn relevant_context(&self) -> String {
        join_contents(&self.relevant_items)
    }
}

/// Contents separated by blank lines.
pub fn join_contents(items: &[RetrievedItem]) -> String {
    items
        .iter()
        .map(|i| i.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Fields a step writes; `None` leaves the field unchanged.
///
/// `step` is appended to `PipelineState::steps`. `history` entries are appended.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineUpdate {
    pub step: Option<String>,
    pub search_query: Option<String>,
    pub history: Vec<Message>,
    pub complexity: Option<Complexity>,
    pub entities: Option<Vec<EntityMention>>,
    pub entity_items: Option<Vec<RetrievedItem>>,
    pub semantic_items: Option<Vec<RetrievedItem>>,
    pub merged_context: Option<Vec<RetrievedItem>>,
    pub relevant_items: Option<Vec<RetrievedItem>>,
    pub retrieved_items: Option<Vec<RetrievedItem>>,
    pub sub_queries: Option<Vec<String>>,
    pub relevance_verdict: Option<RelevanceVerdict>,
    pub hallucination_verdict: Option<HallucinationVerdict>,
    pub retry_counter: Option<u32>,
    pub answer: Option<String>,
    pub strategy: Option<Strategy>,
}

impl PipelineUpdate {
    /// Empty update tagged with the step name.
    pub fn step(name: &str) -> Self {
        Self {
            step: Some(name.to_string()),
            ..Default::default()
        }
    }
}

impl GraphState for PipelineState {
    type Update = PipelineUpdate;

    fn apply(&mut self, update: PipelineUpdate) {
        fn set<T>(field: &mut T, value: Option<T>) {
            if let Some(v) = value {
                *field = v;
            }
        }
        fn set_opt<T>(field: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *field = value;
            }
        }

        if let Some(step) = update.step {
            self.steps.push(step);
        }
        self.history.extend(update.history);
        set(&mut self.search_query, update.search_query);
        set_opt(&mut self.complexity, update.complexity);
        set(&mut self.entities, update.entities);
        set(&mut self.entity_items, update.entity_items);
        set(&mut self.semantic_items, update.semantic_items);
        set(&mut self.merged_context, update.merged_context);
        set(&mut self.relevant_items, update.relevant_items);
        set(&mut self.retrieved_items, update.retrieved_items);
        set(&mut self.sub_queries, update.sub_queries);
        set_opt(&mut self.relevance_verdict, update.relevance_verdict);
        set_opt(&mut self.hallucination_verdict, update.hallucination_verdict);
        set(&mut self.retry_counter, update.retry_counter);
        set_opt(&mut self.answer, update.answer);
        set_opt(&mut self.strategy, update.strategy);
    }
}
