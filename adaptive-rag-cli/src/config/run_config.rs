//! Run config: model endpoints, pipeline tunables and corpus sources.
//!
//! Filled from env / .env by [`RunConfig::from_env`], then adjusted by
//! [`RunConfig::apply_options`]. [`RunConfig::rag_config`] turns it into the
//! library's `RagConfig`.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use adaptive_rag::{QueryRewrite, RagConfig};

use super::RunOptions;

/// Error type used for config loading and runs.
pub type Error = Box<dyn std::error::Error + Send + Sync>;

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
const DEFAULT_LOG_LEVEL: &str = "info";

fn invalid_input(message: String) -> Error {
    Box::new(std::io::Error::new(std::io::ErrorKind::InvalidInput, message))
}

/// Parses `key` when set; a value that does not parse is an error naming the key.
fn parse_var<T, F>(get: &F, key: &str) -> Result<Option<T>, Error>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| invalid_input(format!("invalid value for {}: '{}'", key, raw))),
    }
}

/// `suffix` or `hyde` (case-insensitive).
fn parse_query_rewrite(raw: &str) -> Result<QueryRewrite, Error> {
    match raw.trim().to_lowercase().as_str() {
        "suffix" => Ok(QueryRewrite::Suffix),
        "hyde" | "hypothetical" => Ok(QueryRewrite::Hypothetical),
        _ => Err(invalid_input(format!(
            "invalid value for RAG_QUERY_REWRITE: '{}' (expected suffix or hyde)",
            raw
        ))),
    }
}

#[derive(Clone, Debug)]
pub struct RunConfig {
    /// OpenAI API base URL, e.g. `https://api.openai.com/v1`.
    pub api_base: String,
    pub api_key: String,
    /// Chat model name, e.g. `gpt-4o-mini`.
    pub model: String,
    /// Sampling temperature 0–2. Default: 0 so grading and classification are stable.
    pub temperature: Option<f32>,
    /// Embeddings API base URL. If not set, uses `api_base`.
    pub embedding_api_base: Option<String>,
    pub embedding_model: String,
    /// Default filter when `RUST_LOG` is not set.
    pub log_level: String,
    /// Per-call timeout for model and store calls.
    pub call_timeout: Option<Duration>,
    pub max_retries: Option<u32>,
    pub semantic_k: Option<usize>,
    /// Rerank merged results down to this many before grading.
    pub rerank_top_n: Option<usize>,
    pub query_rewrite: QueryRewrite,
    /// Extra files or directories to index.
    pub docs: Vec<PathBuf>,
    /// Seed the store with the built-in sample corpus.
    pub sample_corpus: bool,
    pub session: Option<String>,
    pub verbose: bool,
}

impl RunConfig {
    /// Fill config from env vars (and .env). Call `dotenv::dotenv().ok()` first.
    ///
    /// `OPENAI_API_KEY` required; `OPENAI_API_BASE`, `OPENAI_MODEL`,
    /// `OPENAI_EMBEDDING_MODEL` have defaults. `OPENAI_TEMPERATURE`,
    /// `OPENAI_EMBEDDING_API_BASE`, `LOG_LEVEL`, `RAG_CALL_TIMEOUT_SECS`,
    /// `RAG_MAX_RETRIES`, `RAG_SEMANTIC_K`, `RAG_RERANK_TOP_N` (0 disables) and
    /// `RAG_QUERY_REWRITE` (`suffix` | `hyde`) optional. A numeric variable that
    /// does not parse is an error.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) but reads variables through `get`.
    pub fn from_lookup<F>(get: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = get("OPENAI_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                invalid_input("OPENAI_API_KEY is not set; please configure it in .env".into())
            })?;
        let query_rewrite = match get("RAG_QUERY_REWRITE") {
            Some(raw) => parse_query_rewrite(&raw)?,
            None => QueryRewrite::default(),
        };
        Ok(Self {
            api_base: get("OPENAI_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            api_key,
            model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: Some(parse_var(&get, "OPENAI_TEMPERATURE")?.unwrap_or(0.0)),
            embedding_api_base: get("OPENAI_EMBEDDING_API_BASE"),
            embedding_model: get("OPENAI_EMBEDDING_MODEL")
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
            log_level: get("LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            call_timeout: parse_var(&get, "RAG_CALL_TIMEOUT_SECS")?
                .filter(|secs: &u64| *secs > 0)
                .map(Duration::from_secs),
            max_retries: parse_var(&get, "RAG_MAX_RETRIES")?,
            semantic_k: parse_var(&get, "RAG_SEMANTIC_K")?,
            rerank_top_n: parse_var(&get, "RAG_RERANK_TOP_N")?.filter(|n: &usize| *n > 0),
            query_rewrite,
            docs: Vec::new(),
            sample_corpus: true,
            session: None,
            verbose: false,
        })
    }

    /// Apply optional overrides from `RunOptions`; only set fields override.
    pub fn apply_options(&mut self, options: &RunOptions) {
        if let Some(t) = options.temperature {
            self.temperature = Some(t);
        }
        if let Some(n) = options.max_retries {
            self.max_retries = Some(n);
        }
        if let Some(k) = options.semantic_k {
            self.semantic_k = Some(k);
        }
        if options.session.is_some() {
            self.session = options.session.clone();
        }
        self.docs.extend(options.docs.iter().cloned());
        if options.no_sample_corpus {
            self.sample_corpus = false;
        }
        self.verbose = options.verbose;
    }

    /// Effective embeddings base URL (falls back to `api_base`).
    pub fn embedding_api_base(&self) -> &str {
        self.embedding_api_base.as_deref().unwrap_or(&self.api_base)
    }

    /// Pipeline tunables: library defaults with this config's overrides.
    pub fn rag_config(&self) -> RagConfig {
        let defaults = RagConfig::default();
        RagConfig {
            max_retries: self.max_retries.unwrap_or(defaults.max_retries),
            semantic_k: self.semantic_k.unwrap_or(defaults.semantic_k),
            call_timeout: self.call_timeout,
            rerank_top_n: self.rerank_top_n,
            query_rewrite: self.query_rewrite,
            ..defaults
        }
    }
}
