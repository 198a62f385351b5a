//! Optional overrides for a run (CLI flags or programmatic).
//!
//! Used by [`RunConfig::apply_options`](super::RunConfig::apply_options). The
//! binary maps its clap arguments onto a `RunOptions`; tests build one directly.

use std::path::PathBuf;

/// Optional overrides: only set fields replace the env-based config.
#[derive(Clone, Debug, Default)]
pub struct RunOptions {
    /// Files or directories to index in addition to (or instead of) the sample corpus.
    pub docs: Vec<PathBuf>,
    /// Session id; enables history across queries in one process.
    pub session: Option<String>,
    /// Answer this single query and exit instead of starting the REPL.
    pub query: Option<String>,
    /// Override `RagConfig::max_retries`.
    pub max_retries: Option<u32>,
    /// Override `RagConfig::semantic_k`.
    pub semantic_k: Option<usize>,
    /// Override sampling temperature (0–2).
    pub temperature: Option<f32>,
    /// Log node enter/exit and print each step as it finishes.
    pub verbose: bool,
    /// Do not seed the store with the built-in sample corpus.
    pub no_sample_corpus: bool,
}
