//! adaptive-rag-cli library: config loading, corpus indexing and the REPL
//! behind the `adaptive-rag` binary.
//!
//! Reads OpenAI config from .env, indexes the sample corpus (and any `--docs`)
//! into an in-memory store, then answers queries with the adaptive pipeline.
//!
//! ## Usage
//!
//! ```rust,no_run,ignore
//! let outcome = adaptive_rag_cli::run("What is LangGraph?").await?;
//! println!("{}", adaptive_rag_cli::format_outcome(&outcome));
//! ```

mod config;
mod corpus;
mod logging;
mod run;

pub use adaptive_rag::{RagOutcome, Strategy};
pub use config::{Error, RunConfig, RunOptions};
pub use corpus::sample_documents;
pub use logging::{env_filter, init_tracing};
pub use run::{
    answer, build_runner, build_runner_with, format_outcome, index_corpus, is_quit, repl, run,
    run_with_options, QUIT_COMMANDS,
};

#[cfg(test)]
mod tests;
