//! `adaptive-rag` binary: parse flags, build the runner, answer one query or run the REPL.

use std::path::PathBuf;

use adaptive_rag_cli::{
    answer, build_runner, format_outcome, init_tracing, repl, RunConfig, RunOptions,
};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "adaptive-rag")]
#[command(about = "Adaptive RAG: classify each question, retrieve, grade, self-correct")]
struct Args {
    /// File or directory (.txt / .md) to index; repeatable
    #[arg(short, long, value_name = "PATH")]
    docs: Vec<PathBuf>,

    /// Session id; keeps conversation history across questions
    #[arg(short, long)]
    session: Option<String>,

    /// Answer this question and exit instead of starting the REPL
    #[arg(short, long, value_name = "TEXT")]
    query: Option<String>,

    /// Maximum fallback re-searches per question
    #[arg(long)]
    max_retries: Option<u32>,

    /// Top-k for semantic search
    #[arg(long)]
    semantic_k: Option<usize>,

    /// Sampling temperature (0-2)
    #[arg(long)]
    temperature: Option<f32>,

    /// Log node enter/exit and show each step
    #[arg(short, long)]
    verbose: bool,

    /// Do not index the built-in sample corpus
    #[arg(long)]
    no_sample_corpus: bool,
}

impl From<Args> for RunOptions {
    fn from(args: Args) -> Self {
        RunOptions {
            docs: args.docs,
            session: args.session,
            query: args.query,
            max_retries: args.max_retries,
            semantic_k: args.semantic_k,
            temperature: args.temperature,
            verbose: args.verbose,
            no_sample_corpus: args.no_sample_corpus,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenv::dotenv().ok();
    let options = RunOptions::from(Args::parse());

    let mut config = match RunConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };
    config.apply_options(&options);
    init_tracing(&config.log_level, config.verbose);

    let runner = build_runner(&config).await?;
    let session = config.session.as_deref();

    if let Some(query) = &options.query {
        match answer(&runner, query, session, config.verbose).await {
            Ok(outcome) => print!("{}", format_outcome(&outcome)),
            Err(e) => {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    println!("Adaptive RAG. Ask a question, or type quit / exit / q to leave.");
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    repl(&runner, session, config.verbose, stdin, &mut stdout).await?;
    Ok(())
}
