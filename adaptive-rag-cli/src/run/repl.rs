//! Line-oriented REPL over any async reader and writer.

use std::io::Write;

use adaptive_rag::{AdaptiveRagRunner, RagOutcome};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use super::{answer, Error};

/// Inputs that end the session.
pub const QUIT_COMMANDS: &[&str] = &["quit", "exit", "q"];

pub fn is_quit(line: &str) -> bool {
    let line = line.trim();
    QUIT_COMMANDS.iter().any(|c| line.eq_ignore_ascii_case(c))
}

/// Answer, strategy label and execution path, one per line.
pub fn format_outcome(outcome: &RagOutcome) -> String {
    let mut text = format!(
        "Answer: {}\nStrategy: {}\nPath: {}\n",
        outcome.answer,
        outcome.strategy,
        outcome.steps.join(" → ")
    );
    if outcome.retry_count > 0 {
        text.push_str(&format!("Retries: {}\n", outcome.retry_count));
    }
    text
}

/// Reads questions line by line until EOF or a quit command, answering each.
///
/// A failed query is reported on `output` and the loop continues. Returns the
/// number of questions answered.
pub async fn repl<R, W>(
    runner: &AdaptiveRagRunner,
    session: Option<&str>,
    verbose: bool,
    input: R,
    output: &mut W,
) -> Result<usize, Error>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    let mut answered = 0;
    loop {
        write!(output, "> ")?;
        output.flush()?;
        let Some(line) = lines.next_line().await? else {
            writeln!(output)?;
            break;
        };
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if is_quit(query) {
            break;
        }
        match answer(runner, query, session, verbose).await {
            Ok(outcome) => {
                answered += 1;
                writeln!(output, "{}", format_outcome(&outcome))?;
            }
            Err(e) => {
                tracing::error!(error = %e, query, "query failed");
                writeln!(output, "Error: {}\n", e)?;
            }
        }
    }
    Ok(answered)
}
