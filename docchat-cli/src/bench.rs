//! Side-by-side comparison of chat models over one conversation script.

use std::fmt::Write as _;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Context;
use chrono::Local;
use docchat_core::{ChatHistory, RetrievalChain};
use futures::future::join_all;
use tracing::{info, warn};

use crate::setup::Corpus;

/// One answered (or failed) question.
struct Turn {
    question: String,
    reply: Result<String, String>,
    elapsed: Duration,
}

/// Run the questions as one conversation per model, all models concurrently,
/// and write a plain-text transcript.
pub async fn run(
    corpus: &Corpus,
    models: &[String],
    questions: &Path,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let script = tokio::fs::read_to_string(questions)
        .await
        .with_context(|| format!("failed to read {}", questions.display()))?;
    let lines: Vec<&str> = script.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    if lines.is_empty() {
        anyhow::bail!("{} contains no questions", questions.display());
    }

    let chains = models.iter().map(|m| corpus.chain(m)).collect::<anyhow::Result<Vec<_>>>()?;
    let runs = join_all(chains.iter().map(|chain| converse(chain, &lines))).await;

    let mut transcript = String::new();
    writeln!(transcript, "# docchat bench {}", Local::now().format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(transcript, "# chunks: {}, top_k: {}", corpus.index.len(), corpus.config.top_k)?;
    for (model, turns) in models.iter().zip(&runs) {
        let total: Duration = turns.iter().map(|t| t.elapsed).sum();
        writeln!(transcript, "\n## {model} ({:.1}s total)", total.as_secs_f64())?;
        for turn in turns {
            writeln!(transcript, "\nQ: {}", turn.question)?;
            match &turn.reply {
                Ok(answer) => writeln!(transcript, "A: {answer}")?,
                Err(e) => writeln!(transcript, "ERROR: {e}")?,
            }
            writeln!(transcript, "({:.2}s)", turn.elapsed.as_secs_f64())?;
        }
    }

    match output {
        Some(path) => {
            tokio::fs::write(path, transcript)
                .await
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), "wrote transcript");
        }
        None => print!("{transcript}"),
    }
    Ok(())
}

/// Ask every question in order, carrying history between successful turns.
async fn converse(chain: &RetrievalChain, questions: &[&str]) -> Vec<Turn> {
    let mut history = ChatHistory::new();
    let mut turns = Vec::with_capacity(questions.len());

    for &question in questions {
        let started = Instant::now();
        let reply = match chain.invoke(history.messages(), question).await {
            Ok(answer) => {
                history.record_turn(question, answer.answer.as_str());
                Ok(answer.answer)
            }
            Err(e) => {
                warn!(model = chain.model().name(), error = %e, "bench question failed");
                Err(e.to_string())
            }
        };
        turns.push(Turn { question: question.to_string(), reply, elapsed: started.elapsed() });
    }
    turns
}
