//! Interactive chat loop.

use docchat_core::{ChatHistory, SearchResult};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::setup::Corpus;

/// Print retrieved chunks as a numbered list with their source line range.
pub fn print_sources(sources: &[SearchResult]) {
    for (i, result) in sources.iter().enumerate() {
        let chunk = &result.chunk;
        let lines = match (chunk.metadata.get("lines_from"), chunk.metadata.get("lines_to")) {
            (Some(from), Some(to)) => format!("lines {from}-{to}"),
            _ => format!("chunk {}", chunk.index),
        };
        let preview: String = chunk.text.split_whitespace().collect::<Vec<_>>().join(" ");
        let preview: String = preview.chars().take(100).collect();
        println!("  [{}] {} {} (score {:.3}): {}", i + 1, chunk.document_id, lines, result.score, preview);
    }
}

/// Run the chat until EOF, Ctrl-C, `exit` or `quit`.
///
/// A turn is added to the history only when the answer succeeded; a failed
/// turn is reported and the conversation continues unchanged.
pub async fn run(corpus: &Corpus, model: &str) -> anyhow::Result<()> {
    let chain = corpus.chain(model)?;
    let mut history = ChatHistory::new();
    let mut show_sources = false;
    let mut editor = DefaultEditor::new()?;

    println!(
        "Chatting with {model} over {} chunks. /sources toggles sources, /reset clears history, exit quits.",
        corpus.index.len()
    );

    loop {
        let line = match editor.readline("you> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        editor.add_history_entry(question)?;

        match question {
            "exit" | "quit" => break,
            "/sources" => {
                show_sources = !show_sources;
                println!("sources {}", if show_sources { "on" } else { "off" });
                continue;
            }
            "/reset" => {
                history = ChatHistory::new();
                println!("history cleared");
                continue;
            }
            _ => {}
        }

        match chain.invoke(history.messages(), question).await {
            Ok(answer) => {
                println!("{model}> {}", answer.answer);
                if show_sources {
                    print_sources(&answer.source_chunks);
                }
                history.record_turn(question, answer.answer);
            }
            Err(e) => {
                let hint = if e.is_transient() { " (try again)" } else { "" };
                eprintln!("error: {e}{hint}");
            }
        }
    }

    Ok(())
}
