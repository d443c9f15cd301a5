//! docchat: ask questions about a text document from the terminal.
//!
//! Provides an interactive chat, a single-question mode and a multi-model
//! benchmark, all backed by a local Ollama server.

mod bench;
mod repl;
mod setup;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use docchat_core::ollama::DEFAULT_CHAT_MODEL;
use tracing_subscriber::EnvFilter;

use crate::setup::CorpusArgs;

/// Chat with a document using retrieval-augmented generation.
#[derive(Parser, Debug)]
#[command(name = "docchat", version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive multi-turn chat
    Chat {
        #[command(flatten)]
        corpus: CorpusArgs,

        /// Chat model to answer with
        #[arg(short, long, env = "DOCCHAT_MODEL", default_value = DEFAULT_CHAT_MODEL)]
        model: String,
    },
    /// Answer a single question and exit
    Ask {
        #[command(flatten)]
        corpus: CorpusArgs,

        /// Chat model to answer with
        #[arg(short, long, env = "DOCCHAT_MODEL", default_value = DEFAULT_CHAT_MODEL)]
        model: String,

        /// Print the retrieved chunks after the answer
        #[arg(long)]
        sources: bool,

        /// Print the answer and its sources as JSON
        #[arg(long, conflicts_with = "sources")]
        json: bool,

        /// The question
        question: String,
    },
    /// Run a list of questions against several models and write a transcript
    Bench {
        #[command(flatten)]
        corpus: CorpusArgs,

        /// Comma-separated chat models to compare
        #[arg(long, value_delimiter = ',', required = true)]
        models: Vec<String>,

        /// File with one question per line; the questions form one conversation per model
        #[arg(long)]
        questions: PathBuf,

        /// Transcript file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = match cli.verbose {
        0 => "warn",
        1 => "docchat_core=debug,docchat=debug,info",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Chat { corpus, model } => {
            let corpus = corpus.load().await?;
            repl::run(&corpus, &model).await
        }
        Commands::Ask { corpus, model, sources, json, question } => {
            let corpus = corpus.load().await?;
            let chain = corpus.chain(&model)?;
            let answer = chain.invoke(&[], &question).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&answer)?);
                return Ok(());
            }
            println!("{}", answer.answer);
            if sources {
                repl::print_sources(&answer.source_chunks);
            }
            Ok(())
        }
        Commands::Bench { corpus, models, questions, output } => {
            let corpus = corpus.load().await?;
            bench::run(&corpus, &models, &questions, output.as_deref()).await
        }
    }
}
