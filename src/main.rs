use std::path::PathBuf;

use clap::{Parser, Subcommand};
use docchat::Result;
use docchat::commands::{ask, chat, ingest, list_documents, show_status};
use docchat::config::{run_interactive_config, show_config};

#[derive(Parser)]
#[command(name = "docchat")]
#[command(about = "Ask questions about a library of PDF documents")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure service endpoints, models, and prompt wording
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
    /// Ingest a directory of PDF files, rebuilding the index
    Ingest {
        /// Directory containing the PDF files
        dir: PathBuf,
    },
    /// Ask a single question and print the answer with sources
    Ask {
        /// The question to answer
        question: String,
        /// Restrict the search to these documents (repeatable)
        #[arg(long = "doc")]
        docs: Vec<String>,
        /// Number of chunks to retrieve
        #[arg(long)]
        top_k: Option<usize>,
    },
    /// Start an interactive chat session with conversation memory
    Chat {
        /// Restrict the search to these documents (repeatable)
        #[arg(long = "doc")]
        docs: Vec<String>,
    },
    /// List the documents currently in the index
    List,
    /// Show configuration, service health, and index statistics
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Config { show } => {
            if show {
                show_config()?;
            } else {
                run_interactive_config()?;
            }
        }
        Commands::Ingest { dir } => {
            ingest(&dir).await?;
        }
        Commands::Ask {
            question,
            docs,
            top_k,
        } => {
            ask(&question, &docs, top_k).await?;
        }
        Commands::Chat { docs } => {
            chat(&docs).await?;
        }
        Commands::List => {
            list_documents().await?;
        }
        Commands::Status => {
            show_status().await?;
        }
    }

    Ok(())
}
