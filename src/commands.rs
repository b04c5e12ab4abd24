use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use console::style;
use tracing::{info, warn};

use crate::chat::{ChatSession, PromptTemplate, SourceCitation};
use crate::config::Config;
use crate::database::lancedb::VectorStore;
use crate::embeddings::cohere::CohereClient;
use crate::ingest::Ingestor;
use crate::llm::groq::GroqClient;
use crate::retrieval::{Retriever, resolve_filter};

/// Ingest a directory of PDFs, rebuilding the vector index from scratch
#[inline]
pub async fn ingest(dir: &Path) -> Result<()> {
    let config = Config::load_default()?;
    let api_key = config
        .embedding
        .api_key()
        .context("Embedding service key missing")?;

    println!(
        "{} {}",
        style("📥 Ingesting PDF documents from").bold().cyan(),
        style(dir.display()).cyan()
    );

    let mut ingestor = Ingestor::new(config, api_key).await?;
    let report = ingestor.ingest_directory(dir).await?;

    println!();
    println!("Ingestion complete!");
    println!("  Documents indexed: {}", report.documents);
    println!("  Pages extracted: {}", report.pages);
    println!("  Chunks embedded: {}", report.chunks);

    if !report.skipped.is_empty() {
        println!();
        println!("{}", style("Skipped files:").yellow());
        for skipped in &report.skipped {
            println!("  ⚠️  {}: {}", skipped.path.display(), skipped.reason);
        }
    }

    println!();
    println!("Documents available for filtering:");
    for name in &report.doc_names {
        println!("  📚 {}", name);
    }

    Ok(())
}

/// Answer a single question and print the answer with its sources
#[inline]
pub async fn ask(question: &str, docs: &[String], top_k: Option<usize>) -> Result<()> {
    let config = Config::load_default()?;
    let mut session = build_session(&config, docs, top_k).await?;

    let retrieved = session
        .retrieve(question)
        .await
        .context("Search failed")?;

    match session.generate(question, &retrieved) {
        Ok(answer) => {
            println!();
            println!("{}", answer);
            print_sources(&retrieved.iter().map(SourceCitation::from_chunk).collect::<Vec<_>>());
            Ok(())
        }
        Err(e) => {
            // The retrieval succeeded, so show the sources even though
            // generation failed
            eprintln!("{} {}", style("✗ Answer generation failed:").red(), e);
            if !retrieved.is_empty() {
                print_sources(&retrieved.iter().map(SourceCitation::from_chunk).collect::<Vec<_>>());
            }
            Err(e.into())
        }
    }
}

/// Interactive chat loop with conversation memory
#[inline]
pub async fn chat(docs: &[String]) -> Result<()> {
    let config = Config::load_default()?;
    let mut session = build_session(&config, docs, None).await?;

    println!("{}", style("💬 docchat").bold().cyan());
    println!("Ask about your documents. Type 'exit' to quit.");
    println!();

    loop {
        let Ok(line) = dialoguer::Input::<String>::new()
            .with_prompt("You")
            .allow_empty(true)
            .interact_text()
        else {
            // EOF or interrupt ends the session
            break;
        };

        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if question == "exit" || question == "quit" {
            break;
        }

        let retrieved = match session.retrieve(question).await {
            Ok(retrieved) => retrieved,
            Err(e) => {
                eprintln!("{} {}", style("✗ Search failed:").red(), e);
                continue;
            }
        };

        match session.generate(question, &retrieved) {
            Ok(answer) => {
                println!();
                println!("{}", answer);
                print_sources(&retrieved.iter().map(SourceCitation::from_chunk).collect::<Vec<_>>());
                println!();
            }
            Err(e) => {
                eprintln!("{} {}", style("✗ Answer generation failed:").red(), e);
                if !retrieved.is_empty() {
                    print_sources(&retrieved.iter().map(SourceCitation::from_chunk).collect::<Vec<_>>());
                }
            }
        }
    }

    println!("👋 Bye");
    Ok(())
}

/// List the documents currently in the index
#[inline]
pub async fn list_documents() -> Result<()> {
    let config = Config::load_default()?;
    let store = VectorStore::open_existing(
        &config.vector_database_path(),
        config.embedding.dimension as usize,
    )
    .await?;

    let names = store.list_document_names().await?;
    let chunks = store.count_chunks().await?;

    if names.is_empty() {
        println!("The index is empty.");
        println!("Use 'docchat ingest <dir>' to ingest documents.");
        return Ok(());
    }

    println!("Indexed documents ({} total):", names.len());
    println!();
    for name in &names {
        println!("  📚 {}", name);
    }
    println!();
    println!("{} chunks indexed", chunks);

    Ok(())
}

/// Show configuration, API key presence, service health, and index stats
#[inline]
pub async fn show_status() -> Result<()> {
    let config = Config::load_default()?;

    println!("📊 docchat Status Report");
    println!("{}", "=".repeat(50));
    println!();

    println!("🔑 API Keys:");
    let embedding_key = match config.embedding.api_key() {
        Ok(key) => {
            println!("   ✅ Embedding key: set");
            Some(key)
        }
        Err(e) => {
            println!("   ❌ Embedding key: {}", e);
            None
        }
    };
    let generation_key = match config.generation.api_key() {
        Ok(key) => {
            println!("   ✅ Generation key: set");
            Some(key)
        }
        Err(e) => {
            println!("   ❌ Generation key: {}", e);
            None
        }
    };

    println!();
    println!("🤖 Embedding Service:");
    println!("   Endpoint: {}", config.embedding.endpoint);
    println!("   Model: {}", config.embedding.model);
    if let Some(key) = embedding_key {
        match CohereClient::new(&config.embedding, key) {
            Ok(client) => match client.health_check() {
                Ok(()) => println!("   ✅ Reachable"),
                Err(e) => println!("   ⚠️  Unhealthy: {}", e),
            },
            Err(e) => println!("   ❌ Client error: {}", e),
        }
    }

    println!();
    println!("💬 Generation Service:");
    println!("   Endpoint: {}", config.generation.endpoint);
    println!("   Model: {}", config.generation.model);
    if let Some(key) = generation_key {
        match GroqClient::new(&config.generation, key) {
            Ok(client) => match client.health_check() {
                Ok(()) => println!("   ✅ Model available"),
                Err(e) => println!("   ⚠️  Unhealthy: {}", e),
            },
            Err(e) => println!("   ❌ Client error: {}", e),
        }
    }

    println!();
    println!("🔍 Vector Index:");
    println!("   Path: {}", config.vector_database_path().display());
    match VectorStore::open_existing(
        &config.vector_database_path(),
        config.embedding.dimension as usize,
    )
    .await
    {
        Ok(store) => {
            let names = store.list_document_names().await?;
            let chunks = store.count_chunks().await?;
            println!("   ✅ {} documents, {} chunks", names.len(), chunks);
        }
        Err(e) => {
            println!("   ❌ {}", e);
        }
    }

    println!();
    println!("💡 Next Steps:");
    println!("   • Use 'docchat ingest <dir>' to (re)build the index");
    println!("   • Use 'docchat ask <question>' for a one-shot answer");
    println!("   • Use 'docchat chat' for an interactive session");

    Ok(())
}

/// Wire up the per-session pipeline: clients are created once here and
/// reused for every turn of the session
async fn build_session(
    config: &Config,
    docs: &[String],
    top_k: Option<usize>,
) -> Result<ChatSession> {
    let embedding_key = config
        .embedding
        .api_key()
        .context("Embedding service key missing")?;
    let generation_key = config
        .generation
        .api_key()
        .context("Generation service key missing")?;

    let store = Arc::new(
        VectorStore::open_existing(
            &config.vector_database_path(),
            config.embedding.dimension as usize,
        )
        .await?,
    );

    let embedder =
        CohereClient::new(&config.embedding, embedding_key).context("Failed to create embedding client")?;
    let llm =
        GroqClient::new(&config.generation, generation_key).context("Failed to create generation client")?;

    let known = store.list_document_names().await?;
    if known.is_empty() {
        warn!("The index contains no documents; answers will fall back");
    }

    let filter = resolve_filter(docs, &known)?;
    if let Some(filter) = &filter {
        info!(
            "Restricting search to {} of {} documents",
            filter.len(),
            known.len()
        );
    }

    let k = top_k.unwrap_or(config.retrieval.top_k);
    let retriever = Retriever::new(embedder, store, k).with_filter(filter);

    Ok(ChatSession::new(
        retriever,
        llm,
        PromptTemplate::from_config(&config.generation),
        config.memory.window,
    ))
}

fn print_sources(sources: &[SourceCitation]) {
    if sources.is_empty() {
        return;
    }

    println!();
    println!("{}", style("Sources:").bold());
    for citation in sources {
        println!(
            "  {} - page {} (score {:.2})",
            style(&citation.doc_name).bold(),
            citation.page,
            citation.score
        );
        println!("    {}", style(&citation.excerpt).dim());
    }
}
