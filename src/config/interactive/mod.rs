use anyhow::{Context, Result};
use console::style;
use dialoguer::{Confirm, Input};

use super::{COHERE_API_KEY_ENV, Config, GROQ_API_KEY_ENV};

#[inline]
pub fn run_interactive_config() -> Result<()> {
    eprintln!("{}", style("🔧 docchat Configuration Setup").bold().cyan());
    eprintln!();

    let mut config = load_existing_config()?;

    eprintln!("{}", style("Embedding Service").bold().yellow());
    eprintln!("Remote embedding API used for documents and queries.");
    eprintln!();

    config.embedding.endpoint = Input::new()
        .with_prompt("Embedding endpoint")
        .default(config.embedding.endpoint.clone())
        .interact_text()?;
    config.embedding.model = Input::new()
        .with_prompt("Embedding model")
        .default(config.embedding.model.clone())
        .interact_text()?;
    config.embedding.dimension = Input::new()
        .with_prompt("Embedding dimension")
        .default(config.embedding.dimension)
        .interact_text()?;
    config.embedding.batch_size = Input::new()
        .with_prompt("Embedding batch size")
        .default(config.embedding.batch_size)
        .validate_with(|input: &u32| -> Result<(), &str> {
            if *input == 0 || *input > 96 {
                Err("Batch size must be between 1 and 96")
            } else {
                Ok(())
            }
        })
        .interact_text()?;

    eprintln!();
    eprintln!("{}", style("Generation Service").bold().yellow());

    config.generation.endpoint = Input::new()
        .with_prompt("Generation endpoint")
        .default(config.generation.endpoint.clone())
        .interact_text()?;
    config.generation.model = Input::new()
        .with_prompt("Generation model")
        .default(config.generation.model.clone())
        .interact_text()?;
    config.generation.temperature = Input::new()
        .with_prompt("Temperature")
        .default(config.generation.temperature)
        .interact_text()?;
    config.generation.system_prompt = Input::new()
        .with_prompt("Assistant persona")
        .default(config.generation.system_prompt.clone())
        .interact_text()?;
    config.generation.fallback_sentence = Input::new()
        .with_prompt("Fallback sentence (answer not in context)")
        .default(config.generation.fallback_sentence.clone())
        .interact_text()?;

    eprintln!();
    eprintln!("{}", style("Chunking & Retrieval").bold().yellow());

    config.chunking.chunk_size = Input::new()
        .with_prompt("Chunk size (characters)")
        .default(config.chunking.chunk_size)
        .interact_text()?;
    config.chunking.chunk_overlap = Input::new()
        .with_prompt("Chunk overlap (characters)")
        .default(config.chunking.chunk_overlap)
        .interact_text()?;
    config.retrieval.top_k = Input::new()
        .with_prompt("Chunks retrieved per question")
        .default(config.retrieval.top_k)
        .interact_text()?;
    config.memory.window = Input::new()
        .with_prompt("Conversation exchanges kept in memory")
        .default(config.memory.window)
        .interact_text()?;

    eprintln!();
    if let Err(e) = config.validate() {
        eprintln!("{} {}", style("✗ Invalid configuration:").red(), e);
        return Ok(());
    }

    if Confirm::new()
        .with_prompt("Save configuration?")
        .default(true)
        .interact()?
    {
        config.save().context("Failed to save configuration")?;
        eprintln!("{}", style("✓ Configuration saved successfully!").green());
        eprintln!(
            "Configuration saved to: {}",
            style(config.config_file_path().display()).cyan()
        );
        eprintln!();
        eprintln!(
            "Remember to export {} and {} before running.",
            style(COHERE_API_KEY_ENV).cyan(),
            style(GROQ_API_KEY_ENV).cyan()
        );
    } else {
        eprintln!("Configuration not saved.");
    }

    Ok(())
}

#[inline]
pub fn show_config() -> Result<()> {
    let config = Config::load_default().context("Failed to load configuration")?;

    eprintln!("{}", style("📋 Current Configuration").bold().cyan());
    eprintln!();

    eprintln!("{}", style("Embedding:").bold().yellow());
    eprintln!("  Endpoint: {}", style(&config.embedding.endpoint).cyan());
    eprintln!("  Model: {}", style(&config.embedding.model).cyan());
    eprintln!("  Dimension: {}", style(config.embedding.dimension).cyan());
    eprintln!("  Batch Size: {}", style(config.embedding.batch_size).cyan());

    eprintln!("{}", style("Generation:").bold().yellow());
    eprintln!("  Endpoint: {}", style(&config.generation.endpoint).cyan());
    eprintln!("  Model: {}", style(&config.generation.model).cyan());
    eprintln!(
        "  Temperature: {}",
        style(config.generation.temperature).cyan()
    );
    eprintln!(
        "  Persona: {}",
        style(&config.generation.system_prompt).cyan()
    );
    eprintln!(
        "  Fallback: {}",
        style(&config.generation.fallback_sentence).cyan()
    );

    eprintln!("{}", style("Chunking:").bold().yellow());
    eprintln!("  Chunk Size: {}", style(config.chunking.chunk_size).cyan());
    eprintln!(
        "  Overlap: {}",
        style(config.chunking.chunk_overlap).cyan()
    );

    eprintln!("{}", style("Retrieval:").bold().yellow());
    eprintln!("  Top K: {}", style(config.retrieval.top_k).cyan());
    eprintln!("  Memory Window: {}", style(config.memory.window).cyan());

    eprintln!();
    eprintln!(
        "Config file: {}",
        style(config.config_file_path().display()).dim()
    );
    eprintln!(
        "Vector index: {}",
        style(config.vector_database_path().display()).dim()
    );

    Ok(())
}

fn load_existing_config() -> Result<Config> {
    Config::load_default().map_or_else(
        |_| {
            eprintln!(
                "{}",
                style("No existing configuration found. Using defaults.").yellow()
            );
            let base_dir = Config::default_base_dir()?;
            Ok(Config {
                base_dir,
                ..Config::default()
            })
        },
        |config| {
            eprintln!("{}", style("Found existing configuration.").green());
            Ok(config)
        },
    )
}
