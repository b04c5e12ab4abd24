// Configuration management module
// TOML settings, validation, and the interactive setup flow

pub mod interactive;
pub mod settings;

pub use interactive::{run_interactive_config, show_config};
pub use settings::{
    COHERE_API_KEY_ENV, Config, ConfigError, EmbeddingConfig, GenerationConfig, GROQ_API_KEY_ENV,
    MemoryConfig, RetrievalConfig,
};
