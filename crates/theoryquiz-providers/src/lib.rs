//! theoryquiz-providers: text-generation provider integrations.
//!
//! Implements the `LlmProvider` trait for OpenAI-compatible endpoints and a
//! scriptable mock, and loads the configuration that selects between them.

pub mod config;
pub mod mock;
pub mod openai;

pub use config::{
    create_provider, load_config, load_config_from, Environment, ProviderConfig, QuizConfig,
};
pub use theoryquiz_core::error::ProviderError;
