//! CLI error types.

use kdoc_builder::BuildError;
use kdoc_config::ConfigError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Build(#[from] BuildError),

    #[error("{0}")]
    Parse(#[from] kdoc_renderer::ParseError),

    #[error("{0}")]
    Validation(String),
}
