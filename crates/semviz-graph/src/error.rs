//! Error types for the graph crate

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading graph settings.
///
/// Tree-shape anomalies (unresolved references, empty containers, zero
/// counts) are never errors; they render in a degraded but valid form.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("failed to parse graph settings: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, GraphError>;
