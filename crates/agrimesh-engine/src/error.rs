//! Engine-level error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while bootstrapping or running the simulation.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The configuration file could not be read.
    #[error("failed to read config {path}")]
    ConfigRead {
        /// The file that was attempted.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid YAML for [`SimulationConfig`].
    ///
    /// [`SimulationConfig`]: crate::config::SimulationConfig
    #[error("failed to parse config {path}")]
    ConfigParse {
        /// The file that was attempted.
        path: PathBuf,
        /// The underlying parse error.
        #[source]
        source: serde_yml::Error,
    },
}
