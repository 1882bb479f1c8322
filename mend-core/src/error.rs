//! Error types for mend-core.

use thiserror::Error;

use crate::config::ConfigError;
use crate::memory::MemoryError;

/// Top-level error type for mend-core.
///
/// Resolution itself never surfaces these - the worst outcome of a heal is a
/// failed [`FixResult`](crate::FixResult). They come from construction and
/// configuration paths.
#[derive(Error, Debug)]
pub enum MendError {
    #[error("Memory error: {0}")]
    Memory(#[from] MemoryError),

    #[error("Backend error: {0}")]
    Backend(#[from] mend_models::Error),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}
