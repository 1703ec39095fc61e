use super::config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Batch is empty; nothing to compute")]
    EmptyBatch,

    #[error("No descriptor provider registered for variant '{variant}'")]
    UnknownDescriptor { variant: String },

    #[error("Descriptor cache corrupted: {message}")]
    CacheCorruption { message: String },

    #[cfg(feature = "parallel")]
    #[error("Failed to build worker pool: {source}")]
    WorkerPool {
        #[from]
        source: rayon::ThreadPoolBuildError,
    },

    #[error("Invalid engine configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Internal logic error: {0}")]
    Internal(String),
}
