//! Error types for the engine binary.
//!
//! [`EngineError`] covers the failures that stop the host: bad configuration
//! at startup and a broken stdout. Everything that happens inside the event
//! loop is answered with a rejection reply instead.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: coinfield_core::ConfigError,
    },

    /// Reading events or writing replies failed.
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// A reply could not be encoded.
    #[error("reply encoding error: {source}")]
    Encode {
        /// The underlying serializer error.
        #[from]
        source: serde_json::Error,
    },
}
