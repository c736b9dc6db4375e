//! Error types for the `coinfield-world` crate.
//!
//! The generator and the board are total; only memento encoding and
//! decoding can fail, and those failures surface as [`WorldError`].

/// Errors that can occur while reading or writing cache mementos.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// A stored memento could not be decoded.
    #[error("corrupt memento for cell {key}: {source}")]
    CorruptMemento {
        /// The cell key the memento is stored under.
        key: String,
        /// The underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    /// A stored memento was written by a newer schema than this build reads.
    #[error("memento for cell {key} has unsupported schema version {version}")]
    UnsupportedMementoVersion {
        /// The cell key the memento is stored under.
        key: String,
        /// The version found in the memento.
        version: u32,
    },

    /// A cache snapshot could not be encoded.
    #[error("failed to encode memento: {0}")]
    MementoEncoding(#[from] serde_json::Error),
}
