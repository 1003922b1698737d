//! Core error types.
//!
//! The turn loop itself never fails: numeric edge cases are clamped and
//! resource exhaustion degrades to silent allocation failure. Errors exist
//! only at the save/restore boundary.

use thiserror::Error;

/// Errors from the save/restore boundary.
#[derive(Error, Debug)]
pub enum SaveError {
    #[error("could not access save path '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("save data is not valid: {0}")]
    Format(#[from] serde_json::Error),

    #[error("no save directory could be determined")]
    NoSaveDir,
}
