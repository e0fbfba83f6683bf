use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenesisError {
    #[error("patch for {expected} applied to genesis with chain_id {found:?}")]
    NetworkIdentityMismatch { expected: &'static str, found: String },

    #[error("genesis has no {0} section")]
    MissingSection(String),

    #[error("{tool} failed: {reason}\n{output}")]
    ExternalToolFailure {
        tool: String,
        reason: String,
        output: String,
    },

    #[error("genesis io error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("genesis json error at {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot encode {what}: {source}")]
    Encode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl GenesisError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
