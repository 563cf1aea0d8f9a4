//! Error types for the OpsBoard store
//!
//! Store mutations never fail: lookup misses are silent no-ops and
//! persistence failures are logged and swallowed inside
//! [`Persistence`](crate::Persistence). The errors here surface only from
//! constructors, configuration loading and the raw [`KeyValueStore`]
//! backends.
//!
//! [`KeyValueStore`]: crate::KeyValueStore

use std::path::PathBuf;

/// Top-level store error
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Backend could not be opened
    #[error("persistence error: {0}")]
    Persist(#[from] PersistError),

    /// Configuration rejected
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Key-value backend failures
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// Filesystem failure
    #[error("i/o error on {path}: {source}")]
    Io {
        /// File or directory involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Value could not be serialized
    #[error("failed to encode {key}: {source}")]
    Encode {
        /// Collection key
        key: String,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },

    /// Stored document is not valid for its collection
    #[error("failed to decode {key}: {source}")]
    Decode {
        /// Collection key
        key: String,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },

    /// Backend refused the operation
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

impl PersistError {
    /// Wrap an I/O error with the path it concerns
    #[inline]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Configuration failures
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file unreadable
    #[error("cannot read {path}: {source}")]
    Io {
        /// Config path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Config is not valid TOML for [`StoreConfig`](crate::StoreConfig)
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// No colors to pick custom responsible persons from
    #[error("color palette is empty")]
    EmptyPalette,

    /// Two roster entries share an id
    #[error("duplicate responsible person id in roster: {0}")]
    DuplicateRosterId(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_wraps_config() {
        let err = StoreError::from(ConfigError::EmptyPalette);
        assert!(err.to_string().contains("configuration error"));
        assert!(err.to_string().contains("palette"));
    }

    #[test]
    fn persist_io_mentions_path() {
        let err = PersistError::io(
            "/tmp/board/newRequests.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("newRequests.json"));
    }
}
