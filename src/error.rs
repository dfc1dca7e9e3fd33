//! Engine Errors
//!
//! Everything here is a programming or configuration mistake: a node used
//! without a capability it needs, a stale handle, an unregistered resource.
//! The engine never recovers locally; errors travel with `?` out of
//! `Scene::frame` to the embedding application.

use std::path::PathBuf;

use thiserror::Error;

use crate::core::AntId;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// `need` found no leaf, no pending set and no default to build.
    #[error("required leaf `{name}` is missing")]
    MissingLeaf { name: String },

    /// The executant was destroyed and its slot may have been reused.
    #[error("executant {0:?} no longer exists")]
    StaleAnt(AntId),

    /// Parenting would put an executant under itself.
    #[error("executant {child:?} cannot be placed under its own descendant {parent:?}")]
    TreeCycle { parent: AntId, child: AntId },

    /// A named curve, edge or pivot keyword was not recognized.
    #[error("unknown keyword `{0}`")]
    UnknownKeyword(String),

    /// A resource key was never registered.
    #[error("resource `{key}` is not registered")]
    ResourceNotFound { key: String },

    /// The scene config file could not be read.
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The scene config file is not valid RON.
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] ron::error::SpannedError),
}

impl Error {
    /// Shorthand for a missing leaf named by anything printable.
    pub fn missing(name: impl std::fmt::Display) -> Self {
        Error::MissingLeaf {
            name: name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_leaf_message() {
        let err = Error::missing("body");
        assert_eq!(err.to_string(), "required leaf `body` is missing");
    }

    #[test]
    fn test_resource_message() {
        let err = Error::ResourceNotFound { key: "balloon".into() };
        assert!(err.to_string().contains("balloon"));
    }
}
