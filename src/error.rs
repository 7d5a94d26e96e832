//! Error types for patchport.
//!
//! Uses thiserror for derive macros and keeps the error taxonomy aligned with
//! how failures propagate: per-file errors (parse, translation, reconcile) are
//! caught at the batch boundary and skip only the offending file; repository
//! state errors abort the whole batch before any file work begins.

use crate::exit_codes;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for patchport operations.
#[derive(Error, Debug)]
pub enum PortError {
    /// User provided invalid arguments or an unusable input.
    #[error("{0}")]
    User(String),

    /// Malformed mapping file or diff syntax. Fatal for that single file only.
    #[error("parse error in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// The oracle could not resolve an identity where resolution is required.
    ///
    /// Non-fatal in the plain codec (the original text is kept and a warning
    /// emitted); fatal in the reconciler, since an unresolved identity cannot
    /// be safely re-emitted into a hunk.
    #[error("no translation for {kind} `{identity}` in scope `{scope}`")]
    TranslationMiss {
        kind: String,
        identity: String,
        scope: String,
    },

    /// A translated line could not be located in the target-namespace file.
    /// Fatal for that file only.
    #[error("cannot reconcile line `{line}`: {message}")]
    Reconcile { line: String, message: String },

    /// At least one file in a batch failed or was left unfinished.
    #[error("batch incomplete: {0}")]
    Batch(String),

    /// Git operation failed.
    #[error("git operation failed: {0}")]
    Git(String),

    /// Repository state is dirty or unknown; the whole batch must not proceed.
    #[error("repository state error: {0}")]
    RepoState(String),

    /// Underlying I/O failure, annotated with the path involved.
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PortError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            PortError::User(_) => exit_codes::USER_ERROR,
            PortError::Parse { .. }
            | PortError::TranslationMiss { .. }
            | PortError::Reconcile { .. }
            | PortError::Batch(_)
            | PortError::Io { .. } => exit_codes::CONVERSION_FAILURE,
            PortError::Git(_) => exit_codes::GIT_FAILURE,
            PortError::RepoState(_) => exit_codes::REPO_STATE_FAILURE,
        }
    }

    /// Convenience constructor for I/O errors with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PortError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for patchport operations.
pub type Result<T> = std::result::Result<T, PortError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_file_errors_map_to_conversion_failure() {
        let err = PortError::Parse {
            path: PathBuf::from("a.mapping"),
            message: "bad keyword".to_string(),
        };
        assert_eq!(err.exit_code(), exit_codes::CONVERSION_FAILURE);

        let err = PortError::Reconcile {
            line: "\tFIELD a b I".to_string(),
            message: "not found in target".to_string(),
        };
        assert_eq!(err.exit_code(), exit_codes::CONVERSION_FAILURE);
    }

    #[test]
    fn repo_state_error_is_batch_fatal_code() {
        let err = PortError::RepoState("uncommitted changes".to_string());
        assert_eq!(err.exit_code(), exit_codes::REPO_STATE_FAILURE);
    }

    #[test]
    fn error_messages_are_descriptive() {
        let err = PortError::TranslationMiss {
            kind: "FIELD".to_string(),
            identity: "f_abc".to_string(),
            scope: "net/minecraft/class_1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "no translation for FIELD `f_abc` in scope `net/minecraft/class_1`"
        );
    }
}
