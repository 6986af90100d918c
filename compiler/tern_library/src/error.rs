//! Error type for library loading.

use std::io;
use std::path::{Path, PathBuf};

use tern_session::AbiVersion;
use thiserror::Error;

/// Error raised while opening, reading or materializing a library.
///
/// Errors own their data so a failed materialization can be cached and
/// handed to every later caller unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LibraryError {
    /// The library file does not exist.
    #[error("library '{}' not found", .path.display())]
    PathNotFound { path: PathBuf },

    /// The container was written under a different ABI version.
    #[error(
        "library '{}' was written for ABI version {found}, but this session reads ABI version {expected}",
        .path.display()
    )]
    VersionMismatch {
        path: PathBuf,
        expected: AbiVersion,
        found: AbiVersion,
    },

    /// The header or a fragment could not be decoded.
    #[error("corrupt library container '{}': {message}", .path.display())]
    CorruptContainer { path: PathBuf, message: String },

    /// No package with this fully qualified name exists in the container.
    #[error("package fragment '{fq_name}' not found in library '{}'", .path.display())]
    FragmentNotFound { path: PathBuf, fq_name: String },

    /// The file exists but could not be read.
    #[error("I/O error reading library '{}': {message}", .path.display())]
    Io { path: PathBuf, message: String },

    /// A library image was asked for its own module while materializing it.
    #[error("cyclic materialization of library '{library}'")]
    Cycle { library: String },

    /// A container could not be encoded.
    #[error("failed to encode library container for module '{module}': {message}")]
    Encode { module: String, message: String },
}

/// Result type for library operations.
pub type Result<T> = std::result::Result<T, LibraryError>;

impl LibraryError {
    /// Classify an I/O error raised while reading `path`.
    ///
    /// A vanished file is `PathNotFound`, a short read is a truncated
    /// container, anything else is reported as I/O.
    pub(crate) fn from_io(path: &Path, err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::PathNotFound {
                path: path.to_path_buf(),
            },
            io::ErrorKind::UnexpectedEof => Self::CorruptContainer {
                path: path.to_path_buf(),
                message: "unexpected end of file".to_string(),
            },
            _ => Self::Io {
                path: path.to_path_buf(),
                message: err.to_string(),
            },
        }
    }

    /// Create a `CorruptContainer` error.
    #[cold]
    #[inline(never)]
    pub(crate) fn corrupt(path: &Path, message: impl Into<String>) -> Self {
        Self::CorruptContainer {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }
}
