//! # Error Types
//!
//! This module defines the error type used throughout the library.
//! All operations return [`Result<T, AbxError>`](AbxError).

use thiserror::Error;

/// The error type for all backup extraction operations.
#[derive(Error, Debug)]
pub enum AbxError {
    /// I/O error occurred during file operations.
    ///
    /// Wraps [`std::io::Error`]: missing input file, unreadable source,
    /// unwritable sink. Fatal.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed or unsupported container header.
    ///
    /// Covers bad magic, non-numeric or out-of-range version, invalid
    /// compressed/encryption flags, bad hex fields, and wrong salt/IV
    /// lengths. Fatal, raised before any payload byte is read.
    #[error("Format error: {0}")]
    Format(String),

    /// Wrong password or corrupted key material.
    ///
    /// Raised when the wrapped key blob does not decrypt to valid PKCS#7
    /// plaintext, or the unwrapped blob is structurally invalid. The only
    /// recoverable error: callers may re-prompt for a password and retry
    /// the unwrap.
    #[error("Decryption error: {0}")]
    Decryption(String),

    /// Corrupted or truncated compressed payload.
    ///
    /// Fatal; output already written to the sink is left as-is.
    #[error("Decompression error: {0}")]
    Decompression(String),
}

impl AbxError {
    /// Box this error into an [`std::io::Error`] so it can cross a
    /// [`std::io::Read`] boundary without losing its variant.
    pub(crate) fn into_io(self) -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::InvalidData, self)
    }

    /// Recover an [`AbxError`] previously boxed by [`Self::into_io`];
    /// anything else stays an I/O error.
    pub(crate) fn from_io(err: std::io::Error) -> Self {
        match err.downcast::<AbxError>() {
            Ok(inner) => inner,
            Err(err) => AbxError::Io(err),
        }
    }
}
