//! # abx
//!
//! Streaming extractor for the `ANDROID BACKUP` container format
//! (versions 1–5): text header parsing, password-based key unwrap
//! (PBKDF2-HMAC-SHA1 + AES-256-CBC), streaming payload decryption and
//! zlib inflation, composed into a single forward pipeline with progress
//! callbacks.
//!
//! The library never touches a terminal; it returns structured
//! [`AbxError`] values and leaves presentation to the caller (the `abx`
//! binary, or whatever embeds the pipeline).
//!
//! ```no_run
//! use abx::{Password, Pipeline};
//!
//! let pipeline = Pipeline::new();
//! let mut no_prompt = || None::<Password>;
//! let (header, written) = pipeline.extract_file(
//!     "backup.ab".as_ref(),
//!     "backup.tar".as_ref(),
//!     Some(Password::new::<String>("hunter2".into())),
//!     &mut no_prompt,
//!     None,
//! )?;
//! println!("v{} container, {written} bytes extracted", header.version);
//! # Ok::<(), abx::AbxError>(())
//! ```

pub mod aliases;
pub mod consts;
pub mod crypto;
pub mod error;
pub mod header;
pub mod pipeline;
pub mod stream;
pub mod utils;

// High-level API — what most users import
pub use error::AbxError;
pub use header::{read_header, BackupHeader, Encryption, EncryptionParams};
pub use pipeline::{PasswordSource, Pipeline, ProgressFn};

// Key-unwrap building blocks, public for custom flows
pub use aliases::Password;
pub use crypto::kdf::derive_user_key;
pub use crypto::unwrap::{unwrap_master_key, MasterKey};
pub use stream::CbcDecryptReader;
