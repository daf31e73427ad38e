//! # Constants
//!
//! Container format constants and tuning values used across the library.

/// Magic literal on the first header line of every backup container.
pub const BACKUP_MAGIC: &str = "ANDROID BACKUP";

/// Lowest container format version this library understands.
pub const MIN_VERSION: u32 = 1;

/// Highest container format version this library understands.
pub const MAX_VERSION: u32 = 5;

/// Encryption algorithm marker on header line 3 for encrypted containers.
pub const AES256_MARKER: &str = "AES-256";

/// Encryption algorithm marker on header line 3 for plain containers.
pub const NO_ENCRYPTION_MARKER: &str = "none";

/// Header line count for an unencrypted container.
pub const PLAIN_HEADER_LINES: usize = 4;

/// Header line count once line 3 reads `AES-256`.
pub const ENCRYPTED_HEADER_LINES: usize = 9;

/// Decoded byte length of the key-derivation salt (64 hex chars on the wire).
pub const USER_SALT_LEN: usize = 32;

/// AES block size; also the IV length for both unwrap and content ciphers.
pub const AES_BLOCK_LEN: usize = 16;

/// Decoded byte length of the content (master) encryption key.
pub const MASTER_KEY_LEN: usize = 32;

/// Upper bound on a single header line. Real headers stay well under this;
/// hitting it means the input is not a backup container at all.
pub const MAX_HEADER_LINE_LEN: usize = 8 * 1024;

/// Default number of password attempts before the pipeline gives up.
pub const DEFAULT_PASSWORD_ATTEMPTS: u32 = 3;

/// Chunk size for the pipeline copy loop and progress reporting.
pub const STREAM_CHUNK_LEN: usize = 64 * 1024;

/// Read size used by the streaming CBC stage when pulling ciphertext.
pub const CBC_READ_CHUNK_LEN: usize = 4 * 1024;
