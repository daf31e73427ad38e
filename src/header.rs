//! # Header Parsing
//!
//! Reads and validates the newline-delimited text header at the front of a
//! backup container, producing a [`BackupHeader`] and the exact byte offset
//! at which the binary payload begins.
//!
//! # Header Format
//!
//! ```text
//! line 0: "ANDROID BACKUP"
//! line 1: version (decimal, 1..=5)
//! line 2: compressed flag ("0" | "1")
//! line 3: encryption algorithm ("none" | "AES-256")
//! -- only when line 3 == "AES-256":
//! line 4: user salt (hex, 32 bytes decoded)
//! line 5: checksum salt (hex, unused)
//! line 6: PBKDF2 rounds (decimal, > 0)
//! line 7: unwrap IV (hex, 16 bytes decoded)
//! line 8: wrapped key blob (hex ciphertext)
//! ```
//!
//! The payload starts immediately after the last consumed line's `\n`. The
//! offset is accumulated as `(line byte length + 1)` per consumed line while
//! scanning — it is never a fixed constant, and the parser never reads a
//! single byte past the required line count.

use std::io::Read;

use crate::consts::{
    AES256_MARKER, AES_BLOCK_LEN, BACKUP_MAGIC, ENCRYPTED_HEADER_LINES, MAX_HEADER_LINE_LEN,
    MAX_VERSION, MIN_VERSION, NO_ENCRYPTION_MARKER, PLAIN_HEADER_LINES, USER_SALT_LEN,
};
use crate::error::AbxError;

/// Validated container header.
///
/// Built once per file by [`read_header`]; immutable afterwards.
#[derive(Debug, Clone)]
pub struct BackupHeader {
    /// Container format version, within `[1, 5]`.
    pub version: u32,
    /// Whether the payload is deflate-compressed.
    pub compressed: bool,
    /// Payload encryption mode and, when present, its parameters.
    pub encryption: Encryption,
    /// Byte position where the payload begins: the sum of
    /// `(line length + 1)` over every consumed header line.
    pub payload_offset: u64,
}

impl BackupHeader {
    /// True when the payload must be decrypted before use.
    pub fn is_encrypted(&self) -> bool {
        matches!(self.encryption, Encryption::Aes256(_))
    }
}

/// Payload encryption mode.
#[derive(Debug, Clone)]
pub enum Encryption {
    /// Plain payload.
    None,
    /// AES-256-CBC with a password-wrapped content key.
    Aes256(EncryptionParams),
}

/// Cryptographic parameters carried by an encrypted container's header.
///
/// None of these are secret by themselves; the secrets only appear after
/// [`crate::crypto::unwrap::unwrap_master_key`] combines them with the
/// user's password.
#[derive(Debug, Clone)]
pub struct EncryptionParams {
    /// PBKDF2 salt for deriving the user key.
    pub user_salt: [u8; USER_SALT_LEN],
    /// PBKDF2 iteration count.
    pub rounds: u32,
    /// IV for decrypting the wrapped key blob.
    pub user_iv: Vec<u8>,
    /// Ciphertext of the length-prefixed content IV + key pair.
    pub wrapped_key: Vec<u8>,
}

/// Parse and validate a container header from `reader`.
///
/// Reads `\n`-delimited lines one byte at a time — 4 lines normally,
/// extended to 9 once line index 3 turns out to be `AES-256` — and never
/// looks ahead of the required count. The reader's position afterwards is
/// *not* meaningful for payload access; callers must reopen or seek the
/// source to [`BackupHeader::payload_offset`].
///
/// # Errors
///
/// [`AbxError::Format`] when the stream ends inside the header, the magic
/// or any field is malformed, the version falls outside `[1, 5]`, the salt
/// does not decode to exactly 32 bytes, the IV is not 16 bytes, or the
/// wrapped key blob is empty or not block-aligned.
pub fn read_header<R: Read>(reader: &mut R) -> Result<BackupHeader, AbxError> {
    let mut lines: Vec<String> = Vec::with_capacity(ENCRYPTED_HEADER_LINES);
    let mut required = PLAIN_HEADER_LINES;
    let mut payload_offset: u64 = 0;

    while lines.len() < required {
        let line = read_line(reader)?;
        // +1 for the stripped `\n` delimiter
        payload_offset += line.len() as u64 + 1;
        if lines.len() == 3 && line == AES256_MARKER {
            required = ENCRYPTED_HEADER_LINES;
        }
        lines.push(line);
    }

    if lines[0] != BACKUP_MAGIC {
        return Err(AbxError::Format(format!(
            "invalid magic string: {:?}",
            lines[0]
        )));
    }

    let version: u32 = lines[1]
        .parse()
        .map_err(|_| AbxError::Format(format!("version is not a number: {:?}", lines[1])))?;
    if !(MIN_VERSION..=MAX_VERSION).contains(&version) {
        return Err(AbxError::Format(format!(
            "don't know how to process version {version}"
        )));
    }

    let compressed = match lines[2].as_str() {
        "0" => false,
        "1" => true,
        other => {
            return Err(AbxError::Format(format!(
                "invalid compressed flag: {other:?}"
            )))
        }
    };

    let encryption = match lines[3].as_str() {
        NO_ENCRYPTION_MARKER => Encryption::None,
        AES256_MARKER => Encryption::Aes256(parse_encryption_params(&lines[4..])?),
        other => {
            return Err(AbxError::Format(format!(
                "unsupported encryption algorithm: {other:?}"
            )))
        }
    };

    Ok(BackupHeader {
        version,
        compressed,
        encryption,
        payload_offset,
    })
}

/// Validate the five encryption lines (header lines 4..=8).
fn parse_encryption_params(lines: &[String]) -> Result<EncryptionParams, AbxError> {
    let salt_bytes = decode_hex_field(&lines[0], "user salt")?;
    let user_salt: [u8; USER_SALT_LEN] = salt_bytes.as_slice().try_into().map_err(|_| {
        AbxError::Format(format!(
            "user salt must decode to {USER_SALT_LEN} bytes, got {}",
            salt_bytes.len()
        ))
    })?;

    // lines[1] is the checksum salt: consumed for offset accounting only.

    let rounds: u32 = lines[2]
        .parse()
        .map_err(|_| AbxError::Format(format!("PBKDF2 rounds is not a number: {:?}", lines[2])))?;
    if rounds == 0 {
        return Err(AbxError::Format("PBKDF2 rounds must be positive".into()));
    }

    let user_iv = decode_hex_field(&lines[3], "IV")?;
    if user_iv.len() != AES_BLOCK_LEN {
        return Err(AbxError::Format(format!(
            "IV must decode to {AES_BLOCK_LEN} bytes, got {}",
            user_iv.len()
        )));
    }

    let wrapped_key = decode_hex_field(&lines[4], "wrapped key blob")?;
    if wrapped_key.is_empty() || wrapped_key.len() % AES_BLOCK_LEN != 0 {
        return Err(AbxError::Format(format!(
            "wrapped key blob must be a non-empty multiple of {AES_BLOCK_LEN} bytes, got {}",
            wrapped_key.len()
        )));
    }

    Ok(EncryptionParams {
        user_salt,
        rounds,
        user_iv,
        wrapped_key,
    })
}

fn decode_hex_field(value: &str, name: &str) -> Result<Vec<u8>, AbxError> {
    hex::decode(value).map_err(|e| AbxError::Format(format!("{name} is not valid hex: {e}")))
}

/// Read one `\n`-terminated line, a byte at a time, without overshooting.
///
/// The delimiter is consumed but stripped from the returned value. EOF
/// before the delimiter means the header is truncated.
fn read_line<R: Read>(reader: &mut R) -> Result<String, AbxError> {
    let mut line = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        reader.read_exact(&mut byte).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                AbxError::Format("unexpected end of file inside header".into())
            } else {
                AbxError::Io(e)
            }
        })?;
        if byte[0] == b'\n' {
            break;
        }
        line.push(byte[0]);
        if line.len() > MAX_HEADER_LINE_LEN {
            return Err(AbxError::Format("header line too long".into()));
        }
    }
    String::from_utf8(line).map_err(|_| AbxError::Format("header line is not valid UTF-8".into()))
}
