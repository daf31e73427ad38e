//! tests/common.rs
//! Shared constants and container builders used across test files.
//!
//! Containers are built with the same primitives the library decrypts
//! with (RustCrypto AES + PBKDF2, flate2), but through the *encryption*
//! direction, so round-trip tests exercise the real wire format.

use std::io::Write;

use aes::cipher::{BlockEncrypt, KeyInit};
use aes::{Aes256Enc, Block as AesBlock};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use hmac::Hmac;
use pbkdf2::pbkdf2;
use sha1::Sha1;

/// Standard password used by encrypted test containers.
#[allow(dead_code)]
pub const TEST_PASSWORD: &str = "Hello";

/// Fast iteration count for tests; real backups use 10_000.
#[allow(dead_code)]
pub const TEST_ROUNDS: u32 = 16;

/// Stand-in archive payload. Not a real tar — byte-exactness is what the
/// pipeline guarantees, not archive validity.
#[allow(dead_code)]
pub const TEST_TAR: &[u8] =
    b"fake tar archive payload: long enough to span several cipher blocks.....";

#[allow(dead_code)]
pub const USER_SALT: [u8; 32] = [0x5a; 32];
#[allow(dead_code)]
pub const CHECKSUM_SALT: [u8; 32] = [0xc3; 32];
#[allow(dead_code)]
pub const USER_IV: [u8; 16] = [0x33; 16];
#[allow(dead_code)]
pub const MASTER_KEY: [u8; 32] = [0x77; 32];
#[allow(dead_code)]
pub const MASTER_IV: [u8; 16] = [0x44; 16];

/// PKCS#7-pad and AES-256-CBC-encrypt `plaintext`.
#[allow(dead_code)]
pub fn cbc_encrypt(key: &[u8; 32], iv: &[u8; 16], plaintext: &[u8]) -> Vec<u8> {
    let cipher = Aes256Enc::new(key.into());

    let pad = 16 - plaintext.len() % 16;
    let mut padded = plaintext.to_vec();
    padded.extend(std::iter::repeat(pad as u8).take(pad));

    let mut out = Vec::with_capacity(padded.len());
    let mut prev = *iv;
    for chunk in padded.chunks_exact(16) {
        let mut block = [0u8; 16];
        for (i, b) in block.iter_mut().enumerate() {
            *b = chunk[i] ^ prev[i];
        }
        let mut aes_block = AesBlock::from(block);
        cipher.encrypt_block(&mut aes_block);
        prev.copy_from_slice(aes_block.as_slice());
        out.extend_from_slice(&prev);
    }
    out
}

/// zlib-deflate `data` at the default level.
#[allow(dead_code)]
pub fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// PBKDF2-HMAC-SHA1 user key over the fixed test salt/rounds.
#[allow(dead_code)]
pub fn derive_user_key(password: &str) -> [u8; 32] {
    let mut key = [0u8; 32];
    pbkdf2::<Hmac<Sha1>>(password.as_bytes(), &USER_SALT, TEST_ROUNDS, &mut key).unwrap();
    key
}

/// Length-prefixed `(master IV, master key)` pair, encrypted under the
/// password-derived user key — the wire-format wrapped key blob.
#[allow(dead_code)]
pub fn wrapped_key_blob(password: &str) -> Vec<u8> {
    let user_key = derive_user_key(password);
    let mut blob = Vec::new();
    blob.push(MASTER_IV.len() as u8);
    blob.extend_from_slice(&MASTER_IV);
    blob.push(MASTER_KEY.len() as u8);
    blob.extend_from_slice(&MASTER_KEY);
    cbc_encrypt(&user_key, &USER_IV, &blob)
}

/// Unencrypted container: 4-line header plus raw payload bytes.
#[allow(dead_code)]
pub fn plain_container(version: u32, compressed: bool, payload: &[u8]) -> Vec<u8> {
    let flag = if compressed { 1 } else { 0 };
    let mut container = format!("ANDROID BACKUP\n{version}\n{flag}\nnone\n").into_bytes();
    container.extend_from_slice(payload);
    container
}

/// The nine header lines of a valid encrypted container, for tests that
/// need to corrupt individual fields.
#[allow(dead_code)]
pub fn encrypted_header_lines(compressed: bool) -> Vec<String> {
    vec![
        "ANDROID BACKUP".into(),
        "3".into(),
        if compressed { "1" } else { "0" }.into(),
        "AES-256".into(),
        hex::encode(USER_SALT),
        hex::encode(CHECKSUM_SALT),
        TEST_ROUNDS.to_string(),
        hex::encode(USER_IV),
        hex::encode(wrapped_key_blob(TEST_PASSWORD)),
    ]
}

/// Join header lines (appending the final delimiter) and glue the payload
/// on behind them.
#[allow(dead_code)]
pub fn container_from_lines(lines: &[String], payload: &[u8]) -> Vec<u8> {
    let mut container = lines.join("\n").into_bytes();
    container.push(b'\n');
    container.extend_from_slice(payload);
    container
}

/// Full encrypted container. `plaintext` is the pre-encryption payload —
/// pass it through [`deflate`] first for a compressed container.
#[allow(dead_code)]
pub fn encrypted_container(password: &str, compressed: bool, plaintext: &[u8]) -> Vec<u8> {
    let mut lines = encrypted_header_lines(compressed);
    lines[8] = hex::encode(wrapped_key_blob(password));
    container_from_lines(&lines, &cbc_encrypt(&MASTER_KEY, &MASTER_IV, plaintext))
}
