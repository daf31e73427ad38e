//! Low-level crypto: key derivation, key unwrap, and PKCS#7 handling.

pub mod kdf;
pub mod unwrap;

use secure_gate::ConstantTimeEq;

use crate::consts::AES_BLOCK_LEN;
use crate::error::AbxError;

/// Strip PKCS#7 padding from decrypted CBC plaintext.
///
/// `data` must be non-empty and block-aligned. The padding bytes are
/// compared in constant time; any violation maps to
/// [`AbxError::Decryption`], since for this format bad padding means a
/// wrong password or corrupt key material.
pub(crate) fn pkcs7_unpad(data: &[u8]) -> Result<&[u8], AbxError> {
    let pad = *data.last().ok_or_else(wrong_password)? as usize;
    if pad == 0 || pad > AES_BLOCK_LEN || pad > data.len() {
        return Err(wrong_password());
    }

    let boundary = data.len() - pad;
    let expected = [pad as u8; AES_BLOCK_LEN];
    if !data[boundary..].ct_eq(&expected[..pad]) {
        return Err(wrong_password());
    }

    Ok(&data[..boundary])
}

pub(crate) fn wrong_password() -> AbxError {
    AbxError::Decryption("wrong password or corrupted key material".into())
}
