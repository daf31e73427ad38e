//! # Key Unwrap
//!
//! The two-stage recovery of the content encryption key from an encrypted
//! container header:
//!
//! 1. PBKDF2-HMAC-SHA1 derives a 32-byte user key from the password and
//!    the header's salt/rounds.
//! 2. The header's wrapped key blob is AES-256-CBC-decrypted with that
//!    user key and the header IV, PKCS#7 padding stripped, and the result
//!    parsed as a length-prefixed `(content IV, content key)` pair.
//!
//! Every failure past key derivation — bad padding, short blob, wrong
//! field lengths — surfaces as [`AbxError::Decryption`] and is treated by
//! callers as a wrong password. Nothing here ever produces a
//! plausible-looking key from a wrong password.

use aes::cipher::{BlockDecrypt, KeyInit};
use aes::{Aes256Dec, Block as AesBlock};
use secure_gate::{RevealSecret, RevealSecretMut};

use crate::aliases::{Aes256Key, Iv16, Password, SecretBytes};
use crate::consts::{AES_BLOCK_LEN, MASTER_KEY_LEN};
use crate::crypto::kdf::derive_user_key;
use crate::crypto::{pkcs7_unpad, wrong_password};
use crate::error::AbxError;
use crate::header::EncryptionParams;
use crate::utils::xor_blocks;

/// Unwrapped content key material. Ephemeral: held only for the pipeline
/// lifetime, zeroized on drop.
#[derive(Debug)]
pub struct MasterKey {
    /// 32-byte AES-256 content key.
    pub key: Aes256Key,
    /// 16-byte CBC IV for the content stream.
    pub iv: Iv16,
}

/// Recover the content key and IV from `params` using `password`.
///
/// # Errors
///
/// [`AbxError::Decryption`] when the blob fails to decrypt cleanly or has
/// an invalid internal shape — both are indistinguishable from a wrong
/// password and may be retried with a fresh one.
pub fn unwrap_master_key(
    params: &EncryptionParams,
    password: &Password,
) -> Result<MasterKey, AbxError> {
    let mut user_key = Aes256Key::new([0u8; 32]);
    derive_user_key(password, &params.user_salt, params.rounds, &mut user_key)?;

    let cipher = Aes256Dec::new(user_key.expose_secret().into());

    // CBC-decrypt the blob; header validation guarantees block alignment.
    let mut blob = SecretBytes::new(vec![0u8; params.wrapped_key.len()]);
    let mut prev = [0u8; AES_BLOCK_LEN];
    prev.copy_from_slice(&params.user_iv);

    for (i, chunk) in params.wrapped_key.chunks_exact(AES_BLOCK_LEN).enumerate() {
        let mut block = *AesBlock::from_slice(chunk);
        cipher.decrypt_block(&mut block);
        xor_blocks(
            block.as_slice(),
            &prev,
            &mut blob.expose_secret_mut()[i * AES_BLOCK_LEN..(i + 1) * AES_BLOCK_LEN],
        );
        prev.copy_from_slice(chunk);
    }

    let inner = pkcs7_unpad(blob.expose_secret())?;
    parse_master_key(inner)
}

/// Parse the decrypted blob: `len, iv[len], len, key[len]`.
///
/// Trailing bytes after the key field are ignored; no other fields are
/// consumed.
fn parse_master_key(blob: &[u8]) -> Result<MasterKey, AbxError> {
    let mut cursor = 0usize;
    let iv = take_field(blob, &mut cursor)?;
    let key = take_field(blob, &mut cursor)?;

    if iv.len() != AES_BLOCK_LEN || key.len() != MASTER_KEY_LEN {
        return Err(wrong_password());
    }

    let mut master = MasterKey {
        key: Aes256Key::new([0u8; 32]),
        iv: Iv16::new([0u8; 16]),
    };
    master.iv.expose_secret_mut().copy_from_slice(iv);
    master.key.expose_secret_mut().copy_from_slice(key);
    Ok(master)
}

fn take_field<'a>(blob: &'a [u8], cursor: &mut usize) -> Result<&'a [u8], AbxError> {
    let len = *blob.get(*cursor).ok_or_else(wrong_password)? as usize;
    *cursor += 1;
    let field = blob
        .get(*cursor..*cursor + len)
        .ok_or_else(wrong_password)?;
    *cursor += len;
    Ok(field)
}
