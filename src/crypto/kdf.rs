//! PBKDF2 user-key derivation.

use pbkdf2::pbkdf2;
use secure_gate::{RevealSecret, RevealSecretMut};

use crate::aliases::{Aes256Key, HmacSha1, Password};
use crate::error::AbxError;

/// Derive the 32-byte user key with PBKDF2-HMAC-SHA1 directly into a
/// secure buffer.
///
/// SHA1 is what the container format mandates for its key derivation; it
/// is not negotiable per file.
#[inline(always)]
pub fn derive_user_key(
    password: &Password,
    salt: &[u8],
    rounds: u32,
    out_key: &mut Aes256Key,
) -> Result<(), AbxError> {
    if rounds == 0 {
        return Err(AbxError::Format("PBKDF2 rounds must be positive".into()));
    }

    pbkdf2::<HmacSha1>(
        password.expose_secret().as_bytes(),
        salt,
        rounds,
        out_key.expose_secret_mut(),
    )
    .map_err(|e| AbxError::Decryption(format!("PBKDF2 failed: {e}")))?;

    Ok(())
}
