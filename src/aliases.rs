//! # Secure-Gate Type Aliases
//!
//! Type aliases for secret material handled during extraction, built on
//! [`secure-gate`](https://github.com/Slurp9187/secure-gate). All of them
//! zeroize on drop and require explicit `.expose_secret()` /
//! `.expose_secret_mut()` access, so no key or password ever leaks through
//! a `Debug` impl or lingers on a dropped stack frame.

use secure_gate::dynamic_alias;
use secure_gate::fixed_alias;

use hmac::Hmac;
use sha1::Sha1;

/// HMAC-SHA1 — the PRF required by this container's PBKDF2 derivation.
pub type HmacSha1 = Hmac<Sha1>;

// ─────────────────────────────────────────────────────────────────────────────
// Dynamic secrets
// ─────────────────────────────────────────────────────────────────────────────
dynamic_alias!(pub Password, String); // user-supplied backup password

/// Heap buffer for the decrypted wrapped-key blob, zeroized on drop.
pub type SecretBytes = secure_gate::Dynamic<Vec<u8>>;

// ─────────────────────────────────────────────────────────────────────────────
// Fixed-size secrets
// ─────────────────────────────────────────────────────────────────────────────
fixed_alias!(pub Aes256Key, 32); // derived user key, unwrapped master key
fixed_alias!(pub Iv16, 16); // unwrap IV, content IV
