//! Utility functions used across the library.

/// XORs two 16-byte blocks and writes the result to `output`.
///
/// Used by the CBC chaining paths in [`crate::crypto::unwrap`] and the
/// streaming decrypt stage.
///
/// # Panics (by contract)
///
/// Panics if any of the three slices is shorter than 16 bytes. Callers
/// always pass exact AES blocks, so the bounds checks vanish after
/// inlining and LLVM vectorizes the loop into 128-bit XORs.
#[inline(always)]
pub const fn xor_blocks(block_a: &[u8], block_b: &[u8], output: &mut [u8]) {
    let mut i = 0;
    while i < 16 {
        output[i] = block_a[i] ^ block_b[i];
        i += 1;
    }
}
