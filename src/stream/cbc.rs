//! Streaming AES-256-CBC decryption stage.

use std::io::{self, Read};

use aes::cipher::{BlockDecrypt, KeyInit};
use aes::{Aes256Dec, Block as AesBlock};
use secure_gate::RevealSecret;

use crate::consts::{AES_BLOCK_LEN, CBC_READ_CHUNK_LEN};
use crate::crypto::unwrap::MasterKey;
use crate::crypto::{pkcs7_unpad, wrong_password};
use crate::error::AbxError;
use crate::utils::xor_blocks;

/// Lazy, forward-only CBC decryption over an arbitrarily large ciphertext
/// stream.
///
/// Ciphertext is pulled in bounded chunks and decrypted as it arrives; the
/// most recently decrypted block is always withheld until the next read
/// proves it is not the final one, because the final block carries PKCS#7
/// padding that must be validated and stripped at end of stream. Memory
/// use is constant regardless of payload size.
///
/// Errors cross the [`Read`] boundary boxed inside [`io::Error`] and are
/// unboxed again by the pipeline copy loop.
pub struct CbcDecryptReader<R: Read> {
    inner: R,
    cipher: Aes256Dec,
    /// Previous ciphertext block (CBC chaining state), seeded with the IV.
    prev: [u8; AES_BLOCK_LEN],
    /// Decrypted block withheld until we know whether EOF follows it.
    held: Option<[u8; AES_BLOCK_LEN]>,
    /// Ciphertext remainder that does not yet fill a whole block.
    carry: [u8; AES_BLOCK_LEN],
    carry_len: usize,
    /// Plaintext ready to hand out.
    out: Vec<u8>,
    out_pos: usize,
    /// Set once the final block has been unpadded or the stream found
    /// malformed.
    done: bool,
}

impl<R: Read> CbcDecryptReader<R> {
    /// Wrap `inner`, which must be positioned at the first ciphertext byte.
    pub fn new(inner: R, master: &MasterKey) -> Self {
        let cipher = Aes256Dec::new(master.key.expose_secret().into());
        let mut prev = [0u8; AES_BLOCK_LEN];
        prev.copy_from_slice(master.iv.expose_secret());
        Self {
            inner,
            cipher,
            prev,
            held: None,
            carry: [0u8; AES_BLOCK_LEN],
            carry_len: 0,
            out: Vec::with_capacity(CBC_READ_CHUNK_LEN),
            out_pos: 0,
            done: false,
        }
    }

    /// Pull ciphertext until at least one plaintext block is releasable or
    /// the stream ends.
    fn refill(&mut self) -> io::Result<()> {
        self.out.clear();
        self.out_pos = 0;

        let mut chunk = [0u8; CBC_READ_CHUNK_LEN];
        loop {
            let n = self.inner.read(&mut chunk)?;
            if n == 0 {
                return self.finish();
            }
            self.absorb(&chunk[..n]);
            if !self.out.is_empty() {
                return Ok(());
            }
        }
    }

    /// Decrypt every whole block in `input`, always keeping the newest
    /// plaintext block back in `held`.
    fn absorb(&mut self, mut input: &[u8]) {
        while !input.is_empty() {
            let need = AES_BLOCK_LEN - self.carry_len;
            let take = need.min(input.len());
            self.carry[self.carry_len..self.carry_len + take].copy_from_slice(&input[..take]);
            self.carry_len += take;
            input = &input[take..];

            if self.carry_len == AES_BLOCK_LEN {
                let ciphertext = self.carry;
                self.carry_len = 0;

                let mut block = AesBlock::from(ciphertext);
                self.cipher.decrypt_block(&mut block);
                let mut plaintext = [0u8; AES_BLOCK_LEN];
                xor_blocks(block.as_slice(), &self.prev, &mut plaintext);
                self.prev = ciphertext;

                if let Some(released) = self.held.replace(plaintext) {
                    self.out.extend_from_slice(&released);
                }
            }
        }
    }

    /// End of ciphertext: validate alignment, unpad the withheld block.
    fn finish(&mut self) -> io::Result<()> {
        self.done = true;

        if self.carry_len != 0 {
            return Err(AbxError::Decryption(
                "ciphertext length is not a multiple of the cipher block size".into(),
            )
            .into_io());
        }

        match self.held.take() {
            Some(last) => {
                let kept = pkcs7_unpad(&last).map_err(AbxError::into_io)?;
                self.out.extend_from_slice(kept);
                Ok(())
            }
            // held is only None here when no ciphertext arrived at all;
            // PKCS#7 requires at least one block, so an empty stream is
            // as malformed as a bad padding byte.
            None => Err(wrong_password().into_io()),
        }
    }
}

impl<R: Read> Read for CbcDecryptReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.out_pos == self.out.len() {
            if self.done {
                return Ok(0);
            }
            self.refill()?;
            if self.out_pos == self.out.len() {
                // empty refill only happens at a clean end of stream
                return Ok(0);
            }
        }

        let n = (self.out.len() - self.out_pos).min(buf.len());
        buf[..n].copy_from_slice(&self.out[self.out_pos..self.out_pos + n]);
        self.out_pos += n;
        Ok(n)
    }
}
