//! # Extraction Pipeline
//!
//! Composes header-driven stages into one forward byte flow:
//! seek to payload → optional CBC decrypt → optional zlib inflate → sink.
//!
//! The pipeline owns the only mutable state in the flow — the running
//! output byte counter used for progress — and it alone drives the
//! password retry loop when the container is encrypted.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::aliases::Password;
use crate::consts::{DEFAULT_PASSWORD_ATTEMPTS, STREAM_CHUNK_LEN};
use crate::crypto::unwrap::{unwrap_master_key, MasterKey};
use crate::error::AbxError;
use crate::header::{read_header, BackupHeader, Encryption, EncryptionParams};
use crate::stream::build_payload_reader;

/// External collaborator that can supply passwords on demand.
///
/// Asked once per failed unwrap attempt. Returning `None` means no further
/// password is available and the pipeline aborts with the last
/// [`AbxError::Decryption`].
pub trait PasswordSource {
    fn request_password(&mut self) -> Option<Password>;
}

impl<F: FnMut() -> Option<Password>> PasswordSource for F {
    fn request_password(&mut self) -> Option<Password> {
        self()
    }
}

/// Byte-count observer: called with `(bytes_emitted_so_far, total_input
/// size)` after each chunk reaches the sink. The metric is output of the
/// final stage, not bytes read from the source.
pub type ProgressFn<'a> = &'a mut dyn FnMut(u64, u64);

/// Extraction pipeline configuration and driver.
#[derive(Debug, Clone)]
pub struct Pipeline {
    attempt_limit: u32,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    /// Pipeline with the default password attempt limit.
    pub fn new() -> Self {
        Self {
            attempt_limit: DEFAULT_PASSWORD_ATTEMPTS,
        }
    }

    /// Cap the number of password attempts (at least 1 is always made).
    pub fn with_attempt_limit(mut self, attempt_limit: u32) -> Self {
        self.attempt_limit = attempt_limit.max(1);
        self
    }

    /// Run the full extraction over an already parsed header.
    ///
    /// `source` may be positioned anywhere; it is measured (for the
    /// progress denominator) and then seeked to
    /// [`BackupHeader::payload_offset`] — header parsing and payload
    /// reading never share a cursor. `password` is the caller-supplied
    /// first attempt; further attempts come from `passwords`.
    ///
    /// Returns the number of bytes written to `sink`.
    pub fn run<R, W, S>(
        &self,
        header: &BackupHeader,
        mut source: R,
        sink: &mut W,
        password: Option<Password>,
        passwords: &mut S,
        progress: Option<ProgressFn<'_>>,
    ) -> Result<u64, AbxError>
    where
        R: Read + Seek,
        W: Write + ?Sized,
        S: PasswordSource,
    {
        let total_input = source.seek(SeekFrom::End(0))?;

        // Unwrap the key before touching the payload, so a wrong password
        // never writes a single output byte.
        let master = match &header.encryption {
            Encryption::None => None,
            Encryption::Aes256(params) => {
                Some(self.unwrap_with_retry(params, password, passwords)?)
            }
        };

        source.seek(SeekFrom::Start(header.payload_offset))?;
        let reader = build_payload_reader(&mut source, master.as_ref(), header.compressed);
        copy_with_progress(reader, sink, header.compressed, total_input, progress)
    }

    /// Convenience wrapper over file paths: existence and size checks,
    /// header parse, then a buffered run into a freshly created output.
    ///
    /// Returns the parsed header and the number of bytes written.
    pub fn extract_file<S: PasswordSource>(
        &self,
        input: &Path,
        output: &Path,
        password: Option<Password>,
        passwords: &mut S,
        progress: Option<ProgressFn<'_>>,
    ) -> Result<(BackupHeader, u64), AbxError> {
        let metadata = fs::metadata(input).map_err(|e| {
            AbxError::Io(io::Error::new(
                e.kind(),
                format!("backup file {}: {e}", input.display()),
            ))
        })?;
        if metadata.len() == 0 {
            return Err(AbxError::Io(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("backup file {} is empty", input.display()),
            )));
        }

        let header = read_header(&mut BufReader::new(File::open(input)?))?;

        // Fresh handle for the payload; the parse cursor is meaningless.
        let source = BufReader::new(File::open(input)?);
        let mut sink = BufWriter::new(File::create(output)?);
        let written = self.run(&header, source, &mut sink, password, passwords, progress)?;
        Ok((header, written))
    }

    /// Bounded retry loop around [`unwrap_master_key`]. The password is
    /// threaded explicitly: the caller's value is attempt one, every
    /// further attempt re-asks the collaborator.
    fn unwrap_with_retry<S: PasswordSource>(
        &self,
        params: &EncryptionParams,
        password: Option<Password>,
        passwords: &mut S,
    ) -> Result<MasterKey, AbxError> {
        let mut next = password;
        let mut last_failure = None;

        for _ in 0..self.attempt_limit {
            let attempt = match next.take().or_else(|| passwords.request_password()) {
                Some(p) => p,
                None => break,
            };
            match unwrap_master_key(params, &attempt) {
                Ok(master) => return Ok(master),
                Err(e @ AbxError::Decryption(_)) => last_failure = Some(e),
                Err(e) => return Err(e),
            }
        }

        Err(last_failure.unwrap_or_else(|| {
            AbxError::Decryption("no password supplied for encrypted backup".into())
        }))
    }
}

/// Copy loop: pull chunks from the final stage, push to the sink, report
/// progress from a counter owned here — never from any stage's internals.
fn copy_with_progress<W>(
    mut reader: Box<dyn Read + '_>,
    sink: &mut W,
    compressed: bool,
    total_input: u64,
    mut progress: Option<ProgressFn<'_>>,
) -> Result<u64, AbxError>
where
    W: Write + ?Sized,
{
    let mut chunk = vec![0u8; STREAM_CHUNK_LEN];
    let mut written: u64 = 0;

    loop {
        let n = match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => return Err(map_stage_error(e, compressed)),
        };
        sink.write_all(&chunk[..n])?;
        written += n as u64;
        if let Some(observer) = progress.as_deref_mut() {
            observer(written, total_input);
        }
    }

    sink.flush()?;
    Ok(written)
}

/// Errors surfacing from the read side of the stage chain: decrypt-stage
/// errors come back boxed and are unboxed verbatim; data-shaped errors
/// under an inflate stage are the decoder rejecting the stream.
fn map_stage_error(err: io::Error, compressed: bool) -> AbxError {
    match AbxError::from_io(err) {
        AbxError::Io(e)
            if compressed
                && matches!(
                    e.kind(),
                    io::ErrorKind::InvalidInput
                        | io::ErrorKind::InvalidData
                        | io::ErrorKind::UnexpectedEof
                ) =>
        {
            AbxError::Decompression(e.to_string())
        }
        other => other,
    }
}
