//! Payload transform stages and their composition.
//!
//! Each stage is a pull-one-chunk [`Read`] adapter; composing them yields
//! a single forward byte flow with inherent backpressure — downstream
//! `read()` calls are the only thing that drives upstream consumption.

pub(crate) mod cbc;

pub use cbc::CbcDecryptReader;

use std::io::Read;

use flate2::read::ZlibDecoder;

use crate::crypto::unwrap::MasterKey;

/// Stack the optional decrypt and inflate stages over `source`, which must
/// already be positioned at the payload offset.
///
/// Order is fixed: source → CBC decrypt (when a key is present) → zlib
/// inflate (when `compressed`). Bytes leave the returned reader strictly
/// in source order.
pub fn build_payload_reader<'a, R: Read + 'a>(
    source: R,
    master: Option<&MasterKey>,
    compressed: bool,
) -> Box<dyn Read + 'a> {
    let decrypted: Box<dyn Read + 'a> = match master {
        Some(master) => Box::new(CbcDecryptReader::new(source, master)),
        None => Box::new(source),
    };

    if compressed {
        Box::new(ZlibDecoder::new(decrypted))
    } else {
        decrypted
    }
}
