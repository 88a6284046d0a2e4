//! Framed one-shot decompression.
//!
//! The declared original length is used twice: as the output reservation and
//! as a check once the payload is decoded.  The reservation is capped both by
//! the caller's limit and by what the payload could possibly expand to, and
//! `max_output_len` is enforced by the decoder on its own, so a lying header
//! can neither over-allocate nor let output grow past the limit.

use tracing::{debug, trace};

use super::header::{FrameHeader, FRAME_HEADER_SIZE};
use crate::block::decompress_core::{decompress_with_hint, CorruptKind, DecompressError};

/// Upper bound on decoded bytes per payload byte: a zero length-extension
/// byte stands for 255 output bytes.
pub const MAX_EXPANSION_RATIO: usize = 256;

/// Decompress a framed record into at most `max_output_len` bytes.
pub fn decompress_frame(src: &[u8], max_output_len: usize) -> Result<Vec<u8>, DecompressError> {
    match decompress_frame_impl(src, max_output_len) {
        Ok(out) => {
            trace!(input_len = src.len(), output_len = out.len(), "decompressed frame");
            Ok(out)
        }
        Err(e) => {
            debug!(input_len = src.len(), max_output_len, error = %e, "frame decompression failed");
            Err(e)
        }
    }
}

/// Read only the header of a framed record.
pub fn frame_info(src: &[u8]) -> Result<FrameHeader, DecompressError> {
    FrameHeader::parse(src)
}

/// Bytes to reserve up front for a payload of `payload_len` bytes that claims
/// to decode to `declared` bytes.
#[inline]
fn reservation_hint(declared: usize, payload_len: usize) -> usize {
    declared.min(payload_len.saturating_mul(MAX_EXPANSION_RATIO))
}

fn decompress_frame_impl(src: &[u8], max_output_len: usize) -> Result<Vec<u8>, DecompressError> {
    let header = FrameHeader::parse(src)?;
    let declared = header.original_len as usize;
    let payload = &src[FRAME_HEADER_SIZE..];
    let hint = reservation_hint(declared, payload.len());

    let (out, consumed) = decompress_with_hint(payload, hint, max_output_len)?;

    if out.len() != declared {
        return Err(DecompressError::CorruptStream(CorruptKind::LengthMismatch {
            declared,
            decoded: out.len(),
        }));
    }
    let trailing = src.len() - FRAME_HEADER_SIZE - consumed;
    if trailing > 0 {
        trace!(trailing, "ignoring bytes after end-of-stream marker");
    }
    Ok(out)
}
