//! Framed one-shot compression.
//!
//! Wraps a raw LZO1x block in the marker + big-endian length header.  The
//! output buffer is allocated at the worst-case [`compress_bound`] and
//! truncated to the produced length before it is returned.

use tracing::{debug, trace};

use super::header::{compress_bound, FrameHeader, FRAME_HEADER_SIZE};
use crate::block::compress::{alloc_output, compress_block, CompressError, WorkMem};

/// Compress `src` into a framed record.
///
/// Working memory is allocated for this call only and released on return.
pub fn compress_frame(src: &[u8]) -> Result<Vec<u8>, CompressError> {
    let mut wrkmem = WorkMem::try_new().inspect_err(|e| {
        debug!(input_len = src.len(), error = %e, "working memory allocation failed");
    })?;
    compress_frame_with(src, &mut wrkmem)
}

/// Compress `src` into a framed record using caller-owned working memory.
///
/// `wrkmem` is reset before use, so reusing it across calls does not change
/// the output.
pub fn compress_frame_with(src: &[u8], wrkmem: &mut WorkMem) -> Result<Vec<u8>, CompressError> {
    match compress_frame_impl(src, wrkmem) {
        Ok(out) => {
            trace!(input_len = src.len(), output_len = out.len(), "compressed frame");
            Ok(out)
        }
        Err(e) => {
            debug!(input_len = src.len(), error = %e, "frame compression failed");
            Err(e)
        }
    }
}

fn compress_frame_impl(src: &[u8], wrkmem: &mut WorkMem) -> Result<Vec<u8>, CompressError> {
    let header = FrameHeader::for_input(src.len())?;
    let bound = compress_bound(src.len()).ok_or(CompressError::InputTooLarge)?;

    let mut out = alloc_output(bound)?;
    header.write(&mut out)?;
    let written = compress_block(src, wrkmem, &mut out[FRAME_HEADER_SIZE..])?;

    let total = FRAME_HEADER_SIZE + written;
    if total > bound {
        return Err(CompressError::BoundExceeded);
    }
    out.truncate(total);
    Ok(out)
}
