//! Frame header layout, byte-order helpers and the framed compress bound.
//!
//! A framed record is:
//!
//! ```text
//! +--------+----------------------------+-------------------------+
//! | 0xF0   | original length (u32, BE)  | raw LZO1x block         |
//! +--------+----------------------------+-------------------------+
//!   1 byte   4 bytes                      variable
//! ```

use crate::block::compress::{block_compress_bound, CompressError};
use crate::block::decompress_core::DecompressError;

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Leading marker byte of every framed record.
pub const FRAME_MARKER: u8 = 0xF0;

/// Marker byte plus the 4-byte length field.
pub const FRAME_HEADER_SIZE: usize = 5;

/// Largest input a framed record can describe.
pub const MAX_FRAME_INPUT_SIZE: usize = u32::MAX as usize;

// ─────────────────────────────────────────────────────────────────────────────
// Byte-order I/O helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Read a big-endian `u32` from `src` at byte `offset`.
///
/// Returns `None` if fewer than four bytes are available there.
#[inline]
pub fn read_be32(src: &[u8], offset: usize) -> Option<u32> {
    let bytes = src.get(offset..offset.checked_add(4)?)?;
    Some(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Write a big-endian `u32` into `dst` at byte `offset`.
///
/// Returns `None`, leaving `dst` untouched, if the four bytes do not fit.
#[inline]
pub fn write_be32(dst: &mut [u8], offset: usize, value: u32) -> Option<()> {
    dst.get_mut(offset..offset.checked_add(4)?)?
        .copy_from_slice(&value.to_be_bytes());
    Some(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Header
// ─────────────────────────────────────────────────────────────────────────────

/// Decoded frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Size of the data before compression.
    pub original_len: u32,
}

impl FrameHeader {
    /// Header for `input_len` bytes of original data.
    pub fn for_input(input_len: usize) -> Result<Self, CompressError> {
        let original_len = u32::try_from(input_len).map_err(|_| CompressError::InputTooLarge)?;
        Ok(Self { original_len })
    }

    /// Parse the header at the start of `src`.
    ///
    /// Fails with `TruncatedInput` when fewer than [`FRAME_HEADER_SIZE`] bytes
    /// are present and with `Format` when the marker is wrong.
    pub fn parse(src: &[u8]) -> Result<Self, DecompressError> {
        let marker = *src.first().ok_or(DecompressError::TruncatedInput)?;
        if marker != FRAME_MARKER {
            return Err(DecompressError::Format { found: marker });
        }
        let original_len = read_be32(src, 1).ok_or(DecompressError::TruncatedInput)?;
        Ok(Self { original_len })
    }

    /// Write the header into the first [`FRAME_HEADER_SIZE`] bytes of `dst`.
    pub fn write(&self, dst: &mut [u8]) -> Result<(), CompressError> {
        let header = dst
            .get_mut(..FRAME_HEADER_SIZE)
            .ok_or(CompressError::BoundExceeded)?;
        header.copy_from_slice(&self.to_bytes());
        Ok(())
    }

    /// The header as bytes.
    pub fn to_bytes(&self) -> [u8; FRAME_HEADER_SIZE] {
        let [a, b, c, d] = self.original_len.to_be_bytes();
        [FRAME_MARKER, a, b, c, d]
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Compress bound
// ─────────────────────────────────────────────────────────────────────────────

/// Worst-case framed size for `input_size` bytes: `n + n/64 + 16 + 3`.
///
/// Returns `None` if the bound overflows `usize`.
#[inline]
pub fn compress_bound(input_size: usize) -> Option<usize> {
    block_compress_bound(input_size)?.checked_add(FRAME_HEADER_SIZE)
}
