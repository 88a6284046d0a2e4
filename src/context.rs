//! Ready-to-use codec handle.
//!
//! [`Lzo1x::init`] stands in for the one-time library initialisation that C
//! LZO requires before first use.  It holds no mutable state: every call
//! allocates its own working memory, so one handle can be copied freely and
//! shared between threads.

use crate::block::compress::CompressError;
use crate::block::decompress_core::DecompressError;
use crate::config::DEFAULT_MAX_OUTPUT_LEN;
use crate::frame::{compress_frame, decompress_frame};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lzo1x {
    default_max_output: usize,
}

impl Lzo1x {
    /// Returns a codec handle with the default decode limit.
    ///
    /// Idempotent: every call returns an identical value.
    pub const fn init() -> Self {
        Self { default_max_output: DEFAULT_MAX_OUTPUT_LEN }
    }

    /// Returns a copy of this handle whose [`decompress`](Self::decompress)
    /// accepts up to `max_output_len` bytes of output.
    pub const fn with_default_max_output(self, max_output_len: usize) -> Self {
        Self { default_max_output: max_output_len }
    }

    /// The limit applied by [`decompress`](Self::decompress).
    pub const fn default_max_output(&self) -> usize {
        self.default_max_output
    }

    /// Compress `input` into a framed record.
    pub fn compress(&self, input: &[u8]) -> Result<Vec<u8>, CompressError> {
        compress_frame(input)
    }

    /// Decompress a framed record using the handle's default limit.
    pub fn decompress(&self, input: &[u8]) -> Result<Vec<u8>, DecompressError> {
        decompress_frame(input, self.default_max_output)
    }

    /// Decompress a framed record into at most `max_output_len` bytes.
    pub fn decompress_with_limit(
        &self,
        input: &[u8],
        max_output_len: usize,
    ) -> Result<Vec<u8>, DecompressError> {
        decompress_frame(input, max_output_len)
    }
}

impl Default for Lzo1x {
    fn default() -> Self {
        Self::init()
    }
}
