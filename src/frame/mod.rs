//! Framed records: a marker byte and big-endian original length in front of a
//! raw LZO1x block.

pub mod compress;
pub mod decompress;
pub mod header;

// Re-export key public API items at the module level.
pub use compress::{compress_frame, compress_frame_with};
pub use decompress::{decompress_frame, frame_info};
pub use header::{compress_bound, FrameHeader, FRAME_HEADER_SIZE, FRAME_MARKER};
