// lzo1x — LZO1x block codec with marker + length framing

pub mod block;
pub mod config;
pub mod context;
pub mod frame;

// ── Version constants ─────────────────────────────────────────────────────────
pub const LZO1X_VERSION_MAJOR: u32 = 1;
pub const LZO1X_VERSION_MINOR: u32 = 1;
pub const LZO1X_VERSION_RELEASE: u32 = 0;
pub const LZO1X_VERSION_NUMBER: u32 =
    LZO1X_VERSION_MAJOR * 100 * 100 + LZO1X_VERSION_MINOR * 100 + LZO1X_VERSION_RELEASE;
pub const LZO1X_VERSION_STRING: &str = "1.1.0";

/// LZO library release whose `lzo1x` stream format this crate reads and
/// writes (`LZO_VERSION` 0x1000, i.e. LZO 1.00).
pub const LZO_FORMAT_VERSION: u32 = 0x1000;

/// Returns the runtime version number.
pub fn version_number() -> u32 {
    LZO1X_VERSION_NUMBER
}

/// Returns the runtime version string.
pub fn version_string() -> &'static str {
    LZO1X_VERSION_STRING
}

// ── Top-level re-exports ──────────────────────────────────────────────────────
pub use block::{CompressError, CorruptKind, DecompressError, WorkMem};
pub use context::Lzo1x;
pub use frame::compress_bound;
pub use frame::compress_frame as compress;
pub use frame::decompress_frame as decompress;
