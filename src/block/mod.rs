//! LZO1x block compression and decompression.
//!
//! This module contains the raw (unframed) LZO1x engine: the opcode grammar,
//! the greedy hash-chain encoder and the bounds-checked decoder.

pub mod compress;
pub mod decompress_core;
pub mod types;

// Re-export the most important public API items at the module level.
pub use compress::{
    block_compress_bound, compress_block, compress_block_to_vec, CompressError, WorkMem,
};
pub use decompress_core::{
    decompress_block, decompress_block_to_vec, CorruptKind, DecompressError, Decoded,
};
pub use types::{Instruction, MAX_DISTANCE, MIN_MATCH};
