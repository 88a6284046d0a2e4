// config.rs — Compile-time configuration constants.
//
// The codec has no environment or file configuration: every tunable is fixed
// at build time here, and per-caller policy (the default decode limit) is held
// by `context::Lzo1x` instead of process-wide state.

// Default upper bound on decompressed output, in bytes, applied by
// `Lzo1x::decompress`.  The free `decompress` function always takes an
// explicit limit.
pub const DEFAULT_MAX_OUTPUT_LEN: usize = 512;

// Log2 of the number of hash buckets in the encoder working memory.
pub const HASH_LOG: u32 = 10;

// Ways per hash bucket: the depth of the bounded match chain probed at each
// input position.
pub const HASH_WAYS: usize = 4;
