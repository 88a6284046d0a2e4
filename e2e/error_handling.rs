//! E2E Test Suite 02: Error Handling & Edge Cases
//!
//! Tests that malformed framed records are rejected with the right error
//! kind, without panicking and without writing past the caller's limit.
//!
//! Coverage:
//! - wrong marker byte (Format)
//! - short headers and cut payloads (TruncatedInput)
//! - output above the limit (OutputOverflow)
//! - back-references before the start of output (CorruptStream)
//! - length field disagreeing with the payload (CorruptStream / LengthMismatch)
//! - random garbage behind a valid header never panics
//!
//! Set `RUST_LOG=lzo1x=trace` to see the frame layer's events.

extern crate lzo1x;

use tracing_subscriber::EnvFilter;

use lzo1x::{compress, decompress, CorruptKind, DecompressError, Lzo1x};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ═════════════════════════════════════════════════════════════════════════════
// Test 1: wrong marker byte
// ═════════════════════════════════════════════════════════════════════════════

#[test]
fn test_invalid_marker() {
    init_tracing();
    let mut packed = compress(b"marker test").unwrap();
    packed[0] = 0xAB;
    assert_eq!(decompress(&packed, 512), Err(DecompressError::Format { found: 0xAB }));
}

#[test]
fn test_raw_block_is_not_a_frame() {
    init_tracing();
    // a raw block starts with its first opcode, never 0xF0 for this input
    let raw = lzo1x::block::compress_block_to_vec(b"raw raw raw raw").unwrap();
    assert!(matches!(decompress(&raw, 512), Err(DecompressError::Format { .. })));
}

// ═════════════════════════════════════════════════════════════════════════════
// Test 2: truncation
// ═════════════════════════════════════════════════════════════════════════════

#[test]
fn test_truncated_header() {
    init_tracing();
    assert_eq!(decompress(&[], 512), Err(DecompressError::TruncatedInput));
    assert_eq!(decompress(&[0xF0, 0, 0], 512), Err(DecompressError::TruncatedInput));
}

#[test]
fn test_every_cut_of_a_frame_fails() {
    init_tracing();
    let data = b"The quick brown fox jumps over the lazy dog. ".repeat(8);
    let packed = compress(&data).unwrap();
    for cut in 0..packed.len() {
        let result = decompress(&packed[..cut], data.len());
        assert_eq!(result, Err(DecompressError::TruncatedInput), "cut at {cut}");
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// Test 3: output limit
// ═════════════════════════════════════════════════════════════════════════════

#[test]
fn test_output_over_limit() {
    init_tracing();
    let data = vec![0x55u8; 600];
    let packed = compress(&data).unwrap();
    assert_eq!(
        Lzo1x::init().decompress(&packed),
        Err(DecompressError::OutputOverflow { limit: 512 })
    );
}

#[test]
fn test_lying_header_cannot_exceed_limit() {
    init_tracing();
    // claims 10 bytes but decodes to 5000; the limit stops it, not the header
    let data = vec![1u8; 5000];
    let mut packed = compress(&data).unwrap();
    packed[1..5].copy_from_slice(&10u32.to_be_bytes());
    assert_eq!(decompress(&packed, 1000), Err(DecompressError::OutputOverflow { limit: 1000 }));
}

// ═════════════════════════════════════════════════════════════════════════════
// Test 4: corrupt payloads
// ═════════════════════════════════════════════════════════════════════════════

#[test]
fn test_back_reference_before_start() {
    init_tracing();
    // header for 4 bytes, literal 'a', M3 copy of 3 from distance 5
    let frame = [0xF0, 0, 0, 0, 4, 18, b'a', 0x21, 16, 0, 0x11, 0, 0];
    let err = decompress(&frame, 512).unwrap_err();
    assert_eq!(
        err,
        DecompressError::CorruptStream(CorruptKind::InvalidBackReference { distance: 5, written: 1 })
    );
    assert!(err.to_string().contains("back-reference"));
}

#[test]
fn test_length_field_mismatch() {
    init_tracing();
    let mut packed = compress(b"twelve bytes").unwrap();
    packed[4] = 11;
    assert_eq!(
        decompress(&packed, 512),
        Err(DecompressError::CorruptStream(CorruptKind::LengthMismatch {
            declared: 11,
            decoded: 12
        }))
    );
}

#[test]
fn test_garbage_payload_never_panics() {
    init_tracing();
    let mut seed = 0xC0FF_EEu32;
    for len in 0..300usize {
        let mut frame = vec![0xF0, 0, 0, 1, 0];
        frame.extend((0..len).map(|_| {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            seed as u8
        }));
        if let Ok(out) = decompress(&frame, 256) {
            assert_eq!(out.len(), 256);
        }
    }
}
