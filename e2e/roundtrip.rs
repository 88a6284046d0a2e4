//! E2E Test Suite 01: Round-trips
//!
//! Validates that every input survives compress → decompress unchanged and
//! that the framed output never exceeds `n + n/64 + 16 + 3` bytes:
//! - property tests over arbitrary and low-entropy inputs
//! - the raw block API against the framed API
//! - buffers larger than the maximum back-reference distance
//! - the all-byte-values and all-zero edge cases

extern crate lzo1x;

use anyhow::Result;
use proptest::prelude::*;

use lzo1x::block::{compress_block_to_vec, decompress_block_to_vec, MAX_DISTANCE};
use lzo1x::{compress, compress_bound, decompress, Lzo1x};

fn assert_roundtrip(data: &[u8]) -> Result<Vec<u8>> {
    let packed = compress(data)?;
    let bound = compress_bound(data.len()).expect("bound overflow");
    anyhow::ensure!(
        packed.len() <= bound,
        "{} bytes compressed to {}, bound {}",
        data.len(),
        packed.len(),
        bound
    );
    let unpacked = decompress(&packed, data.len())?;
    anyhow::ensure!(unpacked == data, "round-trip mismatch for {} bytes", data.len());
    Ok(packed)
}

// ─────────────────────────────────────────────────────────────────────────────
// Property tests
// ─────────────────────────────────────────────────────────────────────────────

/// Inputs drawn from a small alphabet so that matches are common.
fn low_entropy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(prop::sample::select(b"abcd\0".to_vec()), 0..8192)
}

/// Runs of repeated bytes with random lengths, exercising long copies.
fn runs() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec((any::<u8>(), 1usize..600), 0..40).prop_map(|runs| {
        runs.into_iter()
            .flat_map(|(b, n)| std::iter::repeat(b).take(n))
            .collect()
    })
}

proptest! {
    #[test]
    fn arbitrary_bytes_roundtrip(data in prop::collection::vec(any::<u8>(), 0..4096)) {
        prop_assert!(assert_roundtrip(&data).is_ok());
    }

    #[test]
    fn low_entropy_roundtrip(data in low_entropy()) {
        prop_assert!(assert_roundtrip(&data).is_ok());
    }

    #[test]
    fn runs_roundtrip(data in runs()) {
        prop_assert!(assert_roundtrip(&data).is_ok());
    }

    #[test]
    fn raw_block_is_frame_payload(data in low_entropy()) {
        let framed = compress(&data).unwrap();
        let raw = compress_block_to_vec(&data).unwrap();
        prop_assert_eq!(&framed[5..], raw.as_slice());
        prop_assert_eq!(decompress_block_to_vec(&raw, data.len()).unwrap(), data);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Fixed cases
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_empty_input() -> Result<()> {
    let packed = assert_roundtrip(b"")?;
    assert_eq!(packed, [0xF0, 0, 0, 0, 0, 0x11, 0, 0]);
    Ok(())
}

#[test]
fn test_every_byte_value() -> Result<()> {
    let data: Vec<u8> = (0..=255u8).collect();
    assert_roundtrip(&data)?;
    Ok(())
}

#[test]
fn test_all_zero_megabyte() -> Result<()> {
    let data = vec![0u8; 1 << 20];
    let packed = assert_roundtrip(&data)?;
    assert!(packed.len() < 8192, "{} bytes", packed.len());
    Ok(())
}

#[test]
fn test_text_larger_than_window() -> Result<()> {
    let mut data = Vec::new();
    let mut i = 0u32;
    while data.len() < 3 * MAX_DISTANCE {
        data.extend_from_slice(format!("line {i}: the value is {}\n", i * 37 % 1000).as_bytes());
        i += 1;
    }
    let packed = assert_roundtrip(&data)?;
    assert!(packed.len() < data.len() * 3 / 4);
    Ok(())
}

#[test]
fn test_pattern_repeating_beyond_window() -> Result<()> {
    // a 60 KiB pseudo-random pattern, repeated: matches sit just past MAX_DISTANCE
    let mut seed = 0x1234_5678u32;
    let pattern: Vec<u8> = (0..60 * 1024)
        .map(|_| {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            (seed >> 16) as u8
        })
        .collect();
    let data = pattern.repeat(3);
    assert_roundtrip(&data)?;
    Ok(())
}

#[test]
fn test_context_roundtrip_with_large_limit() -> Result<()> {
    let codec = Lzo1x::init().with_default_max_output(1 << 20);
    let data = b"context round trip ".repeat(10_000);
    let packed = codec.compress(&data)?;
    assert_eq!(codec.decompress(&packed)?, data);
    Ok(())
}
