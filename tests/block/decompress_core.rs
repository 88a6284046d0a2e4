// Unit tests for the LZO1x block decoder (block::decompress_core)
//
// Tests verify:
//   - hand-assembled streams covering every opcode form decode correctly
//   - overlapping copies replicate the most recent bytes
//   - back-references before the start of output are rejected
//   - every strict prefix of a valid stream reports TruncatedInput
//   - the output limit is enforced for both slice and Vec destinations
//   - bytes after the end-of-stream marker are reported, not decoded

use lzo1x::block::compress::compress_block_to_vec;
use lzo1x::block::decompress_core::{
    decompress_block, decompress_block_to_vec, CorruptKind, Decoded, DecompressError,
};
use lzo1x::block::types::END_OF_STREAM;

// ─────────────────────────────────────────────────────────────────────────────
// Hand-assembled streams
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn end_of_stream_alone_is_empty() {
    assert_eq!(decompress_block_to_vec(&END_OF_STREAM, 16).unwrap(), b"");
}

#[test]
fn first_literal_then_overlapping_m3() {
    // 'a', then an M3 copy of 33 + 66 bytes from distance 1
    let stream = [18, b'a', 0x20, 66, 0, 0, 0x11, 0, 0];
    assert_eq!(decompress_block_to_vec(&stream, 100).unwrap(), vec![b'a'; 100]);
}

#[test]
fn m2_copy_of_eight() {
    // "ab", then M2 len 8 distance 2
    let stream = [19, b'a', b'b', 0xE4, 0, 0x11, 0, 0];
    assert_eq!(decompress_block_to_vec(&stream, 64).unwrap(), b"ababababab");
}

#[test]
fn m1_short_copy_after_trailing_literals() {
    // "abc", M2 copy 3 from distance 3 with one trailing 'x',
    // then M1 short copy of 2 bytes from distance 2
    let stream = [20, b'a', b'b', b'c', 0x49, 0, b'x', 0x04, 0, 0x11, 0, 0];
    assert_eq!(decompress_block_to_vec(&stream, 64).unwrap(), b"abcabcxcx");
}

#[test]
fn m1_far_copy_after_literal_run() {
    // 2100 literals (18 + 8 * 255 + 42), then an M1 far copy of 3 bytes
    // from distance 2049 + 1 + 4 * 10
    let lits: Vec<u8> = (0..2100u32).map(|i| (i % 251) as u8).collect();
    let mut stream = vec![0u8, 0, 0, 0, 0, 0, 0, 0, 0, 42];
    stream.extend_from_slice(&lits);
    stream.extend_from_slice(&[0x04, 10, 0x11, 0, 0]);

    let out = decompress_block_to_vec(&stream, 4096).unwrap();
    let distance = 2049 + 1 + 4 * 10;
    assert_eq!(out.len(), 2103);
    assert_eq!(&out[..2100], lits.as_slice());
    assert_eq!(&out[2100..], &lits[2100 - distance..2103 - distance]);
}

#[test]
fn m4_copy_from_far_back() {
    // 0x4001 literal bytes then copy 4 from distance 0x4001
    let lits: Vec<u8> = (0..0x4001u32).map(|i| (i * 7 % 256) as u8).collect();
    let len = lits.len() - 18;
    let mut stream = vec![0u8; len / 255];
    stream.insert(0, 0);
    stream.push((len % 255) as u8);
    stream.extend_from_slice(&lits);
    // M4: len 4, off = 1 → le16 = 1 << 2
    stream.extend_from_slice(&[0x12, 0x04, 0x00, 0x11, 0, 0]);

    let out = decompress_block_to_vec(&stream, 0x5000).unwrap();
    assert_eq!(out.len(), 0x4005);
    assert_eq!(&out[0x4001..], &lits[..4]);
}

// ─────────────────────────────────────────────────────────────────────────────
// Corruption
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn back_reference_before_start_is_corrupt() {
    // M3 distance 5 with only one byte decoded
    let stream = [18, b'a', 0x21, 16, 0, 0x11, 0, 0];
    assert_eq!(
        decompress_block_to_vec(&stream, 64),
        Err(DecompressError::CorruptStream(CorruptKind::InvalidBackReference {
            distance: 5,
            written: 1
        }))
    );
}

#[test]
fn copy_as_first_instruction_is_corrupt() {
    // M4 copy from distance 0x4001 before anything is decoded
    let stream = [0x11, 0x04, 0, 0x11, 0, 0];
    assert!(matches!(
        decompress_block_to_vec(&stream, 64),
        Err(DecompressError::CorruptStream(CorruptKind::InvalidBackReference { .. }))
    ));
}

#[test]
fn every_prefix_is_truncated() {
    let src: Vec<u8> = b"truncation truncation truncation, and a tail".to_vec();
    let packed = compress_block_to_vec(&src).unwrap();
    for cut in 0..packed.len() {
        assert_eq!(
            decompress_block_to_vec(&packed[..cut], 1024),
            Err(DecompressError::TruncatedInput),
            "cut at {cut}"
        );
    }
}

#[test]
fn literal_run_past_input_is_truncated() {
    assert_eq!(
        decompress_block_to_vec(&[30, 1, 2, 3], 64),
        Err(DecompressError::TruncatedInput)
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Output limits
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn vec_limit_is_enforced() {
    let packed = compress_block_to_vec(&[0u8; 1000]).unwrap();
    assert_eq!(
        decompress_block_to_vec(&packed, 999),
        Err(DecompressError::OutputOverflow { limit: 999 })
    );
    assert_eq!(decompress_block_to_vec(&packed, 1000).unwrap().len(), 1000);
}

#[test]
fn slice_limit_is_enforced() {
    let packed = compress_block_to_vec(b"hello hello hello hello").unwrap();
    let mut small = [0u8; 10];
    assert_eq!(
        decompress_block(&packed, &mut small),
        Err(DecompressError::OutputOverflow { limit: 10 })
    );
    let mut exact = [0u8; 23];
    let decoded = decompress_block(&packed, &mut exact).unwrap();
    assert_eq!(decoded, Decoded { written: 23, input_consumed: packed.len() });
    assert_eq!(&exact, b"hello hello hello hello");
}

#[test]
fn zero_limit_accepts_only_empty_output() {
    assert_eq!(decompress_block_to_vec(&END_OF_STREAM, 0).unwrap(), b"");
    assert_eq!(
        decompress_block_to_vec(&[18, b'a', 0x11, 0, 0], 0),
        Err(DecompressError::OutputOverflow { limit: 0 })
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Trailing data
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn bytes_after_end_marker_are_not_consumed() {
    let mut stream = compress_block_to_vec(b"payload").unwrap();
    let valid = stream.len();
    stream.extend_from_slice(b"garbage");
    let mut out = [0u8; 32];
    let decoded = decompress_block(&stream, &mut out).unwrap();
    assert_eq!(decoded.input_consumed, valid);
    assert_eq!(&out[..decoded.written], b"payload");
}

#[test]
fn decompress_error_display() {
    assert_eq!(
        DecompressError::Format { found: 0x12 }.to_string(),
        "invalid frame marker 0x12"
    );
    assert_eq!(DecompressError::TruncatedInput.to_string(), "input was truncated");
    let msg = DecompressError::CorruptStream(CorruptKind::InvalidBackReference {
        distance: 9,
        written: 2,
    })
    .to_string();
    assert!(msg.starts_with("corrupt stream:"), "{msg}");
}
