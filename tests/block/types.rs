// Unit tests for the LZO1x opcode grammar (block::types)
//
// Tests verify:
//   - every instruction form survives encode_instruction → decode_instruction
//   - encoded_len() agrees with the bytes actually written
//   - the decoder state selects between literal runs and the two M1 forms
//   - the first-byte literal form is only recognised at the start of a stream
//   - format constants keep their LZO1x values

use lzo1x::block::types::{
    decode_instruction, encode_instruction, CopyForm, Instruction, State, END_OF_STREAM,
    FIRST_LITERAL_MAX, M2_MAX_OFFSET, M3_MAX_OFFSET, MAX_DISTANCE, MIN_MATCH, WORKMEM_SLOTS,
};
use lzo1x::DecompressError;

fn encode(ins: &Instruction) -> Vec<u8> {
    let mut buf = vec![0u8; 64];
    let end = encode_instruction(ins, &mut buf, 0).expect("encode failed");
    buf.truncate(end);
    buf
}

fn assert_roundtrip(ins: Instruction, state: State) {
    let bytes = encode(&ins);
    assert_eq!(bytes.len(), ins.encoded_len(), "encoded_len for {ins:?}");
    let (decoded, consumed) = decode_instruction(&bytes, 0, state).expect("decode failed");
    assert_eq!(decoded, ins);
    assert_eq!(consumed, bytes.len());
}

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn constant_values() {
    assert_eq!(MIN_MATCH, 3);
    assert_eq!(MAX_DISTANCE, 0xBFFF);
    assert_eq!(M2_MAX_OFFSET, 0x0800);
    assert_eq!(M3_MAX_OFFSET, 0x4000);
    assert_eq!(END_OF_STREAM, [0x11, 0x00, 0x00]);
    assert_eq!(WORKMEM_SLOTS, 4096);
}

// ─────────────────────────────────────────────────────────────────────────────
// Literal runs
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn first_literal_form() {
    assert_eq!(encode(&Instruction::FirstLiteral { len: 1 }), [18]);
    assert_eq!(encode(&Instruction::FirstLiteral { len: FIRST_LITERAL_MAX }), [255]);
    assert_roundtrip(Instruction::FirstLiteral { len: 5 }, State::Start);
}

#[test]
fn first_literal_only_at_start() {
    // the same byte is an M3 opcode once anything has been decoded
    let bytes = [0x20 + 17 + 3, 0, 0];
    let (ins, _) = decode_instruction(&bytes, 0, State::Start).unwrap();
    assert!(matches!(ins, Instruction::FirstLiteral { len } if len == 0x20 + 3));
    let (ins, _) = decode_instruction(&bytes, 0, State::Idle).unwrap();
    assert!(matches!(ins, Instruction::Copy { form: CopyForm::M3, distance: 1, .. }));
}

#[test]
fn literal_run_lengths() {
    assert_eq!(encode(&Instruction::Literal { len: 4 }), [1]);
    assert_eq!(encode(&Instruction::Literal { len: 18 }), [15]);
    assert_eq!(encode(&Instruction::Literal { len: 19 }), [0, 1]);
    assert_eq!(encode(&Instruction::Literal { len: 18 + 255 }), [0, 255]);
    assert_eq!(encode(&Instruction::Literal { len: 18 + 256 }), [0, 0, 1]);
    for len in [4, 17, 18, 19, 200, 273, 274, 5000] {
        assert_roundtrip(Instruction::Literal { len }, State::Idle);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Copies
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn m2_roundtrip_over_its_range() {
    for distance in [1, 7, 8, 9, 1000, M2_MAX_OFFSET] {
        for len in 3..=8 {
            let ins = Instruction::copy(distance, len).unwrap();
            assert!(matches!(ins, Instruction::Copy { form: CopyForm::M2, .. }));
            assert_roundtrip(ins, State::Idle);
        }
    }
}

#[test]
fn m3_roundtrip_with_extended_lengths() {
    for distance in [1, 2049, M3_MAX_OFFSET] {
        for len in [9, 33, 34, 288, 289, 10_000] {
            let ins = Instruction::copy(distance, len).unwrap();
            assert!(matches!(ins, Instruction::Copy { form: CopyForm::M3, .. }));
            assert_roundtrip(ins, State::AfterRun);
        }
    }
}

#[test]
fn m4_roundtrip_across_high_bit() {
    for distance in [M3_MAX_OFFSET + 1, 0x7FFF, 0x8000, 0x8001, MAX_DISTANCE] {
        for len in [3, 9, 10, 264, 265] {
            let ins = Instruction::copy(distance, len).unwrap();
            assert!(matches!(ins, Instruction::Copy { form: CopyForm::M4, .. }));
            assert_roundtrip(ins, State::Trailing(2));
        }
    }
}

#[test]
fn trailing_bits_roundtrip() {
    for trailing in 0..=3u8 {
        for (distance, len) in [(5, 4), (3000, 40), (20_000, 12)] {
            let Some(Instruction::Copy { form, .. }) = Instruction::copy(distance, len) else {
                panic!("no copy for ({distance}, {len})");
            };
            assert_roundtrip(Instruction::Copy { form, distance, len, trailing }, State::Idle);
        }
    }
}

#[test]
fn low_opcode_meaning_depends_on_state() {
    let bytes = [0x05, 0x10];
    let (literal, _) = decode_instruction(&bytes, 0, State::Idle).unwrap();
    assert_eq!(literal, Instruction::Literal { len: 8 });

    let (short, consumed) = decode_instruction(&bytes, 0, State::Trailing(1)).unwrap();
    assert_eq!(consumed, 2);
    assert_eq!(
        short,
        Instruction::Copy { form: CopyForm::M1Short, distance: 1 + 1 + (0x10 << 2), len: 2, trailing: 1 }
    );

    let (far, _) = decode_instruction(&bytes, 0, State::AfterRun).unwrap();
    assert_eq!(
        far,
        Instruction::Copy { form: CopyForm::M1Far, distance: 2049 + 1 + (0x10 << 2), len: 3, trailing: 1 }
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Malformed opcodes
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn decode_past_end_is_truncated() {
    assert_eq!(decode_instruction(&[], 0, State::Start), Err(DecompressError::TruncatedInput));
    // M2 missing its distance byte
    assert_eq!(decode_instruction(&[0x40], 0, State::Idle), Err(DecompressError::TruncatedInput));
    // M4 with an unterminated length extension
    assert_eq!(
        decode_instruction(&[0x10, 0x00, 0x00], 0, State::Idle),
        Err(DecompressError::TruncatedInput)
    );
}

#[test]
fn encode_into_short_buffer_fails() {
    let mut buf = [0u8; 2];
    let ins = Instruction::copy(20_000, 4).unwrap();
    assert_eq!(
        encode_instruction(&ins, &mut buf, 0),
        Err(lzo1x::CompressError::BoundExceeded)
    );
}
