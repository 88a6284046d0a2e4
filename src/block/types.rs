//! LZO1x block constants and the opcode grammar.
//!
//! The byte grammar is modelled as an explicit [`Instruction`] enum with an
//! [`encode_instruction`] / [`decode_instruction`] pair, so the encoder and the
//! decoder share one description of every opcode form:
//!
//! | First byte             | Decoder state | Instruction         | Length               | Distance                         |
//! |------------------------|---------------|---------------------|----------------------|----------------------------------|
//! | `> 17`                 | start         | first literal run   | `b - 17`             | -                                |
//! | `0000LLLL`             | idle          | literal run         | `L + 3`, `0` → `18 + ext` | -                           |
//! | `0000DDSS`             | trailing 1–3  | M1 short copy       | 2                    | `1 + (b >> 2) + (next << 2)`     |
//! | `0000DDSS`             | after run     | M1 far copy         | 3                    | `2049 + (b >> 2) + (next << 2)`  |
//! | `LLLDDDSS` (`>= 64`)   | any           | M2 copy             | `(b >> 5) + 1`       | `1 + ((b >> 2) & 7) + (next << 3)` |
//! | `001LLLLL`             | any           | M3 copy             | `L + 2`, `0` → `33 + ext` | `1 + (le16 >> 2)`           |
//! | `0001HLLL`             | any           | M4 copy             | `L + 2`, `0` → `9 + ext`  | `16384 + (H << 14) + (le16 >> 2)` |
//! | `0x11 0x00 0x00`       | any           | end of stream       | -                    | M4 with a zero offset            |
//!
//! `ext` is the classic LZ77 variable-length count: each `0x00` byte adds 255
//! and the first non-zero byte is added and terminates the count.  `SS` (the
//! low two bits of the last-but-one byte of a copy) is the number of literals,
//! 0–3, that directly follow the copy.

use core::mem::size_of;

use super::compress::CompressError;
use super::decompress_core::{CorruptKind, DecompressError};
use crate::config::{HASH_LOG, HASH_WAYS};

// ─────────────────────────────────────────────────────────────────────────────
// Format constants
// ─────────────────────────────────────────────────────────────────────────────

/// Shortest back-reference the encoder will emit.
pub const MIN_MATCH: usize = 3;

/// Largest distance of an M1 short copy.
pub const M1_MAX_OFFSET: usize = 0x0400;
/// Largest distance of an M2 copy.  M1 far copies start just past it.
pub const M2_MAX_OFFSET: usize = 0x0800;
/// Largest distance of an M3 copy.
pub const M3_MAX_OFFSET: usize = 0x4000;
/// Largest distance of an M4 copy, and of any back-reference.
pub const M4_MAX_OFFSET: usize = 0xBFFF;
/// Maximum back-reference distance of the format.
pub const MAX_DISTANCE: usize = M4_MAX_OFFSET;

/// Longest copy that fits an M2 opcode.
pub const M2_MAX_LEN: usize = 8;
/// Longest copy whose length fits inline in an M3 opcode.
pub const M3_MAX_LEN: usize = 33;
/// Longest copy whose length fits inline in an M4 opcode.
pub const M4_MAX_LEN: usize = 9;

pub const M3_MARKER: u8 = 0x20;
pub const M4_MARKER: u8 = 0x10;

/// Longest literal run expressible with the `17 + len` first-byte form.
pub const FIRST_LITERAL_MAX: usize = 238;
/// Longest literal run whose length fits inline in a literal opcode.
pub const SHORT_LITERAL_MAX: usize = 18;
/// Most literals that can ride in a copy's 2-bit state field.
pub const TRAILING_MAX: usize = 3;

/// End-of-stream marker: an M4 copy with a zero offset.
pub const END_OF_STREAM: [u8; 3] = [M4_MARKER | 1, 0, 0];

// ─────────────────────────────────────────────────────────────────────────────
// Working-memory sizing
// ─────────────────────────────────────────────────────────────────────────────

/// Number of hash buckets in the encoder working memory.
pub const HASH_BUCKETS: usize = 1 << HASH_LOG;
/// Number of pointer-width offset slots in the encoder working memory (4096).
pub const WORKMEM_SLOTS: usize = HASH_BUCKETS * HASH_WAYS;
/// Working-memory size in bytes.
pub const WORKMEM_SIZE: usize = WORKMEM_SLOTS * size_of::<usize>();

// ─────────────────────────────────────────────────────────────────────────────
// Grammar types
// ─────────────────────────────────────────────────────────────────────────────

/// How the decoder interprets an opcode below 16.
///
/// The meaning of a low opcode depends on what came right before it, so the
/// decoder threads this through every [`decode_instruction`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Nothing decoded yet; a first byte above 17 is an initial literal run.
    Start,
    /// After a copy with no trailing literals: low opcodes are literal runs.
    Idle,
    /// After 1–3 literals: low opcodes are 2-byte M1 copies.
    Trailing(u8),
    /// After a literal run of 4 or more bytes: low opcodes are 3-byte M1 copies.
    AfterRun,
}

impl State {
    /// State reached after `len` literal bytes have been copied.
    pub fn after_literals(len: usize) -> State {
        match len {
            0 => State::Idle,
            1..=TRAILING_MAX => State::Trailing(len as u8),
            _ => State::AfterRun,
        }
    }
}

/// The opcode class of a copy instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyForm {
    M1Short,
    M1Far,
    M2,
    M3,
    M4,
}

/// One unit of the LZO1x token stream.
///
/// Literal bytes themselves are not carried: they follow the opcode in the
/// stream (for literal runs) or follow the copy (for `trailing` literals).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// Literal run using the `17 + len` form; only valid as the first opcode.
    FirstLiteral { len: usize },
    /// Literal run of 4 or more bytes.
    Literal { len: usize },
    /// Back-reference, followed by `trailing` (0–3) literal bytes.
    Copy {
        form: CopyForm,
        distance: usize,
        len: usize,
        trailing: u8,
    },
    EndOfStream,
}

impl Instruction {
    /// Cheapest copy form able to carry `(distance, len)`.
    ///
    /// The M1 forms are never chosen: they depend on the preceding literal
    /// count and save nothing over M2.  Returns `None` when the pair is out of
    /// range for the format.
    pub fn copy(distance: usize, len: usize) -> Option<Instruction> {
        if distance == 0 || distance > MAX_DISTANCE || len < MIN_MATCH {
            return None;
        }
        let form = if len <= M2_MAX_LEN && distance <= M2_MAX_OFFSET {
            CopyForm::M2
        } else if distance <= M3_MAX_OFFSET {
            CopyForm::M3
        } else {
            CopyForm::M4
        };
        Some(Instruction::Copy { form, distance, len, trailing: 0 })
    }

    /// Literal run of `len >= 1` bytes, choosing the first-byte form when the
    /// run opens the stream and fits it.
    pub fn literal_run(len: usize, at_start: bool) -> Instruction {
        if at_start && len <= FIRST_LITERAL_MAX {
            Instruction::FirstLiteral { len }
        } else {
            Instruction::Literal { len }
        }
    }

    /// Number of bytes [`encode_instruction`] writes for this instruction,
    /// excluding literal payload bytes.
    pub fn encoded_len(&self) -> usize {
        match *self {
            Instruction::FirstLiteral { .. } => 1,
            Instruction::Literal { len } => {
                if len <= SHORT_LITERAL_MAX {
                    1
                } else {
                    1 + ext_len(len - SHORT_LITERAL_MAX)
                }
            }
            Instruction::Copy { form, len, .. } => match form {
                CopyForm::M1Short | CopyForm::M1Far | CopyForm::M2 => 2,
                CopyForm::M3 if len <= M3_MAX_LEN => 3,
                CopyForm::M3 => 3 + ext_len(len - M3_MAX_LEN),
                CopyForm::M4 if len <= M4_MAX_LEN => 3,
                CopyForm::M4 => 3 + ext_len(len - M4_MAX_LEN),
            },
            Instruction::EndOfStream => END_OF_STREAM.len(),
        }
    }
}

/// Bytes used by a variable-length count of `n >= 1`.
#[inline]
fn ext_len(n: usize) -> usize {
    1 + (n - 1) / 255
}

// ─────────────────────────────────────────────────────────────────────────────
// Encoding
// ─────────────────────────────────────────────────────────────────────────────

#[inline]
fn put(dst: &mut [u8], pos: usize, byte: u8) -> Result<usize, CompressError> {
    let slot = dst.get_mut(pos).ok_or(CompressError::BoundExceeded)?;
    *slot = byte;
    Ok(pos + 1)
}

/// Write a variable-length count `n >= 1`.
fn put_ext(dst: &mut [u8], mut pos: usize, mut n: usize) -> Result<usize, CompressError> {
    debug_assert!(n >= 1);
    while n > 255 {
        pos = put(dst, pos, 0)?;
        n -= 255;
    }
    put(dst, pos, n as u8)
}

/// Write the opcode bytes of `ins` into `dst` at `pos`.
///
/// Returns the position just past the written bytes, or
/// `Err(CompressError::BoundExceeded)` if `dst` is too small.  Literal payload
/// bytes are the caller's to copy.
pub fn encode_instruction(
    ins: &Instruction,
    dst: &mut [u8],
    mut pos: usize,
) -> Result<usize, CompressError> {
    match *ins {
        Instruction::FirstLiteral { len } => {
            debug_assert!((1..=FIRST_LITERAL_MAX).contains(&len));
            put(dst, pos, (17 + len) as u8)
        }
        Instruction::Literal { len } => {
            debug_assert!(len > TRAILING_MAX);
            if len <= SHORT_LITERAL_MAX {
                put(dst, pos, (len - 3) as u8)
            } else {
                pos = put(dst, pos, 0)?;
                put_ext(dst, pos, len - SHORT_LITERAL_MAX)
            }
        }
        Instruction::Copy { form, distance, len, trailing } => {
            debug_assert!(trailing as usize <= TRAILING_MAX);
            match form {
                CopyForm::M1Short | CopyForm::M1Far => {
                    let off = if form == CopyForm::M1Short {
                        debug_assert!(len == 2 && distance <= M1_MAX_OFFSET);
                        distance - 1
                    } else {
                        debug_assert!(len == 3 && distance > M2_MAX_OFFSET);
                        distance - (M2_MAX_OFFSET + 1)
                    };
                    pos = put(dst, pos, (((off & 3) << 2) as u8) | trailing)?;
                    put(dst, pos, (off >> 2) as u8)
                }
                CopyForm::M2 => {
                    debug_assert!(len <= M2_MAX_LEN && distance <= M2_MAX_OFFSET);
                    let off = distance - 1;
                    pos = put(dst, pos, (((len - 1) << 5) | ((off & 7) << 2)) as u8 | trailing)?;
                    put(dst, pos, (off >> 3) as u8)
                }
                CopyForm::M3 => {
                    debug_assert!(distance <= M3_MAX_OFFSET);
                    let off = distance - 1;
                    if len <= M3_MAX_LEN {
                        pos = put(dst, pos, M3_MARKER | (len - 2) as u8)?;
                    } else {
                        pos = put(dst, pos, M3_MARKER)?;
                        pos = put_ext(dst, pos, len - M3_MAX_LEN)?;
                    }
                    pos = put(dst, pos, (off << 2) as u8 | trailing)?;
                    put(dst, pos, (off >> 6) as u8)
                }
                CopyForm::M4 => {
                    debug_assert!(distance > M3_MAX_OFFSET && distance <= M4_MAX_OFFSET);
                    let off = distance - M3_MAX_OFFSET;
                    let high = ((off >> 11) & 8) as u8;
                    if len <= M4_MAX_LEN {
                        pos = put(dst, pos, M4_MARKER | high | (len - 2) as u8)?;
                    } else {
                        pos = put(dst, pos, M4_MARKER | high)?;
                        pos = put_ext(dst, pos, len - M4_MAX_LEN)?;
                    }
                    pos = put(dst, pos, (off << 2) as u8 | trailing)?;
                    put(dst, pos, (off >> 6) as u8)
                }
            }
        }
        Instruction::EndOfStream => {
            for &b in &END_OF_STREAM {
                pos = put(dst, pos, b)?;
            }
            Ok(pos)
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Decoding
// ─────────────────────────────────────────────────────────────────────────────

#[inline]
fn byte_at(src: &[u8], pos: usize) -> Result<u8, DecompressError> {
    src.get(pos).copied().ok_or(DecompressError::TruncatedInput)
}

/// Read a variable-length count starting at `pos`.
fn read_ext(src: &[u8], mut pos: usize) -> Result<(usize, usize), DecompressError> {
    let overflow = DecompressError::CorruptStream(CorruptKind::LengthOverflow);
    let mut n: usize = 0;
    loop {
        let b = byte_at(src, pos)?;
        pos += 1;
        if b != 0 {
            n = n.checked_add(b as usize).ok_or(overflow)?;
            return Ok((n, pos));
        }
        n = n.checked_add(255).ok_or(overflow)?;
    }
}

/// Read an inline length, or a variable-length extension when the inline
/// field is zero.
fn read_len(
    src: &[u8],
    pos: usize,
    inline: usize,
    base: usize,
) -> Result<(usize, usize), DecompressError> {
    if inline != 0 {
        return Ok((inline + 2, pos));
    }
    let (ext, pos) = read_ext(src, pos)?;
    let len = ext
        .checked_add(base)
        .ok_or(DecompressError::CorruptStream(CorruptKind::LengthOverflow))?;
    Ok((len, pos))
}

/// Decode the instruction starting at `src[pos]`.
///
/// Returns the instruction and the position just past its opcode bytes.
/// Literal payloads (including a copy's trailing literals) are not consumed.
/// Fails with `TruncatedInput` if the opcode runs past the end of `src`.
pub fn decode_instruction(
    src: &[u8],
    pos: usize,
    state: State,
) -> Result<(Instruction, usize), DecompressError> {
    let b = byte_at(src, pos)?;
    let mut pos = pos + 1;
    let t = b as usize;

    if state == State::Start && t > 17 {
        return Ok((Instruction::FirstLiteral { len: t - 17 }, pos));
    }

    if t < 16 {
        let ins = match state {
            State::Start | State::Idle => {
                let len = if t == 0 {
                    let (ext, next) = read_ext(src, pos)?;
                    pos = next;
                    ext.checked_add(SHORT_LITERAL_MAX)
                        .ok_or(DecompressError::CorruptStream(CorruptKind::LengthOverflow))?
                } else {
                    t + 3
                };
                Instruction::Literal { len }
            }
            State::Trailing(_) | State::AfterRun => {
                let next = byte_at(src, pos)? as usize;
                pos += 1;
                let (form, base, len) = if state == State::AfterRun {
                    (CopyForm::M1Far, M2_MAX_OFFSET + 1, 3)
                } else {
                    (CopyForm::M1Short, 1, 2)
                };
                Instruction::Copy {
                    form,
                    distance: base + (t >> 2) + (next << 2),
                    len,
                    trailing: b & 3,
                }
            }
        };
        return Ok((ins, pos));
    }

    if t >= 64 {
        let next = byte_at(src, pos)? as usize;
        pos += 1;
        let ins = Instruction::Copy {
            form: CopyForm::M2,
            distance: 1 + ((t >> 2) & 7) + (next << 3),
            len: (t >> 5) + 1,
            trailing: b & 3,
        };
        return Ok((ins, pos));
    }

    let (form, len) = if t >= 32 {
        let (len, next) = read_len(src, pos, t & 31, M3_MAX_LEN)?;
        pos = next;
        (CopyForm::M3, len)
    } else {
        let (len, next) = read_len(src, pos, t & 7, M4_MAX_LEN)?;
        pos = next;
        (CopyForm::M4, len)
    };

    let lo = byte_at(src, pos)?;
    let hi = byte_at(src, pos + 1)?;
    pos += 2;
    let off = (u16::from_le_bytes([lo, hi]) >> 2) as usize;
    let trailing = lo & 3;

    let distance = if form == CopyForm::M3 {
        off + 1
    } else {
        let off = off + ((t & 8) << 11);
        if off == 0 {
            return Ok((Instruction::EndOfStream, pos));
        }
        off + M3_MAX_OFFSET
    };

    Ok((Instruction::Copy { form, distance, len, trailing }, pos))
}

/// OR the trailing-literal count into a copy's state byte, already written at
/// `dst[state_pos]`.
#[inline]
pub fn set_trailing(dst: &mut [u8], state_pos: usize, trailing: usize) -> Result<(), CompressError> {
    debug_assert!((1..=TRAILING_MAX).contains(&trailing));
    let slot = dst.get_mut(state_pos).ok_or(CompressError::BoundExceeded)?;
    *slot |= trailing as u8;
    Ok(())
}
