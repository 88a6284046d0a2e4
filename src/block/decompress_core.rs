//! LZO1x block decompression core engine.
//!
//! Implements the single-pass decode loop over a raw (unframed) LZO1x stream:
//!   - [`OutputSink`]: bounded output window with an overlap-aware copy
//!   - [`decompress_generic`]: the opcode interpreter shared by all entry points
//!   - [`decompress_block`] / [`decompress_block_to_vec`]: the public one-shot API
//!
//! # Security boundary
//!
//! This module is the **security-critical decompression path**.  Every read
//! from the input and every write to the output is bounds-checked.  Malformed
//! or truncated input must return a [`DecompressError`]; it must **never**
//! panic, and the output never grows past the caller-declared limit.

use core::fmt;

use super::types::{decode_instruction, Instruction, State};

// ─────────────────────────────────────────────────────────────────────────────
// Error type
// ─────────────────────────────────────────────────────────────────────────────

/// The specific way a stream violates the LZO1x grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorruptKind {
    /// A copy reaches further back than the bytes decoded so far.
    InvalidBackReference { distance: usize, written: usize },
    /// A variable-length count does not fit in `usize`.
    LengthOverflow,
    /// The framed length field disagrees with the decoded size.
    LengthMismatch { declared: usize, decoded: usize },
}

/// Errors returned by LZO1x decompression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecompressError {
    /// The output buffer could not be allocated.
    Allocation { requested: usize },
    /// The frame marker byte is not [`FRAME_MARKER`](crate::frame::header::FRAME_MARKER).
    Format { found: u8 },
    /// The stream is well-delimited but semantically invalid.
    CorruptStream(CorruptKind),
    /// The input ends in the middle of an instruction or literal run.
    TruncatedInput,
    /// Decoding would write more than `limit` bytes.
    OutputOverflow { limit: usize },
}

impl fmt::Display for CorruptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            CorruptKind::InvalidBackReference { distance, written } => write!(
                f,
                "back-reference distance {distance} exceeds the {written} bytes decoded so far"
            ),
            CorruptKind::LengthOverflow => write!(f, "run length overflows"),
            CorruptKind::LengthMismatch { declared, decoded } => write!(
                f,
                "frame declares {declared} bytes but the payload decodes to {decoded}"
            ),
        }
    }
}

impl fmt::Display for DecompressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecompressError::Allocation { requested } => {
                write!(f, "could not allocate {requested} bytes of output")
            }
            DecompressError::Format { found } => write!(f, "invalid frame marker {found:#04x}"),
            DecompressError::CorruptStream(kind) => write!(f, "corrupt stream: {kind}"),
            DecompressError::TruncatedInput => write!(f, "input was truncated"),
            DecompressError::OutputOverflow { limit } => {
                write!(f, "decoded data exceeds the {limit}-byte output limit")
            }
        }
    }
}

impl std::error::Error for DecompressError {}

// ─────────────────────────────────────────────────────────────────────────────
// Output sinks
// ─────────────────────────────────────────────────────────────────────────────

/// Abstraction over the two output shapes: caller slice and owned `Vec`.
///
/// Both implementations refuse the whole write when it would cross the limit,
/// so the visible output never holds a partially applied instruction.
pub trait OutputSink {
    /// Bytes written so far.
    fn written(&self) -> usize;

    /// Append a literal run.
    fn put_lits(&mut self, lits: &[u8]) -> Result<(), DecompressError>;

    /// Append `len` bytes copied from `distance` bytes back.
    ///
    /// `len` may exceed `distance`; the copy then replicates the most recent
    /// `distance` bytes, as an LZ77 overlap copy must.
    fn put_backref(&mut self, distance: usize, len: usize) -> Result<(), DecompressError>;
}

#[inline]
fn check_backref(distance: usize, written: usize) -> Result<(), DecompressError> {
    if distance == 0 || distance > written {
        return Err(DecompressError::CorruptStream(
            CorruptKind::InvalidBackReference { distance, written },
        ));
    }
    Ok(())
}

/// Forward byte-by-byte copy inside one buffer; correct for overlapping ranges.
#[inline]
fn overlap_copy(buf: &mut [u8], from: usize, to: usize, len: usize) {
    if to - from >= len {
        buf.copy_within(from..from + len, to);
    } else {
        for i in 0..len {
            buf[to + i] = buf[from + i];
        }
    }
}

/// Sink writing into a caller-provided slice.
pub struct SliceSink<'a> {
    pub pos: usize,
    pub buf: &'a mut [u8],
}

impl<'a> From<&'a mut [u8]> for SliceSink<'a> {
    fn from(buf: &'a mut [u8]) -> Self {
        Self { pos: 0, buf }
    }
}

impl OutputSink for SliceSink<'_> {
    fn written(&self) -> usize {
        self.pos
    }

    fn put_lits(&mut self, lits: &[u8]) -> Result<(), DecompressError> {
        let end = self.pos + lits.len();
        if end > self.buf.len() {
            return Err(DecompressError::OutputOverflow { limit: self.buf.len() });
        }
        self.buf[self.pos..end].copy_from_slice(lits);
        self.pos = end;
        Ok(())
    }

    fn put_backref(&mut self, distance: usize, len: usize) -> Result<(), DecompressError> {
        check_backref(distance, self.pos)?;
        if len > self.buf.len() - self.pos {
            return Err(DecompressError::OutputOverflow { limit: self.buf.len() });
        }
        overlap_copy(self.buf, self.pos - distance, self.pos, len);
        self.pos += len;
        Ok(())
    }
}

/// Sink growing an owned `Vec` up to `limit` bytes.
pub struct VecSink {
    pub vec: Vec<u8>,
    pub limit: usize,
}

impl VecSink {
    /// Empty sink with room for `capacity_hint` bytes reserved up front.
    pub fn with_capacity(capacity_hint: usize, limit: usize) -> Result<Self, DecompressError> {
        let mut vec = Vec::new();
        let requested = capacity_hint.min(limit);
        vec.try_reserve_exact(requested)
            .map_err(|_| DecompressError::Allocation { requested })?;
        Ok(Self { vec, limit })
    }

    fn grow(&mut self, extra: usize) -> Result<usize, DecompressError> {
        let pos = self.vec.len();
        if extra > self.limit - pos {
            return Err(DecompressError::OutputOverflow { limit: self.limit });
        }
        self.vec
            .try_reserve(extra)
            .map_err(|_| DecompressError::Allocation { requested: pos + extra })?;
        Ok(pos)
    }
}

impl OutputSink for VecSink {
    fn written(&self) -> usize {
        self.vec.len()
    }

    fn put_lits(&mut self, lits: &[u8]) -> Result<(), DecompressError> {
        self.grow(lits.len())?;
        self.vec.extend_from_slice(lits);
        Ok(())
    }

    fn put_backref(&mut self, distance: usize, len: usize) -> Result<(), DecompressError> {
        check_backref(distance, self.vec.len())?;
        let pos = self.grow(len)?;
        self.vec.resize(pos + len, 0);
        overlap_copy(&mut self.vec, pos - distance, pos, len);
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// The decode loop
// ─────────────────────────────────────────────────────────────────────────────

/// Result of decoding one raw block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded {
    /// Bytes written to the output.
    pub written: usize,
    /// Input bytes up to and including the end-of-stream marker.  Anything
    /// after it is trailing data and is left untouched.
    pub input_consumed: usize,
}

/// Copy `len` literal bytes from `src[pos..]` into the sink.
#[inline]
fn copy_literals<S: OutputSink>(
    src: &[u8],
    pos: usize,
    len: usize,
    sink: &mut S,
) -> Result<usize, DecompressError> {
    let end = pos.checked_add(len).ok_or(DecompressError::TruncatedInput)?;
    let lits = src.get(pos..end).ok_or(DecompressError::TruncatedInput)?;
    sink.put_lits(lits)?;
    Ok(end)
}

/// Core LZO1x decode loop.
///
/// Interprets instructions until the end-of-stream marker and returns the
/// number of input bytes consumed.  The sink enforces the output limit.
pub fn decompress_generic<S: OutputSink>(
    src: &[u8],
    sink: &mut S,
) -> Result<usize, DecompressError> {
    let mut ip = 0usize;
    let mut state = State::Start;

    loop {
        let (ins, next) = decode_instruction(src, ip, state)?;
        ip = next;

        match ins {
            Instruction::FirstLiteral { len } | Instruction::Literal { len } => {
                ip = copy_literals(src, ip, len, sink)?;
                state = State::after_literals(len);
            }
            Instruction::Copy { distance, len, trailing, .. } => {
                sink.put_backref(distance, len)?;
                let trailing = trailing as usize;
                if trailing > 0 {
                    ip = copy_literals(src, ip, trailing, sink)?;
                }
                state = State::after_literals(trailing);
            }
            Instruction::EndOfStream => return Ok(ip),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Public one-shot API
// ─────────────────────────────────────────────────────────────────────────────

/// Decompress a raw LZO1x block into `dst`.
///
/// `dst.len()` is the output limit.  Returns how many bytes were written and
/// how much input the stream occupied.
pub fn decompress_block(src: &[u8], dst: &mut [u8]) -> Result<Decoded, DecompressError> {
    let mut sink: SliceSink = dst.into();
    let input_consumed = decompress_generic(src, &mut sink)?;
    Ok(Decoded { written: sink.pos, input_consumed })
}

/// Decompress a raw LZO1x block into a new `Vec` of at most `max_output_len`
/// bytes.
pub fn decompress_block_to_vec(
    src: &[u8],
    max_output_len: usize,
) -> Result<Vec<u8>, DecompressError> {
    // Only a reservation hint; the sink grows on demand up to the limit.
    let hint = src.len().saturating_mul(4);
    decompress_with_hint(src, hint, max_output_len).map(|(vec, _)| vec)
}

/// Shared by the raw and framed `Vec` paths: decode with an explicit
/// pre-allocation hint.
pub(crate) fn decompress_with_hint(
    src: &[u8],
    capacity_hint: usize,
    max_output_len: usize,
) -> Result<(Vec<u8>, usize), DecompressError> {
    let mut sink = VecSink::with_capacity(capacity_hint, max_output_len)?;
    let consumed = decompress_generic(src, &mut sink)?;
    Ok((sink.vec, consumed))
}
