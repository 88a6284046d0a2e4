//! LZO1x block compression: one-shot API.
//!
//! Implements the greedy LZO1x encoder:
//!
//! | Rust function               | Role                                             |
//! |-----------------------------|--------------------------------------------------|
//! | [`compress_block`]          | encode into a caller buffer with caller [`WorkMem`] |
//! | [`compress_block_to_vec`]   | allocate working memory and output, then encode  |
//! | [`block_compress_bound`]    | worst-case raw block size for an input length    |
//!
//! The encoder hashes every 3-byte window into a set-associative table
//! ([`WorkMem`]): 1024 buckets of 4 ways, each way holding a recent input
//! offset.  The ways of a bucket are the bounded match chain; they are probed
//! most-recent-first and the longest match within [`MAX_DISTANCE`] wins, so
//! ties go to the smaller distance.
//!
//! A match is only emitted when its opcode is shorter than the bytes it
//! replaces: by at least one byte, or two when the literal run it terminates
//! needs a two-byte header.  This keeps the output within
//! `n + n/64 + 16 + 3` bytes once framed, for any input.

use core::fmt;

use super::types::{
    encode_instruction, set_trailing, Instruction, END_OF_STREAM, MAX_DISTANCE, MIN_MATCH,
    SHORT_LITERAL_MAX, TRAILING_MAX, WORKMEM_SIZE, WORKMEM_SLOTS,
};
use crate::config::{HASH_LOG, HASH_WAYS};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Fixed slack of the raw-block bound.  The framed bound adds the 5-byte
/// frame header on top, giving the classic `16 + 3`.
pub const BLOCK_BOUND_SLACK: usize = 14;

/// Marks an unused working-memory slot.
const EMPTY: usize = usize::MAX;

// ─────────────────────────────────────────────────────────────────────────────
// Error type
// ─────────────────────────────────────────────────────────────────────────────

/// Errors returned by LZO1x compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressError {
    /// Working memory or the output buffer could not be allocated.
    Allocation { requested: usize },
    /// The output would exceed the destination buffer.  With a buffer of
    /// [`block_compress_bound`] bytes this is an internal invariant violation.
    BoundExceeded,
    /// The input length cannot be represented (bound overflow, or more than
    /// `u32::MAX` bytes for a framed record).
    InputTooLarge,
}

impl fmt::Display for CompressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompressError::Allocation { requested } => {
                write!(f, "could not allocate {requested} bytes")
            }
            CompressError::BoundExceeded => write!(f, "output exceeded the worst-case bound"),
            CompressError::InputTooLarge => write!(f, "input is too large to compress"),
        }
    }
}

impl std::error::Error for CompressError {}

// ─────────────────────────────────────────────────────────────────────────────
// Utility
// ─────────────────────────────────────────────────────────────────────────────

/// Worst-case raw block size for `input_size` bytes of input.
///
/// Returns `None` if the bound overflows `usize`.
#[inline]
pub fn block_compress_bound(input_size: usize) -> Option<usize> {
    input_size
        .checked_add(input_size / 64)?
        .checked_add(BLOCK_BOUND_SLACK)
}

/// Zero-filled output buffer of `len` bytes, allocated fallibly.
pub(crate) fn alloc_output(len: usize) -> Result<Vec<u8>, CompressError> {
    let mut out = Vec::new();
    out.try_reserve_exact(len)
        .map_err(|_| CompressError::Allocation { requested: len })?;
    out.resize(len, 0);
    Ok(out)
}

// ─────────────────────────────────────────────────────────────────────────────
// Working memory
// ─────────────────────────────────────────────────────────────────────────────

/// Encoder scratch space: `4096` pointer-width slots of hash table.
///
/// Reset at the start of every [`compress_block`] call, so one instance may be
/// reused across calls without leaking state between them.
pub struct WorkMem {
    slots: Vec<usize>,
}

impl WorkMem {
    /// Size of the working memory in bytes.
    pub const SIZE: usize = WORKMEM_SIZE;

    /// Allocate working memory, failing with `CompressError::Allocation`
    /// instead of aborting when the allocator refuses.
    pub fn try_new() -> Result<Self, CompressError> {
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(WORKMEM_SLOTS)
            .map_err(|_| CompressError::Allocation { requested: WORKMEM_SIZE })?;
        slots.resize(WORKMEM_SLOTS, EMPTY);
        Ok(Self { slots })
    }

    /// Forget every recorded offset.
    pub fn reset(&mut self) {
        self.slots.fill(EMPTY);
    }

    /// Record `pos` as the most recent offset in `bucket`, evicting the oldest.
    #[inline]
    fn insert(&mut self, bucket: usize, pos: usize) {
        let base = bucket * HASH_WAYS;
        self.slots.copy_within(base..base + HASH_WAYS - 1, base + 1);
        self.slots[base] = pos;
    }

    /// Longest match for `src[ip..]` among the offsets recorded in `bucket`.
    ///
    /// Returns `(distance, len)`; ways are probed most-recent-first and only a
    /// strictly longer match replaces the current best.
    fn find_longest(&self, src: &[u8], ip: usize, bucket: usize) -> Option<(usize, usize)> {
        let base = bucket * HASH_WAYS;
        let mut best: Option<(usize, usize)> = None;
        for &cand in &self.slots[base..base + HASH_WAYS] {
            if cand == EMPTY || cand >= ip {
                continue;
            }
            let distance = ip - cand;
            if distance > MAX_DISTANCE {
                continue;
            }
            let len = src[cand..]
                .iter()
                .zip(&src[ip..])
                .take_while(|(a, b)| a == b)
                .count();
            if len >= MIN_MATCH && best.map_or(true, |(_, best_len)| len > best_len) {
                best = Some((distance, len));
            }
        }
        best
    }
}

impl fmt::Debug for WorkMem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkMem").field("slots", &self.slots.len()).finish()
    }
}

/// Bucket of the 3-byte window at `src[ip..ip + 3]`.
#[inline]
fn hash3(src: &[u8], ip: usize) -> usize {
    let v = u32::from(src[ip]) | u32::from(src[ip + 1]) << 8 | u32::from(src[ip + 2]) << 16;
    (v.wrapping_mul(2_654_435_761) >> (32 - HASH_LOG)) as usize
}

// ─────────────────────────────────────────────────────────────────────────────
// Token writer
// ─────────────────────────────────────────────────────────────────────────────

/// Output cursor tracking where the last copy keeps its trailing-literal bits.
struct TokenWriter<'a> {
    dst: &'a mut [u8],
    op: usize,
    state_pos: Option<usize>,
}

impl<'a> TokenWriter<'a> {
    fn new(dst: &'a mut [u8]) -> Self {
        Self { dst, op: 0, state_pos: None }
    }

    fn put_slice(&mut self, bytes: &[u8]) -> Result<(), CompressError> {
        let end = self.op + bytes.len();
        let out = self
            .dst
            .get_mut(self.op..end)
            .ok_or(CompressError::BoundExceeded)?;
        out.copy_from_slice(bytes);
        self.op = end;
        Ok(())
    }

    /// Flush a pending literal run.  Runs of 1–3 bytes after a copy ride in
    /// that copy's state bits and cost no header.
    fn flush_literals(&mut self, lits: &[u8]) -> Result<(), CompressError> {
        if lits.is_empty() {
            return Ok(());
        }
        match self.state_pos {
            Some(state_pos) if lits.len() <= TRAILING_MAX => {
                set_trailing(self.dst, state_pos, lits.len())?;
            }
            _ => {
                let run = Instruction::literal_run(lits.len(), self.op == 0);
                self.op = encode_instruction(&run, self.dst, self.op)?;
            }
        }
        self.state_pos = None;
        self.put_slice(lits)
    }

    fn copy(&mut self, copy: &Instruction) -> Result<(), CompressError> {
        self.op = encode_instruction(copy, self.dst, self.op)?;
        // the state bits always sit in the last-but-one byte of a copy
        self.state_pos = Some(self.op - 2);
        Ok(())
    }

    fn finish(mut self) -> Result<usize, CompressError> {
        self.put_slice(&END_OF_STREAM)?;
        Ok(self.op)
    }
}

/// Whether emitting `copy` after `pending` literals beats keeping its bytes as
/// literals.
#[inline]
fn worth_emitting(copy: &Instruction, pending: usize) -> bool {
    let Instruction::Copy { len, .. } = *copy else {
        return false;
    };
    let saving = len.saturating_sub(copy.encoded_len());
    saving >= 1 && (pending <= SHORT_LITERAL_MAX || saving >= 2)
}

// ─────────────────────────────────────────────────────────────────────────────
// Core compression loop
// ─────────────────────────────────────────────────────────────────────────────

/// Compress `src` into `dst` as a raw LZO1x block.
///
/// `wrkmem` is reset on entry.  Returns the number of bytes written, or
/// `Err(CompressError::BoundExceeded)` if `dst` is too small; a `dst` of
/// [`block_compress_bound`]`(src.len())` bytes always suffices.
pub fn compress_block(
    src: &[u8],
    wrkmem: &mut WorkMem,
    dst: &mut [u8],
) -> Result<usize, CompressError> {
    wrkmem.reset();
    let n = src.len();
    let mut out = TokenWriter::new(dst);
    let mut anchor = 0usize;
    let mut ip = 0usize;

    while ip + MIN_MATCH <= n {
        let bucket = hash3(src, ip);
        let found = wrkmem.find_longest(src, ip, bucket);
        wrkmem.insert(bucket, ip);

        let chosen = found
            .and_then(|(distance, len)| Some((Instruction::copy(distance, len)?, len)))
            .filter(|(copy, _)| worth_emitting(copy, ip - anchor));

        let Some((copy, len)) = chosen else {
            ip += 1;
            continue;
        };

        out.flush_literals(&src[anchor..ip])?;
        out.copy(&copy)?;

        // index the positions covered by the match so later data can refer
        // back into it
        let end = ip + len;
        for p in ip + 1..end.min(n + 1 - MIN_MATCH) {
            wrkmem.insert(hash3(src, p), p);
        }
        ip = end;
        anchor = end;
    }

    out.flush_literals(&src[anchor..])?;
    out.finish()
}

/// Compress `src` into a newly allocated raw LZO1x block.
///
/// Allocates [`WorkMem`] and a worst-case output buffer for the duration of
/// the call, then shrinks the result to the exact length.
pub fn compress_block_to_vec(src: &[u8]) -> Result<Vec<u8>, CompressError> {
    let bound = block_compress_bound(src.len()).ok_or(CompressError::InputTooLarge)?;
    let mut wrkmem = WorkMem::try_new()?;
    let mut dst = alloc_output(bound)?;
    let written = compress_block(src, &mut wrkmem, &mut dst)?;
    dst.truncate(written);
    Ok(dst)
}
