//! E2E Test Suite 03: Concurrency
//!
//! The codec keeps no shared state: every call owns its working memory and
//! output.  These tests compress and decompress many independent records in
//! parallel with rayon and check the results against a sequential run.

extern crate lzo1x;

use rayon::prelude::*;

use lzo1x::{compress, decompress, Lzo1x, WorkMem};

fn record(i: usize) -> Vec<u8> {
    format!("record {i}: ")
        .into_bytes()
        .into_iter()
        .cycle()
        .take(100 + i * 37 % 5000)
        .collect()
}

#[test]
fn test_handle_and_errors_are_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Lzo1x>();
    assert_send_sync::<WorkMem>();
    assert_send_sync::<lzo1x::CompressError>();
    assert_send_sync::<lzo1x::DecompressError>();
}

#[test]
fn test_parallel_matches_sequential() {
    let inputs: Vec<Vec<u8>> = (0..256).map(record).collect();

    let sequential: Vec<Vec<u8>> = inputs.iter().map(|d| compress(d).unwrap()).collect();
    let parallel: Vec<Vec<u8>> = inputs.par_iter().map(|d| compress(d).unwrap()).collect();
    assert_eq!(sequential, parallel);

    let restored: Vec<Vec<u8>> = parallel
        .par_iter()
        .zip(inputs.par_iter())
        .map(|(packed, original)| decompress(packed, original.len()).unwrap())
        .collect();
    assert_eq!(restored, inputs);
}

#[test]
fn test_shared_handle_across_workers() {
    let codec = Lzo1x::init().with_default_max_output(8192);
    let failures = (0..512usize)
        .into_par_iter()
        .filter(|&i| {
            let data = record(i);
            let packed = codec.compress(&data).unwrap();
            codec.decompress(&packed).map_or(true, |out| out != data)
        })
        .count();
    assert_eq!(failures, 0);
}

#[test]
fn test_per_worker_workmem() {
    let inputs: Vec<Vec<u8>> = (0..128).map(record).collect();
    let packed: Vec<Vec<u8>> = inputs
        .par_iter()
        .map_init(
            || WorkMem::try_new().unwrap(),
            |wm, d| lzo1x::frame::compress_frame_with(d, wm).unwrap(),
        )
        .collect();
    for (p, d) in packed.iter().zip(&inputs) {
        assert_eq!(p, &compress(d).unwrap());
    }
}
