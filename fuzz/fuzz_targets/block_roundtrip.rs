#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let compressed = lzo1x::block::compress_block_to_vec(data).expect("compression failed");

    let bound = lzo1x::block::block_compress_bound(data.len()).unwrap();
    assert!(
        compressed.len() <= bound,
        "block of {} bytes compressed to {} (bound {bound})",
        data.len(),
        compressed.len()
    );

    // Decompress back, supplying the exact original length as the limit.
    let recovered = lzo1x::block::decompress_block_to_vec(&compressed, data.len())
        .expect("decompression of self-compressed block failed");
    assert_eq!(recovered, data, "block round-trip mismatch");
});
