#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let compressed = lzo1x::compress(data).expect("compression failed");
    assert!(compressed.len() <= lzo1x::compress_bound(data.len()).unwrap());

    let recovered = match lzo1x::decompress(&compressed, data.len()) {
        Ok(v) => v,
        Err(e) => panic!(
            "frame round-trip: decompression of self-compressed data failed \
             (input {} bytes, compressed {} bytes): {e}",
            data.len(),
            compressed.len()
        ),
    };

    assert_eq!(
        recovered, data,
        "frame round-trip mismatch: {} bytes in, {} bytes back",
        data.len(),
        recovered.len()
    );
});
