#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Feed arbitrary bytes through the frame decompressor.
    // Err results are expected and fine; what we verify is no panics.
    if let Ok(out) = lzo1x::decompress(data, 1 << 20) {
        let header = lzo1x::frame::frame_info(data).unwrap();
        assert_eq!(out.len(), header.original_len as usize);
    }

    // The default 512-byte limit of the codec handle.
    if let Ok(out) = lzo1x::Lzo1x::init().decompress(data) {
        assert!(out.len() <= 512);
    }
});
