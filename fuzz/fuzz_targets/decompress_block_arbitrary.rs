#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Err results are expected and fine; what we verify is no panics and that
    // the limit is never exceeded.

    // Zero-length output buffer.
    {
        let mut dst = vec![0u8; 0];
        let _ = lzo1x::block::decompress_block(data, &mut dst);
    }

    // 4 KiB output buffer.
    {
        let mut dst = vec![0u8; 4096];
        if let Ok(decoded) = lzo1x::block::decompress_block(data, &mut dst) {
            assert!(decoded.written <= dst.len());
            assert!(decoded.input_consumed <= data.len());
        }
    }

    // Vec output capped at 1 MiB.
    if let Ok(out) = lzo1x::block::decompress_block_to_vec(data, 1 << 20) {
        assert!(out.len() <= 1 << 20);
    }
});
