#![no_main]

use ess_decoder::{DecoderConfig, RecordDecoder};
use ess_wire::ByteCursor;
use libfuzzer_sys::fuzz_target;

// Fuzz target: one record, lenient and strict.
//
// Any record the decoder accepts must satisfy the size invariant, and
// the cursor must land exactly at the end of it.
fuzz_target!(|data: &[u8]| {
    for config in [DecoderConfig::default(), DecoderConfig::default().strict()] {
        let mut cursor = ByteCursor::new(data);
        if let Ok(record) = RecordDecoder::new(&config).decode(&mut cursor) {
            assert!(record.is_size_consistent());
            assert_eq!(cursor.position() as u64, record.wire_len());
        }
    }
});
