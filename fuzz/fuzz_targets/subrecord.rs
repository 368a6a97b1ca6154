#![no_main]

use ess_decoder::{DecoderConfig, SubrecordDecoder};
use ess_types::tags;
use ess_wire::ByteCursor;
use libfuzzer_sys::fuzz_target;

// Fuzz target: a single subrecord under a TES3 parent.
//
// On success the cursor must have moved by exactly 8 + declared length;
// on failure it must not have moved at all.
fuzz_target!(|data: &[u8]| {
    let config = DecoderConfig::default();
    let mut cursor = ByteCursor::new(data);
    match SubrecordDecoder::new(&config, tags::TES3).decode(&mut cursor) {
        Ok(sub) => assert_eq!(cursor.position() as u64, sub.wire_len()),
        Err(_) => assert_eq!(cursor.position(), 0),
    }
});
