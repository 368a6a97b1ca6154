#![no_main]

use std::io::Cursor;

use ess_decoder::{DecoderConfig, RecognizedTags, StreamingWalker, walk};
use libfuzzer_sys::fuzz_target;

// Fuzz target: whole-source walks.
//
// The in-memory and streaming walkers must agree on every record they
// yield and on whether the walk failed. Records are compared through
// `Debug` so NaN floats compare equal.
fuzz_target!(|data: &[u8]| {
    for config in [
        DecoderConfig::default(),
        DecoderConfig::default().with_recognized(RecognizedTags::reference()),
    ] {
        let buffered = walk(data, &config);
        let streamed: Vec<_> = StreamingWalker::new(Cursor::new(data), &config).collect();

        let streamed_ok: Vec<String> = streamed
            .iter()
            .filter_map(|r| r.as_ref().ok())
            .map(|r| format!("{r:?}"))
            .collect();
        let debug_all = |records: &[ess_types::Record]| -> Vec<String> {
            records.iter().map(|r| format!("{r:?}")).collect()
        };
        match &buffered {
            Ok(stream) => {
                assert!(streamed.iter().all(Result::is_ok));
                assert_eq!(streamed_ok, debug_all(&stream.records));
            }
            Err(partial) => {
                assert!(streamed.last().is_some_and(Result::is_err));
                assert_eq!(streamed_ok, debug_all(&partial.records));
            }
        }
    }
});
