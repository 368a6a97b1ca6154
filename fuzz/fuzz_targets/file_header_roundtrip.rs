#![no_main]

use arbitrary::Arbitrary;
use ess_types::file_header::{FileHeader, FILE_HEADER_FIELDS, FILE_HEADER_LEN};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input {
    version_bits: u32,
    unknown: u32,
    company: [u8; 32],
    description: Vec<u8>,
    record_count: u32,
}

// Fuzz target: HEDR field layout.
//
// Builds a 300-byte body from arbitrary field values and checks that the
// numeric fields come back bit-exact and the text fields never contain
// a NUL.
fuzz_target!(|input: Input| {
    let mut description = input.description;
    description.resize(FILE_HEADER_FIELDS[3].1, 0);

    let mut body = Vec::with_capacity(FILE_HEADER_LEN);
    body.extend_from_slice(&input.version_bits.to_le_bytes());
    body.extend_from_slice(&input.unknown.to_le_bytes());
    body.extend_from_slice(&input.company);
    body.extend_from_slice(&description);
    body.extend_from_slice(&input.record_count.to_le_bytes());
    assert_eq!(body.len(), FILE_HEADER_LEN);

    let header = FileHeader::decode(&body).unwrap();
    assert_eq!(header.version.to_bits(), input.version_bits);
    assert_eq!(header.unknown, input.unknown);
    assert_eq!(header.record_count, input.record_count);
    assert!(!header.company_name.contains('\0'));
    assert!(!header.description.contains('\0'));
});
