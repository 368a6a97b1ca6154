//! Edge cases of the save format that a decoder must get exactly right:
//!
//! - **Unknown subrecord tags** decode to opaque bytes, never an error.
//! - **Size disagreements** between a record header and its subrecords are
//!   fatal, whichever direction they go.
//! - **Fixed-layout length mismatches** (a short `HEDR`, a 3-byte `FLTV`)
//!   are kept raw in lenient mode and fatal in strict mode.
//! - **Stray bytes** after the last record are a short read.

use std::io::Cursor;

use ess_decoder::{
    DecodeError, DecoderConfig, RecognizedTags, SizeScope, StreamingWalker, Termination, walk,
};
use ess_tests::fixture::{RecordBuilder, SaveBuilder, file_header, file_header_bytes, subrecord};
use ess_types::{FloatValue, LayoutRegistry, PayloadLayout, SubrecordPayload, tags};
use ess_wire::Tag;
use rstest::rstest;

fn decode_single(bytes: &[u8], config: &DecoderConfig) -> ess_types::Record {
    let mut stream = walk(bytes, config).unwrap_or_else(|e| panic!("walk failed: {e}"));
    assert_eq!(stream.records.len(), 1);
    stream.records.remove(0)
}

// ── Unknown tags ──────────────────────────────────────────────────────────────

#[test]
fn unknown_subrecord_is_opaque() {
    let bytes = RecordBuilder::new(*b"GLOB")
        .sub(*b"XYZW", &[1, 2, 3, 4, 5])
        .text(*b"NAME", "Day")
        .build();
    let record = decode_single(&bytes, &DecoderConfig::default());

    let xyzw = record.find(Tag::new(*b"XYZW")).unwrap();
    assert_eq!(xyzw.declared_size, 5);
    assert_eq!(xyzw.payload, SubrecordPayload::Opaque(vec![1, 2, 3, 4, 5]));
    // The subrecord after it still lines up.
    assert_eq!(
        record.find(tags::NAME).unwrap().payload,
        SubrecordPayload::Text("Day".to_string())
    );
}

#[test]
fn first_record_unrecognized_yields_nothing() {
    let bytes = RecordBuilder::new(*b"CELL").text(*b"NAME", "Balmora").build();
    let config = DecoderConfig::default().with_recognized(RecognizedTags::reference());
    let stream = walk(&bytes, &config).unwrap();

    assert!(stream.records.is_empty());
    assert_eq!(
        stream.termination,
        Termination::Unrecognized {
            tag: Tag::new(*b"CELL"),
            offset: 0
        }
    );
}

// ── Empty and odd bodies ──────────────────────────────────────────────────────

#[test]
fn empty_record_body() {
    let bytes = RecordBuilder::new(*b"GLOB").build();
    let record = decode_single(&bytes, &DecoderConfig::default());
    assert!(record.subrecords.is_empty());
    assert_eq!(record.declared_body_size, 0);
}

#[test]
fn zero_length_text() {
    let bytes = RecordBuilder::new(*b"GLOB").sub(*b"NAME", &[]).build();
    let record = decode_single(&bytes, &DecoderConfig::default().strict());
    assert_eq!(
        record.subrecords[0].payload,
        SubrecordPayload::Text(String::new())
    );
}

#[test]
fn text_is_decoded_lossily() {
    // 0xE9 is 'é' in the Windows-1252 codepage saves are written in.
    let bytes = RecordBuilder::new(*b"GLOB").sub(*b"NAME", b"Caf\xE9\0").build();
    let record = decode_single(&bytes, &DecoderConfig::default());
    assert_eq!(
        record.subrecords[0].payload,
        SubrecordPayload::Text("Caf\u{FFFD}".to_string())
    );
}

#[test]
fn opaque_header_fields_survive() {
    let bytes = RecordBuilder::glob("Day", 1.0)
        .header1([0xDE, 0xAD, 0xBE, 0xEF])
        .flags([0, 0x20, 0, 0])
        .build();
    let record = decode_single(&bytes, &DecoderConfig::default());
    assert_eq!(record.header1, [0xDE, 0xAD, 0xBE, 0xEF]);
    assert_eq!(record.flags, [0, 0x20, 0, 0]);
}

#[test]
fn double_precision_float() {
    let bytes = RecordBuilder::new(*b"GLOB").f64(*b"FLTV", 0.1).build();
    let record = decode_single(&bytes, &DecoderConfig::default().strict());
    match record.subrecords[0].payload {
        SubrecordPayload::Float(FloatValue::Double(v)) => assert_eq!(v.to_bits(), 0.1f64.to_bits()),
        ref other => panic!("expected a double, got {other:?}"),
    }
}

// ── Record size disagreements ─────────────────────────────────────────────────

#[rstest]
#[case::declared_too_small(20, 20, 24)]
#[case::declared_too_large(30, 30, 32)]
fn record_size_mismatch(#[case] declared: u32, #[case] expected: u64, #[case] actual: u64) {
    // Two subrecords, 12 bytes each: 24 bytes of real content.
    let body = [subrecord(*b"NAME", b"Day\0"), subrecord(*b"FLTV", &1.0f32.to_le_bytes())].concat();
    let mut bytes = RecordBuilder::new(*b"GLOB").raw(&body).declared_size(declared).build();
    // Pad the source so the declared body is always available.
    bytes.resize(16 + body.len().max(declared as usize), 0);

    let err = walk(&bytes, &DecoderConfig::default()).unwrap_err().error;
    match err {
        DecodeError::SizeMismatch {
            scope: SizeScope::Record,
            tag,
            offset: 0,
            expected: e,
            actual: a,
        } => {
            assert_eq!(tag, tags::GLOB);
            assert_eq!((e, a), (expected, actual));
        }
        other => panic!("expected a record size mismatch, got {other}"),
    }
}

#[test]
fn subrecord_overrunning_into_next_record() {
    // NAME claims 40 bytes; the record only has 12, the next record follows.
    let mut name = subrecord(*b"NAME", b"Day\0");
    name[4..8].copy_from_slice(&40u32.to_le_bytes());
    let bytes = SaveBuilder::new()
        .record(RecordBuilder::new(*b"GLOB").raw(&name))
        .record(RecordBuilder::glob("Month", 2.0))
        .build();

    let partial = walk(&bytes, &DecoderConfig::default()).unwrap_err();
    assert!(partial.records.is_empty());
    assert!(matches!(
        partial.error,
        DecodeError::SizeMismatch {
            scope: SizeScope::Record,
            expected: 12,
            actual: 48,
            ..
        }
    ));
}

#[test]
fn size_cap_does_not_apply_in_memory() {
    let bytes = RecordBuilder::new(*b"GLOB")
        .sub(*b"SCDT", &vec![0x5A; 2 << 20])
        .build();
    let config = DecoderConfig::default().with_max_record_size(1 << 20);

    let record = decode_single(&bytes, &config);
    assert!(record.is_size_consistent());
    assert_eq!(record.subrecords[0].declared_size, 2 << 20);
}

#[test]
fn oversized_record_is_refused_when_streaming() {
    let bytes = RecordBuilder::new(*b"GLOB").declared_size(0x7FFF_FFFF).build();
    let config = DecoderConfig::default().with_max_record_size(1 << 20);
    let err = StreamingWalker::new(Cursor::new(&bytes), &config)
        .next()
        .unwrap()
        .unwrap_err();
    assert!(matches!(
        err,
        DecodeError::RecordTooLarge {
            size: 0x7FFF_FFFF,
            limit: 0x10_0000,
            ..
        }
    ));
}

// ── Fixed-layout mismatches ───────────────────────────────────────────────────

#[test]
fn short_hedr_is_kept_raw_when_lenient() {
    let hedr = file_header_bytes(&file_header("Short", 1));
    let bytes = RecordBuilder::new(*b"TES3").sub(*b"HEDR", &hedr[..296]).build();
    let stream = walk(&bytes, &DecoderConfig::default()).unwrap();

    let record = &stream.records[0];
    assert!(record.is_size_consistent());
    assert_eq!(record.anomalies().count(), 1);
    assert!(stream.file_header().is_none());
    assert_eq!(
        record.subrecords[0].payload,
        SubrecordPayload::Mismatched {
            layout: PayloadLayout::FileHeader,
            expected: 300,
            raw: hedr[..296].to_vec(),
        }
    );
}

#[test]
fn short_hedr_is_fatal_when_strict() {
    let hedr = file_header_bytes(&file_header("Short", 1));
    let bytes = RecordBuilder::new(*b"TES3").sub(*b"HEDR", &hedr[..296]).build();
    let err = walk(&bytes, &DecoderConfig::default().strict()).unwrap_err().error;

    assert!(matches!(
        err,
        DecodeError::SizeMismatch {
            scope: SizeScope::Subrecord,
            offset: 16,
            expected: 300,
            actual: 296,
            ..
        }
    ));
}

#[rstest]
#[case::fltv_three_bytes(*b"FLTV", 3, PayloadLayout::Float, 4)]
#[case::data_four_bytes(*b"DATA", 4, PayloadLayout::Integer, 8)]
#[case::hedr_long(*b"HEDR", 301, PayloadLayout::FileHeader, 300)]
fn lenient_mismatch_keeps_bytes(
    #[case] tag: [u8; 4],
    #[case] len: usize,
    #[case] layout: PayloadLayout,
    #[case] expected: usize,
) {
    let payload = vec![0xAB; len];
    let bytes = RecordBuilder::new(*b"GLOB").sub(tag, &payload).build();
    let record = decode_single(&bytes, &DecoderConfig::default());
    assert_eq!(
        record.subrecords[0].payload,
        SubrecordPayload::Mismatched {
            layout,
            expected,
            raw: payload,
        }
    );
}

// ── Layout overrides ──────────────────────────────────────────────────────────

#[test]
fn same_tag_different_parent() {
    let bytes = SaveBuilder::new()
        .record(RecordBuilder::new(*b"TES3").u64(*b"DATA", 7))
        .record(RecordBuilder::new(*b"GLOB").sub(*b"DATA", b"abc"))
        .build();
    let layouts = LayoutRegistry::new().with(Some(tags::GLOB), tags::DATA, PayloadLayout::Text);
    let config = DecoderConfig::default().strict().with_layouts(layouts);

    let stream = walk(&bytes, &config).unwrap();
    assert_eq!(stream.records[0].subrecords[0].payload, SubrecordPayload::Integer(7));
    assert_eq!(
        stream.records[1].subrecords[0].payload,
        SubrecordPayload::Text("abc".to_string())
    );
}

// ── Trailing bytes ────────────────────────────────────────────────────────────

#[rstest]
#[case(1)]
#[case(2)]
#[case(3)]
fn stray_trailing_bytes(#[case] extra: usize) {
    let mut bytes = RecordBuilder::glob("Day", 1.0).build();
    let end = bytes.len();
    bytes.extend(vec![0x55; extra]);

    let partial = walk(&bytes, &DecoderConfig::default()).unwrap_err();
    assert_eq!(partial.records.len(), 1);
    match partial.error {
        DecodeError::ShortRead {
            offset,
            needed,
            available,
        } => {
            assert_eq!(offset, end);
            assert_eq!(needed, 4);
            assert_eq!(available, extra);
        }
        other => panic!("expected a short read, got {other}"),
    }
}

#[test]
fn stray_bytes_after_unrecognized_record_are_not_read() {
    let bytes = SaveBuilder::new()
        .record(RecordBuilder::glob("Day", 1.0))
        .raw(b"SCPT\xFF\xFF")
        .build();
    let config = DecoderConfig::default().with_recognized(RecognizedTags::reference());

    let stream = walk(&bytes, &config).unwrap();
    assert_eq!(stream.records.len(), 1);
    assert!(matches!(stream.termination, Termination::Unrecognized { offset: 40, .. }));
}
