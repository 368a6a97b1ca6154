//! Byte builders for save-file fixtures.
//!
//! ```text
//!   SaveBuilder::new()
//!       .record(RecordBuilder::new(*b"TES3").hedr(&header).text(*b"MAST", "Morrowind.esm"))
//!       .record(RecordBuilder::glob("GameHour", 13.5))
//!       .raw(b"SCPT...")
//!       .build()
//! ```
//!
//! Record sizes are computed from the subrecords added unless overridden
//! with [`RecordBuilder::declared_size`], which is how the malformed
//! fixtures are made.

use ess_types::FileHeader;
use ess_types::file_header::FILE_HEADER_FIELDS;

/// Encode one subrecord: tag, u32 LE length, payload.
#[must_use]
pub fn subrecord(tag: [u8; 4], payload: &[u8]) -> Vec<u8> {
    let len = u32::try_from(payload.len()).expect("subrecord payload over 4 GiB");
    let mut out = Vec::with_capacity(8 + payload.len());
    out.extend_from_slice(&tag);
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(payload);
    out
}

/// Encode a `HEDR` body, padding the text fields with NULs.
///
/// Field widths come from [`FILE_HEADER_FIELDS`]; text longer than its
/// field is cut.
#[must_use]
pub fn file_header_bytes(header: &FileHeader) -> Vec<u8> {
    let mut out = Vec::new();
    for (name, width) in FILE_HEADER_FIELDS {
        let mut field = match name {
            "version" => header.version.to_le_bytes().to_vec(),
            "unknown" => header.unknown.to_le_bytes().to_vec(),
            "company_name" => header.company_name.as_bytes().to_vec(),
            "description" => header.description.as_bytes().to_vec(),
            "record_count" => header.record_count.to_le_bytes().to_vec(),
            other => panic!("no encoder for HEDR field {other}"),
        };
        field.resize(width, 0);
        out.extend(field);
    }
    out
}

#[must_use]
pub fn file_header(description: &str, record_count: u32) -> FileHeader {
    FileHeader {
        version: 1.3,
        unknown: 0,
        company_name: "Bethesda Softworks".to_string(),
        description: description.to_string(),
        record_count,
    }
}

/// Builds one top-level record.
#[derive(Clone, Debug)]
pub struct RecordBuilder {
    tag: [u8; 4],
    header1: [u8; 4],
    flags: [u8; 4],
    body: Vec<u8>,
    declared_size: Option<u32>,
}

impl RecordBuilder {
    #[must_use]
    pub fn new(tag: [u8; 4]) -> Self {
        Self {
            tag,
            header1: [0; 4],
            flags: [0; 4],
            body: Vec::new(),
            declared_size: None,
        }
    }

    /// A `GLOB` record with a `NAME` and a single-precision `FLTV`.
    #[must_use]
    pub fn glob(name: &str, value: f32) -> Self {
        Self::new(*b"GLOB").text(*b"NAME", name).f32(*b"FLTV", value)
    }

    /// A `TES3` record with `HEDR`, one `MAST` and its `DATA`.
    #[must_use]
    pub fn tes3(header: &FileHeader, master: &str, master_size: u64) -> Self {
        Self::new(*b"TES3")
            .hedr(header)
            .text(*b"MAST", master)
            .u64(*b"DATA", master_size)
    }

    #[must_use]
    pub fn header1(mut self, header1: [u8; 4]) -> Self {
        self.header1 = header1;
        self
    }

    #[must_use]
    pub fn flags(mut self, flags: [u8; 4]) -> Self {
        self.flags = flags;
        self
    }

    /// Append a subrecord with an arbitrary payload.
    #[must_use]
    pub fn sub(mut self, tag: [u8; 4], payload: &[u8]) -> Self {
        self.body.extend(subrecord(tag, payload));
        self
    }

    /// Append bytes to the body verbatim.
    #[must_use]
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(bytes);
        self
    }

    /// Append a NUL-terminated text subrecord.
    #[must_use]
    pub fn text(self, tag: [u8; 4], text: &str) -> Self {
        let mut payload = text.as_bytes().to_vec();
        payload.push(0);
        self.sub(tag, &payload)
    }

    #[must_use]
    pub fn u64(self, tag: [u8; 4], value: u64) -> Self {
        self.sub(tag, &value.to_le_bytes())
    }

    #[must_use]
    pub fn f32(self, tag: [u8; 4], value: f32) -> Self {
        self.sub(tag, &value.to_le_bytes())
    }

    #[must_use]
    pub fn f64(self, tag: [u8; 4], value: f64) -> Self {
        self.sub(tag, &value.to_le_bytes())
    }

    #[must_use]
    pub fn hedr(self, header: &FileHeader) -> Self {
        self.sub(*b"HEDR", &file_header_bytes(header))
    }

    /// Write `size` in the header instead of the real body length.
    #[must_use]
    pub fn declared_size(mut self, size: u32) -> Self {
        self.declared_size = Some(size);
        self
    }

    #[must_use]
    pub fn build(&self) -> Vec<u8> {
        let size = self.declared_size.unwrap_or_else(|| {
            u32::try_from(self.body.len()).expect("record body over 4 GiB")
        });
        let mut out = Vec::with_capacity(16 + self.body.len());
        out.extend_from_slice(&self.tag);
        out.extend_from_slice(&size.to_le_bytes());
        out.extend_from_slice(&self.header1);
        out.extend_from_slice(&self.flags);
        out.extend_from_slice(&self.body);
        out
    }
}

/// Concatenates records into a save file.
#[derive(Clone, Debug, Default)]
pub struct SaveBuilder {
    bytes: Vec<u8>,
}

impl SaveBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn record(mut self, record: RecordBuilder) -> Self {
        self.bytes.extend(record.build());
        self
    }

    #[must_use]
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    /// Current length, i.e. the offset of whatever is appended next.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[must_use]
    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}

/// A small but complete save: `TES3`, three `GLOB`s, then a `SCPT` record
/// that a `TES3`/`GLOB` walker stops at.
#[must_use]
pub fn sample_save() -> Vec<u8> {
    SaveBuilder::new()
        .record(RecordBuilder::tes3(
            &file_header("Balmora, South Wall", 5),
            "Morrowind.esm",
            79_837_557,
        ))
        .record(RecordBuilder::glob("GameHour", 13.5))
        .record(RecordBuilder::glob("Day", 16.0))
        .record(RecordBuilder::glob("Month", 7.0))
        .record(
            RecordBuilder::new(*b"SCPT")
                .text(*b"SCHD", "CharGen")
                .sub(*b"SCDT", &[0x01, 0x02, 0x03, 0x04]),
        )
        .build()
}
