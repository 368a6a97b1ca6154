use std::fmt;

use ess_wire::Tag;
use ess_wire::frame::RECORD_HEADER_SIZE;
use serde::Serialize;

use crate::file_header::FileHeader;
use crate::ser;
use crate::subrecord::{Subrecord, SubrecordPayload};

/// A decoded top-level record.
///
/// ```text
/// ┌──────────────────────────────────────────────────┐
/// │ Record                                           │
/// │   tag:                TES3 / GLOB / ...          │
/// │   declared_body_size: Σ (8 + subrecord size)     │
/// │   header1, flags:     4 opaque bytes each        │
/// │   subrecords:         wire order                 │
/// └──────────────────────────────────────────────────┘
/// ```
///
/// A `Record` returned by the decoder always satisfies
/// [`is_size_consistent`](Self::is_size_consistent); records built by hand
/// may not.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Record {
    #[serde(serialize_with = "ser::tag")]
    pub tag: Tag,
    pub declared_body_size: u32,
    #[serde(serialize_with = "ser::hex_bytes")]
    pub header1: [u8; 4],
    #[serde(serialize_with = "ser::hex_bytes")]
    pub flags: [u8; 4],
    pub subrecords: Vec<Subrecord>,
}

impl Record {
    /// Sum of `8 + declared_size` over all subrecords.
    #[must_use]
    pub fn subrecord_bytes(&self) -> u64 {
        self.subrecords.iter().map(Subrecord::wire_len).sum()
    }

    #[must_use]
    pub fn is_size_consistent(&self) -> bool {
        self.subrecord_bytes() == u64::from(self.declared_body_size)
    }

    /// Header plus body, in bytes.
    #[must_use]
    pub fn wire_len(&self) -> u64 {
        RECORD_HEADER_SIZE as u64 + u64::from(self.declared_body_size)
    }

    /// First subrecord with the given tag.
    #[must_use]
    pub fn find(&self, tag: Tag) -> Option<&Subrecord> {
        self.subrecords.iter().find(|s| s.tag == tag)
    }

    pub fn find_all(&self, tag: Tag) -> impl Iterator<Item = &Subrecord> {
        self.subrecords.iter().filter(move |s| s.tag == tag)
    }

    /// The decoded `HEDR` payload, if this record carries one.
    #[must_use]
    pub fn file_header(&self) -> Option<&FileHeader> {
        self.subrecords.iter().find_map(|s| match &s.payload {
            SubrecordPayload::FileHeader(header) => Some(header),
            _ => None,
        })
    }

    /// Subrecords kept verbatim because their length did not fit.
    pub fn anomalies(&self) -> impl Iterator<Item = &Subrecord> {
        self.subrecords.iter().filter(|s| s.payload.is_mismatched())
    }
}

impl fmt::Display for Record {
    /// One header line, then one indented line per subrecord:
    ///
    /// ```text
    /// GLOB size=34 header1=00000000 flags=00000000 subrecords=2
    ///   NAME (5) "Day"
    ///   FLTV (4) 12
    /// ```
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} size={} header1={} flags={} subrecords={}",
            self.tag,
            self.declared_body_size,
            hex::encode(self.header1),
            hex::encode(self.flags),
            self.subrecords.len()
        )?;
        for sub in &self.subrecords {
            write!(f, "\n  {sub}")?;
        }
        Ok(())
    }
}
