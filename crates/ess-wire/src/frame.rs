use crate::cursor::ByteCursor;
use crate::error::WireError;
use crate::tag::Tag;

/// Size of a subrecord header: tag + u32 length.
pub const SUBRECORD_HEADER_SIZE: usize = 8;

/// Size of a record header: tag + u32 body size + two opaque 4-byte fields.
pub const RECORD_HEADER_SIZE: usize = 16;

/// Subrecord header — the envelope in front of every subrecord payload.
///
/// ```text
/// ┌────────┬─────────┬──────────────────────────────────────┐
/// │ Offset │ Size    │ Description                          │
/// ├────────┼─────────┼──────────────────────────────────────┤
/// │ 0x00   │ 4 bytes │ Tag (HEDR, MAST, DATA, ...)          │
/// │ 0x04   │ 4 bytes │ Payload length, u32 LE               │
/// │ 0x08   │ N bytes │ Payload [length bytes]               │
/// └────────┴─────────┴──────────────────────────────────────┘
/// ```
///
/// The length counts payload bytes only, never the 8 header bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubrecordHeader {
    pub tag: Tag,
    pub size: u32,
}

impl SubrecordHeader {
    /// Read the 8-byte header at the cursor.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::UnexpectedEof`] if fewer than 8 bytes remain.
    /// Nothing is consumed in that case.
    pub fn read_from(cursor: &mut ByteCursor<'_>) -> Result<Self, WireError> {
        cursor.peek(SUBRECORD_HEADER_SIZE)?;
        let tag = cursor.read_tag()?;
        let size = cursor.read_u32()?;
        Ok(Self { tag, size })
    }

    /// Header plus payload, in bytes.
    #[must_use]
    pub fn wire_len(&self) -> u64 {
        SUBRECORD_HEADER_SIZE as u64 + u64::from(self.size)
    }
}

/// Record header — the first 16 bytes of every top-level record.
///
/// ```text
/// ┌────────┬─────────┬──────────────────────────────────────┐
/// │ Offset │ Size    │ Description                          │
/// ├────────┼─────────┼──────────────────────────────────────┤
/// │ 0x00   │ 4 bytes │ Tag (TES3, GLOB, ...)                │
/// │ 0x04   │ 4 bytes │ Body size, u32 LE                    │
/// │ 0x08   │ 4 bytes │ Header1, opaque                      │
/// │ 0x0C   │ 4 bytes │ Flags, opaque                        │
/// │ 0x10   │ S bytes │ Subrecords back-to-back              │
/// └────────┴─────────┴──────────────────────────────────────┘
/// ```
///
/// The body size covers the subrecords (their headers included) and
/// excludes these 16 bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordHeader {
    pub tag: Tag,
    pub body_size: u32,
    pub header1: [u8; 4],
    pub flags: [u8; 4],
}

impl RecordHeader {
    /// Read the 16-byte header at the cursor.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::UnexpectedEof`] if fewer than 16 bytes remain.
    /// Nothing is consumed in that case.
    pub fn read_from(cursor: &mut ByteCursor<'_>) -> Result<Self, WireError> {
        Ok(Self::from_bytes(&cursor.read_array()?))
    }

    /// Parse a header from an exact 16-byte buffer, as read from a stream.
    #[must_use]
    pub fn from_bytes(bytes: &[u8; RECORD_HEADER_SIZE]) -> Self {
        let [t0, t1, t2, t3, s0, s1, s2, s3, h0, h1, h2, h3, f0, f1, f2, f3] = *bytes;
        Self {
            tag: Tag::new([t0, t1, t2, t3]),
            body_size: u32::from_le_bytes([s0, s1, s2, s3]),
            header1: [h0, h1, h2, h3],
            flags: [f0, f1, f2, f3],
        }
    }
}
