use ess_wire::ByteCursor;
use serde::Serialize;

use crate::error::TypeError;
use crate::layout::PayloadLayout;

/// Field widths of a `HEDR` body, in wire order.
pub const FILE_HEADER_FIELDS: [(&str, usize); 5] = [
    ("version", 4),
    ("unknown", 4),
    ("company_name", 32),
    ("description", 256),
    ("record_count", 4),
];

const fn sum_widths(fields: &[(&str, usize)]) -> usize {
    let mut total = 0;
    let mut i = 0;
    while i < fields.len() {
        total += fields[i].1;
        i += 1;
    }
    total
}

/// Total length of a `HEDR` body.
pub const FILE_HEADER_LEN: usize = sum_widths(&FILE_HEADER_FIELDS);

const _: () = assert!(FILE_HEADER_LEN == 300);

/// `HEDR` — the save file's header subrecord, found in the `TES3` record.
///
/// ```text
/// ┌────────┬───────────┬──────────────┬─────────────────────────────┐
/// │ Offset │ Size      │ Field        │ Encoding                    │
/// ├────────┼───────────┼──────────────┼─────────────────────────────┤
/// │ 0x000  │ 4 bytes   │ version      │ f32 LE                      │
/// │ 0x004  │ 4 bytes   │ unknown      │ u32 LE                      │
/// │ 0x008  │ 32 bytes  │ company_name │ NUL-padded text             │
/// │ 0x028  │ 256 bytes │ description  │ NUL-padded text             │
/// │ 0x128  │ 4 bytes   │ record_count │ u32 LE                      │
/// └────────┴───────────┴──────────────┴─────────────────────────────┘
/// ```
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FileHeader {
    pub version: f32,
    pub unknown: u32,
    pub company_name: String,
    pub description: String,
    pub record_count: u32,
}

impl FileHeader {
    /// Decode a `HEDR` body.
    ///
    /// # Errors
    ///
    /// Returns [`TypeError::LayoutMismatch`] unless `body` is exactly
    /// [`FILE_HEADER_LEN`] bytes long.
    pub fn decode(body: &[u8]) -> Result<Self, TypeError> {
        if body.len() != FILE_HEADER_LEN {
            return Err(TypeError::LayoutMismatch {
                layout: PayloadLayout::FileHeader,
                expected: FILE_HEADER_LEN,
                actual: body.len(),
            });
        }

        let mut cursor = ByteCursor::new(body);
        let header = Self {
            version: cursor.read_f32()?,
            unknown: cursor.read_u32()?,
            company_name: cursor.read_fixed_string(FILE_HEADER_FIELDS[2].1)?,
            description: cursor.read_fixed_string(FILE_HEADER_FIELDS[3].1)?,
            record_count: cursor.read_u32()?,
        };
        debug_assert!(cursor.is_empty());
        Ok(header)
    }
}
