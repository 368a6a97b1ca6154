use std::fmt;

use ess_wire::cursor::strip_nul_text;
use ess_wire::frame::SUBRECORD_HEADER_SIZE;
use ess_wire::{ByteCursor, Tag};
use serde::Serialize;

use crate::error::TypeError;
use crate::file_header::FileHeader;
use crate::layout::PayloadLayout;
use crate::ser;

/// A decoded subrecord: tag, declared length and typed payload.
///
/// `declared_size` is the length field as it appeared on the wire. The
/// decoder slices exactly that many bytes before interpreting them, so the
/// payload never reads past its own body.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Subrecord {
    #[serde(serialize_with = "ser::tag")]
    pub tag: Tag,
    pub declared_size: u32,
    pub payload: SubrecordPayload,
}

impl Subrecord {
    /// Header plus payload, in bytes. This is what the parent record's
    /// body size accounts for.
    #[must_use]
    pub fn wire_len(&self) -> u64 {
        SUBRECORD_HEADER_SIZE as u64 + u64::from(self.declared_size)
    }
}

/// A float payload, at the width the subrecord declared.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FloatValue {
    Single(f32),
    Double(f64),
}

impl fmt::Display for FloatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
        }
    }
}

/// The typed content of a subrecord.
///
/// One variant per [`PayloadLayout`], plus `Mismatched` for bodies whose
/// length did not fit their layout and were kept verbatim instead of
/// being decoded (lenient mode).
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SubrecordPayload {
    FileHeader(FileHeader),
    Text(String),
    Integer(u64),
    Float(FloatValue),
    /// Raw body bytes for a tag with no structured decoding.
    Opaque(#[serde(serialize_with = "ser::hex_bytes")] Vec<u8>),
    /// A fixed-layout body whose declared length was wrong.
    Mismatched {
        layout: PayloadLayout,
        expected: usize,
        #[serde(serialize_with = "ser::hex_bytes")]
        raw: Vec<u8>,
    },
}

impl SubrecordPayload {
    /// Decode `body` according to `layout`.
    ///
    /// The body is the complete payload slice; every layout consumes all
    /// of it or fails.
    ///
    /// # Errors
    ///
    /// Returns [`TypeError::LayoutMismatch`] if `body.len()` is not
    /// accepted by `layout` (see [`PayloadLayout::accepts`]).
    pub fn decode(layout: PayloadLayout, body: &[u8]) -> Result<Self, TypeError> {
        if !layout.accepts(body.len()) {
            return Err(TypeError::LayoutMismatch {
                layout,
                expected: layout.nominal_len().unwrap_or(body.len()),
                actual: body.len(),
            });
        }

        let mut cursor = ByteCursor::new(body);
        let payload = match layout {
            PayloadLayout::FileHeader => Self::FileHeader(FileHeader::decode(body)?),
            PayloadLayout::Text => Self::Text(strip_nul_text(body)),
            PayloadLayout::Integer => Self::Integer(cursor.read_u64()?),
            PayloadLayout::Float => {
                if body.len() == 8 {
                    Self::Float(FloatValue::Double(cursor.read_f64()?))
                } else {
                    Self::Float(FloatValue::Single(cursor.read_f32()?))
                }
            }
            PayloadLayout::Opaque => Self::Opaque(body.to_vec()),
        };
        Ok(payload)
    }

    /// Keep a body that did not fit `layout` as raw bytes.
    #[must_use]
    pub fn mismatched(layout: PayloadLayout, expected: usize, body: &[u8]) -> Self {
        Self::Mismatched {
            layout,
            expected,
            raw: body.to_vec(),
        }
    }

    #[must_use]
    pub fn is_mismatched(&self) -> bool {
        matches!(self, Self::Mismatched { .. })
    }
}

/// Number of leading bytes shown when a raw body is displayed.
const HEX_PREVIEW: usize = 16;

fn write_hex_preview(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    let shown = &bytes[..bytes.len().min(HEX_PREVIEW)];
    write!(f, "{}", hex::encode(shown))?;
    if bytes.len() > HEX_PREVIEW {
        f.write_str("…")?;
    }
    Ok(())
}

impl fmt::Display for SubrecordPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileHeader(h) => write!(
                f,
                "version={} unknown={} company={:?} description={:?} records={}",
                h.version, h.unknown, h.company_name, h.description, h.record_count
            ),
            Self::Text(s) => write!(f, "{s:?}"),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Opaque(bytes) => {
                f.write_str("opaque ")?;
                write_hex_preview(f, bytes)
            }
            Self::Mismatched {
                layout,
                expected,
                raw,
            } => {
                write!(f, "mismatched {layout} expected={expected} raw=")?;
                write_hex_preview(f, raw)
            }
        }
    }
}

impl fmt::Display for Subrecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) {}", self.tag, self.declared_size, self.payload)
    }
}
