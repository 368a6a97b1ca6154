use std::fmt;

/// Four-byte record or subrecord identifier.
///
/// Tags are ASCII on the wire (`TES3`, `HEDR`, `GLOB`, ...) but nothing
/// in the format forces that, so the raw bytes are kept as-is and only
/// rendered as text for display. A tag with a NUL or a high byte still
/// round-trips exactly through [`Tag::as_bytes`].
///
/// ```text
/// ┌────────┬─────────┬──────────────────────────────┐
/// │ Offset │ Size    │ Description                  │
/// ├────────┼─────────┼──────────────────────────────┤
/// │ 0x00   │ 4 bytes │ Tag bytes, no length prefix  │
/// └────────┴─────────┴──────────────────────────────┘
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag([u8; 4]);

/// Size of a tag on the wire.
pub const TAG_SIZE: usize = 4;

impl Tag {
    /// Build a tag from a byte-string literal: `Tag::new(*b"HEDR")`.
    #[must_use]
    pub const fn new(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// Lossy text form of the tag. Non-printable bytes become `.`.
    #[must_use]
    pub fn to_text(&self) -> String {
        self.0
            .iter()
            .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
            .collect()
    }

    /// Parse a tag from user input such as a CLI flag.
    ///
    /// Accepts exactly four ASCII characters; anything else returns `None`.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let bytes: [u8; 4] = text.as_bytes().try_into().ok()?;
        if bytes.is_ascii() { Some(Self(bytes)) } else { None }
    }
}

impl From<[u8; 4]> for Tag {
    fn from(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({:?})", self.to_text())
    }
}
