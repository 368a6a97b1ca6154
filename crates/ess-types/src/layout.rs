use std::collections::HashMap;
use std::fmt;

use ess_wire::Tag;
use serde::Serialize;

use crate::file_header::FILE_HEADER_LEN;
use crate::subrecord_kind::SubrecordKind;

/// How a subrecord body is interpreted.
///
/// ```text
/// ┌────────────┬──────────────────┬─────────────────────────────────┐
/// │ Layout     │ Accepted lengths │ Result                          │
/// ├────────────┼──────────────────┼─────────────────────────────────┤
/// │ FileHeader │ 300              │ FileHeader struct               │
/// │ Text       │ any              │ String, NULs stripped           │
/// │ Integer    │ 8                │ u64 LE                          │
/// │ Float      │ 4 or 8           │ f32 or f64 LE, bit-exact        │
/// │ Opaque     │ any              │ raw bytes                       │
/// └────────────┴──────────────────┴─────────────────────────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadLayout {
    FileHeader,
    Text,
    Integer,
    Float,
    Opaque,
}

impl PayloadLayout {
    /// Whether a body of `len` bytes fits this layout exactly.
    #[must_use]
    pub fn accepts(self, len: usize) -> bool {
        match self {
            Self::FileHeader => len == FILE_HEADER_LEN,
            Self::Integer => len == 8,
            Self::Float => len == 4 || len == 8,
            Self::Text | Self::Opaque => true,
        }
    }

    /// The length reported as "expected" when a body does not fit.
    #[must_use]
    pub fn nominal_len(self) -> Option<usize> {
        match self {
            Self::FileHeader => Some(FILE_HEADER_LEN),
            Self::Integer => Some(8),
            Self::Float => Some(4),
            Self::Text | Self::Opaque => None,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::FileHeader => "file_header",
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Opaque => "opaque",
        }
    }

    /// Inverse of [`name`](Self::name). Accepts `-` in place of `_`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.replace('-', "_").as_str() {
            "file_header" => Some(Self::FileHeader),
            "text" => Some(Self::Text),
            "integer" => Some(Self::Integer),
            "float" => Some(Self::Float),
            "opaque" => Some(Self::Opaque),
            _ => None,
        }
    }
}

impl fmt::Display for PayloadLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-parent payload layouts.
///
/// Whether `DATA` under `TES3` has the same shape as `DATA` under some
/// other record is not something the format tells us. The registry makes
/// that assumption explicit: lookups go from the most specific key to the
/// least.
///
/// ```text
///   1. (Some(parent), tag)   override for this parent only
///   2. (None, tag)           override for every parent
///   3. SubrecordKind::from_tag(tag).default_layout()
/// ```
///
/// An empty registry reproduces the global, tag-only dispatch.
#[derive(Clone, Debug, Default)]
pub struct LayoutRegistry {
    overrides: HashMap<(Option<Tag>, Tag), PayloadLayout>,
}

impl LayoutRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the layout for `tag` under `parent`, or under every parent when
    /// `parent` is `None`.
    pub fn set(&mut self, parent: Option<Tag>, tag: Tag, layout: PayloadLayout) -> &mut Self {
        self.overrides.insert((parent, tag), layout);
        self
    }

    /// Builder form of [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, parent: Option<Tag>, tag: Tag, layout: PayloadLayout) -> Self {
        self.set(parent, tag, layout);
        self
    }

    #[must_use]
    pub fn resolve(&self, parent: Tag, tag: Tag) -> PayloadLayout {
        self.overrides
            .get(&(Some(parent), tag))
            .or_else(|| self.overrides.get(&(None, tag)))
            .copied()
            .unwrap_or_else(|| SubrecordKind::from_tag(tag).default_layout())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }
}
