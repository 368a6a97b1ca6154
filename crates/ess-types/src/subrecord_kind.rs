use ess_wire::Tag;

use crate::layout::PayloadLayout;

/// Well-known tags.
///
/// Subrecord tags have a structured decoding; record tags are only listed
/// so callers can build a recognized set without spelling bytes by hand.
pub mod tags {
    use ess_wire::Tag;

    pub const HEDR: Tag = Tag::new(*b"HEDR");
    pub const MAST: Tag = Tag::new(*b"MAST");
    pub const DATA: Tag = Tag::new(*b"DATA");
    pub const NAME: Tag = Tag::new(*b"NAME");
    pub const FLTV: Tag = Tag::new(*b"FLTV");

    /// Game identification record.
    pub const TES3: Tag = Tag::new(*b"TES3");
    /// Global variable record.
    pub const GLOB: Tag = Tag::new(*b"GLOB");
}

/// Subrecord tags with a known payload shape.
///
/// ```text
/// ┌──────┬────────────┬─────────────────────────────────────┐
/// │ Tag  │ Variant    │ Payload                             │
/// ├──────┼────────────┼─────────────────────────────────────┤
/// │ HEDR │ FileHeader │ 300-byte fixed struct               │
/// │ MAST │ Master     │ master file name, whole body        │
/// │ DATA │ Data       │ u64 LE, 8 bytes                     │
/// │ NAME │ Name       │ identifier string, whole body       │
/// │ FLTV │ FloatValue │ float, width = declared length      │
/// │ ---- │ Unknown    │ anything else, kept as raw bytes    │
/// └──────┴────────────┴─────────────────────────────────────┘
/// ```
///
/// Unknown tags are not an error. The format grows new subrecords and
/// an older reader must carry them through untouched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SubrecordKind {
    FileHeader,
    Master,
    Data,
    Name,
    FloatValue,
    Unknown(Tag),
}

impl SubrecordKind {
    #[must_use]
    pub fn from_tag(tag: Tag) -> Self {
        match tag {
            tags::HEDR => Self::FileHeader,
            tags::MAST => Self::Master,
            tags::DATA => Self::Data,
            tags::NAME => Self::Name,
            tags::FLTV => Self::FloatValue,
            other => Self::Unknown(other),
        }
    }

    #[must_use]
    pub fn tag(self) -> Tag {
        match self {
            Self::FileHeader => tags::HEDR,
            Self::Master => tags::MAST,
            Self::Data => tags::DATA,
            Self::Name => tags::NAME,
            Self::FloatValue => tags::FLTV,
            Self::Unknown(tag) => tag,
        }
    }

    /// The layout used when no per-parent override applies.
    ///
    /// Adding a variant above forces a decision here.
    #[must_use]
    pub fn default_layout(self) -> PayloadLayout {
        match self {
            Self::FileHeader => PayloadLayout::FileHeader,
            Self::Master | Self::Name => PayloadLayout::Text,
            Self::Data => PayloadLayout::Integer,
            Self::FloatValue => PayloadLayout::Float,
            Self::Unknown(_) => PayloadLayout::Opaque,
        }
    }
}
