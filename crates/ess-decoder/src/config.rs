use std::collections::BTreeSet;

use ess_types::{LayoutRegistry, tags};
use ess_wire::Tag;

/// Configuration for the record decoder and stream walkers.
///
/// ```text
/// ┌─────────────────┬───────────────────────────────────────────────────┐
/// │ Field           │ Purpose                                           │
/// ├─────────────────┼───────────────────────────────────────────────────┤
/// │ recognized      │ Top-level tags the walkers decode; the first      │
/// │                 │ record outside this set ends the stream           │
/// │ strictness      │ Whether subrecord layout mismatches are fatal     │
/// │ layouts         │ Per-(parent, tag) payload layout overrides        │
/// │ max_record_size │ Upper bound on a record's declared body size      │
/// └─────────────────┴───────────────────────────────────────────────────┘
/// ```
///
/// The default accepts every top-level tag, so a walker runs to end of
/// source. Use [`RecognizedTags::reference`] for the `TES3` + `GLOB`
/// allow-list the save inspector has always used.
#[derive(Clone, Debug)]
pub struct DecoderConfig {
    pub recognized: RecognizedTags,
    pub strictness: Strictness,
    pub layouts: LayoutRegistry,
    pub max_record_size: u32,
}

/// Default cap on a single record body: 64 MiB.
pub const DEFAULT_MAX_RECORD_SIZE: u32 = 64 * 1024 * 1024;

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            recognized: RecognizedTags::Any,
            strictness: Strictness::default(),
            layouts: LayoutRegistry::default(),
            max_record_size: DEFAULT_MAX_RECORD_SIZE,
        }
    }
}

impl DecoderConfig {
    #[must_use]
    pub fn with_recognized(mut self, recognized: RecognizedTags) -> Self {
        self.recognized = recognized;
        self
    }

    #[must_use]
    pub fn with_strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }

    #[must_use]
    pub fn strict(self) -> Self {
        self.with_strictness(Strictness::Strict)
    }

    #[must_use]
    pub fn with_layouts(mut self, layouts: LayoutRegistry) -> Self {
        self.layouts = layouts;
        self
    }

    #[must_use]
    pub fn with_max_record_size(mut self, max_record_size: u32) -> Self {
        self.max_record_size = max_record_size;
        self
    }
}

/// What to do when a fixed-layout subrecord has the wrong length.
///
/// Record-level size mismatches are always fatal; this only governs
/// subrecord bodies like a `HEDR` that is not 300 bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Strictness {
    /// Log a warning and keep the body as raw bytes.
    #[default]
    Lenient,
    /// Fail with `DecodeError::SizeMismatch`.
    Strict,
}

/// The set of top-level record tags a walker will decode.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum RecognizedTags {
    /// Every tag is recognized; walking stops only at end of source.
    #[default]
    Any,
    Only(BTreeSet<Tag>),
}

impl RecognizedTags {
    /// `TES3` (game identification) and `GLOB` (global variables).
    #[must_use]
    pub fn reference() -> Self {
        Self::only([tags::TES3, tags::GLOB])
    }

    #[must_use]
    pub fn only(tags: impl IntoIterator<Item = Tag>) -> Self {
        Self::Only(tags.into_iter().collect())
    }

    #[must_use]
    pub fn contains(&self, tag: Tag) -> bool {
        match self {
            Self::Any => true,
            Self::Only(set) => set.contains(&tag),
        }
    }
}
