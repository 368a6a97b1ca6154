use std::fmt;

use ess_types::error::TypeError;
use ess_wire::{Tag, WireError};

/// Which size field a [`DecodeError::SizeMismatch`] refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SizeScope {
    /// A record's subrecords do not add up to its declared body size.
    Record,
    /// A fixed-layout subrecord's declared length does not fit its layout.
    Subrecord,
}

impl fmt::Display for SizeScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Record => f.write_str("record"),
            Self::Subrecord => f.write_str("subrecord"),
        }
    }
}

/// Errors that can occur while decoding a save stream.
///
/// Every variant is a deterministic function of the input bytes; nothing
/// here is worth retrying. Offsets are absolute positions in the source.
///
/// ```text
///   DecodeError
///   ├── ShortRead        ← fewer bytes than a header or body needs
///   ├── SizeMismatch     ← size fields disagree (record or subrecord)
///   ├── EndOfStream      ← a record was requested at end of source
///   ├── RecordTooLarge   ← body size above the configured cap
///   ├── Type(TypeError)  ← layout failure raised through `?` by callers
///   ├── Wire(WireError)  ← wire failure raised through `?` by callers
///   └── Io(io::Error)    ← from the underlying reader (streaming walker)
/// ```
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The source ended before a read could be satisfied.
    #[error("short read at offset {offset}: needed {needed} bytes, {available} available")]
    ShortRead {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// Size fields disagree with the bytes they describe.
    ///
    /// For [`SizeScope::Record`], `expected` is the declared body size and
    /// `actual` the running subrecord total at the point it went wrong.
    /// For [`SizeScope::Subrecord`], `expected` is the layout's nominal
    /// length and `actual` the declared subrecord length.
    #[error("{scope} {tag} at offset {offset}: expected {expected} bytes, got {actual}")]
    SizeMismatch {
        scope: SizeScope,
        tag: Tag,
        offset: usize,
        expected: u64,
        actual: u64,
    },

    /// A record was requested but the source has no bytes left.
    ///
    /// Distinct from a walker stopping on an unrecognized tag, which is
    /// normal termination and not an error.
    #[error("end of stream at offset {offset}")]
    EndOfStream { offset: usize },

    /// A record declared a body larger than `DecoderConfig::max_record_size`.
    #[error("record {tag} at offset {offset} declares {size} bytes, limit is {limit}")]
    RecordTooLarge {
        tag: Tag,
        offset: usize,
        size: u32,
        limit: u32,
    },

    /// A layout failure from `ess-types` that no decoder intercepted.
    ///
    /// The decoders turn [`TypeError::LayoutMismatch`] into a lenient
    /// payload or a subrecord-scope [`SizeMismatch`](Self::SizeMismatch),
    /// so this only appears when caller code decodes payloads directly
    /// and propagates with `?`.
    #[error(transparent)]
    Type(TypeError),

    /// A wire failure other than running out of bytes, such as
    /// [`WireError::UnsupportedWidth`] from `ByteCursor::read_uint`. The
    /// decoders never read variable-width integers, so like `Type` this
    /// comes from caller code using the cursor primitives.
    #[error(transparent)]
    Wire(WireError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<WireError> for DecodeError {
    fn from(err: WireError) -> Self {
        match err {
            WireError::UnexpectedEof {
                offset,
                needed,
                available,
            } => Self::ShortRead {
                offset,
                needed,
                available,
            },
            other => Self::Wire(other),
        }
    }
}

impl From<TypeError> for DecodeError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::Wire(wire) => wire.into(),
            other => Self::Type(other),
        }
    }
}

impl DecodeError {
    /// Shift every offset in the error by `base`.
    ///
    /// Decoding a buffered record body produces offsets relative to that
    /// buffer; this turns them back into source offsets.
    #[must_use]
    pub(crate) fn rebase(self, base: usize) -> Self {
        match self {
            Self::ShortRead {
                offset,
                needed,
                available,
            } => Self::ShortRead {
                offset: offset + base,
                needed,
                available,
            },
            Self::SizeMismatch {
                scope,
                tag,
                offset,
                expected,
                actual,
            } => Self::SizeMismatch {
                scope,
                tag,
                offset: offset + base,
                expected,
                actual,
            },
            Self::EndOfStream { offset } => Self::EndOfStream {
                offset: offset + base,
            },
            Self::RecordTooLarge {
                tag,
                offset,
                size,
                limit,
            } => Self::RecordTooLarge {
                tag,
                offset: offset + base,
                size,
                limit,
            },
            other => other,
        }
    }
}
