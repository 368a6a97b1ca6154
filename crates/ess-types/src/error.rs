use ess_wire::WireError;

use crate::layout::PayloadLayout;

/// Errors raised while interpreting a subrecord body as typed fields.
///
/// These sit one level above [`WireError`]: the wire layer only knows
/// about bytes running out, this layer knows what shape a payload was
/// supposed to have.
///
/// ```text
/// ┌─────────────────────────────────────────────────────┐
/// │ TypeError (this crate)                              │
/// │   ├── LayoutMismatch: body length does not fit the  │
/// │   │   layout resolved for the tag                   │
/// │   └── wraps WireError for short reads inside a body │
/// └─────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeError {
    /// The declared body length cannot hold the layout's fields.
    ///
    /// `expected` is the nominal length for the layout (300 for a file
    /// header, 8 for an integer, 4 for a float) and `actual` the declared
    /// length of the body being decoded.
    #[error("{layout} layout expects {expected} bytes, body has {actual}")]
    LayoutMismatch {
        layout: PayloadLayout,
        expected: usize,
        actual: usize,
    },

    #[error(transparent)]
    Wire(#[from] WireError),
}
