#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    /// Input ended before a fixed-width read could be satisfied.
    ///
    /// `offset` is the cursor position where the read started, `needed`
    /// the number of bytes the read asked for and `available` what was
    /// actually left in the buffer.
    #[error("unexpected end of input at offset {offset}: needed {needed} bytes, {available} available")]
    UnexpectedEof {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// An integer read was asked for a width outside `1..=8` bytes.
    #[error("unsupported integer width {width} at offset {offset}")]
    UnsupportedWidth { offset: usize, width: usize },
}

// The offset on every variant is the position from the start of the
// cursor's buffer, so a caller that walks a whole file gets absolute
// file offsets for free.
