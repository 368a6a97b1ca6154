use crate::error::WireError;
use crate::tag::{TAG_SIZE, Tag};

/// Forward-only read position over a borrowed byte slice.
///
/// Every primitive in the save format is fixed-width little-endian, so the
/// cursor only needs two things: a way to take `n` bytes and a way to say
/// how far it got. All typed reads are built on [`take`](Self::take).
///
/// Invariants:
///   - `pos <= buf.len()` at all times.
///   - A successful read advances `pos` by exactly the bytes it consumed.
///   - A failed read leaves `pos` where it was.
///
/// ```text
///   buf:  [ consumed ........ | remaining .............. ]
///                             ^ pos
/// ```
#[derive(Clone, Debug)]
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    #[must_use]
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes consumed so far, measured from the start of the buffer.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// The unread tail of the buffer.
    #[must_use]
    pub fn remaining(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    #[must_use]
    pub fn remaining_len(&self) -> usize {
        self.buf.len() - self.pos
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pos == self.buf.len()
    }

    /// Take the next `n` bytes as a borrowed slice.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::UnexpectedEof`] if fewer than `n` bytes remain.
    /// The cursor does not move in that case.
    pub fn take(&mut self, n: usize) -> Result<&'a [u8], WireError> {
        let available = self.remaining_len();
        if available < n {
            return Err(WireError::UnexpectedEof {
                offset: self.pos,
                needed: n,
                available,
            });
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    /// Look at the next `n` bytes without consuming them.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::UnexpectedEof`] if fewer than `n` bytes remain.
    pub fn peek(&self, n: usize) -> Result<&'a [u8], WireError> {
        let available = self.remaining_len();
        if available < n {
            return Err(WireError::UnexpectedEof {
                offset: self.pos,
                needed: n,
                available,
            });
        }
        Ok(&self.buf[self.pos..self.pos + n])
    }

    /// Take exactly `N` bytes as an owned array.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::UnexpectedEof`] on a short read.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], WireError> {
        let bytes = self.take(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    /// Read a 4-byte tag.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::UnexpectedEof`] on a short read.
    pub fn read_tag(&mut self) -> Result<Tag, WireError> {
        Ok(Tag::new(self.read_array::<TAG_SIZE>()?))
    }

    /// Peek the next tag without consuming it.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::UnexpectedEof`] if fewer than 4 bytes remain.
    pub fn peek_tag(&self) -> Result<Tag, WireError> {
        let bytes = self.peek(TAG_SIZE)?;
        let mut out = [0u8; TAG_SIZE];
        out.copy_from_slice(bytes);
        Ok(Tag::new(out))
    }

    /// Read an unsigned little-endian integer of `width` bytes (1–8).
    ///
    /// | Width | Bytes                       | Value |
    /// |-------|-----------------------------|-------|
    /// | 1     | `[0x2A]`                    | 42    |
    /// | 4     | `[0x2C, 0x01, 0x00, 0x00]`  | 300   |
    /// | 8     | `[0x01, 0, 0, 0, 0, 0, 0, 0]` | 1   |
    ///
    /// # Errors
    ///
    /// - [`WireError::UnsupportedWidth`] if `width` is 0 or more than 8.
    /// - [`WireError::UnexpectedEof`] on a short read.
    pub fn read_uint(&mut self, width: usize) -> Result<u64, WireError> {
        if width == 0 || width > 8 {
            return Err(WireError::UnsupportedWidth {
                offset: self.pos,
                width,
            });
        }
        let bytes = self.take(width)?;
        let mut wide = [0u8; 8];
        wide[..width].copy_from_slice(bytes);
        Ok(u64::from_le_bytes(wide))
    }

    /// Read a 4-byte little-endian `u32`. Every size field in the format
    /// uses this width.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::UnexpectedEof`] on a short read.
    pub fn read_u32(&mut self) -> Result<u32, WireError> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    /// # Errors
    ///
    /// Returns [`WireError::UnexpectedEof`] on a short read.
    pub fn read_u64(&mut self) -> Result<u64, WireError> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    /// Read an IEEE-754 single-precision float, little-endian.
    ///
    /// The bits are reinterpreted as-is; no rounding or normalization is
    /// applied, so NaN payloads and signed zeros survive untouched.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::UnexpectedEof`] on a short read.
    pub fn read_f32(&mut self) -> Result<f32, WireError> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }

    /// # Errors
    ///
    /// Returns [`WireError::UnexpectedEof`] on a short read.
    pub fn read_f64(&mut self) -> Result<f64, WireError> {
        Ok(f64::from_le_bytes(self.read_array()?))
    }

    /// Read a fixed-width string of `n` bytes.
    ///
    /// Every NUL byte is removed before decoding, not only a trailing
    /// terminator: save files pad fixed fields with NULs and some payloads
    /// carry NULs in the middle. The remaining bytes are decoded as UTF-8
    /// with invalid sequences replaced, since the game writes 8-bit
    /// codepage text.
    ///
    /// ```text
    ///   b"AB\0CD\0\0"  (n = 7)  →  "ABCD"
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`WireError::UnexpectedEof`] if fewer than `n` bytes remain.
    pub fn read_fixed_string(&mut self, n: usize) -> Result<String, WireError> {
        let bytes = self.take(n)?;
        Ok(strip_nul_text(bytes))
    }
}

/// Decode `bytes` as lossy UTF-8 with every NUL byte removed.
#[must_use]
pub fn strip_nul_text(bytes: &[u8]) -> String {
    let kept: Vec<u8> = bytes.iter().copied().filter(|&b| b != 0).collect();
    String::from_utf8_lossy(&kept).into_owned()
}
