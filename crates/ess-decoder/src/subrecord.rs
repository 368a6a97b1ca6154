use ess_types::{PayloadLayout, Subrecord, SubrecordPayload, TypeError};
use ess_wire::{ByteCursor, SubrecordHeader, Tag};

use crate::config::{DecoderConfig, Strictness};
use crate::error::{DecodeError, SizeScope};

/// Decodes one subrecord at a time from a cursor.
///
/// Reading a subrecord is always the same three steps:
///
/// ```text
///   1. tag (4 bytes) + length L (u32 LE)
///   2. take exactly L bytes as the body
///   3. interpret the body with the layout resolved for (parent, tag)
/// ```
///
/// Because the body is sliced in step 2 before anything interprets it,
/// a successful call always advances the cursor by exactly `8 + L`, no
/// matter which layout ran. A failed call leaves the cursor untouched.
///
/// `base_offset` is added to every reported offset. The record decoder
/// hands out cursors over a record body, so error offsets would
/// otherwise be body-relative.
pub struct SubrecordDecoder<'c> {
  config: &'c DecoderConfig,
  parent: Tag,
  base_offset: usize,
}

impl<'c> SubrecordDecoder<'c> {
  /// Create a decoder for subrecords that live inside a `parent` record.
  #[must_use]
  pub fn new(config: &'c DecoderConfig, parent: Tag) -> Self {
    Self {
      config,
      parent,
      base_offset: 0,
    }
  }

  #[must_use]
  pub fn with_base_offset(mut self, base_offset: usize) -> Self {
    self.base_offset = base_offset;
    self
  }

  /// Decode the subrecord at the cursor.
  ///
  /// Unknown tags decode to [`SubrecordPayload::Opaque`]; that is not an
  /// error. A fixed-layout body with the wrong length is a warning in
  /// lenient mode (kept as [`SubrecordPayload::Mismatched`]) and an error
  /// in strict mode.
  ///
  /// # Errors
  ///
  /// - [`DecodeError::ShortRead`] if the header or the `L`-byte body is
  ///   not fully available.
  /// - [`DecodeError::SizeMismatch`] with [`SizeScope::Subrecord`] for a
  ///   layout mismatch under [`Strictness::Strict`].
  pub fn decode(&self, cursor: &mut ByteCursor<'_>) -> Result<Subrecord, DecodeError> {
    let start = cursor.position();
    let mut work = cursor.clone();

    let header = SubrecordHeader::read_from(&mut work).map_err(|e| self.rebased(e.into()))?;
    let len = usize::try_from(header.size).unwrap_or(usize::MAX);
    let body = work.take(len).map_err(|e| self.rebased(e.into()))?;

    let layout = self.config.layouts.resolve(self.parent, header.tag);
    let payload = match SubrecordPayload::decode(layout, body) {
      Ok(payload) => payload,
      Err(TypeError::LayoutMismatch {
        layout,
        expected,
        actual,
      }) => self.on_layout_mismatch(header.tag, start, layout, expected, actual, body)?,
      Err(other) => return Err(self.rebased(other.into())),
    };

    tracing::trace!(
      parent = %self.parent,
      tag = %header.tag,
      offset = start + self.base_offset,
      size = header.size,
      layout = %layout,
      "decoded subrecord"
    );

    *cursor = work;
    Ok(Subrecord {
      tag: header.tag,
      declared_size: header.size,
      payload,
    })
  }

  fn on_layout_mismatch(
    &self,
    tag: Tag,
    start: usize,
    layout: PayloadLayout,
    expected: usize,
    actual: usize,
    body: &[u8],
  ) -> Result<SubrecordPayload, DecodeError> {
    let offset = start + self.base_offset;
    match self.config.strictness {
      Strictness::Strict => Err(DecodeError::SizeMismatch {
        scope: SizeScope::Subrecord,
        tag,
        offset,
        expected: expected as u64,
        actual: actual as u64,
      }),
      Strictness::Lenient => {
        tracing::warn!(
          parent = %self.parent,
          tag = %tag,
          offset,
          layout = %layout,
          expected,
          actual,
          "subrecord length does not match its layout, keeping raw bytes"
        );
        Ok(SubrecordPayload::mismatched(layout, expected, body))
      }
    }
  }

  fn rebased(&self, err: DecodeError) -> DecodeError {
    err.rebase(self.base_offset)
  }
}
