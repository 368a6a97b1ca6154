use ess_types::Record;
use ess_wire::frame::{RECORD_HEADER_SIZE, SUBRECORD_HEADER_SIZE};
use ess_wire::{ByteCursor, RecordHeader, SubrecordHeader};

use crate::config::DecoderConfig;
use crate::error::{DecodeError, SizeScope};
use crate::subrecord::SubrecordDecoder;

/// Decodes one top-level record: a 16-byte header followed by subrecords
/// until the declared body size is used up.
///
/// The body size is checked, not assumed:
///
/// ```text
///   Σ (8 + subrecord.declared_size)  ==  header.body_size
/// ```
///
/// The decoder slices the declared body out of the source first and walks
/// subrecords inside that slice, so a subrecord whose length runs past the
/// end of its record is caught before it can swallow bytes belonging to
/// the next record. That overrun is reported as a record-scope
/// [`DecodeError::SizeMismatch`].
///
/// A failed decode leaves the caller's cursor at the start of the record.
/// The body is borrowed from the source, so no size cap applies here;
/// [`StreamingWalker`](crate::StreamingWalker) enforces
/// `max_record_size` before it buffers a body.
pub struct RecordDecoder<'c> {
    config: &'c DecoderConfig,
}

impl<'c> RecordDecoder<'c> {
    #[must_use]
    pub fn new(config: &'c DecoderConfig) -> Self {
        Self { config }
    }

    /// Decode the record at the cursor.
    ///
    /// # Errors
    ///
    /// - [`DecodeError::EndOfStream`] if the cursor is already at the end.
    /// - [`DecodeError::ShortRead`] if the header or the declared body is
    ///   truncated.
    /// - [`DecodeError::SizeMismatch`] if subrecord sizes do not add up to
    ///   the body size, or (strict mode) a subrecord layout mismatch.
    pub fn decode(&self, cursor: &mut ByteCursor<'_>) -> Result<Record, DecodeError> {
        let offset = cursor.position();
        if cursor.is_empty() {
            return Err(DecodeError::EndOfStream { offset });
        }

        let mut work = cursor.clone();
        let header = RecordHeader::read_from(&mut work)?;

        let len = usize::try_from(header.body_size).unwrap_or(usize::MAX);
        let body = work.take(len)?;
        let record = self.decode_body(header, body, offset)?;

        *cursor = work;
        Ok(record)
    }

    /// Decode the subrecords of a record whose header has already been
    /// read and whose body is fully buffered.
    ///
    /// `offset` is the source position of the record header; error offsets
    /// are reported relative to the source, not to `body`.
    ///
    /// # Errors
    ///
    /// Same as [`decode`](Self::decode), minus `EndOfStream`.
    pub fn decode_body(
        &self,
        header: RecordHeader,
        body: &[u8],
        offset: usize,
    ) -> Result<Record, DecodeError> {
        let declared = u64::from(header.body_size);
        if body.len() as u64 != declared {
            return Err(DecodeError::ShortRead {
                offset: offset + RECORD_HEADER_SIZE,
                needed: usize::try_from(declared).unwrap_or(usize::MAX),
                available: body.len(),
            });
        }

        let subrecord_decoder = SubrecordDecoder::new(self.config, header.tag)
            .with_base_offset(offset + RECORD_HEADER_SIZE);
        let mut cursor = ByteCursor::new(body);
        let mut subrecords = Vec::new();
        let mut consumed: u64 = 0;

        while consumed < declared {
            match subrecord_decoder.decode(&mut cursor) {
                Ok(sub) => {
                    consumed += sub.wire_len();
                    subrecords.push(sub);
                }
                // The body slice is complete, so running out of bytes here
                // means a subrecord length points past the end of the record.
                Err(DecodeError::ShortRead { .. }) => {
                    return Err(DecodeError::SizeMismatch {
                        scope: SizeScope::Record,
                        tag: header.tag,
                        offset,
                        expected: declared,
                        actual: overrun_total(&cursor),
                    });
                }
                Err(other) => return Err(other),
            }
        }

        if consumed != declared {
            return Err(DecodeError::SizeMismatch {
                scope: SizeScope::Record,
                tag: header.tag,
                offset,
                expected: declared,
                actual: consumed,
            });
        }

        tracing::debug!(
            tag = %header.tag,
            offset,
            size = header.body_size,
            subrecords = subrecords.len(),
            "decoded record"
        );

        Ok(Record {
            tag: header.tag,
            declared_body_size: header.body_size,
            header1: header.header1,
            flags: header.flags,
            subrecords,
        })
    }
}

/// Running subrecord total if the subrecord at the cursor were accepted.
fn overrun_total(cursor: &ByteCursor<'_>) -> u64 {
    let consumed = cursor.position() as u64;
    let mut probe = cursor.clone();
    match SubrecordHeader::read_from(&mut probe) {
        Ok(header) => consumed + header.wire_len(),
        Err(_) => consumed + SUBRECORD_HEADER_SIZE as u64,
    }
}
