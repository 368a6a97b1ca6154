use std::fmt;

use ess_types::{FileHeader, Record, tags};
use ess_wire::{ByteCursor, Tag};

use crate::config::DecoderConfig;
use crate::error::DecodeError;
use crate::record::RecordDecoder;

/// Why a walk stopped without an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
  /// Every byte of the source was consumed.
  EndOfSource { offset: usize },

  /// The next record's tag is not in the recognized set. The record at
  /// `offset` was not consumed.
  Unrecognized { tag: Tag, offset: usize },
}

impl Termination {
  #[must_use]
  pub fn offset(&self) -> usize {
    match *self {
      Self::EndOfSource { offset } | Self::Unrecognized { offset, .. } => offset,
    }
  }
}

impl fmt::Display for Termination {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::EndOfSource { offset } => write!(f, "end of source at offset {offset}"),
      Self::Unrecognized { tag, offset } => {
        write!(f, "unrecognized record {tag} at offset {offset}")
      }
    }
  }
}

/// The result of walking a source to its natural end.
#[derive(Clone, Debug, PartialEq)]
pub struct Stream {
  pub records: Vec<Record>,
  pub termination: Termination,
}

impl Stream {
  /// The `HEDR` of the leading `TES3` record, if the source starts with one.
  #[must_use]
  pub fn file_header(&self) -> Option<&FileHeader> {
    self
      .records
      .first()
      .filter(|r| r.tag == tags::TES3)
      .and_then(Record::file_header)
  }
}

/// A walk that failed part-way. Records decoded before the failure are
/// kept so callers can still show them.
#[derive(Debug, thiserror::Error)]
#[error("decoding stopped after {} records: {error}", .records.len())]
pub struct PartialDecode {
  pub records: Vec<Record>,
  #[source]
  pub error: DecodeError,
}

/// Iterator over the records of an in-memory source.
///
/// ```text
///   loop:
///     no bytes left            → stop (EndOfSource)
///     1..=3 bytes left         → ShortRead
///     tag not recognized       → stop (Unrecognized), record untouched
///     otherwise                → decode one record
/// ```
///
/// The iterator yields `Ok(record)` for each record and ends after the
/// first `Err`. Once it returns `None`, [`termination`](Self::termination)
/// says why.
pub struct StreamWalker<'a, 'c> {
  cursor: ByteCursor<'a>,
  config: &'c DecoderConfig,
  decoder: RecordDecoder<'c>,
  termination: Option<Termination>,
  failed: bool,
}

impl<'a, 'c> StreamWalker<'a, 'c> {
  #[must_use]
  pub fn new(source: &'a [u8], config: &'c DecoderConfig) -> Self {
    Self {
      cursor: ByteCursor::new(source),
      config,
      decoder: RecordDecoder::new(config),
      termination: None,
      failed: false,
    }
  }

  /// Source offset of the next unread byte.
  #[must_use]
  pub fn position(&self) -> usize {
    self.cursor.position()
  }

  /// How the walk ended, once it has ended without an error.
  #[must_use]
  pub fn termination(&self) -> Option<Termination> {
    self.termination
  }

  fn stop(&mut self, termination: Termination) {
    tracing::debug!(?termination, "walk stopped");
    self.termination = Some(termination);
  }
}

impl Iterator for StreamWalker<'_, '_> {
  type Item = Result<Record, DecodeError>;

  fn next(&mut self) -> Option<Self::Item> {
    if self.failed || self.termination.is_some() {
      return None;
    }

    let offset = self.cursor.position();
    if self.cursor.is_empty() {
      self.stop(Termination::EndOfSource { offset });
      return None;
    }

    let tag = match self.cursor.peek_tag() {
      Ok(tag) => tag,
      Err(e) => {
        self.failed = true;
        return Some(Err(e.into()));
      }
    };
    if !self.config.recognized.contains(tag) {
      self.stop(Termination::Unrecognized { tag, offset });
      return None;
    }

    let result = self.decoder.decode(&mut self.cursor);
    if result.is_err() {
      self.failed = true;
    }
    Some(result)
  }
}

/// Walk an in-memory source until it ends or an unrecognized record.
///
/// # Errors
///
/// Returns [`PartialDecode`] carrying the records decoded so far if any
/// record fails to decode.
pub fn walk(source: &[u8], config: &DecoderConfig) -> Result<Stream, PartialDecode> {
  let mut walker = StreamWalker::new(source, config);
  let mut records = Vec::new();

  for item in walker.by_ref() {
    match item {
      Ok(record) => records.push(record),
      Err(error) => return Err(PartialDecode { records, error }),
    }
  }

  let termination = walker.termination().unwrap_or(Termination::EndOfSource {
    offset: walker.position(),
  });
  Ok(Stream {
    records,
    termination,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::RecognizedTags;
  use crate::error::SizeScope;
  use crate::test_bytes::{glob, hedr_payload, record, subrecord};

  fn tes3(record_count: u32) -> Vec<u8> {
    let mut body = subrecord(b"HEDR", &hedr_payload(1.3, "Bethesda", "Quicksave", record_count));
    body.extend(subrecord(b"MAST", b"Morrowind.esm\0"));
    body.extend(subrecord(b"DATA", &0u64.to_le_bytes()));
    record(b"TES3", &body)
  }

  #[test]
  fn walks_to_end_of_source() {
    let mut bytes = tes3(2);
    bytes.extend(glob("GameHour", 13.5));
    bytes.extend(glob("Day", 4.0));

    let stream = walk(&bytes, &DecoderConfig::default()).unwrap();
    assert_eq!(stream.records.len(), 3);
    assert_eq!(
      stream.termination,
      Termination::EndOfSource { offset: bytes.len() }
    );
    assert_eq!(stream.file_header().map(|h| h.record_count), Some(2));
    assert!(stream.records.iter().all(Record::is_size_consistent));
  }

  #[test]
  fn stops_at_unrecognized_tag_without_consuming_it() {
    let mut bytes = tes3(1);
    bytes.extend(glob("GameHour", 13.5));
    let stop_at = bytes.len();
    bytes.extend(record(b"XXXX", &subrecord(b"NAME", b"x\0")));

    let config = DecoderConfig::default().with_recognized(RecognizedTags::reference());
    let mut walker = StreamWalker::new(&bytes, &config);
    let records: Vec<_> = walker.by_ref().collect::<Result<_, _>>().unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(
      walker.termination(),
      Some(Termination::Unrecognized {
        tag: Tag::new(*b"XXXX"),
        offset: stop_at,
      })
    );
    assert_eq!(walker.position(), stop_at);
  }

  #[test]
  fn termination_display() {
    assert_eq!(
      Termination::EndOfSource { offset: 40 }.to_string(),
      "end of source at offset 40"
    );
    assert_eq!(
      Termination::Unrecognized {
        tag: Tag::new(*b"SCPT"),
        offset: 12,
      }
      .to_string(),
      "unrecognized record SCPT at offset 12"
    );
  }

  #[test]
  fn empty_source_is_empty_stream() {
    let stream = walk(&[], &DecoderConfig::default()).unwrap();
    assert!(stream.records.is_empty());
    assert_eq!(stream.termination, Termination::EndOfSource { offset: 0 });
    assert!(stream.file_header().is_none());
  }

  #[test]
  fn truncated_record_keeps_earlier_records() {
    let mut bytes = tes3(2);
    let glob_bytes = glob("GameHour", 13.5);
    bytes.extend_from_slice(&glob_bytes[..glob_bytes.len() - 3]);

    let partial = walk(&bytes, &DecoderConfig::default()).unwrap_err();
    assert_eq!(partial.records.len(), 1);
    assert!(matches!(partial.error, DecodeError::ShortRead { .. }));
    assert!(partial.to_string().starts_with("decoding stopped after 1 records"));
  }

  #[test]
  fn stray_trailing_bytes_are_short_read() {
    for extra in 1..=3 {
      let mut bytes = glob("Day", 1.0);
      let offset = bytes.len();
      bytes.extend(std::iter::repeat_n(0u8, extra));

      let partial = walk(&bytes, &DecoderConfig::default()).unwrap_err();
      assert_eq!(partial.records.len(), 1);
      assert!(
        matches!(partial.error, DecodeError::ShortRead { offset: o, needed: 4, available } if o == offset && available == extra)
      );
    }
  }

  #[test]
  fn iterator_is_fused_after_error() {
    let mut bytes = glob("Day", 1.0);
    bytes.push(0);

    let config = DecoderConfig::default();
    let mut walker = StreamWalker::new(&bytes, &config);
    assert!(walker.next().unwrap().is_ok());
    assert!(walker.next().unwrap().is_err());
    assert!(walker.next().is_none());
    assert!(walker.termination().is_none());
  }

  #[test]
  fn record_size_mismatch_aborts_walk() {
    let mut body = subrecord(b"NAME", b"Day\0");
    body.extend_from_slice(&[1, 2]);
    let mut bytes = glob("First", 0.0);
    let bad_offset = bytes.len();
    bytes.extend(record(b"GLOB", &body));
    bytes.extend(glob("Never", 0.0));

    let partial = walk(&bytes, &DecoderConfig::default()).unwrap_err();
    assert_eq!(partial.records.len(), 1);
    assert!(matches!(
      partial.error,
      DecodeError::SizeMismatch { scope: SizeScope::Record, offset, .. } if offset == bad_offset
    ));
  }
}
