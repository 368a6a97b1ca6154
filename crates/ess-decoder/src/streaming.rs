use std::io::{self, Read};

use ess_types::Record;
use ess_wire::frame::RECORD_HEADER_SIZE;
use ess_wire::tag::TAG_SIZE;
use ess_wire::{RecordHeader, Tag};

use crate::config::DecoderConfig;
use crate::error::DecodeError;
use crate::record::RecordDecoder;
use crate::walker::Termination;

/// Streaming walker: yields records one at a time from any [`Read`]
/// source without loading the whole save into memory.
///
/// Only one record body is buffered at a time, and the buffer is reused
/// across records. The stop rules match [`StreamWalker`](crate::StreamWalker).
/// A reader cannot un-read, so the four tag bytes of an unrecognized record
/// are held back by the walker; [`into_remainder`](Self::into_remainder)
/// hands them back in front of the reader, leaving the record unconsumed.
///
/// ```text
///   read tag (4)      ── 0 bytes   → EndOfSource
///                     ── 1..=3     → ShortRead
///                     ── unknown   → Unrecognized
///   read rest of header (12)
///   check body size against max_record_size
///   read body (S) into the reusable buffer
///   decode subrecords from the buffer
/// ```
pub struct StreamingWalker<'c, R> {
  reader: R,
  config: &'c DecoderConfig,
  decoder: RecordDecoder<'c>,
  /// Record body buffer, reused across records.
  buf: Vec<u8>,
  /// Tag bytes of the unrecognized record the walk stopped at.
  held: Vec<u8>,
  position: usize,
  termination: Option<Termination>,
  failed: bool,
}

impl<'c, R: Read> StreamingWalker<'c, R> {
  #[must_use]
  pub fn new(reader: R, config: &'c DecoderConfig) -> Self {
    Self {
      reader,
      config,
      decoder: RecordDecoder::new(config),
      buf: Vec::with_capacity(4096),
      held: Vec::new(),
      position: 0,
      termination: None,
      failed: false,
    }
  }

  /// Number of source bytes consumed by decoded records so far.
  #[must_use]
  pub fn position(&self) -> usize {
    self.position
  }

  #[must_use]
  pub fn termination(&self) -> Option<Termination> {
    self.termination
  }

  /// The rest of the source: the held-back tag of an unrecognized record
  /// (if the walk stopped on one) followed by whatever the reader has left.
  pub fn into_remainder(self) -> io::Chain<io::Cursor<Vec<u8>>, R> {
    io::Cursor::new(self.held).chain(self.reader)
  }

  /// Read the next record, or `Ok(None)` if the walk stopped cleanly.
  fn read_record(&mut self) -> Result<Option<Record>, DecodeError> {
    let offset = self.position;
    let mut header_buf = [0u8; RECORD_HEADER_SIZE];

    let n = read_up_to(&mut self.reader, &mut header_buf[..TAG_SIZE])?;
    self.position += n;
    if n == 0 {
      self.stop(Termination::EndOfSource { offset });
      return Ok(None);
    }
    if n < TAG_SIZE {
      return Err(DecodeError::ShortRead {
        offset,
        needed: TAG_SIZE,
        available: n,
      });
    }

    let tag = Tag::new([header_buf[0], header_buf[1], header_buf[2], header_buf[3]]);
    if !self.config.recognized.contains(tag) {
      self.held.extend_from_slice(&header_buf[..TAG_SIZE]);
      self.position = offset;
      self.stop(Termination::Unrecognized { tag, offset });
      return Ok(None);
    }

    let n = read_up_to(&mut self.reader, &mut header_buf[TAG_SIZE..])?;
    self.position += n;
    if n < RECORD_HEADER_SIZE - TAG_SIZE {
      return Err(DecodeError::ShortRead {
        offset: offset + TAG_SIZE,
        needed: RECORD_HEADER_SIZE - TAG_SIZE,
        available: n,
      });
    }

    let header = RecordHeader::from_bytes(&header_buf);
    self.check_limit(&header, offset)?;

    let len = usize::try_from(header.body_size).unwrap_or(usize::MAX);
    self.buf.clear();
    self.buf.resize(len, 0);
    let n = read_up_to(&mut self.reader, &mut self.buf)?;
    self.position += n;
    if n < len {
      return Err(DecodeError::ShortRead {
        offset: offset + RECORD_HEADER_SIZE,
        needed: len,
        available: n,
      });
    }

    self.decoder.decode_body(header, &self.buf, offset).map(Some)
  }

  /// The body is buffered, so its declared size is bounded before the
  /// buffer grows.
  fn check_limit(&self, header: &RecordHeader, offset: usize) -> Result<(), DecodeError> {
    if header.body_size > self.config.max_record_size {
      return Err(DecodeError::RecordTooLarge {
        tag: header.tag,
        offset,
        size: header.body_size,
        limit: self.config.max_record_size,
      });
    }
    Ok(())
  }

  fn stop(&mut self, termination: Termination) {
    tracing::debug!(?termination, "streaming walk stopped");
    self.termination = Some(termination);
  }
}

impl<R: Read> Iterator for StreamingWalker<'_, R> {
  type Item = Result<Record, DecodeError>;

  fn next(&mut self) -> Option<Self::Item> {
    if self.failed || self.termination.is_some() {
      return None;
    }
    match self.read_record() {
      Ok(Some(record)) => Some(Ok(record)),
      Ok(None) => None,
      Err(e) => {
        self.failed = true;
        Some(Err(e))
      }
    }
  }
}

/// Fill as much of `buf` as the reader can supply, stopping early only at
/// end of input. Returns the number of bytes read.
fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
  let mut filled = 0;
  while filled < buf.len() {
    match reader.read(&mut buf[filled..]) {
      Ok(0) => break,
      Ok(n) => filled += n,
      Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
      Err(e) => return Err(e),
    }
  }
  Ok(filled)
}

#[cfg(test)]
mod tests {
  use std::io::Cursor;

  use super::*;
  use crate::config::RecognizedTags;
  use crate::test_bytes::{glob, hedr_payload, record, record_with_size, subrecord};
  use crate::walker::walk;

  fn save() -> Vec<u8> {
    let mut bytes = record(b"TES3", &subrecord(b"HEDR", &hedr_payload(1.3, "Bethesda", "Save", 2)));
    bytes.extend(glob("GameHour", 13.5));
    bytes.extend(glob("Day", 4.0));
    bytes
  }

  /// Hands out at most `chunk` bytes per read.
  struct Trickle<'a> {
    data: &'a [u8],
    chunk: usize,
  }

  impl Read for Trickle<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
      let n = buf.len().min(self.chunk).min(self.data.len());
      buf[..n].copy_from_slice(&self.data[..n]);
      self.data = &self.data[n..];
      Ok(n)
    }
  }

  #[test]
  fn matches_in_memory_walk() {
    let bytes = save();
    let config = DecoderConfig::default();

    let mut walker = StreamingWalker::new(Cursor::new(&bytes), &config);
    let streamed: Vec<_> = walker.by_ref().collect::<Result<_, _>>().unwrap();
    let buffered = walk(&bytes, &config).unwrap();

    assert_eq!(streamed, buffered.records);
    assert_eq!(walker.termination(), Some(buffered.termination));
    assert_eq!(walker.position(), bytes.len());
  }

  #[test]
  fn handles_short_reads_from_the_reader() {
    let bytes = save();
    let config = DecoderConfig::default();
    let reader = Trickle {
      data: &bytes,
      chunk: 3,
    };

    let records: Vec<_> = StreamingWalker::new(reader, &config)
      .collect::<Result<_, _>>()
      .unwrap();
    assert_eq!(records.len(), 3);
  }

  #[test]
  fn unrecognized_record_is_left_unconsumed() {
    let mut bytes = save();
    let stop_at = bytes.len();
    bytes.extend(glob("Ignored", 0.0));
    bytes[stop_at..stop_at + 4].copy_from_slice(b"XXXX");

    let config = DecoderConfig::default().with_recognized(RecognizedTags::reference());
    let mut walker = StreamingWalker::new(Cursor::new(&bytes), &config);
    assert_eq!(walker.by_ref().filter(Result::is_ok).count(), 3);
    assert_eq!(
      walker.termination(),
      Some(Termination::Unrecognized {
        tag: Tag::new(*b"XXXX"),
        offset: stop_at,
      })
    );

    assert_eq!(walker.position(), stop_at);

    let mut rest = Vec::new();
    walker.into_remainder().read_to_end(&mut rest).unwrap();
    assert_eq!(rest, &bytes[stop_at..]);
  }

  #[test]
  fn truncated_body_is_short_read() {
    let bytes = glob("GameHour", 13.5);
    let config = DecoderConfig::default();
    let mut walker = StreamingWalker::new(Cursor::new(&bytes[..bytes.len() - 1]), &config);

    let err = walker.next().unwrap().unwrap_err();
    assert!(matches!(
      err,
      DecodeError::ShortRead { offset: 16, needed: 29, available: 28 }
    ));
    assert!(walker.next().is_none());
  }

  #[test]
  fn truncated_header_is_short_read() {
    let bytes = glob("Day", 1.0);
    let config = DecoderConfig::default();
    let mut walker = StreamingWalker::new(Cursor::new(&bytes[..10]), &config);

    let err = walker.next().unwrap().unwrap_err();
    assert!(matches!(
      err,
      DecodeError::ShortRead { offset: 4, needed: 12, available: 6 }
    ));
  }

  #[test]
  fn oversized_record_is_rejected_before_reading_body() {
    let bytes = record_with_size(b"GLOB", u32::MAX, &[]);
    let config = DecoderConfig::default();
    let mut walker = StreamingWalker::new(Cursor::new(&bytes), &config);

    let err = walker.next().unwrap().unwrap_err();
    assert!(matches!(err, DecodeError::RecordTooLarge { size: u32::MAX, .. }));
  }

  #[test]
  fn io_errors_are_surfaced() {
    struct Broken;
    impl Read for Broken {
      fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::other("disk on fire"))
      }
    }

    let config = DecoderConfig::default();
    let mut walker = StreamingWalker::new(Broken, &config);
    assert!(matches!(walker.next(), Some(Err(DecodeError::Io(_)))));
    assert!(walker.next().is_none());
  }
}
