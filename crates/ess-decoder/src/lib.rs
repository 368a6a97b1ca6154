#![warn(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod record;
pub mod streaming;
pub mod subrecord;
pub mod walker;

#[cfg(test)]
mod test_bytes;

pub use config::{DecoderConfig, RecognizedTags, Strictness};
pub use error::{DecodeError, SizeScope};
pub use record::RecordDecoder;
pub use streaming::StreamingWalker;
pub use subrecord::SubrecordDecoder;
pub use walker::{PartialDecode, Stream, StreamWalker, Termination, walk};
