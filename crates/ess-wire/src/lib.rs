#![warn(clippy::pedantic)]

pub mod cursor;
pub mod error;
pub mod frame;
pub mod tag;

pub use cursor::ByteCursor;
pub use error::WireError;
pub use frame::{RecordHeader, SubrecordHeader};
pub use tag::Tag;
