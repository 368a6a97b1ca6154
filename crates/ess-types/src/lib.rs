#![warn(clippy::pedantic)]

pub mod error;
pub mod file_header;
pub mod layout;
pub mod record;
pub mod subrecord;
pub mod subrecord_kind;

mod ser;

pub use error::TypeError;
pub use file_header::FileHeader;
pub use layout::{LayoutRegistry, PayloadLayout};
pub use record::Record;
pub use subrecord::{FloatValue, Subrecord, SubrecordPayload};
pub use subrecord_kind::{SubrecordKind, tags};
