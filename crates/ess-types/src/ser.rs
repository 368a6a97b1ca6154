// serde helpers for wire types that live in `ess-wire`, which stays
// serde-free. Tags serialize as text, raw bytes as lowercase hex.

use ess_wire::Tag;
use serde::Serializer;

pub(crate) fn tag<S: Serializer>(tag: &Tag, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&tag.to_text())
}

pub(crate) fn hex_bytes<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex::encode(bytes))
}
