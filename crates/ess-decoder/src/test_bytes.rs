// Byte builders shared by the unit tests in this crate.

pub(crate) fn subrecord(tag: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut buf = tag.to_vec();
    buf.extend_from_slice(&u32::try_from(payload.len()).unwrap().to_le_bytes());
    buf.extend_from_slice(payload);
    buf
}

/// A record whose declared body size is the exact length of `body`.
pub(crate) fn record(tag: &[u8; 4], body: &[u8]) -> Vec<u8> {
    record_with_size(tag, u32::try_from(body.len()).unwrap(), body)
}

pub(crate) fn record_with_size(tag: &[u8; 4], declared: u32, body: &[u8]) -> Vec<u8> {
    let mut buf = tag.to_vec();
    buf.extend_from_slice(&declared.to_le_bytes());
    buf.extend_from_slice(&[0; 4]);
    buf.extend_from_slice(&[0; 4]);
    buf.extend_from_slice(body);
    buf
}

pub(crate) fn hedr_payload(version: f32, company: &str, description: &str, count: u32) -> Vec<u8> {
    let mut buf = Vec::with_capacity(300);
    buf.extend_from_slice(&version.to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes());
    let mut company = company.as_bytes().to_vec();
    company.resize(32, 0);
    buf.extend_from_slice(&company);
    let mut description = description.as_bytes().to_vec();
    description.resize(256, 0);
    buf.extend_from_slice(&description);
    buf.extend_from_slice(&count.to_le_bytes());
    buf
}

/// `GLOB` record with a `NAME` and an `FLTV`.
pub(crate) fn glob(name: &str, value: f32) -> Vec<u8> {
    let mut body = subrecord(b"NAME", format!("{name}\0").as_bytes());
    body.extend(subrecord(b"FLTV", &value.to_le_bytes()));
    record(b"GLOB", &body)
}
