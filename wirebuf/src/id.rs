//! UUID helpers.
//!
//! On the wire a UUID is its 16 raw bytes. The only accepted text form is the
//! canonical lowercase-or-uppercase `8-4-4-4-12` hyphenated hex layout.
use crate::error::{invalid_uuid, Result};
pub use uuid::Uuid;

const GROUPS: [usize; 5] = [8, 4, 4, 4, 12];

/// Parse the canonical hyphenated form.
///
/// Braced, URN and unhyphenated forms are rejected.
pub fn parse(text: &str) -> Result<Uuid> {
    let mut groups = text.split('-');
    for expected in GROUPS {
        match groups.next() {
            Some(group) if group.len() == expected && group.bytes().all(|b| b.is_ascii_hexdigit()) => {}
            _ => return Err(invalid_uuid(text)),
        }
    }
    if groups.next().is_some() {
        return Err(invalid_uuid(text));
    }
    Uuid::parse_str(text).map_err(|_| invalid_uuid(text))
}

/// A random version 4, variant 10 UUID.
pub fn random() -> Uuid {
    let mut bytes: [u8; 16] = rand::random();
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;
    Uuid::from_bytes(bytes)
}
