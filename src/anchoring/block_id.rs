//! Content-derived block identifiers
//!
//! Structural blocks (code, table, math) have no persistent identity across
//! render passes, so they are re-identified by content: same kind + same raw
//! text yields the same id on every pass, any textual change yields (with
//! high probability) a different one.
//!
//! The hash is 32-bit FNV-1a. Collisions are an accepted risk: a collision
//! makes a block annotation point at an unrelated same-kind block, and the
//! inline fallback search still operates within it, which limits the impact.

use crate::models::NodeKind;

const FNV_OFFSET: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// Derive the stable id for a structural block
///
/// Pure function of `(kind, raw_text)`; no error states.
pub fn identify(kind: NodeKind, raw_text: &str) -> String {
    format!("{}-{}", kind.label(), to_base36(fnv1a(raw_text.as_bytes())))
}

fn fnv1a(bytes: &[u8]) -> u32 {
    let mut hash = FNV_OFFSET;
    for &b in bytes {
        hash ^= b as u32;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

fn to_base36(mut value: u32) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    // base-36 digits are ASCII
    String::from_utf8(out).unwrap_or_default()
}
