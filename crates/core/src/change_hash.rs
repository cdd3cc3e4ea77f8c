//! Deterministic fingerprint of a point sequence.
//!
//! Used only to detect unsaved edits by comparing against the fingerprint taken at
//! save time. Not collision resistant against an adversary; never use for security.

use crate::TrackedPoint;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

struct Fnv1a(u64);

impl Fnv1a {
    const fn new() -> Self {
        Self(FNV_OFFSET_BASIS)
    }

    fn write(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.0 ^= u64::from(*byte);
            self.0 = self.0.wrapping_mul(FNV_PRIME);
        }
    }
}

/// Bit pattern of `value` with `-0.0` folded into `0.0` and every NaN made canonical,
/// so values that compare equal hash equal.
fn canonical_bits(value: f64) -> u64 {
    if value == 0.0 {
        0.0_f64.to_bits()
    } else if value.is_nan() {
        f64::NAN.to_bits()
    } else {
        value.to_bits()
    }
}

/// Fingerprint of `points`, rendered as 16 lowercase hex digits.
///
/// Structurally equal sequences (same coordinates, kinds and timestamps in the same
/// order) always produce the same string. The encoding is byte-level and independent
/// of locale or float formatting.
#[must_use]
pub fn hash_points(points: &[TrackedPoint]) -> String {
    let mut hasher = Fnv1a::new();
    hasher.write(&(points.len() as u64).to_le_bytes());
    for p in points {
        hasher.write(&canonical_bits(p.point.lat).to_le_bytes());
        hasher.write(&canonical_bits(p.point.lng).to_le_bytes());
        hasher.write(p.kind.as_str().as_bytes());
        hasher.write(&p.captured_at_millis.to_le_bytes());
    }
    format!("{:016x}", hasher.0)
}
