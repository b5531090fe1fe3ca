//! Deterministic accessor fingerprinting.

use crate::resolve::StructuralKey;
use sha2::{Digest, Sha256};
use std::fmt;

///
/// Fingerprint
///
/// Stable cache key for one accessor: digest of the declaring type path,
/// the method name, and the entity signature the accessor reads from.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Compute the fingerprint of `key` read off the entity named `signature`.
    #[must_use]
    pub fn of(key: &StructuralKey, signature: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"fieldfp:v1");

        write_tag(&mut hasher, 0x01);
        write_str(&mut hasher, key.declaring());

        write_tag(&mut hasher, 0x02);
        write_str(&mut hasher, key.method());

        write_tag(&mut hasher, 0x03);
        write_str(&mut hasher, signature);

        let digest = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);

        Self(out)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    #[must_use]
    pub fn as_hex(&self) -> String {
        let mut out = String::with_capacity(64);
        for byte in self.0 {
            use std::fmt::Write as _;
            let _ = write!(out, "{byte:02x}");
        }
        out
    }

    /// First eight hex digits, for log lines.
    #[must_use]
    pub fn short(&self) -> String {
        let mut hex = self.as_hex();
        hex.truncate(8);
        hex
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_hex())
    }
}

fn write_tag(hasher: &mut Sha256, tag: u8) {
    hasher.update([tag]);
}

// Length-prefixed so ("ab", "c") and ("a", "bc") never collide.
fn write_str(hasher: &mut Sha256, value: &str) {
    hasher.update((value.len() as u64).to_be_bytes());
    hasher.update(value.as_bytes());
}
