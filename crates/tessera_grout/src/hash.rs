//! Source fingerprints using xxHash3.
//!
//! The director remembers the fingerprint of every file-backed template and
//! compares it against the file on disk to decide whether a cached
//! representation has gone stale.

use std::fmt;

use xxhash_rust::xxh3::xxh3_64;

/// A 64-bit content fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(u64);

impl Fingerprint {
    /// Fingerprint a template source.
    #[inline]
    pub fn of(text: &str) -> Self {
        Self(xxh3_64(text.as_bytes()))
    }

    /// Fingerprint raw bytes, e.g. a file that is not valid UTF-8.
    #[inline]
    pub fn of_bytes(data: &[u8]) -> Self {
        Self(xxh3_64(data))
    }

    #[inline]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}
