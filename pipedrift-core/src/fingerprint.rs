//! Locality-sensitive fingerprints over step configuration.
//!
//! A raw equality check on step settings would miss near-duplicates that
//! differ only by incidental values (timestamps, branch names). A TLSH
//! digest with a distance threshold captures "almost the same
//! configuration" while tolerating small variation.

use std::collections::BTreeMap;
use std::fmt;
use std::fmt::Write;

use tlsh2::{TlshDefault, TlshDefaultBuilder};

/// A sealed locality-sensitive digest of one step's configuration.
///
/// Construction fails for steps with no configuration at all, for inputs
/// too short for TLSH to digest meaningfully, and for the degenerate
/// all-zero digest that provides no discriminating power.
pub struct Fingerprint {
    digest: TlshDefault,
}

impl Fingerprint {
    /// Build a fingerprint over the canonical forms of a step's settings,
    /// environment, and named-input maps, in that fixed order.
    pub fn from_config(
        settings: &BTreeMap<String, String>,
        env: &BTreeMap<String, String>,
        with: &BTreeMap<String, String>,
    ) -> Option<Self> {
        let mut builder = TlshDefaultBuilder::new();
        let mut found_config = false;

        for canonical in [map_to_string(settings), map_to_string(env), map_to_string(with)] {
            if !canonical.is_empty() {
                builder.update(canonical.as_bytes());
                found_config = true;
            }
        }

        if !found_config {
            return None;
        }

        let digest = builder.build()?;
        if is_degenerate(&digest) {
            return None;
        }

        Some(Self { digest })
    }

    /// TLSH distance to another fingerprint; 0 means identical digests.
    pub fn distance(&self, other: &Fingerprint) -> i32 {
        self.digest.diff(&other.digest, true)
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex = self.digest.hash();
        write!(f, "Fingerprint({})", String::from_utf8_lossy(&hex))
    }
}

/// Serialize a map as `key=value;` pairs in lexicographic key order, so the
/// fingerprint input is deterministic regardless of how the map was built.
pub(crate) fn map_to_string(map: &BTreeMap<String, String>) -> String {
    let mut out = String::new();
    for (key, value) in map {
        let _ = write!(out, "{key}={value};");
    }
    out
}

/// An all-zero digest body typically comes from very short input and would
/// compare as "similar" to every other degenerate digest.
fn is_degenerate(digest: &TlshDefault) -> bool {
    let hex = digest.hash();
    let body = hex.strip_prefix(b"T1").unwrap_or(&hex[..]);
    body.iter().all(|byte| *byte == b'0')
}
