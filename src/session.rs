//! Daily session fingerprints
//!
//! Visitors are identified by a hash of (network address, UTC date) instead
//! of a cookie. The same address maps to the same fingerprint all day and to
//! a new one after midnight UTC, so unique-visitor counts are per-day and
//! the address cannot be recovered from stored data.

use chrono::Utc;
use sha2::{Digest, Sha256};

/// Placeholder address when the transport gives us nothing usable
pub const UNKNOWN_ADDR: &str = "unknown";

/// Derive the fingerprint for an address on a given `YYYY-MM-DD` date.
/// SHA-256 over `"{addr}:{date}"`, truncated to 16 hex characters (64 bits).
pub fn fingerprint(addr: &str, date: &str) -> String {
    let digest = Sha256::digest(format!("{addr}:{date}"));
    hex::encode(digest)[..16].to_string()
}

/// Fingerprint for an address today (UTC)
pub fn fingerprint_today(addr: &str) -> String {
    fingerprint(addr, &Utc::now().format("%Y-%m-%d").to_string())
}
