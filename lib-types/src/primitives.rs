//! Canonical Primitive Types for the Referral Reward Engine
//!
//! Rule: No floats in money paths. Ever.
//!
//! These types are the foundational building blocks for every reward,
//! qualification and accumulation computation. They are designed to be:
//! - Fixed-size (no dynamic allocation)
//! - Deterministically serializable
//! - Efficient to copy and compare

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// TYPE ALIASES
// ============================================================================

/// Monetary or token amount in minor units
pub type Amount = u64;

/// Basis points for percentage calculations (10000 = 100%)
pub type Bps = u16;

/// Unix timestamp in seconds
pub type Timestamp = u64;

/// One hundred percent expressed in basis points
pub const BPS_FULL: Bps = 10_000;

// ============================================================================
// IDENTITY TYPES
// ============================================================================

/// Member identifier within the referral network
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct MemberId(pub u64);

impl MemberId {
    /// Create a new MemberId from its raw value
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the underlying value
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MemberId({})", self.0)
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "M{}", self.0)
    }
}

impl From<u64> for MemberId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl std::str::FromStr for MemberId {
    type Err = std::num::ParseIntError;

    /// Accepts both `42` and the display form `M42`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim().trim_start_matches(['M', 'm']);
        digits.parse::<u64>().map(MemberId)
    }
}

// ============================================================================
// RATIO HELPERS
// ============================================================================

/// Completion ratio `numerator / denominator` in basis points, capped at 100%
///
/// A zero denominator means there is nothing left to complete.
pub fn completion_bps(numerator: u64, denominator: u64) -> Bps {
    if denominator == 0 {
        return BPS_FULL;
    }
    let scaled = (numerator as u128) * (BPS_FULL as u128) / (denominator as u128);
    scaled.min(BPS_FULL as u128) as Bps
}

/// Convert basis points into a display percentage (e.g. 9857 -> 98.57)
pub fn bps_to_percentage(bps: Bps) -> f64 {
    bps as f64 / 100.0
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_id_basics() {
        let id = MemberId::new(42);
        assert_eq!(id.get(), 42);
        assert_eq!(format!("{}", id), "M42");
        assert_eq!(format!("{:?}", id), "MemberId(42)");
    }

    #[test]
    fn test_member_id_parse() {
        assert_eq!("42".parse::<MemberId>().unwrap(), MemberId(42));
        assert_eq!("M7".parse::<MemberId>().unwrap(), MemberId(7));
        assert!("abc".parse::<MemberId>().is_err());
    }

    #[test]
    fn test_member_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&MemberId(9)).unwrap();
        assert_eq!(json, "9");
        let back: MemberId = serde_json::from_str("9").unwrap();
        assert_eq!(back, MemberId(9));
    }

    #[test]
    fn test_completion_bps_caps_at_full() {
        assert_eq!(completion_bps(70, 70), BPS_FULL);
        assert_eq!(completion_bps(71, 70), BPS_FULL);
        assert_eq!(completion_bps(69, 70), 9857);
        assert_eq!(completion_bps(40, 50), 8_000);
        assert_eq!(completion_bps(0, 50), 0);
        assert_eq!(completion_bps(5, 0), BPS_FULL);
    }

    #[test]
    fn test_bps_to_percentage() {
        assert_eq!(bps_to_percentage(8_000), 80.0);
        assert_eq!(bps_to_percentage(BPS_FULL), 100.0);
    }
}
