//! Game-specific error types.
//!
//! Nothing in the core is fatal: every fallible path (config parsing, the
//! best-score file, catalog validation) returns one of these errors so the
//! caller can log it and fall back to a sane default instead of panicking.
//!
//! ## Usage
//!
//! ```rust
//! use duoduo_merge::error::{validate_positive, GameResult};
//!
//! fn check(interval: f32) -> GameResult<()> {
//!     validate_positive("SWEEP_INTERVAL_SECS", interval)?;
//!     Ok(())
//! }
//! assert!(check(1.0).is_ok());
//! assert!(check(0.0).is_err());
//! ```

use std::fmt;

/// Top-level error enum for the merge game.
#[derive(Debug)]
pub enum GameError {
    /// Reading or writing a persisted file failed.
    Storage {
        /// Path that was being accessed.
        path: String,
        /// Underlying I/O error message.
        reason: String,
    },

    /// A persisted file exists but its contents could not be decoded.
    MalformedStore {
        /// Path of the offending file.
        path: String,
        /// Decoder error message.
        reason: String,
    },

    /// The item catalog has no tiers at all.
    EmptyCatalog,

    /// A catalog entry's tier number does not match its position in the table.
    CatalogOrder {
        /// Position in the table.
        index: usize,
        /// Tier number stored in the entry.
        tier: u8,
    },

    /// A catalog entry has a non-positive radius or a hitbox ratio outside `(0, 1]`.
    InvalidTierGeometry {
        /// Tier of the offending entry.
        tier: u8,
        /// Physics radius stored in the entry.
        radius: f32,
        /// Hitbox ratio stored in the entry.
        hitbox_ratio: f32,
    },

    /// A catalog entry is smaller than the tier below it.
    ShrinkingTier {
        /// Tier of the offending entry.
        tier: u8,
        /// Physics radius stored in the entry.
        radius: f32,
        /// Physics radius of the previous tier.
        previous: f32,
    },

    /// Configuration value is outside its safe operating range.
    UnsafeConstant {
        /// Name of the constant (for logging).
        name: &'static str,
        /// The value that was rejected.
        value: f32,
        /// Human-readable description of the safe range.
        safe_range: &'static str,
    },
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::Storage { path, reason } => {
                write!(f, "storage access to '{}' failed: {}", path, reason)
            }
            GameError::MalformedStore { path, reason } => {
                write!(f, "'{}' is not a valid store file: {}", path, reason)
            }
            GameError::EmptyCatalog => write!(f, "item catalog has no tiers"),
            GameError::CatalogOrder { index, tier } => write!(
                f,
                "catalog entry {} declares tier {}; tiers must be listed in order from 0",
                index, tier
            ),
            GameError::InvalidTierGeometry {
                tier,
                radius,
                hitbox_ratio,
            } => write!(
                f,
                "tier {} has radius {} and hitbox ratio {} (need radius > 0, ratio in (0, 1])",
                tier, radius, hitbox_ratio
            ),
            GameError::ShrinkingTier {
                tier,
                radius,
                previous,
            } => write!(
                f,
                "tier {} has radius {}, smaller than the previous tier's {}",
                tier, radius, previous
            ),
            GameError::UnsafeConstant {
                name,
                value,
                safe_range,
            } => write!(
                f,
                "constant '{}' = {} is outside safe range {}",
                name, value, safe_range
            ),
        }
    }
}

impl std::error::Error for GameError {}

/// Convenience alias: a `Result` using `GameError` as the error type.
pub type GameResult<T> = Result<T, GameError>;

// ── Validation helpers ────────────────────────────────────────────────────────

/// Returns an error unless `value` is strictly positive.
pub fn validate_positive(name: &'static str, value: f32) -> GameResult<()> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(GameError::UnsafeConstant {
            name,
            value,
            safe_range: "(0.0, ∞)",
        })
    }
}

/// Returns an error if `value` is negative (zero is allowed).
pub fn validate_non_negative(name: &'static str, value: f32) -> GameResult<()> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(GameError::UnsafeConstant {
            name,
            value,
            safe_range: "[0.0, ∞)",
        })
    }
}

/// Returns an error if `value` is outside the closed unit interval.
pub fn validate_unit_interval(name: &'static str, value: f32) -> GameResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(GameError::UnsafeConstant {
            name,
            value,
            safe_range: "[0.0, 1.0]",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_rejects_zero_and_negative() {
        assert!(validate_positive("X", 0.0).is_err());
        assert!(validate_positive("X", -1.0).is_err());
        assert!(validate_positive("X", 0.01).is_ok());
    }

    #[test]
    fn non_negative_accepts_zero() {
        assert!(validate_non_negative("X", 0.0).is_ok());
        assert!(validate_non_negative("X", -0.1).is_err());
    }

    #[test]
    fn unit_interval_bounds_are_inclusive() {
        assert!(validate_unit_interval("X", 0.0).is_ok());
        assert!(validate_unit_interval("X", 1.0).is_ok());
        assert!(validate_unit_interval("X", 1.01).is_err());
    }

    #[test]
    fn display_names_the_constant() {
        let err = validate_positive("SWEEP_INTERVAL_SECS", 0.0).unwrap_err();
        assert!(err.to_string().contains("SWEEP_INTERVAL_SECS"));
    }
}
