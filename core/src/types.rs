//! Shared primitive types used across the crate.

/// Stable identifier of a player profile.
pub type PlayerId = String;

/// Stable identifier of a badge in the static catalog.
pub type BadgeId = String;

/// Stable identifier of a league tier ("bronze", "silver", ...).
pub type LeagueId = String;

/// An amount of iii tokens. Also used for experience and league scores,
/// which are denominated in the same unit.
pub type Tokens = i64;
