//! Realm identifiers.
//!
//! The realm flag is supplied by the caller alongside the seed and selects
//! the top-level generation strategy. Altitude realms (space, sky, deep
//! abyss) are not flags: they fall out of biome classification.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stable identifier for the world's generation realm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum RealmKind {
    /// Noise-driven terrain with biomes, caves, dungeons and decoration.
    Standard = 0,
    /// Constant two-layer floor, no noise at all.
    Flat = 1,
}

impl RealmKind {
    /// Default (standard) realm.
    pub const DEFAULT: Self = Self::Standard;

    /// Convert to a stable numeric representation.
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Try to convert from the stable numeric representation.
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Standard),
            1 => Some(Self::Flat),
            _ => None,
        }
    }

    /// Canonical string key used in configs/logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Flat => "flat",
        }
    }
}

impl Default for RealmKind {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for RealmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown realm name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown realm `{0}` (expected `standard` or `flat`)")]
pub struct UnknownRealm(pub String);

impl FromStr for RealmKind {
    type Err = UnknownRealm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "flat" => Ok(Self::Flat),
            other => Err(UnknownRealm(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn realm_kind_is_stable() {
        assert_eq!(RealmKind::Standard.as_u8(), 0);
        assert_eq!(RealmKind::Flat.as_u8(), 1);
        assert_eq!(RealmKind::from_u8(0), Some(RealmKind::Standard));
        assert_eq!(RealmKind::from_u8(1), Some(RealmKind::Flat));
        assert_eq!(RealmKind::from_u8(2), None);
    }

    #[test]
    fn realm_kind_parses_names() {
        assert_eq!("flat".parse::<RealmKind>(), Ok(RealmKind::Flat));
        assert_eq!(" Standard ".parse::<RealmKind>(), Ok(RealmKind::Standard));
        assert!("nether".parse::<RealmKind>().is_err());
    }
}
