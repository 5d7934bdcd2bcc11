//! Generator configuration.

use serde::{Deserialize, Serialize};
use voxgen_core::RealmKind;

/// World-level settings plus switches for the optional passes.
///
/// Disabling a pass changes the output; it exists for debugging and
/// profiling, not for gameplay variants.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub seed: u64,
    pub realm: RealmKind,
    /// Carve caves during the terrain fill.
    pub caves: bool,
    pub minerals: bool,
    pub dungeons: bool,
    /// Surface pass extras: boulders, trees and ground cover.
    pub decorations: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            realm: RealmKind::Standard,
            caves: true,
            minerals: true,
            dungeons: true,
            decorations: true,
        }
    }
}

impl GeneratorConfig {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }
}
