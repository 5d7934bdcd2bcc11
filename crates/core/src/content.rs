//! Content codes and the names the generator understands.
//!
//! Content codes are opaque integers owned by an external block registry.
//! The generator only ever asks that registry for the small fixed set of
//! names listed in [`ContentKey`], through the [`ContentLookup`] capability.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Opaque content identifier drawn from the external registry.
pub type ContentId = u16;

/// One grid cell: content code plus two auxiliary bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Voxel {
    /// Material identifier.
    pub content: ContentId,
    /// First auxiliary byte (mineral tag on rock, unused otherwise).
    pub param1: u8,
    /// Second auxiliary byte.
    pub param2: u8,
}

impl Voxel {
    /// Voxel with the given content and zeroed auxiliary bytes.
    #[inline]
    pub const fn new(content: ContentId) -> Self {
        Self {
            content,
            param1: 0,
            param2: 0,
        }
    }

    /// Voxel with a first auxiliary byte.
    #[inline]
    pub const fn with_param1(content: ContentId, param1: u8) -> Self {
        Self {
            content,
            param1,
            param2: 0,
        }
    }
}

macro_rules! content_keys {
    ($($(#[$doc:meta])* $variant:ident => $name:literal,)*) => {
        /// Named contents the generator resolves from the registry.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum ContentKey {
            $($(#[$doc])* $variant,)*
        }

        impl ContentKey {
            /// Every key, in declaration order.
            pub const ALL: &'static [ContentKey] = &[$(ContentKey::$variant,)*];

            /// Number of keys.
            pub const COUNT: usize = Self::ALL.len();

            /// Registry name of this content.
            pub const fn name(self) -> &'static str {
                match self {
                    $(ContentKey::$variant => $name,)*
                }
            }
        }
    };
}

content_keys! {
    /// Not generated yet.
    Ignore => "ignore",
    /// Open air.
    Air => "air",
    /// Airless space above the altitude ceiling.
    Vacuum => "vacuum",
    /// Water source.
    WaterSource => "water_source",
    /// Lava source.
    LavaSource => "lava_source",
    /// Base rock.
    Stone => "stone",
    /// Base rock of wet chunks.
    Limestone => "limestone",
    /// Mud (bare soil).
    Mud => "mud",
    /// Mud with grass.
    Grass => "grass",
    /// Mud with jungle grass.
    JungleGrass => "jungle_grass",
    /// Mud with dry grass.
    DryGrass => "dry_grass",
    /// Snow-covered mud.
    SnowGrass => "snow_grass",
    /// Sand.
    Sand => "sand",
    /// Desert sand.
    DesertSand => "desert_sand",
    /// Gravel.
    Gravel => "gravel",
    /// Clay.
    Clay => "clay",
    /// Ice.
    Ice => "ice",
    /// Dungeon wall.
    Cobble => "cobble",
    /// Weathered dungeon wall.
    MossyCobble => "mossy_cobble",
    /// Dungeon chest.
    Chest => "chest",
    /// Oak/beech/apple trunk.
    Trunk => "trunk",
    /// Oak/beech leaves.
    Leaves => "leaves",
    /// Apple tree leaves.
    AppleLeaves => "apple_leaves",
    /// Conifer trunk.
    ConiferTrunk => "conifer_trunk",
    /// Conifer needles.
    ConiferLeaves => "conifer_leaves",
    /// Jungle trunk.
    JungleTrunk => "jungle_trunk",
    /// Jungle leaves.
    JungleLeaves => "jungle_leaves",
    /// Birch trunk.
    BirchTrunk => "birch_trunk",
    /// Birch leaves.
    BirchLeaves => "birch_leaves",
    /// Dead tree stump.
    Stump => "stump",
    /// Papyrus stalk.
    Papyrus => "papyrus",
    /// Cactus.
    Cactus => "cactus",
    /// Bush.
    Bush => "bush",
    /// Tall grass tuft.
    TallGrass => "tall_grass",
    /// Fern.
    Fern => "fern",
    /// Wild flowers.
    Flower => "flower",
    /// Wild wheat crop.
    WildWheat => "wild_wheat",
    /// Wild cotton crop.
    WildCotton => "wild_cotton",
    /// Wild melon crop.
    WildMelon => "wild_melon",
    /// Dead bush.
    DeadBush => "dead_bush",
    /// Reeds at lake shores.
    Reeds => "reeds",
    /// Seaweed on the ocean floor.
    Seaweed => "seaweed",
    /// Space debris rock.
    SpaceRock => "space_rock",
}

/// Read-only capability resolving registry names to content codes.
pub trait ContentLookup {
    /// Resolve a registry name, or `None` if the registry has no such content.
    fn content_id(&self, name: &str) -> Option<ContentId>;
}

/// Errors raised while building a [`ContentTable`].
#[derive(Debug, Error)]
pub enum ContentTableError {
    /// The JSON document could not be parsed.
    #[error("failed to parse content table: {0}")]
    Parse(#[from] serde_json::Error),
    /// Two names map to the same code.
    #[error("content id {id} assigned to both `{first}` and `{second}`")]
    DuplicateId {
        /// Conflicting code.
        id: ContentId,
        /// Name seen first.
        first: String,
        /// Name seen second.
        second: String,
    },
}

/// Simple name-to-code table implementing [`ContentLookup`].
#[derive(Debug, Clone, Default)]
pub struct ContentTable {
    ids: HashMap<String, ContentId>,
}

impl ContentTable {
    /// Table assigning sequential codes to every [`ContentKey`] in order.
    pub fn default_table() -> Self {
        let ids = ContentKey::ALL
            .iter()
            .enumerate()
            .map(|(index, key)| (key.name().to_string(), index as ContentId))
            .collect();
        Self { ids }
    }

    /// Parse a `{ "name": id, ... }` JSON object.
    pub fn from_json(input: &str) -> Result<Self, ContentTableError> {
        let parsed: BTreeMap<String, ContentId> = serde_json::from_str(input)?;
        let mut seen: HashMap<ContentId, String> = HashMap::new();
        for (name, id) in &parsed {
            if let Some(first) = seen.insert(*id, name.clone()) {
                return Err(ContentTableError::DuplicateId {
                    id: *id,
                    first,
                    second: name.clone(),
                });
            }
        }
        Ok(Self {
            ids: parsed.into_iter().collect(),
        })
    }

    /// Number of names in the table.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl ContentLookup for ContentTable {
    fn content_id(&self, name: &str) -> Option<ContentId> {
        self.ids.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_names_are_unique() {
        let mut names: Vec<_> = ContentKey::ALL.iter().map(|k| k.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ContentKey::COUNT);
    }

    #[test]
    fn default_table_covers_every_key() {
        let table = ContentTable::default_table();
        assert_eq!(table.len(), ContentKey::COUNT);
        for (index, key) in ContentKey::ALL.iter().enumerate() {
            assert_eq!(table.content_id(key.name()), Some(index as ContentId));
        }
        assert_eq!(table.content_id("diamond_block"), None);
    }

    #[test]
    fn json_table_rejects_duplicate_ids() {
        let err = ContentTable::from_json(r#"{"air": 0, "stone": 0}"#).unwrap_err();
        assert!(matches!(err, ContentTableError::DuplicateId { id: 0, .. }));
    }

    #[test]
    fn json_table_parses_names() {
        let table = ContentTable::from_json(r#"{"air": 126, "ignore": 127}"#).unwrap();
        assert_eq!(table.content_id("air"), Some(126));
        assert_eq!(table.content_id("ignore"), Some(127));
        assert!(ContentTable::from_json("[1, 2]").is_err());
    }

    #[test]
    fn voxel_constructors() {
        assert_eq!(Voxel::new(5).param1, 0);
        assert_eq!(Voxel::with_param1(5, 3).param1, 3);
    }
}
