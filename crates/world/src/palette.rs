//! Content codes resolved once from an injected registry.

use thiserror::Error;
use voxgen_core::{ContentId, ContentKey, ContentLookup, Voxel};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaletteError {
    #[error("content registry has no entry named `{0}`")]
    Missing(&'static str),
}

/// Every [`ContentKey`] resolved to its registry code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    ids: [ContentId; ContentKey::COUNT],
}

impl Palette {
    /// Resolve all keys, failing on the first name the registry lacks.
    pub fn resolve(lookup: &dyn ContentLookup) -> Result<Self, PaletteError> {
        let mut ids = [0; ContentKey::COUNT];
        for key in ContentKey::ALL {
            ids[*key as usize] = lookup
                .content_id(key.name())
                .ok_or(PaletteError::Missing(key.name()))?;
        }
        Ok(Self { ids })
    }

    /// Palette matching [`voxgen_core::ContentTable::default_table`]: codes in key order.
    pub fn sequential() -> Self {
        let mut ids = [0; ContentKey::COUNT];
        for (index, key) in ContentKey::ALL.iter().enumerate() {
            ids[*key as usize] = index as ContentId;
        }
        Self { ids }
    }

    #[inline]
    pub fn id(&self, key: ContentKey) -> ContentId {
        self.ids[key as usize]
    }

    #[inline]
    pub fn voxel(&self, key: ContentKey) -> Voxel {
        Voxel::new(self.id(key))
    }

    #[inline]
    pub fn is(&self, content: ContentId, key: ContentKey) -> bool {
        content == self.id(key)
    }

    /// Reverse lookup, for diagnostics.
    pub fn key_of(&self, content: ContentId) -> Option<ContentKey> {
        ContentKey::ALL
            .iter()
            .copied()
            .find(|key| self.id(*key) == content)
    }

    /// Open cells: air or vacuum.
    #[inline]
    pub fn is_open(&self, content: ContentId) -> bool {
        self.is(content, ContentKey::Air) || self.is(content, ContentKey::Vacuum)
    }

    #[inline]
    pub fn is_liquid(&self, content: ContentId) -> bool {
        self.is(content, ContentKey::WaterSource) || self.is(content, ContentKey::LavaSource)
    }

    #[inline]
    pub fn is_base_rock(&self, content: ContentId) -> bool {
        self.is(content, ContentKey::Stone) || self.is(content, ContentKey::Limestone)
    }

    /// Mud and every grass-topped mud.
    pub fn is_mud_family(&self, content: ContentId) -> bool {
        [
            ContentKey::Mud,
            ContentKey::Grass,
            ContentKey::JungleGrass,
            ContentKey::DryGrass,
            ContentKey::SnowGrass,
        ]
        .iter()
        .any(|key| self.is(content, *key))
    }

    /// Soil or rock the surface painter may recolour.
    pub fn is_ground(&self, content: ContentId) -> bool {
        self.is_base_rock(content)
            || self.is_mud_family(content)
            || [
                ContentKey::Sand,
                ContentKey::DesertSand,
                ContentKey::Gravel,
                ContentKey::Clay,
            ]
            .iter()
            .any(|key| self.is(content, *key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxgen_core::ContentTable;

    #[test]
    fn resolves_default_table() {
        let palette = Palette::resolve(&ContentTable::default_table()).unwrap();
        assert_eq!(palette.id(ContentKey::Ignore), 0);
        assert_eq!(palette.id(ContentKey::Air), 1);
        assert_eq!(palette.key_of(palette.id(ContentKey::Cobble)), Some(ContentKey::Cobble));
        assert!(palette.is_mud_family(palette.id(ContentKey::SnowGrass)));
        assert!(!palette.is_mud_family(palette.id(ContentKey::Sand)));
        assert!(palette.is_ground(palette.id(ContentKey::Limestone)));
        assert!(!palette.is_ground(palette.id(ContentKey::WaterSource)));
    }

    #[test]
    fn sequential_matches_default_table() {
        let resolved = Palette::resolve(&ContentTable::default_table()).unwrap();
        assert_eq!(Palette::sequential(), resolved);
    }

    #[test]
    fn reports_missing_names() {
        let table = ContentTable::from_json(r#"{"ignore": 0, "air": 1}"#).unwrap();
        assert_eq!(
            Palette::resolve(&table).unwrap_err(),
            PaletteError::Missing("vacuum")
        );
    }
}
