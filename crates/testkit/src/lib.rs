#![warn(missing_docs)]
//! Deterministic testing surfaces: grid digests, content histograms and
//! JSON artifacts for worldtests.

mod metrics;

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use voxgen_core::{ContentId, Voxel};

pub use metrics::*;

/// Stable hex digest of a voxel slice (content and both param bytes).
pub fn grid_digest(voxels: &[Voxel]) -> String {
    let mut hasher = blake3::Hasher::new();
    for voxel in voxels {
        hasher.update(&voxel.content.to_le_bytes());
        hasher.update(&[voxel.param1, voxel.param2]);
    }
    hasher.finalize().to_hex().to_string()
}

/// Voxel counts per content code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContentHistogram {
    counts: BTreeMap<ContentId, usize>,
}

impl ContentHistogram {
    /// Count every voxel of the slice.
    pub fn from_voxels<'a>(voxels: impl IntoIterator<Item = &'a Voxel>) -> Self {
        let mut counts = BTreeMap::new();
        for voxel in voxels {
            *counts.entry(voxel.content).or_insert(0) += 1;
        }
        Self { counts }
    }

    /// How many voxels hold `content`.
    pub fn count(&self, content: ContentId) -> usize {
        self.counts.get(&content).copied().unwrap_or(0)
    }

    /// Number of distinct content codes.
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    /// Total voxels counted.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Codes in ascending order with their counts.
    pub fn iter(&self) -> impl Iterator<Item = (ContentId, usize)> + '_ {
        self.counts.iter().map(|(id, n)| (*id, *n))
    }
}

/// Digest snapshot for one generated chunk.
#[derive(Debug, Clone, Serialize)]
pub struct ChunkDigest {
    /// Chunk coordinates [x, y, z].
    pub chunk: [i32; 3],
    /// Resolved biome name.
    pub biome: String,
    /// [`grid_digest`] of the halo-extended grid.
    pub digest: String,
}

/// Writes chunk digests to JSON for CI artifacts.
pub struct DigestSink {
    file: File,
}

impl DigestSink {
    /// Create a sink pointed at the supplied path, creating parent dirs if needed.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        Ok(Self { file })
    }

    /// Persist the provided digests as pretty JSON.
    pub fn write(&mut self, digests: &[ChunkDigest]) -> Result<()> {
        let json = serde_json::to_string_pretty(digests)?;
        self.file.write_all(json.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn digest_tracks_params() {
        let plain = vec![Voxel::new(3); 8];
        let mut tagged = plain.clone();
        tagged[5].param1 = 2;
        assert_eq!(grid_digest(&plain), grid_digest(&plain.clone()));
        assert_ne!(grid_digest(&plain), grid_digest(&tagged));
        assert_eq!(grid_digest(&plain).len(), 64);
    }

    #[test]
    fn histogram_counts_contents() {
        let voxels = [Voxel::new(1), Voxel::new(2), Voxel::new(1), Voxel::with_param1(1, 4)];
        let histogram = ContentHistogram::from_voxels(&voxels);
        assert_eq!(histogram.count(1), 3);
        assert_eq!(histogram.count(2), 1);
        assert_eq!(histogram.count(9), 0);
        assert_eq!(histogram.distinct(), 2);
        assert_eq!(histogram.total(), 4);
    }

    #[test]
    fn digest_sink_writes_file() {
        let path = std::env::temp_dir().join(format!(
            "chunk-digests-{}.json",
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        let digests = vec![ChunkDigest {
            chunk: [0, 0, 0],
            biome: "forest".into(),
            digest: "deadbeef".into(),
        }];
        let mut sink = DigestSink::create(&path).expect("sink create");
        sink.write(&digests).expect("write succeeds");
        let contents = fs::read_to_string(&path).expect("file readable");
        assert!(contents.contains("deadbeef"));
        assert!(contents.contains("forest"));
        fs::remove_file(&path).ok();
    }
}
