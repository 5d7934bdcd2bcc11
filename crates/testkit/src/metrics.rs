//! JSON metrics emitted by worldtests that sweep many chunks.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One worldtest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsReport {
    /// Worldtest name.
    pub test_name: String,
    /// RFC 3339 collection time.
    pub timestamp: String,
    /// World seed of the sweep.
    pub seed: u64,
    /// Outcome.
    pub result: TestResult,
    /// Generation throughput and biome spread.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terrain: Option<TerrainMetrics>,
    /// Placed feature totals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<FeatureMetrics>,
    /// Wall clock and assertion count.
    pub test_execution: TestExecutionMetrics,
}

/// Outcome of a worldtest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestResult {
    #[allow(missing_docs)]
    Pass,
    #[allow(missing_docs)]
    Fail,
}

/// Per-chunk generation timings and the biomes they resolved to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainMetrics {
    /// Chunks timed.
    pub chunks_generated: usize,
    /// Mean `make_block` time in microseconds.
    pub avg_gen_time_us: f64,
    /// Slowest `make_block` in microseconds.
    pub max_gen_time_us: u128,
    /// Throughput over the summed generation time.
    pub chunks_per_second: f64,
    /// Chunk count per biome name.
    pub biomes: BTreeMap<String, usize>,
    /// Ground-height continuity, when the sweep checked it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seam_validation: Option<SeamValidation>,
}

impl TerrainMetrics {
    /// Summarise per-chunk timings in microseconds.
    pub fn from_timings(times_us: &[u128], biomes: BTreeMap<String, usize>) -> Self {
        let chunks = times_us.len();
        let total: u128 = times_us.iter().sum();
        let avg = if chunks == 0 {
            0.0
        } else {
            total as f64 / chunks as f64
        };
        Self {
            chunks_generated: chunks,
            avg_gen_time_us: avg,
            max_gen_time_us: times_us.iter().copied().max().unwrap_or(0),
            chunks_per_second: chunks as f64 / (total.max(1) as f64 / 1e6),
            biomes,
            seam_validation: None,
        }
    }
}

/// Seams checked across a sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeamValidation {
    /// Chunk pairs compared.
    pub total_seams: usize,
    /// Pairs within the tolerated height jump.
    pub seams_valid: usize,
    /// Largest ground-height jump seen.
    pub max_seam_diff: i32,
}

impl SeamValidation {
    /// Every seam stayed within the tolerated jump.
    pub fn passed(&self) -> bool {
        self.seams_valid == self.total_seams
    }
}

/// Feature totals over a sweep.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureMetrics {
    /// Dungeon rooms carved.
    pub dungeon_rooms: u64,
    /// Trees grown.
    pub trees: u64,
    /// Boulders placed.
    pub boulders: u64,
    /// Ground-cover plants.
    pub ground_cover: u64,
    /// Liquid sources made by soil layering.
    pub liquid_sources: u64,
    /// Voxels tagged with a mineral.
    pub minerals: u64,
}

#[allow(missing_docs)]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestExecutionMetrics {
    pub duration_seconds: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assertions_checked: Option<usize>,
}

/// Assembles a [`MetricsReport`] stamped with the current time.
pub struct MetricsReportBuilder {
    report: MetricsReport,
}

impl MetricsReportBuilder {
    /// Start a passing report for `test_name`.
    pub fn new(test_name: impl Into<String>, seed: u64) -> Self {
        Self {
            report: MetricsReport {
                test_name: test_name.into(),
                timestamp: chrono::Utc::now().to_rfc3339(),
                seed,
                result: TestResult::Pass,
                terrain: None,
                features: None,
                test_execution: TestExecutionMetrics::default(),
            },
        }
    }

    #[allow(missing_docs)]
    pub fn result(mut self, result: TestResult) -> Self {
        self.report.result = result;
        self
    }

    #[allow(missing_docs)]
    pub fn terrain(mut self, metrics: TerrainMetrics) -> Self {
        self.report.terrain = Some(metrics);
        self
    }

    #[allow(missing_docs)]
    pub fn features(mut self, metrics: FeatureMetrics) -> Self {
        self.report.features = Some(metrics);
        self
    }

    #[allow(missing_docs)]
    pub fn execution(mut self, metrics: TestExecutionMetrics) -> Self {
        self.report.test_execution = metrics;
        self
    }

    /// Finish the report.
    pub fn build(self) -> MetricsReport {
        self.report
    }
}

/// Writes reports as pretty JSON to a fixed path.
pub struct MetricsSink {
    path: PathBuf,
}

impl MetricsSink {
    /// Prepare `path`, creating parent directories.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        Ok(Self { path })
    }

    /// Replace the file with `report`.
    pub fn write(&self, report: &MetricsReport) -> Result<()> {
        let json = serde_json::to_string_pretty(report).context("serializing metrics")?;
        fs::write(&self.path, json).with_context(|| format!("writing {}", self.path.display()))?;
        debug!(path = %self.path.display(), test = %report.test_name, "metrics written");
        Ok(())
    }
}
