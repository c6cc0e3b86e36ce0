use crate::synthetic::GeneratorPreset;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_SEED: u64 = 42;

// ── Dataset source ─────────────────────────────────────────────────────────

/// What to do when `source_path` is configured but the file does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingSource {
    /// Log a warning and generate the synthetic dataset instead.
    #[default]
    Synthetic,
    /// Report `DataUnavailable`.
    Fail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// CSV file to read. `None` selects synthetic mode outright.
    pub source_path:    Option<PathBuf>,
    pub missing_source: MissingSource,
    /// Master seed for the synthetic generator.
    pub seed:           u64,
    pub preset:         GeneratorPreset,
    /// Overrides the preset's row count when set.
    pub rows:           Option<usize>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            source_path:    None,
            missing_source: MissingSource::Synthetic,
            seed:           DEFAULT_SEED,
            preset:         GeneratorPreset::Full,
            rows:           None,
        }
    }
}

impl DatasetConfig {
    pub fn from_csv(path: impl Into<PathBuf>) -> Self {
        Self { source_path: Some(path.into()), ..Self::default() }
    }

    pub fn synthetic(preset: GeneratorPreset, seed: u64) -> Self {
        Self { preset, seed, ..Self::default() }
    }

    /// Row count the synthetic generator will produce.
    pub fn synthetic_rows(&self) -> usize {
        self.rows.unwrap_or_else(|| self.preset.spec().rows)
    }
}

// ── Top-level config ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub dataset: DatasetConfig,
}

impl DashboardConfig {
    /// Read a JSON config file. Missing keys take their defaults.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {}: {e}", path.display()))?;
        let config: DashboardConfig = serde_json::from_str(&content)?;
        log::debug!("loaded config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    /// Minimal config for tests: synthetic compact dataset, fixed seed.
    pub fn default_test() -> Self {
        Self {
            dataset: DatasetConfig::synthetic(GeneratorPreset::Compact, DEFAULT_SEED),
        }
    }
}
