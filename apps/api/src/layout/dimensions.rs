//! Dimension Registry: the single source of truth for card footprints.
//!
//! Sizes stored in a persisted snapshot are never trusted; every stage of the
//! engine asks the registry instead. Unknown keys resolve to a 1×1 footprint.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::layout::types::{CardKey, Dimensions};

/// Built-in card footprints, `(key, width, height)`.
const BUILTIN_CARDS: &[(&str, u32, u32)] = &[
    ("jobCard", 1, 3),
    ("speedInfo", 1, 1),
    ("wastageInfo", 1, 1),
    ("machineStateInfo", 1, 1),
    ("dieCounterInfo", 1, 1),
    ("dieSpeedInfo", 1, 1),
    ("paperConsumptionInfo", 1, 1),
    ("ethylConsumptionInfo", 1, 1),
    ("energyConsumptionInfo", 1, 2),
    ("comprehensiveEnergyInfo", 1, 3),
    ("stopDurationInfo", 1, 1),
    ("actualProductionInfo", 1, 1),
    ("remainingWorkInfo", 1, 1),
    ("estimatedTimeInfo", 1, 1),
    ("robotPalletizingInfo", 1, 2),
    ("productionSummaryInfo", 1, 2),
    ("oeeGauge", 1, 3),
    ("oeeInfo", 1, 3),
    ("stoppageChart", 2, 3),
    ("dailySummary", 1, 6),
    ("weeklySummary", 1, 6),
    ("monthlySummary", 1, 6),
    ("quarterlySummary", 1, 6),
    ("yearlySummary", 1, 6),
];

/// Largest width or height, in grid units, an override entry may declare.
pub const MAX_CARD_SPAN: u32 = 64;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("registry JSON is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("card '{0}' must have a width and height of at least 1")]
    ZeroSized(CardKey),

    #[error("card '{key}' is {width}x{height}; neither side may exceed {}", MAX_CARD_SPAN)]
    TooLarge { key: CardKey, width: u32, height: u32 },
}

/// One entry of a registry override file. Accepts `width`/`height` or the
/// short `w`/`h` spelling used by persisted grid items.
#[derive(Debug, Deserialize)]
struct RegistryEntry {
    #[serde(alias = "w")]
    width: u32,
    #[serde(alias = "h")]
    height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionRegistry {
    entries: HashMap<CardKey, Dimensions>,
}

impl Default for DimensionRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl DimensionRegistry {
    /// An empty registry: every lookup falls back to 1×1.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// The registry shipped with the dashboard.
    pub fn builtin() -> Self {
        let entries = BUILTIN_CARDS
            .iter()
            .map(|&(key, w, h)| (key.to_string(), Dimensions::new(w, h)))
            .collect();
        Self { entries }
    }

    /// Parses a `{ "<key>": {"width": w, "height": h} }` document.
    pub fn from_json(raw: &str) -> Result<Self, RegistryError> {
        let parsed: HashMap<CardKey, RegistryEntry> = serde_json::from_str(raw)?;
        let mut entries = HashMap::with_capacity(parsed.len());
        for (key, entry) in parsed {
            if entry.width == 0 || entry.height == 0 {
                return Err(RegistryError::ZeroSized(key));
            }
            if entry.width > MAX_CARD_SPAN || entry.height > MAX_CARD_SPAN {
                return Err(RegistryError::TooLarge {
                    key,
                    width: entry.width,
                    height: entry.height,
                });
            }
            entries.insert(key, Dimensions::new(entry.width, entry.height));
        }
        Ok(Self { entries })
    }

    /// Loads an override file and merges it over the built-in table.
    pub fn builtin_with_overrides(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read card registry '{}'", path.display()))?;
        let overrides = Self::from_json(&raw)
            .with_context(|| format!("Invalid card registry '{}'", path.display()))?;
        if overrides.is_empty() {
            warn!(path = %path.display(), "card registry override file has no entries");
        }
        let mut registry = Self::builtin();
        registry.merge(overrides);
        Ok(registry)
    }

    /// Footprint for `key`; `{1, 1}` when the key is unknown. Never fails.
    pub fn get(&self, key: &str) -> Dimensions {
        self.entries.get(key).copied().unwrap_or(Dimensions::UNIT)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<CardKey>, dims: Dimensions) {
        self.entries.insert(key.into(), dims);
    }

    /// Entries from `other` replace entries with the same key.
    pub fn merge(&mut self, other: DimensionRegistry) {
        self.entries.extend(other.entries);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by key.
    pub fn entries(&self) -> Vec<(&str, Dimensions)> {
        let mut entries: Vec<(&str, Dimensions)> =
            self.entries.iter().map(|(k, d)| (k.as_str(), *d)).collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}
