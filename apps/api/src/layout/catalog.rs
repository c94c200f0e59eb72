//! Card Catalog: the ordered set of cards a user has chosen to see.
//!
//! Catalog order is placement priority for the builder and display order for
//! the mobile list.

use std::collections::HashSet;

use crate::layout::dimensions::DimensionRegistry;
use crate::layout::types::CardKey;

/// Cards shown to a user who has never saved a visible-card selection.
pub const DEFAULT_CARDS: &[&str] = &[
    "jobCard",
    "productionSummaryInfo",
    "speedInfo",
    "wastageInfo",
    "machineStateInfo",
    "dieCounterInfo",
    "dieSpeedInfo",
    "paperConsumptionInfo",
    "ethylConsumptionInfo",
    "stopDurationInfo",
    "oeeGauge",
    "stoppageChart",
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    keys: Vec<CardKey>,
}

impl Catalog {
    /// Normalizes a raw visible-card list: keys the registry cannot size are
    /// dropped and duplicates keep their first position.
    pub fn from_visible<I, S>(visible: I, registry: &DimensionRegistry) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<CardKey>,
    {
        let mut seen = HashSet::new();
        let keys = visible
            .into_iter()
            .map(Into::into)
            .filter(|key: &CardKey| registry.contains(key))
            .filter(|key| seen.insert(key.clone()))
            .collect();
        Self { keys }
    }

    pub fn default_cards(registry: &DimensionRegistry) -> Self {
        Self::from_visible(DEFAULT_CARDS.iter().copied(), registry)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    pub fn keys(&self) -> &[CardKey] {
        &self.keys
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_keys_are_dropped() {
        let registry = DimensionRegistry::builtin();
        let catalog = Catalog::from_visible(["jobCard", "speedGraph", "oeeGauge"], &registry);
        assert_eq!(catalog.keys(), &["jobCard".to_string(), "oeeGauge".to_string()]);
    }

    #[test]
    fn test_duplicates_keep_first_position() {
        let registry = DimensionRegistry::builtin();
        let catalog =
            Catalog::from_visible(["speedInfo", "jobCard", "speedInfo"], &registry);
        assert_eq!(catalog.iter().collect::<Vec<_>>(), vec!["speedInfo", "jobCard"]);
    }

    #[test]
    fn test_default_cards_all_known() {
        let registry = DimensionRegistry::builtin();
        let catalog = Catalog::default_cards(&registry);
        assert_eq!(catalog.len(), DEFAULT_CARDS.len());
        assert!(catalog.contains("stoppageChart"));
    }
}
