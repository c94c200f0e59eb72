//! Layout Reconciler: merges a persisted snapshot with the live registry and
//! catalog.
//!
//! Positions come from the snapshot, sizes from the registry. Keys no longer in
//! the catalog are dropped. The reconciler itself performs no overlap checks;
//! [`settle`] is the separate step the pipeline uses to turn a reconciled
//! layout back into a valid one.

use std::collections::HashSet;

use tracing::debug;

use crate::layout::catalog::Catalog;
use crate::layout::dimensions::DimensionRegistry;
use crate::layout::snapshot::SnapshotRecord;
use crate::layout::types::{CardKey, GridCell, Layout, PlacedCard};

/// Applies registry sizes to snapshot positions for every catalog card the
/// snapshot knows about, keeping snapshot order. Every card is draggable.
pub fn reconcile(
    snapshot: &[SnapshotRecord],
    registry: &DimensionRegistry,
    catalog: &Catalog,
) -> Layout {
    snapshot
        .iter()
        .filter(|record| {
            let keep = catalog.contains(&record.i);
            if !keep {
                debug!(key = %record.i, "dropping snapshot card no longer in catalog");
            }
            keep
        })
        .map(|record| {
            PlacedCard::new(
                record.i.clone(),
                GridCell::new(record.x, record.y),
                registry.get(&record.i),
            )
        })
        .collect()
}

/// Splits a layout into the cards that can stay where they are at `columns`
/// and the keys that must be re-placed.
///
/// Cards are visited top-to-bottom, left-to-right; a card stays if it fits
/// inside the columns and does not intersect any card already kept. A card
/// that grew downward therefore keeps its slot and pushes out whatever it now
/// covers. Kept cards retain their original relative order.
pub fn settle(layout: Layout, columns: u32) -> (Layout, Vec<CardKey>) {
    let mut kept_keys: HashSet<&str> = HashSet::new();
    let mut kept_cards: Vec<&PlacedCard> = Vec::new();
    let mut displaced = Vec::new();

    for card in layout.in_reading_order() {
        let in_bounds = card.right() <= columns;
        if in_bounds && !kept_cards.iter().any(|k| k.overlaps(card)) {
            kept_cards.push(card);
            kept_keys.insert(card.key.as_str());
        } else {
            debug!(key = %card.key, x = card.cell.x, y = card.cell.y, "card displaced");
            displaced.push(card.key.clone());
        }
    }

    let kept: Layout = layout
        .iter()
        .filter(|c| kept_keys.contains(c.key.as_str()))
        .cloned()
        .collect();
    (kept, displaced)
}
