// Dashboard grid layout engine.
// Pure placement / reconciliation over a fixed-column grid. Nothing in this
// module performs I/O; callers own loading and persisting snapshots.

pub mod breakpoints;
pub mod builder;
pub mod catalog;
pub mod dimensions;
pub mod handlers;
pub mod mobile;
pub mod reconciler;
pub mod session;
pub mod snapshot;
pub mod types;

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{info, warn};

pub use breakpoints::{breakpoint_for_width, BREAKPOINTS, CANONICAL_COLUMNS};
pub use builder::LayoutBuilder;
pub use catalog::Catalog;
pub use dimensions::DimensionRegistry;
pub use mobile::{is_mobile, mobile_list, MobileList};
pub use snapshot::SnapshotRecord;
pub use types::{CardKey, ExcludedCard, Layout};

/// Where a canonical layout came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutOrigin {
    /// Laid out from scratch; no snapshot was available.
    Built,
    /// Snapshot positions kept, sizes healed from the registry.
    Reconciled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputedLayout {
    pub layout: Layout,
    pub origin: LayoutOrigin,
    /// Catalog cards that could not be placed at all.
    pub excluded: Vec<ExcludedCard>,
    /// Snapshot cards that had to leave their stored position.
    pub displaced: Vec<CardKey>,
}

/// Computes the layout for `catalog` at `columns`.
///
/// Without a snapshot the catalog is laid out fresh. With one, snapshot
/// positions are reconciled against the registry, cards that no longer fit
/// where they were are displaced, and displaced or newly added cards are
/// placed around the survivors. The result never overlaps, never exceeds
/// `columns`, and holds exactly the placeable catalog keys.
pub fn compute_layout(
    catalog: &Catalog,
    registry: &DimensionRegistry,
    snapshot: Option<&[SnapshotRecord]>,
    columns: u32,
) -> ComputedLayout {
    let builder = LayoutBuilder::new(registry, columns);

    let Some(snapshot) = snapshot else {
        let outcome = builder.build(catalog.iter());
        info!(
            cards = outcome.layout.len(),
            excluded = outcome.excluded.len(),
            columns,
            "built layout without snapshot"
        );
        return ComputedLayout {
            layout: outcome.layout,
            origin: LayoutOrigin::Built,
            excluded: outcome.excluded,
            displaced: Vec::new(),
        };
    };

    let reconciled = reconciler::reconcile(snapshot, registry, catalog);
    let (kept, displaced) = reconciler::settle(reconciled, columns);
    if !displaced.is_empty() {
        warn!(?displaced, "snapshot cards collided after size healing");
    }

    let missing: Vec<&str> = catalog.iter().filter(|k| !kept.contains(k)).collect();
    let outcome = builder.place_into(kept, missing);
    info!(
        cards = outcome.layout.len(),
        excluded = outcome.excluded.len(),
        displaced = displaced.len(),
        columns,
        "reconciled layout from snapshot"
    );

    ComputedLayout {
        layout: outcome.layout,
        origin: LayoutOrigin::Reconciled,
        excluded: outcome.excluded,
        displaced,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Dashboard view
// ────────────────────────────────────────────────────────────────────────────

/// Layout for a single breakpoint, in wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakpointView {
    pub columns: u32,
    pub layout: Vec<SnapshotRecord>,
    pub excluded: Vec<ExcludedCard>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridView {
    pub origin: LayoutOrigin,
    /// Breakpoint active for the requested viewport width.
    pub breakpoint: &'static str,
    pub row_height_px: u32,
    pub margin_px: u32,
    pub layouts: BTreeMap<&'static str, BreakpointView>,
    pub displaced: Vec<CardKey>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DashboardView {
    List(MobileList),
    Grid(GridView),
}

/// Everything the render surface needs for one viewport.
pub fn plan_dashboard(
    catalog: &Catalog,
    registry: &DimensionRegistry,
    snapshot: Option<&[SnapshotRecord]>,
    viewport_width: u32,
) -> DashboardView {
    if is_mobile(viewport_width) {
        return DashboardView::List(mobile_list(catalog));
    }

    let computed = compute_layout(catalog, registry, snapshot, CANONICAL_COLUMNS);
    let active = breakpoint_for_width(viewport_width);

    let layouts = breakpoints::project(&computed.layout, CANONICAL_COLUMNS, registry, &BREAKPOINTS)
        .into_iter()
        .map(|p| {
            let excluded = if p.columns == CANONICAL_COLUMNS {
                computed.excluded.clone()
            } else {
                p.excluded
            };
            (
                p.breakpoint,
                BreakpointView {
                    columns: p.columns,
                    layout: snapshot::to_records(&p.layout),
                    excluded,
                },
            )
        })
        .collect();

    DashboardView::Grid(GridView {
        origin: computed.origin,
        breakpoint: active.name,
        row_height_px: active.row_height_px,
        margin_px: active.margin_px,
        layouts,
        displaced: computed.displaced,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::types::{Dimensions, GridCell};
    use proptest::prelude::*;

    fn registry(entries: &[(&str, u32, u32)]) -> DimensionRegistry {
        let mut registry = DimensionRegistry::empty();
        for &(key, w, h) in entries {
            registry.insert(key, Dimensions::new(w, h));
        }
        registry
    }

    fn cell(computed: &ComputedLayout, key: &str) -> Option<GridCell> {
        computed.layout.get(key).map(|c| c.cell)
    }

    // ── compute_layout ──────────────────────────────────────────────────────

    #[test]
    fn test_no_snapshot_builds_fresh() {
        let registry = registry(&[("A", 1, 1), ("B", 1, 2)]);
        let catalog = Catalog::from_visible(["A", "B"], &registry);
        let computed = compute_layout(&catalog, &registry, None, 3);
        assert_eq!(computed.origin, LayoutOrigin::Built);
        assert_eq!(cell(&computed, "B"), Some(GridCell::new(1, 0)));
    }

    #[test]
    fn test_valid_snapshot_is_returned_unchanged() {
        let registry = registry(&[("A", 1, 1), ("B", 1, 2), ("C", 1, 1)]);
        let catalog = Catalog::from_visible(["A", "B", "C"], &registry);
        let saved = compute_layout(&catalog, &registry, None, 3).layout;
        // User moved A below C.
        let mut records = snapshot::to_records(&saved);
        records[0].x = 2;
        records[0].y = 1;

        let computed = compute_layout(&catalog, &registry, Some(&records), 3);
        assert_eq!(computed.origin, LayoutOrigin::Reconciled);
        assert!(computed.displaced.is_empty());
        assert_eq!(snapshot::to_records(&computed.layout), records);
    }

    #[test]
    fn test_grown_card_keeps_position() {
        // Saved when "job" was 1×1; the registry now says 1×3.
        let registry = registry(&[("job", 1, 3), ("below", 1, 1), ("side", 1, 1)]);
        let catalog = Catalog::from_visible(["job", "below", "side"], &registry);
        let records = vec![
            SnapshotRecord { i: "job".into(), x: 0, y: 0, w: Some(1), h: Some(1) },
            SnapshotRecord { i: "side".into(), x: 1, y: 0, w: Some(1), h: Some(1) },
            SnapshotRecord { i: "below".into(), x: 0, y: 1, w: Some(1), h: Some(1) },
        ];

        let computed = compute_layout(&catalog, &registry, Some(&records), 3);
        let job = computed.layout.get("job").unwrap();
        assert_eq!(job.cell, GridCell::new(0, 0));
        assert_eq!(job.dims.height, 3);
        assert_eq!(cell(&computed, "side"), Some(GridCell::new(1, 0)));
        assert_eq!(computed.displaced, vec!["below".to_string()]);
        assert!(computed.layout.contains("below"));
        assert!(computed.layout.validate(3).is_ok());
    }

    #[test]
    fn test_removed_key_is_dropped_and_added_key_is_placed() {
        let registry = registry(&[("A", 1, 1), ("B", 1, 1), ("C", 1, 1), ("D", 1, 2)]);
        let old_catalog = Catalog::from_visible(["A", "B", "C"], &registry);
        let records = snapshot::to_records(&compute_layout(&old_catalog, &registry, None, 3).layout);

        let new_catalog = Catalog::from_visible(["A", "C", "D"], &registry);
        let computed = compute_layout(&new_catalog, &registry, Some(&records), 3);

        assert!(!computed.layout.contains("B"));
        assert_eq!(cell(&computed, "A"), Some(GridCell::new(0, 0)));
        assert_eq!(cell(&computed, "C"), Some(GridCell::new(2, 0)));
        // B's old slot is the first free cell that fits D.
        assert_eq!(cell(&computed, "D"), Some(GridCell::new(1, 0)));
        assert!(computed.layout.validate(3).is_ok());
    }

    #[test]
    fn test_snapshot_cards_outside_catalog_are_ignored() {
        let registry = registry(&[("A", 1, 1)]);
        let catalog = Catalog::from_visible(["A"], &registry);
        let records = vec![
            SnapshotRecord { i: "gone".into(), x: 0, y: 0, w: None, h: None },
            SnapshotRecord { i: "A".into(), x: 0, y: 1, w: None, h: None },
        ];
        let computed = compute_layout(&catalog, &registry, Some(&records), 3);
        assert_eq!(computed.layout.keys().collect::<Vec<_>>(), vec!["A"]);
        assert_eq!(cell(&computed, "A"), Some(GridCell::new(0, 1)));
    }

    // ── plan_dashboard ──────────────────────────────────────────────────────

    #[test]
    fn test_narrow_viewport_gets_list() {
        let registry = DimensionRegistry::builtin();
        let catalog = Catalog::default_cards(&registry);
        match plan_dashboard(&catalog, &registry, None, 600) {
            DashboardView::List(list) => assert_eq!(list.cards, catalog.keys()),
            other => panic!("expected list view, got {other:?}"),
        }
    }

    #[test]
    fn test_wide_viewport_gets_every_breakpoint() {
        let registry = DimensionRegistry::builtin();
        let catalog = Catalog::default_cards(&registry);
        let DashboardView::Grid(grid) = plan_dashboard(&catalog, &registry, None, 1000) else {
            panic!("expected grid view");
        };
        assert_eq!(grid.breakpoint, "md");
        assert_eq!(grid.origin, LayoutOrigin::Built);
        assert_eq!(grid.row_height_px, 140);
        assert_eq!(grid.margin_px, 12);
        assert_eq!(grid.layouts.len(), BREAKPOINTS.len());
        for view in grid.layouts.values() {
            assert_eq!(view.layout.len(), catalog.len());
        }
        let xs = &grid.layouts["xs"];
        assert!(xs.layout.iter().all(|r| r.x == 0 && r.w == Some(1)));
    }

    #[test]
    fn test_grid_view_serializes_with_mode_tag() {
        let registry = DimensionRegistry::builtin();
        let catalog = Catalog::from_visible(["jobCard"], &registry);
        let json = serde_json::to_value(plan_dashboard(&catalog, &registry, None, 1400)).unwrap();
        assert_eq!(json["mode"], "grid");
        assert_eq!(json["breakpoint"], "lg");
        assert_eq!(json["layouts"]["lg"]["layout"][0]["i"], "jobCard");
        assert_eq!(json["layouts"]["lg"]["layout"][0]["h"], 3);
    }

    // ── properties ──────────────────────────────────────────────────────────

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        // Arbitrary, even colliding, snapshots with healed sizes still yield a
        // valid layout holding the whole catalog.
        #[test]
        fn prop_reconciled_layout_is_always_valid(
            count in 1_usize..16,
            sizes in prop::collection::vec((1_u32..=3, 1_u32..=6), 16),
            positions in prop::collection::vec((0_u32..4, 0_u32..10), 16),
            keep in prop::collection::vec(any::<bool>(), 16),
        ) {
            let keys: Vec<String> = (0..count).map(|i| format!("card{i}")).collect();
            let records: Vec<SnapshotRecord> = keys
                .iter()
                .zip(&positions)
                .zip(&keep)
                .filter(|(_, k)| **k)
                .map(|((key, &(x, y)), _)| SnapshotRecord { i: key.clone(), x, y, w: None, h: None })
                .collect();

            let mut healed = DimensionRegistry::empty();
            for (key, &(w, h)) in keys.iter().zip(&sizes) {
                healed.insert(key.clone(), Dimensions::new(w, h));
            }
            let catalog = Catalog::from_visible(keys.iter().cloned(), &healed);
            let computed = compute_layout(&catalog, &healed, Some(&records), CANONICAL_COLUMNS);

            prop_assert!(computed.layout.validate(CANONICAL_COLUMNS).is_ok());
            prop_assert!(computed.excluded.is_empty());
            prop_assert_eq!(computed.layout.len(), catalog.len());
            for card in &computed.layout {
                prop_assert_eq!(card.dims, healed.get(&card.key));
                prop_assert!(card.draggable);
            }
        }
    }
}
