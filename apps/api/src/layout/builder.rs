//! Layout Builder: deterministic first-fit placement on a fixed-column grid.
//!
//! # Algorithm
//! - A single scan cursor `(cx, cy)` starts at the origin and only ever moves
//!   forward (left to right, then down a row). It is shared by every card in
//!   the run and never rewinds after a placement.
//! - For each key in catalog order the registry footprint is tested at the
//!   cursor; the card is placed at the first cursor position where every
//!   covered cell is inside the grid and unoccupied.
//! - Catalog order is authoritative. Cards are never reordered, so a given
//!   `(catalog, registry, columns)` always yields the same layout.
//!
//! # Termination
//! Cards wider than the grid are excluded up front. For the rest, once the
//! cursor passes the lowest occupied row any card fits within one more row,
//! so `seed_bottom + Σ heights + 1` bounds the scan. Hitting that ceiling is
//! reported as an exclusion rather than looping.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::layout::dimensions::DimensionRegistry;
use crate::layout::types::{
    Dimensions, ExcludedCard, ExclusionReason, GridCell, Layout, PlacedCard,
};

// ────────────────────────────────────────────────────────────────────────────
// Occupancy
// ────────────────────────────────────────────────────────────────────────────

/// Cells filled during one builder run. Never outlives the run.
#[derive(Debug, Default)]
struct OccupancySet {
    cells: HashSet<GridCell>,
}

impl OccupancySet {
    fn seeded(layout: &Layout) -> Self {
        let mut occupancy = Self::default();
        for card in layout {
            occupancy.mark(card);
        }
        occupancy
    }

    /// Whether a `dims` rectangle anchored at `at` lies inside `columns` and
    /// touches no occupied cell.
    fn fits(&self, at: GridCell, dims: Dimensions, columns: u32) -> bool {
        let Some(right) = at.x.checked_add(dims.width) else {
            return false;
        };
        if right > columns {
            return false;
        }
        (0..dims.height).all(|dy| {
            (0..dims.width).all(|dx| !self.cells.contains(&GridCell::new(at.x + dx, at.y + dy)))
        })
    }

    fn mark(&mut self, card: &PlacedCard) {
        self.cells.extend(card.cells());
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Builder
// ────────────────────────────────────────────────────────────────────────────

/// Result of a placement pass: what was placed and what had to be left out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOutcome {
    pub layout: Layout,
    pub excluded: Vec<ExcludedCard>,
}

#[derive(Debug, Clone, Copy)]
pub struct LayoutBuilder<'a> {
    registry: &'a DimensionRegistry,
    columns: u32,
}

impl<'a> LayoutBuilder<'a> {
    pub fn new(registry: &'a DimensionRegistry, columns: u32) -> Self {
        Self { registry, columns }
    }

    /// Lays out `keys` on an empty grid.
    pub fn build<'k, I>(&self, keys: I) -> BuildOutcome
    where
        I: IntoIterator<Item = &'k str>,
    {
        self.place_into(Layout::new(), keys)
    }

    /// Places `keys` around the cards already in `seed`, which keep their
    /// positions. Keys already present in `seed` are skipped.
    pub fn place_into<'k, I>(&self, seed: Layout, keys: I) -> BuildOutcome
    where
        I: IntoIterator<Item = &'k str>,
    {
        let keys: Vec<&str> = keys.into_iter().collect();
        let mut occupancy = OccupancySet::seeded(&seed);
        let mut layout = seed;
        let mut excluded = Vec::new();

        let ceiling = self.row_ceiling(&layout, &keys);
        let (mut cx, mut cy) = (0_u32, 0_u32);

        for key in keys {
            if layout.contains(key) {
                debug!(key, "card already placed, skipping");
                continue;
            }

            let dims = self.registry.get(key);
            if dims.width > self.columns {
                warn!(
                    key,
                    width = dims.width,
                    columns = self.columns,
                    "card is wider than the grid, excluding it"
                );
                excluded.push(ExcludedCard {
                    key: key.to_string(),
                    dims,
                    reason: ExclusionReason::WiderThanGrid {
                        columns: self.columns,
                    },
                });
                continue;
            }

            loop {
                if u64::from(cy) > ceiling {
                    warn!(key, ceiling, "row ceiling reached, excluding card");
                    excluded.push(ExcludedCard {
                        key: key.to_string(),
                        dims,
                        reason: ExclusionReason::RowCeilingReached { ceiling },
                    });
                    break;
                }

                let at = GridCell::new(cx, cy);
                if occupancy.fits(at, dims, self.columns) {
                    let card = PlacedCard::new(key, at, dims);
                    occupancy.mark(&card);
                    debug!(key, x = at.x, y = at.y, w = dims.width, h = dims.height, "placed card");
                    layout.push(card);
                    break;
                }

                cx += 1;
                if cx >= self.columns {
                    cx = 0;
                    cy += 1;
                }
            }
        }

        BuildOutcome { layout, excluded }
    }

    fn row_ceiling(&self, seed: &Layout, keys: &[&str]) -> u64 {
        let pending: u64 = keys
            .iter()
            .map(|k| u64::from(self.registry.get(k).height))
            .sum();
        u64::from(seed.bottom()) + pending + 1
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
