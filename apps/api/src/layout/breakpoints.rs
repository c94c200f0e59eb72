//! Breakpoint table and projector.
//!
//! The canonical layout is computed for the widest breakpoint. Every other
//! breakpoint is derived from it:
//! - same column count: positions pass through, sizes refreshed
//! - one column: vertical stack in canonical reading order
//! - any other column count: the builder is re-run in canonical reading order,
//!   since canonical positions are not guaranteed to fit fewer columns

use serde::Serialize;

use crate::layout::builder::LayoutBuilder;
use crate::layout::dimensions::DimensionRegistry;
use crate::layout::types::{Dimensions, ExcludedCard, GridCell, Layout, PlacedCard};

/// Height of one grid row, in pixels.
pub const ROW_HEIGHT_PX: u32 = 140;
/// Gap between grid cells, in pixels.
pub const MARGIN_PX: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BreakpointSpec {
    pub name: &'static str,
    pub columns: u32,
    /// Smallest viewport width (px) at which this breakpoint is active.
    pub min_width_px: u32,
    pub row_height_px: u32,
    pub margin_px: u32,
}

impl BreakpointSpec {
    const fn new(name: &'static str, columns: u32, min_width_px: u32) -> Self {
        Self {
            name,
            columns,
            min_width_px,
            row_height_px: ROW_HEIGHT_PX,
            margin_px: MARGIN_PX,
        }
    }

    /// Pixel height of a card spanning `rows` rows, gaps included.
    pub fn card_height_px(&self, rows: u32) -> u32 {
        let rows = rows.max(1);
        rows.saturating_mul(self.row_height_px)
            .saturating_add((rows - 1).saturating_mul(self.margin_px))
    }
}

/// Widest first.
pub static BREAKPOINTS: [BreakpointSpec; 5] = [
    BreakpointSpec::new("lg", 3, 1200),
    BreakpointSpec::new("md", 2, 996),
    BreakpointSpec::new("sm", 1, 768),
    BreakpointSpec::new("xs", 1, 480),
    BreakpointSpec::new("xxs", 1, 0),
];

/// Column count of the canonical (widest) layout, `lg`.
pub const CANONICAL_COLUMNS: u32 = 3;

/// The widest breakpoint whose minimum width fits `viewport_width`.
pub fn breakpoint_for_width(viewport_width: u32) -> &'static BreakpointSpec {
    BREAKPOINTS
        .iter()
        .find(|bp| viewport_width >= bp.min_width_px)
        .unwrap_or(&BREAKPOINTS[BREAKPOINTS.len() - 1])
}

/// One breakpoint's derived layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    pub breakpoint: &'static str,
    pub columns: u32,
    pub layout: Layout,
    pub excluded: Vec<ExcludedCard>,
}

/// Derives one layout per entry of `specs` from `canonical`.
pub fn project(
    canonical: &Layout,
    canonical_columns: u32,
    registry: &DimensionRegistry,
    specs: &[BreakpointSpec],
) -> Vec<Projection> {
    specs
        .iter()
        .map(|spec| {
            let (layout, excluded) = if spec.columns == canonical_columns {
                (refresh_sizes(canonical, registry), Vec::new())
            } else if spec.columns == 1 {
                (stack_single_column(canonical, registry), Vec::new())
            } else {
                let order = canonical.in_reading_order();
                let outcome = LayoutBuilder::new(registry, spec.columns)
                    .build(order.iter().map(|c| c.key.as_str()));
                (outcome.layout, outcome.excluded)
            };
            Projection {
                breakpoint: spec.name,
                columns: spec.columns,
                layout,
                excluded,
            }
        })
        .collect()
}

fn refresh_sizes(canonical: &Layout, registry: &DimensionRegistry) -> Layout {
    canonical
        .iter()
        .map(|card| PlacedCard::new(card.key.clone(), card.cell, registry.get(&card.key)))
        .collect()
}

/// Every card at `x = 0`, `w = 1`, stacked in canonical reading order.
fn stack_single_column(canonical: &Layout, registry: &DimensionRegistry) -> Layout {
    let mut y = 0_u32;
    canonical
        .in_reading_order()
        .into_iter()
        .map(|card| {
            let height = registry.get(&card.key).height;
            let placed = PlacedCard::new(
                card.key.clone(),
                GridCell::new(0, y),
                Dimensions::new(1, height),
            );
            y = y.saturating_add(height);
            placed
        })
        .collect()
}
