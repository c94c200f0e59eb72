//! Core grid data model shared by every stage of the layout engine.
//!
//! Coordinates are zero-indexed grid units with the origin at the top-left.
//! A card anchored at `(x, y)` with dimensions `w × h` occupies the half-open
//! rectangle `[x, x + w) × [y, y + h)`.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque card identifier (`"jobCard"`, `"speedInfo"`, ...).
pub type CardKey = String;

// ────────────────────────────────────────────────────────────────────────────
// Geometry
// ────────────────────────────────────────────────────────────────────────────

/// Footprint of a card in grid units. Both sides are always ≥ 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    /// The footprint assumed for any card the registry does not know.
    pub const UNIT: Dimensions = Dimensions {
        width: 1,
        height: 1,
    };

    /// Builds a footprint, clamping zero sides up to 1.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCell {
    pub x: u32,
    pub y: u32,
}

impl GridCell {
    pub const ORIGIN: GridCell = GridCell { x: 0, y: 0 };

    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// A card with a concrete position on the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedCard {
    pub key: CardKey,
    pub cell: GridCell,
    pub dims: Dimensions,
    pub draggable: bool,
}

impl PlacedCard {
    /// Every placed card is draggable; the engine never position-locks a card.
    pub fn new(key: impl Into<CardKey>, cell: GridCell, dims: Dimensions) -> Self {
        Self {
            key: key.into(),
            cell,
            dims,
            draggable: true,
        }
    }

    /// Exclusive right edge (`x + w`).
    pub fn right(&self) -> u32 {
        self.cell.x.saturating_add(self.dims.width)
    }

    /// Exclusive bottom edge (`y + h`).
    pub fn bottom(&self) -> u32 {
        self.cell.y.saturating_add(self.dims.height)
    }

    pub fn overlaps(&self, other: &PlacedCard) -> bool {
        self.cell.x < other.right()
            && other.cell.x < self.right()
            && self.cell.y < other.bottom()
            && other.cell.y < self.bottom()
    }

    /// All grid cells covered by this card, row by row.
    pub fn cells(&self) -> impl Iterator<Item = GridCell> + '_ {
        (self.cell.y..self.bottom())
            .flat_map(move |y| (self.cell.x..self.right()).map(move |x| GridCell { x, y }))
    }

    /// Reading-order sort key: top to bottom, then left to right.
    pub fn reading_order(&self) -> (u32, u32) {
        (self.cell.y, self.cell.x)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Layout
// ────────────────────────────────────────────────────────────────────────────

/// Why a layout does not hold at a given column count.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutViolation {
    #[error("cards '{first}' and '{second}' overlap")]
    Overlap { first: CardKey, second: CardKey },

    #[error("card '{key}' ends at column {right} but the grid has {columns} columns")]
    OutOfBounds {
        key: CardKey,
        right: u32,
        columns: u32,
    },

    #[error("card '{0}' appears more than once")]
    DuplicateKey(CardKey),
}

/// Ordered collection of placed cards with unique keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Layout {
    cards: Vec<PlacedCard>,
}

impl Layout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a card. Returns `false` (and leaves the layout untouched) if
    /// a card with the same key is already present.
    pub fn push(&mut self, card: PlacedCard) -> bool {
        if self.contains(&card.key) {
            return false;
        }
        self.cards.push(card);
        true
    }

    pub fn contains(&self, key: &str) -> bool {
        self.cards.iter().any(|c| c.key == key)
    }

    pub fn get(&self, key: &str) -> Option<&PlacedCard> {
        self.cards.iter().find(|c| c.key == key)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PlacedCard> {
        self.cards.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.cards.iter().map(|c| c.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Lowest occupied row boundary (0 for an empty layout).
    pub fn bottom(&self) -> u32 {
        self.cards.iter().map(PlacedCard::bottom).max().unwrap_or(0)
    }

    /// Cards sorted top-to-bottom then left-to-right. Ties keep layout order.
    pub fn in_reading_order(&self) -> Vec<&PlacedCard> {
        let mut ordered: Vec<&PlacedCard> = self.cards.iter().collect();
        ordered.sort_by_key(|c| c.reading_order());
        ordered
    }

    /// Checks the no-overlap and in-bounds invariants at `columns`.
    pub fn validate(&self, columns: u32) -> Result<(), LayoutViolation> {
        let mut seen: HashSet<&str> = HashSet::with_capacity(self.cards.len());
        for (i, card) in self.cards.iter().enumerate() {
            if !seen.insert(card.key.as_str()) {
                return Err(LayoutViolation::DuplicateKey(card.key.clone()));
            }
            if card.right() > columns {
                return Err(LayoutViolation::OutOfBounds {
                    key: card.key.clone(),
                    right: card.right(),
                    columns,
                });
            }
            if let Some(other) = self.cards[..i].iter().find(|o| o.overlaps(card)) {
                return Err(LayoutViolation::Overlap {
                    first: other.key.clone(),
                    second: card.key.clone(),
                });
            }
        }
        Ok(())
    }
}

impl FromIterator<PlacedCard> for Layout {
    /// Collects cards, keeping the first occurrence of each key.
    fn from_iter<I: IntoIterator<Item = PlacedCard>>(iter: I) -> Self {
        let mut layout = Layout::new();
        for card in iter {
            layout.push(card);
        }
        layout
    }
}

impl<'a> IntoIterator for &'a Layout {
    type Item = &'a PlacedCard;
    type IntoIter = std::slice::Iter<'a, PlacedCard>;

    fn into_iter(self) -> Self::IntoIter {
        self.cards.iter()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Exclusions
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ExclusionReason {
    /// The card is wider than the grid and can never be placed.
    WiderThanGrid { columns: u32 },
    /// The scan cursor passed the derived row ceiling without finding room.
    RowCeilingReached { ceiling: u64 },
}

/// A catalog card that a placement pass left out of its layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedCard {
    pub key: CardKey,
    pub dims: Dimensions,
    #[serde(flatten)]
    pub reason: ExclusionReason,
}
