//! Persisted snapshot records: the `{i, x, y, w, h}` grid-item shape stored by
//! the preference gateway and emitted by the render surface.
//!
//! Structural validation lives here. A snapshot that fails it must be treated
//! as absent by callers; partial reconciliation of a broken snapshot is never
//! attempted.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::layout::types::{Layout, PlacedCard};

/// Largest accepted `x`/`y` in a stored snapshot.
pub const MAX_COORDINATE: u32 = 4096;

/// One persisted grid item. `w`/`h` are informational only: sizes are always
/// re-read from the registry. Extra fields (`static`, `isDraggable`, ...) are
/// ignored on input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub i: String,
    pub x: u32,
    pub y: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h: Option<u32>,
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot is not a JSON array of grid items: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("snapshot item #{0} has an empty key")]
    EmptyKey(usize),

    #[error("snapshot key '{0}' appears more than once")]
    DuplicateKey(String),

    #[error("snapshot item '{0}' has a zero width or height")]
    ZeroSized(String),

    #[error("snapshot item '{key}' is positioned outside the grid at ({x}, {y})")]
    OutOfRange { key: String, x: u32, y: u32 },
}

/// Parses and validates a stored snapshot string.
pub fn decode(raw: &str) -> Result<Vec<SnapshotRecord>, SnapshotError> {
    let records: Vec<SnapshotRecord> = serde_json::from_str(raw)?;
    validate(&records)?;
    Ok(records)
}

pub fn encode(records: &[SnapshotRecord]) -> Result<String, serde_json::Error> {
    serde_json::to_string(records)
}

/// Structural checks only; geometry (overlap, column bounds) is the
/// pipeline's business.
pub fn validate(records: &[SnapshotRecord]) -> Result<(), SnapshotError> {
    let mut seen = HashSet::with_capacity(records.len());
    for (idx, record) in records.iter().enumerate() {
        if record.i.trim().is_empty() {
            return Err(SnapshotError::EmptyKey(idx));
        }
        if !seen.insert(record.i.as_str()) {
            return Err(SnapshotError::DuplicateKey(record.i.clone()));
        }
        if record.w == Some(0) || record.h == Some(0) {
            return Err(SnapshotError::ZeroSized(record.i.clone()));
        }
        if record.x > MAX_COORDINATE || record.y > MAX_COORDINATE {
            return Err(SnapshotError::OutOfRange {
                key: record.i.clone(),
                x: record.x,
                y: record.y,
            });
        }
    }
    Ok(())
}

impl From<&PlacedCard> for SnapshotRecord {
    fn from(card: &PlacedCard) -> Self {
        Self {
            i: card.key.clone(),
            x: card.cell.x,
            y: card.cell.y,
            w: Some(card.dims.width),
            h: Some(card.dims.height),
        }
    }
}

/// Converts a layout to its wire records, preserving layout order.
pub fn to_records(layout: &Layout) -> Vec<SnapshotRecord> {
    layout.iter().map(SnapshotRecord::from).collect()
}
