use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::AppError;
use crate::layout::snapshot::{self, SnapshotRecord};
use crate::preferences::store::PreferenceUpdate;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PreferenceQuery {
    pub user_id: i32,
    pub machine_id: i32,
}

#[derive(Debug, Serialize)]
pub struct PreferenceResponse {
    pub visible_cards: Option<Vec<String>>,
    pub layout: Option<Vec<SnapshotRecord>>,
}

#[derive(Debug, Deserialize)]
pub struct SavePreferenceRequest {
    pub user_id: i32,
    pub machine_id: i32,
    pub visible_cards: Option<Vec<String>>,
    pub layout: Option<Vec<SnapshotRecord>>,
}

/// Decodes a stored visible-card list; `None` when absent or unreadable.
pub fn decode_visible_cards(raw: Option<&str>) -> Option<Vec<String>> {
    let raw = raw?;
    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(cards) => Some(cards),
        Err(e) => {
            warn!("Stored visible-card list is malformed, ignoring it: {e}");
            None
        }
    }
}

/// Decodes a stored layout snapshot; `None` when absent or structurally invalid.
pub fn decode_layout(raw: Option<&str>) -> Option<Vec<SnapshotRecord>> {
    let raw = raw?;
    match snapshot::decode(raw) {
        Ok(records) => Some(records),
        Err(e) => {
            warn!("Stored layout snapshot rejected, treating as absent: {e}");
            None
        }
    }
}

/// GET /api/v1/preferences
pub async fn handle_get_preferences(
    State(state): State<AppState>,
    Query(params): Query<PreferenceQuery>,
) -> Result<Json<PreferenceResponse>, AppError> {
    let row = state.store.load(params.user_id, params.machine_id).await?;
    let response = match row {
        Some(row) => PreferenceResponse {
            visible_cards: decode_visible_cards(row.visible_cards.as_deref()),
            layout: decode_layout(row.layout.as_deref()),
        },
        None => PreferenceResponse {
            visible_cards: None,
            layout: None,
        },
    };
    Ok(Json(response))
}

/// POST /api/v1/preferences
pub async fn handle_save_preferences(
    State(state): State<AppState>,
    Json(req): Json<SavePreferenceRequest>,
) -> Result<StatusCode, AppError> {
    let mut update = PreferenceUpdate::new(req.user_id, req.machine_id);

    if let Some(cards) = &req.visible_cards {
        let json = serde_json::to_string(cards)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("encode visible cards: {e}")))?;
        update = update.with_visible_cards(json);
    }

    if let Some(records) = &req.layout {
        snapshot::validate(records).map_err(|e| AppError::Validation(e.to_string()))?;
        let json = snapshot::encode(records)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("encode layout: {e}")))?;
        update = update.with_layout(json);
    }

    state.store.save(update).await?;
    Ok(StatusCode::NO_CONTENT)
}
