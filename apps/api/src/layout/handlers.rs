use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::layout::breakpoints::BREAKPOINTS;
use crate::layout::session::{LayoutSession, LayoutState};
use crate::layout::snapshot::{self, SnapshotRecord};
use crate::layout::types::{CardKey, Dimensions, ExcludedCard, Layout};
use crate::layout::{
    compute_layout, plan_dashboard, Catalog, DashboardView, DimensionRegistry, LayoutOrigin,
    CANONICAL_COLUMNS,
};
use crate::models::preference::UserPreferenceRow;
use crate::preferences::handlers::{decode_layout, decode_visible_cards};
use crate::preferences::PreferenceUpdate;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub user_id: i32,
    pub machine_id: i32,
    /// Viewport width in px. Defaults to the widest breakpoint.
    pub viewport_width: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct DragEndRequest {
    pub user_id: i32,
    pub machine_id: i32,
    pub layout: Vec<SnapshotRecord>,
}

#[derive(Debug, Serialize)]
pub struct DragEndResponse {
    pub state: LayoutState,
    pub layout: Vec<SnapshotRecord>,
    pub excluded: Vec<ExcludedCard>,
    pub displaced: Vec<CardKey>,
}

#[derive(Debug, Serialize)]
pub struct CardDimensionsEntry {
    pub key: String,
    #[serde(flatten)]
    pub dims: Dimensions,
    pub height_px: u32,
}

/// Stored preference row, or `None` when the load failed. Failures are logged.
async fn load_row(
    state: &AppState,
    user_id: i32,
    machine_id: i32,
) -> Option<Option<UserPreferenceRow>> {
    match state.store.load(user_id, machine_id).await {
        Ok(row) => Some(row),
        Err(e) => {
            warn!(user_id, machine_id, "Preference load failed: {e}");
            None
        }
    }
}

/// The user's saved card selection, or the default catalog when none is saved
/// or the saved list is unreadable.
fn catalog_for(row: Option<&UserPreferenceRow>, registry: &DimensionRegistry) -> Catalog {
    match row.and_then(|r| decode_visible_cards(r.visible_cards.as_deref())) {
        Some(cards) => Catalog::from_visible(cards, registry),
        None => Catalog::default_cards(registry),
    }
}

/// GET /api/v1/dashboard/layout
pub async fn handle_get_dashboard(
    State(state): State<AppState>,
    Query(params): Query<DashboardQuery>,
) -> Result<Json<DashboardView>, AppError> {
    let row = load_row(&state, params.user_id, params.machine_id).await.flatten();
    let catalog = catalog_for(row.as_ref(), &state.registry);
    let snapshot = row.as_ref().and_then(|r| decode_layout(r.layout.as_deref()));
    let viewport_width = params.viewport_width.unwrap_or(BREAKPOINTS[0].min_width_px);

    let view = plan_dashboard(&catalog, &state.registry, snapshot.as_deref(), viewport_width);
    Ok(Json(view))
}

/// POST /api/v1/dashboard/layout/drag-end
///
/// Heals the dropped arrangement against the registry and saves it. A failed
/// save is not an error: the response reports `dirty` instead of `persisted`.
/// When the stored preferences cannot be read, the dropped cards themselves
/// are the catalog, so a save never swaps in cards the user did not pick.
pub async fn handle_drag_end(
    State(state): State<AppState>,
    Json(req): Json<DragEndRequest>,
) -> Result<Json<DragEndResponse>, AppError> {
    snapshot::validate(&req.layout).map_err(|e| AppError::Validation(e.to_string()))?;

    let catalog = match load_row(&state, req.user_id, req.machine_id).await {
        Some(row) => catalog_for(row.as_ref(), &state.registry),
        None => Catalog::from_visible(req.layout.iter().map(|r| r.i.clone()), &state.registry),
    };
    let dropped = compute_layout(&catalog, &state.registry, Some(&req.layout), CANONICAL_COLUMNS);

    // The pre-drag arrangement lives on the client; the session only orders
    // the drop against the save that follows it.
    let mut session = LayoutSession::new();
    session.load(Layout::new(), LayoutOrigin::Reconciled)?;
    session.drag_end(dropped.layout)?;

    let records = snapshot::to_records(session.layout());
    if catalog.is_empty() {
        warn!(
            user_id = req.user_id,
            machine_id = req.machine_id,
            "No known cards to save, keeping the stored layout"
        );
        session.mark_save_failed();
    } else {
        let json = snapshot::encode(&records)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("encode layout: {e}")))?;
        let update = PreferenceUpdate::new(req.user_id, req.machine_id).with_layout(json);
        match state.store.save(update).await {
            Ok(()) => session.mark_persisted()?,
            Err(e) => {
                warn!(user_id = req.user_id, machine_id = req.machine_id, "Layout save failed: {e}");
                session.mark_save_failed();
            }
        }
    }

    info!(
        user_id = req.user_id,
        machine_id = req.machine_id,
        state = ?session.state(),
        "drag-end applied"
    );

    Ok(Json(DragEndResponse {
        state: session.state(),
        layout: records,
        excluded: dropped.excluded,
        displaced: dropped.displaced,
    }))
}

/// GET /api/v1/cards/dimensions
pub async fn handle_card_dimensions(
    State(state): State<AppState>,
) -> Json<Vec<CardDimensionsEntry>> {
    let lg = &BREAKPOINTS[0];
    let entries = state
        .registry
        .entries()
        .into_iter()
        .map(|(key, dims)| CardDimensionsEntry {
            key: key.to_string(),
            dims,
            height_px: lg.card_height_px(dims.height),
        })
        .collect();
    Json(entries)
}
