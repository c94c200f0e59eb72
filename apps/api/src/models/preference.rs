use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One dashboard preference record per (user, machine).
///
/// `visible_cards` and `layout` hold JSON text exactly as the front end sent
/// it; decoding and validation happen at read time.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserPreferenceRow {
    pub id: i32,
    pub user_id: i32,
    pub machine_id: i32,
    pub visible_cards: Option<String>,
    pub layout: Option<String>,
    pub updated_at: DateTime<Utc>,
}
