//! Persistence gateway for dashboard preferences.
//!
//! `AppState` carries an `Arc<dyn PreferenceStore>`; the Postgres store is
//! used in production and the in-memory store in tests.

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;

use crate::models::preference::UserPreferenceRow;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("preference store unavailable: {0}")]
    Unavailable(String),
}

/// A partial write. `None` fields keep whatever is already stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceUpdate {
    pub user_id: i32,
    pub machine_id: i32,
    pub visible_cards: Option<String>,
    pub layout: Option<String>,
}

impl PreferenceUpdate {
    pub fn new(user_id: i32, machine_id: i32) -> Self {
        Self {
            user_id,
            machine_id,
            visible_cards: None,
            layout: None,
        }
    }

    pub fn with_visible_cards(mut self, json: String) -> Self {
        self.visible_cards = Some(json);
        self
    }

    /// An empty layout string never overwrites a stored layout.
    pub fn with_layout(mut self, json: String) -> Self {
        self.layout = Some(json).filter(|s| !s.trim().is_empty());
        self
    }
}

#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn load(
        &self,
        user_id: i32,
        machine_id: i32,
    ) -> Result<Option<UserPreferenceRow>, StoreError>;

    /// Upserts by `(user_id, machine_id)`. Last write wins.
    async fn save(&self, update: PreferenceUpdate) -> Result<(), StoreError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Postgres
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct PgPreferenceStore {
    pool: PgPool,
}

impl PgPreferenceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PreferenceStore for PgPreferenceStore {
    async fn load(
        &self,
        user_id: i32,
        machine_id: i32,
    ) -> Result<Option<UserPreferenceRow>, StoreError> {
        Ok(sqlx::query_as::<_, UserPreferenceRow>(
            "SELECT * FROM user_preferences WHERE user_id = $1 AND machine_id = $2",
        )
        .bind(user_id)
        .bind(machine_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn save(&self, update: PreferenceUpdate) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO user_preferences (user_id, machine_id, visible_cards, layout)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, machine_id) DO UPDATE SET
                visible_cards = COALESCE(EXCLUDED.visible_cards, user_preferences.visible_cards),
                layout        = COALESCE(EXCLUDED.layout, user_preferences.layout),
                updated_at    = NOW()
            "#,
        )
        .bind(update.user_id)
        .bind(update.machine_id)
        .bind(&update.visible_cards)
        .bind(&update.layout)
        .execute(&self.pool)
        .await?;

        info!(
            user_id = update.user_id,
            machine_id = update.machine_id,
            cards = update.visible_cards.is_some(),
            layout = update.layout.is_some(),
            "saved dashboard preferences"
        );
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory (tests)
// ────────────────────────────────────────────────────────────────────────────


#[cfg(test)]
mod tests {
    use super::memory::InMemoryPreferenceStore;
    use super::*;

    #[test]
    fn test_empty_layout_is_treated_as_absent() {
        let update = PreferenceUpdate::new(1, 2).with_layout("  ".to_string());
        assert_eq!(update.layout, None);
    }

    #[tokio::test]
    async fn test_partial_save_keeps_other_fields() {
        let store = InMemoryPreferenceStore::new();
        store
            .save(PreferenceUpdate::new(1, 3).with_visible_cards(r#"["jobCard"]"#.to_string()))
            .await
            .unwrap();
        store
            .save(PreferenceUpdate::new(1, 3).with_layout(r#"[{"i":"jobCard","x":0,"y":0}]"#.to_string()))
            .await
            .unwrap();

        let row = store.load(1, 3).await.unwrap().unwrap();
        assert_eq!(row.visible_cards.as_deref(), Some(r#"["jobCard"]"#));
        assert!(row.layout.is_some());
        assert!(store.load(1, 4).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let store = InMemoryPreferenceStore::new();
        store
            .save(PreferenceUpdate::new(1, 1).with_layout("[1]".to_string()))
            .await
            .unwrap();
        store
            .save(PreferenceUpdate::new(1, 1).with_layout("[2]".to_string()))
            .await
            .unwrap();
        assert_eq!(store.raw_layout(1, 1).await.as_deref(), Some("[2]"));
    }
}
