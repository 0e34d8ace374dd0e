use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool, types::Json};
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{ContentItem, SortOrder, VoteCounters, VoteKind, VoteSettings},
    store::{ContentDirectory, SettingsStore, VoteStore},
};

#[derive(Debug, FromRow)]
struct CounterRow {
    item_id: i64,
    like_count: i64,
    bad_count: i64,
}

impl CounterRow {
    fn counters(&self) -> VoteCounters {
        VoteCounters::new(self.like_count.max(0) as u64, self.bad_count.max(0) as u64)
    }
}

#[derive(Clone)]
pub struct PgVoteStore {
    db: PgPool,
}

impl PgVoteStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl VoteStore for PgVoteStore {
    async fn increment(&self, item_id: i64, kind: VoteKind) -> Result<VoteCounters> {
        let (like, bad) = match kind {
            VoteKind::Like => (1_i64, 0_i64),
            VoteKind::Bad => (0, 1),
        };

        // Single statement: the row lock taken by the upsert serializes
        // concurrent voters on the same item.
        let row = sqlx::query_as::<_, CounterRow>(
            r#"
            INSERT INTO vote_counters (item_id, like_count, bad_count, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (item_id) DO UPDATE
            SET like_count = vote_counters.like_count + EXCLUDED.like_count,
                bad_count = vote_counters.bad_count + EXCLUDED.bad_count,
                updated_at = NOW()
            RETURNING item_id, like_count, bad_count
            "#,
        )
        .bind(item_id)
        .bind(like)
        .bind(bad)
        .fetch_one(&self.db)
        .await?;

        Ok(row.counters())
    }

    async fn get(&self, item_id: i64) -> Result<VoteCounters> {
        let row = sqlx::query_as::<_, CounterRow>(
            "SELECT item_id, like_count, bad_count FROM vote_counters WHERE item_id = $1",
        )
        .bind(item_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(|r| r.counters()).unwrap_or_default())
    }

    async fn get_many(&self, item_ids: &[i64]) -> Result<HashMap<i64, VoteCounters>> {
        let rows = sqlx::query_as::<_, CounterRow>(
            "SELECT item_id, like_count, bad_count FROM vote_counters WHERE item_id = ANY($1)",
        )
        .bind(item_ids)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.iter().map(|r| (r.item_id, r.counters())).collect())
    }

    async fn reset(&self, item_id: i64) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE vote_counters
            SET like_count = 0, bad_count = 0, updated_at = NOW()
            WHERE item_id = $1
            "#,
        )
        .bind(item_id)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn ranked(
        &self,
        kind: VoteKind,
        order: SortOrder,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<(i64, VoteCounters)>> {
        let column = match kind {
            VoteKind::Like => "like_count",
            VoteKind::Bad => "bad_count",
        };

        let query = format!(
            "SELECT item_id, like_count, bad_count FROM vote_counters ORDER BY {} {}, item_id ASC LIMIT $1 OFFSET $2",
            column,
            order.as_sql()
        );

        let rows = sqlx::query_as::<_, CounterRow>(&query)
            .bind(limit as i64)
            .bind(offset as i64)
            .fetch_all(&self.db)
            .await?;

        Ok(rows.iter().map(|r| (r.item_id, r.counters())).collect())
    }
}

#[derive(Debug, FromRow)]
struct ContentRow {
    id: i64,
    title: String,
    status: String,
    viewable: bool,
    author_id: Uuid,
}

impl TryFrom<ContentRow> for ContentItem {
    type Error = AppError;

    fn try_from(row: ContentRow) -> Result<Self> {
        Ok(ContentItem {
            id: row.id,
            title: row.title,
            status: row
                .status
                .parse()
                .map_err(|e| AppError::Internal(format!("Invalid status: {}", e)))?,
            viewable: row.viewable,
            author_id: row.author_id,
        })
    }
}

#[derive(Clone)]
pub struct PgContentDirectory {
    db: PgPool,
}

impl PgContentDirectory {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ContentDirectory for PgContentDirectory {
    async fn find(&self, item_id: i64) -> Result<Option<ContentItem>> {
        let row = sqlx::query_as::<_, ContentRow>(
            "SELECT id, title, status, viewable, author_id FROM content_items WHERE id = $1",
        )
        .bind(item_id)
        .fetch_optional(&self.db)
        .await?;

        row.map(ContentItem::try_from).transpose()
    }

    async fn find_many(&self, item_ids: &[i64]) -> Result<Vec<ContentItem>> {
        let rows = sqlx::query_as::<_, ContentRow>(
            "SELECT id, title, status, viewable, author_id FROM content_items WHERE id = ANY($1)",
        )
        .bind(item_ids)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(ContentItem::try_from).collect()
    }

    async fn list(&self, limit: u32, offset: u32) -> Result<Vec<ContentItem>> {
        let rows = sqlx::query_as::<_, ContentRow>(
            r#"
            SELECT id, title, status, viewable, author_id
            FROM content_items
            WHERE status != 'trash'
            ORDER BY id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(ContentItem::try_from).collect()
    }
}

#[derive(Clone)]
pub struct PgSettingsStore {
    db: PgPool,
}

impl PgSettingsStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SettingsStore for PgSettingsStore {
    async fn load(&self) -> Result<Option<VoteSettings>> {
        let row = sqlx::query_as::<_, (Json<VoteSettings>,)>(
            "SELECT settings FROM vote_settings WHERE id = 1",
        )
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(|(Json(settings),)| settings))
    }

    async fn save(&self, settings: &VoteSettings) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO vote_settings (id, settings, updated_at)
            VALUES (1, $1, NOW())
            ON CONFLICT (id) DO UPDATE SET settings = EXCLUDED.settings, updated_at = NOW()
            "#,
        )
        .bind(Json(settings))
        .execute(&self.db)
        .await?;

        Ok(())
    }
}
