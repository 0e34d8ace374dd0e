use std::collections::HashMap;

use async_trait::async_trait;

use crate::{
    error::Result,
    models::{ContentItem, SortOrder, VoteCounters, VoteKind, VoteSettings},
};

pub mod memory;
pub mod postgres;

pub use memory::{MemoryContentDirectory, MemorySettingsStore, MemoryVoteStore};
pub use postgres::{PgContentDirectory, PgSettingsStore, PgVoteStore};

/// Like/bad tallies per item. Absence of a row means zero.
#[async_trait]
pub trait VoteStore: Send + Sync + 'static {
    /// Adds one to the named counter without a separate read step and
    /// returns both counters as they stand after the increment.
    async fn increment(&self, item_id: i64, kind: VoteKind) -> Result<VoteCounters>;
    async fn get(&self, item_id: i64) -> Result<VoteCounters>;
    async fn get_many(&self, item_ids: &[i64]) -> Result<HashMap<i64, VoteCounters>>;
    /// Sets both counters to zero. Resetting an item with no votes is a no-op.
    async fn reset(&self, item_id: i64) -> Result<()>;
    /// Items that have a counter row, ordered by the given counter.
    async fn ranked(
        &self,
        kind: VoteKind,
        order: SortOrder,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<(i64, VoteCounters)>>;
}

/// Read-only view of the host site's content.
#[async_trait]
pub trait ContentDirectory: Send + Sync + 'static {
    async fn find(&self, item_id: i64) -> Result<Option<ContentItem>>;
    async fn find_many(&self, item_ids: &[i64]) -> Result<Vec<ContentItem>>;
    async fn list(&self, limit: u32, offset: u32) -> Result<Vec<ContentItem>>;
}

#[async_trait]
pub trait SettingsStore: Send + Sync + 'static {
    async fn load(&self) -> Result<Option<VoteSettings>>;
    async fn save(&self, settings: &VoteSettings) -> Result<()>;
}
