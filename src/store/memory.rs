use std::{
    collections::{BTreeMap, HashMap},
    sync::atomic::{AtomicU64, Ordering},
};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    error::Result,
    models::{ContentItem, SortOrder, VoteCounters, VoteKind, VoteSettings},
    store::{ContentDirectory, SettingsStore, VoteStore},
};

#[derive(Default)]
pub struct MemoryVoteStore {
    counters: Mutex<HashMap<i64, VoteCounters>>,
    calls: AtomicU64,
}

impl MemoryVoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed(&self, item_id: i64, counters: VoteCounters) {
        self.counters.lock().await.insert(item_id, counters);
    }

    /// Number of store operations performed so far.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::Relaxed);
    }
}

#[async_trait]
impl VoteStore for MemoryVoteStore {
    async fn increment(&self, item_id: i64, kind: VoteKind) -> Result<VoteCounters> {
        self.record_call();
        let mut counters = self.counters.lock().await;
        let entry = counters.entry(item_id).or_default();
        *entry = entry.incremented(kind);
        Ok(*entry)
    }

    async fn get(&self, item_id: i64) -> Result<VoteCounters> {
        self.record_call();
        Ok(self
            .counters
            .lock()
            .await
            .get(&item_id)
            .copied()
            .unwrap_or_default())
    }

    async fn get_many(&self, item_ids: &[i64]) -> Result<HashMap<i64, VoteCounters>> {
        self.record_call();
        let counters = self.counters.lock().await;
        Ok(item_ids
            .iter()
            .filter_map(|id| counters.get(id).map(|c| (*id, *c)))
            .collect())
    }

    async fn reset(&self, item_id: i64) -> Result<()> {
        self.record_call();
        let mut counters = self.counters.lock().await;
        if let Some(entry) = counters.get_mut(&item_id) {
            *entry = VoteCounters::default();
        }
        Ok(())
    }

    async fn ranked(
        &self,
        kind: VoteKind,
        order: SortOrder,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<(i64, VoteCounters)>> {
        self.record_call();
        let counters = self.counters.lock().await;
        let mut rows: Vec<(i64, VoteCounters)> = counters.iter().map(|(k, v)| (*k, *v)).collect();
        rows.sort_by(|(a_id, a), (b_id, b)| {
            let by_count = match order {
                SortOrder::Asc => a.count(kind).cmp(&b.count(kind)),
                SortOrder::Desc => b.count(kind).cmp(&a.count(kind)),
            };
            by_count.then(a_id.cmp(b_id))
        });
        Ok(rows
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }
}

#[derive(Default)]
pub struct MemoryContentDirectory {
    items: Mutex<BTreeMap<i64, ContentItem>>,
}

impl MemoryContentDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, item: ContentItem) {
        self.items.lock().await.insert(item.id, item);
    }
}

#[async_trait]
impl ContentDirectory for MemoryContentDirectory {
    async fn find(&self, item_id: i64) -> Result<Option<ContentItem>> {
        Ok(self.items.lock().await.get(&item_id).cloned())
    }

    async fn find_many(&self, item_ids: &[i64]) -> Result<Vec<ContentItem>> {
        let items = self.items.lock().await;
        Ok(item_ids
            .iter()
            .filter_map(|id| items.get(id).cloned())
            .collect())
    }

    async fn list(&self, limit: u32, offset: u32) -> Result<Vec<ContentItem>> {
        Ok(self
            .items
            .lock()
            .await
            .values()
            .rev()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct MemorySettingsStore {
    settings: Mutex<Option<VoteSettings>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn load(&self) -> Result<Option<VoteSettings>> {
        Ok(self.settings.lock().await.clone())
    }

    async fn save(&self, settings: &VoteSettings) -> Result<()> {
        *self.settings.lock().await = Some(settings.clone());
        Ok(())
    }
}
