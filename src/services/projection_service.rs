use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    models::{ContentItem, ContentStatus, SortOrder, VoteKind},
    store::{ContentDirectory, VoteStore},
};

/// One admin list row: the item plus its like/bad columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemCountersRow {
    pub item_id: i64,
    pub title: String,
    pub status: ContentStatus,
    pub like: u64,
    pub bad: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub orderby: Option<VoteKind>,
    #[serde(default)]
    pub order: SortOrder,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ListQuery {
    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(20).clamp(1, 100)
    }

    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn offset(&self) -> u32 {
        (self.page() - 1).saturating_mul(self.limit())
    }
}

/// Sorting by a counter only lists items that have been voted on at least
/// once; an unsorted listing walks the content directory and fills zeros.
pub async fn list_item_counters(
    directory: &dyn ContentDirectory,
    store: &dyn VoteStore,
    query: &ListQuery,
) -> Result<Vec<ItemCountersRow>> {
    let (limit, offset) = (query.limit(), query.offset());

    match query.orderby {
        Some(kind) => {
            let ranked = store.ranked(kind, query.order, limit, offset).await?;
            let ids: Vec<i64> = ranked.iter().map(|(id, _)| *id).collect();
            let items = directory.find_many(&ids).await?;

            Ok(ranked
                .into_iter()
                .filter_map(|(id, counters)| {
                    items.iter().find(|item| item.id == id).map(|item| ItemCountersRow {
                        item_id: id,
                        title: item.title.clone(),
                        status: item.status,
                        like: counters.like,
                        bad: counters.bad,
                    })
                })
                .collect())
        }
        None => {
            let items = directory.list(limit, offset).await?;
            let ids: Vec<i64> = items.iter().map(|item| item.id).collect();
            let counters = store.get_many(&ids).await?;

            Ok(items
                .into_iter()
                .map(|item: ContentItem| {
                    let c = counters.get(&item.id).copied().unwrap_or_default();
                    ItemCountersRow {
                        item_id: item.id,
                        title: item.title,
                        status: item.status,
                        like: c.like,
                        bad: c.bad,
                    }
                })
                .collect())
        }
    }
}
