use crate::{
    auth::AuthUser,
    error::{AppError, Result},
    store::{ContentDirectory, VoteStore},
};

/// Zeroes one item's counters. Aborts without effect if the item is missing
/// or the user may not edit it.
pub async fn reset_single(
    directory: &dyn ContentDirectory,
    store: &dyn VoteStore,
    user: &AuthUser,
    item_id: i64,
) -> Result<()> {
    if item_id <= 0 {
        return Err(AppError::InvalidInput("Invalid item id".to_string()));
    }

    let item = directory
        .find(item_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Item not found".to_string()))?;

    if !user.can_edit(&item) {
        return Err(AppError::Forbidden("Permission denied".to_string()));
    }

    store.reset(item_id).await?;
    tracing::info!(item_id, user = %user.username, "Vote counters reset");
    Ok(())
}

/// Zeroes counters for every listed item the user may edit; others are
/// skipped. Returns how many were reset.
pub async fn reset_bulk(
    directory: &dyn ContentDirectory,
    store: &dyn VoteStore,
    user: &AuthUser,
    item_ids: &[i64],
) -> Result<usize> {
    let mut ids: Vec<i64> = item_ids.iter().copied().filter(|id| *id > 0).collect();
    ids.sort_unstable();
    ids.dedup();

    let items = directory.find_many(&ids).await?;

    let mut count = 0;
    for item in items.iter().filter(|item| user.can_edit(item)) {
        store.reset(item.id).await?;
        count += 1;
    }

    let skipped = ids.len() - count;
    if skipped > 0 {
        tracing::debug!(skipped, "Bulk reset skipped items");
    }
    tracing::info!(count, user = %user.username, "Bulk vote counter reset");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::Role,
        models::{ContentItem, ContentStatus, VoteCounters},
        store::{MemoryContentDirectory, MemoryVoteStore},
    };
    use uuid::Uuid;

    async fn setup(author_id: Uuid) -> (MemoryContentDirectory, MemoryVoteStore) {
        let directory = MemoryContentDirectory::new();
        let store = MemoryVoteStore::new();
        for id in 1..=3 {
            directory
                .insert(ContentItem {
                    id,
                    title: format!("Item {}", id),
                    status: ContentStatus::Publish,
                    viewable: true,
                    // Only item 1 belongs to the author under test
                    author_id: if id == 1 { author_id } else { Uuid::new_v4() },
                })
                .await;
            store.seed(id, VoteCounters::new(id as u64, 1)).await;
        }
        (directory, store)
    }

    fn user(id: Uuid, role: Role) -> AuthUser {
        AuthUser {
            user_id: id,
            username: "tester".into(),
            role,
        }
    }

    #[tokio::test]
    async fn single_reset_zeroes_both_counters() {
        let editor = user(Uuid::new_v4(), Role::Editor);
        let (directory, store) = setup(Uuid::new_v4()).await;

        reset_single(&directory, &store, &editor, 2).await.unwrap();
        assert_eq!(store.get(2).await.unwrap(), VoteCounters::new(0, 0));

        reset_single(&directory, &store, &editor, 2).await.unwrap();
        assert_eq!(store.get(2).await.unwrap(), VoteCounters::new(0, 0));
    }

    #[tokio::test]
    async fn single_reset_without_rights_changes_nothing() {
        let author = user(Uuid::new_v4(), Role::Author);
        let (directory, store) = setup(Uuid::new_v4()).await;

        let err = reset_single(&directory, &store, &author, 2).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert_eq!(store.get(2).await.unwrap(), VoteCounters::new(2, 1));

        let err = reset_single(&directory, &store, &author, 99).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn bulk_reset_skips_items_the_user_cannot_edit() {
        let author_id = Uuid::new_v4();
        let author = user(author_id, Role::Author);
        let (directory, store) = setup(author_id).await;

        let count = reset_bulk(&directory, &store, &author, &[1, 2, 3, 99])
            .await
            .unwrap();

        assert_eq!(count, 1);
        assert_eq!(store.get(1).await.unwrap(), VoteCounters::new(0, 0));
        assert_eq!(store.get(2).await.unwrap(), VoteCounters::new(2, 1));
        assert_eq!(store.get(3).await.unwrap(), VoteCounters::new(3, 1));
    }
}
