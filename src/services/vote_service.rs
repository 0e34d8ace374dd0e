use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
    auth::{ActionTokens, VOTE_ACTION},
    error::{AppError, Result},
    models::{VoteCounters, VoteKind, VoteMarker},
    redis::RedisClient,
    services::{settings_service::SettingsHandle, vote_guard::VoteGuard},
    store::{ContentDirectory, VoteStore},
};

/// What the caller brings along with a vote besides the item and kind.
#[derive(Debug, Clone, Copy)]
pub struct VoteContext<'a> {
    pub token: &'a str,
    /// Raw marker cookie for this item, if the caller sent one.
    pub marker: Option<&'a str>,
    /// Client address used for the optional rate limit.
    pub client: Option<&'a str>,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct VoteOutcome {
    pub counters: VoteCounters,
    pub marker: VoteMarker,
    pub marker_token: String,
    pub cookie_days: u32,
}

#[derive(Clone)]
struct RateLimit {
    redis: Arc<RedisClient>,
    per_hour: u32,
}

#[derive(Clone)]
pub struct VoteService {
    store: Arc<dyn VoteStore>,
    directory: Arc<dyn ContentDirectory>,
    guard: VoteGuard,
    tokens: ActionTokens,
    settings: SettingsHandle,
    rate_limit: Option<RateLimit>,
}

impl VoteService {
    pub fn new(
        store: Arc<dyn VoteStore>,
        directory: Arc<dyn ContentDirectory>,
        guard: VoteGuard,
        tokens: ActionTokens,
        settings: SettingsHandle,
    ) -> Self {
        Self {
            store,
            directory,
            guard,
            tokens,
            settings,
            rate_limit: None,
        }
    }

    pub fn with_rate_limit(mut self, redis: Arc<RedisClient>, per_hour: u32) -> Self {
        if per_hour > 0 {
            self.rate_limit = Some(RateLimit { redis, per_hour });
        }
        self
    }

    pub fn guard(&self) -> &VoteGuard {
        &self.guard
    }

    pub fn tokens(&self) -> &ActionTokens {
        &self.tokens
    }

    pub async fn counters(&self, item_id: i64) -> Result<VoteCounters> {
        if item_id <= 0 {
            return Err(AppError::InvalidInput("Invalid params".to_string()));
        }
        self.store.get(item_id).await
    }

    pub async fn submit_vote(
        &self,
        item_id: i64,
        kind: &str,
        ctx: VoteContext<'_>,
    ) -> Result<VoteOutcome> {
        // Input shape first, before touching any storage
        let kind: VoteKind = kind
            .parse()
            .map_err(|_| AppError::InvalidInput("Invalid params".to_string()))?;
        if item_id <= 0 {
            return Err(AppError::InvalidInput("Invalid params".to_string()));
        }

        let item = self
            .directory
            .find(item_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Item not found".to_string()))?;
        if !item.is_public() {
            return Err(AppError::Forbidden("Not allowed".to_string()));
        }

        if !self.tokens.verify(ctx.token, VOTE_ACTION, ctx.now) {
            return Err(AppError::InvalidToken);
        }

        if !self.guard.can_vote(item_id, ctx.marker, ctx.now) {
            tracing::debug!(item_id, "Vote rejected: marker present");
            return Err(AppError::AlreadyVoted);
        }

        if let (Some(limit), Some(client)) = (&self.rate_limit, ctx.client) {
            let key = format!("vote:{}", client);
            if !limit
                .redis
                .check_rate_limit(&key, limit.per_hour, 3600)
                .await?
            {
                return Err(AppError::RateLimit);
            }
        }

        // Build the marker first so a failure here leaves the counters alone
        let cookie_days = self.settings.current().await.cookie_days.max(1);
        let (marker_token, marker) = self.guard.issue(item_id, kind, ctx.now, cookie_days)?;

        let counters = self.store.increment(item_id, kind).await?;

        tracing::info!(
            item_id,
            kind = %kind,
            like = counters.like,
            bad = counters.bad,
            "Vote recorded"
        );

        Ok(VoteOutcome {
            counters,
            marker,
            marker_token,
            cookie_days,
        })
    }
}
