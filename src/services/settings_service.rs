use std::sync::Arc;

use tokio::sync::RwLock;
use validator::Validate;

use crate::{
    error::Result,
    models::{VoteSettings, VoteSettingsInput},
    store::SettingsStore,
};

/// Loaded once at startup and handed to whoever needs settings. Updates
/// persist first, then replace the in-memory copy, under one write lock.
#[derive(Clone)]
pub struct SettingsHandle {
    current: Arc<RwLock<VoteSettings>>,
    store: Arc<dyn SettingsStore>,
}

impl SettingsHandle {
    pub async fn load(store: Arc<dyn SettingsStore>) -> Result<Self> {
        let settings = match store.load().await? {
            Some(settings) => settings,
            None => {
                let defaults = VoteSettings::default();
                store.save(&defaults).await?;
                tracing::info!("Vote settings initialized with defaults");
                defaults
            }
        };

        Ok(Self {
            current: Arc::new(RwLock::new(settings)),
            store,
        })
    }

    pub async fn current(&self) -> VoteSettings {
        self.current.read().await.clone()
    }

    pub async fn update(&self, input: VoteSettingsInput) -> Result<VoteSettings> {
        let settings = input.sanitize();
        settings.validate()?;

        // Held across the save so the store and the in-memory copy agree
        let mut current = self.current.write().await;
        self.store.save(&settings).await?;
        *current = settings.clone();
        drop(current);

        tracing::info!(
            cookie_days = settings.cookie_days,
            "Vote settings updated"
        );
        Ok(settings)
    }
}
