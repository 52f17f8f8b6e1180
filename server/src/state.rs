use crate::{config::ServerConfig, notify::{MessagingTarget, Notifier}};
use minifi_core::{Datastore, GameConfig, SqliteStore};
use std::sync::Arc;

/// Shared handles every route sees. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// None when no datastore is configured.
    pub store:       Option<Arc<dyn Datastore>>,
    pub notifier:    Notifier,
    pub game:        Arc<GameConfig>,
    pub league_seed: u64,
}

impl AppState {
    pub fn new(store: Option<Arc<dyn Datastore>>, notifier: Notifier, game: GameConfig) -> Self {
        Self {
            store,
            notifier,
            game: Arc::new(game),
            league_seed: 0,
        }
    }

    pub fn with_league_seed(mut self, seed: u64) -> Self {
        self.league_seed = seed;
        self
    }

    /// Build everything from the server config: open and migrate the
    /// database, load game tables, wire the webhooks.
    pub fn from_config(config: &ServerConfig) -> anyhow::Result<Self> {
        let store: Option<Arc<dyn Datastore>> = match &config.db_path {
            Some(path) => {
                let store = SqliteStore::open_migrated(path)
                    .map_err(|e| anyhow::anyhow!("Cannot open database {path}: {e}"))?;
                log::info!("[state] datastore at {path}");
                Some(Arc::new(store))
            }
            None => {
                log::warn!("[state] MINIFI_DB_PATH not set; datastore not configured");
                None
            }
        };

        let game = match &config.data_dir {
            Some(dir) => GameConfig::load(dir)?,
            None => GameConfig::default(),
        };

        let messaging = config.messaging_webhook_url.clone().map(|url| MessagingTarget {
            url,
            api_key: config.messaging_api_key.clone(),
        });
        let notifier = Notifier::new(
            config.chat_webhook_url.clone(),
            config.feedback_webhook_url.clone(),
            messaging,
        );

        Ok(Self::new(store, notifier, game).with_league_seed(config.league_seed))
    }

    pub fn datastore_configured(&self) -> bool {
        self.store.is_some()
    }
}
