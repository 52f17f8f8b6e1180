use std::env;

/// Server settings read from the environment (a `.env` file is honoured by main).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServerConfig {
    pub bind_addr:             String,
    /// Unset means the datastore is not configured.
    pub db_path:               Option<String>,
    /// Directory holding rewards.json and leagues.json. Unset uses built-in tables.
    pub data_dir:              Option<String>,
    pub league_seed:           u64,
    pub chat_webhook_url:      Option<String>,
    pub feedback_webhook_url:  Option<String>,
    pub messaging_webhook_url: Option<String>,
    pub messaging_api_key:     Option<String>,
}

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let league_seed = match non_empty("MINIFI_LEAGUE_SEED") {
            Some(raw) => raw
                .parse()
                .map_err(|e| anyhow::anyhow!("MINIFI_LEAGUE_SEED must be an integer: {e}"))?,
            None => 0,
        };

        Ok(Self {
            bind_addr: non_empty("MINIFI_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            db_path: non_empty("MINIFI_DB_PATH"),
            data_dir: non_empty("MINIFI_DATA_DIR"),
            league_seed,
            chat_webhook_url: non_empty("DISCORD_WEBHOOK_URL"),
            feedback_webhook_url: non_empty("DISCORD_FEEDBACK_WEBHOOK"),
            messaging_webhook_url: non_empty("MESSAGING_WEBHOOK_URL"),
            messaging_api_key: non_empty("MESSAGING_API_KEY"),
        })
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
