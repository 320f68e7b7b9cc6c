use config::{Config, ConfigError};
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub api: ApiConfig,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    pub browse_url: String,
    pub auth_url: String,
    pub marketplace_id: String,
    pub timeout_secs: u64,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::Environment::with_prefix("EBAY"));

        let config = builder.build()?;
        let settings: Settings = config.try_deserialize()?;

        debug!(
            marketplace_id = %settings.api.marketplace_id,
            configured = settings.client_id.is_some() && settings.client_secret.is_some(),
            "Loaded connector settings"
        );

        Ok(settings)
    }
}
