use crate::domain::viewport::ViewportSettings;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub api: ApiSettings,
    #[serde(default)]
    pub map: ViewportSettings,
    pub board: BoardSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    #[serde(default)]
    pub token: Option<String>,
    pub timeout_secs: u64,
}

impl ApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct BoardSettings {
    /// 0 disables periodic refresh
    pub auto_refresh_secs: u64,
    /// 0 disables the location cache
    pub cache_ttl_secs: u64,
}

impl BoardSettings {
    pub fn auto_refresh(&self) -> Option<Duration> {
        (self.auto_refresh_secs > 0).then(|| Duration::from_secs(self.auto_refresh_secs))
    }

    pub fn cache_ttl(&self) -> Option<Duration> {
        (self.cache_ttl_secs > 0).then(|| Duration::from_secs(self.cache_ttl_secs))
    }
}

fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
    config::Config::builder()
        .set_default("server.bind", "0.0.0.0:8080")?
        .set_default("api.base_url", "http://localhost:8000/api/v1")?
        .set_default("api.timeout_secs", 10)?
        .set_default("board.auto_refresh_secs", 0)?
        .set_default("board.cache_ttl_secs", 0)
}

/// Defaults, then `config/fleet.toml` if present, then `FLEET__*` variables
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = builder()?
        .add_source(config::File::with_name("config/fleet").required(false))
        .add_source(
            config::Environment::with_prefix("FLEET")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    validated(settings.try_deserialize()?)
}

fn validated(config: AppConfig) -> anyhow::Result<AppConfig> {
    config.map.validate()?;
    Ok(config)
}
