use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub engine: EngineSettings,
    pub storage: StorageSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub addr: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EngineSettings {
    pub tick_interval_ms: u64,
    pub autoconnect: bool,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl EngineSettings {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    File,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    pub dir: PathBuf,
}

pub fn load_app_config() -> anyhow::Result<AppConfig> {
    load_app_config_from("config/diagnostics")
}

/// Defaults, then the optional file at `path` (any format the `config`
/// crate recognises by extension), then `DIAG__SECTION__KEY` variables.
pub fn load_app_config_from(path: &str) -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .set_default("server.addr", "0.0.0.0:8080")?
        .set_default("engine.tick_interval_ms", 1000_i64)?
        .set_default("engine.autoconnect", true)?
        .set_default("storage.backend", "file")?
        .set_default("storage.dir", "data")?
        .add_source(config::File::with_name(path).required(false))
        .add_source(
            config::Environment::with_prefix("DIAG")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
