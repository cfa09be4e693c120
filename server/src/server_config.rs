use config::Config;
use lazy_static::lazy_static;
use serde::Deserialize;
use std::{env, path::Path};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    pub id: String,
    pub temperature: f64,
    pub tokenizer_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiFileConfig {
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    settings: Settings,
    api: ApiFileConfig,
    model: ModelConfig,
}

/// API access settings. The key comes from the environment, never from
/// config.toml, so the file can be committed.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub key: String,
    pub timeout_secs: u64,
}

#[derive(Debug)]
pub struct ServerConfig {
    pub settings: Settings,
    pub api: ApiConfig,
    pub model: ModelConfig,
}

impl std::fmt::Display for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Server Config:\n{:?}\n\nModel: {:?}\n\nAPI timeout: {}s (key redacted)",
            self.settings, self.model, self.api.timeout_secs,
        )
    }
}

lazy_static! {
    pub static ref cfg: ServerConfig = {
        let root = env::var("APP_DIR").unwrap_or_else(|_| {
            let dir =
                env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR or APP_DIR is required");
            let dir = Path::new(&dir).parent().unwrap().display().to_string();
            format!("{}/config", dir)
        });
        let path = format!("{root}/config.toml");
        let cfg_file: ConfigFile = Config::builder()
            .add_source(config::File::with_name(&path))
            .build()
            .expect("config.toml is required")
            .try_deserialize()
            .expect("config.toml is invalid");

        let ConfigFile {
            settings,
            api,
            model,
        } = cfg_file;

        let key = env::var("GEMINI_API_KEY").expect("GEMINI_API_KEY is not set in .env file");

        ServerConfig {
            settings,
            api: ApiConfig {
                key,
                timeout_secs: api.timeout_secs,
            },
            model,
        }
    };
}
