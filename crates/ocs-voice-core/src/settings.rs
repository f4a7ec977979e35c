use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::errors::OcsError;
use crate::sdk::SdkLogLevel;

/// Token-generation service used when none is configured.
pub const DEFAULT_TOKEN_ENDPOINT: &str =
    "https://sipsignal.whnmandiri.co.id:443/token-generation-service/token/getEncryptedToken";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Settings {
    #[serde(default = "default_token_endpoint")]
    pub token_endpoint: String,
    #[serde(default)]
    pub sdk_log_level: SdkLogLevel,
}

fn default_token_endpoint() -> String {
    DEFAULT_TOKEN_ENDPOINT.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            token_endpoint: default_token_endpoint(),
            sdk_log_level: SdkLogLevel::default(),
        }
    }
}

pub struct SettingsStore {
    settings: Mutex<Settings>,
    file_path: PathBuf,
}

impl SettingsStore {
    pub fn new(data_dir: &str) -> Self {
        let file_path = PathBuf::from(data_dir).join("settings.json");
        let settings = Self::load(&file_path);
        Self {
            settings: Mutex::new(settings),
            file_path,
        }
    }

    pub fn get(&self) -> Settings {
        self.settings.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn set_token_endpoint(&self, endpoint: &str) -> Result<(), OcsError> {
        let parsed = url::Url::parse(endpoint)
            .map_err(|e| OcsError::Config(format!("invalid token endpoint: {e}")))?;
        if !matches!(parsed.scheme(), "https" | "http") {
            return Err(OcsError::Config(format!(
                "unsupported token endpoint scheme '{}'",
                parsed.scheme()
            )));
        }
        self.settings
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .token_endpoint = endpoint.to_string();
        self.save();
        Ok(())
    }

    pub fn set_sdk_log_level(&self, level: SdkLogLevel) {
        self.settings
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .sdk_log_level = level;
        self.save();
    }

    fn save(&self) {
        let settings = self.get();
        if let Some(parent) = self.file_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        match serde_json::to_string_pretty(&settings) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&self.file_path, json) {
                    tracing::warn!("failed to save settings: {e}");
                }
            }
            Err(e) => tracing::warn!("failed to serialize settings: {e}"),
        }
    }

    fn load(path: &PathBuf) -> Settings {
        match std::fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_default(),
            Err(_) => Settings::default(),
        }
    }
}
