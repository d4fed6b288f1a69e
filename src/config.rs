use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

// Default configuration
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_WINDOW_SIZE: [f32; 2] = [800.0, 600.0];

const KEYRING_SERVICE: &str = "deskhub";
const KEYRING_USER: &str = "openai_api_key";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("no configuration directory available on this platform")]
    NoConfigDir,
    #[error("failed to write settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode settings: {0}")]
    Json(#[from] serde_json::Error),
    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),
}

/// How the shell treats a module instance when the user navigates away.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RetentionPolicy {
    /// Unmount and drop; a fresh instance is built on the next visit.
    #[default]
    Recreate,
    /// Unmount and keep the instance hidden so its state survives.
    KeepAlive,
}

/// Language-model backend settings.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct AiSettings {
    /// Never written to the settings file; lives in the system keyring.
    #[serde(skip)]
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
}

fn default_temperature() -> f32 {
    0.7
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_API_BASE.to_string(),
            temperature: default_temperature(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct WindowSettings {
    pub width: f32,
    pub height: f32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: DEFAULT_WINDOW_SIZE[0],
            height: DEFAULT_WINDOW_SIZE[1],
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Settings {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default)]
    pub retention: RetentionPolicy,
    #[serde(default)]
    pub ai: AiSettings,
    #[serde(default)]
    pub window: WindowSettings,
    /// Model named by the environment, with the file value it replaced.
    #[serde(skip)]
    env_model: Option<ModelOverride>,
}

#[derive(Clone, Debug, PartialEq)]
struct ModelOverride {
    file: String,
    env: String,
}

fn default_theme() -> String {
    "dark".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            retention: RetentionPolicy::default(),
            ai: AiSettings::default(),
            window: WindowSettings::default(),
            env_model: None,
        }
    }
}

impl Settings {
    /// Apply `OPENAI_API_KEY` / `DESKHUB_AI_MODEL` on top of the file values.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup("OPENAI_API_KEY").filter(|k| !k.trim().is_empty()) {
            self.ai.api_key = Some(key.trim().to_string());
        }
        if let Some(model) = lookup("DESKHUB_AI_MODEL").filter(|m| !m.trim().is_empty()) {
            let env = model.trim().to_string();
            let file = std::mem::replace(&mut self.ai.model, env.clone());
            self.env_model = Some(ModelOverride { file, env });
        }
    }

    /// The values that belong in the settings file.
    ///
    /// An environment model override is swapped back for the file value
    /// unless the user picked a different model since startup.
    pub fn persisted(&self) -> Settings {
        let mut out = self.clone();
        if let Some(over) = out.env_model.take() {
            if out.ai.model == over.env {
                out.ai.model = over.file;
            }
        }
        out
    }
}

pub fn settings_path() -> Option<PathBuf> {
    if let Some(proj) = ProjectDirs::from("com", "deskhub", "deskhub") {
        let dir = proj.config_dir();
        if let Err(e) = fs::create_dir_all(dir) {
            tracing::warn!("Failed to create config dir: {}", e);
            return None;
        }
        return Some(dir.join("settings.json"));
    }
    None
}

/// Read settings from `path`; a missing or malformed file yields `None`.
pub fn load_settings_from(path: &Path) -> Option<Settings> {
    let content = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
        Ok(settings) => Some(settings),
        Err(e) => {
            tracing::warn!("Ignoring malformed settings file {}: {}", path.display(), e);
            None
        }
    }
}

pub fn save_settings_to(path: &Path, settings: &Settings) -> Result<(), SettingsError> {
    let data = serde_json::to_string_pretty(&settings.persisted())?;
    let mut file = fs::File::create(path)?;
    file.write_all(data.as_bytes())?;
    Ok(())
}

/// Load settings from the platform config dir, then the keyring, then the environment.
pub fn load_settings() -> Settings {
    let mut settings = settings_path()
        .and_then(|path| load_settings_from(&path))
        .unwrap_or_default();
    settings.ai.api_key = load_api_key();
    settings.apply_env_overrides(|name| std::env::var(name).ok());
    settings
}

pub fn save_settings(settings: &Settings) -> Result<(), SettingsError> {
    let path = settings_path().ok_or(SettingsError::NoConfigDir)?;
    save_settings_to(&path, settings)
}

/// Load the API key from the system keyring, if one was stored.
pub fn load_api_key() -> Option<String> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER).ok()?;
    entry.get_password().ok()
}

/// Store the API key in the system keyring; `None` or blank removes it.
pub fn store_api_key(key: Option<&str>) -> Result<(), SettingsError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER)?;
    match key.map(str::trim).filter(|k| !k.is_empty()) {
        Some(key) => entry.set_password(key)?,
        None => match entry.delete_password() {
            Ok(()) | Err(keyring::Error::NoEntry) => {}
            Err(e) => return Err(e.into()),
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.theme, "dark");
        assert_eq!(settings.retention, RetentionPolicy::Recreate);
        assert_eq!(settings.ai.model, DEFAULT_MODEL);
        assert!(settings.ai.api_key.is_none());
    }

    #[test]
    fn test_round_trip_skips_api_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut settings = Settings::default();
        settings.retention = RetentionPolicy::KeepAlive;
        settings.ai.api_key = Some("sk-secret".into());
        save_settings_to(&path, &settings).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(!raw.contains("sk-secret"));
        assert!(raw.contains("keep_alive"));

        let loaded = load_settings_from(&path).unwrap();
        assert_eq!(loaded.retention, RetentionPolicy::KeepAlive);
        assert!(loaded.ai.api_key.is_none());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"theme":"light"}"#).unwrap();

        let loaded = load_settings_from(&path).unwrap();
        assert_eq!(loaded.theme, "light");
        assert_eq!(loaded.ai, AiSettings::default());
        assert_eq!(loaded.window, WindowSettings::default());

        fs::write(
            &path,
            r#"{"theme":"light","retention":"keep_alive","ai":{"model":"x"},"window":{"width":1024.0}}"#,
        )
        .unwrap();
        let loaded = load_settings_from(&path).unwrap();
        assert_eq!(loaded.theme, "light");
        assert_eq!(loaded.retention, RetentionPolicy::KeepAlive);
        assert_eq!(loaded.ai.model, "x");
        assert_eq!(loaded.ai.base_url, DEFAULT_API_BASE);
        assert_eq!(loaded.ai.temperature, 0.7);
        assert_eq!(loaded.window.width, 1024.0);
        assert_eq!(loaded.window.height, DEFAULT_WINDOW_SIZE[1]);
    }

    #[test]
    fn test_malformed_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(load_settings_from(&path).is_none());
        assert!(load_settings_from(&dir.path().join("absent.json")).is_none());
    }

    #[test]
    fn test_env_overrides() {
        let mut settings = Settings::default();
        settings.apply_env_overrides(|name| match name {
            "OPENAI_API_KEY" => Some(" sk-env ".into()),
            "DESKHUB_AI_MODEL" => Some("gpt-4o".into()),
            _ => None,
        });
        assert_eq!(settings.ai.api_key.as_deref(), Some("sk-env"));
        assert_eq!(settings.ai.model, "gpt-4o");

        let mut untouched = Settings::default();
        untouched.apply_env_overrides(|_| Some("   ".into()));
        assert!(untouched.ai.api_key.is_none());
        assert_eq!(untouched.ai.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_env_model_is_not_saved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut settings = Settings::default();
        settings.ai.model = "file-model".into();
        settings.apply_env_overrides(|name| match name {
            "DESKHUB_AI_MODEL" => Some("env-model".into()),
            _ => None,
        });
        assert_eq!(settings.ai.model, "env-model");

        save_settings_to(&path, &settings).unwrap();
        let raw = fs::read_to_string(&path).unwrap();
        assert!(!raw.contains("env-model"));
        assert_eq!(load_settings_from(&path).unwrap().ai.model, "file-model");
        // in-memory value is still the override
        assert_eq!(settings.ai.model, "env-model");

        settings.ai.model = "picked-in-dialog".into();
        save_settings_to(&path, &settings).unwrap();
        assert_eq!(
            load_settings_from(&path).unwrap().ai.model,
            "picked-in-dialog"
        );
    }
}
