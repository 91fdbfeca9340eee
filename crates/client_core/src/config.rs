use std::{fs, path::Path, time::Duration};

use anyhow::{anyhow, Context};
use serde::Deserialize;
use url::Url;

use crate::copy::Locale;

pub const SETTINGS_FILE: &str = "classifier_client.toml";
pub const ENV_PREFIX: &str = "CLASSIFIER__";

#[derive(Debug, Clone, PartialEq)]
pub struct ClientSettings {
    pub server_url: String,
    pub history_limit: u32,
    pub notification_ttl_ms: u64,
    pub status_hide_delay_ms: u64,
    pub locale: Locale,
    /// `None` falls back to the document root.
    pub notification_container: Option<String>,
    pub supersede_stale_responses: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8000".into(),
            history_limit: 10,
            notification_ttl_ms: 3000,
            status_hide_delay_ms: 3000,
            locale: Locale::ZhCn,
            notification_container: Some("main-content".into()),
            supersede_stale_responses: false,
        }
    }
}

impl ClientSettings {
    pub fn notification_ttl(&self) -> Duration {
        Duration::from_millis(self.notification_ttl_ms)
    }

    pub fn status_hide_delay(&self) -> Duration {
        Duration::from_millis(self.status_hide_delay_ms)
    }

    pub fn base_url(&self) -> anyhow::Result<Url> {
        let mut url = Url::parse(self.server_url.trim())
            .with_context(|| format!("invalid server url `{}`", self.server_url))?;
        if url.cannot_be_a_base() {
            return Err(anyhow!("server url `{}` cannot be a base", self.server_url));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }
}

/// Every key is optional; absent keys keep their default.
#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    server_url: Option<String>,
    history_limit: Option<u32>,
    notification_ttl_ms: Option<u64>,
    status_hide_delay_ms: Option<u64>,
    locale: Option<String>,
    notification_container: Option<String>,
    supersede_stale_responses: Option<bool>,
}

pub fn load_settings() -> ClientSettings {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

pub fn load_settings_from(
    file: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> ClientSettings {
    let mut settings = ClientSettings::default();

    if let Ok(raw) = fs::read_to_string(file) {
        match toml::from_str::<SettingsFile>(&raw) {
            Ok(file_cfg) => apply_file(&mut settings, file_cfg),
            Err(error) => {
                tracing::warn!(path = %file.display(), %error, "ignoring unreadable settings file")
            }
        }
    }

    apply_env(&mut settings, env);
    settings
}

fn apply_file(settings: &mut ClientSettings, file_cfg: SettingsFile) {
    if let Some(v) = file_cfg.server_url {
        settings.server_url = v;
    }
    if let Some(v) = file_cfg.history_limit {
        settings.history_limit = v;
    }
    if let Some(v) = file_cfg.notification_ttl_ms {
        settings.notification_ttl_ms = v;
    }
    if let Some(v) = file_cfg.status_hide_delay_ms {
        settings.status_hide_delay_ms = v;
    }
    if let Some(locale) = file_cfg.locale.as_deref().and_then(Locale::parse) {
        settings.locale = locale;
    }
    if let Some(v) = file_cfg.notification_container {
        settings.notification_container = non_empty(v);
    }
    if let Some(v) = file_cfg.supersede_stale_responses {
        settings.supersede_stale_responses = v;
    }
}

fn apply_env(settings: &mut ClientSettings, env: impl Fn(&str) -> Option<String>) {
    let var = |name: &str| env(&format!("{ENV_PREFIX}{name}"));

    if let Some(v) = var("SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(parsed) = var("HISTORY_LIMIT").and_then(|v| v.parse().ok()) {
        settings.history_limit = parsed;
    }
    if let Some(parsed) = var("NOTIFICATION_TTL_MS").and_then(|v| v.parse().ok()) {
        settings.notification_ttl_ms = parsed;
    }
    if let Some(parsed) = var("STATUS_HIDE_DELAY_MS").and_then(|v| v.parse().ok()) {
        settings.status_hide_delay_ms = parsed;
    }
    if let Some(locale) = var("LOCALE").as_deref().and_then(Locale::parse) {
        settings.locale = locale;
    }
    if let Some(v) = var("NOTIFICATION_CONTAINER") {
        settings.notification_container = non_empty(v);
    }
    if let Some(parsed) = var("SUPERSEDE_STALE_RESPONSES").and_then(|v| v.parse().ok()) {
        settings.supersede_stale_responses = parsed;
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
