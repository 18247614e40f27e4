use std::{fs, io, path::Path, time::Duration};

use anyhow::Context;
use face_core::{clock::DEFAULT_TIMEZONE, TickerConfig, TimezoneSetting, DEFAULT_TICK_INTERVAL};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub timezone: String,
    pub tick_interval_ms: u64,
    pub display_id: i64,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE.into(),
            tick_interval_ms: DEFAULT_TICK_INTERVAL.as_millis() as u64,
            display_id: 0,
            log_filter: "info".into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    timezone: Option<String>,
    tick_interval_ms: Option<u64>,
    display_id: Option<i64>,
    log_filter: Option<String>,
}

impl Settings {
    pub fn timezone_setting(&self) -> anyhow::Result<TimezoneSetting> {
        self.timezone
            .parse()
            .with_context(|| format!("invalid timezone setting '{}'", self.timezone))
    }

    pub fn ticker_config(&self) -> anyhow::Result<TickerConfig> {
        let config = TickerConfig {
            tick_interval: Duration::from_millis(self.tick_interval_ms),
        };
        config
            .validate()
            .with_context(|| format!("invalid tick_interval_ms {}", self.tick_interval_ms))?;
        Ok(config)
    }
}

/// Defaults, then `path` if it exists, then environment overrides.
pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    match fs::read_to_string(path) {
        Ok(raw) => apply_file(&mut settings, &raw)
            .with_context(|| format!("failed to parse settings file '{}'", path.display()))?,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read settings file '{}'", path.display()))
        }
    }

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg = toml::from_str::<FileSettings>(raw)?;
    if let Some(v) = file_cfg.timezone {
        settings.timezone = v;
    }
    if let Some(v) = file_cfg.tick_interval_ms {
        settings.tick_interval_ms = v;
    }
    if let Some(v) = file_cfg.display_id {
        settings.display_id = v;
    }
    if let Some(v) = file_cfg.log_filter {
        settings.log_filter = v;
    }
    Ok(())
}

fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("WATCHFACE_TIMEZONE") {
        settings.timezone = v;
    }
    if let Some(v) = lookup("APP__TIMEZONE") {
        settings.timezone = v;
    }

    if let Some(v) = lookup("APP__TICK_INTERVAL_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.tick_interval_ms = parsed;
        }
    }

    if let Some(v) = lookup("APP__DISPLAY_ID") {
        if let Ok(parsed) = v.parse::<i64>() {
            settings.display_id = parsed;
        }
    }

    if let Some(v) = lookup("APP__LOG_FILTER") {
        settings.log_filter = v;
    }
    if let Some(v) = lookup("RUST_LOG") {
        settings.log_filter = v;
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
