use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use shared::error::{BoardError, BoardResult};
use storage::{StoreSettings, StoreTarget};

pub const LOCAL_CONFIG_FILE: &str = "announcement_board.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub store: StoreSettings,
    /// Overrides `store` when set (`mysql://...` or `sqlite:...`).
    pub database_url: Option<String>,
    pub allowed_authors: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store: StoreSettings::default(),
            database_url: None,
            allowed_authors: vec!["user_1".into(), "user_2".into(), "user_3".into()],
        }
    }
}

impl AppConfig {
    pub fn store_target(&self) -> StoreTarget {
        match &self.database_url {
            Some(url) => StoreTarget::Url(url.clone()),
            None => StoreTarget::MySql(self.store.clone()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    host: Option<String>,
    port: Option<u16>,
    user: Option<String>,
    password: Option<String>,
    database: Option<String>,
    database_url: Option<String>,
    allowed_authors: Option<Vec<String>>,
}

/// Loads configuration once at startup: defaults, then the first config
/// file found, then environment variables.
pub fn load_config() -> BoardResult<AppConfig> {
    let path = config_file_candidates().into_iter().find(|p| p.is_file());
    if let Some(path) = &path {
        tracing::info!(path = %path.display(), "loading config file");
    }
    load_config_from(path.as_deref(), |key| std::env::var(key).ok())
}

pub fn load_config_from(
    path: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> BoardResult<AppConfig> {
    let mut config = AppConfig::default();

    if let Some(path) = path {
        let raw = fs::read_to_string(path).map_err(|err| {
            BoardError::Config(format!("failed to read '{}': {err}", path.display()))
        })?;
        let file_cfg: FileConfig = toml::from_str(&raw).map_err(|err| {
            BoardError::Config(format!("failed to parse '{}': {err}", path.display()))
        })?;
        apply_file(&mut config, file_cfg);
    }

    apply_env(&mut config, env)?;

    config.allowed_authors = normalize_authors(config.allowed_authors);
    if config.allowed_authors.is_empty() {
        return Err(BoardError::Config(
            "allowed_authors must name at least one author".into(),
        ));
    }
    if let Some(url) = &config.database_url {
        if url.trim().is_empty() {
            config.database_url = None;
        }
    }

    Ok(config)
}

fn apply_file(config: &mut AppConfig, file_cfg: FileConfig) {
    if let Some(v) = file_cfg.host {
        config.store.host = v;
    }
    if let Some(v) = file_cfg.port {
        config.store.port = v;
    }
    if let Some(v) = file_cfg.user {
        config.store.user = v;
    }
    if let Some(v) = file_cfg.password {
        config.store.password = v;
    }
    if let Some(v) = file_cfg.database {
        config.store.database = v;
    }
    if let Some(v) = file_cfg.database_url {
        config.database_url = Some(v);
    }
    if let Some(v) = file_cfg.allowed_authors {
        config.allowed_authors = v;
    }
}

fn apply_env(config: &mut AppConfig, env: impl Fn(&str) -> Option<String>) -> BoardResult<()> {
    // Later keys win, so the APP__ aliases override the short names.
    let lookup = |keys: &[&str]| keys.iter().rev().find_map(|key| env(*key));

    if let Some(v) = lookup(&["DB_HOST", "APP__HOST"]) {
        config.store.host = v;
    }
    if let Some(v) = lookup(&["DB_PORT", "APP__PORT"]) {
        config.store.port = v
            .trim()
            .parse()
            .map_err(|_| BoardError::Config(format!("invalid database port '{v}'")))?;
    }
    if let Some(v) = lookup(&["DB_USER", "APP__USER"]) {
        config.store.user = v;
    }
    if let Some(v) = lookup(&["DB_PASSWORD", "APP__PASSWORD"]) {
        config.store.password = v;
    }
    if let Some(v) = lookup(&["DB_NAME", "APP__DATABASE"]) {
        config.store.database = v;
    }
    if let Some(v) = lookup(&["DATABASE_URL", "APP__DATABASE_URL"]) {
        config.database_url = Some(v);
    }
    if let Some(v) = lookup(&["BOARD_AUTHORS", "APP__ALLOWED_AUTHORS"]) {
        config.allowed_authors = v.split(',').map(str::to_string).collect();
    }

    Ok(())
}

fn normalize_authors(authors: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(authors.len());
    for author in authors {
        let author = author.trim();
        if !author.is_empty() && !out.iter().any(|known| known == author) {
            out.push(author.to_string());
        }
    }
    out
}

fn config_file_candidates() -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join("announcement_board").join("config.toml"));
    }
    candidates
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
