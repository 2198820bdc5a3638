use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};

use crate::api::ApiClient;
use crate::config;
use crate::permission::PermissionSet;
use crate::session::Session;

const SESSION_FILE: &str = "session.json";

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("SCM_CLI_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("scm").join("cli")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn session_file() -> anyhow::Result<PathBuf> {
    Ok(get_config_dir()?.join(SESSION_FILE))
}

/// Stored session, if any
pub fn load_session() -> anyhow::Result<Option<Session>> {
    let path = session_file()?;
    Session::load(&path).with_context(|| format!("failed to load {}", path.display()))
}

/// Stored session, or an error telling the user how to create one
pub fn require_session() -> anyhow::Result<Session> {
    load_session()?.ok_or_else(|| anyhow::anyhow!("No session stored; run `scm session import` first"))
}

pub fn save_session(session: &Session) -> anyhow::Result<PathBuf> {
    let path = session_file()?;
    session.save(&path).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

/// Returns whether a session file was removed
pub fn clear_session() -> anyhow::Result<bool> {
    let path = session_file()?;
    if !path.exists() {
        return Ok(false);
    }
    fs::remove_file(path)?;
    Ok(true)
}

/// Permissions from a JSON file when given, otherwise from the stored session.
/// Without either, everything is denied.
pub fn resolve_permissions(file: Option<&Path>) -> anyhow::Result<PermissionSet> {
    if let Some(path) = file {
        let content = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
        let permissions: PermissionSet = serde_json::from_str(&content)
            .with_context(|| format!("{} is not a permission list", path.display()))?;
        return Ok(permissions);
    }

    Ok(load_session()?.map(|s| s.permissions()).unwrap_or_default())
}

/// API client for the configured backend, authenticated as `session`
pub fn api_client(session: &Session) -> anyhow::Result<ApiClient> {
    let api = &config::config().api;
    let client = ApiClient::from_config(api)
        .with_context(|| format!("invalid API base URL '{}'", api.base_url))?;
    Ok(client.with_token(session.token().map(str::to_string)))
}

/// Account id every list endpoint is scoped to
pub fn require_account_id(session: &Session) -> anyhow::Result<String> {
    session
        .account_id()
        .ok_or_else(|| anyhow::anyhow!("Session has no account id"))
}
