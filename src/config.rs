use std::collections::HashSet;
use std::env;
use std::path::{Path, PathBuf};

use figment::providers::{Format, Toml};
use figment::Figment;
use serde::Deserialize;

use crate::AppResult;

pub const DEFAULT_DATA_FILE: &str = "ideabag.csv";

#[derive(Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    data_file: Option<String>,
}

/// Resolves the data-file path: the first config file found that names
/// one wins; no config anywhere falls back to `ideabag.csv` in the
/// working directory, so the tool works with zero setup.
pub fn data_file() -> AppResult<PathBuf> {
    let home = home_dir();
    for path in config_paths(home.as_deref()) {
        if !path.is_file() {
            continue;
        }
        let base_dir = path.parent().unwrap_or(Path::new("."));
        if let Some(resolved) = data_file_from(&path, base_dir, home.as_deref())? {
            return Ok(resolved);
        }
    }
    Ok(PathBuf::from(DEFAULT_DATA_FILE))
}

fn data_file_from(
    path: &Path,
    base_dir: &Path,
    home: Option<&Path>,
) -> AppResult<Option<PathBuf>> {
    let config: ConfigFile = Figment::from(Toml::file(path))
        .extract()
        .map_err(|err| format!("failed to parse config {}: {}", path.display(), err))?;
    Ok(config
        .data_file
        .and_then(|raw| expand_path(&raw, base_dir, home)))
}

fn home_dir() -> Option<PathBuf> {
    env::var("HOME").ok().map(PathBuf::from)
}

fn config_paths(home: Option<&Path>) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Ok(path) = env::var("IDEABAG_CONFIG") {
        if !path.trim().is_empty() {
            paths.push(PathBuf::from(path));
        }
    }
    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        paths.push(PathBuf::from(xdg).join("ideabag/config.toml"));
    }
    if let Some(home) = home {
        paths.push(home.join(".config/ideabag/config.toml"));
        paths.push(home.join(".ideabag.toml"));
    }
    if let Ok(cwd) = env::current_dir() {
        paths.push(cwd.join(".ideabag.toml"));
    }

    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for path in paths {
        let key = path.to_string_lossy().to_string();
        if seen.insert(key) {
            unique.push(path);
        }
    }
    unique
}

/// Expands `~` and `$HOME` and anchors relative paths at the config
/// file's directory. Unlike path lookups for existing folders, the data
/// file is allowed not to exist yet.
fn expand_path(raw: &str, base_dir: &Path, home: Option<&Path>) -> Option<PathBuf> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let mut value = trimmed.to_string();
    if let Some(home) = home {
        if value.starts_with("~/") {
            value = value.replacen('~', &home.to_string_lossy(), 1);
        }
        if value.contains("$HOME") {
            value = value.replace("$HOME", &home.to_string_lossy());
        }
    }
    let path = PathBuf::from(value);
    if path.is_relative() {
        Some(base_dir.join(path))
    } else {
        Some(path)
    }
}
