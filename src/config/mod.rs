/// Configuration system for loginscope.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults** — hardcoded in [`schema::LoginscopeConfig::default()`]
/// 2. **User global config** — `~/.loginscope/config.toml`
/// 3. **Project local config** — `.loginscope.toml` in the current working directory
/// 4. **Environment variables** — `LOGINSCOPE_*` overrides (highest precedence)
///
/// Later layers override earlier ones at the key level: a project file that
/// only sets `polling.interval_ms` keeps the global file's `backend.base_url`.
///
/// # Usage
///
/// ```rust,ignore
/// use loginscope::config;
///
/// let cfg = config::load();
/// let client = BackendClient::from_config(&cfg.backend);
/// ```
pub mod schema;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub use schema::LoginscopeConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved loginscope configuration.
///
/// Merges all layers in order: defaults → global TOML → project TOML → env
/// vars. This is the primary entry point for all commands.
pub fn load() -> LoginscopeConfig {
    let mut merged = toml::Value::Table(toml::map::Map::new());

    for path in [global_config_path(), project_config_path()] {
        if let Some(layer) = load_toml_file(path) {
            merge_values(&mut merged, layer);
        }
    }

    let mut config = resolve(merged);
    apply_env_overrides(&mut config);
    config
}

/// Deserialize merged layers, dropping only the leaves that don't fit.
///
/// Leaves are accepted one at a time; a mistyped key keeps its default and
/// every other key still applies.
fn resolve(merged: toml::Value) -> LoginscopeConfig {
    let mut accepted = toml::Value::Table(toml::map::Map::new());

    let toml::Value::Table(sections) = merged else {
        return LoginscopeConfig::default();
    };

    for (section, body) in sections {
        let leaves = match body {
            toml::Value::Table(keys) => keys
                .into_iter()
                .map(|(key, value)| {
                    let mut leaf = toml::map::Map::new();
                    leaf.insert(key, value);
                    toml::Value::Table(leaf)
                })
                .collect(),
            other => vec![other],
        };

        for leaf in leaves {
            let mut layer = toml::map::Map::new();
            layer.insert(section.clone(), leaf);

            let mut candidate = accepted.clone();
            merge_values(&mut candidate, toml::Value::Table(layer));
            if candidate.clone().try_into::<LoginscopeConfig>().is_ok() {
                accepted = candidate;
            }
        }
    }

    accepted.try_into().unwrap_or_default()
}

/// Load a TOML config file from the given path (if it exists).
///
/// Returns `None` if the path is `None`, the file doesn't exist, or the
/// content is malformed. Malformed files are silently ignored so a bad edit
/// never stops the dashboard from starting.
fn load_toml_file(path: Option<PathBuf>) -> Option<toml::Value> {
    let path = path?;
    let content = fs::read_to_string(&path).ok()?;
    toml::from_str(&content).ok()
}

/// Merge `overlay` into `base`, recursing into tables.
///
/// Keys present in the overlay win; keys absent from it keep the base value.
fn merge_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Path to the user global config: `~/.loginscope/config.toml`.
fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".loginscope").join("config.toml"))
}

/// Path to the project local config: `.loginscope.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".loginscope.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Return the path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &str) -> Option<PathBuf> {
    if path == "~" {
        return dirs::home_dir();
    }
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir().map(|home| home.join(rest)),
        None => Some(PathBuf::from(path)),
    }
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `LOGINSCOPE_URL` — backend base URL
/// - `LOGINSCOPE_TIMEOUT_MS` — request timeout
/// - `LOGINSCOPE_INTERVAL_MS` — polling interval
/// - `LOGINSCOPE_COLOR` — colored output (`1`/`true`/`yes`/`on`)
/// - `LOGINSCOPE_LOGGING` — event log enabled
fn apply_env_overrides(config: &mut LoginscopeConfig) {
    if let Ok(val) = std::env::var("LOGINSCOPE_URL")
        && !val.is_empty()
    {
        config.backend.base_url = val;
    }
    if let Ok(val) = std::env::var("LOGINSCOPE_TIMEOUT_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.backend.timeout_ms = ms;
    }
    if let Ok(val) = std::env::var("LOGINSCOPE_INTERVAL_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.polling.interval_ms = ms;
    }
    if let Ok(val) = std::env::var("LOGINSCOPE_COLOR") {
        config.display.color = is_truthy(&val);
    }
    if let Ok(val) = std::env::var("LOGINSCOPE_LOGGING") {
        config.logging.enabled = is_truthy(&val);
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.loginscope/config.toml`.
///
/// Creates the `~/.loginscope/` directory if it doesn't exist. Returns an
/// error if the file already exists (use `force = true` to overwrite).
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.loginscope/ directory")?;
    }

    fs::write(&path, LoginscopeConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set a single config key to a value in the global config file.
///
/// Reads the current global config (or defaults), updates the specified key,
/// and writes the result back. Supports dotted keys like `polling.interval_ms`.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;

    let content = if path.exists() {
        fs::read_to_string(&path).context("failed to read config file")?
    } else {
        toml::to_string_pretty(&LoginscopeConfig::default())
            .context("failed to serialize default config")?
    };

    let mut value_table: toml::Value =
        toml::from_str(&content).context("failed to parse config as TOML value")?;
    set_toml_value(&mut value_table, key, value)?;

    let output =
        toml::to_string_pretty(&value_table).context("failed to serialize updated config")?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(&path, output).context("failed to write config file")?;

    Ok(())
}

/// Set a value in a TOML value tree using a dotted key path.
///
/// The existing value's type decides how `raw_value` is parsed; unknown
/// leaves are stored as strings.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').filter(|p| !p.is_empty()).collect();
    let Some((leaf, sections)) = parts.split_last() else {
        anyhow::bail!("empty config key");
    };

    let mut current = root;
    for &part in sections {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let table = current.as_table_mut().with_context(|| {
        format!(
            "expected table at '{}'",
            key.rsplit_once('.').map(|(s, _)| s).unwrap_or("")
        )
    })?;

    let new_value = match table.get(*leaf) {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(toml::Value::Float(_)) => {
            let f: f64 = raw_value
                .parse()
                .with_context(|| format!("expected float for '{key}', got '{raw_value}'"))?;
            toml::Value::Float(f)
        }
        _ => toml::Value::String(raw_value.to_string()),
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    let config = load();
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
