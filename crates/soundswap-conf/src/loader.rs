//! Where config comes from: file discovery, TOML parsing, layering, env vars.

use crate::{ConfigError, DebugConfig, SwapConfig};
use std::env;
use std::path::{Path, PathBuf};

const SYSTEM_CONFIG: &str = "/etc/soundswap/config.toml";
const LOCAL_CONFIG: &str = "soundswap.toml";

/// Record of what contributed to a loaded config.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Files merged, lowest precedence first.
    pub files: Vec<PathBuf>,
    /// Names of env vars that were applied.
    pub env_overrides: Vec<String>,
}

impl ConfigSources {
    fn note_env(&mut self, key: &str) {
        self.env_overrides.push(key.to_string());
    }
}

/// Existing config files in precedence order: system, user, local.
pub fn discover_config_files() -> Vec<PathBuf> {
    discover_config_files_with_override(None)
}

/// Like [`discover_config_files`], but an existing `explicit` path takes the
/// place of `./soundswap.toml`.
pub fn discover_config_files_with_override(explicit: Option<&Path>) -> Vec<PathBuf> {
    let user = directories::BaseDirs::new()
        .map(|dirs| dirs.config_dir().join("soundswap").join("config.toml"));
    let last = explicit
        .filter(|path| path.exists())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG));

    [Some(PathBuf::from(SYSTEM_CONFIG)), user, Some(last)]
        .into_iter()
        .flatten()
        .filter(|path| path.exists())
        .collect()
}

/// Read one config file as a raw layer.
///
/// The layer is checked against [`SwapConfig`] here so a bad value is
/// reported against the file it came from.
pub fn load_from_file(path: &Path) -> Result<toml::Table, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_layer(&text, path)
}

fn parse_layer(text: &str, path: &Path) -> Result<toml::Table, ConfigError> {
    let parse_error = |e: toml::de::Error| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let layer: toml::Table = toml::from_str(text).map_err(parse_error)?;
    toml::Value::Table(layer.clone())
        .try_into::<SwapConfig>()
        .map_err(parse_error)?;
    Ok(layer)
}

/// Lay `overlay` over `base`.
///
/// Every key present in `overlay` wins, whatever its value; keys it does not
/// mention keep the value from `base`. Tables merge key by key, anything
/// else (lists included) is replaced whole.
pub fn merge_layers(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        let toml::Value::Table(above) = value else {
            base.insert(key, value);
            continue;
        };
        if let Some(toml::Value::Table(below)) = base.get_mut(&key) {
            merge_layers(below, above);
            continue;
        }
        base.insert(key, toml::Value::Table(above));
    }
}

/// Turn merged layers into a config. Missing sections and keys take defaults.
pub fn resolve_layers(layers: toml::Table, origin: &Path) -> Result<SwapConfig, ConfigError> {
    let mut config: SwapConfig =
        toml::Value::Table(layers)
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::Parse {
                path: origin.to_path_buf(),
                message: e.to_string(),
            })?;

    // serde leaves "~/..." untouched
    if let Some(raw) = config.paths.report_dir.to_str().map(str::to_string) {
        config.paths.report_dir = expand_path(&raw);
    }
    Ok(config)
}

/// Apply `SOUNDSWAP_*` variables (and `RUST_LOG`) over `config`.
///
/// Unparseable booleans are ignored rather than treated as false.
pub fn apply_env_overrides(config: &mut SwapConfig, sources: &mut ConfigSources) {
    if let Some(on) = env_bool("SOUNDSWAP_AUDIO_CLIP_SPOOFING", sources) {
        config.patches.audio_clip_spoofing = on;
    }
    if let Some(on) = env_bool("SOUNDSWAP_LEGACY_WEIGHT_DRAW", sources) {
        config.patches.legacy_weight_draw = on;
    }

    for flag in DebugConfig::FLAGS {
        let key = format!("SOUNDSWAP_DEBUG_{}", flag.to_uppercase());
        if let Some(on) = env_bool(&key, sources) {
            config.debug.set(flag, on);
        }
    }

    if let Ok(list) = env::var("SOUNDSWAP_STRIP_SUFFIXES") {
        config.names.strip_suffixes = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        sources.note_env("SOUNDSWAP_STRIP_SUFFIXES");
    }

    // RUST_LOG is checked last so it wins, as it does everywhere else
    for key in ["SOUNDSWAP_LOG_LEVEL", "RUST_LOG"] {
        if let Ok(level) = env::var(key) {
            config.telemetry.log_level = level;
            sources.note_env(key);
        }
    }

    if let Ok(dir) = env::var("SOUNDSWAP_REPORT_DIR") {
        config.paths.report_dir = expand_path(&dir);
        sources.note_env("SOUNDSWAP_REPORT_DIR");
    }
}

fn env_bool(key: &str, sources: &mut ConfigSources) -> Option<bool> {
    let value = parse_bool(&env::var(key).ok()?)?;
    sources.note_env(key);
    Some(value)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Expand a leading `~/` or `$VAR` in `raw`. Anything unresolvable is kept as is.
pub fn expand_path(raw: &str) -> PathBuf {
    if let Some(rest) = raw.strip_prefix("~/") {
        return match directories::BaseDirs::new() {
            Some(dirs) => dirs.home_dir().join(rest),
            None => PathBuf::from(raw),
        };
    }

    if let Some(var_and_rest) = raw.strip_prefix('$') {
        let (var, rest) = var_and_rest.split_once('/').unwrap_or((var_and_rest, ""));
        return match env::var(var) {
            Ok(value) if rest.is_empty() => PathBuf::from(value),
            Ok(value) => PathBuf::from(value).join(rest),
            Err(_) => PathBuf::from(raw),
        };
    }

    PathBuf::from(raw)
}
