//! Configuration for the soundswap replacement engine.
//!
//! Kept free of engine types so a host shim can read the same file without
//! pulling in the engine.
//!
//! ```rust,no_run
//! use soundswap_conf::SwapConfig;
//!
//! let config = SwapConfig::load().expect("config");
//! if config.debug.match_strings {
//!     println!("logging match strings");
//! }
//! ```
//!
//! Layers, lowest precedence first. A key set in a later layer wins even when
//! it sets the default back; keys it leaves out keep their earlier value.
//! 1. compiled defaults
//! 2. `/etc/soundswap/config.toml`
//! 3. `~/.config/soundswap/config.toml`
//! 4. `./soundswap.toml`, or the path passed to [`SwapConfig::load_from`]
//! 5. `SOUNDSWAP_*` environment variables
//!
//! ```toml
//! [patches]
//! audio_clip_spoofing = true
//! legacy_weight_draw = false
//!
//! [debug]
//! match_strings = true
//!
//! [names]
//! strip_suffixes = ["(Clone)"]
//!
//! [telemetry]
//! log_level = "info"
//!
//! [paths]
//! report_dir = "~/.local/share/soundswap/reports"
//! ```

pub mod loader;
pub mod settings;

pub use loader::{discover_config_files_with_override, ConfigSources};
pub use settings::{DebugConfig, NamesConfig, PatchesConfig, PathsConfig, TelemetryConfig};

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config in {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Everything soundswap reads from config files and the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapConfig {
    #[serde(default)]
    pub patches: PatchesConfig,

    #[serde(default)]
    pub debug: DebugConfig,

    #[serde(default)]
    pub names: NamesConfig,

    #[serde(default)]
    pub telemetry: TelemetryConfig,

    #[serde(default)]
    pub paths: PathsConfig,
}

impl SwapConfig {
    /// Load every layer from the standard locations.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load every layer, with `explicit` standing in for `./soundswap.toml`.
    pub fn load_from(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_sources_from(explicit).map(|(config, _)| config)
    }

    /// Load and also report which files and env vars contributed.
    pub fn load_with_sources_from(
        explicit: Option<&Path>,
    ) -> Result<(Self, ConfigSources), ConfigError> {
        let mut sources = ConfigSources::default();

        let mut layers = toml::Table::new();
        for path in loader::discover_config_files_with_override(explicit) {
            loader::merge_layers(&mut layers, loader::load_from_file(&path)?);
            sources.files.push(path);
        }
        let origin = sources
            .files
            .last()
            .cloned()
            .unwrap_or_else(|| PathBuf::from("<defaults>"));

        let mut config = loader::resolve_layers(layers, &origin)?;
        loader::apply_env_overrides(&mut config, &mut sources);

        Ok((config, sources))
    }

    /// Render as a commented TOML file that parses back to the same config.
    pub fn to_toml(&self) -> String {
        let mut out = String::from("# soundswap configuration\n");

        // writing to a String cannot fail
        let _ = writeln!(out, "\n[patches]");
        let _ = writeln!(out, "# report the assigned clip on reads, drop same-clip reassignments");
        let _ = writeln!(out, "audio_clip_spoofing = {}", self.patches.audio_clip_spoofing);
        let _ = writeln!(out, "# draw weights from 0..=total like older packs");
        let _ = writeln!(out, "legacy_weight_draw = {}", self.patches.legacy_weight_draw);

        let _ = writeln!(out, "\n[debug]");
        for flag in DebugConfig::FLAGS {
            let _ = writeln!(out, "{flag} = {}", self.debug.get(flag).unwrap_or(false));
        }

        let suffixes: Vec<String> = self
            .names
            .strip_suffixes
            .iter()
            .map(|s| format!("{s:?}"))
            .collect();
        let _ = writeln!(out, "\n[names]");
        let _ = writeln!(out, "strip_suffixes = [{}]", suffixes.join(", "));

        let _ = writeln!(out, "\n[telemetry]");
        let _ = writeln!(out, "log_level = {:?}", self.telemetry.log_level);

        let _ = writeln!(out, "\n[paths]");
        let _ = writeln!(
            out,
            "report_dir = {:?}",
            self.paths.report_dir.display().to_string()
        );

        out
    }
}
