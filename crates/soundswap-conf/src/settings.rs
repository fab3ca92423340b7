//! Individual configuration sections.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Behavior switches for the clip-property interception layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchesConfig {
    /// Report the originally assigned clip on reads and suppress
    /// reassignment of the same clip.
    /// Default: true
    #[serde(default = "PatchesConfig::default_audio_clip_spoofing")]
    pub audio_clip_spoofing: bool,

    /// Draw sound weights from `0..=total` like older packs expect, which
    /// gives the first sound in a group one extra share.
    /// Default: false
    #[serde(default)]
    pub legacy_weight_draw: bool,
}

impl PatchesConfig {
    fn default_audio_clip_spoofing() -> bool {
        true
    }
}

impl Default for PatchesConfig {
    fn default() -> Self {
        Self {
            audio_clip_spoofing: Self::default_audio_clip_spoofing(),
            legacy_weight_draw: false,
        }
    }
}

/// Verbose diagnostics, one switch per subsystem.
///
/// All off by default. These gate `debug!` output on the matching
/// `soundswap::*` tracing targets; warnings are always emitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugConfig {
    /// Log every `parent:object:clip` match string that gets built.
    #[serde(default)]
    pub match_strings: bool,

    /// Step-by-step trace of each replacement attempt.
    #[serde(default)]
    pub replacement_handler: bool,

    /// Log suppressed reassignments and spoofed reads.
    #[serde(default)]
    pub audio_clip_spoofing: bool,

    /// Log swaps to groups owned by continuously updating collections.
    #[serde(default)]
    pub update_every_frame: bool,

    /// Log sources revisited after a scope reload.
    #[serde(default)]
    pub scope_reload: bool,
}

impl DebugConfig {
    /// Flag names as they appear in TOML and (uppercased) in env vars.
    pub const FLAGS: [&'static str; 5] = [
        "match_strings",
        "replacement_handler",
        "audio_clip_spoofing",
        "update_every_frame",
        "scope_reload",
    ];

    /// Look up a flag by name.
    pub fn get(&self, name: &str) -> Option<bool> {
        match name {
            "match_strings" => Some(self.match_strings),
            "replacement_handler" => Some(self.replacement_handler),
            "audio_clip_spoofing" => Some(self.audio_clip_spoofing),
            "update_every_frame" => Some(self.update_every_frame),
            "scope_reload" => Some(self.scope_reload),
            _ => None,
        }
    }

    /// Set a flag by name. Returns false for unknown names.
    pub fn set(&mut self, name: &str, value: bool) -> bool {
        let slot = match name {
            "match_strings" => &mut self.match_strings,
            "replacement_handler" => &mut self.replacement_handler,
            "audio_clip_spoofing" => &mut self.audio_clip_spoofing,
            "update_every_frame" => &mut self.update_every_frame,
            "scope_reload" => &mut self.scope_reload,
            _ => return false,
        };
        *slot = value;
        true
    }
}

/// Object-name normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamesConfig {
    /// Literal substrings removed from object names before matching.
    /// Default: ["(Clone)"]
    #[serde(default = "NamesConfig::default_strip_suffixes")]
    pub strip_suffixes: Vec<String>,
}

impl NamesConfig {
    fn default_strip_suffixes() -> Vec<String> {
        vec!["(Clone)".to_string()]
    }
}

impl Default for NamesConfig {
    fn default() -> Self {
        Self {
            strip_suffixes: Self::default_strip_suffixes(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Log level or full `EnvFilter` directive.
    /// Default: info
    #[serde(default = "TelemetryConfig::default_log_level")]
    pub log_level: String,
}

impl TelemetryConfig {
    fn default_log_level() -> String {
        "info".to_string()
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: Self::default_log_level(),
        }
    }
}

/// Filesystem locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Where sound reports are written.
    /// Default: ~/.local/share/soundswap/reports
    #[serde(default = "PathsConfig::default_report_dir")]
    pub report_dir: PathBuf,
}

impl PathsConfig {
    fn default_report_dir() -> PathBuf {
        directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(".local/share/soundswap/reports"))
            .unwrap_or_else(|| PathBuf::from(".local/share/soundswap/reports"))
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            report_dir: Self::default_report_dir(),
        }
    }
}
