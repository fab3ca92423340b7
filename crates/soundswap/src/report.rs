//! Sound reports: which match strings the host actually produced.
//!
//! Pack authors enable a report, play through a scene, and read the list
//! back to learn which `ancestor:object:clip` strings to target.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Caller name used when the host cannot tell who requested playback.
pub const UNKNOWN_CALLER: &str = "unknown caller";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayedSound {
    pub match_string: String,
    pub caller: String,
    pub is_play_on_awake: bool,
    pub is_looping: bool,
    pub is_one_shot: bool,
}

impl PlayedSound {
    pub fn format_for_report(&self) -> String {
        format!(
            "Match String: {}, Caller: {}, IsPlayOnAwake: {}, IsLooping: {}, IsOneShot: {}",
            self.match_string, self.caller, self.is_play_on_awake, self.is_looping, self.is_one_shot
        )
    }
}

/// One reporting session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "StoredReport")]
pub struct SoundReport {
    pub started_at: DateTime<Local>,
    pub played_sounds: Vec<PlayedSound>,
    pub sound_pack_names: Vec<String>,
    pub audio_clips_loaded: usize,
    #[serde(skip)]
    seen: HashSet<PlayedSound>,
}

/// The serialized shape; the dedup set is rebuilt from `played_sounds`.
#[derive(Deserialize)]
struct StoredReport {
    started_at: DateTime<Local>,
    played_sounds: Vec<PlayedSound>,
    sound_pack_names: Vec<String>,
    audio_clips_loaded: usize,
}

impl From<StoredReport> for SoundReport {
    fn from(stored: StoredReport) -> Self {
        let mut report = SoundReport {
            started_at: stored.started_at,
            played_sounds: Vec::with_capacity(stored.played_sounds.len()),
            sound_pack_names: stored.sound_pack_names,
            audio_clips_loaded: stored.audio_clips_loaded,
            seen: HashSet::new(),
        };
        for sound in stored.played_sounds {
            report.record(sound);
        }
        report
    }
}

impl Default for SoundReport {
    fn default() -> Self {
        Self::new()
    }
}

impl SoundReport {
    pub fn new() -> Self {
        Self {
            started_at: Local::now(),
            played_sounds: Vec::new(),
            sound_pack_names: Vec::new(),
            audio_clips_loaded: 0,
            seen: HashSet::new(),
        }
    }

    /// Record a sound unless an identical entry is already present.
    ///
    /// Returns true when the entry was new.
    pub fn record(&mut self, sound: PlayedSound) -> bool {
        if self.seen.contains(&sound) {
            return false;
        }
        self.seen.insert(sound.clone());
        self.played_sounds.push(sound);
        true
    }

    /// Render the report as plain text.
    pub fn format_for_report(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "Sound report started {}\n",
            self.started_at.format("%Y-%m-%d %H:%M:%S")
        ));
        output.push_str(&format!("Sound packs: {}\n", self.sound_pack_names.join(", ")));
        output.push_str(&format!("Audio clips loaded: {}\n", self.audio_clips_loaded));
        output.push_str(&format!("Played sounds ({}):\n", self.played_sounds.len()));
        for sound in &self.played_sounds {
            output.push_str("  ");
            output.push_str(&sound.format_for_report());
            output.push('\n');
        }
        output
    }

    /// Write the text report into `dir`, creating it if needed.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating report directory {}", dir.display()))?;

        let path = dir.join(format!(
            "sound-report-{}.txt",
            self.started_at.format("%Y%m%d-%H%M%S")
        ));
        fs::write(&path, self.format_for_report())
            .with_context(|| format!("writing sound report {}", path.display()))?;

        tracing::info!(path = %path.display(), sounds = self.played_sounds.len(), "wrote sound report");
        Ok(path)
    }
}
