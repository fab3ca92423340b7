//! Replacement rule data: collections, groups, sound instances, and the
//! clip-name index built over them.
//!
//! The catalog is an immutable snapshot. Loaders build a fresh one on every
//! pack reload and hand it to the engine as an `Arc`.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::condition::{Condition, Conditional};
use crate::matcher;

/// Opaque host handle for an audio resource.
///
/// Two clips are "the same clip" when their handles match, regardless of name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClipHandle(pub u64);

impl fmt::Display for ClipHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "clip#{}", self.0)
    }
}

/// A clip as seen by callers: a handle plus its display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AudioClip {
    pub handle: ClipHandle,
    pub name: String,
}

impl AudioClip {
    pub fn new(handle: u64, name: impl Into<String>) -> Self {
        Self {
            handle: ClipHandle(handle),
            name: name.into(),
        }
    }

    /// Same handle: the comparison hosts use for "same clip".
    pub fn same_clip(&self, other: &AudioClip) -> bool {
        self.handle == other.handle
    }

    /// Copy of this clip carrying another display name.
    pub fn renamed(&self, name: &str) -> AudioClip {
        AudioClip {
            handle: self.handle,
            name: name.to_string(),
        }
    }
}

/// One candidate sound inside a group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundInstance {
    /// `None` mutes the request.
    #[serde(default)]
    pub clip: Option<AudioClip>,

    #[serde(default = "default_weight")]
    pub weight: u32,

    #[serde(default)]
    pub condition: Option<Condition>,
}

fn default_weight() -> u32 {
    1
}

impl SoundInstance {
    pub fn new(clip: AudioClip, weight: u32) -> Self {
        Self {
            clip: Some(clip),
            weight,
            condition: None,
        }
    }

    pub fn mute(weight: u32) -> Self {
        Self {
            clip: None,
            weight,
            condition: None,
        }
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }
}

impl Conditional for SoundInstance {
    fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }
}

/// A bundle of sounds sharing a set of `ancestor:object:clip` patterns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundReplacementGroup {
    pub matches: Vec<String>,

    pub sounds: Vec<SoundInstance>,

    #[serde(default)]
    pub condition: Option<Condition>,
}

impl SoundReplacementGroup {
    pub fn new<I, S>(matches: I, sounds: Vec<SoundInstance>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            matches: matches.into_iter().map(Into::into).collect(),
            sounds,
            condition: None,
        }
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }
}

impl Conditional for SoundReplacementGroup {
    fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }
}

/// One loaded replacer file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundReplacementCollection {
    /// Name of the pack this file came from, for diagnostics.
    #[serde(default)]
    pub pack_name: String,

    /// Source file, for diagnostics.
    #[serde(default)]
    pub file_path: String,

    /// Chosen replacements must be re-resolved continuously by the
    /// frame-update path instead of pinned once.
    #[serde(default)]
    pub update_every_frame: bool,

    /// Whether the choice must be network-synchronized. Carried, not acted on.
    #[serde(default)]
    pub synced: bool,

    #[serde(default)]
    pub condition: Option<Condition>,

    pub replacements: Vec<SoundReplacementGroup>,
}

impl SoundReplacementCollection {
    pub fn new(pack_name: impl Into<String>, replacements: Vec<SoundReplacementGroup>) -> Self {
        Self {
            pack_name: pack_name.into(),
            file_path: String::new(),
            update_every_frame: false,
            synced: false,
            condition: None,
            replacements,
        }
    }

    pub fn with_file_path(mut self, path: impl Into<String>) -> Self {
        self.file_path = path.into();
        self
    }

    pub fn with_update_every_frame(mut self, update_every_frame: bool) -> Self {
        self.update_every_frame = update_every_frame;
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// The file path from the `replacers` directory onward.
    ///
    /// Falls back to the whole path when there is no `replacers` segment.
    pub fn relative_path(&self) -> &str {
        let lowered = self.file_path.to_ascii_lowercase();
        match lowered.find("replacers") {
            Some(index) => &self.file_path[index..],
            None => &self.file_path,
        }
    }
}

impl Conditional for SoundReplacementCollection {
    fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }
}

/// Address of a group within a catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId {
    pub collection: usize,
    pub group: usize,
}

/// Errors raised while building a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("malformed match '{pattern}' in '{path}': {source}")]
    MalformedPattern {
        pattern: String,
        path: String,
        source: matcher::PatternError,
    },
}

/// Clip name to the groups that declare a pattern for that clip.
#[derive(Debug, Clone, Default)]
pub struct ReplacementIndex {
    by_clip: HashMap<String, Vec<GroupId>>,
}

impl ReplacementIndex {
    /// Candidate groups for `clip`, in load order.
    pub fn candidates(&self, clip: &str) -> &[GroupId] {
        self.by_clip.get(clip).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn clip_count(&self) -> usize {
        self.by_clip.len()
    }

    fn insert(&mut self, clip: &str, id: GroupId) {
        let entry = self.by_clip.entry(clip.to_string()).or_default();
        // several patterns in one group may name the same clip
        if !entry.contains(&id) {
            entry.push(id);
        }
    }
}

/// All loaded collections plus their index.
#[derive(Debug, Clone, Default)]
pub struct ReplacementCatalog {
    collections: Vec<SoundReplacementCollection>,
    index: ReplacementIndex,
}

impl ReplacementCatalog {
    /// Validate every pattern and index groups by clip segment.
    pub fn build(collections: Vec<SoundReplacementCollection>) -> Result<Self, CatalogError> {
        let mut index = ReplacementIndex::default();

        for (c, collection) in collections.iter().enumerate() {
            for (g, group) in collection.replacements.iter().enumerate() {
                for pattern in &group.matches {
                    let clip = matcher::clip_segment(pattern).map_err(|source| {
                        CatalogError::MalformedPattern {
                            pattern: pattern.clone(),
                            path: collection.relative_path().to_string(),
                            source,
                        }
                    })?;
                    index.insert(
                        clip,
                        GroupId {
                            collection: c,
                            group: g,
                        },
                    );
                }
            }
        }

        tracing::debug!(
            collections = collections.len(),
            clips = index.clip_count(),
            "built replacement catalog"
        );

        Ok(Self { collections, index })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn index(&self) -> &ReplacementIndex {
        &self.index
    }

    pub fn collections(&self) -> &[SoundReplacementCollection] {
        &self.collections
    }

    pub fn collection(&self, id: GroupId) -> Option<&SoundReplacementCollection> {
        self.collections.get(id.collection)
    }

    pub fn group(&self, id: GroupId) -> Option<&SoundReplacementGroup> {
        self.collection(id)
            .and_then(|collection| collection.replacements.get(id.group))
    }

    /// Distinct pack names, in load order.
    pub fn pack_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for collection in &self.collections {
            if !names.contains(&collection.pack_name) {
                names.push(collection.pack_name.clone());
            }
        }
        names
    }
}
