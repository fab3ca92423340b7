//! Normalized object identities and the per-scope name cache.

use std::collections::HashMap;
use std::fmt;

use soundswap_conf::NamesConfig;

use crate::state::ObjectId;

/// Token used for the ancestor slot when an object has no parent.
pub const WILDCARD: &str = "*";

/// The `(ancestor, object, clip)` triple that patterns are matched against.
///
/// Built fresh for every request. Displays as the `ancestor:object:clip`
/// match string that pack authors write.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedIdentity {
    pub ancestor: String,
    pub object: String,
    pub clip: String,
}

impl NormalizedIdentity {
    pub fn new(
        ancestor: impl Into<String>,
        object: impl Into<String>,
        clip: impl Into<String>,
    ) -> Self {
        Self {
            ancestor: ancestor.into(),
            object: object.into(),
            clip: clip.into(),
        }
    }
}

impl fmt::Display for NormalizedIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.ancestor, self.object, self.clip)
    }
}

/// Memoizes normalized object names, keyed by object.
///
/// Entries never expire on their own. The owner must call [`clear`] when the
/// host reloads its scope, since object ids may be reused and renamed
/// objects would otherwise keep their stale names.
///
/// [`clear`]: IdentityCache::clear
#[derive(Debug, Clone)]
pub struct IdentityCache {
    strip_suffixes: Vec<String>,
    names: HashMap<ObjectId, String>,
}

impl Default for IdentityCache {
    fn default() -> Self {
        Self::from_config(&NamesConfig::default())
    }
}

impl IdentityCache {
    pub fn new(strip_suffixes: Vec<String>) -> Self {
        Self {
            strip_suffixes,
            names: HashMap::new(),
        }
    }

    pub fn from_config(config: &NamesConfig) -> Self {
        Self::new(config.strip_suffixes.clone())
    }

    /// Normalized name for `object`, computing and caching it on first use.
    pub fn name_for(&mut self, object: ObjectId, raw_name: &str) -> &str {
        let suffixes = &self.strip_suffixes;
        self.names
            .entry(object)
            .or_insert_with(|| normalize_with(raw_name, suffixes))
    }

    /// Normalize a raw name without touching the cache.
    pub fn normalize(&self, raw_name: &str) -> String {
        normalize_with(raw_name, &self.strip_suffixes)
    }

    /// Drop every cached name.
    pub fn clear(&mut self) {
        self.names.clear();
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Strip configured suffixes, then every `(digits)` group, then trailing spaces.
fn normalize_with(raw_name: &str, strip_suffixes: &[String]) -> String {
    let mut name = raw_name.to_string();
    for suffix in strip_suffixes.iter().filter(|s| !s.is_empty()) {
        name = name.replace(suffix.as_str(), "");
    }

    let mut chars: Vec<char> = name.chars().collect();
    let mut i = 0usize;
    while i < chars.len() {
        if chars[i] != '(' {
            i += 1;
            continue;
        }
        let start = i;
        i += 1;
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
        if i >= chars.len() || chars[i] != ')' {
            // the character that broke the run is skipped, not rescanned
            i += 1;
            continue;
        }
        chars.drain(start..=i);
        // rescan from the removal point so adjacent groups collapse
        i = start;
    }

    let end = chars
        .iter()
        .rposition(|c| *c != ' ')
        .map(|pos| pos + 1)
        .unwrap_or(0);
    chars.truncate(end);

    chars.into_iter().collect()
}
