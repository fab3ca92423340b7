//! Per-object replacement state, stored in an arena keyed by object id.

use std::collections::HashMap;
use std::fmt;

use crate::catalog::{AudioClip, GroupId};
use crate::condition::ConditionContext;

/// Stable host-assigned identity of an audio-emitting object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "object#{}", self.0)
    }
}

/// The group currently supplying an object's substitutions.
///
/// Collection flags are copied at selection time so the record stays
/// meaningful after the catalog snapshot is swapped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveReplacement {
    pub group: GroupId,
    pub update_every_frame: bool,
}

/// What the engine tracks for one object.
#[derive(Debug, Clone, Default)]
pub struct ObjectReplacementState {
    /// The last clip the caller assigned. Never a substituted clip.
    pub original_clip: Option<AudioClip>,
    pub active_replacement: Option<ActiveReplacement>,
    /// Set by other subsystems to opt this object out entirely.
    pub replacing_disabled: bool,
    /// Evaluation context used instead of the engine default.
    pub context_override: Option<ConditionContext>,
}

impl ObjectReplacementState {
    /// Whether the continuous-update path owns this object.
    pub fn owned_by_frame_updates(&self) -> bool {
        self.active_replacement
            .as_ref()
            .is_some_and(|active| active.update_every_frame)
    }
}

/// Arena of per-object state, created lazily and dropped with the object.
#[derive(Debug, Default)]
pub struct ObjectStates {
    states: HashMap<ObjectId, ObjectReplacementState>,
}

impl ObjectStates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: ObjectId) -> Option<&ObjectReplacementState> {
        self.states.get(&id)
    }

    pub fn get_or_create(&mut self, id: ObjectId) -> &mut ObjectReplacementState {
        self.states.entry(id).or_default()
    }

    /// Forget an object the host has destroyed.
    pub fn remove(&mut self, id: ObjectId) -> Option<ObjectReplacementState> {
        self.states.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
