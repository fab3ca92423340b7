//! The seam between the engine and whatever runtime owns the audio objects.

use crate::catalog::AudioClip;
use crate::state::ObjectId;

/// Host-side identifier for a loaded scope (level, scene, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(pub u32);

/// The parent of an audio object in the host's ownership hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentInfo {
    pub id: ObjectId,
    pub name: String,
}

/// A snapshot of one audio-emitting object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceInfo {
    pub name: String,
    pub parent: Option<ParentInfo>,
    /// Clip the host currently holds, which may already be a substitute.
    pub clip: Option<AudioClip>,
    pub play_on_awake: bool,
    pub looping: bool,
    pub enabled: bool,
    pub scope: ScopeId,
}

/// Operations the engine needs from the host.
pub trait AudioHost {
    /// Describe `id`, or `None` if the object is gone.
    fn source(&self, id: ObjectId) -> Option<SourceInfo>;

    /// Every audio object the host knows about, including inactive ones.
    fn sources(&self) -> Vec<ObjectId>;

    /// Install the clip that will actually be heard. Not a caller assignment.
    fn set_playing_clip(&mut self, id: ObjectId, clip: AudioClip);

    fn stop(&mut self, id: ObjectId);

    fn play(&mut self, id: ObjectId);
}
