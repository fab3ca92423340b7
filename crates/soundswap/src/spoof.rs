//! Clip-property spoofing: callers keep seeing the clip they assigned, and
//! reassigning that same clip does not restart playback.
//!
//! Some hosts write the clip property every update with the clip they
//! believe is set. Once that clip has been substituted, letting each write
//! through would restart the audio every frame.

use crate::catalog::AudioClip;
use crate::state::ObjectReplacementState;

/// Outcome of a clip-property write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignDecision {
    /// Let the write reach the host.
    Apply,
    /// Drop the write: it repeats the clip already assigned.
    Suppress,
}

/// Global switch plus the internal bypass used during engine writes.
#[derive(Debug, Clone, Copy)]
pub struct ClipSpoofing {
    enabled: bool,
    bypass: bool,
}

impl ClipSpoofing {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            bypass: false,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn bypassed(&self) -> bool {
        self.bypass
    }

    pub(crate) fn set_bypass(&mut self, bypass: bool) {
        self.bypass = bypass;
    }

    fn active(&self) -> bool {
        self.enabled && !self.bypass
    }

    /// Handle a write of `value` to the object's clip property.
    ///
    /// Writes made under the bypass are the engine installing a substitute;
    /// they pass through without touching `original_clip`.
    pub fn on_assign(
        &self,
        state: &mut ObjectReplacementState,
        value: Option<&AudioClip>,
    ) -> AssignDecision {
        if self.bypass {
            return AssignDecision::Apply;
        }

        if self.enabled && same_clip(state.original_clip.as_ref(), value) {
            return AssignDecision::Suppress;
        }

        state.original_clip = value.cloned();
        AssignDecision::Apply
    }

    /// Handle a read of the clip property, given what the host actually holds.
    pub fn on_read(
        &self,
        state: &ObjectReplacementState,
        actual: Option<AudioClip>,
    ) -> Option<AudioClip> {
        if !self.active() {
            return actual;
        }
        state.original_clip.clone()
    }
}

fn same_clip(a: Option<&AudioClip>, b: Option<&AudioClip>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.same_clip(b),
        (None, None) => true,
        _ => false,
    }
}
