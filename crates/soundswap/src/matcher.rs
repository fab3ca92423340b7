//! `ancestor:object:clip` pattern matching.
//!
//! The first two segments accept `*`; the clip segment is always literal.

use thiserror::Error;

use crate::catalog::SoundReplacementGroup;
use crate::identity::{NormalizedIdentity, WILDCARD};

const SEGMENTS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("expected 3 ':'-separated segments, found {0}")]
    SegmentCount(usize),

    #[error("the clip segment cannot be a wildcard")]
    WildcardClip,
}

/// Split a pattern into its three segments.
fn segments(pattern: &str) -> Result<[&str; SEGMENTS], PatternError> {
    let parts: Vec<&str> = pattern.split(':').collect();
    match parts.as_slice() {
        [ancestor, object, clip] => Ok([ancestor, object, clip]),
        _ => Err(PatternError::SegmentCount(parts.len())),
    }
}

/// The clip segment of a well-formed pattern, used as the index key.
pub fn clip_segment(pattern: &str) -> Result<&str, PatternError> {
    let [_, _, clip] = segments(pattern)?;
    if clip == WILDCARD {
        return Err(PatternError::WildcardClip);
    }
    Ok(clip)
}

fn segment_matches(expected: &str, actual: &str) -> bool {
    expected == WILDCARD || expected == actual
}

/// Whether `pattern` matches `identity`. Malformed patterns never match.
pub fn matches(identity: &NormalizedIdentity, pattern: &str) -> bool {
    let Ok([ancestor, object, clip]) = segments(pattern) else {
        return false;
    };

    segment_matches(ancestor, &identity.ancestor)
        && segment_matches(object, &identity.object)
        && clip == identity.clip
}

/// A group matches if any one of its patterns does.
pub fn group_matches(group: &SoundReplacementGroup, identity: &NormalizedIdentity) -> bool {
    group.matches.iter().any(|pattern| matches(identity, pattern))
}
