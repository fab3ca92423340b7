//! The resolution engine: decides which clip an object should really play.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use soundswap_conf::{DebugConfig, SwapConfig};
use tracing::{debug, warn};

use crate::catalog::{AudioClip, GroupId, ReplacementCatalog, SoundInstance};
use crate::condition::{ConditionContext, Conditional};
use crate::host::{AudioHost, ScopeId};
use crate::identity::{IdentityCache, NormalizedIdentity, WILDCARD};
use crate::matcher;
use crate::report::{PlayedSound, SoundReport, UNKNOWN_CALLER};
use crate::selector::{self, WeightDraw};
use crate::spoof::{AssignDecision, ClipSpoofing};
use crate::state::{ActiveReplacement, ObjectId, ObjectReplacementState, ObjectStates};

/// Caller recorded for sources restarted by a scope reload.
pub const SCOPE_RELOAD_CALLER: &str = "scope reload";

/// A point-in-time request for a replacement.
#[derive(Debug, Clone, Copy)]
pub struct ResolveRequest<'a> {
    pub object: ObjectId,
    pub clip: Option<&'a AudioClip>,
    /// Fire-and-forget playback rather than a persistent assignment.
    pub one_shot: bool,
    /// Name of the code asking, for reports.
    pub caller: Option<&'a str>,
}

/// What a successful resolution substitutes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Replacement {
    /// Play this clip instead. It carries the requested clip's name.
    Clip(AudioClip),
    /// The chosen sound is silence.
    Mute,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayDecision {
    Proceed,
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OneShotDecision {
    /// Play the clip that was passed in.
    Unchanged,
    Replace(AudioClip),
    Skip,
}

/// Counts from one scope reload pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScopeReloadSummary {
    /// Enabled play-on-awake sources in the scope.
    pub visited: usize,
    pub restarted: usize,
    pub muted: usize,
}

/// Engine knobs derived from [`SwapConfig`].
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub audio_clip_spoofing: bool,
    pub weight_draw: WeightDraw,
    pub strip_suffixes: Vec<String>,
    pub debug: DebugConfig,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from(&SwapConfig::default())
    }
}

impl From<&SwapConfig> for EngineSettings {
    fn from(config: &SwapConfig) -> Self {
        Self {
            audio_clip_spoofing: config.patches.audio_clip_spoofing,
            weight_draw: if config.patches.legacy_weight_draw {
                WeightDraw::LegacyInclusive
            } else {
                WeightDraw::Proportional
            },
            strip_suffixes: config.names.strip_suffixes.clone(),
            debug: config.debug.clone(),
        }
    }
}

/// Resolves replacement clips for audio objects.
///
/// Single-threaded: every entry point takes `&mut self` and completes before
/// the next begins. The name cache is cleared on every scope reload.
pub struct ResolutionEngine<R = StdRng> {
    catalog: Arc<ReplacementCatalog>,
    names: IdentityCache,
    states: ObjectStates,
    spoofing: ClipSpoofing,
    weight_draw: WeightDraw,
    debug: DebugConfig,
    default_context: ConditionContext,
    report: Option<SoundReport>,
    rng: R,
}

impl ResolutionEngine<StdRng> {
    pub fn new(catalog: Arc<ReplacementCatalog>, settings: EngineSettings) -> Self {
        Self::with_rng(catalog, settings, StdRng::from_entropy())
    }
}

impl<R: Rng> ResolutionEngine<R> {
    /// Build with a caller-supplied RNG, e.g. a seeded one for replays.
    pub fn with_rng(catalog: Arc<ReplacementCatalog>, settings: EngineSettings, rng: R) -> Self {
        Self {
            catalog,
            names: IdentityCache::new(settings.strip_suffixes),
            states: ObjectStates::new(),
            spoofing: ClipSpoofing::new(settings.audio_clip_spoofing),
            weight_draw: settings.weight_draw,
            debug: settings.debug,
            default_context: ConditionContext::new(),
            report: None,
            rng,
        }
    }

    pub fn catalog(&self) -> &Arc<ReplacementCatalog> {
        &self.catalog
    }

    /// Swap in a freshly loaded catalog.
    ///
    /// Active replacements keep pointing at groups of the old snapshot;
    /// only their copied flags are consulted afterwards.
    pub fn replace_catalog(&mut self, catalog: Arc<ReplacementCatalog>) {
        self.catalog = catalog;
        if let Some(report) = self.report.as_mut() {
            report.sound_pack_names = self.catalog.pack_names();
        }
    }

    pub fn state(&self, object: ObjectId) -> Option<&ObjectReplacementState> {
        self.states.get(object)
    }

    pub fn default_context(&self) -> &ConditionContext {
        &self.default_context
    }

    pub fn default_context_mut(&mut self) -> &mut ConditionContext {
        &mut self.default_context
    }

    /// Opt an object in or out of replacement.
    pub fn set_replacing_disabled(&mut self, object: ObjectId, disabled: bool) {
        self.states.get_or_create(object).replacing_disabled = disabled;
    }

    /// Evaluate this object's conditions against `context` instead of the default.
    pub fn set_context_override(&mut self, object: ObjectId, context: Option<ConditionContext>) {
        self.states.get_or_create(object).context_override = context;
    }

    /// Drop all state for an object the host destroyed.
    pub fn forget(&mut self, object: ObjectId) {
        self.states.remove(object);
    }

    pub fn spoofing_enabled(&self) -> bool {
        self.spoofing.enabled()
    }

    pub fn set_spoofing_enabled(&mut self, enabled: bool) {
        self.spoofing.set_enabled(enabled);
    }

    /// Run `f` with clip spoofing bypassed.
    ///
    /// Host shims wrap their own writes of a substituted clip in this so the
    /// write is neither suppressed nor recorded as the original clip.
    pub fn with_spoofing_bypassed<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let previous = self.spoofing.bypassed();
        self.spoofing.set_bypass(true);
        let result = f(self);
        self.spoofing.set_bypass(previous);
        result
    }

    /// Start recording played sounds into a fresh report.
    pub fn start_report(&mut self) {
        let mut report = SoundReport::new();
        report.sound_pack_names = self.catalog.pack_names();
        report.audio_clips_loaded = self
            .catalog
            .collections()
            .iter()
            .flat_map(|c| &c.replacements)
            .flat_map(|g| &g.sounds)
            .filter(|s| s.clip.is_some())
            .count();
        self.report = Some(report);
    }

    pub fn report(&self) -> Option<&SoundReport> {
        self.report.as_ref()
    }

    /// Stop recording and hand back the report.
    pub fn take_report(&mut self) -> Option<SoundReport> {
        self.report.take()
    }

    /// Decide whether `request.clip` should be substituted for `request.object`.
    ///
    /// `None` means "no replacement": the caller plays what it asked for.
    pub fn resolve<H: AudioHost + ?Sized>(
        &mut self,
        host: &H,
        request: ResolveRequest<'_>,
    ) -> Option<Replacement> {
        let Some(info) = host.source(request.object) else {
            self.trace(format_args!("{} has no backing object", request.object));
            return None;
        };

        let state = self.states.get_or_create(request.object);
        if state.owned_by_frame_updates() {
            // the continuous-update path owns this object
            return None;
        }
        if state.replacing_disabled {
            return None;
        }
        let clip = request.clip.filter(|clip| !clip.name.is_empty())?;

        let ancestor = match &info.parent {
            Some(parent) => self.names.name_for(parent.id, &parent.name).to_string(),
            None => WILDCARD.to_string(),
        };
        let object = self.names.name_for(request.object, &info.name).to_string();
        let identity = NormalizedIdentity::new(ancestor, object, clip.name.clone());

        if let Some(report) = self.report.as_mut() {
            report.record(PlayedSound {
                match_string: identity.to_string(),
                caller: request.caller.unwrap_or(UNKNOWN_CALLER).to_string(),
                is_play_on_awake: info.play_on_awake,
                is_looping: info.looping,
                is_one_shot: request.one_shot,
            });
        }
        if self.debug.match_strings {
            debug!(target: "soundswap::match_strings", "{identity}");
        }

        let context = state
            .context_override
            .as_ref()
            .unwrap_or(&self.default_context);
        let (group_id, sound) = select_replacement(
            &self.catalog,
            &identity,
            context,
            self.weight_draw,
            &mut self.rng,
            self.debug.replacement_handler,
        )?;

        let collection = self.catalog.collection(group_id)?;
        state.active_replacement = Some(ActiveReplacement {
            group: group_id,
            update_every_frame: collection.update_every_frame,
        });

        if request.one_shot && collection.update_every_frame {
            warn!(
                match_string = %identity,
                replacer = collection.relative_path(),
                pack = %collection.pack_name,
                "one-shot clip matched a replacer that updates every frame; playback may misbehave"
            );
        }
        if collection.update_every_frame && self.debug.update_every_frame {
            debug!(
                target: "soundswap::update_every_frame",
                object = %request.object,
                "swapped to a clip from an update_every_frame replacer"
            );
        }

        let replacement = match &sound.clip {
            Some(chosen) => Replacement::Clip(chosen.renamed(&clip.name)),
            None => Replacement::Mute,
        };
        self.trace(format_args!("{identity} resolved to {replacement:?}"));
        Some(replacement)
    }

    /// Forwarded from the host when an object starts playing its assigned clip.
    pub fn on_play<H: AudioHost + ?Sized>(
        &mut self,
        host: &mut H,
        object: ObjectId,
        caller: Option<&str>,
    ) -> PlayDecision {
        let original = self.original_clip(&*host, object);
        let request = ResolveRequest {
            object,
            clip: original.as_ref(),
            one_shot: false,
            caller,
        };

        match self.resolve(&*host, request) {
            Some(Replacement::Clip(clip)) => {
                host.set_playing_clip(object, clip);
                PlayDecision::Proceed
            }
            Some(Replacement::Mute) => PlayDecision::Skip,
            None => PlayDecision::Proceed,
        }
    }

    /// Forwarded from the host for fire-and-forget playback of `clip`.
    pub fn on_play_one_shot<H: AudioHost + ?Sized>(
        &mut self,
        host: &H,
        object: ObjectId,
        clip: Option<&AudioClip>,
        caller: Option<&str>,
    ) -> OneShotDecision {
        let request = ResolveRequest {
            object,
            clip,
            one_shot: true,
            caller,
        };

        match self.resolve(host, request) {
            Some(Replacement::Clip(replacement)) => OneShotDecision::Replace(replacement),
            Some(Replacement::Mute) => OneShotDecision::Skip,
            None => OneShotDecision::Unchanged,
        }
    }

    /// Forwarded from the host when something writes the clip property.
    pub fn on_clip_assign(&mut self, object: ObjectId, clip: Option<&AudioClip>) -> AssignDecision {
        let state = self.states.get_or_create(object);
        let decision = self.spoofing.on_assign(state, clip);

        if self.debug.audio_clip_spoofing {
            match decision {
                AssignDecision::Suppress => {
                    debug!(target: "soundswap::spoofing", %object, "prevented clip from restarting")
                }
                AssignDecision::Apply if !self.spoofing.bypassed() => debug!(
                    target: "soundswap::spoofing",
                    %object,
                    clip = clip.map(|c| c.name.as_str()).unwrap_or("<none>"),
                    "updating original clip"
                ),
                AssignDecision::Apply => {}
            }
        }
        decision
    }

    /// Forwarded from the host when something reads the clip property.
    ///
    /// `actual` is what the host holds; the return value is what the reader sees.
    pub fn on_clip_read(&mut self, object: ObjectId, actual: Option<AudioClip>) -> Option<AudioClip> {
        let state = self.states.get_or_create(object);
        if state.original_clip.is_none() {
            state.original_clip = actual.clone();
        }
        let seen = self.spoofing.on_read(state, actual);

        if self.debug.audio_clip_spoofing && self.spoofing.enabled() {
            debug!(
                target: "soundswap::spoofing",
                %object,
                clip = seen.as_ref().map(|c| c.name.as_str()).unwrap_or("<none>"),
                "spoofing clip read"
            );
        }
        seen
    }

    /// Clear the name cache and re-resolve every auto-playing source in `scope`.
    pub fn on_scope_loaded<H: AudioHost + ?Sized>(
        &mut self,
        host: &mut H,
        scope: ScopeId,
    ) -> ScopeReloadSummary {
        self.names.clear();
        let mut summary = ScopeReloadSummary::default();

        for object in host.sources() {
            let Some(info) = host.source(object) else {
                continue;
            };
            // sources from scopes loaded earlier were handled then
            if info.scope != scope || !info.play_on_awake || !info.enabled {
                continue;
            }
            summary.visited += 1;

            let original = self.original_clip(&*host, object);
            let request = ResolveRequest {
                object,
                clip: original.as_ref(),
                one_shot: false,
                caller: Some(SCOPE_RELOAD_CALLER),
            };
            let Some(replacement) = self.resolve(&*host, request) else {
                continue;
            };

            host.stop(object);
            match replacement {
                Replacement::Mute => summary.muted += 1,
                Replacement::Clip(clip) => {
                    host.set_playing_clip(object, clip);
                    host.play(object);
                    summary.restarted += 1;
                }
            }

            if self.debug.scope_reload {
                debug!(target: "soundswap::scope_reload", %object, name = %info.name, "restarted with replacement");
            }
        }

        if self.debug.scope_reload {
            debug!(
                target: "soundswap::scope_reload",
                scope = scope.0,
                visited = summary.visited,
                restarted = summary.restarted,
                muted = summary.muted,
                "scope reload pass complete"
            );
        }
        summary
    }

    /// The caller-assigned clip, seeded from the host on first sight.
    fn original_clip<H: AudioHost + ?Sized>(&mut self, host: &H, object: ObjectId) -> Option<AudioClip> {
        let state = self.states.get_or_create(object);
        if state.original_clip.is_none() {
            state.original_clip = host.source(object).and_then(|info| info.clip);
        }
        state.original_clip.clone()
    }

    fn trace(&self, message: std::fmt::Arguments<'_>) {
        if self.debug.replacement_handler {
            debug!(target: "soundswap::replacement", "{message}");
        }
    }
}

/// Index lookup, condition and pattern filtering, then the two random picks.
///
/// Once a group is chosen there is no fallback: if none of its sounds pass
/// their conditions the whole resolution fails, even when a sibling group
/// would have had eligible sounds.
fn select_replacement<'c, R: Rng + ?Sized>(
    catalog: &'c ReplacementCatalog,
    identity: &NormalizedIdentity,
    context: &ConditionContext,
    draw: WeightDraw,
    rng: &mut R,
    trace: bool,
) -> Option<(GroupId, &'c SoundInstance)> {
    let candidates = catalog.index().candidates(&identity.clip);
    if candidates.is_empty() {
        return None;
    }
    if trace {
        debug!(target: "soundswap::replacement", clip = %identity.clip, candidates = candidates.len(), "index hit");
    }

    let eligible: Vec<GroupId> = candidates
        .iter()
        .copied()
        .filter(|&id| {
            match (catalog.collection(id), catalog.group(id)) {
                (Some(collection), Some(group)) => {
                    collection.evaluate(context)
                        && group.evaluate(context)
                        && matcher::group_matches(group, identity)
                }
                _ => false,
            }
        })
        .collect();

    let group_id = *selector::pick_uniform(&eligible, rng)?;
    let group = catalog.group(group_id)?;
    if trace {
        debug!(
            target: "soundswap::replacement",
            eligible = eligible.len(),
            matches = %group.matches.join(", "),
            "picked group"
        );
    }

    let sounds: Vec<&SoundInstance> = group.sounds.iter().filter(|s| s.evaluate(context)).collect();
    if sounds.is_empty() {
        if trace {
            debug!(target: "soundswap::replacement", "picked group has no eligible sounds");
        }
        return None;
    }

    let sound = *selector::pick_weighted(&sounds, draw, rng)?;
    Some((group_id, sound))
}
