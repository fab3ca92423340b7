//! soundswap - audio clip replacement resolution
//!
//! Given a request to play a clip on an audio object, decide which clip is
//! actually heard. Replacement rules come from loaded sound packs as
//! [`SoundReplacementCollection`]s; the engine matches them against the
//! object's `ancestor:object:clip` identity, filters by conditions, and draws
//! a replacement at random.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use soundswap::{EngineSettings, ReplacementCatalog, ResolutionEngine};
//!
//! let config = soundswap_conf::SwapConfig::load().expect("config");
//! soundswap::telemetry::init(&config.telemetry);
//!
//! let catalog = ReplacementCatalog::build(Vec::new()).expect("catalog");
//! let engine = ResolutionEngine::new(Arc::new(catalog), EngineSettings::from(&config));
//! # drop(engine);
//! ```

pub mod catalog;
pub mod condition;
pub mod engine;
pub mod host;
pub mod identity;
pub mod matcher;
pub mod report;
pub mod selector;
pub mod spoof;
pub mod state;
pub mod telemetry;

pub use catalog::{
    AudioClip, CatalogError, ClipHandle, GroupId, ReplacementCatalog, ReplacementIndex,
    SoundInstance, SoundReplacementCollection, SoundReplacementGroup,
};
pub use condition::{CompareOp, Condition, ConditionContext, Conditional, ContextValue};
pub use engine::{
    EngineSettings, OneShotDecision, PlayDecision, Replacement, ResolutionEngine, ResolveRequest,
    ScopeReloadSummary,
};
pub use host::{AudioHost, ParentInfo, ScopeId, SourceInfo};
pub use identity::{IdentityCache, NormalizedIdentity};
pub use report::{PlayedSound, SoundReport};
pub use selector::WeightDraw;
pub use spoof::AssignDecision;
pub use state::{ObjectId, ObjectReplacementState};
