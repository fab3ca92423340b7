//! Common test utilities: an in-memory audio host and engine builders.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::io;
use std::sync::{Arc, Mutex};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::fmt::MakeWriter;

use soundswap::{
    AudioClip, AudioHost, EngineSettings, ObjectId, ParentInfo, ReplacementCatalog,
    ResolutionEngine, ScopeId, SoundReplacementCollection, SourceInfo,
};

/// Something the engine asked the host to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    SetClip(ObjectId, AudioClip),
    Stop(ObjectId),
    Play(ObjectId),
}

/// Audio objects held in a map, with every engine call logged.
#[derive(Debug, Default)]
pub struct FakeHost {
    sources: BTreeMap<ObjectId, SourceInfo>,
    pub events: Vec<HostEvent>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: u64, source: SourceInfo) -> ObjectId {
        let id = ObjectId(id);
        self.sources.insert(id, source);
        id
    }

    pub fn get_mut(&mut self, id: ObjectId) -> &mut SourceInfo {
        self.sources.get_mut(&id).expect("unknown test object")
    }

    pub fn clip_of(&self, id: ObjectId) -> Option<AudioClip> {
        self.sources.get(&id).and_then(|s| s.clip.clone())
    }

    pub fn remove(&mut self, id: ObjectId) {
        self.sources.remove(&id);
    }

    pub fn take_events(&mut self) -> Vec<HostEvent> {
        std::mem::take(&mut self.events)
    }
}

impl AudioHost for FakeHost {
    fn source(&self, id: ObjectId) -> Option<SourceInfo> {
        self.sources.get(&id).cloned()
    }

    fn sources(&self) -> Vec<ObjectId> {
        self.sources.keys().copied().collect()
    }

    fn set_playing_clip(&mut self, id: ObjectId, clip: AudioClip) {
        if let Some(source) = self.sources.get_mut(&id) {
            source.clip = Some(clip.clone());
        }
        self.events.push(HostEvent::SetClip(id, clip));
    }

    fn stop(&mut self, id: ObjectId) {
        self.events.push(HostEvent::Stop(id));
    }

    fn play(&mut self, id: ObjectId) {
        self.events.push(HostEvent::Play(id));
    }
}

/// A rootless, enabled source in scope 0 that does not play on awake.
pub fn source(name: &str, clip: Option<AudioClip>) -> SourceInfo {
    SourceInfo {
        name: name.to_string(),
        parent: None,
        clip,
        play_on_awake: false,
        looping: false,
        enabled: true,
        scope: ScopeId(0),
    }
}

pub fn with_parent(mut source: SourceInfo, id: u64, name: &str) -> SourceInfo {
    source.parent = Some(ParentInfo {
        id: ObjectId(id),
        name: name.to_string(),
    });
    source
}

pub fn on_awake(mut source: SourceInfo, scope: u32) -> SourceInfo {
    source.play_on_awake = true;
    source.scope = ScopeId(scope);
    source
}

pub fn creak() -> AudioClip {
    AudioClip::new(1, "Creak")
}

pub fn engine(collections: Vec<SoundReplacementCollection>) -> ResolutionEngine<ChaCha8Rng> {
    engine_with(collections, EngineSettings::default())
}

pub fn engine_with(
    collections: Vec<SoundReplacementCollection>,
    settings: EngineSettings,
) -> ResolutionEngine<ChaCha8Rng> {
    let catalog = ReplacementCatalog::build(collections).expect("test catalog should build");
    ResolutionEngine::with_rng(Arc::new(catalog), settings, ChaCha8Rng::seed_from_u64(7))
}

/// Shared buffer a fmt subscriber writes into.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run `f` with a thread-local subscriber and return what it logged.
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let capture = LogCapture::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(capture.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, capture.contents())
}
