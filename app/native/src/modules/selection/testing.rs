//! Scene and loader doubles shared by the selection unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;
use parking_lot::Mutex;

use super::effects::{LoadError, Material, Resource, ResourceLoader, SceneSurface, VisualHandle};
use super::state::{Item, ItemId, Vec3};
use crate::modules::deck::Deck;

/// The first `count` cards of the built-in deck, upright, in deck order.
pub fn items(count: usize) -> Vec<Item> {
    Deck::builtin().cards().iter().take(count).map(|card| Item::new(card.clone(), false)).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualKind {
    Card(ItemId),
    Particles(usize),
}

#[derive(Debug, Clone)]
pub struct VisualRecord {
    pub kind: VisualKind,
    pub position: Option<Vec3>,
    pub opacity: f64,
    pub visible: bool,
    pub material: Material,
    pub particle_frames: usize,
}

#[derive(Debug, Default)]
struct SceneState {
    live: HashMap<VisualHandle, VisualRecord>,
    disposed: Vec<VisualHandle>,
    /// Mutations addressed to a disposed or unknown handle.
    stray: usize,
}

/// Scene that records every mutation.
#[derive(Debug, Default)]
pub struct RecordingScene {
    next: AtomicU64,
    state: Mutex<SceneState>,
}

impl RecordingScene {
    fn create(&self, kind: VisualKind) -> VisualHandle {
        let handle = VisualHandle(self.next.fetch_add(1, Ordering::Relaxed));
        self.state.lock().live.insert(handle, VisualRecord {
            kind,
            position: None,
            opacity: 1.0,
            visible: false,
            material: Material::CardBack,
            particle_frames: 0,
        });
        handle
    }

    fn update(&self, handle: VisualHandle, apply: impl FnOnce(&mut VisualRecord)) {
        let mut state = self.state.lock();
        match state.live.get_mut(&handle) {
            Some(record) => apply(record),
            None => state.stray += 1,
        }
    }

    pub fn live_cards(&self) -> usize {
        self.state
            .lock()
            .live
            .values()
            .filter(|record| matches!(record.kind, VisualKind::Card(_)))
            .count()
    }

    pub fn visible_cards(&self) -> usize {
        self.state
            .lock()
            .live
            .values()
            .filter(|record| matches!(record.kind, VisualKind::Card(_)) && record.visible)
            .count()
    }

    pub fn live_particles(&self) -> usize {
        self.state
            .lock()
            .live
            .values()
            .filter(|record| matches!(record.kind, VisualKind::Particles(_)))
            .count()
    }

    /// Live particle clouds.
    pub fn particles(&self) -> Vec<VisualRecord> {
        self.state
            .lock()
            .live
            .values()
            .filter(|record| matches!(record.kind, VisualKind::Particles(_)))
            .cloned()
            .collect()
    }

    pub fn disposed_count(&self) -> usize { self.state.lock().disposed.len() }

    pub fn stray_mutations(&self) -> usize { self.state.lock().stray }

    /// Live card visuals showing `id`, in creation order.
    pub fn cards_for(&self, id: ItemId) -> Vec<VisualRecord> {
        let state = self.state.lock();
        let mut handles: Vec<_> = state
            .live
            .iter()
            .filter(|(_, record)| record.kind == VisualKind::Card(id))
            .map(|(handle, _)| *handle)
            .collect();
        handles.sort();
        handles.into_iter().map(|handle| state.live[&handle].clone()).collect()
    }
}

impl SceneSurface for RecordingScene {
    fn create_card(&self, item: &Item) -> VisualHandle { self.create(VisualKind::Card(item.id)) }

    fn create_particles(&self, count: usize) -> VisualHandle {
        self.create(VisualKind::Particles(count))
    }

    fn set_position(&self, handle: VisualHandle, position: Vec3) {
        self.update(handle, |record| record.position = Some(position));
    }

    fn set_particle_positions(&self, handle: VisualHandle, _positions: &[Vec3]) {
        self.update(handle, |record| record.particle_frames += 1);
    }

    fn set_opacity(&self, handle: VisualHandle, opacity: f64) {
        self.update(handle, |record| record.opacity = opacity);
    }

    fn set_visible(&self, handle: VisualHandle, visible: bool) {
        self.update(handle, |record| record.visible = visible);
    }

    fn swap_material(&self, handle: VisualHandle, material: Material) {
        self.update(handle, |record| record.material = material);
    }

    fn dispose(&self, handle: VisualHandle) {
        let mut state = self.state.lock();
        if state.live.remove(&handle).is_some() {
            state.disposed.push(handle);
        } else {
            state.stray += 1;
        }
    }
}

/// Loader whose latency and outcome are scripted per URI.
#[derive(Debug)]
pub struct ScriptedLoader {
    default_delay: Duration,
    scripts: Mutex<HashMap<String, (Duration, Result<(), LoadError>)>>,
}

impl ScriptedLoader {
    pub fn new(default_delay: Duration) -> Self {
        Self { default_delay, scripts: Mutex::new(HashMap::new()) }
    }

    /// Scripts the load of any URI ending in `suffix`.
    pub fn script(&self, suffix: &str, delay: Duration, outcome: Result<(), LoadError>) {
        self.scripts.lock().insert(suffix.to_string(), (delay, outcome));
    }
}

impl ResourceLoader for ScriptedLoader {
    fn load(&self, uri: &str) -> BoxFuture<'static, Result<Resource, LoadError>> {
        let (delay, outcome) = self
            .scripts
            .lock()
            .iter()
            .find(|(suffix, _)| uri.ends_with(suffix.as_str()))
            .map_or((self.default_delay, Ok(())), |(_, script)| script.clone());

        let uri = uri.to_string();
        async move {
            tokio::time::sleep(delay).await;
            outcome.map(|()| Resource::new(uri, vec![0u8; 4]))
        }
        .boxed()
    }
}
