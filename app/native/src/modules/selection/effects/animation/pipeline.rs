//! The pick animation pipeline.
//!
//! Each pick runs as one tokio task that walks through converge, reveal and
//! dock in order. The task owns nothing the session owns; it only mutates the
//! visuals staged for its own generation, and every mutation happens under
//! the stage lock after checking that its generation is still current. A
//! cancelled or superseded run therefore cannot draw on top of a newer one,
//! however late its timers or artwork load complete.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::easing::apply_easing;
use super::generation::{Generation, GenerationCounter};
use super::particles::ParticleField;
use crate::config::AnimationConfig;
use crate::modules::selection::effects::{
    LoadError, Material, PickAnimator, Resource, ResourceLoader, SceneSurface, VisualHandle,
};
use crate::modules::selection::state::{Item, ItemId};

/// Channel buffer size for pipeline events.
const EVENT_BUFFER_SIZE: usize = 64;

/// Notifications sent back to the session owner.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    /// The card of `generation` reached its slot.
    Docked {
        generation: Generation,
        item: Item,
        slot: usize,
        /// The fallback artwork was shown because loading failed.
        degraded: bool,
    },

    /// The particles of a cancelled pick finished scattering.
    Dispersed { generation: Generation },
}

/// A phase resumed after its generation was superseded.
///
/// This is the expected outcome of cancellation, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaleGeneration(pub Generation);

/// Visuals staged for the in-flight pick.
#[derive(Debug)]
struct Stage {
    generation: Generation,
    item: ItemId,
    particles: Option<VisualHandle>,
    field: ParticleField,
    card: VisualHandle,
}

/// State shared between the pipeline handle and its tasks.
struct Shared {
    scene: Arc<dyn SceneSurface>,
    loader: Arc<dyn ResourceLoader>,
    settings: AnimationConfig,
    image_base_url: String,
    generations: GenerationCounter,
    stage: Mutex<Option<Stage>>,
    docked: Mutex<Vec<VisualHandle>>,
    events: mpsc::Sender<PipelineEvent>,
}

impl Shared {
    fn frame(&self) -> Duration { Duration::from_millis(self.settings.frame_ms.max(1)) }

    /// Runs `apply` on the stage if `generation` still owns it.
    fn with_stage<T>(
        &self,
        generation: Generation,
        apply: impl FnOnce(&mut Stage, &dyn SceneSurface) -> T,
    ) -> Result<T, StaleGeneration> {
        let mut guard = self.stage.lock();
        match guard.as_mut() {
            Some(stage)
                if stage.generation == generation && self.generations.is_current(generation) =>
            {
                Ok(apply(stage, self.scene.as_ref()))
            }
            _ => Err(StaleGeneration(generation)),
        }
    }

    /// Takes the stage out if `generation` still owns it.
    fn take_stage(&self, generation: Generation) -> Option<Stage> {
        let mut guard = self.stage.lock();
        if guard.as_ref().is_some_and(|stage| stage.generation == generation) {
            guard.take()
        } else {
            None
        }
    }

    /// Disposes whatever `generation` still has staged.
    fn release(&self, generation: Generation) {
        if let Some(stage) = self.take_stage(generation) {
            self.dispose_stage(stage);
        }
        tracing::trace!(%generation, "stale pick animation released");
    }

    fn dispose_stage(&self, stage: Stage) {
        if let Some(particles) = stage.particles {
            self.scene.dispose(particles);
        }
        self.scene.dispose(stage.card);
    }

    async fn notify(&self, event: PipelineEvent) {
        if self.events.send(event).await.is_err() {
            tracing::debug!("pipeline event receiver dropped");
        }
    }
}

/// Drives the visual sequence of every pick.
pub struct AnimationPipeline {
    shared: Arc<Shared>,
    commit: Option<(Generation, oneshot::Sender<usize>)>,
    rng: StdRng,
}

impl AnimationPipeline {
    /// Creates a pipeline and the receiver for its events.
    #[must_use]
    pub fn new(
        scene: Arc<dyn SceneSurface>,
        loader: Arc<dyn ResourceLoader>,
        settings: AnimationConfig,
        image_base_url: impl Into<String>,
    ) -> (Self, mpsc::Receiver<PipelineEvent>) {
        let (events, receiver) = mpsc::channel(EVENT_BUFFER_SIZE);
        let shared = Arc::new(Shared {
            scene,
            loader,
            settings,
            image_base_url: image_base_url.into(),
            generations: GenerationCounter::new(),
            stage: Mutex::new(None),
            docked: Mutex::new(Vec::new()),
            events,
        });

        let pipeline = Self {
            shared,
            commit: None,
            rng: StdRng::from_rng(&mut rand::rng()),
        };
        (pipeline, receiver)
    }

    /// Uses a fixed seed for particle scattering.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Shared view of the generation counter.
    #[must_use]
    pub fn generations(&self) -> GenerationCounter { self.shared.generations.clone() }

    /// Whether a pick currently has visuals staged.
    #[must_use]
    pub fn is_staged(&self) -> bool { self.shared.stage.lock().is_some() }

    /// Number of cards resting in their slots.
    #[must_use]
    pub fn docked_count(&self) -> usize { self.shared.docked.lock().len() }

    /// Disposes a leftover stage from a superseded run.
    fn clear_stage(&self) {
        let leftover = self.shared.stage.lock().take();
        if let Some(stage) = leftover {
            tracing::debug!(generation = %stage.generation, "disposing superseded stage");
            self.shared.dispose_stage(stage);
        }
    }
}

impl PickAnimator for AnimationPipeline {
    /// Starts the converge phase for `item` under a fresh generation.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    fn converge(&mut self, item: &Item) -> Generation {
        self.commit = None;
        self.clear_stage();

        let generation = self.shared.generations.advance();
        let settings = &self.shared.settings;
        let scene = &self.shared.scene;

        let field = ParticleField::scatter(
            settings.particle_count,
            settings.staging,
            settings.scatter_radius,
            settings.particle_delay,
            &mut self.rng,
        );
        let particles = scene.create_particles(field.len());
        scene.set_particle_positions(particles, field.positions());
        scene.set_visible(particles, true);

        let card = scene.create_card(item);
        scene.set_position(card, settings.staging);

        *self.shared.stage.lock() = Some(Stage {
            generation,
            item: item.id,
            particles: Some(particles),
            field,
            card,
        });

        let (commit_tx, commit_rx) = oneshot::channel();
        self.commit = Some((generation, commit_tx));

        let uri = item.card.image_uri(&self.shared.image_base_url);
        tracing::debug!(item = %item.id, %generation, %uri, "pick animation started");
        tokio::spawn(run_pick(Arc::clone(&self.shared), generation, item.clone(), uri, commit_rx));

        generation
    }

    fn commit(&mut self, generation: Generation, slot: usize) -> bool {
        match self.commit.take() {
            Some((pending, sender))
                if pending == generation && self.shared.generations.is_current(generation) =>
            {
                sender.send(slot).is_ok()
            }
            other => {
                self.commit = other;
                false
            }
        }
    }

    fn disperse(&mut self) -> Generation {
        let generation = self.shared.generations.advance();
        self.commit = None;

        let staged = self.shared.stage.lock().take();
        let Some(stage) = staged else {
            tracing::trace!(%generation, "disperse with nothing staged");
            return generation;
        };

        self.shared.scene.dispose(stage.card);
        match stage.particles {
            Some(particles) => {
                tracing::debug!(item = %stage.item, %generation, "dispersing cancelled pick");
                tokio::spawn(run_disperse(
                    Arc::clone(&self.shared),
                    generation,
                    particles,
                    stage.field,
                ));
            }
            None => tracing::trace!(%generation, "cancelled pick had no particles left"),
        }

        generation
    }

    fn reset(&mut self) {
        self.shared.generations.advance();
        self.commit = None;
        self.clear_stage();

        let docked: Vec<_> = self.shared.docked.lock().drain(..).collect();
        for card in docked {
            self.shared.scene.dispose(card);
        }
    }

    fn current(&self) -> Generation { self.shared.generations.current() }
}

impl std::fmt::Debug for AnimationPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationPipeline")
            .field("generation", &self.shared.generations.current())
            .field("staged", &self.is_staged())
            .field("docked", &self.docked_count())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tasks
// ============================================================================

/// Steps a frame loop over `duration`, passing progress in `[0, 1]`.
async fn animate(
    frame: Duration,
    duration: Duration,
    mut step: impl FnMut(f64) -> Result<(), StaleGeneration>,
) -> Result<(), StaleGeneration> {
    let start = Instant::now();
    loop {
        tokio::time::sleep(frame).await;

        let progress = if duration.is_zero() {
            1.0
        } else {
            (start.elapsed().as_secs_f64() / duration.as_secs_f64()).min(1.0)
        };

        step(progress)?;
        if progress >= 1.0 {
            return Ok(());
        }
    }
}

async fn load_artwork(
    loader: Arc<dyn ResourceLoader>,
    uri: String,
    timeout: Duration,
) -> Result<Resource, LoadError> {
    tokio::time::timeout(timeout, loader.load(&uri)).await.map_err(|_| LoadError::Timeout(timeout))?
}

async fn run_pick(
    shared: Arc<Shared>,
    generation: Generation,
    item: Item,
    uri: String,
    commit: oneshot::Receiver<usize>,
) {
    let mut load: JoinHandle<Result<Resource, LoadError>> = tokio::spawn(load_artwork(
        Arc::clone(&shared.loader),
        uri,
        Duration::from_millis(shared.settings.load_timeout_ms),
    ));

    match pick_phases(&shared, generation, &item, &mut load, commit).await {
        Ok((slot, degraded)) => {
            tracing::debug!(item = %item.id, %generation, slot, degraded, "card docked");
            shared.notify(PipelineEvent::Docked { generation, item, slot, degraded }).await;
        }
        Err(StaleGeneration(stale)) => {
            load.abort();
            shared.release(stale);
        }
    }
}

/// Converge, reveal and dock. Returns the slot and whether the fallback was used.
async fn pick_phases(
    shared: &Shared,
    generation: Generation,
    item: &Item,
    load: &mut JoinHandle<Result<Resource, LoadError>>,
    commit: oneshot::Receiver<usize>,
) -> Result<(usize, bool), StaleGeneration> {
    let settings = &shared.settings;
    let frame = shared.frame();

    // Converge: particles gather at the staging point while the artwork loads.
    animate(frame, Duration::from_millis(settings.converge_ms), |progress| {
        shared.with_stage(generation, |stage, scene| {
            stage.field.converge(settings.staging, progress, settings.converge_easing);
            if let Some(particles) = stage.particles {
                scene.set_particle_positions(particles, stage.field.positions());
            }
        })
    })
    .await?;
    let slot = commit.await.map_err(|_| StaleGeneration(generation))?;

    // Reveal: fade the particles out, then swap in the artwork.
    animate(frame, Duration::from_millis(settings.fade_ms), |progress| {
        shared.with_stage(generation, |stage, scene| {
            if let Some(particles) = stage.particles {
                scene.set_opacity(particles, 1.0 - progress);
            }
        })
    })
    .await?;

    shared.with_stage(generation, |stage, scene| {
        if let Some(particles) = stage.particles.take() {
            scene.dispose(particles);
        }
    })?;

    let loaded = load.await.unwrap_or_else(|err| {
        tracing::debug!(item = %item.id, error = %err, "artwork task ended without a result");
        Err(LoadError::Aborted)
    });
    let (material, degraded) = match loaded {
        Ok(resource) => (Material::Artwork(resource), false),
        Err(err) => {
            tracing::warn!(item = %item.id, error = %err, "artwork unavailable, using fallback");
            (Material::Fallback, true)
        }
    };

    shared.with_stage(generation, |stage, scene| {
        scene.swap_material(stage.card, material);
        scene.set_position(stage.card, settings.staging);
        scene.set_opacity(stage.card, 1.0);
        scene.set_visible(stage.card, true);
    })?;

    tokio::time::sleep(Duration::from_millis(settings.reveal_hold_ms)).await;
    shared.with_stage(generation, |_, _| ())?;

    // Dock: fly the card into its slot.
    let target = settings.slot_position(slot);
    animate(frame, Duration::from_millis(settings.dock_ms), |progress| {
        shared.with_stage(generation, |stage, scene| {
            let t = apply_easing(progress, settings.dock_easing);
            scene.set_position(stage.card, settings.staging.lerp(target, t));
        })
    })
    .await?;

    let stage = shared.take_stage(generation).ok_or(StaleGeneration(generation))?;
    shared.docked.lock().push(stage.card);

    Ok((slot, degraded))
}

/// Scatters a cancelled pick's particles and disposes them.
///
/// The particles were handed over by the cancel, so no other run can touch
/// them and no generation check is needed.
async fn run_disperse(
    shared: Arc<Shared>,
    generation: Generation,
    particles: VisualHandle,
    mut field: ParticleField,
) {
    field.begin_disperse();
    let scene = Arc::clone(&shared.scene);

    let _ = animate(shared.frame(), Duration::from_millis(shared.settings.disperse_ms), |progress| {
        field.disperse(progress);
        scene.set_particle_positions(particles, field.positions());
        scene.set_opacity(particles, 1.0 - progress);
        Ok(())
    })
    .await;

    scene.dispose(particles);
    shared.notify(PipelineEvent::Dispersed { generation }).await;
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use futures::FutureExt;
    use futures::future::BoxFuture;

    use super::*;
    use crate::modules::selection::testing::{RecordingScene, ScriptedLoader, items};

    fn settings() -> AnimationConfig {
        AnimationConfig { particle_count: 16, ..AnimationConfig::default() }
    }

    type Setup = (Arc<RecordingScene>, AnimationPipeline, mpsc::Receiver<PipelineEvent>);

    fn pipeline(loader: impl ResourceLoader + 'static) -> Setup {
        pipeline_with(loader, settings())
    }

    fn pipeline_with(loader: impl ResourceLoader + 'static, settings: AnimationConfig) -> Setup {
        let scene = Arc::new(RecordingScene::default());
        let (pipeline, events) =
            AnimationPipeline::new(scene.clone(), Arc::new(loader), settings, "https://cdn/");
        (scene, pipeline.with_seed(9), events)
    }

    /// Counts load futures dropped before they finished.
    struct DropCounter(Arc<AtomicUsize>);

    impl Drop for DropCounter {
        fn drop(&mut self) { self.0.fetch_add(1, Ordering::SeqCst); }
    }

    /// Loader whose loads never complete.
    #[derive(Default)]
    struct HangingLoader {
        dropped: Arc<AtomicUsize>,
    }

    impl ResourceLoader for HangingLoader {
        fn load(&self, _uri: &str) -> BoxFuture<'static, Result<Resource, LoadError>> {
            let counter = DropCounter(Arc::clone(&self.dropped));
            async move {
                let _counter = counter;
                std::future::pending::<Result<Resource, LoadError>>().await
            }
            .boxed()
        }
    }

    /// Loader whose load task panics.
    struct PanickingLoader;

    impl ResourceLoader for PanickingLoader {
        fn load(&self, _uri: &str) -> BoxFuture<'static, Result<Resource, LoadError>> {
            futures::future::lazy(|_| -> Result<Resource, LoadError> { panic!("decoder crashed") })
                .boxed()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_committed_pick_docks_with_artwork() {
        let (scene, mut pipeline, mut events) = pipeline(ScriptedLoader::new(Duration::from_millis(300)));
        let item = items(1).remove(0);

        let generation = pipeline.converge(&item);
        assert!(pipeline.commit(generation, 0));

        let event = events.recv().await.unwrap();
        assert_eq!(event, PipelineEvent::Docked { generation, item: item.clone(), slot: 0, degraded: false });

        let cards = scene.cards_for(item.id);
        assert_eq!(cards.len(), 1);
        assert!(matches!(cards[0].material, Material::Artwork(_)));
        let docked = cards[0].position.unwrap();
        assert!(docked.distance_squared(settings().slot_position(0)) < 1e-18);
        assert!(cards[0].visible);
        assert!((cards[0].opacity - 1.0).abs() < f64::EPSILON);
        assert_eq!(scene.live_particles(), 0);
        assert_eq!(pipeline.docked_count(), 1);
        assert!(!pipeline.is_staged());
    }

    #[tokio::test(start_paused = true)]
    async fn test_converged_pick_waits_for_commit() {
        let (scene, mut pipeline, mut events) = pipeline(ScriptedLoader::new(Duration::from_millis(100)));
        let item = items(1).remove(0);

        pipeline.converge(&item);
        tokio::time::sleep(Duration::from_millis(2000)).await;

        let particles = scene.particles();
        assert_eq!(particles.len(), 1);
        assert!(particles[0].particle_frames > 1);
        assert!((particles[0].opacity - 1.0).abs() < f64::EPSILON);

        let cards = scene.cards_for(item.id);
        assert!(!cards[0].visible);
        assert_eq!(cards[0].material, Material::CardBack);
        assert!(pipeline.is_staged());
        assert!(events.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_load_docks_with_fallback() {
        let loader = ScriptedLoader::new(Duration::from_millis(100));
        loader.script("m00.jpg", Duration::from_millis(50), Err(LoadError::NotFound("m00.jpg".into())));
        let (scene, mut pipeline, mut events) = pipeline(loader);
        let item = items(1).remove(0);

        let generation = pipeline.converge(&item);
        pipeline.commit(generation, 2);

        let event = events.recv().await.unwrap();
        assert!(matches!(event, PipelineEvent::Docked { degraded: true, slot: 2, .. }));
        assert_eq!(scene.cards_for(item.id)[0].material, Material::Fallback);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_load_times_out_to_fallback() {
        let loader = ScriptedLoader::new(Duration::from_secs(60));
        let (scene, mut pipeline, mut events) = pipeline(loader);
        let item = items(1).remove(0);

        let generation = pipeline.converge(&item);
        pipeline.commit(generation, 0);

        let event = events.recv().await.unwrap();
        assert!(matches!(event, PipelineEvent::Docked { degraded: true, .. }));
        assert_eq!(scene.cards_for(item.id)[0].material, Material::Fallback);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disperse_releases_stage_and_scatters() {
        let (scene, mut pipeline, mut events) = pipeline(ScriptedLoader::new(Duration::from_millis(300)));
        let item = items(1).remove(0);

        let first = pipeline.converge(&item);
        tokio::time::sleep(Duration::from_millis(400)).await;

        let cancelled = pipeline.disperse();
        assert!(cancelled > first);
        assert!(!pipeline.is_staged());
        assert!(scene.cards_for(item.id).is_empty());
        assert!(!pipeline.commit(first, 0));

        let event = events.recv().await.unwrap();
        assert_eq!(event, PipelineEvent::Dispersed { generation: cancelled });
        assert_eq!(scene.live_particles(), 0);
        assert_eq!(scene.stray_mutations(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disperse_is_idempotent() {
        let (scene, mut pipeline, mut events) = pipeline(ScriptedLoader::new(Duration::from_millis(10)));
        let item = items(1).remove(0);

        pipeline.converge(&item);
        let generation = pipeline.disperse();
        pipeline.disperse();
        pipeline.disperse();

        assert_eq!(events.recv().await.unwrap(), PipelineEvent::Dispersed { generation });
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(events.try_recv().is_err());
        assert_eq!(scene.stray_mutations(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_run_never_touches_newer_stage() {
        let loader = ScriptedLoader::new(Duration::from_millis(100));
        // The first card's artwork arrives long after it was cancelled.
        loader.script("m00.jpg", Duration::from_millis(2500), Ok(()));
        let (scene, mut pipeline, mut events) = pipeline(loader);
        let mut cards = items(2);
        let second = cards.pop().unwrap();
        let first = cards.pop().unwrap();

        let g1 = pipeline.converge(&first);
        tokio::time::sleep(Duration::from_millis(200)).await;
        pipeline.disperse();
        let g2 = pipeline.converge(&second);
        assert!(g2 > g1);

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(scene.cards_for(first.id).is_empty());
        assert!(pipeline.is_staged());

        assert!(pipeline.commit(g2, 1));
        loop {
            match events.recv().await.unwrap() {
                PipelineEvent::Docked { generation, item, .. } => {
                    assert_eq!(generation, g2);
                    assert_eq!(item.id, second.id);
                    break;
                }
                PipelineEvent::Dispersed { .. } => {}
            }
        }
        assert_eq!(scene.stray_mutations(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_commit_rejects_stale_generation() {
        let (_scene, mut pipeline, _events) = pipeline(ScriptedLoader::new(Duration::from_millis(10)));
        let mut cards = items(2);
        let second = cards.pop().unwrap();
        let first = cards.pop().unwrap();

        let g1 = pipeline.converge(&first);
        let g2 = pipeline.converge(&second);

        assert!(!pipeline.commit(g1, 0));
        assert!(pipeline.commit(g2, 0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicked_load_docks_with_fallback() {
        let (scene, mut pipeline, mut events) = pipeline(PanickingLoader);
        let item = items(1).remove(0);

        let generation = pipeline.converge(&item);
        pipeline.commit(generation, 1);

        let event = events.recv().await.unwrap();
        assert!(matches!(event, PipelineEvent::Docked { degraded: true, slot: 1, .. }));
        assert_eq!(scene.cards_for(item.id)[0].material, Material::Fallback);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_during_reveal_abandons_load() {
        let loader = HangingLoader::default();
        let dropped = Arc::clone(&loader.dropped);
        let (scene, mut pipeline, mut events) = pipeline(loader);
        let item = items(1).remove(0);

        let generation = pipeline.converge(&item);
        pipeline.commit(generation, 0);
        // Past converge and into the particle fade.
        tokio::time::sleep(Duration::from_millis(1600)).await;
        assert_eq!(dropped.load(Ordering::SeqCst), 0);

        pipeline.reset();
        tokio::time::sleep(Duration::from_millis(100)).await;

        // Well before the load timeout.
        assert_eq!(dropped.load(Ordering::SeqCst), 1);
        assert!(!pipeline.is_staged());
        assert_eq!(scene.live_cards(), 0);
        assert_eq!(scene.stray_mutations(), 0);
        assert!(events.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_frame_interval_still_docks() {
        let settings = AnimationConfig { frame_ms: 0, ..settings() };
        let (_scene, mut pipeline, mut events) =
            pipeline_with(ScriptedLoader::new(Duration::from_millis(50)), settings);
        let item = items(1).remove(0);

        let generation = pipeline.converge(&item);
        pipeline.commit(generation, 0);

        let event = tokio::time::timeout(Duration::from_secs(30), events.recv()).await.unwrap();
        assert!(matches!(event, Some(PipelineEvent::Docked { degraded: false, .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_disposes_docked_cards() {
        let (scene, mut pipeline, mut events) = pipeline(ScriptedLoader::new(Duration::from_millis(10)));
        let item = items(1).remove(0);

        let generation = pipeline.converge(&item);
        pipeline.commit(generation, 0);
        events.recv().await.unwrap();
        assert_eq!(scene.live_cards(), 1);

        pipeline.reset();
        assert_eq!(scene.live_cards(), 0);
        assert_eq!(pipeline.docked_count(), 0);
    }
}
