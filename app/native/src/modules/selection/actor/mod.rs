//! Selection actor.
//!
//! The actor owns the session, the pool and the active input adapter, and
//! processes messages, pipeline events and frame ticks one at a time on a
//! single task. Nothing else mutates selection state, so no locking is
//! needed around it.
//!
//! # Panic Recovery
//!
//! If a handler panics, the panic is caught and logged and the actor keeps
//! processing. State may be partially inconsistent afterwards, but input keeps
//! flowing and a new reading can be started.

mod handle;
mod messages;

use std::collections::HashSet;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::Duration;

use eyeball::SharedObservable;
pub use handle::{ActorError, SelectionActorHandle};
pub use messages::{QueryResult, SelectionMessage, SelectionQuery, SelectionSnapshot};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{Instant, MissedTickBehavior};

use super::effects::{AnimationPipeline, PipelineEvent, ResourceLoader, SceneSurface};
use super::input::{Commands, GestureAdapter, InputAdapter, InputEvent, InputMode, PointerAdapter};
use super::pool::{RingLayout, RotatingPool};
use super::session::{
    FinalDraw, Outcome, SelectionSession, SessionError, SessionPhase, SessionPolicy,
};
use super::state::ItemId;
use crate::config::ArcanaConfig;
use crate::modules::deck::Deck;

/// Channel buffer size for the selection actor.
const CHANNEL_BUFFER_SIZE: usize = 256;

/// Number of finished draws kept for slow subscribers.
const COMPLETED_BUFFER_SIZE: usize = 16;

/// Everything the actor needs from its host.
pub struct SelectionContext {
    pub scene: Arc<dyn SceneSurface>,
    pub loader: Arc<dyn ResourceLoader>,
    pub deck: Deck,
    pub config: ArcanaConfig,
    /// Fixed seed for shuffling and particle scatter.
    pub seed: Option<u64>,
}

impl SelectionContext {
    /// Uses the configured deck file, or the built-in deck when none is set
    /// or it fails to load.
    #[must_use]
    pub fn new(
        scene: Arc<dyn SceneSurface>,
        loader: Arc<dyn ResourceLoader>,
        config: ArcanaConfig,
    ) -> Self {
        let deck = match config.reading.deck_path.as_deref().map(Deck::from_path) {
            Some(Ok(deck)) => deck,
            Some(Err(err)) => {
                tracing::warn!(error = %err, "failed to load deck, using the built-in deck");
                Deck::builtin()
            }
            None => Deck::builtin(),
        };
        let deck = deck.with_image_base_url(config.reading.image_base_url.clone());

        Self { scene, loader, deck, config, seed: None }
    }

    #[must_use]
    pub fn with_deck(mut self, deck: Deck) -> Self {
        self.deck = deck;
        self
    }

    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// The actor that owns all selection state.
pub struct SelectionActor {
    session: SelectionSession,
    adapter: Box<dyn InputAdapter>,
    deck: Deck,
    config: ArcanaConfig,
    rng: StdRng,
    /// Items drawn in the current reading, across sessions, in draw order.
    drawn: Vec<ItemId>,
    receiver: mpsc::Receiver<SelectionMessage>,
    pipeline_events: mpsc::Receiver<PipelineEvent>,
    snapshot: SharedObservable<SelectionSnapshot>,
    completed: broadcast::Sender<FinalDraw>,
    fault: Option<String>,
    last_frame: Instant,
}

impl SelectionActor {
    /// Spawn the actor on the current tokio runtime and return its handle.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    #[must_use]
    pub fn spawn(context: SelectionContext) -> SelectionActorHandle {
        tracing::debug!("spawning selection actor");
        let (actor, handle) = Self::new(context);
        tokio::spawn(actor.run());
        handle
    }

    fn new(context: SelectionContext) -> (Self, SelectionActorHandle) {
        let SelectionContext { scene, loader, deck, config, seed } = context;

        let (pipeline, pipeline_events) = AnimationPipeline::new(
            Arc::clone(&scene),
            loader,
            config.animation.clone(),
            deck.image_base_url(),
        );
        let (pipeline, rng) = match seed {
            Some(seed) => (pipeline.with_seed(seed), StdRng::seed_from_u64(seed)),
            None => (pipeline, StdRng::from_rng(&mut rand::rng())),
        };

        let pool = RotatingPool::new(scene, RingLayout::from_config(&config.ring));
        let session = SelectionSession::new(pool, Box::new(pipeline), config.ring.reference);

        let (sender, receiver) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let (completed, _) = broadcast::channel(COMPLETED_BUFFER_SIZE);
        let snapshot = SharedObservable::new(SelectionSnapshot::default());

        let actor = Self {
            session,
            adapter: Box::new(GestureAdapter::new(&config.gesture)),
            deck,
            config,
            rng,
            drawn: Vec::new(),
            receiver,
            pipeline_events,
            snapshot: snapshot.clone(),
            completed: completed.clone(),
            fault: None,
            last_frame: Instant::now(),
        };

        (actor, SelectionActorHandle::new(sender, snapshot, completed))
    }

    /// Run the actor's loop until shutdown or until every handle is dropped.
    async fn run(mut self) {
        tracing::trace!("selection actor loop starting");

        let frame = Duration::from_millis(self.config.animation.frame_ms.max(1));
        let mut frames = tokio::time::interval(frame);
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                message = self.receiver.recv() => {
                    let Some(message) = message else {
                        tracing::debug!("selection actor channel closed, exiting");
                        break;
                    };
                    if matches!(message, SelectionMessage::Shutdown) {
                        tracing::debug!("selection actor received shutdown message");
                        break;
                    }

                    let name = message.name();
                    self.guarded(name, |actor| actor.handle_message(message));
                }
                Some(event) = self.pipeline_events.recv() => {
                    self.guarded("PipelineEvent", |actor| actor.handle_pipeline_event(event));
                }
                now = frames.tick() => {
                    self.guarded("Frame", |actor| actor.on_frame(now));
                }
            }
        }

        self.session.shutdown();
        self.publish();
    }

    /// Runs `handler` with panic recovery, then publishes the new state.
    fn guarded(&mut self, name: &str, handler: impl FnOnce(&mut Self)) {
        let result = catch_unwind(AssertUnwindSafe(|| handler(self)));

        if let Err(panic_info) = result {
            let panic_msg = panic_info
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| panic_info.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());

            tracing::error!(handler = name, panic = %panic_msg, "selection actor recovered from panic");
        }

        self.publish();
    }

    fn handle_message(&mut self, message: SelectionMessage) {
        match message {
            SelectionMessage::StartReading { mode, respond_to } => {
                let result = self.start_reading(mode);
                if let Err(err) = &result {
                    tracing::warn!(error = %err, "failed to start reading");
                }
                let _ = respond_to.send(result);
            }
            SelectionMessage::StartSupplement { count, respond_to } => {
                let result = self.start_supplement(count);
                if let Err(err) = &result {
                    tracing::warn!(error = %err, "failed to start supplement");
                }
                let _ = respond_to.send(result);
            }
            SelectionMessage::Input(event) => self.handle_input(&event),
            SelectionMessage::Query { query, respond_to } => {
                let _ = respond_to.send(self.answer(query));
            }
            SelectionMessage::Shutdown => {}
        }
    }

    // ========================================================================
    // Sessions
    // ========================================================================

    fn start_reading(&mut self, mode: InputMode) -> Result<(), SessionError> {
        let reading = &self.config.reading;
        let candidates =
            self.deck.candidates(&HashSet::new(), reading.reverse_probability(), &mut self.rng);

        self.session.start(SessionPolicy::primary(reading.card_count, mode), candidates)?;
        self.drawn.clear();
        self.fault = None;
        self.adapter = self.adapter_for(mode);
        Ok(())
    }

    fn start_supplement(&mut self, count: Option<usize>) -> Result<(), SessionError> {
        let reading = &self.config.reading;
        let target = count.unwrap_or(reading.supplement_count);

        // Picks of an unfinished session still count as drawn.
        let mut drawn = self.drawn.clone();
        for pick in self.session.committed() {
            if !drawn.contains(&pick.item.id) {
                drawn.push(pick.item.id);
            }
        }

        let exclude: HashSet<ItemId> = drawn.iter().copied().collect();
        let candidates = self.deck.candidates(&exclude, reading.reverse_probability(), &mut self.rng);

        self.session.start(SessionPolicy::supplemental(target, exclude), candidates)?;
        self.drawn = drawn;
        self.fault = None;
        self.adapter = self.adapter_for(InputMode::Pointer);
        Ok(())
    }

    fn adapter_for(&self, mode: InputMode) -> Box<dyn InputAdapter> {
        match mode {
            InputMode::Gesture => Box::new(GestureAdapter::new(&self.config.gesture)),
            InputMode::Pointer => Box::new(PointerAdapter::new(self.config.pointer.clone())),
        }
    }

    // ========================================================================
    // Input and pipeline events
    // ========================================================================

    fn handle_input(&mut self, event: &InputEvent) {
        let accepted = event.mode().is_none_or(|mode| {
            self.session.ensure_trigger(mode).is_ok() && mode == self.adapter.mode()
        });
        if !accepted {
            return;
        }

        let commands = self.adapter.translate(event);
        self.dispatch(commands);
    }

    fn dispatch(&mut self, commands: Commands) {
        let source = self.adapter.mode();
        for command in commands {
            match self.session.dispatch(source, command) {
                Ok(outcomes) => {
                    for outcome in outcomes {
                        self.on_outcome(outcome);
                    }
                }
                Err(SessionError::Pool(err)) => {
                    tracing::error!(error = %err, ?command, "pool contract violated");
                    self.fault = Some(err.to_string());
                }
                Err(err) => tracing::warn!(error = %err, ?command, "session command failed"),
            }
        }
    }

    fn handle_pipeline_event(&mut self, event: PipelineEvent) {
        for outcome in self.session.finalize(event) {
            self.on_outcome(outcome);
        }
    }

    fn on_outcome(&mut self, outcome: Outcome) {
        self.adapter.on_outcome(&outcome);

        if let Outcome::Completed(draw) = outcome {
            for pick in &draw.picks {
                if !self.drawn.contains(&pick.item.id) {
                    self.drawn.push(pick.item.id);
                }
            }
            if self.completed.send(draw).is_err() {
                tracing::debug!("no subscribers for the finished draw");
            }
        }
    }

    fn on_frame(&mut self, now: Instant) {
        let dt = now.saturating_duration_since(self.last_frame);
        self.last_frame = now;

        self.session.tick(dt);
        let commands = self.adapter.translate(&InputEvent::Tick(now));
        self.dispatch(commands);
    }

    // ========================================================================
    // Queries and publishing
    // ========================================================================

    fn answer(&self, query: SelectionQuery) -> QueryResult {
        match query {
            SelectionQuery::Snapshot => QueryResult::Snapshot(self.build_snapshot()),
            SelectionQuery::Committed => QueryResult::Picks(self.session.committed()),
            SelectionQuery::PoolItems => {
                QueryResult::Items(self.session.pool().items().cloned().collect())
            }
            SelectionQuery::DrawnHistory => QueryResult::Drawn(self.drawn.clone()),
        }
    }

    fn build_snapshot(&self) -> SelectionSnapshot {
        let phase = self.session.phase();
        SelectionSnapshot {
            phase,
            kind: self.session.policy().kind,
            mode: (phase != SessionPhase::Idle).then_some(self.session.policy().trigger),
            pool_size: self.session.pool().len(),
            pending: self.session.pending().map(|item| item.id),
            committed: self.session.committed(),
            armed: self.session.is_armed(),
            grab_progress: self.adapter.progress(Instant::now()),
            fault: self.fault.clone(),
        }
    }

    fn publish(&self) { self.snapshot.set_if_not_eq(self.build_snapshot()); }
}

#[cfg(test)]
mod tests {
    use smallvec::smallvec;

    use super::*;
    use crate::modules::selection::input::PointerEvent;
    use crate::modules::selection::session::{SessionCommand, SessionKind};
    use crate::modules::selection::testing::{RecordingScene, ScriptedLoader};

    fn spawn() -> (Arc<RecordingScene>, SelectionActorHandle) {
        let scene = Arc::new(RecordingScene::default());
        let loader = Arc::new(ScriptedLoader::new(Duration::from_millis(200)));
        let mut config = ArcanaConfig::default();
        config.animation.particle_count = 8;

        let context = SelectionContext::new(scene.clone(), loader, config).with_seed(21);
        (scene, SelectionActor::spawn(context))
    }

    async fn click(handle: &SelectionActorHandle, target: ItemId) {
        let at = Instant::now();
        handle
            .input_async(InputEvent::Pointer(PointerEvent::Down { x: 10.0, y: 10.0, at }))
            .await
            .unwrap();
        handle
            .input_async(InputEvent::Pointer(PointerEvent::Up {
                x: 12.0,
                y: 10.0,
                at,
                target: Some(target),
            }))
            .await
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_pointer_reading_completes_and_broadcasts() {
        let (_scene, handle) = spawn();
        let mut completed = handle.subscribe_completed();
        handle.start_reading(InputMode::Pointer).await.unwrap();

        for _ in 0..3 {
            let target = handle.pool_items().await.unwrap()[0].id;
            click(&handle, target).await;
            tokio::time::sleep(Duration::from_secs(5)).await;
        }

        let draw = completed.recv().await.unwrap();
        assert_eq!(draw.kind, SessionKind::Primary);
        assert_eq!(draw.picks.len(), 3);

        let snapshot = handle.snapshot();
        assert_eq!(snapshot.phase, SessionPhase::Done);
        assert_eq!(snapshot.pool_size, 75);
        assert_eq!(handle.drawn_history().await.unwrap().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_supplement_excludes_drawn_cards() {
        let (_scene, handle) = spawn();
        handle.start_reading(InputMode::Pointer).await.unwrap();
        for _ in 0..3 {
            let target = handle.pool_items().await.unwrap()[0].id;
            click(&handle, target).await;
            tokio::time::sleep(Duration::from_secs(5)).await;
        }
        let drawn = handle.drawn_history().await.unwrap();

        handle.start_supplement(None).await.unwrap();
        let pool = handle.pool_items().await.unwrap();
        assert_eq!(pool.len(), 75);
        assert!(pool.iter().all(|item| !drawn.contains(&item.id)));
        assert_eq!(handle.snapshot().kind, SessionKind::Supplemental);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mismatched_input_is_ignored() {
        let (_scene, handle) = spawn();
        handle.start_reading(InputMode::Gesture).await.unwrap();
        let target = handle.pool_items().await.unwrap()[0].id;

        click(&handle, target).await;
        tokio::time::sleep(Duration::from_millis(100)).await;

        let snapshot = handle.snapshot();
        assert_eq!(snapshot.pool_size, 78);
        assert_eq!(snapshot.pending, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pool_violation_is_surfaced_on_snapshot() {
        let scene = Arc::new(RecordingScene::default());
        let loader = Arc::new(ScriptedLoader::new(Duration::from_millis(200)));
        let context = SelectionContext::new(scene, loader, ArcanaConfig::default()).with_seed(21);
        let (mut actor, handle) = SelectionActor::new(context);
        actor.start_reading(InputMode::Gesture).unwrap();

        actor.dispatch(smallvec![SessionCommand::Arm, SessionCommand::BeginPick]);
        let picked = actor.session.pending().unwrap().id;
        actor.session.pool_mut().restore(picked).unwrap();
        actor.dispatch(smallvec![SessionCommand::Cancel]);
        actor.publish();

        let snapshot = handle.snapshot();
        assert!(snapshot.fault.is_some_and(|fault| fault.contains("already in the pool")));
        assert_eq!(snapshot.pending, Some(picked));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_disposes_visuals() {
        let (scene, handle) = spawn();
        handle.start_reading(InputMode::Pointer).await.unwrap();
        assert_eq!(scene.live_cards(), 78);

        handle.shutdown().unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(!handle.is_alive());
        assert_eq!(scene.live_cards(), 0);
    }
}
