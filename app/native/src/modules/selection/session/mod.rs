//! The selection session state machine.
//!
//! ```text
//! Idle → Ready ──BeginPick──► PickPending ──Commit──► Committing ──Docked──► Ready | Done
//!          ▲                      │
//!          └──────── Cancel ──────┘
//! ```
//!
//! The session is the only mutator of the pending slot and the committed
//! list. Each item is always in exactly one of the pool, the pending slot or
//! the committed list. Invalid commands are no-ops reported as
//! [`Outcome::Rejected`]; pool contract violations propagate as errors.

mod policy;
mod types;

use std::collections::HashSet;
use std::time::Duration;

use eyeball_im::ObservableVector;
pub use policy::SessionPolicy;
use smallvec::{SmallVec, smallvec};
pub use types::{
    FinalDraw, Outcome, Rejection, SessionCommand, SessionError, SessionKind, SessionPhase,
};

use super::effects::{PickAnimator, PipelineEvent};
use super::input::InputMode;
use super::pool::{RingSpeed, RotatingPool};
use super::state::{Item, ItemId, Pick, Vec3};

/// Outcomes of one command. Most commands produce one, direct picks two.
pub type Outcomes = SmallVec<[Outcome; 2]>;

/// Owns the pool and the pending slot, and drives the animation pipeline.
pub struct SelectionSession {
    pool: RotatingPool,
    animator: Box<dyn PickAnimator>,
    policy: SessionPolicy,
    phase: SessionPhase,
    pending: Option<Item>,
    committed: ObservableVector<Pick>,
    armed: bool,
    /// Point the nearest-item query measures from.
    reference: Vec3,
}

impl SelectionSession {
    /// Creates an idle session. Nothing can be picked until [`start`](Self::start).
    #[must_use]
    pub fn new(pool: RotatingPool, animator: Box<dyn PickAnimator>, reference: Vec3) -> Self {
        Self {
            pool,
            animator,
            policy: SessionPolicy::primary(1, InputMode::Gesture),
            phase: SessionPhase::Idle,
            pending: None,
            committed: ObservableVector::new(),
            armed: false,
            reference,
        }
    }

    /// Begins a new session, rebuilding the pool from `candidates`.
    ///
    /// Items excluded by the policy are left out. A primary session also
    /// clears the cards docked by earlier sessions.
    ///
    /// # Errors
    ///
    /// Fails if a pick is in flight, if the policy is invalid, or if fewer
    /// distinct candidates than the target remain after exclusion.
    pub fn start(&mut self, policy: SessionPolicy, candidates: Vec<Item>) -> Result<(), SessionError> {
        if self.phase.is_in_flight() {
            return Err(SessionError::PickInFlight);
        }
        policy.validate()?;

        let candidates: Vec<Item> =
            candidates.into_iter().filter(|item| !policy.exclude.contains(&item.id)).collect();
        let available = candidates.iter().map(|item| item.id).collect::<HashSet<_>>().len();
        if available < policy.target {
            return Err(SessionError::InsufficientItems { needed: policy.target, available });
        }

        if policy.kind == SessionKind::Primary {
            self.animator.reset();
        }

        self.committed.clear();
        self.pending = None;
        self.armed = false;
        self.pool.rebuild(candidates);

        tracing::info!(
            kind = ?policy.kind,
            trigger = %policy.trigger,
            target = policy.target,
            pool = self.pool.len(),
            "selection session started"
        );

        self.policy = policy;
        self.phase = SessionPhase::Ready;
        self.update_speed();
        Ok(())
    }

    /// Checks that commands from `source` are accepted by the running session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InputModeMismatch`] for the wrong input mode.
    pub fn ensure_trigger(&self, source: InputMode) -> Result<(), SessionError> {
        if self.phase == SessionPhase::Idle || source == self.policy.trigger {
            return Ok(());
        }

        tracing::warn!(expected = %self.policy.trigger, got = %source, "input mode mismatch");
        Err(SessionError::InputModeMismatch { expected: self.policy.trigger, got: source })
    }

    /// Applies one command from an input adapter.
    ///
    /// # Errors
    ///
    /// Fails on an input mode mismatch or a pool contract violation.
    pub fn dispatch(
        &mut self,
        source: InputMode,
        command: SessionCommand,
    ) -> Result<Outcomes, SessionError> {
        self.ensure_trigger(source)?;
        tracing::debug!(?command, phase = ?self.phase, "session command");

        let outcomes = match command {
            SessionCommand::Arm => self.set_armed(true),
            SessionCommand::Disarm => self.set_armed(false),
            SessionCommand::BeginPick => smallvec![self.begin_pick()?],
            SessionCommand::Commit => smallvec![self.commit()],
            SessionCommand::Cancel => smallvec![self.cancel()?],
            SessionCommand::DirectPick(target) => self.direct_pick(target)?,
            SessionCommand::RotateBy(radians) => {
                self.pool.nudge(radians);
                SmallVec::new()
            }
            SessionCommand::HoldRotation(hold) => {
                self.pool.set_paused(hold);
                SmallVec::new()
            }
        };

        for outcome in &outcomes {
            if let Outcome::Rejected(reason) = outcome {
                tracing::debug!(?command, ?reason, "command rejected");
            }
        }

        self.update_speed();
        Ok(outcomes)
    }

    /// Applies a pipeline notification.
    ///
    /// A dock for the committing generation moves the pending item into the
    /// committed list. Anything else is stale and ignored.
    pub fn finalize(&mut self, event: PipelineEvent) -> Outcomes {
        let (generation, item, slot, degraded) = match event {
            PipelineEvent::Docked { generation, item, slot, degraded } => {
                (generation, item, slot, degraded)
            }
            PipelineEvent::Dispersed { generation } => {
                tracing::trace!(%generation, "disperse finished");
                return SmallVec::new();
            }
        };

        let expected = matches!(
            self.phase,
            SessionPhase::Committing { item: pending, generation: current, .. }
                if current == generation && pending == item.id
        );
        if !expected {
            tracing::trace!(%generation, item = %item.id, "ignoring stale dock");
            return smallvec![Outcome::Rejected(Rejection::StaleGeneration)];
        }

        let item = self.pending.take().unwrap_or(item);
        let pick = Pick { item, slot, degraded };
        self.committed.push_back(pick.clone());
        tracing::debug!(item = %pick.item.id, slot, degraded, count = self.committed.len(), "pick committed");

        let mut outcomes: Outcomes = smallvec![Outcome::Committed(pick)];
        if self.committed.len() >= self.policy.target {
            self.phase = SessionPhase::Done;
            let draw = FinalDraw::new(self.policy.kind, self.committed());
            tracing::info!(reading = %draw.reading, kind = ?draw.kind, picks = draw.picks.len(), "selection session complete");
            outcomes.push(Outcome::Completed(draw));
        } else {
            self.phase = SessionPhase::Ready;
        }

        // Every further pick needs a fresh arm.
        self.armed = false;
        self.update_speed();
        outcomes
    }

    /// Advances the ring rotation.
    pub fn tick(&mut self, dt: Duration) { self.pool.tick(dt); }

    /// Abandons the session and every visual it created.
    pub fn shutdown(&mut self) {
        self.animator.reset();
        self.pool.clear();
        self.pending = None;
        self.committed.clear();
        self.armed = false;
        self.phase = SessionPhase::Idle;
    }

    // ========================================================================
    // Queries
    // ========================================================================

    #[must_use]
    pub const fn phase(&self) -> SessionPhase { self.phase }

    #[must_use]
    pub const fn policy(&self) -> &SessionPolicy { &self.policy }

    #[must_use]
    pub const fn pool(&self) -> &RotatingPool { &self.pool }

    #[cfg(test)]
    pub(crate) fn pool_mut(&mut self) -> &mut RotatingPool { &mut self.pool }

    #[must_use]
    pub const fn pending(&self) -> Option<&Item> { self.pending.as_ref() }

    /// Committed picks in commit order.
    #[must_use]
    pub fn committed(&self) -> Vec<Pick> { self.committed.iter().cloned().collect() }

    #[must_use]
    pub fn committed_len(&self) -> usize { self.committed.len() }

    #[must_use]
    pub const fn is_armed(&self) -> bool { self.armed }

    // ========================================================================
    // Transitions
    // ========================================================================

    fn set_armed(&mut self, armed: bool) -> Outcomes {
        if self.armed == armed {
            return SmallVec::new();
        }

        self.armed = armed;
        smallvec![if armed { Outcome::Armed } else { Outcome::Disarmed }]
    }

    /// Why no pick can begin in the current phase, if any.
    const fn pick_blocker(&self) -> Option<Rejection> {
        match self.phase {
            SessionPhase::Idle => Some(Rejection::NotStarted),
            SessionPhase::Ready => None,
            SessionPhase::PickPending { .. } => Some(Rejection::PickInFlight),
            SessionPhase::Committing { .. } => Some(Rejection::CommitInFlight),
            SessionPhase::Done => Some(Rejection::SessionDone),
        }
    }

    fn nearest(&self) -> Option<ItemId> {
        self.pool.query_nearest(self.reference).map(|item| item.id)
    }

    fn begin_pick(&mut self) -> Result<Outcome, SessionError> {
        if let Some(reason) = self.pick_blocker() {
            return Ok(Outcome::Rejected(reason));
        }
        if self.policy.trigger == InputMode::Gesture && !self.armed {
            return Ok(Outcome::Rejected(Rejection::NotArmed));
        }

        match self.nearest() {
            Some(id) => self.take(id),
            None => Ok(Outcome::Rejected(Rejection::EmptyPool)),
        }
    }

    /// Moves `id` from the pool into the pending slot and starts converging.
    fn take(&mut self, id: ItemId) -> Result<Outcome, SessionError> {
        let item = self.pool.remove(id)?;
        let generation = self.animator.converge(&item);
        self.pending = Some(item);
        self.phase = SessionPhase::PickPending { item: id, generation };

        Ok(Outcome::PickStarted { item: id, generation })
    }

    fn commit(&mut self) -> Outcome {
        match self.phase {
            SessionPhase::PickPending { item, generation } => {
                let slot = self.policy.slot_offset + self.committed.len();
                if !self.animator.commit(generation, slot) {
                    tracing::trace!(%generation, "commit for a superseded generation");
                    return Outcome::Rejected(Rejection::StaleGeneration);
                }

                self.phase = SessionPhase::Committing { item, generation, slot };
                Outcome::CommitStarted { item, generation, slot }
            }
            SessionPhase::Ready => Outcome::Rejected(Rejection::NothingPending),
            _ => Outcome::Rejected(self.pick_blocker().unwrap_or(Rejection::NothingPending)),
        }
    }

    fn cancel(&mut self) -> Result<Outcome, SessionError> {
        let SessionPhase::PickPending { item, generation } = self.phase else {
            let reason = match self.phase {
                SessionPhase::Committing { .. } => Rejection::CommitInFlight,
                SessionPhase::Idle => Rejection::NotStarted,
                _ => Rejection::NothingPending,
            };
            return Ok(Outcome::Rejected(reason));
        };

        // The pending slot is only cleared once the pool has taken the item back.
        if let Some(id) = self.pending.as_ref().map(|pending| pending.id) {
            self.pool.restore(id)?;
            self.pending = None;
        }
        self.animator.disperse();
        self.phase = SessionPhase::Ready;
        self.armed = false;

        tracing::debug!(item = %item, %generation, "pick cancelled");
        Ok(Outcome::Cancelled { item, generation })
    }

    fn direct_pick(&mut self, target: Option<ItemId>) -> Result<Outcomes, SessionError> {
        if let Some(reason) = self.pick_blocker() {
            return Ok(smallvec![Outcome::Rejected(reason)]);
        }

        let id = match target {
            Some(id) if self.pool.contains(id) => id,
            Some(id) => return Ok(smallvec![Outcome::Rejected(Rejection::NotInPool(id))]),
            None => match self.nearest() {
                Some(id) => id,
                None => return Ok(smallvec![Outcome::Rejected(Rejection::EmptyPool)]),
            },
        };

        let started = self.take(id)?;
        let committed = self.commit();
        Ok(smallvec![started, committed])
    }

    fn update_speed(&mut self) {
        let speed = match self.phase {
            SessionPhase::PickPending { .. } | SessionPhase::Committing { .. } => RingSpeed::Slow,
            SessionPhase::Ready if self.armed => RingSpeed::Fast,
            _ => RingSpeed::Normal,
        };
        self.pool.set_speed(speed);
    }
}

impl std::fmt::Debug for SelectionSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionSession")
            .field("phase", &self.phase)
            .field("kind", &self.policy.kind)
            .field("pool", &self.pool.len())
            .field("pending", &self.pending.as_ref().map(|item| item.id))
            .field("committed", &self.committed.len())
            .field("armed", &self.armed)
            .finish_non_exhaustive()
    }
}
