//! Pointer adapter: click to pick, drag to spin the ring.

use smallvec::SmallVec;
use tokio::time::Instant;

use super::{Commands, InputAdapter, InputEvent, InputMode, PointerEvent};
use crate::config::PointerConfig;
use crate::modules::selection::session::{Outcome, SessionCommand};

/// An active press.
#[derive(Debug, Clone, Copy)]
struct Press {
    start_x: f64,
    last_x: f64,
    /// Rotation applied by the latest move, in radians.
    velocity: f64,
}

/// Translates pointer events into direct picks and manual rotation.
#[derive(Debug, Clone)]
pub struct PointerAdapter {
    config: PointerConfig,
    press: Option<Press>,
    /// Rotation per frame carried over after a drag, in radians.
    inertia: f64,
}

impl PointerAdapter {
    #[must_use]
    pub const fn new(config: PointerConfig) -> Self { Self { config, press: None, inertia: 0.0 } }

    /// Rotation still being applied by inertia.
    #[must_use]
    pub const fn inertia(&self) -> f64 { self.inertia }

    fn pointer(&mut self, event: PointerEvent, commands: &mut Commands) {
        match event {
            PointerEvent::Down { x, .. } => {
                self.press = Some(Press { start_x: x, last_x: x, velocity: 0.0 });
                self.inertia = 0.0;
                commands.push(SessionCommand::HoldRotation(true));
            }
            PointerEvent::Move { x, .. } => {
                let Some(press) = self.press.as_mut() else {
                    return;
                };
                press.velocity = (x - press.last_x) * self.config.drag_sensitivity;
                press.last_x = x;
                if press.velocity != 0.0 {
                    commands.push(SessionCommand::RotateBy(press.velocity));
                }
            }
            PointerEvent::Up { x, target, .. } => {
                let Some(press) = self.press.take() else {
                    return;
                };

                self.inertia = press.velocity * self.config.inertia_gain;
                if self.inertia.abs() <= self.config.inertia_min {
                    self.inertia = 0.0;
                    commands.push(SessionCommand::HoldRotation(false));
                }

                let travelled = (x - press.start_x).abs();
                match target {
                    Some(id) if travelled <= self.config.click_tolerance_px => {
                        commands.push(SessionCommand::DirectPick(Some(id)));
                    }
                    Some(id) => tracing::trace!(item = %id, travelled, "release after drag, not a click"),
                    None => {}
                }
            }
        }
    }

    fn frame(&mut self, commands: &mut Commands) {
        if self.press.is_some() || self.inertia == 0.0 {
            return;
        }

        commands.push(SessionCommand::RotateBy(self.inertia));
        self.inertia *= self.config.inertia_decay;
        if self.inertia.abs() < self.config.inertia_min {
            self.inertia = 0.0;
            commands.push(SessionCommand::HoldRotation(false));
        }
    }
}

impl InputAdapter for PointerAdapter {
    fn mode(&self) -> InputMode { InputMode::Pointer }

    fn translate(&mut self, event: &InputEvent) -> Commands {
        let mut commands = SmallVec::new();
        match *event {
            InputEvent::Pointer(pointer) => self.pointer(pointer, &mut commands),
            InputEvent::Tick(_) => self.frame(&mut commands),
            InputEvent::Gesture(_) => {}
        }
        commands
    }

    fn on_outcome(&mut self, _outcome: &Outcome) {}

    fn progress(&self, _now: Instant) -> f64 { 0.0 }

    fn is_armed(&self) -> bool { false }
}
