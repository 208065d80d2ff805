//! Arcana - the selection core of a gesture driven card reading.
//!
//! Cards sit on a slowly rotating ring. A user picks a fixed number of them
//! with hand gestures or the pointer, and every pick plays a cancellable
//! converge, reveal and dock animation. The renderer and the gesture
//! classifier live outside this crate and plug in through traits.

pub mod config;
pub mod error;
pub mod modules;

pub use error::ArcanaError;
pub use modules::deck::{CardInfo, Deck};
pub use modules::selection::{
    FinalDraw, InputEvent, InputMode, SelectionActor, SelectionActorHandle, SelectionContext,
};
use tracing_subscriber::EnvFilter;

/// Default log filter when `RUST_LOG` is not set.
const DEFAULT_LOG_FILTER: &str = "arcana=info";

/// Installs a formatted `tracing` subscriber honoring `RUST_LOG`.
///
/// Returns `false` if a global subscriber was already installed, which makes
/// repeated calls harmless.
pub fn init_tracing() -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).try_init().is_ok()
}
