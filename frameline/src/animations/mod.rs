//! Defines frame-quantized animations and the scheduler driving them.
//!
//! An [`Animation`] declares *what* happens through its [`Animate`] hooks, a [`Scheduler`] decides
//! *when*: it owns a frame counter and steps every mounted animation exactly once per update.
//! Composites ([`StaggeredGroup`], [`Sequencer`]) drive their children with a private scheduler.

mod animation;
mod basic;
mod easing;
mod scheduler;
mod sequencer;
mod stagger;

pub use animation::{
    Animate, Animation, AnimationId, AnimationState, Cue, Duration, UNDEFINED_PROGRESS,
};
pub use basic::{Drift, Once, Tween, Until, Wait};
pub use easing::Easing;
pub use scheduler::{Placement, Scheduler};
pub use sequencer::{Batch, Sequencer};
pub use stagger::{StaggerOrder, StaggeredGroup};
