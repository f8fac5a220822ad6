#![doc(html_root_url = "https://docs.rs/frameline/0.1.0-beta")]

//! <h1 align="center">FRAMELINE - Frame-quantized animation scheduling</h1>
//! <div style="text-align:center;font-style:italic;">Frameline steps timed animations frame by frame, exactly once each, in a deterministic order.</div>
//!
//! # Features
//!
//! - Describe what an animation does through its [`Animate`](animations::Animate) hooks: `start`, `update` (eased progress) and `end`.
//! - Lay animations out on a [`Scheduler`](animations::Scheduler) timeline: in parallel at its marker, one after the
//!   other with [`wait`](animations::Scheduler::wait), or at explicit [`Placement`](animations::Placement)s.
//! - Fan a single duration out to staggered children with a [`StaggeredGroup`](animations::StaggeredGroup).
//! - Chain lazily built batches with a [`Sequencer`](animations::Sequencer).
//! - Play a scheduler in real time with the tokio-based [`Player`](player::Player).
//!
//! # Getting Started
//!
//! ```rust
//! use frameline::animations::{Animation, Easing, Scheduler, Tween, Wait};
//!
//! let mut scheduler = Scheduler::new(30.0).unwrap();
//!
//! // Fades in for 1s, while waiting 0.5s.
//! scheduler
//!     .add(Animation::from(Tween::new(1.0, |opacity| println!("opacity: {}", opacity))).with_easing(Easing::SineOut))
//!     .unwrap();
//! scheduler.add(Wait::new(0.5)).unwrap();
//!
//! // Then, once both are done: a message.
//! scheduler.wait_frames(0);
//! scheduler.hook(|| println!("done")).unwrap();
//!
//! while scheduler.update().unwrap() {}
//! ```
//!
//! # Feature flags
//!
//! - **serde** -- Enables serialize/deserialize capabilities for durations, easings and configuration.
//! - **mocks** -- Provides mocked animations recording their lifecycle (useful for tests mostly).

pub mod animations;
pub mod config;
pub mod errors;
#[cfg(any(test, feature = "mocks"))]
pub mod mocks;
pub mod player;

#[cfg(test)]
mod tests {
    #[test]
    fn test_html_root_url() {
        version_sync::assert_html_root_url_updated!("src/lib.rs");
    }
}
