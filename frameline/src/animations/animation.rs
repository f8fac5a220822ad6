use std::fmt::{Debug, Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use log::trace;
use parking_lot::{Mutex, RwLock};

use crate::animations::Easing;
use crate::errors::{AlreadyMounted, Error, InvalidDuration, NotMounted};

/// Progress value handed to [`Animate::update`] for open-ended animations: their progress is undefined.
pub const UNDEFINED_PROGRESS: f32 = -1.0;

/// Global counter used to attribute a unique id to every created animation.
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// The declared duration of an [`Animation`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Duration {
    /// A finite duration, in seconds.
    Finite(f32),
    /// Never completes on its own: the animation runs until explicitly stopped (or stops itself).
    /// A live infinite animation always keeps its scheduler busy.
    Infinite,
    /// Runs alongside the others: it never keeps its scheduler busy, and only lives as long as
    /// the [`AlongsidePolicy`](crate::config::AlongsidePolicy) allows.
    Alongside,
}

impl Duration {
    /// Converts the duration into a number of frames at the given rate: `None` for open-ended durations.
    pub fn frames(&self, fps: f32) -> Option<u64> {
        match self {
            Duration::Finite(seconds) => Some((seconds * fps).round().max(0.0) as u64),
            _ => None,
        }
    }

    /// Indicates if the duration is open-ended ([`Duration::Infinite`] or [`Duration::Alongside`]).
    pub fn is_open_ended(&self) -> bool {
        !matches!(self, Duration::Finite(_))
    }
}

impl From<f32> for Duration {
    fn from(seconds: f32) -> Self {
        Duration::Finite(seconds)
    }
}

impl From<f64> for Duration {
    fn from(seconds: f64) -> Self {
        Duration::Finite(seconds as f32)
    }
}

impl Display for Duration {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Duration::Finite(seconds) => write!(f, "{}s", seconds),
            Duration::Infinite => write!(f, "INF"),
            Duration::Alongside => write!(f, "ALONGSIDE"),
        }
    }
}

/// The lifecycle state of an [`Animation`]: transitions only go forward.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum AnimationState {
    #[default]
    NotStarted,
    Running,
    Finished,
}

/// Unique identifier of an [`Animation`] (shared by all its clones).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnimationId(u64);

impl AnimationId {
    fn next() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw id value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl Display for AnimationId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The lifecycle hooks of an animation.
///
/// Implementors define *what* an animation does; the [`Scheduler`](crate::animations::Scheduler)
/// decides *when* each hook runs:
/// - [`Animate::start`] runs exactly once, on the mounted start frame.
/// - [`Animate::update`] runs on every frame strictly between start and end, with the eased progress
///   (never `0.0` nor `1.0` edges, those are covered by `start` and `end`). Open-ended animations
///   receive [`UNDEFINED_PROGRESS`].
/// - [`Animate::end`] runs exactly once, when the span completes or after the animation was stopped.
///   It should leave the animated subject in its final state.
///
/// All hooks default to doing nothing.
pub trait Animate: Send {
    /// Called once when the animation starts.
    fn start(&mut self, _cue: &mut Cue) -> Result<(), Error> {
        Ok(())
    }

    /// Called every frame between start and end with the eased progress.
    fn update(&mut self, _cue: &mut Cue, _progress: f32) -> Result<(), Error> {
        Ok(())
    }

    /// Called once after the animation ends.
    fn end(&mut self, _cue: &mut Cue) -> Result<(), Error> {
        Ok(())
    }
}

/// The hook-side view of a mounted [`Animation`] for the frame being processed.
#[derive(Clone, Debug)]
pub struct Cue {
    fps: f32,
    frame: u64,
    start_frame: u64,
    num_frames: Option<u64>,
    finished: bool,
}

impl Cue {
    /// Returns the frame rate the animation was mounted with.
    pub fn get_fps(&self) -> f32 {
        self.fps
    }

    /// Returns the current frame of the owning scheduler.
    pub fn get_frame(&self) -> u64 {
        self.frame
    }

    /// Returns the mounted start frame.
    pub fn get_start_frame(&self) -> u64 {
        self.start_frame
    }

    /// Returns the number of frames spanned by the animation (`None` when open-ended).
    pub fn get_num_frames(&self) -> Option<u64> {
        self.num_frames
    }

    /// Returns the number of frames elapsed since the start frame.
    pub fn get_elapsed(&self) -> u64 {
        self.frame.saturating_sub(self.start_frame)
    }

    /// Requests the animation to finish: its `end()` hook is called on the next scheduler step.
    pub fn finish(&mut self) {
        self.finished = true;
    }

    /// Indicates if a finish has been requested through this cue.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

/// Scheduling data owned by the scheduler the animation is mounted on.
#[derive(Debug)]
struct Timing {
    duration: Duration,
    easing: Easing,
    fps: f32,
    start_frame: Option<u64>,
    num_frames: Option<u64>,
    state: AnimationState,
    ended: bool,
    progress: Option<f32>,
}

/// Represents an animation: a timed unit of work driven frame by frame by a [`Scheduler`](crate::animations::Scheduler).
///
/// An `Animation` is a cheap handle: all its clones share the same state. This allows to keep a
/// handle around to [`stop`](Animation::stop) the animation or read its state, while the scheduler
/// owns another one.
///
/// # Example
/// ```
/// use frameline::animations::{Animate, Animation, Cue, Easing, Scheduler};
/// use frameline::errors::Error;
///
/// struct Fade;
///
/// impl Animate for Fade {
///     fn update(&mut self, _: &mut Cue, progress: f32) -> Result<(), Error> {
///         println!("opacity: {}", progress);
///         Ok(())
///     }
/// }
///
/// let mut scheduler = Scheduler::new(30.0).unwrap();
/// let fade = Animation::new(0.5, Fade).with_easing(Easing::SineInOut);
/// scheduler.add(fade.clone()).unwrap();
/// while scheduler.update().unwrap() {}
/// assert!(fade.is_finished());
/// ```
#[derive(Clone)]
pub struct Animation {
    id: AnimationId,
    timing: Arc<RwLock<Timing>>,
    hooks: Arc<Mutex<Box<dyn Animate>>>,
}

impl Animation {
    /// Creates a new unmounted animation from its duration and lifecycle hooks.
    pub fn new<D: Into<Duration>, A: Animate + 'static>(duration: D, hooks: A) -> Self {
        Self {
            id: AnimationId::next(),
            timing: Arc::new(RwLock::new(Timing {
                duration: duration.into(),
                easing: Easing::default(),
                fps: 0.0,
                start_frame: None,
                num_frames: None,
                state: AnimationState::NotStarted,
                ended: false,
                progress: None,
            })),
            hooks: Arc::new(Mutex::new(Box::new(hooks))),
        }
    }

    /// Sets the easing function applied to the progress (default: [`Easing::CubicInOut`]).
    pub fn with_easing(self, easing: Easing) -> Self {
        self.timing.write().easing = easing;
        self
    }

    /// Forces the animation to finish.
    ///
    /// The state becomes [`AnimationState::Finished`] right away while the `end()` hook runs on the
    /// next step of the owning scheduler. Stopping an animation that already ended is a no-op.
    pub fn stop(&self) {
        let mut timing = self.timing.write();
        if !timing.ended {
            timing.state = AnimationState::Finished;
        }
    }

    /// Returns the animation unique id.
    pub fn get_id(&self) -> AnimationId {
        self.id
    }

    /// Returns the declared duration.
    pub fn get_duration(&self) -> Duration {
        self.timing.read().duration
    }

    /// Returns the easing function.
    pub fn get_easing(&self) -> Easing {
        self.timing.read().easing
    }

    /// Returns the current lifecycle state.
    pub fn get_state(&self) -> AnimationState {
        self.timing.read().state
    }

    /// Returns the last eased progress: `0.0` once started, `1.0` once ended.
    /// Always `None` for open-ended animations or before start.
    pub fn get_progress(&self) -> Option<f32> {
        self.timing.read().progress
    }

    /// Returns the start frame (once mounted).
    pub fn get_start_frame(&self) -> Option<u64> {
        self.timing.read().start_frame
    }

    /// Returns the number of frames spanned (once mounted, `None` when open-ended).
    pub fn get_num_frames(&self) -> Option<u64> {
        self.timing.read().num_frames
    }

    /// Indicates if the animation has been mounted on a scheduler.
    pub fn is_mounted(&self) -> bool {
        self.timing.read().start_frame.is_some()
    }

    /// Indicates if the animation has finished (ended or stopped).
    pub fn is_finished(&self) -> bool {
        self.get_state() == AnimationState::Finished
    }

    // ########################################
    // Scheduler side.

    /// Mounts the animation at the given frame: fixes its frame span once and for all.
    /// An explicit `num_frames` overrides the one derived from the declared duration.
    pub(crate) fn mount(
        &self,
        fps: f32,
        start_frame: u64,
        num_frames: Option<u64>,
    ) -> Result<(), Error> {
        let mut timing = self.timing.write();
        if timing.start_frame.is_some() {
            return Err(AlreadyMounted { id: self.id.0 });
        }
        if let Duration::Finite(seconds) = timing.duration {
            if !seconds.is_finite() || seconds < 0.0 {
                return Err(InvalidDuration { duration: seconds });
            }
        }
        timing.fps = fps;
        timing.start_frame = Some(start_frame);
        timing.num_frames = num_frames.or_else(|| timing.duration.frames(fps));
        trace!(
            "Mount animation {} at frame {} for {:?} frames",
            self.id,
            start_frame,
            timing.num_frames
        );
        Ok(())
    }

    /// Indicates an alongside animation whose span was not overridden at mount.
    pub(crate) fn is_alongside(&self) -> bool {
        let timing = self.timing.read();
        timing.duration == Duration::Alongside && timing.num_frames.is_none()
    }

    /// Indicates if the `end()` hook has run.
    pub(crate) fn has_ended(&self) -> bool {
        self.timing.read().ended
    }

    /// Runs the `start()` hook and moves to [`AnimationState::Running`].
    pub(crate) fn begin(&self, frame: u64) -> Result<(), Error> {
        {
            let mut timing = self.timing.write();
            if timing.state == AnimationState::NotStarted {
                timing.state = AnimationState::Running;
            }
            timing.progress = timing.num_frames.map(|_| 0.0);
        }
        self.invoke(frame, |hooks, cue| hooks.start(cue))
    }

    /// Runs the `update()` hook with the eased progress matching the given frame.
    pub(crate) fn advance(&self, frame: u64) -> Result<(), Error> {
        let progress = {
            let mut timing = self.timing.write();
            let start_frame = timing.start_frame.unwrap_or_default();
            match timing.num_frames {
                None => UNDEFINED_PROGRESS,
                Some(num_frames) => {
                    let linear = match num_frames {
                        0 => 1.0,
                        _ => (frame.saturating_sub(start_frame) as f32 / num_frames as f32).clamp(0.0, 1.0),
                    };
                    let eased = timing.easing.call(linear);
                    timing.progress = Some(eased);
                    eased
                }
            }
        };
        self.invoke(frame, |hooks, cue| hooks.update(cue, progress))
    }

    /// Runs the `end()` hook (once) and moves to [`AnimationState::Finished`].
    pub(crate) fn complete(&self, frame: u64) -> Result<(), Error> {
        {
            let mut timing = self.timing.write();
            if timing.ended {
                return Ok(());
            }
            timing.ended = true;
            timing.state = AnimationState::Finished;
            timing.progress = timing.num_frames.map(|_| 1.0);
        }
        self.invoke(frame, |hooks, cue| hooks.end(cue))
    }

    /// Calls a hook with a fresh [`Cue`]. The timing lock is not held during the call so hooks
    /// may freely read (or stop) any animation handle.
    fn invoke<F>(&self, frame: u64, hook: F) -> Result<(), Error>
    where
        F: FnOnce(&mut Box<dyn Animate>, &mut Cue) -> Result<(), Error>,
    {
        let mut cue = {
            let timing = self.timing.read();
            let start_frame = timing.start_frame.ok_or(NotMounted { id: self.id.0 })?;
            Cue {
                fps: timing.fps,
                frame,
                start_frame,
                num_frames: timing.num_frames,
                finished: false,
            }
        };

        let result = {
            let mut hooks = self.hooks.lock();
            hook(&mut hooks, &mut cue)
        };

        if cue.finished {
            self.stop();
        }
        result
    }
}

impl PartialEq for Animation {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Animation {}

impl Debug for Animation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let timing = self.timing.read();
        f.debug_struct("Animation")
            .field("id", &self.id)
            .field("duration", &timing.duration)
            .field("start_frame", &timing.start_frame)
            .field("num_frames", &timing.num_frames)
            .field("state", &timing.state)
            .finish()
    }
}

impl Display for Animation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let timing = self.timing.read();
        write!(
            f,
            "Animation {} [duration={}, state={:?}]",
            self.id, timing.duration, timing.state
        )
    }
}
