use std::fmt::{Display, Formatter};

use log::{debug, trace, warn};

use crate::animations::{Animation, AnimationState, Once};
use crate::config::{AlongsidePolicy, SchedulerConfig};
use crate::errors::{Error, InvalidRange, InvalidTime};

/// Explicit placement of an [`Animation`] on the [`Scheduler`] timeline.
///
/// - A start `time` (seconds) overrides a start `frame`, which overrides the scheduler marker.
/// - When an end is given, the animation spans exactly `end - start` frames whatever its declared duration.
/// - An empty placement places the animation at the scheduler marker (see [`Scheduler::add`]).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Placement {
    start_time: Option<f32>,
    start_frame: Option<u64>,
    end_time: Option<f32>,
    end_frame: Option<u64>,
}

impl Placement {
    /// Places the animation start at the given time (in seconds).
    pub fn at_time(time: f32) -> Self {
        Self::default().set_start_time(time)
    }

    /// Places the animation start at the given frame.
    pub fn at_frame(frame: u64) -> Self {
        Self::default().set_start_frame(frame)
    }

    /// Forces the animation end at the given time (in seconds).
    pub fn until_time(self, time: f32) -> Self {
        self.set_end_time(time)
    }

    /// Forces the animation end at the given frame.
    pub fn until_frame(self, frame: u64) -> Self {
        self.set_end_frame(frame)
    }

    pub fn get_start_time(&self) -> Option<f32> {
        self.start_time
    }
    pub fn get_start_frame(&self) -> Option<u64> {
        self.start_frame
    }
    pub fn get_end_time(&self) -> Option<f32> {
        self.end_time
    }
    pub fn get_end_frame(&self) -> Option<u64> {
        self.end_frame
    }

    pub fn set_start_time(mut self, time: f32) -> Self {
        self.start_time = Some(time);
        self
    }
    pub fn set_start_frame(mut self, frame: u64) -> Self {
        self.start_frame = Some(frame);
        self
    }
    pub fn set_end_time(mut self, time: f32) -> Self {
        self.end_time = Some(time);
        self
    }
    pub fn set_end_frame(mut self, frame: u64) -> Self {
        self.end_frame = Some(frame);
        self
    }
}

/// Owns a collection of mounted [`Animation`]s and steps them exactly once per [`Scheduler::update`].
///
/// The scheduler keeps its own frame counter along with a *marker*: the frame at which the next
/// animation added without explicit placement will start. Multiple [`Scheduler::add`] calls stack
/// animations in parallel at the marker; [`Scheduler::wait`] moves the marker after the longest of them.
///
/// Within a single step:
/// 1. animations whose span completed (or that were stopped) receive `end()`, then zero-duration
///    animations due at this frame receive `start()` immediately followed by `end()`;
/// 2. animations due at this frame receive `start()`, the ones already running receive `update()`;
/// 3. the frame counter moves forward.
///
/// All `end()` calls of a frame therefore happen before any `start()` of that same frame: an
/// animation chained after another always sees the settled result of the previous one.
///
/// # Example
/// ```
/// use frameline::animations::{Animation, Scheduler, Wait};
///
/// let mut scheduler = Scheduler::new(30.0).unwrap();
/// scheduler.add(Wait::new(3.0)).unwrap();
/// scheduler.add(Wait::new(1.0)).unwrap();
/// scheduler.wait_frames(0);
/// // Starts after the longest of both: at frame 90.
/// let last = Animation::from(Wait::new(2.0));
/// scheduler.add(last.clone()).unwrap();
/// assert_eq!(last.get_start_frame(), Some(90));
///
/// let frames = scheduler.run(1000).unwrap();
/// assert_eq!(frames, 151);
/// ```
#[derive(Debug)]
pub struct Scheduler {
    config: SchedulerConfig,
    /// The live animations.
    animations: Vec<Animation>,
    /// The scheduler own clock: incremented once per effective update.
    frame_count: u64,
    /// The frame at which the next implicitly placed animation will start.
    marker_frame: u64,
    /// The longest span of the animations added at the marker since it last moved.
    marker_span: u64,
    running: bool,
    /// Set when the last update reported no more work.
    idle: bool,
}

impl Scheduler {
    /// Creates a scheduler running at the given frame rate with default configuration.
    pub fn new(fps: f32) -> Result<Self, Error> {
        Self::with_config(SchedulerConfig::default().set_fps(fps))
    }

    /// Creates a scheduler from the given configuration.
    pub fn with_config(config: SchedulerConfig) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            config,
            animations: vec![],
            frame_count: 0,
            marker_frame: 0,
            marker_span: 0,
            running: config.is_autostart(),
            idle: false,
        })
    }

    /// Adds an animation at the current marker.
    ///
    /// Multiple calls without [`Scheduler::wait`] in between make the animations play in parallel.
    /// Open-ended animations never move the marker.
    ///
    /// # Errors
    /// Fails if the animation has already been mounted (here or on any other scheduler).
    pub fn add<A: Into<Animation>>(&mut self, animation: A) -> Result<(), Error> {
        self.add_with(animation, Placement::default())
    }

    /// Adds an animation with an explicit [`Placement`].
    ///
    /// An empty placement is equivalent to [`Scheduler::add`]. Explicitly placed animations do not
    /// affect the marker.
    ///
    /// # Errors
    /// Fails if the animation is already mounted, if a given time is negative, or if the end is
    /// placed before the start.
    pub fn add_with<A: Into<Animation>>(
        &mut self,
        animation: A,
        placement: Placement,
    ) -> Result<(), Error> {
        let animation = animation.into();
        let start = self.resolve_frame(placement.start_time, placement.start_frame)?;
        let end = self.resolve_frame(placement.end_time, placement.end_frame)?;
        let implicit = start.is_none() && end.is_none();

        let start_frame = start.unwrap_or(self.marker_frame);
        let num_frames = match end {
            None => None,
            Some(end) if end < start_frame => {
                return Err(InvalidRange {
                    start: start_frame,
                    end,
                })
            }
            Some(end) => Some(end - start_frame),
        };

        animation.mount(self.config.get_fps(), start_frame, num_frames)?;

        if implicit {
            // Open-ended animations (no frame count) do not extend the marker.
            if let Some(num_frames) = animation.get_num_frames() {
                self.marker_span = self.marker_span.max(num_frames);
            }
        }
        if start_frame < self.frame_count {
            warn!(
                "Animation {} mounted at frame {} while the scheduler is at frame {}: it starts late",
                animation.get_id(),
                start_frame,
                self.frame_count
            );
        }

        debug!(
            "Add animation {} at frame {} (marker: {}+{})",
            animation.get_id(),
            start_frame,
            self.marker_frame,
            self.marker_span
        );
        self.idle = false;
        self.animations.push(animation);
        Ok(())
    }

    /// Moves the marker after the animations added since it last moved, plus the given delay.
    ///
    /// The delay is given either as a `time` in seconds (which takes precedence) or as a number of
    /// `frames`. Without any, the marker simply closes the current batch of parallel animations.
    ///
    /// # Errors
    /// Fails if the time is negative or not finite.
    pub fn wait(&mut self, time: Option<f32>, frames: Option<u64>) -> Result<(), Error> {
        let frames = self.resolve_frame(time, frames)?.unwrap_or(0);
        self.advance_marker(frames);
        Ok(())
    }

    /// Moves the marker (see [`Scheduler::wait`]) with a delay in seconds.
    pub fn wait_time(&mut self, time: f32) -> Result<(), Error> {
        self.wait(Some(time), None)
    }

    /// Moves the marker (see [`Scheduler::wait`]) with a delay in frames.
    pub fn wait_frames(&mut self, frames: u64) {
        self.advance_marker(frames);
    }

    /// Adds all the given animations in parallel at the marker, then moves the marker one frame
    /// after the longest of them.
    pub fn play<I, A>(&mut self, animations: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = A>,
        A: Into<Animation>,
    {
        for animation in animations {
            self.add(animation)?;
        }
        self.wait_frames(1);
        Ok(())
    }

    /// Hooks a callback at the current point of the timeline: it is called once, on the marker frame.
    pub fn hook<F>(&mut self, callback: F) -> Result<Animation, Error>
    where
        F: FnMut() + Send + 'static,
    {
        let animation = Animation::from(Once::new(callback));
        self.add(animation.clone())?;
        Ok(animation)
    }

    /// Moves the marker to the current frame, dropping any pending span.
    pub fn reset_marker(&mut self) {
        self.marker_frame = self.frame_count;
        self.marker_span = 0;
    }

    /// Resumes the scheduler: updates advance animations again.
    pub fn start(&mut self) {
        self.running = true;
    }

    /// Pauses the scheduler: updates do not advance anything until started again.
    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Steps every live animation once.
    ///
    /// Returns `true` as long as further updates are meaningful: some animation other than an
    /// alongside one is still live, or the frame counter has not caught up with the marker.
    /// A paused scheduler does not step anything and only reports its pending status.
    ///
    /// # Errors
    /// Any error returned by an animation hook is propagated as is (the current step is interrupted).
    pub fn update(&mut self) -> Result<bool, Error> {
        if !self.running {
            return Ok(self.is_pending());
        }

        if self.idle
            && self.config.get_alongside() == AlongsidePolicy::FinishWhenIdle
            && !self.is_pending()
        {
            self.finish_alongside()?;
        }

        trace!(
            "Step frame {} ({} animations)",
            self.frame_count,
            self.animations.len()
        );
        self.end_pass()?;
        self.progress_pass()?;

        let pending = self.is_pending();
        self.idle = !pending;
        Ok(pending)
    }

    /// Updates the scheduler until it has no more work, or until `max_frames` updates have been done.
    ///
    /// Returns the number of updates done. A paused scheduler is not updated at all.
    pub fn run(&mut self, max_frames: u64) -> Result<u64, Error> {
        let mut frames = 0;
        if !self.running {
            return Ok(frames);
        }
        while frames < max_frames {
            frames += 1;
            if !self.update()? {
                break;
            }
        }
        Ok(frames)
    }

    /// Ends every live animation right away, whether its span elapsed or not.
    pub fn finish_all(&mut self) -> Result<(), Error> {
        let frame = self.frame_count;
        for animation in &self.animations {
            animation.complete(frame)?;
        }
        self.animations.clear();
        Ok(())
    }

    /// Indicates whether some work is left: a live animation other than an alongside one, or a
    /// marker not yet reached by the frame counter.
    pub fn is_pending(&self) -> bool {
        self.animations
            .iter()
            .any(|animation| !animation.is_alongside() && !animation.has_ended())
            || self.frame_count < self.marker_frame + self.marker_span
    }

    /// Membership test against the live animations.
    pub fn contains(&self, animation: &Animation) -> bool {
        self.animations.iter().any(|live| live == animation)
    }

    // ########################################
    // Frame passes.

    /// Ends the animations whose span completed or that were stopped, then starts and ends the
    /// zero-duration animations due at the current frame.
    pub(crate) fn end_pass(&mut self) -> Result<(), Error> {
        let frame = self.frame_count;
        self.animations.retain(|animation| !animation.has_ended());

        let ending: Vec<Animation> = self
            .animations
            .iter()
            .filter(|animation| Self::is_ending(animation, frame))
            .cloned()
            .collect();
        let instants: Vec<Animation> = self
            .animations
            .iter()
            .filter(|animation| Self::is_instant(animation, frame))
            .cloned()
            .collect();

        for animation in &ending {
            debug!("End animation {} at frame {}", animation.get_id(), frame);
            animation.complete(frame)?;
        }
        for animation in &instants {
            animation.begin(frame)?;
            animation.complete(frame)?;
        }

        self.animations.retain(|animation| !animation.has_ended());
        Ok(())
    }

    /// Starts the animations due at the current frame and updates the running ones, then moves the
    /// frame counter forward.
    pub(crate) fn progress_pass(&mut self) -> Result<(), Error> {
        let frame = self.frame_count;
        let mut instants = vec![];

        for animation in &self.animations {
            let (Some(start_frame), num_frames) =
                (animation.get_start_frame(), animation.get_num_frames())
            else {
                continue;
            };
            match animation.get_state() {
                AnimationState::NotStarted if start_frame <= frame => {
                    animation.begin(frame)?;
                    if num_frames == Some(0) {
                        instants.push(animation.clone());
                    }
                }
                AnimationState::Running if start_frame < frame => match num_frames {
                    None => animation.advance(frame)?,
                    Some(num_frames) if frame - start_frame < num_frames => {
                        animation.advance(frame)?
                    }
                    Some(_) => (),
                },
                _ => (),
            }
        }

        // Zero-duration animations mounted after the end pass of this frame.
        for animation in &instants {
            animation.complete(frame)?;
        }
        if !instants.is_empty() {
            self.animations.retain(|animation| !animation.has_ended());
        }

        self.frame_count += 1;
        Ok(())
    }

    /// Moves the marker after the pending span plus `frames`, and closes the span.
    fn advance_marker(&mut self, frames: u64) {
        self.marker_frame += self.marker_span + frames;
        self.marker_span = 0;
        debug!("Move marker to frame {}", self.marker_frame);
    }

    /// Ends every live alongside animation.
    fn finish_alongside(&mut self) -> Result<(), Error> {
        let frame = self.frame_count;
        for animation in self.animations.iter().filter(|a| a.is_alongside()) {
            debug!(
                "End alongside animation {} at frame {}",
                animation.get_id(),
                frame
            );
            animation.complete(frame)?;
        }
        self.animations.retain(|animation| !animation.has_ended());
        Ok(())
    }

    fn is_ending(animation: &Animation, frame: u64) -> bool {
        match animation.get_state() {
            AnimationState::Finished => true,
            AnimationState::Running => matches!(
                (animation.get_start_frame(), animation.get_num_frames()),
                (Some(start_frame), Some(num_frames)) if frame >= start_frame + num_frames
            ),
            AnimationState::NotStarted => false,
        }
    }

    fn is_instant(animation: &Animation, frame: u64) -> bool {
        animation.get_state() == AnimationState::NotStarted
            && animation.get_num_frames() == Some(0)
            && animation
                .get_start_frame()
                .is_some_and(|start_frame| start_frame <= frame)
    }

    /// Converts an optional time (preferred) or frame into a frame.
    fn resolve_frame(&self, time: Option<f32>, frame: Option<u64>) -> Result<Option<u64>, Error> {
        match (time, frame) {
            (Some(time), _) if !time.is_finite() || time < 0.0 => Err(InvalidTime { time }),
            (Some(time), _) => Ok(Some((time * self.config.get_fps()).round() as u64)),
            (None, frame) => Ok(frame),
        }
    }

    // ########################################
    // Getters.

    pub fn get_config(&self) -> &SchedulerConfig {
        &self.config
    }
    pub fn get_fps(&self) -> f32 {
        self.config.get_fps()
    }
    pub fn get_frame_count(&self) -> u64 {
        self.frame_count
    }
    pub fn get_marker_frame(&self) -> u64 {
        self.marker_frame
    }
    pub fn get_marker_span(&self) -> u64 {
        self.marker_span
    }
    pub fn get_animations(&self) -> &[Animation] {
        &self.animations
    }
    pub fn is_running(&self) -> bool {
        self.running
    }
    pub fn len(&self) -> usize {
        self.animations.len()
    }
    pub fn is_empty(&self) -> bool {
        self.animations.is_empty()
    }
}

impl Display for Scheduler {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Scheduler [fps={}, frame={}, marker={}+{}, animations={}]",
            self.config.get_fps(),
            self.frame_count,
            self.marker_frame,
            self.marker_span,
            self.animations.len()
        )?;
        for animation in &self.animations {
            writeln!(
                f,
                "  {} from frame {} for {} frames",
                animation,
                animation.get_start_frame().unwrap_or_default(),
                match animation.get_num_frames() {
                    None => String::from("INF"),
                    Some(num_frames) => num_frames.to_string(),
                }
            )?;
        }
        write!(f, "")
    }
}
