//! Simple ready-made animations built on closures.

use crate::animations::{Animate, Animation, Cue, Duration};
use crate::errors::Error;

/// A do-nothing animation: simply lasts for its duration.
#[derive(Clone, Copy, Debug, Default)]
pub struct Wait {
    duration: f32,
}

impl Wait {
    /// Creates a wait of the given duration (in seconds).
    pub fn new(duration: f32) -> Self {
        Self { duration }
    }
}

impl Animate for Wait {}

impl From<Wait> for Animation {
    fn from(wait: Wait) -> Self {
        Animation::new(wait.duration, wait)
    }
}

/// A zero-duration animation calling the given callback once, on its start frame.
pub struct Once<F> {
    callback: F,
}

impl<F: FnMut() + Send> Once<F> {
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F: FnMut() + Send> Animate for Once<F> {
    fn start(&mut self, _: &mut Cue) -> Result<(), Error> {
        (self.callback)();
        Ok(())
    }
}

impl<F: FnMut() + Send + 'static> From<Once<F>> for Animation {
    fn from(once: Once<F>) -> Self {
        Animation::new(Duration::Finite(0.0), once)
    }
}

type Callback = Box<dyn FnMut() + Send>;

/// A timed animation handing its progress to a callback.
///
/// The callback receives `0.0` on start, the eased progress on every frame in between, and `1.0`
/// on end.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use parking_lot::RwLock;
/// use frameline::animations::{Animation, Easing, Scheduler, Tween};
///
/// let opacity = Arc::new(RwLock::new(0.0));
/// let target = opacity.clone();
///
/// let mut scheduler = Scheduler::new(30.0).unwrap();
/// scheduler
///     .add(Animation::from(Tween::new(0.5, move |progress| *target.write() = progress)).with_easing(Easing::SineOut))
///     .unwrap();
/// scheduler.run(100).unwrap();
/// assert_eq!(*opacity.read(), 1.0);
/// ```
pub struct Tween {
    duration: Duration,
    on_progress: Box<dyn FnMut(f32) + Send>,
    on_start: Option<Callback>,
    on_end: Option<Callback>,
}

impl Tween {
    pub fn new<D, F>(duration: D, on_progress: F) -> Self
    where
        D: Into<Duration>,
        F: FnMut(f32) + Send + 'static,
    {
        Self {
            duration: duration.into(),
            on_progress: Box::new(on_progress),
            on_start: None,
            on_end: None,
        }
    }

    /// Registers a callback run right after the initial progress was applied.
    pub fn on_start<F: FnMut() + Send + 'static>(mut self, callback: F) -> Self {
        self.on_start = Some(Box::new(callback));
        self
    }

    /// Registers a callback run right after the final progress was applied.
    pub fn on_end<F: FnMut() + Send + 'static>(mut self, callback: F) -> Self {
        self.on_end = Some(Box::new(callback));
        self
    }
}

impl Animate for Tween {
    fn start(&mut self, _: &mut Cue) -> Result<(), Error> {
        (self.on_progress)(0.0);
        if let Some(callback) = self.on_start.as_mut() {
            callback();
        }
        Ok(())
    }

    fn update(&mut self, _: &mut Cue, progress: f32) -> Result<(), Error> {
        (self.on_progress)(progress);
        Ok(())
    }

    fn end(&mut self, _: &mut Cue) -> Result<(), Error> {
        (self.on_progress)(1.0);
        if let Some(callback) = self.on_end.as_mut() {
            callback();
        }
        Ok(())
    }
}

impl From<Tween> for Animation {
    fn from(tween: Tween) -> Self {
        Animation::new(tween.duration, tween)
    }
}

/// An open-ended animation calling its callback on start and on every frame, until it returns `true`.
pub struct Until<F> {
    callback: F,
}

impl<F: FnMut() -> bool + Send> Until<F> {
    pub fn new(callback: F) -> Self {
        Self { callback }
    }

    fn poll(&mut self, cue: &mut Cue) {
        if (self.callback)() {
            cue.finish();
        }
    }
}

impl<F: FnMut() -> bool + Send> Animate for Until<F> {
    fn start(&mut self, cue: &mut Cue) -> Result<(), Error> {
        self.poll(cue);
        Ok(())
    }

    fn update(&mut self, cue: &mut Cue, _: f32) -> Result<(), Error> {
        self.poll(cue);
        Ok(())
    }
}

impl<F: FnMut() -> bool + Send + 'static> From<Until<F>> for Animation {
    fn from(until: Until<F>) -> Self {
        Animation::new(Duration::Infinite, until)
    }
}

/// An infinite animation applying a constant per-second rate.
///
/// Every frame after the start one, the callback receives the per-frame share of the rate
/// (`rate / fps`): use it to keep something rotating, moving, scaling...
pub struct Drift<F> {
    rate: f32,
    step: f32,
    callback: F,
}

impl<F: FnMut(f32) + Send> Drift<F> {
    pub fn new(rate: f32, callback: F) -> Self {
        Self {
            rate,
            step: 0.0,
            callback,
        }
    }
}

impl<F: FnMut(f32) + Send> Animate for Drift<F> {
    fn start(&mut self, cue: &mut Cue) -> Result<(), Error> {
        self.step = self.rate / cue.get_fps();
        Ok(())
    }

    fn update(&mut self, _: &mut Cue, _: f32) -> Result<(), Error> {
        (self.callback)(self.step);
        Ok(())
    }
}

impl<F: FnMut(f32) + Send + 'static> From<Drift<F>> for Animation {
    fn from(drift: Drift<F>) -> Self {
        Animation::new(Duration::Infinite, drift)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use parking_lot::RwLock;

    use crate::animations::{AnimationState, Easing, Scheduler};

    use super::*;

    #[test]
    fn test_wait() {
        let mut scheduler = Scheduler::new(30.0).unwrap();
        let wait = Animation::from(Wait::new(2.0));
        assert_eq!(wait.get_duration(), Duration::Finite(2.0));
        scheduler.add(wait.clone()).unwrap();
        assert_eq!(scheduler.run(1000).unwrap(), 61);
        assert!(wait.is_finished());
    }

    #[test]
    fn test_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut scheduler = Scheduler::new(30.0).unwrap();
        scheduler.wait_frames(5);
        let once = Animation::from(Once::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        scheduler.add(once.clone()).unwrap();
        assert_eq!(once.get_num_frames(), Some(0));

        scheduler.run(5).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        scheduler.run(100).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(once.is_finished());
    }

    #[test]
    fn test_tween() {
        let values = Arc::new(RwLock::new(vec![]));
        let captured = values.clone();
        let started = Arc::new(AtomicUsize::new(0));
        let ended = Arc::new(AtomicUsize::new(0));
        let (start_counter, end_counter) = (started.clone(), ended.clone());

        let tween = Tween::new(1.0, move |progress| captured.write().push(progress))
            .on_start(move || {
                start_counter.fetch_add(1, Ordering::SeqCst);
            })
            .on_end(move || {
                end_counter.fetch_add(1, Ordering::SeqCst);
            });

        let mut scheduler = Scheduler::new(4.0).unwrap();
        scheduler
            .add(Animation::from(tween).with_easing(Easing::Linear))
            .unwrap();
        scheduler.run(100).unwrap();

        assert_eq!(*values.read(), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(started.load(Ordering::SeqCst), 1);
        assert_eq!(ended.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_until() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let until = Animation::from(Until::new(move || {
            counter.fetch_add(1, Ordering::SeqCst) + 1 >= 3
        }));

        let mut scheduler = Scheduler::new(30.0).unwrap();
        scheduler.add(until.clone()).unwrap();
        assert!(scheduler.update().unwrap());
        assert!(scheduler.update().unwrap());
        assert_eq!(until.get_state(), AnimationState::Running);
        assert!(scheduler.update().unwrap());
        assert_eq!(until.get_state(), AnimationState::Finished);
        // Ended on the following step.
        assert!(!scheduler.update().unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(!scheduler.contains(&until));
    }

    #[test]
    fn test_drift() {
        let angle = Arc::new(RwLock::new(0.0f32));
        let rotated = angle.clone();
        let drift = Animation::from(Drift::new(90.0, move |delta| *rotated.write() += delta));

        let mut scheduler = Scheduler::new(30.0).unwrap();
        scheduler.add(drift.clone()).unwrap();
        for _ in 0..31 {
            assert!(scheduler.update().unwrap());
        }
        assert!((*angle.read() - 90.0).abs() < 1e-3);

        drift.stop();
        assert!(!scheduler.update().unwrap());
    }
}
