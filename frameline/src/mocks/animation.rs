use std::fmt::{Display, Formatter};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::animations::{Animate, Animation, Cue, Duration};
use crate::errors::{Callback, Error};

/// A lifecycle hook call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    Start,
    Update,
    End,
}

/// A single [`Journal`] line.
#[derive(Clone, Debug, PartialEq)]
pub struct Entry {
    /// The frame of the scheduler running the hook.
    pub frame: u64,
    pub label: String,
    pub event: Event,
    /// The progress received by `update()`.
    pub progress: Option<f32>,
}

/// Shared, ordered record of hook calls.
#[derive(Clone, Debug, Default)]
pub struct Journal {
    entries: Arc<Mutex<Vec<Entry>>>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record<S: Into<String>>(&self, frame: u64, label: S, event: Event, progress: Option<f32>) {
        self.entries.lock().push(Entry {
            frame,
            label: label.into(),
            event,
            progress,
        });
    }

    /// Returns a copy of all the entries, in call order.
    pub fn entries(&self) -> Vec<Entry> {
        self.entries.lock().clone()
    }

    /// Returns the `(label, event)` pairs, in call order.
    pub fn events(&self) -> Vec<(String, Event)> {
        self.entries
            .lock()
            .iter()
            .map(|entry| (entry.label.clone(), entry.event))
            .collect()
    }

    /// Counts the calls of `event` for `label`.
    pub fn count(&self, label: &str, event: Event) -> usize {
        self.select(label, event).len()
    }

    /// Returns the frames at which `label` received `event`.
    pub fn frames(&self, label: &str, event: Event) -> Vec<u64> {
        self.select(label, event)
            .iter()
            .map(|entry| entry.frame)
            .collect()
    }

    /// Returns the progress values received by `label` updates.
    pub fn progresses(&self, label: &str) -> Vec<f32> {
        self.select(label, Event::Update)
            .iter()
            .filter_map(|entry| entry.progress)
            .collect()
    }

    /// Returns the position in the journal of the first `event` received by `label`.
    pub fn position(&self, label: &str, event: Event) -> Option<usize> {
        self.entries
            .lock()
            .iter()
            .position(|entry| entry.label == label && entry.event == event)
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    fn select(&self, label: &str, event: Event) -> Vec<Entry> {
        self.entries
            .lock()
            .iter()
            .filter(|entry| entry.label == label && entry.event == event)
            .cloned()
            .collect()
    }
}

/// Mock [`Animate`] implementation writing every hook call to a [`Journal`].
#[derive(Clone, Debug)]
pub struct MockAnimation {
    label: String,
    duration: Duration,
    journal: Journal,
    failing_on: Option<Event>,
}

impl MockAnimation {
    pub fn new<S: Into<String>>(label: S, journal: &Journal) -> Self {
        Self {
            label: label.into(),
            duration: Duration::Finite(1.0),
            journal: journal.clone(),
            failing_on: None,
        }
    }

    /// Shortcut to build the mounted-ready [`Animation`] of a mock.
    pub fn animation<S, D>(label: S, duration: D, journal: &Journal) -> Animation
    where
        S: Into<String>,
        D: Into<Duration>,
    {
        Animation::from(Self::new(label, journal).set_duration(duration))
    }

    pub fn get_label(&self) -> &str {
        &self.label
    }

    pub fn set_duration<D: Into<Duration>>(mut self, duration: D) -> Self {
        self.duration = duration.into();
        self
    }

    /// Makes the given hook fail (after being recorded).
    pub fn failing_on(mut self, event: Event) -> Self {
        self.failing_on = Some(event);
        self
    }

    fn log(&self, cue: &Cue, event: Event, progress: Option<f32>) -> Result<(), Error> {
        self.journal
            .record(cue.get_frame(), self.label.clone(), event, progress);
        match self.failing_on == Some(event) {
            true => Err(Callback {
                info: format!("{} failed on {:?}", self.label, event),
            }),
            false => Ok(()),
        }
    }
}

impl Display for MockAnimation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "MockAnimation [label={}, duration={}]", self.label, self.duration)
    }
}

impl Animate for MockAnimation {
    fn start(&mut self, cue: &mut Cue) -> Result<(), Error> {
        self.log(cue, Event::Start, None)
    }

    fn update(&mut self, cue: &mut Cue, progress: f32) -> Result<(), Error> {
        self.log(cue, Event::Update, Some(progress))
    }

    fn end(&mut self, cue: &mut Cue) -> Result<(), Error> {
        self.log(cue, Event::End, None)
    }
}

impl From<MockAnimation> for Animation {
    fn from(mock: MockAnimation) -> Self {
        Animation::new(mock.duration, mock)
    }
}
