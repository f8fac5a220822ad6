use std::fmt::{Display, Formatter};

use log::{debug, trace};

use crate::animations::{Animate, Animation, Cue, Duration, Scheduler};
use crate::config::SchedulerConfig;
use crate::errors::Error;

/// A set of animations played in parallel by a [`Sequencer`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Batch(Vec<Animation>);

impl Batch {
    pub fn new(animations: Vec<Animation>) -> Self {
        Self(animations)
    }

    pub fn get_animations(&self) -> &[Animation] {
        &self.0
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Animation> for Batch {
    fn from(animation: Animation) -> Self {
        Self(vec![animation])
    }
}

impl From<Vec<Animation>> for Batch {
    fn from(animations: Vec<Animation>) -> Self {
        Self(animations)
    }
}

impl FromIterator<Animation> for Batch {
    fn from_iter<T: IntoIterator<Item = Animation>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

type Source = Box<dyn Iterator<Item = Batch> + Send>;
type Factory = Box<dyn FnMut() -> Source + Send>;

/// A composite animation playing the [`Batch`]es pulled from a lazy source, one after the other.
///
/// The source is created when the sequencer starts. The next batch is pulled only once every
/// animation of the current one has ended, so a source may build each batch from the outcome of
/// the previous ones. The sequencer finishes when the source is exhausted and its last batch ended.
///
/// A sequencer is open-ended: it keeps its scheduler busy without moving the scheduler marker.
///
/// # Example
/// ```
/// use frameline::animations::{Animation, Batch, Scheduler, Sequencer, Wait};
///
/// let sequencer = Sequencer::new(|| {
///     vec![
///         Batch::from(Animation::from(Wait::new(1.0))),
///         Batch::from(vec![Animation::from(Wait::new(0.5)), Animation::from(Wait::new(1.0))]),
///     ]
/// });
///
/// let mut scheduler = Scheduler::new(10.0).unwrap();
/// scheduler.add(sequencer).unwrap();
/// assert_eq!(scheduler.run(1000).unwrap(), 22);
/// ```
pub struct Sequencer {
    factory: Factory,
    batches: usize,

    // ########################################
    // # Volatile utility data.
    source: Option<Source>,
    scheduler: Option<Scheduler>,
}

impl Sequencer {
    /// Creates a sequencer from a factory building the batch source on start.
    pub fn new<F, I>(mut factory: F) -> Self
    where
        F: FnMut() -> I + Send + 'static,
        I: IntoIterator<Item = Batch>,
        I::IntoIter: Send + 'static,
    {
        Self {
            factory: Box::new(move || Box::new(factory().into_iter()) as Source),
            batches: 0,
            source: None,
            scheduler: None,
        }
    }

    /// Creates a sequencer playing the given batches.
    pub fn from_batches<I>(batches: I) -> Self
    where
        I: IntoIterator<Item = Batch>,
        I::IntoIter: Send + 'static,
    {
        let mut batches = Some(batches.into_iter());
        Self::new(move || batches.take().into_iter().flatten())
    }

    /// Returns the number of batches pulled from the source so far.
    pub fn get_batch_count(&self) -> usize {
        self.batches
    }

    /// Ends what completed, pulls the next batch when the current one is over, then moves on.
    ///
    /// At most one batch is pulled per step: an empty batch takes a frame.
    fn step(&mut self, cue: &mut Cue) -> Result<(), Error> {
        let (Some(scheduler), Some(source)) = (self.scheduler.as_mut(), self.source.as_mut()) else {
            return Ok(());
        };

        scheduler.end_pass()?;
        if !scheduler.is_pending() {
            let Some(batch) = source.next() else {
                debug!("Sequence exhausted after {} batches", self.batches);
                cue.finish();
                return Ok(());
            };
            self.batches += 1;
            trace!(
                "Play batch {} ({} animations) at frame {}",
                self.batches,
                batch.len(),
                scheduler.get_frame_count()
            );
            scheduler.reset_marker();
            for animation in batch.0 {
                scheduler.add(animation)?;
            }
        }
        scheduler.progress_pass()
    }
}

impl Animate for Sequencer {
    fn start(&mut self, cue: &mut Cue) -> Result<(), Error> {
        self.batches = 0;
        self.source = Some((self.factory)());
        self.scheduler = Some(Scheduler::with_config(
            SchedulerConfig::default().set_fps(cue.get_fps()),
        )?);
        self.step(cue)
    }

    fn update(&mut self, cue: &mut Cue, _: f32) -> Result<(), Error> {
        self.step(cue)
    }

    fn end(&mut self, _: &mut Cue) -> Result<(), Error> {
        self.source = None;
        match self.scheduler.take() {
            Some(mut scheduler) => scheduler.finish_all(),
            None => Ok(()),
        }
    }
}

impl From<Sequencer> for Animation {
    fn from(sequencer: Sequencer) -> Self {
        Animation::new(Duration::Infinite, sequencer)
    }
}

impl Display for Sequencer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sequencer [batches={}]", self.batches)
    }
}
