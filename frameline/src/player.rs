//! Real-time driver of a [`Scheduler`].

use std::fmt::{Display, Formatter};

use log::{debug, info};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::animations::Scheduler;
use crate::errors::Error;

type FrameCallback = Box<dyn FnMut(u64) -> Result<bool, Error> + Send>;

/// Plays a [`Scheduler`] in real time: one update per frame period, until nothing is left to play.
///
/// An optional frame callback runs right after each update with the frame just processed: use it to
/// render, flush or present whatever the animations changed. Returning `false` stops the playback.
///
/// # Example
/// ```
/// use frameline::animations::{Scheduler, Wait};
/// use frameline::player::Player;
///
/// #[tokio::main]
/// async fn main() {
///     let mut scheduler = Scheduler::new(20.0).unwrap();
///     scheduler.add(Wait::new(0.2)).unwrap();
///
///     let mut player = Player::new(scheduler).on_frame(|frame| {
///         println!("frame {} done", frame);
///         Ok(true)
///     });
///     let frames = player.play().await.unwrap();
///     assert_eq!(frames, 5);
/// }
/// ```
pub struct Player {
    scheduler: Scheduler,
    on_frame: Option<FrameCallback>,
}

impl Player {
    pub fn new(scheduler: Scheduler) -> Self {
        Self {
            scheduler,
            on_frame: None,
        }
    }

    /// Registers the callback run after each frame: it receives the frame just processed and
    /// returns whether the playback should go on.
    pub fn on_frame<F>(mut self, callback: F) -> Self
    where
        F: FnMut(u64) -> Result<bool, Error> + Send + 'static,
    {
        self.on_frame = Some(Box::new(callback));
        self
    }

    /// Plays the scheduler until it has no more work or the frame callback asks to stop.
    ///
    /// The scheduler is started beforehand and paused afterward. Returns the number of frames played.
    ///
    /// # Errors
    /// Any error returned by an animation hook or by the frame callback stops the playback.
    pub async fn play(&mut self) -> Result<u64, Error> {
        let period = std::time::Duration::from_secs_f32(1.0 / self.scheduler.get_fps());
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!("Play scheduler at {} fps", self.scheduler.get_fps());
        self.scheduler.start();
        let mut frames = 0;
        let result = loop {
            ticker.tick().await;
            let pending = match self.scheduler.update() {
                Ok(pending) => pending,
                Err(error) => break Err(error),
            };
            frames += 1;

            let frame = self.scheduler.get_frame_count().saturating_sub(1);
            let proceed = match self.on_frame.as_mut() {
                Some(callback) => match callback(frame) {
                    Ok(proceed) => proceed,
                    Err(error) => break Err(error),
                },
                None => true,
            };
            if !pending || !proceed {
                break Ok(frames);
            }
        };
        self.scheduler.pause();
        debug!("Playback done after {} frames", frames);
        result
    }

    /// Plays the scheduler in a background task (see [`Player::play`]).
    ///
    /// The player is handed back along with the number of frames played once done: aborting the
    /// task stops the playback.
    pub fn spawn(mut self) -> JoinHandle<Result<(Self, u64), Error>> {
        tokio::spawn(async move {
            let frames = self.play().await?;
            Ok((self, frames))
        })
    }

    pub fn get_scheduler(&self) -> &Scheduler {
        &self.scheduler
    }
    pub fn get_scheduler_mut(&mut self) -> &mut Scheduler {
        &mut self.scheduler
    }
    pub fn into_scheduler(self) -> Scheduler {
        self.scheduler
    }
}

impl Display for Player {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Player [fps={}, frame={}, running={}]",
            self.scheduler.get_fps(),
            self.scheduler.get_frame_count(),
            self.scheduler.is_running()
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;
    use serial_test::serial;
    use tokio::time::Instant;

    use crate::animations::{Animation, Duration, Wait};
    use crate::config::SchedulerConfig;
    use crate::errors::Callback;
    use crate::mocks::{Event, Journal, MockAnimation};

    use super::*;

    #[serial]
    #[tokio::test(start_paused = true)]
    async fn test_play_until_done() {
        let journal = Journal::new();
        let mut scheduler = Scheduler::new(10.0).unwrap();
        scheduler
            .add(MockAnimation::animation("a", 1.0, &journal))
            .unwrap();

        let frames = Arc::new(Mutex::new(vec![]));
        let seen = frames.clone();
        let mut player = Player::new(scheduler).on_frame(move |frame| {
            seen.lock().push(frame);
            Ok(true)
        });

        let start = Instant::now();
        assert_eq!(player.play().await.unwrap(), 11);
        let elapsed = start.elapsed();
        assert!(elapsed >= std::time::Duration::from_millis(999));
        assert!(elapsed < std::time::Duration::from_millis(1050));

        assert_eq!(*frames.lock(), (0..11).collect::<Vec<u64>>());
        assert_eq!(journal.count("a", Event::End), 1);
        assert!(!player.get_scheduler().is_running());
    }

    #[serial]
    #[tokio::test(start_paused = true)]
    async fn test_frame_callback_stops_playback() {
        let mut scheduler = Scheduler::new(30.0).unwrap();
        scheduler
            .add(Animation::new(Duration::Infinite, Wait::default()))
            .unwrap();
        let mut player = Player::new(scheduler).on_frame(|frame| Ok(frame < 4));
        assert_eq!(player.play().await.unwrap(), 5);
        assert_eq!(player.get_scheduler().get_frame_count(), 5);

        // A later update does nothing: the scheduler was paused.
        let scheduler = player.get_scheduler_mut();
        assert!(scheduler.update().unwrap());
        assert_eq!(scheduler.get_frame_count(), 5);
    }

    #[serial]
    #[tokio::test(start_paused = true)]
    async fn test_errors_stop_playback() {
        let journal = Journal::new();
        let mut scheduler = Scheduler::new(30.0).unwrap();
        scheduler
            .add(MockAnimation::new("faulty", &journal).failing_on(Event::Update))
            .unwrap();
        let result = Player::new(scheduler).play().await;
        assert!(matches!(result, Err(Error::Callback { .. })));

        let mut scheduler = Scheduler::new(30.0).unwrap();
        scheduler.add(Wait::new(1.0)).unwrap();
        let mut player = Player::new(scheduler).on_frame(|_| {
            Err(Callback {
                info: String::from("display lost"),
            })
        });
        let result = player.play().await;
        assert!(matches!(result, Err(Error::Callback { .. })));
        assert_eq!(player.get_scheduler().get_frame_count(), 1);
    }

    #[serial]
    #[tokio::test(start_paused = true)]
    async fn test_spawn_and_autostart() {
        let config = SchedulerConfig::default()
            .set_fps(20.0)
            .set_autostart(false);
        let mut scheduler = Scheduler::with_config(config).unwrap();
        scheduler.add(Wait::new(0.5)).unwrap();
        assert!(!scheduler.is_running());

        let (player, frames) = Player::new(scheduler).spawn().await.unwrap().unwrap();
        assert_eq!(frames, 11);
        assert_eq!(
            player.to_string(),
            "Player [fps=20, frame=11, running=false]"
        );
        assert!(player.into_scheduler().is_empty());
    }
}
