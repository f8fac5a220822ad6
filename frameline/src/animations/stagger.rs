use std::fmt::{Display, Formatter};

use log::{debug, warn};

use crate::animations::{Animate, Animation, Cue, Easing, Placement, Scheduler};
use crate::config::SchedulerConfig;
use crate::errors::{AlreadyMounted, Error, InvalidDelayRatio, InvalidDuration};

/// Decides which stagger slot each child of a [`StaggeredGroup`] gets.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StaggerOrder {
    /// First child first (default).
    #[default]
    Forward,
    /// Last child first.
    Reverse,
    /// Middle children first, then outward: children at the same distance from the center share a slot.
    FromCenter,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum GroupTiming {
    /// The duration of the whole group is given.
    Total(f32),
    /// The duration of each child is given.
    PerAnimation(f32),
}

/// A composite animation fanning its single duration out to several children, started one after
/// the other with a partial overlap.
///
/// The `delay_ratio` defines the overlap: `0.0` starts every child at once (fully parallel),
/// `1.0` starts each child when the previous one ends (fully sequential). Whatever the ratio, the
/// last child ends exactly when the group ends:
/// ```text
/// animation_duration = duration / ((count - 1) * delay_ratio + 1)
/// inter_delay = (duration - animation_duration) / (count - 1)
/// ```
///
/// The children are driven by a private [`Scheduler`] created on start; when the group ends, every
/// child still running is ended as well.
///
/// # Example
/// ```
/// use frameline::animations::{Animation, Scheduler, StaggeredGroup, Wait};
///
/// let children: Vec<Animation> = (0..3).map(|_| Animation::from(Wait::new(1.0))).collect();
/// let group = StaggeredGroup::new(children.clone(), 3.0, 0.5).unwrap();
/// assert_eq!(group.get_animation_duration(), 1.5);
///
/// let mut scheduler = Scheduler::new(30.0).unwrap();
/// scheduler.add(group).unwrap();
/// scheduler.run(1000).unwrap();
/// assert!(children.iter().all(|child| child.is_finished()));
/// ```
pub struct StaggeredGroup {
    children: Vec<Animation>,
    timing: GroupTiming,
    delay_ratio: f32,
    order: StaggerOrder,

    // ########################################
    // # Volatile utility data.
    scheduler: Option<Scheduler>,
}

impl StaggeredGroup {
    /// Creates a group lasting `duration` seconds overall.
    ///
    /// # Errors
    /// Fails if the ratio is outside `[0, 1]`, the duration is negative, or a child is already mounted.
    pub fn new(children: Vec<Animation>, duration: f32, delay_ratio: f32) -> Result<Self, Error> {
        Self::build(children, GroupTiming::Total(duration), delay_ratio)
    }

    /// Creates a group where each child lasts `animation_duration` seconds: the overall duration
    /// derives from it.
    pub fn with_animation_duration(
        children: Vec<Animation>,
        animation_duration: f32,
        delay_ratio: f32,
    ) -> Result<Self, Error> {
        Self::build(
            children,
            GroupTiming::PerAnimation(animation_duration),
            delay_ratio,
        )
    }

    fn build(children: Vec<Animation>, timing: GroupTiming, delay_ratio: f32) -> Result<Self, Error> {
        if !(0.0..=1.0).contains(&delay_ratio) {
            return Err(InvalidDelayRatio { ratio: delay_ratio });
        }
        let (GroupTiming::Total(duration) | GroupTiming::PerAnimation(duration)) = timing;
        if !duration.is_finite() || duration < 0.0 {
            return Err(InvalidDuration { duration });
        }
        if let Some(child) = children.iter().find(|child| child.is_mounted()) {
            return Err(AlreadyMounted {
                id: child.get_id().value(),
            });
        }
        if children.is_empty() {
            warn!("Staggered group created without children: it behaves as a simple wait");
        }
        Ok(Self {
            children,
            timing,
            delay_ratio,
            order: StaggerOrder::default(),
            scheduler: None,
        })
    }

    /// Returns the overall group duration (in seconds).
    pub fn get_duration(&self) -> f32 {
        match self.timing {
            GroupTiming::Total(duration) => duration,
            GroupTiming::PerAnimation(per) => per * self.spread(),
        }
    }

    /// Returns each child duration (in seconds).
    pub fn get_animation_duration(&self) -> f32 {
        match self.timing {
            GroupTiming::Total(duration) => duration / self.spread(),
            GroupTiming::PerAnimation(per) => per,
        }
    }

    /// Returns the delay (in seconds) between two consecutive stagger slots.
    pub fn get_inter_delay(&self) -> f32 {
        match self.slot_count() {
            0 | 1 => 0.0,
            slots => (self.get_duration() - self.get_animation_duration()) / (slots - 1) as f32,
        }
    }

    pub fn get_delay_ratio(&self) -> f32 {
        self.delay_ratio
    }
    pub fn get_order(&self) -> StaggerOrder {
        self.order
    }
    pub fn get_children(&self) -> &[Animation] {
        &self.children
    }

    pub fn set_order(mut self, order: StaggerOrder) -> Self {
        self.order = order;
        self
    }

    /// Returns the stagger slot of every child, in children order.
    fn slots(&self) -> Vec<usize> {
        let count = self.children.len();
        (0..count)
            .map(|index| match self.order {
                StaggerOrder::Forward => index,
                StaggerOrder::Reverse => count - 1 - index,
                StaggerOrder::FromCenter => (2 * index).abs_diff(count - 1) / 2,
            })
            .collect()
    }

    /// Number of distinct stagger slots.
    fn slot_count(&self) -> usize {
        self.slots().into_iter().max().map_or(0, |max| max + 1)
    }

    /// Ratio between the group duration and a child duration.
    fn spread(&self) -> f32 {
        self.slot_count().saturating_sub(1) as f32 * self.delay_ratio + 1.0
    }

    /// Mounts every child on a fresh scheduler, within `group_frames` frames.
    fn mount_children(&self, fps: f32, group_frames: u64) -> Result<Scheduler, Error> {
        let mut scheduler = Scheduler::with_config(SchedulerConfig::default().set_fps(fps))?;

        let slot_count = self.slot_count().max(1) as u64;
        let animation_frames =
            ((group_frames as f32 / self.spread()).round() as u64).min(group_frames);
        let lead = group_frames - animation_frames;

        for (child, slot) in self.children.iter().zip(self.slots()) {
            let start = match slot_count {
                1 => 0,
                _ => (slot as f32 * lead as f32 / (slot_count - 1) as f32).round() as u64,
            };
            scheduler.add_with(
                child.clone(),
                Placement::at_frame(start).until_frame(start + animation_frames),
            )?;
        }
        debug!(
            "Staggered {} children over {} frames ({} frames each)",
            self.children.len(),
            group_frames,
            animation_frames
        );
        Ok(scheduler)
    }
}

impl Animate for StaggeredGroup {
    fn start(&mut self, cue: &mut Cue) -> Result<(), Error> {
        // A late start keeps the group end frame: the children share what is left.
        let late = cue.get_elapsed();
        if late > 0 {
            warn!("Staggered group started {} frames late: its children are compressed", late);
        }
        let group_frames = cue.get_num_frames().unwrap_or_default().saturating_sub(late);
        let mut scheduler = self.mount_children(cue.get_fps(), group_frames)?;
        scheduler.update()?;
        self.scheduler = Some(scheduler);
        Ok(())
    }

    fn update(&mut self, _: &mut Cue, _: f32) -> Result<(), Error> {
        if let Some(scheduler) = self.scheduler.as_mut() {
            scheduler.update()?;
        }
        Ok(())
    }

    fn end(&mut self, cue: &mut Cue) -> Result<(), Error> {
        if let Some(mut scheduler) = self.scheduler.take() {
            // Natural end: the children due now end on time before the others get forced.
            if cue.get_num_frames() <= Some(cue.get_elapsed()) {
                scheduler.end_pass()?;
            }
            scheduler.finish_all()?;
        }
        Ok(())
    }
}

impl From<StaggeredGroup> for Animation {
    fn from(group: StaggeredGroup) -> Self {
        Animation::new(group.get_duration(), group).with_easing(Easing::Linear)
    }
}

impl Display for StaggeredGroup {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "StaggeredGroup [duration={}s, animations={}, delay_ratio={}, order={:?}]",
            self.get_duration(),
            self.children.len(),
            self.delay_ratio,
            self.order
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::animations::{AnimationState, Duration, Wait};
    use crate::mocks::{Event, Journal, MockAnimation};

    use super::*;

    fn children(count: usize, journal: &Journal) -> Vec<Animation> {
        (0..count)
            .map(|index| MockAnimation::animation(format!("c{}", index), 10.0, journal))
            .collect()
    }

    #[test]
    fn test_group_durations() {
        let journal = Journal::new();
        let group = StaggeredGroup::new(children(3, &journal), 3.0, 0.5).unwrap();
        assert_eq!(group.get_duration(), 3.0);
        assert_eq!(group.get_animation_duration(), 1.5);
        assert_eq!(group.get_inter_delay(), 0.75);
        assert_eq!(group.get_order(), StaggerOrder::Forward);

        let parallel = StaggeredGroup::new(children(4, &journal), 2.0, 0.0).unwrap();
        assert_eq!(parallel.get_animation_duration(), 2.0);
        assert_eq!(parallel.get_inter_delay(), 0.0);

        let sequential = StaggeredGroup::new(children(4, &journal), 2.0, 1.0).unwrap();
        assert_eq!(sequential.get_animation_duration(), 0.5);
        assert_eq!(sequential.get_inter_delay(), 0.5);

        let inverted =
            StaggeredGroup::with_animation_duration(children(3, &journal), 1.5, 0.5).unwrap();
        assert_eq!(inverted.get_duration(), 3.0);
        assert_eq!(inverted.get_animation_duration(), 1.5);

        let single = StaggeredGroup::new(children(1, &journal), 2.0, 0.5).unwrap();
        assert_eq!(single.get_animation_duration(), 2.0);
        assert_eq!(single.get_inter_delay(), 0.0);
    }

    #[test]
    fn test_invalid_group() {
        let journal = Journal::new();
        let result = StaggeredGroup::new(children(2, &journal), 1.0, 1.5);
        assert!(matches!(result, Err(Error::InvalidDelayRatio { .. })));

        let result = StaggeredGroup::new(children(2, &journal), -1.0, 0.5);
        assert!(matches!(result, Err(Error::InvalidDuration { .. })));

        let mounted = children(2, &journal);
        Scheduler::new(30.0).unwrap().add(mounted[1].clone()).unwrap();
        let result = StaggeredGroup::new(mounted, 1.0, 0.5);
        assert!(matches!(result, Err(Error::AlreadyMounted { .. })));
    }

    #[test]
    fn test_group_span() {
        let journal = Journal::new();
        let members = children(3, &journal);
        let group = Animation::from(StaggeredGroup::new(members.clone(), 3.0, 0.5).unwrap());

        let mut scheduler = Scheduler::new(30.0).unwrap();
        scheduler.wait_frames(10);
        scheduler.add(group.clone()).unwrap();
        scheduler.wait_frames(0);
        scheduler
            .add(MockAnimation::animation("after", 1.0, &journal))
            .unwrap();
        assert_eq!(group.get_start_frame(), Some(10));
        assert_eq!(group.get_num_frames(), Some(90));

        scheduler.run(1000).unwrap();

        let spans: Vec<(Option<u64>, Option<u64>)> = members
            .iter()
            .map(|member| (member.get_start_frame(), member.get_num_frames()))
            .collect();
        assert_eq!(
            spans,
            vec![(Some(0), Some(45)), (Some(23), Some(45)), (Some(45), Some(45))]
        );

        // Child frames are relative to the group start.
        assert_eq!(journal.frames("c0", Event::Start), vec![0]);
        assert_eq!(journal.frames("c1", Event::Start), vec![23]);
        assert_eq!(journal.frames("c2", Event::Start), vec![45]);
        assert_eq!(journal.frames("c2", Event::End), vec![90]);

        // The last child ends with the group, right before what follows the group starts.
        let events = journal.events();
        let after = journal.position("after", Event::Start).unwrap();
        assert_eq!(events[after - 1], (String::from("c2"), Event::End));
        assert_eq!(journal.frames("after", Event::Start), vec![100]);

        for label in ["c0", "c1", "c2"] {
            assert_eq!(journal.count(label, Event::Start), 1);
            assert_eq!(journal.count(label, Event::End), 1);
        }
        assert!(group.is_finished());
    }

    #[test]
    fn test_group_orders() {
        let journal = Journal::new();
        let members = children(5, &journal);
        let group = StaggeredGroup::new(members.clone(), 3.0, 1.0)
            .unwrap()
            .set_order(StaggerOrder::FromCenter);
        assert_eq!(group.slots(), vec![2, 1, 0, 1, 2]);
        assert_eq!(group.get_animation_duration(), 1.0);

        let mut scheduler = Scheduler::new(10.0).unwrap();
        scheduler.add(group).unwrap();
        scheduler.run(100).unwrap();
        let starts: Vec<Option<u64>> = members.iter().map(|m| m.get_start_frame()).collect();
        assert_eq!(
            starts,
            vec![Some(20), Some(10), Some(0), Some(10), Some(20)]
        );

        let reversed = StaggeredGroup::new(children(3, &journal), 3.0, 1.0)
            .unwrap()
            .set_order(StaggerOrder::Reverse);
        assert_eq!(reversed.slots(), vec![2, 1, 0]);

        let even = StaggeredGroup::new(children(4, &journal), 1.0, 1.0)
            .unwrap()
            .set_order(StaggerOrder::FromCenter);
        assert_eq!(even.slots(), vec![1, 0, 0, 1]);
    }

    #[test]
    fn test_group_stop_forces_children() {
        let journal = Journal::new();
        let members = children(3, &journal);
        let group = Animation::from(StaggeredGroup::new(members.clone(), 3.0, 1.0).unwrap());

        let mut scheduler = Scheduler::new(10.0).unwrap();
        scheduler
            .add_with(group.clone(), Placement::at_frame(0))
            .unwrap();
        for _ in 0..5 {
            scheduler.update().unwrap();
        }
        assert_eq!(members[0].get_state(), AnimationState::Running);
        assert_eq!(members[1].get_state(), AnimationState::NotStarted);

        group.stop();
        assert!(!scheduler.update().unwrap());
        for (index, member) in members.iter().enumerate() {
            assert!(member.is_finished());
            assert_eq!(journal.count(&format!("c{}", index), Event::End), 1);
        }
        assert_eq!(journal.count("c1", Event::Start), 0);
    }

    #[test]
    fn test_late_group_keeps_every_child() {
        let journal = Journal::new();
        let members = children(2, &journal);
        let group = Animation::from(StaggeredGroup::new(members.clone(), 1.0, 1.0).unwrap());

        let mut scheduler = Scheduler::new(10.0).unwrap();
        scheduler.wait_frames(10);
        scheduler.run(5).unwrap();
        scheduler
            .add_with(group.clone(), Placement::at_frame(0))
            .unwrap();
        scheduler.run(100).unwrap();

        // 5 frames left out of 10: both children fit in, the last one still ends with the group.
        assert_eq!(journal.frames("c0", Event::Start), vec![0]);
        assert_eq!(journal.frames("c0", Event::End), vec![3]);
        assert_eq!(journal.frames("c1", Event::Start), vec![2]);
        assert_eq!(journal.frames("c1", Event::End), vec![5]);
        assert!(group.is_finished());
    }

    #[test]
    fn test_group_with_open_ended_children() {
        let members = vec![
            Animation::new(Duration::Infinite, Wait::default()),
            Animation::new(Duration::Alongside, Wait::default()),
        ];
        let mut scheduler = Scheduler::new(10.0).unwrap();
        scheduler
            .add(StaggeredGroup::new(members.clone(), 1.0, 0.0).unwrap())
            .unwrap();
        assert_eq!(scheduler.run(100).unwrap(), 11);
        assert!(members.iter().all(|member| member.is_finished()));
        assert_eq!(members[0].get_num_frames(), Some(10));
    }

    #[test]
    fn test_display() {
        let group = StaggeredGroup::new(vec![], 2.0, 0.5).unwrap();
        assert_eq!(
            group.to_string(),
            "StaggeredGroup [duration=2s, animations=0, delay_ratio=0.5, order=Forward]"
        );
    }
}
