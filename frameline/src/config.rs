//! Defines the scheduler configuration.

use crate::errors::{Error, InvalidFps};

/// Decides what happens to [`Duration::Alongside`](crate::animations::Duration::Alongside) animations
/// once nothing else is left to run on their scheduler.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AlongsidePolicy {
    /// Alongside animations keep running: the driver decides when to stop them (default).
    #[default]
    Persist,
    /// Alongside animations are ended on the first step following the moment their scheduler
    /// reported it has no more work.
    FinishWhenIdle,
}

/// Configuration of a [`Scheduler`](crate::animations::Scheduler).
///
/// # Example
/// ```
/// use frameline::config::{AlongsidePolicy, SchedulerConfig};
///
/// let config = SchedulerConfig::default()
///     .set_fps(60.0)
///     .set_alongside(AlongsidePolicy::FinishWhenIdle);
/// assert_eq!(config.get_fps(), 60.0);
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SchedulerConfig {
    /// Number of frames per second: used for every time to frame conversion (default: 30).
    fps: f32,
    /// The [`AlongsidePolicy`] (default: [`AlongsidePolicy::Persist`]).
    alongside: AlongsidePolicy,
    /// Whether a new scheduler steps its animations right away (default: true).
    autostart: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            fps: 30.0,
            alongside: AlongsidePolicy::default(),
            autostart: true,
        }
    }
}

impl SchedulerConfig {
    /// Checks the configuration is usable.
    pub fn validate(&self) -> Result<(), Error> {
        match self.fps.is_finite() && self.fps > 0.0 {
            true => Ok(()),
            false => Err(InvalidFps { fps: self.fps }),
        }
    }

    /// Parses a configuration from its json representation.
    ///
    /// Missing fields take their default value.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let config: SchedulerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn get_fps(&self) -> f32 {
        self.fps
    }
    pub fn get_alongside(&self) -> AlongsidePolicy {
        self.alongside
    }
    pub fn is_autostart(&self) -> bool {
        self.autostart
    }

    pub fn set_fps(mut self, fps: f32) -> Self {
        self.fps = fps;
        self
    }
    pub fn set_alongside(mut self, alongside: AlongsidePolicy) -> Self {
        self.alongside = alongside;
        self
    }
    pub fn set_autostart(mut self, autostart: bool) -> Self {
        self.autostart = autostart;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SchedulerConfig::default();
        assert_eq!(config.get_fps(), 30.0);
        assert_eq!(config.get_alongside(), AlongsidePolicy::Persist);
        assert!(config.is_autostart());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_fps() {
        for fps in [0.0, -12.0, f32::NAN, f32::INFINITY] {
            let result = SchedulerConfig::default().set_fps(fps).validate();
            assert!(matches!(result, Err(Error::InvalidFps { .. })));
        }
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_from_json() {
        let config = SchedulerConfig::from_json(r#"{"fps": 24.0, "alongside": "FinishWhenIdle"}"#)
            .unwrap();
        assert_eq!(config.get_fps(), 24.0);
        assert_eq!(config.get_alongside(), AlongsidePolicy::FinishWhenIdle);
        assert!(config.is_autostart());

        let result = SchedulerConfig::from_json(r#"{"fps": 0.0}"#);
        assert!(matches!(result, Err(Error::InvalidFps { .. })));

        let result = SchedulerConfig::from_json("not json");
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
