use log::error;
use snafu::Snafu;

pub use crate::errors::Error::*;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Animation #{id} is already mounted: an animation can only be mounted once
    AlreadyMounted { id: u64 },
    /// Animation #{id} is not mounted
    NotMounted { id: u64 },
    /// Invalid frame range: end frame ({end}) is before start frame ({start})
    InvalidRange { start: u64, end: u64 },
    /// Invalid time: {time}s is not a finite positive value
    InvalidTime { time: f32 },
    /// Invalid fps: {fps} is not a finite strictly positive value
    InvalidFps { fps: f32 },
    /// Invalid delay ratio: {ratio} is not within [0, 1]
    InvalidDelayRatio { ratio: f32 },
    /// Invalid duration: {duration}s is not a finite positive value
    InvalidDuration { duration: f32 },
    /// Configuration error: {info}.
    Config { info: String },
    /// Callback error: {info}.
    Callback { info: String },
}

impl From<String> for Error {
    fn from(info: String) -> Self {
        error!("Animation callback failed: {}", info);
        Self::Callback { info }
    }
}

impl From<&str> for Error {
    fn from(info: &str) -> Self {
        Error::from(info.to_string())
    }
}

#[cfg(feature = "serde")]
impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        error!("serde_json error {:?}", error);
        Self::Config {
            info: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = AlreadyMounted { id: 3 };
        assert_eq!(
            format!("{}", error),
            "Animation #3 is already mounted: an animation can only be mounted once"
        );

        let error = InvalidRange { start: 10, end: 4 };
        assert_eq!(
            format!("{}", error),
            "Invalid frame range: end frame (4) is before start frame (10)"
        );

        let error = InvalidDelayRatio { ratio: 1.5 };
        assert_eq!(
            format!("{}", error),
            "Invalid delay ratio: 1.5 is not within [0, 1]"
        );

        let error = InvalidFps { fps: 0.0 };
        assert_eq!(
            format!("{}", error),
            "Invalid fps: 0 is not a finite strictly positive value"
        );
    }

    #[test]
    fn test_from_string() {
        let error: Error = "hook exploded".into();
        assert_eq!(format!("{}", error), "Callback error: hook exploded.");

        let error: Error = String::from("other").into();
        assert!(matches!(error, Callback { .. }));
    }
}
