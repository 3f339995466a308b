use std::time::Duration;

use crate::{Status, models::Track};

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Error(String),
    Warning(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    Status {
        status: Status,
    },
    CurrentTrack {
        position: usize,
        track: Track,
    },
    Progress {
        position: Duration,
        duration: Option<Duration>,
    },
    Volume {
        volume: f32,
    },
    Message {
        message: Message,
    },
}

impl Notification {
    /// Fraction of the track played, `0.0` while the duration is unknown.
    pub fn progress(&self) -> Option<f64> {
        match self {
            Notification::Progress { position, duration } => Some(progress(*position, *duration)),
            _ => None,
        }
    }
}

pub(crate) fn progress(position: Duration, duration: Option<Duration>) -> f64 {
    match duration {
        Some(duration) if !duration.is_zero() => {
            (position.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0)
        }
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_fraction() {
        let notification = Notification::Progress {
            position: Duration::from_secs(50),
            duration: Some(Duration::from_secs(200)),
        };
        assert_eq!(notification.progress(), Some(0.25));

        let unknown = Notification::Progress {
            position: Duration::from_secs(50),
            duration: None,
        };
        assert_eq!(unknown.progress(), Some(0.0));

        assert_eq!(Notification::Volume { volume: 0.3 }.progress(), None);
    }
}
