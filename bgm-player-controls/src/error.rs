use crate::notification::Notification;
use snafu::prelude::*;

#[derive(Snafu, Debug)]
pub enum Error {
    #[snafu(display("Playback rejected: {message}"))]
    PlaybackRejected {
        message: String,
    },
    #[snafu(display("Loaded source {actual} does not match expected source {expected}"))]
    SourceMismatch {
        expected: String,
        actual: String,
    },
    #[snafu(display("Required element is missing: {name}"))]
    MissingElement {
        name: String,
    },
    #[snafu(display("Playlist has no tracks"))]
    EmptyPlaylist,
    #[snafu(display("failed to seek"))]
    Seek,
    #[snafu(display("{message}"))]
    Stream {
        message: String,
    },
    #[snafu(display("Unable to broadcast notification"))]
    Notification,
}

impl From<rodio::source::SeekError> for Error {
    fn from(_: rodio::source::SeekError) -> Self {
        Error::Seek
    }
}

impl From<rodio::StreamError> for Error {
    fn from(value: rodio::StreamError) -> Self {
        Self::Stream {
            message: value.to_string(),
        }
    }
}

impl From<tokio::sync::broadcast::error::SendError<Notification>> for Error {
    fn from(_value: tokio::sync::broadcast::error::SendError<Notification>) -> Self {
        Self::Notification
    }
}
