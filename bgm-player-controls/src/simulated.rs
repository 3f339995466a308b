use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::{
    Result,
    error::Error,
    sink::{AudioEvent, AudioEventSender, AudioOutput},
    timer::Timer,
};

/// Headless output that plays silence for a fixed length per track.
///
/// Used when no audio device is available. With `require_activation` it
/// refuses to play until a user gesture has been seen, like a browser
/// enforcing its autoplay policy.
#[derive(Debug)]
pub struct SimulatedOutput {
    track_length: Duration,
    require_activation: bool,
    activated: bool,
    source: Option<String>,
    timer: Timer,
    volume: f32,
    events: Option<AudioEventSender>,
    ended: Option<JoinHandle<()>>,
}

impl SimulatedOutput {
    pub fn new(track_length: Duration, require_activation: bool) -> Self {
        Self {
            track_length,
            require_activation,
            activated: false,
            source: None,
            timer: Timer::new(),
            volume: 1.0,
            events: None,
            ended: None,
        }
    }

    fn cancel_end(&mut self) {
        if let Some(handle) = self.ended.take() {
            handle.abort();
        }
    }

    fn schedule_end(&mut self) {
        self.cancel_end();

        let (Some(source), Some(events)) = (self.source.clone(), self.events.clone()) else {
            return;
        };

        let remaining = self.track_length.saturating_sub(self.timer.elapsed());
        self.ended = Some(tokio::spawn(async move {
            tokio::time::sleep(remaining).await;
            events.send(AudioEvent::Ended { source });
        }));
    }
}

impl AudioOutput for SimulatedOutput {
    fn connect(&mut self, events: AudioEventSender) {
        self.events = Some(events);
    }

    fn set_source(&mut self, source: &str) {
        self.cancel_end();
        self.timer.clear();
        self.source = Some(source.to_string());
    }

    fn load(&mut self) -> Result<()> {
        let source = self.source.clone().ok_or_else(|| Error::MissingElement {
            name: "audio source".to_string(),
        })?;

        if let Some(events) = &self.events {
            events.send(AudioEvent::Metadata {
                source: source.clone(),
                duration: Some(self.track_length),
            });
            events.send(AudioEvent::Ready { source });
        }

        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        if self.require_activation && !self.activated {
            return Err(Error::PlaybackRejected {
                message: "user activation required".to_string(),
            });
        }

        if self.source.is_none() {
            return Err(Error::PlaybackRejected {
                message: "no source loaded".to_string(),
            });
        }

        self.timer.start();
        self.schedule_end();
        Ok(())
    }

    fn pause(&mut self) {
        self.timer.pause();
        self.cancel_end();
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    fn position(&self) -> Duration {
        self.timer.elapsed().min(self.track_length)
    }

    fn seek(&mut self, position: Duration) -> Result<()> {
        self.timer.seek(position.min(self.track_length));
        if self.timer.is_running() {
            self.schedule_end();
        }

        Ok(())
    }

    fn duration(&self) -> Option<Duration> {
        self.source.as_ref().map(|_| self.track_length)
    }

    fn user_activated(&mut self) {
        if !self.activated {
            debug!("user activation seen");
        }
        self.activated = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::Event;

    fn connected(
        require_activation: bool,
    ) -> (
        SimulatedOutput,
        tokio::sync::mpsc::UnboundedReceiver<Event>,
    ) {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let mut output = SimulatedOutput::new(Duration::from_secs(3), require_activation);
        output.connect(AudioEventSender::new(tx));
        (output, rx)
    }

    #[tokio::test(start_paused = true)]
    async fn load_reports_metadata_then_ready() {
        let (mut output, mut rx) = connected(false);
        output.set_source("a.mp3");
        output.load().unwrap();

        assert!(matches!(
            rx.recv().await,
            Some(Event::Audio(AudioEvent::Metadata { duration: Some(d), .. })) if d == Duration::from_secs(3)
        ));
        assert!(matches!(
            rx.recv().await,
            Some(Event::Audio(AudioEvent::Ready { source })) if source == "a.mp3"
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn playing_to_the_end_emits_ended() {
        let (mut output, mut rx) = connected(false);
        output.set_source("a.mp3");
        output.play().unwrap();

        assert!(matches!(
            rx.recv().await,
            Some(Event::Audio(AudioEvent::Ended { source })) if source == "a.mp3"
        ));
        assert_eq!(output.position(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn rejects_play_until_activated() {
        let (mut output, _rx) = connected(true);
        output.set_source("a.mp3");

        assert!(matches!(
            output.play(),
            Err(Error::PlaybackRejected { .. })
        ));

        output.user_activated();
        assert!(output.play().is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn changing_source_cancels_pending_end() {
        let (mut output, mut rx) = connected(false);
        output.set_source("a.mp3");
        output.play().unwrap();
        output.set_source("b.mp3");

        let next = tokio::time::timeout(Duration::from_secs(10), rx.recv()).await;
        assert!(next.is_err());
        assert_eq!(output.position(), Duration::ZERO);
    }
}
