use std::{sync::Arc, time::Duration};

use tokio::{
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
    task::JoinHandle,
};
use tracing::{debug, error, info, instrument, warn};

use crate::{
    Result, Status,
    broadcast::Broadcast,
    config::PlayerConfig,
    controls::{ControlCommand, Controls},
    cycle::PlayedSet,
    error::Error,
    fade::Fade,
    models::Track,
    notification::{self, Notification},
    sink::{AudioEvent, AudioEventSender, AudioOutput},
    tracklist::Tracklist,
};

/// Everything the player loop reacts to.
#[derive(Debug)]
pub enum Event {
    Command(ControlCommand),
    Audio(AudioEvent),
    FadeStep { id: u64 },
    TransitionTimeout { id: u64 },
    TimeUpdate,
}

#[derive(Debug)]
struct Transition {
    id: u64,
    resume: bool,
    expected: String,
    timeout: JoinHandle<()>,
}

impl Transition {
    fn cancel(self) {
        self.timeout.abort();
    }
}

pub struct Player<O: AudioOutput> {
    tracklist: Tracklist,
    output: O,
    config: PlayerConfig,
    status: Status,
    played: PlayedSet,
    fade: Option<Fade>,
    transition: Option<Transition>,
    pending_play: bool,
    broadcast: Arc<Broadcast>,
    events_tx: UnboundedSender<Event>,
    events_rx: UnboundedReceiver<Event>,
    next_id: u64,
}

impl<O: AudioOutput> Player<O> {
    /// Create a paused player with the first track of `tracklist` loaded.
    pub fn new(tracklist: Tracklist, mut output: O, config: PlayerConfig) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        output.connect(AudioEventSender::new(events_tx.clone()));

        let played = PlayedSet::new(tracklist.total());
        let first = tracklist.current_position() as i64;

        let mut player = Self {
            tracklist,
            output,
            config,
            status: Status::Paused,
            played,
            fade: None,
            transition: None,
            pending_play: false,
            broadcast: Arc::new(Broadcast::new()),
            events_tx,
            events_rx,
            next_id: 0,
        };

        player.load_track(first);
        player
    }

    pub fn controls(&self) -> Controls {
        Controls::new(self.events_tx.clone())
    }

    pub fn broadcast(&self) -> Arc<Broadcast> {
        self.broadcast.clone()
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn tracklist(&self) -> &Tracklist {
        &self.tracklist
    }

    pub fn current_position(&self) -> usize {
        self.tracklist.current_position()
    }

    pub fn current_track(&self) -> &Track {
        self.tracklist.current_track()
    }

    pub fn volume(&self) -> f32 {
        self.output.volume()
    }

    pub fn position(&self) -> Duration {
        self.output.position()
    }

    pub fn progress(&self) -> f64 {
        notification::progress(self.output.position(), self.output.duration())
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn notify(&self, notification: Notification) {
        if let Err(err) = self.broadcast.send(notification) {
            debug!(%err, "unable to broadcast notification");
        }
    }

    fn warn_user(&self, message: String) {
        if let Err(err) = self.broadcast.send_warning(message) {
            debug!(%err, "unable to broadcast warning");
        }
    }

    fn set_status(&mut self, status: Status) {
        if self.status != status {
            debug!(?status, "status changed");
            self.status = status;
            self.notify(Notification::Status { status });
        }
    }

    fn cancel_fade(&mut self) {
        if let Some(fade) = self.fade.take() {
            fade.cancel();
        }
    }

    fn cancel_transition(&mut self) {
        if let Some(transition) = self.transition.take() {
            transition.cancel();
        }
    }

    /// Select the track at `index` (wrapped into range) without starting it.
    #[instrument(skip(self))]
    pub fn load_track(&mut self, index: i64) {
        self.cancel_fade();
        self.cancel_transition();

        let track = self.tracklist.skip_to_track(index).clone();
        let position = self.tracklist.current_position();
        info!(position, title = %track.title, "loading track");

        self.output.set_source(&track.file);
        if let Err(err) = self.output.load() {
            warn!(%err, "unable to load {}", track.file);
            self.warn_user(err.to_string());
        }

        if self.status != Status::Stopped {
            self.set_status(Status::Paused);
        }

        self.notify(Notification::CurrentTrack { position, track });
        self.notify(Notification::Progress {
            position: Duration::ZERO,
            duration: None,
        });
    }

    #[instrument(skip(self))]
    pub fn play(&mut self) -> Result<()> {
        self.cancel_transition();

        match self.output.play() {
            Ok(()) => {
                self.pending_play = false;
                self.set_status(Status::Playing);
                self.start_fade();
                Ok(())
            }
            Err(err) => {
                if matches!(err, Error::PlaybackRejected { .. }) {
                    info!(%err, "playback rejected, retrying on next interaction");
                    self.pending_play = true;
                } else {
                    warn!(%err, "unable to play");
                }

                if self.status != Status::Stopped {
                    self.set_status(Status::Paused);
                }
                self.warn_user(err.to_string());
                Err(err)
            }
        }
    }

    #[instrument(skip(self))]
    pub fn pause(&mut self) {
        self.output.pause();
        self.cancel_fade();
        self.cancel_transition();
        self.pending_play = false;

        if self.status != Status::Stopped {
            self.set_status(Status::Paused);
        }
    }

    pub fn play_pause(&mut self) -> Result<()> {
        if self.status.is_playing() {
            self.pause();
            Ok(())
        } else {
            self.play()
        }
    }

    /// Pause and rewind the current track.
    pub fn stop(&mut self) -> Result<()> {
        self.pause();
        self.output.seek(Duration::ZERO)?;
        self.set_status(Status::Stopped);
        self.notify(Notification::Progress {
            position: Duration::ZERO,
            duration: self.output.duration(),
        });
        Ok(())
    }

    /// Manual skip forward. Keeps playing if the player was playing.
    pub fn next(&mut self) -> Result<()> {
        let position = self.tracklist.next_position();
        self.skip_to(position)
    }

    /// Manual skip back. Keeps playing if the player was playing.
    pub fn previous(&mut self) -> Result<()> {
        let position = self.tracklist.previous_position();
        self.skip_to(position)
    }

    fn skip_to(&mut self, position: usize) -> Result<()> {
        let resume = self.status.is_playing();
        self.load_track(position as i64);

        if resume {
            self.play()?;
        }

        Ok(())
    }

    /// Natural end of the current track: pick the next unplayed track and
    /// wait for it to become ready.
    #[instrument(skip(self))]
    pub fn track_ended(&mut self) {
        if let Status::Transitioning { .. } = self.status {
            debug!("already changing track, dropping ended signal");
            return;
        }

        let resume = self.status.is_playing();
        let finished = self.tracklist.current_position();
        let next = self.played.next_after(finished);
        debug!(finished, next, resume, "track ended");

        self.load_track(next as i64);
        self.begin_transition(resume);
    }

    fn begin_transition(&mut self, resume: bool) {
        let id = self.next_id();
        let timeout = self.config.transition_timeout();
        let tx = self.events_tx.clone();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            let _ = tx.send(Event::TransitionTimeout { id });
        });

        self.transition = Some(Transition {
            id,
            resume,
            expected: self.tracklist.current_track().file.clone(),
            timeout: handle,
        });
        self.set_status(Status::Transitioning { resume });
    }

    fn finish_transition(&mut self) {
        let Some(transition) = self.transition.take() else {
            return;
        };
        let resume = transition.resume;
        transition.cancel();

        if resume {
            if let Err(err) = self.play() {
                debug!(%err, "unable to resume after track change");
            }
        } else {
            self.set_status(Status::Paused);
        }
    }

    /// Jump to `fraction` of the current track. Ignored until the duration is known.
    #[instrument(skip(self))]
    pub fn seek_to(&mut self, fraction: f64) -> Result<()> {
        let Some(duration) = self.output.duration() else {
            debug!("duration unknown, ignoring seek");
            return Ok(());
        };

        if !fraction.is_finite() {
            debug!("invalid seek fraction");
            return Ok(());
        }

        let position = duration.mul_f64(fraction.clamp(0.0, 1.0));
        self.output.seek(position)?;
        self.notify(Notification::Progress {
            position,
            duration: Some(duration),
        });

        Ok(())
    }

    /// A user gesture arrived; retry a play request that was refused earlier.
    pub fn interaction(&mut self) -> Result<()> {
        self.output.user_activated();

        if self.pending_play {
            info!("retrying playback after interaction");
            self.play()?;
        }

        Ok(())
    }

    fn start_fade(&mut self) {
        self.cancel_fade();

        let config = self.config.fade;
        self.output.set_volume(config.start);
        self.notify(Notification::Volume {
            volume: config.start,
        });

        let id = self.next_id();
        self.fade = Some(Fade::spawn(id, config, self.events_tx.clone()));
    }

    fn fade_step(&mut self, id: u64) {
        let step = match self.fade.as_mut() {
            Some(fade) if fade.id == id => {
                fade.step += 1;
                fade.step
            }
            _ => return,
        };

        let volume = self.config.fade.volume_at(step);
        self.output.set_volume(volume);

        if step >= self.config.fade.steps.max(1) {
            self.cancel_fade();
            self.notify(Notification::Volume { volume });
        }
    }

    fn time_update(&self) {
        if self.status == Status::Playing {
            self.notify(Notification::Progress {
                position: self.output.position(),
                duration: self.output.duration(),
            });
        }
    }

    fn handle_audio_event(&mut self, event: AudioEvent) {
        let current = self.tracklist.current_track().file.clone();

        match event {
            AudioEvent::Ready { source } => {
                let Some(expected) = self.transition.as_ref().map(|t| t.expected.clone()) else {
                    debug!(%source, "source ready");
                    return;
                };

                if source == expected {
                    self.finish_transition();
                } else {
                    let err = Error::SourceMismatch {
                        expected,
                        actual: source,
                    };
                    warn!(%err, "skipping resume");
                    self.cancel_transition();
                    self.set_status(Status::Paused);
                }
            }
            AudioEvent::Metadata { source, duration } => {
                if source == current {
                    self.notify(Notification::Progress {
                        position: self.output.position(),
                        duration,
                    });
                }
            }
            AudioEvent::Ended { source } => {
                if source == current {
                    self.track_ended();
                } else {
                    debug!(%source, "ignoring end of previous source");
                }
            }
            AudioEvent::Failed { source, message } => {
                if source != current {
                    debug!(%source, "ignoring failure of previous source");
                    return;
                }

                error!(%source, %message, "track failed to load");
                self.pause();

                let title = &self.tracklist.current_track().title;
                if let Err(err) = self.broadcast.send_error(format!("{title}: {message}")) {
                    debug!(%err, "unable to broadcast error");
                }
            }
        }
    }

    fn handle_command(&mut self, command: ControlCommand) -> bool {
        debug!(?command, "handling command");

        let result = match command {
            ControlCommand::LoadTrack { index } => {
                let resume = self.status.is_playing();
                self.load_track(index);
                if resume { self.play() } else { Ok(()) }
            }
            ControlCommand::Next => self.next(),
            ControlCommand::Previous => self.previous(),
            ControlCommand::PlayPause => self.play_pause(),
            ControlCommand::Play => self.play(),
            ControlCommand::Pause => {
                self.pause();
                Ok(())
            }
            ControlCommand::Stop => self.stop(),
            ControlCommand::Seek { fraction } => self.seek_to(fraction),
            ControlCommand::Interaction => self.interaction(),
            ControlCommand::Quit => return true,
        };

        match result {
            Ok(()) | Err(Error::PlaybackRejected { .. }) => {}
            Err(err) => {
                warn!(%err, "command failed");
                self.warn_user(err.to_string());
            }
        }

        false
    }

    /// Returns `true` when the loop should stop.
    fn handle_event(&mut self, event: Event) -> bool {
        match event {
            Event::Command(command) => return self.handle_command(command),
            Event::Audio(event) => self.handle_audio_event(event),
            Event::FadeStep { id } => self.fade_step(id),
            Event::TransitionTimeout { id } => {
                if self.transition.as_ref().is_some_and(|t| t.id == id) {
                    warn!("next source was not ready in time");
                    self.finish_transition();
                }
            }
            Event::TimeUpdate => self.time_update(),
        }

        false
    }

    pub async fn player_loop(&mut self) -> Result<()> {
        let tx = self.events_tx.clone();
        let period = self.config.time_update_interval();
        let ticker = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                if tx.send(Event::TimeUpdate).is_err() {
                    break;
                }
            }
        });

        while let Some(event) = self.events_rx.recv().await {
            if self.handle_event(event) {
                break;
            }
        }

        ticker.abort();
        self.pause();
        info!("player stopped");
        Ok(())
    }
}
