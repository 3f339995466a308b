use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::player::Event;

#[derive(Debug, Clone, PartialEq)]
pub enum ControlCommand {
    LoadTrack { index: i64 },
    Next,
    Previous,
    PlayPause,
    Play,
    Pause,
    Stop,
    Seek { fraction: f64 },
    /// A user gesture (key press, click). Retries a play request the output
    /// refused before any interaction.
    Interaction,
    Quit,
}

/// Cloneable handle front ends use to drive the player.
#[derive(Debug, Clone)]
pub struct Controls {
    tx: UnboundedSender<Event>,
}

impl Controls {
    pub(crate) fn new(tx: UnboundedSender<Event>) -> Self {
        Self { tx }
    }

    pub fn send(&self, command: ControlCommand) {
        if self.tx.send(Event::Command(command)).is_err() {
            debug!("player loop has stopped, dropping command");
        }
    }

    pub fn load_track(&self, index: i64) {
        self.send(ControlCommand::LoadTrack { index });
    }

    pub fn next(&self) {
        self.send(ControlCommand::Next);
    }

    pub fn previous(&self) {
        self.send(ControlCommand::Previous);
    }

    pub fn play_pause(&self) {
        self.send(ControlCommand::PlayPause);
    }

    pub fn play(&self) {
        self.send(ControlCommand::Play);
    }

    pub fn pause(&self) {
        self.send(ControlCommand::Pause);
    }

    pub fn stop(&self) {
        self.send(ControlCommand::Stop);
    }

    pub fn seek(&self, fraction: f64) {
        self.send(ControlCommand::Seek { fraction });
    }

    pub fn interaction(&self) {
        self.send(ControlCommand::Interaction);
    }

    pub fn quit(&self) {
        self.send(ControlCommand::Quit);
    }
}
