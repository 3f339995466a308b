use std::{io::Write, time::Duration};

use bgm_player_controls::{
    Status,
    controls::{ControlCommand, Controls},
    notification::{Message, Notification},
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::{Receiver, error::RecvError},
};
use tracing::{debug, warn};

const PROGRESS_WIDTH: usize = 30;

/// Map one line of terminal input to a player command.
pub fn parse_command(line: &str) -> Option<ControlCommand> {
    let mut parts = line.split_whitespace();
    let command = parts.next().unwrap_or("");
    let argument = parts.next();

    match (command, argument) {
        ("" | "toggle" | "t", None) => Some(ControlCommand::PlayPause),
        ("play", None) => Some(ControlCommand::Play),
        ("pause", None) => Some(ControlCommand::Pause),
        ("stop", None) => Some(ControlCommand::Stop),
        ("next" | "n", None) => Some(ControlCommand::Next),
        ("prev" | "previous" | "p", None) => Some(ControlCommand::Previous),
        ("quit" | "q", None) => Some(ControlCommand::Quit),
        ("load" | "l", Some(index)) => index
            .parse()
            .ok()
            .map(|index| ControlCommand::LoadTrack { index }),
        ("seek" | "s", Some(fraction)) => fraction
            .parse::<f64>()
            .ok()
            .filter(|fraction| (0.0..=1.0).contains(fraction))
            .map(|fraction| ControlCommand::Seek { fraction }),
        _ => None,
    }
}

/// Forward stdin lines to the player. Every line also counts as a user
/// gesture for outputs that refuse to play before one.
pub async fn read_commands(controls: Controls) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                match parse_command(&line) {
                    Some(command) => controls.send(command),
                    None => println!("unknown command: {}", line.trim()),
                }
                controls.interaction();
            }
            Ok(None) => {
                debug!("stdin closed");
                break;
            }
            Err(err) => {
                warn!(%err, "unable to read stdin");
                break;
            }
        }
    }
}

pub async fn print_notifications(mut receiver: Receiver<Notification>) {
    loop {
        match receiver.recv().await {
            Ok(notification) => render(&notification),
            Err(RecvError::Lagged(skipped)) => debug!(skipped, "notification receiver lagged"),
            Err(RecvError::Closed) => break,
        }
    }
}

fn render(notification: &Notification) {
    match notification {
        Notification::Status { status } => println!("\n{}", status_label(*status)),
        Notification::CurrentTrack { position, track } => {
            println!("\n[{}] {}", position + 1, track.title)
        }
        Notification::Progress { position, duration } => {
            if let Some(duration) = duration {
                let fraction = notification.progress().unwrap_or_default();
                print!(
                    "\r{} {} / {}",
                    progress_bar(fraction, PROGRESS_WIDTH),
                    format_time(*position),
                    format_time(*duration)
                );
                if let Err(err) = std::io::stdout().flush() {
                    debug!(%err, "unable to flush stdout");
                }
            }
        }
        Notification::Volume { volume } => debug!(volume, "volume"),
        Notification::Message { message } => match message {
            Message::Error(message) => eprintln!("\nerror: {message}"),
            Message::Warning(message) => eprintln!("\nwarning: {message}"),
        },
    }
}

fn status_label(status: Status) -> &'static str {
    match status {
        Status::Playing => "Music On",
        Status::Paused => "Music Off",
        Status::Stopped => "Stopped",
        Status::Transitioning { .. } => "Loading next track",
    }
}

pub fn format_time(time: Duration) -> String {
    let seconds = time.as_secs();
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

pub fn progress_bar(fraction: f64, width: usize) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!(parse_command(""), Some(ControlCommand::PlayPause));
        assert_eq!(parse_command("  next "), Some(ControlCommand::Next));
        assert_eq!(parse_command("p"), Some(ControlCommand::Previous));
        assert_eq!(
            parse_command("load -1"),
            Some(ControlCommand::LoadTrack { index: -1 })
        );
        assert_eq!(
            parse_command("seek 0.5"),
            Some(ControlCommand::Seek { fraction: 0.5 })
        );
        assert_eq!(parse_command("q"), Some(ControlCommand::Quit));
    }

    #[test]
    fn rejects_malformed_commands() {
        assert_eq!(parse_command("seek"), None);
        assert_eq!(parse_command("seek 1.5"), None);
        assert_eq!(parse_command("load two"), None);
        assert_eq!(parse_command("next 3"), None);
        assert_eq!(parse_command("dance"), None);
    }

    #[test]
    fn formats_time() {
        assert_eq!(format_time(Duration::from_secs(0)), "00:00");
        assert_eq!(format_time(Duration::from_secs(83)), "01:23");
        assert_eq!(format_time(Duration::from_millis(600_999)), "10:00");
    }

    #[test]
    fn draws_progress_bar() {
        assert_eq!(progress_bar(0.0, 4), "[----]");
        assert_eq!(progress_bar(0.5, 4), "[##--]");
        assert_eq!(progress_bar(2.0, 4), "[####]");
    }
}
