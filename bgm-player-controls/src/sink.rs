use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rodio::{Source, decoder::DecoderBuilder, queue::queue};
use tokio::{fs, sync::mpsc::UnboundedSender, task::JoinHandle};
use tracing::{debug, warn};

use crate::{Result, error::Error, player::Event};

/// Signals emitted by an audio output, tagged with the source they refer to.
#[derive(Debug, Clone, PartialEq)]
pub enum AudioEvent {
    Ready {
        source: String,
    },
    Metadata {
        source: String,
        duration: Option<Duration>,
    },
    Ended {
        source: String,
    },
    /// The source could not be read or decoded and will never become ready.
    Failed {
        source: String,
        message: String,
    },
}

#[derive(Debug, Clone)]
pub struct AudioEventSender {
    tx: UnboundedSender<Event>,
}

impl AudioEventSender {
    pub(crate) fn new(tx: UnboundedSender<Event>) -> Self {
        Self { tx }
    }

    pub fn send(&self, event: AudioEvent) {
        if self.tx.send(Event::Audio(event)).is_err() {
            debug!("player gone, dropping audio event");
        }
    }
}

/// The playback primitive the player drives.
pub trait AudioOutput {
    /// Called once by the player so the output can report its signals.
    fn connect(&mut self, events: AudioEventSender);

    fn set_source(&mut self, source: &str);
    fn load(&mut self) -> Result<()>;
    fn play(&mut self) -> Result<()>;
    fn pause(&mut self);

    fn volume(&self) -> f32;
    fn set_volume(&mut self, volume: f32);

    fn position(&self) -> Duration;
    fn seek(&mut self, position: Duration) -> Result<()>;
    fn duration(&self) -> Option<Duration>;

    /// A user gesture happened. Outputs gated on user activation may now play.
    fn user_activated(&mut self) {}
}

/// Speaker output backed by the default audio device.
pub struct RodioOutput {
    stream_handle: rodio::OutputStream,
    sink: Option<rodio::Sink>,
    source: Option<String>,
    current_load: Option<JoinHandle<()>>,
    duration: Arc<Mutex<Option<Duration>>>,
    events: Option<AudioEventSender>,
    volume: f32,
}

impl RodioOutput {
    pub fn new() -> Result<Self> {
        let mut stream_handle = rodio::OutputStreamBuilder::from_default_device()
            .map_err(|_| Error::MissingElement {
                name: "audio output device".to_string(),
            })?
            .open_stream()?;
        stream_handle.log_on_drop(false);

        Ok(Self {
            stream_handle,
            sink: None,
            source: None,
            current_load: None,
            duration: Default::default(),
            events: None,
            volume: 1.0,
        })
    }

    fn clear(&mut self) {
        if let Some(handle) = self.current_load.take() {
            handle.abort();
        }

        self.sink = None;
        if let Ok(mut duration) = self.duration.lock() {
            *duration = None;
        }
    }
}

fn report_failure(events: Option<&AudioEventSender>, source: &str, message: String) {
    warn!(%message, "unable to load {source}");
    if let Some(events) = events {
        events.send(AudioEvent::Failed {
            source: source.to_string(),
            message,
        });
    }
}

impl AudioOutput for RodioOutput {
    fn connect(&mut self, events: AudioEventSender) {
        self.events = Some(events);
    }

    fn set_source(&mut self, source: &str) {
        self.clear();
        self.source = Some(source.to_string());
    }

    fn load(&mut self) -> Result<()> {
        let source = self.source.clone().ok_or_else(|| Error::MissingElement {
            name: "audio source".to_string(),
        })?;

        self.clear();

        let (sender, receiver) = queue(true);
        let sink = rodio::Sink::connect_new(self.stream_handle.mixer());
        sink.pause();
        sink.set_volume(self.volume);
        sink.append(receiver);
        self.sink = Some(sink);

        let events = self.events.clone();
        let duration_slot = self.duration.clone();

        let handle = tokio::spawn(async move {
            let bytes = match fs::read(&source).await {
                Ok(bytes) => bytes,
                Err(err) => {
                    report_failure(
                        events.as_ref(),
                        &source,
                        format!("Unable to read audio file: {err}"),
                    );
                    return;
                }
            };

            let byte_len = bytes.len() as u64;
            let decoded = DecoderBuilder::new()
                .with_data(Cursor::new(bytes))
                .with_byte_len(byte_len)
                .with_seekable(true)
                .build();

            let decoder = match decoded {
                Ok(decoder) => decoder,
                Err(err) => {
                    report_failure(
                        events.as_ref(),
                        &source,
                        format!("Unable to decode audio file: {err}"),
                    );
                    return;
                }
            };

            let duration = decoder.total_duration();
            if let Ok(mut slot) = duration_slot.lock() {
                *slot = duration;
            }

            let signal = sender.append_with_signal(decoder);

            let Some(events) = events else {
                return;
            };

            events.send(AudioEvent::Metadata {
                source: source.clone(),
                duration,
            });
            events.send(AudioEvent::Ready {
                source: source.clone(),
            });

            tokio::task::spawn_blocking(move || {
                if signal.recv().is_ok() {
                    events.send(AudioEvent::Ended { source });
                }
            });
        });

        self.current_load = Some(handle);
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        match &self.sink {
            Some(sink) => {
                sink.play();
                Ok(())
            }
            None => Err(Error::PlaybackRejected {
                message: "no source loaded".to_string(),
            }),
        }
    }

    fn pause(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        if let Some(sink) = &self.sink {
            sink.set_volume(self.volume);
        }
    }

    fn position(&self) -> Duration {
        self.sink
            .as_ref()
            .map(|sink| sink.get_pos())
            .unwrap_or_default()
    }

    fn seek(&mut self, position: Duration) -> Result<()> {
        if let Some(sink) = &self.sink {
            sink.try_seek(position)?;
        }

        Ok(())
    }

    fn duration(&self) -> Option<Duration> {
        self.duration.lock().ok().and_then(|duration| *duration)
    }
}
