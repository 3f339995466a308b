use std::time::Duration;

use tokio::{sync::mpsc::UnboundedSender, task::JoinHandle};

use crate::player::Event;

/// Linear volume ramp applied whenever playback starts.
#[derive(Debug, Clone, Copy, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct FadeConfig {
    pub start: f32,
    pub target: f32,
    pub duration_ms: u64,
    pub steps: u32,
}

impl Default for FadeConfig {
    fn default() -> Self {
        Self {
            start: 0.1,
            target: 0.3,
            duration_ms: 6000,
            steps: 100,
        }
    }
}

impl FadeConfig {
    pub fn step_interval(&self) -> Duration {
        Duration::from_millis(self.duration_ms / u64::from(self.steps.max(1)))
    }

    /// Volume after `step` of `steps` ticks. Never exceeds the target.
    pub fn volume_at(&self, step: u32) -> f32 {
        let steps = self.steps.max(1);
        if step >= steps {
            return self.target;
        }

        let progress = step as f32 / steps as f32;
        (self.start + (self.target - self.start) * progress).min(self.target)
    }
}

/// A running fade. Dropping it does not stop the ticker; use [`Fade::cancel`].
#[derive(Debug)]
pub(crate) struct Fade {
    pub(crate) id: u64,
    pub(crate) step: u32,
    handle: JoinHandle<()>,
}

impl Fade {
    pub(crate) fn spawn(id: u64, config: FadeConfig, tx: UnboundedSender<Event>) -> Self {
        let interval = config.step_interval();
        let steps = config.steps.max(1);

        let handle = tokio::spawn(async move {
            for _ in 0..steps {
                tokio::time::sleep(interval).await;
                if tx.send(Event::FadeStep { id }).is_err() {
                    return;
                }
            }
        });

        Self {
            id,
            step: 0,
            handle,
        }
    }

    pub(crate) fn cancel(self) {
        self.handle.abort();
    }
}
