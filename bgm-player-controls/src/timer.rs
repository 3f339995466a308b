use std::time::Duration;

use tokio::time::Instant;

/// Wall-clock playback position for outputs that do not report one.
#[derive(Debug, Default)]
pub struct Timer {
    start_time: Option<Instant>,
    elapsed: Duration,
}

impl Timer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn clear(&mut self) {
        self.start_time = None;
        self.elapsed = Duration::ZERO;
    }

    pub(crate) fn start(&mut self) {
        if self.start_time.is_none() {
            self.start_time = Some(Instant::now());
        }
    }

    pub(crate) fn pause(&mut self) {
        if let Some(start) = self.start_time.take() {
            self.elapsed += start.elapsed();
        }
    }

    pub(crate) fn is_running(&self) -> bool {
        self.start_time.is_some()
    }

    pub(crate) fn elapsed(&self) -> Duration {
        match self.start_time {
            Some(start) => self.elapsed + start.elapsed(),
            None => self.elapsed,
        }
    }

    pub(crate) fn seek(&mut self, position: Duration) {
        self.elapsed = position;

        if self.start_time.is_some() {
            self.start_time = Some(Instant::now());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn resume_accumulates_time() {
        let mut timer = Timer::new();

        timer.start();
        tokio::time::advance(Duration::from_millis(100)).await;
        timer.pause();
        assert_eq!(timer.elapsed(), Duration::from_millis(100));

        timer.start();
        tokio::time::advance(Duration::from_millis(100)).await;
        timer.pause();
        assert_eq!(timer.elapsed(), Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn pause_stops_time_accumulation() {
        let mut timer = Timer::new();

        timer.start();
        tokio::time::advance(Duration::from_millis(100)).await;
        timer.pause();
        assert!(!timer.is_running());

        tokio::time::advance(Duration::from_millis(100)).await;
        assert_eq!(
            timer.elapsed(),
            Duration::from_millis(100),
            "Elapsed time should not increase while paused"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn seek_while_running_restarts_from_new_position() {
        let mut timer = Timer::new();

        timer.start();
        tokio::time::advance(Duration::from_millis(500)).await;
        timer.seek(Duration::from_secs(10));
        tokio::time::advance(Duration::from_millis(250)).await;
        assert_eq!(timer.elapsed(), Duration::from_millis(10_250));

        timer.clear();
        assert_eq!(timer.elapsed(), Duration::ZERO);
        assert!(!timer.is_running());
    }
}
