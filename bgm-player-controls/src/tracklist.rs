use crate::{Result, error::Error, models::Track};
use rand::seq::SliceRandom;
use tracing::instrument;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Playing,
    #[default]
    Paused,
    Stopped,
    /// Loading the next source after a track ended. `resume` records whether
    /// playback should start once the source is ready.
    Transitioning { resume: bool },
}

impl Status {
    pub fn is_playing(&self) -> bool {
        matches!(self, Status::Playing | Status::Transitioning { resume: true })
    }
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Tracklist {
    pub(crate) tracks: Vec<Track>,
    pub(crate) current: usize,
}

impl Tracklist {
    pub fn new(tracks: Vec<Track>) -> Result<Self> {
        if tracks.is_empty() {
            return Err(Error::EmptyPlaylist);
        }

        Ok(Self { tracks, current: 0 })
    }

    /// Shuffle the play order once, keeping the cursor at the first track.
    pub fn shuffled(mut self) -> Self {
        self.tracks.shuffle(&mut rand::rng());
        self.current = 0;
        self
    }

    pub fn tracks(&self) -> &Vec<Track> {
        &self.tracks
    }

    pub fn total(&self) -> usize {
        self.tracks.len()
    }

    pub fn current_position(&self) -> usize {
        self.current
    }

    pub fn current_track(&self) -> &Track {
        &self.tracks[self.current]
    }

    /// Wrap any index into `[0, total)`, counting negative indices from the end.
    pub fn normalize(&self, index: i64) -> usize {
        index.rem_euclid(self.tracks.len() as i64) as usize
    }

    pub fn next_position(&self) -> usize {
        self.normalize(self.current as i64 + 1)
    }

    pub fn previous_position(&self) -> usize {
        self.normalize(self.current as i64 - 1)
    }

    #[instrument(skip(self))]
    pub(crate) fn skip_to_track(&mut self, index: i64) -> &Track {
        self.current = self.normalize(index);
        &self.tracks[self.current]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracklist(n: usize) -> Tracklist {
        let tracks = (0..n)
            .map(|i| Track::new(format!("Track {i}"), format!("track-{i}.mp3")))
            .collect();
        Tracklist::new(tracks).unwrap()
    }

    #[test]
    fn rejects_empty_playlist() {
        assert!(matches!(Tracklist::new(vec![]), Err(Error::EmptyPlaylist)));
    }

    #[test]
    fn skip_wraps_around_both_ends() {
        let mut list = tracklist(8);

        assert_eq!(list.skip_to_track(8).file, "track-0.mp3");
        assert_eq!(list.current_position(), 0);

        assert_eq!(list.skip_to_track(-1).file, "track-7.mp3");
        assert_eq!(list.current_position(), 7);

        list.skip_to_track(17);
        assert_eq!(list.current_position(), 1);
    }

    #[test]
    fn adjacent_positions_wrap() {
        let mut list = tracklist(3);
        assert_eq!(list.previous_position(), 2);

        list.skip_to_track(2);
        assert_eq!(list.next_position(), 0);
    }

    #[test]
    fn shuffle_keeps_every_track() {
        let list = tracklist(10).shuffled();
        let mut files: Vec<_> = list.tracks().iter().map(|t| t.file.clone()).collect();
        files.sort();

        let mut expected: Vec<_> = (0..10).map(|i| format!("track-{i}.mp3")).collect();
        expected.sort();

        assert_eq!(files, expected);
        assert_eq!(list.current_position(), 0);
    }

    #[test]
    fn transitioning_with_resume_counts_as_playing() {
        assert!(Status::Playing.is_playing());
        assert!(Status::Transitioning { resume: true }.is_playing());
        assert!(!Status::Transitioning { resume: false }.is_playing());
        assert!(!Status::Paused.is_playing());
        assert!(!Status::Stopped.is_playing());
    }
}
