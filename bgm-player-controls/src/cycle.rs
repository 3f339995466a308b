use std::collections::BTreeSet;

use tracing::debug;

/// Tracks which positions have been played in the current cycle so that no
/// track repeats before every other track has had its turn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayedSet {
    played: BTreeSet<usize>,
    total: usize,
}

impl PlayedSet {
    pub fn new(total: usize) -> Self {
        Self {
            played: BTreeSet::new(),
            total,
        }
    }

    pub fn len(&self) -> usize {
        self.played.len()
    }

    pub fn is_empty(&self) -> bool {
        self.played.is_empty()
    }

    pub fn contains(&self, position: usize) -> bool {
        self.played.contains(&position)
    }

    /// Record `finished` as played and pick the position that follows it.
    ///
    /// The finished position is never picked, even when the cycle rolls over.
    /// With a single track the scan finds nothing and the immediate next
    /// position (the same track) is returned.
    pub fn next_after(&mut self, finished: usize) -> usize {
        let total = self.total.max(1);
        let fallback = (finished + 1) % total;

        self.played.insert(finished);
        if self.played.len() >= total {
            debug!("every track played, starting a new cycle");
            self.played.clear();
        }

        (0..total * 2)
            .map(|attempt| (finished + 1 + attempt) % total)
            .find(|candidate| *candidate != finished && !self.played.contains(candidate))
            .unwrap_or(fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(total: usize, start: usize, advances: usize) -> Vec<usize> {
        let mut played = PlayedSet::new(total);
        let mut current = start;
        let mut sequence = Vec::with_capacity(advances);

        for _ in 0..advances {
            current = played.next_after(current);
            assert!(played.len() < total);
            sequence.push(current);
        }

        sequence
    }

    #[test]
    fn eight_tracks_play_everything_before_repeating() {
        let sequence = run(8, 0, 8);

        let mut first_seven = sequence[..7].to_vec();
        first_seven.sort();
        assert_eq!(first_seven, vec![1, 2, 3, 4, 5, 6, 7]);

        assert_ne!(sequence[7], sequence[6]);
        assert_eq!(sequence[7], 0);
    }

    #[test]
    fn no_repeat_within_window() {
        for total in 2..=9 {
            for start in 0..total {
                let sequence = run(total, start, total * 4);
                let mut with_start = vec![start];
                with_start.extend(sequence);

                for window in with_start.windows(total) {
                    let unique: BTreeSet<_> = window.iter().collect();
                    assert_eq!(
                        unique.len(),
                        window.len(),
                        "repeat in {window:?} for {total} tracks"
                    );
                }

                for pair in with_start.windows(2) {
                    assert_ne!(pair[0], pair[1]);
                }
            }
        }
    }

    #[test]
    fn skips_positions_already_played() {
        let mut played = PlayedSet::new(5);
        played.played.insert(3);
        played.played.insert(4);

        assert_eq!(played.next_after(2), 0);
        assert!(played.contains(2));
    }

    #[test]
    fn single_track_falls_back_to_itself() {
        let mut played = PlayedSet::new(1);

        assert_eq!(played.next_after(0), 0);
        assert_eq!(played.next_after(0), 0);
        assert!(played.is_empty());
    }

    #[test]
    fn two_tracks_alternate() {
        assert_eq!(run(2, 0, 6), vec![1, 0, 1, 0, 1, 0]);
    }
}
