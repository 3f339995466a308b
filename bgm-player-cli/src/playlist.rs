use std::path::{Path, PathBuf};

use bgm_player_controls::{config::PlayerConfig, fade::FadeConfig, models::Track};
use serde::Deserialize;
use snafu::prelude::*;

use crate::cli::{Error, PlaylistParseSnafu, PlaylistReadSnafu};

/// Raw playlist file layout.
#[derive(Debug, Default, Deserialize)]
struct RawPlaylist {
    #[serde(default)]
    track: Vec<RawTrack>,
    #[serde(default)]
    fade: FadeConfig,
    #[serde(default)]
    player: RawPlayer,
}

/// `[player]` table. Fade settings belong in the top-level `[fade]` table.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawPlayer {
    transition_timeout_ms: u64,
    time_update_ms: u64,
    autoplay_delay_ms: u64,
}

impl Default for RawPlayer {
    fn default() -> Self {
        let config = PlayerConfig::default();
        Self {
            transition_timeout_ms: config.transition_timeout_ms,
            time_update_ms: config.time_update_ms,
            autoplay_delay_ms: config.autoplay_delay_ms,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawTrack {
    title: Option<String>,
    file: String,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Playlist {
    pub tracks: Vec<Track>,
    pub config: PlayerConfig,
}

impl Playlist {
    /// Append tracks given as bare paths on the command line.
    pub fn extend_paths(&mut self, paths: &[PathBuf]) {
        self.tracks
            .extend(paths.iter().map(|path| Track::from_path(path)));
    }
}

pub fn parse_playlist(path: &Path) -> Result<Playlist, Error> {
    let content = std::fs::read_to_string(path).context(PlaylistReadSnafu {
        path: path.to_path_buf(),
    })?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));

    parse_playlist_str(&content, base_dir)
}

/// Parse a playlist, resolving relative track files against `base_dir`.
pub fn parse_playlist_str(content: &str, base_dir: &Path) -> Result<Playlist, Error> {
    let raw: RawPlaylist = toml::from_str(content).context(PlaylistParseSnafu)?;

    let tracks = raw
        .track
        .into_iter()
        .map(|entry| {
            let file = resolve(base_dir, &entry.file);
            match entry.title {
                Some(title) => Track::new(title, file.to_string_lossy()),
                None => Track::from_path(&file),
            }
        })
        .collect();

    Ok(Playlist {
        tracks,
        config: PlayerConfig {
            fade: raw.fade,
            transition_timeout_ms: raw.player.transition_timeout_ms,
            time_update_ms: raw.player.time_update_ms,
            autoplay_delay_ms: raw.player.autoplay_delay_ms,
        },
    })
}

fn resolve(base_dir: &Path, file: &str) -> PathBuf {
    let path = Path::new(file);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tracks_and_defaults() {
        let playlist = parse_playlist_str(
            r#"
            [[track]]
            title = "Opening"
            file = "audio/opening.mp3"

            [[track]]
            file = "/srv/music/night_walk.ogg"
            "#,
            Path::new("site"),
        )
        .unwrap();

        assert_eq!(
            playlist.tracks,
            vec![
                Track::new("Opening", "site/audio/opening.mp3"),
                Track::new("night walk", "/srv/music/night_walk.ogg"),
            ]
        );
        assert_eq!(playlist.config, PlayerConfig::default());
    }

    #[test]
    fn overrides_fade_and_timeouts() {
        let playlist = parse_playlist_str(
            r#"
            [fade]
            target = 0.5
            duration_ms = 3000

            [player]
            transition_timeout_ms = 1000
            "#,
            Path::new(""),
        )
        .unwrap();

        assert!(playlist.tracks.is_empty());
        assert_eq!(playlist.config.fade.start, 0.1);
        assert_eq!(playlist.config.fade.target, 0.5);
        assert_eq!(playlist.config.fade.duration_ms, 3000);
        assert_eq!(playlist.config.fade.steps, 100);
        assert_eq!(playlist.config.transition_timeout_ms, 1000);
        assert_eq!(playlist.config.autoplay_delay_ms, 500);
    }

    #[test]
    fn rejects_track_without_file() {
        let result = parse_playlist_str(
            r#"
            [[track]]
            title = "Nothing"
            "#,
            Path::new(""),
        );

        assert!(matches!(result, Err(Error::PlaylistParse { .. })));
    }

    #[test]
    fn rejects_fade_nested_under_player() {
        let result = parse_playlist_str(
            r#"
            [player.fade]
            target = 0.5
            "#,
            Path::new(""),
        );

        let err = result.unwrap_err();
        assert!(matches!(err, Error::PlaylistParse { .. }));
        assert!(err.to_string().contains("fade"));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = parse_playlist(Path::new("does/not/exist.toml")).unwrap_err();
        assert!(err.to_string().contains("does/not/exist.toml"));
    }

    #[test]
    fn command_line_paths_append() {
        let mut playlist = parse_playlist_str(
            r#"
            [[track]]
            file = "a.mp3"
            "#,
            Path::new(""),
        )
        .unwrap();
        playlist.extend_paths(&[PathBuf::from("b.mp3")]);

        let files: Vec<_> = playlist.tracks.iter().map(|t| t.file.as_str()).collect();
        assert_eq!(files, vec!["a.mp3", "b.mp3"]);
    }
}
