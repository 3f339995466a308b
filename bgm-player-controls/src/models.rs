use std::path::Path;

#[derive(Default, Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct Track {
    pub title: String,
    pub file: String,
}

impl Track {
    pub fn new(title: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            file: file.into(),
        }
    }

    /// Build a track from a bare file path, titled after the file stem.
    pub fn from_path(path: &Path) -> Self {
        let title = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().replace(['_', '-'], " "))
            .unwrap_or_else(|| "unknown".to_string());

        Self {
            title,
            file: path.to_string_lossy().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_from_file_stem() {
        let track = Track::from_path(Path::new("music/late_night-drive.mp3"));
        assert_eq!(track.title, "late night drive");
        assert_eq!(track.file, "music/late_night-drive.mp3");
    }
}
