//! Download mode selection.

/// What the user asked to receive for a link.
///
/// A closed enum so every dispatch site is exhaustively checked; there is no
/// way to construct an out-of-range mode from arbitrary callback data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadMode {
    /// Best available video+audio merged into an mp4 container
    Video,
    /// Best available audio-only stream transcoded to mp3
    Audio,
    /// Thumbnail image only, no media download
    Thumbnail,
}

impl DownloadMode {
    /// Parse from a callback payload or CLI argument.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "mp4" | "video" => Some(Self::Video),
            "mp3" | "audio" => Some(Self::Audio),
            "jpg" | "thumbnail" => Some(Self::Thumbnail),
            _ => None,
        }
    }

    /// Callback payload / short name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "mp4",
            Self::Audio => "mp3",
            Self::Thumbnail => "jpg",
        }
    }

    /// Extension the delivered file is normalized to. For thumbnails this is
    /// the preferred extension; the actual file may be one of the probe
    /// candidates (see `DownloadRequest::final_path`).
    pub fn file_extension(&self) -> &'static str {
        match self {
            Self::Video => "mp4",
            Self::Audio => "mp3",
            Self::Thumbnail => "jpg",
        }
    }
}

impl std::fmt::Display for DownloadMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_modes() {
        assert_eq!(DownloadMode::parse("mp4"), Some(DownloadMode::Video));
        assert_eq!(DownloadMode::parse("mp3"), Some(DownloadMode::Audio));
        assert_eq!(DownloadMode::parse("jpg"), Some(DownloadMode::Thumbnail));
    }

    #[test]
    fn test_parse_cli_names() {
        assert_eq!(DownloadMode::parse("video"), Some(DownloadMode::Video));
        assert_eq!(DownloadMode::parse("audio"), Some(DownloadMode::Audio));
        assert_eq!(DownloadMode::parse("thumbnail"), Some(DownloadMode::Thumbnail));
    }

    #[test]
    fn test_parse_rejects_everything_else() {
        for junk in ["menu", "MP4", "mp5", "", "webm", "mp4 ", "jpg\n"] {
            assert_eq!(DownloadMode::parse(junk), None, "{:?} must not parse", junk);
        }
    }

    #[test]
    fn test_roundtrip() {
        for mode in [DownloadMode::Video, DownloadMode::Audio, DownloadMode::Thumbnail] {
            assert_eq!(DownloadMode::parse(mode.as_str()), Some(mode));
        }
    }
}
