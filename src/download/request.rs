//! Download request construction.
//!
//! A `DownloadRequest` fixes the yt-dlp invocation for one attempt: the URL,
//! the mode and the output base path derived from the media title. The
//! request is ephemeral — built fresh per attempt, discarded after delivery.

use std::path::{Path, PathBuf};

use url::Url;

use crate::core::config;
use crate::core::error::{AppError, AppResult};
use crate::core::utils::escape_filename;
use crate::download::mode::DownloadMode;

/// Thumbnail probe order: lossy-compressed first, then the web format, then
/// lossless. yt-dlp writes whichever the source offers.
const THUMBNAIL_EXTENSIONS: [&str; 3] = ["jpg", "webp", "png"];

/// One download attempt: `(url, mode)` plus the resolved output location.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub url: Url,
    pub mode: DownloadMode,
    /// Extensionless output path: `<downloads dir>/<sanitized title>`
    output_base: PathBuf,
}

impl DownloadRequest {
    /// Builds a request, deriving the output base from the media title.
    ///
    /// The title is truncated to the template limit and made filesystem-safe.
    pub fn new(url: Url, mode: DownloadMode, downloads_dir: &Path, title: &str) -> Self {
        let truncated = truncate_chars(title.trim(), config::download::MAX_TITLE_LEN);
        let safe_title = escape_filename(truncated);
        let file_stem = if safe_title.is_empty() { "media" } else { &safe_title };

        Self {
            url,
            mode,
            output_base: downloads_dir.join(file_stem),
        }
    }

    /// yt-dlp output template: the source extension is kept during download
    /// and normalized afterwards by [`final_path`](Self::final_path).
    pub fn output_template(&self) -> String {
        format!("{}.%(ext)s", self.output_base.display())
    }

    /// Full argument vector for the yt-dlp invocation of this request.
    pub fn ytdlp_args(&self) -> Vec<String> {
        let mut args = vec![
            "-o".to_string(),
            self.output_template(),
            "--newline".to_string(),
            "--no-playlist".to_string(),
        ];

        match self.mode {
            DownloadMode::Video => {
                args.extend([
                    "--format".to_string(),
                    "bestvideo+bestaudio/best".to_string(),
                    "--merge-output-format".to_string(),
                    "mp4".to_string(),
                ]);
            }
            DownloadMode::Audio => {
                args.extend([
                    "--format".to_string(),
                    "bestaudio/best".to_string(),
                    "-x".to_string(),
                    "--audio-format".to_string(),
                    "mp3".to_string(),
                ]);
            }
            DownloadMode::Thumbnail => {
                args.extend(["--skip-download".to_string(), "--write-thumbnail".to_string()]);
            }
        }

        args.push(self.url.to_string());
        args
    }

    /// Resolves the path of the produced file after yt-dlp has finished.
    ///
    /// Video and audio are normalized to their mode extension regardless of
    /// the source container. Thumbnails are probed on disk in
    /// jpg → webp → png order; none existing is a download error.
    pub fn final_path(&self) -> AppResult<PathBuf> {
        match self.mode {
            DownloadMode::Video | DownloadMode::Audio => Ok(self.with_extension(self.mode.file_extension())),
            DownloadMode::Thumbnail => {
                for ext in THUMBNAIL_EXTENSIONS {
                    let candidate = self.with_extension(ext);
                    if candidate.exists() {
                        return Ok(candidate);
                    }
                }
                Err(AppError::Download(format!(
                    "no thumbnail was written for {}",
                    self.output_base.display()
                )))
            }
        }
    }

    // Appends rather than replaces: titles may contain dots and
    // `Path::with_extension` would clip at the last one.
    fn with_extension(&self, ext: &str) -> PathBuf {
        PathBuf::from(format!("{}.{}", self.output_base.display(), ext))
    }
}

/// Truncates to at most `max` characters on a char boundary.
fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn request(mode: DownloadMode, title: &str) -> DownloadRequest {
        let url = Url::parse("https://example.com/video").unwrap();
        DownloadRequest::new(url, mode, Path::new("downloads"), title)
    }

    #[test]
    fn test_video_args() {
        let args = request(DownloadMode::Video, "Clip").ytdlp_args();
        assert_eq!(
            args,
            vec![
                "-o",
                "downloads/Clip.%(ext)s",
                "--newline",
                "--no-playlist",
                "--format",
                "bestvideo+bestaudio/best",
                "--merge-output-format",
                "mp4",
                "https://example.com/video",
            ]
        );
    }

    #[test]
    fn test_audio_args_extract_mp3() {
        let args = request(DownloadMode::Audio, "Track").ytdlp_args();
        assert!(args.contains(&"-x".to_string()));
        assert!(args.contains(&"bestaudio/best".to_string()));
        assert!(args.windows(2).any(|w| w == ["--audio-format", "mp3"]));
    }

    #[test]
    fn test_thumbnail_args_skip_download() {
        let args = request(DownloadMode::Thumbnail, "Pic").ytdlp_args();
        assert!(args.contains(&"--skip-download".to_string()));
        assert!(args.contains(&"--write-thumbnail".to_string()));
        assert!(!args.contains(&"--format".to_string()));
    }

    #[test]
    fn test_video_final_path_always_mp4() {
        let path = request(DownloadMode::Video, "Some Clip").final_path().unwrap();
        assert_eq!(path, PathBuf::from("downloads/Some Clip.mp4"));
    }

    #[test]
    fn test_audio_final_path_always_mp3() {
        let path = request(DownloadMode::Audio, "Some Track").final_path().unwrap();
        assert_eq!(path, PathBuf::from("downloads/Some Track.mp3"));
    }

    #[test]
    fn test_dotted_title_keeps_full_stem() {
        let path = request(DownloadMode::Video, "Episode 1. The Start").final_path().unwrap();
        assert_eq!(path, PathBuf::from("downloads/Episode 1. The Start.mp4"));
    }

    #[test]
    fn test_title_is_sanitized_and_truncated() {
        let long_title = "x".repeat(300);
        let req = request(DownloadMode::Video, &long_title);
        let stem = req.output_base.file_name().unwrap().to_str().unwrap();
        assert_eq!(stem.len(), config::download::MAX_TITLE_LEN);

        let req = request(DownloadMode::Video, "a/b:c");
        assert_eq!(req.output_base, PathBuf::from("downloads/a_b_c"));
    }

    #[test]
    fn test_empty_title_falls_back() {
        let req = request(DownloadMode::Video, "   ");
        assert_eq!(req.output_base, PathBuf::from("downloads/media"));
    }

    #[test]
    fn test_thumbnail_probe_prefers_jpg() {
        let dir = tempfile::tempdir().unwrap();
        let url = Url::parse("https://example.com/v").unwrap();
        let req = DownloadRequest::new(url, DownloadMode::Thumbnail, dir.path(), "cover");

        std::fs::write(dir.path().join("cover.png"), b"png").unwrap();
        std::fs::write(dir.path().join("cover.jpg"), b"jpg").unwrap();

        let path = req.final_path().unwrap();
        assert_eq!(path, dir.path().join("cover.jpg"));
    }

    #[test]
    fn test_thumbnail_probe_falls_through_to_webp() {
        let dir = tempfile::tempdir().unwrap();
        let url = Url::parse("https://example.com/v").unwrap();
        let req = DownloadRequest::new(url, DownloadMode::Thumbnail, dir.path(), "cover");

        std::fs::write(dir.path().join("cover.webp"), b"webp").unwrap();

        let path = req.final_path().unwrap();
        assert_eq!(path, dir.path().join("cover.webp"));
    }

    #[test]
    fn test_thumbnail_probe_none_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let url = Url::parse("https://example.com/v").unwrap();
        let req = DownloadRequest::new(url, DownloadMode::Thumbnail, dir.path(), "cover");

        assert!(matches!(req.final_path(), Err(AppError::Download(_))));
    }
}
