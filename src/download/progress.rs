//! Parsing of yt-dlp progress output.
//!
//! With `--newline`, yt-dlp prints one progress line per update:
//!
//! ```text
//! [download]  45.2% of 10.00MiB at 500.00KiB/s ETA 00:10
//! ```

/// A single parsed progress update.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    pub percent: u8,
    pub speed_mbs: Option<f64>,
    pub eta_seconds: Option<u64>,
}

/// Events forwarded from the download process to the notifier.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// A `[download]` percentage line was seen
    Downloading(ProgressInfo),
    /// Post-processing started (merge or audio extraction); the transfer
    /// itself is done
    Finished,
}

/// Parses progress from a yt-dlp output line.
///
/// Returns `None` for anything that is not a `[download] NN%` line —
/// destination lines, post-processor output, junk.
pub fn parse_progress(line: &str) -> Option<ProgressInfo> {
    if !line.contains("[download]") || !line.contains('%') {
        return None;
    }

    let mut percent = None;
    let mut speed_mbs = None;
    let mut eta_seconds = None;

    let parts: Vec<&str> = line.split_whitespace().collect();
    for (i, part) in parts.iter().enumerate() {
        if part.ends_with('%') {
            if let Ok(p) = part.trim_end_matches('%').parse::<f32>() {
                // Clamp so garbage input cannot jump the bar past 100
                percent = Some(p.clamp(0.0, 100.0) as u8);
            }
        }

        // Speed: "at 500.00KiB/s" or "at 2.3MiB/s"
        if *part == "at" && i + 1 < parts.len() {
            if let Some(speed) = parse_size(parts[i + 1]) {
                speed_mbs = Some(speed as f64 / (1024.0 * 1024.0));
            }
        }

        // ETA: "ETA 00:10" or "ETA 1:23"
        if *part == "ETA" && i + 1 < parts.len() {
            if let Some(eta) = parse_eta(parts[i + 1]) {
                eta_seconds = Some(eta);
            }
        }
    }

    percent.map(|p| ProgressInfo {
        percent: p,
        speed_mbs,
        eta_seconds,
    })
}

/// Returns true for lines marking the start of post-processing, after which
/// no more `[download]` updates will arrive.
pub fn is_postprocessing_line(line: &str) -> bool {
    line.starts_with("[Merger]") || line.starts_with("[ExtractAudio]") || line.starts_with("[FixupM3u8]")
}

/// Parses a size token like "10.00MiB" or "500.00KiB/s" into bytes.
fn parse_size(size_str: &str) -> Option<u64> {
    let size_str = size_str.trim_end_matches("/s");
    if let Some(mb) = size_str.strip_suffix("MiB") {
        if let Ok(v) = mb.parse::<f64>() {
            return Some((v * 1024.0 * 1024.0) as u64);
        }
    } else if let Some(kb) = size_str.strip_suffix("KiB") {
        if let Ok(v) = kb.parse::<f64>() {
            return Some((v * 1024.0) as u64);
        }
    } else if let Some(gb) = size_str.strip_suffix("GiB") {
        if let Ok(v) = gb.parse::<f64>() {
            return Some((v * 1024.0 * 1024.0 * 1024.0) as u64);
        }
    }
    None
}

/// Parses an ETA token like "00:10" or "1:23" into seconds.
fn parse_eta(eta_str: &str) -> Option<u64> {
    let parts: Vec<&str> = eta_str.split(':').collect();
    if parts.len() == 2 {
        if let (Ok(minutes), Ok(seconds)) = (parts[0].parse::<u64>(), parts[1].parse::<u64>()) {
            return Some(minutes * 60 + seconds);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_progress_line() {
        let info = parse_progress("[download]  45.2% of 10.00MiB at 500.00KiB/s ETA 00:10").unwrap();
        assert_eq!(info.percent, 45);
        assert!((info.speed_mbs.unwrap() - 0.488).abs() < 0.01);
        assert_eq!(info.eta_seconds, Some(10));
    }

    #[test]
    fn test_parse_progress_mib_speed() {
        let info = parse_progress("[download]  99.8% of 120.50MiB at 2.30MiB/s ETA 01:23").unwrap();
        assert_eq!(info.percent, 99);
        assert!((info.speed_mbs.unwrap() - 2.3).abs() < 0.01);
        assert_eq!(info.eta_seconds, Some(83));
    }

    #[test]
    fn test_parse_progress_no_percent() {
        assert!(parse_progress("[download] Destination: downloads/video.mp4").is_none());
    }

    #[test]
    fn test_parse_progress_irrelevant_lines() {
        assert!(parse_progress("[youtube] abc: Downloading webpage").is_none());
        assert!(parse_progress("").is_none());
        assert!(parse_progress("100% unrelated").is_none());
    }

    #[test]
    fn test_parse_progress_clamps_percent() {
        let info = parse_progress("[download] 250.0% of 1.00MiB").unwrap();
        assert_eq!(info.percent, 100);
    }

    #[test]
    fn test_postprocessing_markers() {
        assert!(is_postprocessing_line("[Merger] Merging formats into \"downloads/a.mp4\""));
        assert!(is_postprocessing_line("[ExtractAudio] Destination: downloads/a.mp3"));
        assert!(!is_postprocessing_line("[download] 100% of 3.00MiB"));
    }
}
