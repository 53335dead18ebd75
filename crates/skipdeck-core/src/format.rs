use crate::interval::TimeInterval;
use crate::types::{SponsorInterval, Transcript};

/// Format seconds as a zero-padded MM:SS timestamp.
///
/// Negative inputs clamp to `00:00`. Inputs past 99 minutes keep the
/// minute field growing (`6000.0` renders as `100:00`), there is no
/// hour rollover.
pub fn format_timestamp(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Format an interval as `MM:SS → MM:SS`.
pub fn format_interval(interval: &TimeInterval) -> String {
    format!(
        "{} → {}",
        format_timestamp(interval.start()),
        format_timestamp(interval.end())
    )
}

/// One `MM:SS-MM:SS` line per interval, ready to paste into a skip list.
pub fn format_intervals_copyable(intervals: &[SponsorInterval]) -> String {
    intervals
        .iter()
        .map(|s| {
            format!(
                "{}-{}",
                format_timestamp(s.start()),
                format_timestamp(s.end())
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format transcript segments with timestamps.
pub fn format_transcript_with_timestamps(transcript: &Transcript) -> String {
    transcript
        .segments()
        .iter()
        .map(|seg| format!("[{}] {}", format_timestamp(seg.start()), seg.text().trim()))
        .collect::<Vec<_>>()
        .join("\n")
}
