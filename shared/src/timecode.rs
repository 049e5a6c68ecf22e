//! Frame number to wall-clock conversion.

/// Convert a frame number to its video timestamp in milliseconds.
///
/// Returns 0 for a non-positive frame rate.
pub fn frame_to_millis(frame: u64, fps: f64) -> i64 {
    if fps <= 0.0 {
        return 0;
    }
    (frame as f64 * 1000.0 / fps).round() as i64
}

/// Format a frame number as `HH:MM:SS.mmm`.
///
/// The last 4 characters are the fractional portion; overlay rendering
/// elides them.
pub fn frame_to_timestamp(frame: u64, fps: f64) -> String {
    let millis = frame_to_millis(frame, fps).max(0) as u64;
    let hours = millis / 3_600_000;
    let minutes = (millis / 60_000) % 60;
    let seconds = (millis / 1_000) % 60;
    let fraction = millis % 1_000;
    format!("{hours:02}:{minutes:02}:{seconds:02}.{fraction:03}")
}
