//! Time formatting for progress labels.

/// Progress label for a number of seconds, zero padded as `HH:MM:SS`.
///
/// ```
/// # use pmotransport::time_utils::format_hhmmss;
/// assert_eq!(format_hhmmss(2893), "00:48:13");
/// assert_eq!(format_hhmmss(3981), "01:06:21");
/// ```
pub fn format_hhmmss(seconds: u32) -> String {
    let (hours, rest) = (seconds / 3600, seconds % 3600);
    format!("{:02}:{:02}:{:02}", hours, rest / 60, rest % 60)
}

/// Floors a media position to whole seconds, clamped to `[0, duration]`.
///
/// Negative and NaN positions map to 0.
pub fn floor_position(position_secs: f64, duration: u32) -> u32 {
    if position_secs.is_nan() || position_secs <= 0.0 {
        return 0;
    }
    let floored = position_secs.floor();
    if floored >= duration as f64 {
        duration
    } else {
        floored as u32
    }
}
