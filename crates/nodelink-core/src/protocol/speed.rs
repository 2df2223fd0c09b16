//! Transfer-rate formatting for the console.

/// Formats a rate in bytes per second.
///
/// Rates up to 1024 KB/s print as whole kilobytes, larger ones as megabytes
/// with one decimal.
///
/// # Examples
///
/// ```rust
/// use nodelink_core::protocol::format_speed;
///
/// assert_eq!(format_speed(2048.0), "2 KB/s");
/// assert_eq!(format_speed(2_000_000.0), "1.9 MB/s");
/// ```
pub fn format_speed(bytes_per_sec: f64) -> String {
    let kb = bytes_per_sec / 1024.0;
    if kb > 1024.0 {
        format!("{:.1} MB/s", kb / 1024.0)
    } else {
        format!("{kb:.0} KB/s")
    }
}
