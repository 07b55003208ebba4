//! Display strings for totals.
//!
//! Output shapes are fixed; the UI matches on them. Negative and non-finite inputs
//! render as zero.

const METERS_PER_KM: f64 = 1_000.0;
const SQ_METERS_PER_SQ_KM: f64 = 1_000_000.0;
const AREA_KM_THRESHOLD: f64 = 10_000.0;

const MS_PER_SECOND: i64 = 1_000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
const MINUTES_PER_HOUR: i64 = 60;
const MINUTES_PER_DAY: i64 = 24 * MINUTES_PER_HOUR;

fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// `"{m}m"` below a kilometer, `"{km:.2}km"` from there on.
///
/// ```rust
/// use exploration_stats::format_distance;
///
/// assert_eq!(format_distance(500.0), "500m");
/// assert_eq!(format_distance(1500.0), "1.50km");
/// ```
pub fn format_distance(meters: f64) -> String {
    let meters = sanitize(meters);
    let rounded = meters.round();

    // Compare after rounding so 999.6 never renders as "1000m"
    if rounded < METERS_PER_KM {
        format!("{}m", rounded as i64)
    } else {
        format!("{:.2}km", meters / METERS_PER_KM)
    }
}

/// `"{m²}m²"` below 10,000 m², `"{km²:.2}km²"` from there on.
///
/// ```rust
/// use exploration_stats::format_area;
///
/// assert_eq!(format_area(5000.0), "5000m²");
/// assert_eq!(format_area(1_500_000.0), "1.50km²");
/// ```
pub fn format_area(square_meters: f64) -> String {
    let square_meters = sanitize(square_meters);
    let rounded = square_meters.round();

    if rounded < AREA_KM_THRESHOLD {
        format!("{}m²", rounded as i64)
    } else {
        format!("{:.2}km²", square_meters / SQ_METERS_PER_SQ_KM)
    }
}

/// Coarse active-time label in whole minutes, rounded up.
///
/// ```rust
/// use exploration_stats::format_time;
///
/// assert_eq!(format_time(30_000), "1m");
/// assert_eq!(format_time(3_660_000), "1h 1m");
/// assert_eq!(format_time(93_780_000), "1d 2h 3m");
/// ```
pub fn format_time(ms: i64) -> String {
    let ms = ms.max(0);
    // Any started minute counts
    let total_minutes = ms / MS_PER_MINUTE + i64::from(ms % MS_PER_MINUTE != 0);

    let days = total_minutes / MINUTES_PER_DAY;
    let hours = (total_minutes % MINUTES_PER_DAY) / MINUTES_PER_HOUR;
    let minutes = total_minutes % MINUTES_PER_HOUR;

    if total_minutes < MINUTES_PER_HOUR {
        format!("{}m", minutes)
    } else if total_minutes < MINUTES_PER_DAY {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}d {}h {}m", days, hours, minutes)
    }
}

/// Running counter for a live session: `"MM:SS"`, or `"H:MM:SS"` past an hour.
///
/// Seconds are truncated so the counter never runs ahead of the clock.
pub fn format_time_as_timer(ms: i64) -> String {
    let total_seconds = ms.max(0) / MS_PER_SECOND;
    let hours = total_seconds / 3_600;
    let minutes = (total_seconds % 3_600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}
