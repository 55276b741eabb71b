//! Absolute capture timestamps.
//!
//! ASC traces store each event time as floating-point seconds relative to the
//! start of the measurement. A `date` header gives the calendar time of that
//! start; once seen, its epoch offset is added to every later event.
//!
//! All timestamps are resolved to nanoseconds, matching the `if_tsresol` the
//! pcapng writer declares for every interface.

use chrono::NaiveDateTime;

/// Nanoseconds per second.
pub const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// An absolute capture time split into whole seconds and the sub-second
/// remainder, both relative to the Unix epoch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CaptureTimestamp {
    /// Whole seconds.
    pub seconds: u64,
    /// Remainder in nanoseconds, always below one second.
    pub nanoseconds: u64,
}

impl CaptureTimestamp {
    /// Split a nanosecond count into seconds and remainder.
    pub const fn from_nanos(nanos: u64) -> Self {
        Self {
            seconds: nanos / NANOS_PER_SECOND,
            nanoseconds: nanos % NANOS_PER_SECOND,
        }
    }

    /// Total nanoseconds since the epoch.
    pub const fn as_nanos(&self) -> u64 {
        self.seconds * NANOS_PER_SECOND + self.nanoseconds
    }
}

/// Resolve a trace-relative event time against the current file-date offset.
///
/// The relative time is rounded to the nearest nanosecond before the offset
/// is added. A negative total clamps to the epoch.
///
/// ```
/// use asc2pcapng::timestamp::{CaptureTimestamp, resolve};
///
/// assert_eq!(resolve(1.5, 0), CaptureTimestamp { seconds: 1, nanoseconds: 500_000_000 });
/// assert_eq!(resolve(0.0, 10), CaptureTimestamp { seconds: 10, nanoseconds: 0 });
/// ```
pub fn resolve(relative_time: f64, file_date_offset: i64) -> CaptureTimestamp {
    let relative_ns = (relative_time * NANOS_PER_SECOND as f64).round() as i128;
    let offset_ns = file_date_offset as i128 * NANOS_PER_SECOND as i128;
    let absolute_ns = (relative_ns + offset_ns).clamp(0, u64::MAX as i128);
    CaptureTimestamp::from_nanos(absolute_ns as u64)
}

/// Epoch offset, in whole seconds, of a `date` header.
///
/// ASC headers carry no time zone; the calendar time is taken as UTC.
/// Sub-second precision is dropped.
pub fn date_offset(date: &NaiveDateTime) -> i64 {
    date.and_utc().timestamp()
}
