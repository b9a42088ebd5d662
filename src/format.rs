//! Display formatting for stored image attributes.

use chrono::{DateTime, Local, TimeZone, Utc};

/// Layout of `Image::created_at`
pub const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const KILOBYTE: u64 = 1024;
const MEGABYTE: u64 = 1024 * KILOBYTE;
const GIGABYTE: u64 = 1024 * MEGABYTE;
const TERABYTE: u64 = 1024 * GIGABYTE;

/// Human-readable byte size with one decimal place and a single-letter
/// unit (`B`, `K`, `M`, `G`, `T`). A trailing `.0` is dropped and zero
/// renders as `"0"`.
#[allow(clippy::cast_precision_loss)]
pub fn byte_size(bytes: u64) -> String {
    let (value, unit) = match bytes {
        0 => return "0".to_string(),
        b if b >= TERABYTE => (b as f64 / TERABYTE as f64, "T"),
        b if b >= GIGABYTE => (b as f64 / GIGABYTE as f64, "G"),
        b if b >= MEGABYTE => (b as f64 / MEGABYTE as f64, "M"),
        b if b >= KILOBYTE => (b as f64 / KILOBYTE as f64, "K"),
        b => (b as f64, "B"),
    };

    let value = format!("{value:.1}");
    let value = value.strip_suffix(".0").unwrap_or(&value);
    format!("{value}{unit}")
}

/// Byte size for a signed count as reported by the runtime; negatives
/// count as zero.
pub fn signed_byte_size(bytes: i64) -> String {
    byte_size(u64::try_from(bytes).unwrap_or(0))
}

/// Format epoch nanoseconds in the local timezone.
pub fn created_at(nanos: i64) -> String {
    created_at_in(nanos, &Local)
}

pub fn created_at_in<Tz>(nanos: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    DateTime::<Utc>::from_timestamp_nanos(nanos)
        .with_timezone(tz)
        .format(CREATED_AT_FORMAT)
        .to_string()
}
