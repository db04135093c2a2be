//! Calendar and time-of-day helpers.
//!
//! All date arithmetic works on naive calendar dates and wall-clock times, so
//! results are identical regardless of the timezone of the host.

pub mod calendar;

pub use calendar::{
    date_key, half_hour_bucket, minute_of_day, parse_date, parse_time, weekday_index,
    weekday_label, WeekStart,
};
