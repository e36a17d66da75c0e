//! CF-convention time axis decoding (`"<unit> since <epoch>"`).
//!
//! ERA5 files use `hours since 1900-01-01 00:00:00.0`; files from the
//! newer CDS backend use `seconds since 1970-01-01` on a `valid_time`
//! axis. Both decode to naive UTC timestamps.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

use super::SourceError;

/// Unit of a CF time axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    fn millis(self) -> f64 {
        match self {
            TimeUnit::Seconds => 1_000.0,
            TimeUnit::Minutes => 60_000.0,
            TimeUnit::Hours => 3_600_000.0,
            TimeUnit::Days => 86_400_000.0,
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "seconds" | "second" | "secs" | "sec" | "s" => Some(TimeUnit::Seconds),
            "minutes" | "minute" | "mins" | "min" => Some(TimeUnit::Minutes),
            "hours" | "hour" | "hrs" | "hr" | "h" => Some(TimeUnit::Hours),
            "days" | "day" | "d" => Some(TimeUnit::Days),
            _ => None,
        }
    }
}

/// Parsed `units` attribute of a time coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeUnits {
    pub unit: TimeUnit,
    pub epoch: NaiveDateTime,
}

impl TimeUnits {
    /// Parse a CF units string such as `hours since 1900-01-01 00:00:00.0`.
    pub fn parse(units: &str) -> Result<Self, SourceError> {
        let bad = || SourceError::TimeUnits(units.to_string());
        let lower = units.trim().to_lowercase();
        let (unit, epoch) = lower.split_once(" since ").ok_or_else(bad)?;
        let unit = TimeUnit::parse(unit.trim()).ok_or_else(bad)?;
        let epoch = parse_epoch(epoch).ok_or_else(bad)?;
        Ok(Self { unit, epoch })
    }

    /// Convert an axis value to a timestamp, rounded to the millisecond.
    pub fn decode(&self, value: f64) -> Option<NaiveDateTime> {
        if !value.is_finite() {
            return None;
        }
        let millis = (value * self.unit.millis()).round();
        if millis.abs() > i64::MAX as f64 {
            return None;
        }
        let delta = TimeDelta::try_milliseconds(millis as i64)?;
        self.epoch.checked_add_signed(delta)
    }
}

/// Decode a whole time axis.
pub fn decode_times(values: &[f64], units: &str) -> Result<Vec<NaiveDateTime>, SourceError> {
    let units = TimeUnits::parse(units)?;
    values
        .iter()
        .map(|&v| {
            units.decode(v).ok_or_else(|| {
                SourceError::InvalidData(format!("time value {} cannot be decoded", v))
            })
        })
        .collect()
}

fn parse_epoch(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    let s = s
        .strip_suffix("utc")
        .or_else(|| s.strip_suffix('z'))
        .unwrap_or(s)
        .trim();

    const DATETIME_FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dt%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dt%H:%M",
    ];
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
