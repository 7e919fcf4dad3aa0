use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// The three consecutive calendar months that get their own counter column
/// in month-columned summaries. Index 0 is the oldest month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackedMonths {
    starts: [NaiveDate; 3],
}

impl TrackedMonths {
    /// The month containing `date` and the two months before it.
    pub fn ending_at(date: NaiveDate) -> Self {
        let third = month_start(date);
        let second = month_start(third - Duration::days(1));
        let first = month_start(second - Duration::days(1));
        Self {
            starts: [first, second, third],
        }
    }

    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        self.starts
            .iter()
            .position(|start| start.year() == date.year() && start.month() == date.month())
    }

    pub fn labels(&self) -> [&'static str; 3] {
        self.starts.map(month_label)
    }

    pub fn first_day(&self) -> NaiveDate {
        self.starts[0]
    }
}

/// Inclusive pair of boundary dates sent to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// From the first day of the oldest tracked month through `today`.
    pub fn tracked(months: &TrackedMonths, today: NaiveDate) -> Self {
        Self::new(months.first_day(), today)
    }
}

/// Symbolic date range tokens offered by the clinics dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RangePreset {
    #[default]
    #[serde(rename = "7days")]
    Last7Days,
    #[serde(rename = "30days")]
    Last30Days,
    #[serde(rename = "90days")]
    Last90Days,
    #[serde(rename = "year")]
    ThisYear,
}

impl RangePreset {
    pub fn resolve(self, today: NaiveDate) -> DateRange {
        let start = match self {
            RangePreset::Last7Days => today - Duration::days(7),
            RangePreset::Last30Days => today - Duration::days(30),
            RangePreset::Last90Days => today - Duration::days(90),
            RangePreset::ThisYear => today - Duration::days(today.ordinal0() as i64),
        };
        DateRange::new(start, today)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RangePreset::Last7Days => "7days",
            RangePreset::Last30Days => "30days",
            RangePreset::Last90Days => "90days",
            RangePreset::ThisYear => "year",
        }
    }
}

impl fmt::Display for RangePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown date range '{0}' (expected 7days, 30days, 90days or year)")]
pub struct UnknownPreset(pub String);

impl FromStr for RangePreset {
    type Err = UnknownPreset;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "7days" => Ok(RangePreset::Last7Days),
            "30days" => Ok(RangePreset::Last30Days),
            "90days" => Ok(RangePreset::Last90Days),
            "year" => Ok(RangePreset::ThisYear),
            other => Err(UnknownPreset(other.to_string())),
        }
    }
}

/// Parses the date formats the backend is known to emit. Returns `None`
/// for anything else rather than guessing.
pub fn parse_record_date(raw: &str) -> Option<NaiveDate> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    if let Some(inner) = value
        .strip_prefix("/Date(")
        .and_then(|rest| rest.strip_suffix(")/"))
    {
        return parse_epoch_millis(inner);
    }

    if value.len() == 8 && value.bytes().all(|b| b.is_ascii_digit()) {
        return NaiveDate::parse_from_str(value, "%Y%m%d").ok();
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.date_naive());
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(parsed.date());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

// "/Date(1715558400000)/" or "/Date(1715558400000+0530)/"; the offset is ignored.
fn parse_epoch_millis(inner: &str) -> Option<NaiveDate> {
    let sign_len = usize::from(inner.starts_with('-'));
    let digits_end = inner[sign_len..]
        .find(|c: char| !c.is_ascii_digit())
        .map_or(inner.len(), |pos| pos + sign_len);
    let millis: i64 = inner[..digits_end].parse().ok()?;
    DateTime::from_timestamp_millis(millis).map(|dt| dt.date_naive())
}

pub fn month_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.day0() as i64)
}

pub fn month_label(date: NaiveDate) -> &'static str {
    MONTH_LABELS[date.month0() as usize]
}

/// `Week N` with N = ceil(day-of-month / 7).
pub fn week_of_month_label(date: NaiveDate) -> String {
    format!("Week {}", date.day().div_ceil(7))
}

/// `D Mon`, e.g. `13 May`.
pub fn day_label(date: NaiveDate) -> String {
    format!("{} {}", date.day(), month_label(date))
}

/// Dates go over the wire as `YYYYMMDD` text.
pub fn backend_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn tracked_months_cross_year_boundary() {
        let months = TrackedMonths::ending_at(ymd(2026, 2, 14));
        assert_eq!(months.labels(), ["Dec", "Jan", "Feb"]);
        assert_eq!(months.first_day(), ymd(2025, 12, 1));
        assert_eq!(months.index_of(ymd(2025, 12, 31)), Some(0));
        assert_eq!(months.index_of(ymd(2026, 1, 1)), Some(1));
        assert_eq!(months.index_of(ymd(2026, 2, 28)), Some(2));
        assert_eq!(months.index_of(ymd(2024, 12, 5)), None);
        assert_eq!(months.index_of(ymd(2026, 3, 1)), None);
    }

    #[test]
    fn presets_resolve_against_explicit_today() {
        let today = ymd(2026, 5, 19);
        assert_eq!(
            RangePreset::Last7Days.resolve(today),
            DateRange::new(ymd(2026, 5, 12), today)
        );
        assert_eq!(RangePreset::Last30Days.resolve(today).start, ymd(2026, 4, 19));
        assert_eq!(RangePreset::Last90Days.resolve(today).start, ymd(2026, 2, 18));
        assert_eq!(RangePreset::ThisYear.resolve(today).start, ymd(2026, 1, 1));
    }

    #[test]
    fn preset_tokens_parse() {
        assert_eq!("30days".parse::<RangePreset>(), Ok(RangePreset::Last30Days));
        assert_eq!(" year ".parse::<RangePreset>(), Ok(RangePreset::ThisYear));
        assert!("fortnight".parse::<RangePreset>().is_err());
        assert_eq!(RangePreset::Last90Days.to_string(), "90days");
    }

    #[test]
    fn parses_backend_date_formats() {
        let expected = Some(ymd(2024, 5, 13));
        assert_eq!(parse_record_date("20240513"), expected);
        assert_eq!(parse_record_date("2024-05-13"), expected);
        assert_eq!(parse_record_date("2024-05-13T09:30:00"), expected);
        assert_eq!(parse_record_date("2024-05-13T09:30:00.125"), expected);
        assert_eq!(parse_record_date("2024-05-13T09:30:00Z"), expected);
        assert_eq!(parse_record_date("/Date(1715558400000)/"), expected);
        assert_eq!(parse_record_date("/Date(1715558400000+0000)/"), expected);
    }

    #[test]
    fn rejects_malformed_dates() {
        assert_eq!(parse_record_date(""), None);
        assert_eq!(parse_record_date("   "), None);
        assert_eq!(parse_record_date("not a date"), None);
        assert_eq!(parse_record_date("20241399"), None);
        assert_eq!(parse_record_date("/Date(abc)/"), None);
    }

    #[test]
    fn labels() {
        assert_eq!(week_of_month_label(ymd(2024, 3, 1)), "Week 1");
        assert_eq!(week_of_month_label(ymd(2024, 3, 7)), "Week 1");
        assert_eq!(week_of_month_label(ymd(2024, 3, 8)), "Week 2");
        assert_eq!(week_of_month_label(ymd(2024, 3, 31)), "Week 5");
        assert_eq!(day_label(ymd(2024, 5, 3)), "3 May");
        assert_eq!(backend_date(ymd(2024, 5, 3)), "20240503");
    }
}
