use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ProcessingError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Monthly,
    Yearly,
}

impl Frequency {
    pub const ALL: [Frequency; 3] = [Frequency::Daily, Frequency::Monthly, Frequency::Yearly];

    /// Suffix used in `{name}_{Suffix}.json`
    pub fn file_suffix(&self) -> &'static str {
        match self {
            Frequency::Daily => "Daily",
            Frequency::Monthly => "Monthly",
            Frequency::Yearly => "Yearly",
        }
    }

    pub fn granularity(&self) -> &'static str {
        match self {
            Frequency::Daily => "day",
            Frequency::Monthly => "month",
            Frequency::Yearly => "year",
        }
    }

    pub fn bucket_key(&self, timestamp: &str) -> Result<BucketKey> {
        let date = parse_timestamp_date(timestamp)?;
        Ok(match self {
            Frequency::Daily => BucketKey::Day(date),
            Frequency::Monthly => BucketKey::Month {
                year: date.year(),
                month: date.month(),
            },
            Frequency::Yearly => BucketKey::Year(date.year()),
        })
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.file_suffix())
    }
}

impl FromStr for Frequency {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.to_ascii_lowercase();
        Frequency::ALL
            .into_iter()
            .find(|f| f.granularity() == wanted || f.file_suffix().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| {
                ProcessingError::InvalidFormat(format!(
                    "Unknown frequency '{}'. Expected day, month or year",
                    s
                ))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BucketKey {
    Day(NaiveDate),
    Month { year: i32, month: u32 },
    Year(i32),
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BucketKey::Day(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            BucketKey::Month { year, month } => write!(f, "{:04}-{:02}", year, month),
            BucketKey::Year(year) => write!(f, "{}", year),
        }
    }
}

/// Calendar date of an archive timestamp, as written (no timezone shift).
pub fn parse_timestamp_date(timestamp: &str) -> Result<NaiveDate> {
    let trimmed = timestamp.trim();

    for format in ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(dt.date());
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.naive_local().date());
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|_| ProcessingError::InvalidTimestamp(timestamp.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_key_rendering() {
        let ts = "2020-01-31T23:00";
        assert_eq!(Frequency::Daily.bucket_key(ts).unwrap().to_string(), "2020-01-31");
        assert_eq!(Frequency::Monthly.bucket_key(ts).unwrap().to_string(), "2020-01");
        assert_eq!(Frequency::Yearly.bucket_key(ts).unwrap().to_string(), "2020");
    }

    #[test]
    fn test_month_boundary() {
        let before = "2020-01-31T23:00";
        let after = "2020-02-01T00:00";

        assert_ne!(
            Frequency::Monthly.bucket_key(before).unwrap(),
            Frequency::Monthly.bucket_key(after).unwrap()
        );
        assert_eq!(
            Frequency::Yearly.bucket_key(before).unwrap(),
            Frequency::Yearly.bucket_key(after).unwrap()
        );
    }

    #[test]
    fn test_timestamp_forms() {
        let expected = NaiveDate::from_ymd_opt(2021, 6, 15).unwrap();
        assert_eq!(parse_timestamp_date("2021-06-15T07:00").unwrap(), expected);
        assert_eq!(parse_timestamp_date("2021-06-15T07:00:30").unwrap(), expected);
        assert_eq!(parse_timestamp_date("2021-06-15").unwrap(), expected);
        // wall-clock date as written, not converted to UTC
        assert_eq!(
            parse_timestamp_date("2021-06-15T01:00:00+07:00").unwrap(),
            expected
        );
        assert!(parse_timestamp_date("15/06/2021").is_err());
    }

    #[test]
    fn test_frequency_from_str() {
        assert_eq!("day".parse::<Frequency>().unwrap(), Frequency::Daily);
        assert_eq!("Monthly".parse::<Frequency>().unwrap(), Frequency::Monthly);
        assert_eq!("year".parse::<Frequency>().unwrap(), Frequency::Yearly);
        assert!("week".parse::<Frequency>().is_err());
    }
}
