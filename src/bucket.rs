// src/bucket.rs

//! Date parsing and the column labels used for time buckets.
//!
//! Labels are zero-padded so plain string ordering is chronological.

use crate::model::Bucket;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

/// Parses an invoice date. Accepts `YYYY-MM-DD`, a naive `YYYY-MM-DDTHH:MM:SS`
/// timestamp, or an RFC 3339 timestamp (taken in UTC).
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.naive_utc().date());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|ts| ts.date())
}

pub fn bucket_label(date: NaiveDate, bucket: Bucket) -> String {
    match bucket {
        Bucket::Day => date.format("%Y-%m-%d").to_string(),
        Bucket::Week => format!("{}-W{:02}", date.year(), week_of_year(date)),
        Bucket::Month => format!("{}-{:02}", date.year(), date.month()),
    }
}

/// Sunday-started week number anchored on January 1st:
/// `ceil((days_since_jan1 + weekday(jan1) + 1) / 7)` with Sunday = 0.
///
/// This is not ISO 8601. Week 1 is whatever partial week holds January 1st,
/// and late December can land in week 53 where ISO would say week 1 of the
/// next year. Existing dashboards depend on these labels.
pub fn week_of_year(date: NaiveDate) -> u32 {
    let days_since_jan1 = date.ordinal0();
    let weekday = date.weekday().num_days_from_sunday();
    let jan1_weekday = (weekday + 7 - days_since_jan1 % 7) % 7;
    (days_since_jan1 + jan1_weekday + 1).div_ceil(7)
}
