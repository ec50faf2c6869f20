// src/filter.rs

use crate::bucket::parse_date;
use crate::error::{Error, Result};
use crate::model::OrderRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Dashboard-level narrowing applied before records reach the pivot.
/// Every criterion is optional; an empty list matches everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filters {
    /// Inclusive lower date bound.
    pub from: Option<NaiveDate>,
    /// Inclusive upper date bound.
    pub to: Option<NaiveDate>,
    pub company: Option<String>,
    #[serde(default)]
    pub customer_types: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
}

impl Filters {
    /// Sets the date window from `YYYY-MM-DD` strings.
    pub fn with_date_range(mut self, from: Option<&str>, to: Option<&str>) -> Result<Self> {
        let parse = |raw: &str| parse_date(raw).ok_or_else(|| Error::InvalidDate(raw.to_string()));
        self.from = from.map(parse).transpose()?;
        self.to = to.map(parse).transpose()?;
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.from.is_none()
            && self.to.is_none()
            && self.company.is_none()
            && self.customer_types.is_empty()
            && self.categories.is_empty()
    }

    /// A record whose date does not parse passes the date check, so the
    /// pivot still sees and counts it.
    pub fn matches(&self, record: &OrderRecord) -> bool {
        if let Some(date) = parse_date(&record.date) {
            if self.from.is_some_and(|from| date < from) {
                return false;
            }
            if self.to.is_some_and(|to| date > to) {
                return false;
            }
        }
        if self.company.as_ref().is_some_and(|c| *c != record.company) {
            return false;
        }
        if !self.customer_types.is_empty() && !self.customer_types.contains(&record.customer_type) {
            return false;
        }
        if !self.categories.is_empty() && !self.categories.contains(&record.category) {
            return false;
        }
        true
    }

    pub fn apply<'a>(&self, records: &'a [OrderRecord]) -> Vec<&'a OrderRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(order: &str, date: &str, company: &str, category: &str, kind: &str) -> OrderRecord {
        OrderRecord {
            order_id: order.into(),
            date: date.into(),
            company: company.into(),
            category: category.into(),
            customer_type: kind.into(),
            quantity: 1,
            unit_price: 10.0,
            line_total: 10.0,
            line_item_id: None,
            visual_id: None,
            order_status: None,
        }
    }

    fn dataset() -> Vec<OrderRecord> {
        vec![
            record("1", "2025-01-10", "Urban Threads", "Screen Print", "Direct"),
            record("2", "2025-02-10", "Gym Club", "Embroidery", "Direct"),
            record("3", "2025-03-10", "Urban Threads", "Embroidery", "Enterprise"),
            record("4", "bad-date", "Gym Club", "Screen Print", "Wholesale"),
        ]
    }

    fn ids(records: Vec<&OrderRecord>) -> Vec<&str> {
        records.into_iter().map(|r| r.order_id.as_str()).collect()
    }

    #[test]
    fn empty_filters_keep_everything() {
        let data = dataset();
        let filters = Filters::default();
        assert!(filters.is_empty());
        assert_eq!(filters.apply(&data).len(), 4);
    }

    #[test]
    fn date_bounds_are_inclusive_and_keep_bad_dates() {
        let data = dataset();
        let filters = Filters::default()
            .with_date_range(Some("2025-02-10"), Some("2025-03-10"))
            .unwrap();
        assert_eq!(ids(filters.apply(&data)), vec!["2", "3", "4"]);
    }

    #[test]
    fn dimension_filters_combine() {
        let data = dataset();
        let filters = Filters {
            company: Some("Urban Threads".into()),
            categories: vec!["Embroidery".into()],
            ..Filters::default()
        };
        assert_eq!(ids(filters.apply(&data)), vec!["3"]);

        let filters = Filters {
            customer_types: vec!["Enterprise".into(), "Wholesale".into()],
            ..Filters::default()
        };
        assert_eq!(ids(filters.apply(&data)), vec!["3", "4"]);
    }

    #[test]
    fn rejects_unparsable_bounds() {
        let err = Filters::default()
            .with_date_range(Some("last tuesday"), None)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidDate(ref d) if d == "last tuesday"));
    }
}
