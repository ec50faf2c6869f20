// src/summary.rs

//! Headline figures built from the same order lines as the pivot: the KPI
//! strip, the per-customer table and a bucketed trend series.

use crate::bucket::{bucket_label, parse_date};
use crate::model::{Bucket, OrderRecord};
use crate::pivot::CellAccumulator;
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Leader {
    pub name: String,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpis {
    pub revenue_total: f64,
    pub revenue_today: f64,
    /// The seven days ending on `as_of`.
    pub revenue_week: f64,
    pub revenue_mtd: f64,
    pub orders: usize,
    pub units: u64,
    pub aov: f64,
    pub top_customer: Option<Leader>,
    pub top_category: Option<Leader>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerMetrics {
    pub company: String,
    pub revenue: f64,
    pub orders: usize,
    pub last_order_date: NaiveDate,
    pub avg_order_value: f64,
    /// In the order first seen.
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub period: String,
    pub revenue: f64,
    pub orders: usize,
    pub units: u64,
}

/// Revenue per key in first-seen order, so the leader is the earliest of
/// equal earners.
#[derive(Default)]
struct RevenueBoard<'a> {
    index: HashMap<&'a str, usize>,
    entries: Vec<(&'a str, f64)>,
}

impl<'a> RevenueBoard<'a> {
    fn add(&mut self, key: &'a str, revenue: f64) {
        let entries = &mut self.entries;
        let idx = *self.index.entry(key).or_insert_with(|| {
            entries.push((key, 0.0));
            entries.len() - 1
        });
        self.entries[idx].1 += revenue;
    }

    fn leader(&self) -> Option<Leader> {
        let mut best: Option<&(&str, f64)> = None;
        for entry in &self.entries {
            if best.map_or(true, |b| entry.1 > b.1) {
                best = Some(entry);
            }
        }
        best.map(|&(name, revenue)| Leader {
            name: name.to_string(),
            revenue,
        })
    }
}

pub fn kpis<'a, I>(records: I, as_of: NaiveDate) -> Kpis
where
    I: IntoIterator<Item = &'a OrderRecord>,
{
    let week_start = as_of - Duration::days(6);
    let month_start = as_of.with_day(1).unwrap_or(as_of);

    let mut totals = CellAccumulator::default();
    let mut revenue_today = 0.0;
    let mut revenue_week = 0.0;
    let mut revenue_mtd = 0.0;
    let mut customers = RevenueBoard::default();
    let mut categories = RevenueBoard::default();

    for record in records {
        let Some(date) = parse_date(&record.date) else {
            warn!(order_id = %record.order_id, date = %record.date, "skipping record with unparsable date");
            continue;
        };
        totals.add(record);
        if date == as_of {
            revenue_today += record.line_total;
        }
        if date >= week_start && date <= as_of {
            revenue_week += record.line_total;
        }
        if date >= month_start && date <= as_of {
            revenue_mtd += record.line_total;
        }
        customers.add(&record.company, record.line_total);
        categories.add(&record.category, record.line_total);
    }

    Kpis {
        revenue_total: totals.revenue,
        revenue_today,
        revenue_week,
        revenue_mtd,
        orders: totals.order_count(),
        units: totals.units,
        aov: totals.average_order_value(),
        top_customer: customers.leader(),
        top_category: categories.leader(),
    }
}

/// Per-company revenue, orders and AOV, highest revenue first.
pub fn customer_metrics<'a, I>(records: I) -> Vec<CustomerMetrics>
where
    I: IntoIterator<Item = &'a OrderRecord>,
{
    struct Entry<'a> {
        company: &'a str,
        tally: CellAccumulator<'a>,
        last_order_date: NaiveDate,
        categories: Vec<&'a str>,
        seen_categories: HashSet<&'a str>,
    }

    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut entries: Vec<Entry<'a>> = Vec::new();

    for record in records {
        let Some(date) = parse_date(&record.date) else {
            warn!(order_id = %record.order_id, date = %record.date, "skipping record with unparsable date");
            continue;
        };
        let idx = *index.entry(&record.company).or_insert_with(|| {
            entries.push(Entry {
                company: &record.company,
                tally: CellAccumulator::default(),
                last_order_date: date,
                categories: Vec::new(),
                seen_categories: HashSet::new(),
            });
            entries.len() - 1
        });

        let entry = &mut entries[idx];
        entry.tally.add(record);
        entry.last_order_date = entry.last_order_date.max(date);
        if entry.seen_categories.insert(&record.category) {
            entry.categories.push(&record.category);
        }
    }

    let mut metrics: Vec<CustomerMetrics> = entries
        .into_iter()
        .map(|e| CustomerMetrics {
            company: e.company.to_string(),
            revenue: e.tally.revenue,
            orders: e.tally.order_count(),
            last_order_date: e.last_order_date,
            avg_order_value: e.tally.average_order_value(),
            categories: e.categories.into_iter().map(String::from).collect(),
        })
        .collect();
    metrics.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
    metrics
}

/// Revenue, distinct orders and units per time bucket, oldest first.
pub fn trend<'a, I>(records: I, bucket: Bucket) -> Vec<TrendPoint>
where
    I: IntoIterator<Item = &'a OrderRecord>,
{
    let mut periods: BTreeMap<String, CellAccumulator<'a>> = BTreeMap::new();
    for record in records {
        let Some(date) = parse_date(&record.date) else {
            warn!(order_id = %record.order_id, date = %record.date, "skipping record with unparsable date");
            continue;
        };
        periods
            .entry(bucket_label(date, bucket))
            .or_default()
            .add(record);
    }

    periods
        .into_iter()
        .map(|(period, tally)| TrendPoint {
            period,
            revenue: tally.revenue,
            orders: tally.order_count(),
            units: tally.units,
        })
        .collect()
}
