// src/source.rs

use crate::error::Result;
use crate::model::OrderRecord;
use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::fs;
use std::path::Path;
use tracing::info;

const COMPANIES: &[(&str, &str)] = &[
    ("Urban Threads", "Direct"),
    ("Gym Club", "Direct"),
    ("Enterprise Corp", "Enterprise"),
    ("Yoga Studio", "Direct"),
    ("Contract Solutions Inc", "Enterprise"),
    ("Campus Outfitters", "Wholesale"),
];

const CATEGORIES: &[(&str, f64)] = &[
    ("Screen Print", 12.5),
    ("Embroidery", 18.0),
    ("Hybrid Decoration", 22.0),
    ("DTF Transfer", 9.75),
];

const STATUSES: &[&str] = &["Completed", "Production", "Shipped"];

/// Reads a JSON array of order lines.
pub fn load_records(path: &Path) -> Result<Vec<OrderRecord>> {
    let raw = fs::read_to_string(path)?;
    let records: Vec<OrderRecord> = serde_json::from_str(&raw)?;
    info!(path = %path.display(), records = records.len(), "loaded order lines");
    Ok(records)
}

/// Shape of a generated sample dataset.
#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub orders: usize,
    pub seed: u64,
    pub start: NaiveDate,
    /// Orders are spread uniformly over this many days from `start`.
    pub days: u32,
}

/// Deterministic stand-in for the order feed: the same config always yields
/// the same lines. Each order gets one to three lines.
pub fn sample_records(config: &SampleConfig) -> Vec<OrderRecord> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut records = Vec::with_capacity(config.orders * 2);
    let span = i64::from(config.days.max(1));

    for n in 0..config.orders {
        let order_id = format!("SO-{:06}", n + 1);
        let date = config.start + Duration::days(rng.gen_range(0..span));
        let &(company, customer_type) = COMPANIES.choose(&mut rng).unwrap_or(&COMPANIES[0]);
        let status = STATUSES.choose(&mut rng).copied().unwrap_or("Completed");
        let lines = rng.gen_range(1..=3);

        for line in 0..lines {
            let &(category, base_price) = CATEGORIES.choose(&mut rng).unwrap_or(&CATEGORIES[0]);
            let quantity: u32 = rng.gen_range(12..=300);
            let unit_price = (base_price * rng.gen_range(0.85..1.15) * 100.0).round() / 100.0;
            let line_total = (unit_price * f64::from(quantity) * 100.0).round() / 100.0;
            records.push(OrderRecord {
                order_id: order_id.clone(),
                date: date.format("%Y-%m-%d").to_string(),
                company: company.to_string(),
                category: category.to_string(),
                customer_type: customer_type.to_string(),
                quantity,
                unit_price,
                line_total,
                line_item_id: Some(format!("{order_id}-{}", line + 1)),
                visual_id: None,
                order_status: Some(status.to_string()),
            });
        }
    }
    records
}
