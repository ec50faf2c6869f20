// src/model.rs

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One order line. Several lines share an `order_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub order_id: String,
    /// Invoice date as supplied, ideally `YYYY-MM-DD`. Parsed lazily so one
    /// bad value only costs that record.
    #[serde(rename = "invoiceDate", alias = "date")]
    pub date: String,
    #[serde(alias = "companyName")]
    pub company: String,
    pub category: String,
    pub customer_type: String,
    #[serde(rename = "qty", alias = "quantity")]
    pub quantity: u32,
    pub unit_price: f64,
    /// Revenue for the line, discounts and fees already applied.
    #[serde(rename = "totalPrice", alias = "lineTotal")]
    pub line_total: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_item_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_status: Option<String>,
}

/// Which record attribute becomes the pivot row key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "camelCase")]
pub enum RowField {
    #[value(alias = "company-name")]
    Company,
    Category,
    CustomerType,
}

impl RowField {
    pub fn project<'a>(&self, record: &'a OrderRecord) -> &'a str {
        match self {
            RowField::Company => &record.company,
            RowField::Category => &record.category,
            RowField::CustomerType => &record.customer_type,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RowField::Company => "Company",
            RowField::Category => "Category",
            RowField::CustomerType => "Customer type",
        }
    }
}

impl FromStr for RowField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "company" | "companyname" | "company-name" => Ok(RowField::Company),
            "category" => Ok(RowField::Category),
            "customertype" | "customer-type" | "customer_type" => Ok(RowField::CustomerType),
            _ => Err(Error::InvalidOption {
                kind: "row field",
                value: s.to_string(),
                expected: "company, category, customerType",
            }),
        }
    }
}

/// Date truncation granularity for pivot columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "camelCase")]
pub enum Bucket {
    Day,
    Week,
    Month,
}

impl FromStr for Bucket {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "day" => Ok(Bucket::Day),
            "week" => Ok(Bucket::Week),
            "month" => Ok(Bucket::Month),
            _ => Err(Error::InvalidOption {
                kind: "bucket",
                value: s.to_string(),
                expected: "day, week, month",
            }),
        }
    }
}

/// The quantity computed per pivot cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "camelCase")]
pub enum Measure {
    Revenue,
    #[value(alias = "orders")]
    OrderCount,
    #[value(alias = "units")]
    UnitCount,
    #[value(alias = "aov")]
    AverageOrderValue,
}

impl Measure {
    pub const ALL: [Measure; 4] = [
        Measure::Revenue,
        Measure::OrderCount,
        Measure::UnitCount,
        Measure::AverageOrderValue,
    ];

    /// Revenue-like measures are shown as money, the rest as counts.
    pub fn is_monetary(&self) -> bool {
        matches!(self, Measure::Revenue | Measure::AverageOrderValue)
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Measure::Revenue => "revenue",
            Measure::OrderCount => "orders",
            Measure::UnitCount => "units",
            Measure::AverageOrderValue => "aov",
        };
        f.write_str(name)
    }
}

impl FromStr for Measure {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "revenue" => Ok(Measure::Revenue),
            "orders" | "ordercount" | "order-count" => Ok(Measure::OrderCount),
            "units" | "unitcount" | "unit-count" => Ok(Measure::UnitCount),
            "aov" | "averageordervalue" | "average-order-value" => {
                Ok(Measure::AverageOrderValue)
            }
            _ => Err(Error::InvalidOption {
                kind: "measure",
                value: s.to_string(),
                expected: "revenue, orderCount, unitCount, averageOrderValue",
            }),
        }
    }
}

/// Everything that selects one pivot over a record set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PivotOptions {
    pub row_field: RowField,
    pub bucket: Bucket,
    pub measure: Measure,
}

impl Default for PivotOptions {
    fn default() -> Self {
        Self {
            row_field: RowField::Company,
            bucket: Bucket::Month,
            measure: Measure::Revenue,
        }
    }
}

impl PivotOptions {
    /// Builds options from untyped names, rejecting anything outside the
    /// enumerations instead of defaulting.
    pub fn parse(row_field: &str, bucket: &str, measure: &str) -> Result<Self> {
        Ok(Self {
            row_field: row_field.parse()?,
            bucket: bucket.parse()?,
            measure: measure.parse()?,
        })
    }
}
