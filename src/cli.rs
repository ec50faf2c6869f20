// src/cli.rs

use chrono::NaiveDate;
use clap::Parser;
use sales_pivot::renderer::Scaling;
use sales_pivot::{Bucket, Measure, RowField};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Pivot order lines into a heatmap grid", long_about = None)]
pub struct Args {
    /// JSON array of order lines; a generated sample is used when omitted
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Number of orders in the generated sample
    #[arg(long, default_value_t = 400, conflicts_with = "input")]
    pub sample_orders: usize,

    /// Seed for the generated sample
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// First day of the generated sample
    #[arg(long, default_value = "2025-01-01")]
    pub sample_start: NaiveDate,

    /// Days covered by the generated sample
    #[arg(long, default_value_t = 180)]
    pub sample_days: u32,

    /// Record field that becomes the pivot rows
    #[arg(short, long, value_enum, default_value_t = RowField::Company)]
    pub row_field: RowField,

    /// Date bucket for the pivot columns
    #[arg(short, long, value_enum, default_value_t = Bucket::Month)]
    pub bucket: Bucket,

    /// Value shown in each cell
    #[arg(short, long, value_enum, default_value_t = Measure::Revenue)]
    pub measure: Measure,

    /// Sort rows by this column label instead of the row total
    #[arg(long)]
    pub sort_column: Option<String>,

    /// Sort ascending instead of descending
    #[arg(long)]
    pub ascending: bool,

    /// Keep lines on or after this date
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Keep lines on or before this date
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Keep a single company
    #[arg(long)]
    pub company: Option<String>,

    /// Keep these customer types (repeatable)
    #[arg(long = "customer-type")]
    pub customer_types: Vec<String>,

    /// Keep these categories (repeatable)
    #[arg(long = "category")]
    pub categories: Vec<String>,

    /// Print the pivot as JSON instead of a text grid
    #[arg(long)]
    pub json: bool,

    /// Also print KPIs, the customer table and a trend series
    #[arg(long)]
    pub summary: bool,

    /// Reference day for "today", week and month-to-date KPIs
    /// (defaults to the latest invoice date)
    #[arg(long)]
    pub as_of: Option<NaiveDate>,

    /// Write the heatmap as a PNG
    #[arg(long)]
    pub png: Option<PathBuf>,

    /// Write one heatmap PNG per measure into this directory
    #[arg(long)]
    pub all_measures: Option<PathBuf>,

    /// Width of one heatmap cell in pixels
    #[arg(long, default_value_t = 24)]
    pub cell_width: u32,

    /// Height of one heatmap cell in pixels
    #[arg(long, default_value_t = 16)]
    pub cell_height: u32,

    /// Colour range used by the heatmap
    #[arg(long, value_enum, default_value_t = Scaling::Global)]
    pub scaling: Scaling,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}
