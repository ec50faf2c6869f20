// src/pivot.rs

use crate::bucket::{bucket_label, parse_date};
use crate::model::{Measure, OrderRecord, PivotOptions};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Smallest and largest cell value of a grid (or of one column).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    /// All values equal. Colour mapping must not divide by the span then.
    pub fn is_uniform(&self) -> bool {
        self.max == self.min
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// Dense pivot grid: every observed row key crossed with every observed
/// column key has a value, with totals and the global value range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PivotResult {
    pub options: PivotOptions,
    /// Row keys in first-encounter order.
    pub row_keys: Vec<String>,
    /// Bucket labels, ascending.
    pub column_keys: Vec<String>,
    /// Row-major, `row_keys.len() * column_keys.len()` entries.
    pub cells: Vec<f64>,
    pub row_totals: Vec<f64>,
    pub column_totals: Vec<f64>,
    pub grand_total: f64,
    pub value_range: ValueRange,
    /// Records left out because their date did not parse.
    pub skipped: usize,
}

impl PivotResult {
    fn empty(options: PivotOptions, skipped: usize) -> Self {
        Self {
            options,
            row_keys: Vec::new(),
            column_keys: Vec::new(),
            cells: Vec::new(),
            row_totals: Vec::new(),
            column_totals: Vec::new(),
            grand_total: 0.0,
            value_range: ValueRange::default(),
            skipped,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.row_keys.is_empty()
    }

    pub fn measure(&self) -> Measure {
        self.options.measure
    }

    pub fn row_index(&self, row: &str) -> Option<usize> {
        self.row_keys.iter().position(|k| k == row)
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.column_keys.iter().position(|k| k == column)
    }

    pub fn cell_at(&self, row: usize, column: usize) -> f64 {
        if row >= self.row_keys.len() || column >= self.column_keys.len() {
            return 0.0;
        }
        self.cells[row * self.column_keys.len() + column]
    }

    /// Value of a cell by key; combinations that never occurred read as 0.
    pub fn cell(&self, row: &str, column: &str) -> f64 {
        match (self.row_index(row), self.column_index(column)) {
            (Some(r), Some(c)) => self.cell_at(r, c),
            _ => 0.0,
        }
    }

    pub fn row_values(&self, row: usize) -> &[f64] {
        let width = self.column_keys.len();
        if row >= self.row_keys.len() {
            return &[];
        }
        &self.cells[row * width..(row + 1) * width]
    }

    pub fn row_total(&self, row: &str) -> f64 {
        self.row_index(row).map_or(0.0, |r| self.row_totals[r])
    }

    pub fn column_total(&self, column: &str) -> f64 {
        self.column_index(column)
            .map_or(0.0, |c| self.column_totals[c])
    }

    /// Range of a single column, for heatmaps that colour each period on its
    /// own scale.
    pub fn column_range(&self, column: usize) -> Option<ValueRange> {
        if column >= self.column_keys.len() || self.row_keys.is_empty() {
            return None;
        }
        let mut range = ValueRange {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        };
        for row in 0..self.row_keys.len() {
            let v = self.cell_at(row, column);
            range.min = range.min.min(v);
            range.max = range.max.max(v);
        }
        Some(range)
    }
}

/// Running sums for one group of order lines (a pivot cell, a customer, a
/// trend bucket).
#[derive(Debug, Default)]
pub(crate) struct CellAccumulator<'a> {
    pub(crate) revenue: f64,
    pub(crate) units: u64,
    pub(crate) orders: HashSet<&'a str>,
}

impl<'a> CellAccumulator<'a> {
    pub(crate) fn add(&mut self, record: &'a OrderRecord) {
        self.revenue += record.line_total;
        self.units += u64::from(record.quantity);
        self.orders.insert(&record.order_id);
    }

    pub(crate) fn order_count(&self) -> usize {
        self.orders.len()
    }

    /// Revenue per distinct order, 0 when there are no orders.
    pub(crate) fn average_order_value(&self) -> f64 {
        if self.orders.is_empty() {
            0.0
        } else {
            self.revenue / self.orders.len() as f64
        }
    }

    pub(crate) fn value(&self, measure: Measure) -> f64 {
        match measure {
            Measure::Revenue => self.revenue,
            Measure::UnitCount => self.units as f64,
            Measure::OrderCount => self.order_count() as f64,
            Measure::AverageOrderValue => self.average_order_value(),
        }
    }
}

/// Pivots order lines into a (row key x time bucket) grid for one measure.
///
/// Pure and synchronous: the input is only read, and the result depends on
/// nothing but the arguments. Records whose date does not parse are skipped,
/// logged, and counted in [`PivotResult::skipped`].
pub fn compute_pivot<'a, I>(records: I, options: &PivotOptions) -> PivotResult
where
    I: IntoIterator<Item = &'a OrderRecord>,
{
    // --- Accumulation state ---
    let mut row_map: HashMap<&'a str, usize> = HashMap::new();
    let mut row_keys: Vec<&'a str> = Vec::new();
    let mut column_map: HashMap<String, usize> = HashMap::new();
    let mut column_labels: Vec<String> = Vec::new();
    let mut accumulators: HashMap<(usize, usize), CellAccumulator<'a>> = HashMap::new();
    let mut skipped = 0;

    // 1. Single pass over the records
    for record in records {
        let Some(date) = parse_date(&record.date) else {
            warn!(
                order_id = %record.order_id,
                date = %record.date,
                "skipping record with unparsable date"
            );
            skipped += 1;
            continue;
        };

        let row_key = options.row_field.project(record);
        let row_id = *row_map.entry(row_key).or_insert_with(|| {
            row_keys.push(row_key);
            row_keys.len() - 1
        });

        let label = bucket_label(date, options.bucket);
        let column_id = match column_map.get(&label) {
            Some(&id) => id,
            None => {
                let id = column_labels.len();
                column_map.insert(label.clone(), id);
                column_labels.push(label);
                id
            }
        };

        accumulators
            .entry((row_id, column_id))
            .or_default()
            .add(record);
    }

    if row_keys.is_empty() {
        debug!(skipped, measure = %options.measure, "pivot computed over no usable records");
        return PivotResult::empty(*options, skipped);
    }

    // 2. Columns ascend by label; remember where each one was first seen
    let mut column_order: Vec<usize> = (0..column_labels.len()).collect();
    column_order.sort_by(|&a, &b| column_labels[a].cmp(&column_labels[b]));

    // 3. Materialize the dense grid, totals and range
    let width = column_order.len();
    let mut cells = Vec::with_capacity(row_keys.len() * width);
    let mut row_totals = Vec::with_capacity(row_keys.len());
    let mut column_totals = vec![0.0; width];
    let mut grand_total = 0.0;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;

    for row_id in 0..row_keys.len() {
        let mut row_total = 0.0;
        for (column, &column_id) in column_order.iter().enumerate() {
            let v = accumulators
                .get(&(row_id, column_id))
                .map_or(0.0, |acc| acc.value(options.measure));
            cells.push(v);
            row_total += v;
            column_totals[column] += v;
            min = min.min(v);
            max = max.max(v);
        }
        row_totals.push(row_total);
        grand_total += row_total;
    }

    let column_keys: Vec<String> = column_order
        .iter()
        .map(|&id| column_labels[id].clone())
        .collect();

    debug!(
        rows = row_keys.len(),
        columns = column_keys.len(),
        skipped,
        measure = %options.measure,
        "pivot computed"
    );

    PivotResult {
        options: *options,
        row_keys: row_keys.into_iter().map(String::from).collect(),
        column_keys,
        cells,
        row_totals,
        column_totals,
        grand_total,
        value_range: ValueRange { min, max },
        skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Bucket, RowField};

    fn line(order: &str, date: &str, company: &str, total: f64, qty: u32) -> OrderRecord {
        OrderRecord {
            order_id: order.into(),
            date: date.into(),
            company: company.into(),
            category: "Screen Print".into(),
            customer_type: "Direct".into(),
            quantity: qty,
            unit_price: if qty == 0 { 0.0 } else { total / qty as f64 },
            line_total: total,
            line_item_id: None,
            visual_id: None,
            order_status: None,
        }
    }

    fn options(measure: Measure) -> PivotOptions {
        PivotOptions {
            row_field: RowField::Company,
            bucket: Bucket::Month,
            measure,
        }
    }

    #[test]
    fn rows_keep_encounter_order_and_columns_sort() {
        let records = vec![
            line("1", "2025-03-02", "Zeta", 10.0, 1),
            line("2", "2025-01-15", "Alpha", 20.0, 1),
            line("3", "2025-02-01", "Zeta", 30.0, 1),
        ];
        let result = compute_pivot(&records, &options(Measure::Revenue));
        assert_eq!(result.row_keys, vec!["Zeta", "Alpha"]);
        assert_eq!(result.column_keys, vec!["2025-01", "2025-02", "2025-03"]);
        assert_eq!(result.cells.len(), 6);
        assert_eq!(result.cell("Zeta", "2025-02"), 30.0);
        assert_eq!(result.cell("Alpha", "2025-03"), 0.0);
    }

    #[test]
    fn totals_and_range() {
        let records = vec![
            line("1", "2025-01-05", "A", 100.0, 2),
            line("2", "2025-02-05", "A", 50.0, 1),
            line("3", "2025-02-06", "B", 25.0, 5),
        ];
        let result = compute_pivot(&records, &options(Measure::Revenue));
        assert_eq!(result.row_total("A"), 150.0);
        assert_eq!(result.row_total("B"), 25.0);
        assert_eq!(result.column_total("2025-02"), 75.0);
        assert_eq!(result.grand_total, 175.0);
        assert_eq!(result.value_range, ValueRange { min: 0.0, max: 100.0 });

        let units = compute_pivot(&records, &options(Measure::UnitCount));
        assert_eq!(units.cell("B", "2025-02"), 5.0);
        assert_eq!(units.grand_total, 8.0);
    }

    #[test]
    fn aov_divides_by_distinct_orders() {
        let records = vec![
            line("1", "2025-01-05", "A", 100.0, 1),
            line("1", "2025-01-05", "A", 50.0, 1),
            line("2", "2025-01-20", "A", 30.0, 1),
            line("3", "2025-02-01", "B", 10.0, 1),
        ];
        let result = compute_pivot(&records, &options(Measure::AverageOrderValue));
        assert_eq!(result.cell("A", "2025-01"), 90.0);
        // B never ordered in January: guarded to 0, not NaN.
        assert_eq!(result.cell("B", "2025-01"), 0.0);
        assert!(result.cells.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn unknown_keys_read_as_zero() {
        let records = vec![line("1", "2025-01-05", "A", 100.0, 1)];
        let result = compute_pivot(&records, &options(Measure::Revenue));
        assert_eq!(result.cell("Nobody", "2025-01"), 0.0);
        assert_eq!(result.row_total("Nobody"), 0.0);
        assert_eq!(result.column_total("1999-01"), 0.0);
        assert_eq!(result.cell_at(5, 5), 0.0);
        assert!(result.row_values(3).is_empty());
    }

    #[test]
    fn column_range_is_per_column() {
        let records = vec![
            line("1", "2025-01-05", "A", 100.0, 1),
            line("2", "2025-01-06", "B", 40.0, 1),
            line("3", "2025-02-06", "B", 7.0, 1),
        ];
        let result = compute_pivot(&records, &options(Measure::Revenue));
        assert_eq!(result.column_range(0), Some(ValueRange { min: 40.0, max: 100.0 }));
        assert_eq!(result.column_range(1), Some(ValueRange { min: 0.0, max: 7.0 }));
        assert_eq!(result.column_range(2), None);
    }

    #[test]
    fn uniform_grid_collapses_range() {
        let records = vec![
            line("1", "2025-01-05", "A", 10.0, 1),
            line("2", "2025-02-05", "A", 10.0, 1),
        ];
        let result = compute_pivot(&records, &options(Measure::Revenue));
        assert!(result.value_range.is_uniform());
        assert_eq!(result.value_range.span(), 0.0);
    }

    #[test]
    fn all_records_skipped_gives_empty_result() {
        let records = vec![line("1", "garbage", "A", 10.0, 1)];
        let result = compute_pivot(&records, &options(Measure::Revenue));
        assert!(result.is_empty());
        assert_eq!(result.skipped, 1);
        assert_eq!(result.value_range, ValueRange::default());
    }
}
