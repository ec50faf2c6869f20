// src/sort.rs

use crate::pivot::PivotResult;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// What rows are ordered by for display.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    #[default]
    RowTotal,
    /// A column label, e.g. `2025-03`.
    Column(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Current sort of a pivot view. Starts at row total, descending.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortState {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortState {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    /// Header-click behaviour: the same key again flips direction, a new key
    /// starts descending.
    pub fn select(&mut self, key: SortKey) {
        if self.key == key {
            self.direction = self.direction.flipped();
        } else {
            self.key = key;
            self.direction = SortDirection::Descending;
        }
    }
}

/// Row indices of `pivot` in display order. Stable: equal values keep their
/// encounter order in either direction.
pub fn sorted_rows(pivot: &PivotResult, state: &SortState) -> Vec<usize> {
    let mut rows: Vec<usize> = (0..pivot.row_keys.len()).collect();
    let column = match &state.key {
        SortKey::RowTotal => None,
        SortKey::Column(label) => match pivot.column_index(label) {
            Some(c) => Some(c),
            None => return rows,
        },
    };

    let value = |row: usize| match column {
        Some(c) => pivot.cell_at(row, c),
        None => pivot.row_totals[row],
    };

    rows.sort_by(|&a, &b| {
        let ord = value(a).partial_cmp(&value(b)).unwrap_or(Ordering::Equal);
        match state.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PivotOptions;
    use crate::pivot::ValueRange;

    fn grid(rows: &[&str], columns: &[&str], cells: Vec<f64>) -> PivotResult {
        let width = columns.len();
        let row_totals: Vec<f64> = cells.chunks(width).map(|c| c.iter().sum()).collect();
        let mut column_totals = vec![0.0; width];
        for row in cells.chunks(width) {
            for (c, v) in row.iter().enumerate() {
                column_totals[c] += v;
            }
        }
        PivotResult {
            options: PivotOptions::default(),
            row_keys: rows.iter().map(|s| s.to_string()).collect(),
            column_keys: columns.iter().map(|s| s.to_string()).collect(),
            grand_total: row_totals.iter().sum(),
            row_totals,
            column_totals,
            cells,
            value_range: ValueRange::default(),
            skipped: 0,
        }
    }

    #[test]
    fn defaults_to_row_total_descending() {
        let state = SortState::default();
        assert_eq!(state.key, SortKey::RowTotal);
        assert_eq!(state.direction, SortDirection::Descending);

        let pivot = grid(&["a", "b", "c"], &["m1", "m2"], vec![1.0, 1.0, 5.0, 0.0, 2.0, 2.0]);
        assert_eq!(sorted_rows(&pivot, &state), vec![1, 2, 0]);
    }

    #[test]
    fn selecting_same_key_flips_direction() {
        let mut state = SortState::default();
        state.select(SortKey::RowTotal);
        assert_eq!(state.direction, SortDirection::Ascending);
        state.select(SortKey::RowTotal);
        assert_eq!(state.direction, SortDirection::Descending);

        state.select(SortKey::Column("m2".into()));
        state.select(SortKey::Column("m2".into()));
        assert_eq!(state.key, SortKey::Column("m2".into()));
        assert_eq!(state.direction, SortDirection::Ascending);

        // A different key always restarts descending.
        state.select(SortKey::Column("m1".into()));
        assert_eq!(state.direction, SortDirection::Descending);
    }

    #[test]
    fn sorts_by_column_value() {
        let pivot = grid(&["a", "b", "c"], &["m1", "m2"], vec![9.0, 1.0, 0.0, 3.0, 5.0, 2.0]);
        let desc = SortState::new(SortKey::Column("m2".into()), SortDirection::Descending);
        assert_eq!(sorted_rows(&pivot, &desc), vec![1, 2, 0]);
        let asc = SortState::new(SortKey::Column("m2".into()), SortDirection::Ascending);
        assert_eq!(sorted_rows(&pivot, &asc), vec![0, 2, 1]);
    }

    #[test]
    fn ties_keep_encounter_order_both_ways() {
        let pivot = grid(&["a", "b", "c", "d"], &["m1"], vec![1.0, 2.0, 1.0, 2.0]);
        let desc = SortState::default();
        assert_eq!(sorted_rows(&pivot, &desc), vec![1, 3, 0, 2]);
        let asc = SortState::new(SortKey::RowTotal, SortDirection::Ascending);
        assert_eq!(sorted_rows(&pivot, &asc), vec![0, 2, 1, 3]);
    }

    #[test]
    fn unknown_column_leaves_order_unchanged() {
        let pivot = grid(&["a", "b"], &["m1"], vec![1.0, 2.0]);
        let state = SortState::new(SortKey::Column("nope".into()), SortDirection::Descending);
        assert_eq!(sorted_rows(&pivot, &state), vec![0, 1]);
    }
}
