// src/renderer.rs

use crate::error::Result;
use crate::model::{Measure, OrderRecord, PivotOptions};
use crate::pivot::{compute_pivot, PivotResult, ValueRange};
use crate::scale::ColorScale;
use crate::sort::{sorted_rows, SortState};
use image::{Rgb, RgbImage};
use indicatif::{ParallelProgressIterator, ProgressBar};
use rayon::prelude::*;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// How heatmap cells pick their colour range.
#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Scaling {
    /// One range over the whole grid
    #[default]
    Global,
    /// Each column coloured against its own min/max
    PerColumn,
}

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub cell_width: u32,
    pub cell_height: u32,
    pub scaling: Scaling,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            cell_width: 24,
            cell_height: 16,
            scaling: Scaling::Global,
        }
    }
}

const BG_COLOR: Rgb<u8> = Rgb([8, 8, 12]);
const GAP: u32 = 1;

/// Formats a value the way the grid shows it: whole dollars for monetary
/// measures, plain counts otherwise.
pub fn format_value(value: f64, measure: Measure) -> String {
    let rounded = value.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if measure.is_monetary() {
        format!("{sign}${grouped}")
    } else {
        format!("{sign}{grouped}")
    }
}

/// Plain-text grid: header, one line per row in `order`, and a totals footer.
pub fn render_text(pivot: &PivotResult, order: &[usize]) -> String {
    let mut out = String::new();
    if pivot.is_empty() {
        out.push_str("No data\n");
        if pivot.skipped > 0 {
            let _ = writeln!(out, "({} records skipped: unparsable date)", pivot.skipped);
        }
        return out;
    }

    let measure = pivot.measure();
    let header: Vec<String> = std::iter::once(pivot.options.row_field.label().to_string())
        .chain(pivot.column_keys.iter().cloned())
        .chain(std::iter::once("Total".to_string()))
        .collect();

    let mut lines: Vec<Vec<String>> = vec![header];
    for &row in order {
        let mut line = vec![pivot.row_keys[row].clone()];
        line.extend(pivot.row_values(row).iter().map(|&v| format_value(v, measure)));
        line.push(format_value(pivot.row_totals[row], measure));
        lines.push(line);
    }
    let mut footer = vec!["Total".to_string()];
    footer.extend(pivot.column_totals.iter().map(|&v| format_value(v, measure)));
    footer.push(format_value(pivot.grand_total, measure));
    lines.push(footer);

    let columns = pivot.column_keys.len() + 2;
    let widths: Vec<usize> = (0..columns)
        .map(|c| lines.iter().map(|l| l[c].chars().count()).max().unwrap_or(0))
        .collect();

    let last = lines.len() - 1;
    for (i, line) in lines.iter().enumerate() {
        if i == last {
            let rule: usize = widths.iter().sum::<usize>() + 2 * (columns - 1);
            let _ = writeln!(out, "{}", "-".repeat(rule));
        }
        let mut text = String::new();
        for (c, cell) in line.iter().enumerate() {
            if c == 0 {
                let _ = write!(text, "{:<width$}", cell, width = widths[c]);
            } else {
                let _ = write!(text, "  {:>width$}", cell, width = widths[c]);
            }
        }
        out.push_str(text.trim_end());
        out.push('\n');
        if i == 0 {
            let rule: usize = widths.iter().sum::<usize>() + 2 * (columns - 1);
            let _ = writeln!(out, "{}", "-".repeat(rule));
        }
    }
    if pivot.skipped > 0 {
        let _ = writeln!(out, "({} records skipped: unparsable date)", pivot.skipped);
    }
    out
}

/// Paints the heatmap: one block per cell, rows in `order`, then a gap and a
/// row-total column on its own scale.
pub fn draw_heatmap(pivot: &PivotResult, order: &[usize], options: &RenderOptions) -> RgbImage {
    let cols = pivot.column_keys.len() as u32;
    let rows = order.len() as u32;
    let cw = options.cell_width.max(1);
    let ch = options.cell_height.max(1);
    let width = ((cols + 1) * cw + cols * GAP + GAP).max(1);
    let height = (rows * ch).max(1);
    let mut image = RgbImage::from_pixel(width, height, BG_COLOR);

    if pivot.is_empty() {
        return image;
    }

    let column_scales: Vec<ColorScale> = (0..pivot.column_keys.len())
        .map(|c| match options.scaling {
            Scaling::Global => ColorScale::new(pivot.value_range),
            Scaling::PerColumn => {
                ColorScale::new(pivot.column_range(c).unwrap_or(pivot.value_range))
            }
        })
        .collect();
    let total_scale = ColorScale::new(range_of(&pivot.row_totals));

    for (y, &row) in order.iter().enumerate() {
        let top = y as u32 * ch;
        for (c, scale) in column_scales.iter().enumerate() {
            let left = c as u32 * (cw + GAP);
            fill(&mut image, left, top, cw, ch, scale.color(pivot.cell_at(row, c)));
        }
        let left = cols * (cw + GAP) + GAP;
        fill(&mut image, left, top, cw, ch, total_scale.color(pivot.row_totals[row]));
    }
    image
}

fn fill(image: &mut RgbImage, left: u32, top: u32, w: u32, h: u32, color: Rgb<u8>) {
    // Leave a one pixel seam under each row
    let h = if h > 2 { h - 1 } else { h };
    for y in top..(top + h).min(image.height()) {
        for x in left..(left + w).min(image.width()) {
            image.put_pixel(x, y, color);
        }
    }
}

fn range_of(values: &[f64]) -> ValueRange {
    if values.is_empty() {
        return ValueRange::default();
    }
    values.iter().fold(
        ValueRange {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        },
        |r, &v| ValueRange {
            min: r.min.min(v),
            max: r.max.max(v),
        },
    )
}

pub fn render_png(
    pivot: &PivotResult,
    order: &[usize],
    options: &RenderOptions,
    path: &Path,
) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    draw_heatmap(pivot, order, options).save(path)?;
    info!(path = %path.display(), rows = order.len(), "heatmap written");
    Ok(())
}

/// One heatmap per measure, computed and drawn in parallel. Returns the
/// written paths in [`Measure::ALL`] order.
pub fn render_all_measures(
    records: &[&OrderRecord],
    base: &PivotOptions,
    sort: &SortState,
    options: &RenderOptions,
    dir: &Path,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;

    let bar = ProgressBar::new(Measure::ALL.len() as u64);
    bar.set_message("Rendering heatmaps");

    let paths = Measure::ALL
        .par_iter()
        .progress_with(bar)
        .map(|&measure| -> Result<PathBuf> {
            let pivot_options = PivotOptions { measure, ..*base };
            let pivot = compute_pivot(records.iter().copied(), &pivot_options);
            let order = sorted_rows(&pivot, sort);
            let path = dir.join(format!("pivot_{measure}.png"));
            render_png(&pivot, &order, options, &path)?;
            Ok(path)
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Bucket, RowField};

    fn line(order: &str, date: &str, company: &str, total: f64) -> OrderRecord {
        OrderRecord {
            order_id: order.into(),
            date: date.into(),
            company: company.into(),
            category: "Embroidery".into(),
            customer_type: "Direct".into(),
            quantity: 2,
            unit_price: total / 2.0,
            line_total: total,
            line_item_id: None,
            visual_id: None,
            order_status: None,
        }
    }

    fn sample_pivot() -> PivotResult {
        let records = vec![
            line("1", "2025-01-10", "Urban Threads", 1200.0),
            line("2", "2025-02-10", "Gym Club", 300.0),
            line("3", "2025-02-11", "Urban Threads", 50.0),
        ];
        compute_pivot(
            &records,
            &PivotOptions {
                row_field: RowField::Company,
                bucket: Bucket::Month,
                measure: Measure::Revenue,
            },
        )
    }

    #[test]
    fn formats_money_and_counts() {
        assert_eq!(format_value(1234567.4, Measure::Revenue), "$1,234,567");
        assert_eq!(format_value(999.5, Measure::AverageOrderValue), "$1,000");
        assert_eq!(format_value(-42.0, Measure::Revenue), "-$42");
        assert_eq!(format_value(12000.0, Measure::UnitCount), "12,000");
        assert_eq!(format_value(0.0, Measure::OrderCount), "0");
    }

    #[test]
    fn text_grid_has_header_rows_and_footer() {
        let pivot = sample_pivot();
        let order = sorted_rows(&pivot, &SortState::default());
        let text = render_text(&pivot, &order);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("Company"));
        assert!(lines[0].contains("2025-01") && lines[0].ends_with("Total"));
        assert!(lines[2].starts_with("Urban Threads"));
        assert!(lines[2].ends_with("$1,250"));
        assert!(lines[3].starts_with("Gym Club"));
        assert!(lines.last().unwrap().starts_with("Total"));
        assert!(lines.last().unwrap().ends_with("$1,550"));
    }

    #[test]
    fn empty_pivot_renders_no_data() {
        let pivot = compute_pivot(std::iter::empty::<&OrderRecord>(), &PivotOptions::default());
        assert_eq!(render_text(&pivot, &[]), "No data\n");
        let image = draw_heatmap(&pivot, &[], &RenderOptions::default());
        assert_eq!(image.get_pixel(0, 0), &BG_COLOR);
    }

    #[test]
    fn heatmap_dimensions_and_colours() {
        let pivot = sample_pivot();
        let order = vec![0, 1];
        let options = RenderOptions { cell_width: 10, cell_height: 8, scaling: Scaling::Global };
        let image = draw_heatmap(&pivot, &order, &options);
        assert_eq!(image.width(), 3 * 10 + 2 * GAP + GAP);
        assert_eq!(image.height(), 16);
        // Urban Threads in January holds the maximum: green dominates.
        let hot = image.get_pixel(1, 1);
        assert!(hot.0[1] > hot.0[0]);
        // Gym Club in January is zero, the minimum: red dominates.
        let cold = image.get_pixel(1, 9);
        assert!(cold.0[0] > cold.0[1]);
    }

    #[test]
    fn writes_png_per_measure() {
        let dir = tempfile::tempdir().unwrap();
        let records = vec![
            line("1", "2025-01-10", "Urban Threads", 1200.0),
            line("2", "2025-02-10", "Gym Club", 300.0),
        ];
        let refs: Vec<&OrderRecord> = records.iter().collect();
        let paths = render_all_measures(
            &refs,
            &PivotOptions::default(),
            &SortState::default(),
            &RenderOptions::default(),
            dir.path(),
        )
        .unwrap();
        assert_eq!(paths.len(), 4);
        assert!(paths.iter().all(|p| p.exists()));
        assert!(paths[1].ends_with("pivot_orders.png"));
    }
}
