// src/main.rs

mod cli;

use anyhow::Context;
use clap::Parser;
use cli::Args;
use sales_pivot::bucket::parse_date;
use sales_pivot::filter::Filters;
use sales_pivot::renderer::{self, RenderOptions};
use sales_pivot::sort::{sorted_rows, SortDirection, SortKey, SortState};
use sales_pivot::source::{self, SampleConfig};
use sales_pivot::{compute_pivot, summary, OrderRecord, PivotOptions};
use std::time::Instant;
use tracing::info;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = if args.verbose {
        tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into())
    } else {
        tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into())
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let start_time = Instant::now();

    // 1. Load or generate the order lines
    let records = match &args.input {
        Some(path) => source::load_records(path)
            .with_context(|| format!("failed to load order lines from {}", path.display()))?,
        None => {
            let config = SampleConfig {
                orders: args.sample_orders,
                seed: args.seed,
                start: args.sample_start,
                days: args.sample_days,
            };
            let records = source::sample_records(&config);
            info!(orders = config.orders, lines = records.len(), seed = config.seed, "generated sample data");
            records
        }
    };

    // 2. Narrow them the way the dashboard filter bar does
    let filters = Filters {
        from: args.from,
        to: args.to,
        company: args.company.clone(),
        customer_types: args.customer_types.clone(),
        categories: args.categories.clone(),
    };
    let selected: Vec<&OrderRecord> = filters.apply(&records);
    info!(total = records.len(), selected = selected.len(), "filters applied");

    // 3. Pivot and sort
    let options = PivotOptions {
        row_field: args.row_field,
        bucket: args.bucket,
        measure: args.measure,
    };
    let pivot = compute_pivot(selected.iter().copied(), &options);
    let sort = SortState::new(
        args.sort_column.clone().map_or(SortKey::RowTotal, SortKey::Column),
        if args.ascending { SortDirection::Ascending } else { SortDirection::Descending },
    );
    let order = sorted_rows(&pivot, &sort);
    info!(
        rows = pivot.row_keys.len(),
        columns = pivot.column_keys.len(),
        skipped = pivot.skipped,
        "pivot finished in {:.2?}",
        start_time.elapsed()
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&pivot)?);
    } else {
        print!("{}", renderer::render_text(&pivot, &order));
    }

    // 4. Images
    let render_options = RenderOptions {
        cell_width: args.cell_width,
        cell_height: args.cell_height,
        scaling: args.scaling,
    };
    if let Some(path) = &args.png {
        renderer::render_png(&pivot, &order, &render_options, path)
            .with_context(|| format!("failed to write heatmap {}", path.display()))?;
    }
    if let Some(dir) = &args.all_measures {
        let render_start = Instant::now();
        let paths = renderer::render_all_measures(&selected, &options, &sort, &render_options, dir)
            .with_context(|| format!("failed to render heatmaps into {}", dir.display()))?;
        info!(count = paths.len(), "heatmaps rendered in {:.2?}", render_start.elapsed());
    }

    // 5. Headline figures
    if args.summary {
        let as_of = args
            .as_of
            .or_else(|| selected.iter().filter_map(|r| parse_date(&r.date)).max());
        let report = serde_json::json!({
            "kpis": as_of.map(|day| summary::kpis(selected.iter().copied(), day)),
            "customers": summary::customer_metrics(selected.iter().copied()),
            "trend": summary::trend(selected.iter().copied(), args.bucket),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    info!("Total time: {:.2?}", start_time.elapsed());
    Ok(())
}
