// src/lib.rs

//! Pivot aggregation over order lines: groups revenue, distinct orders,
//! units and average order value by a row dimension and a time bucket, and
//! supplies the sorting, colour scaling, filtering and summary pieces a
//! dashboard renders around it.

pub mod bucket;
pub mod error;
pub mod filter;
pub mod model;
pub mod pivot;
pub mod renderer;
pub mod scale;
pub mod sort;
pub mod source;
pub mod summary;

pub use error::{Error, Result};
pub use model::{Bucket, Measure, OrderRecord, PivotOptions, RowField};
pub use pivot::{compute_pivot, PivotResult, ValueRange};
