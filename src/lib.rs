//! Salesboard - sales dashboard over uploaded CSV and spreadsheet files
//!
//! Loads a tabular sales export, guesses which columns hold the date, sales,
//! profit, product, region, state, city, retailer and quantity by fuzzy
//! header matching, cleans those columns, applies category and date filters
//! and computes KPIs plus grouped totals for charting.
//!
//! # Example
//!
//! ```no_run
//! use royalbit_salesboard::core::pipeline;
//! use royalbit_salesboard::types::FilterSelection;
//! use std::path::Path;
//!
//! let selection = FilterSelection {
//!     regions: vec!["East".to_string()],
//!     ..Default::default()
//! };
//! let dashboard = pipeline::run_path(Path::new("sales.csv"), &selection)?;
//!
//! println!("Total sales: {}", dashboard.aggregates.kpis.total_sales);
//! println!("Orders: {}", dashboard.aggregates.kpis.total_orders);
//! # Ok::<(), royalbit_salesboard::error::SalesboardError>(())
//! ```

pub mod api;
pub mod cli;
pub mod core;
pub mod error;
pub mod excel;
pub mod ingest;
pub mod report;
pub mod types;
pub mod writer;

// Re-export commonly used types
pub use crate::core::{Aggregates, Dashboard};
pub use error::{SalesboardError, SalesboardResult};
pub use types::{Binding, CellValue, FilterSelection, Role, Table};
