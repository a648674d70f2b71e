//! Dashboard engine: column resolution, cleaning, filtering and aggregation

pub mod aggregator;
pub mod cleaner;
pub mod filter;
pub mod pipeline;
pub mod resolver;

pub use aggregator::Aggregates;
pub use filter::{DateRange, Filtered};
pub use pipeline::{Dashboard, FilterChoices};
pub use resolver::ColumnMatch;
