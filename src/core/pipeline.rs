//! The full dashboard pipeline: resolve → clean → filter → aggregate
//!
//! Every interaction rebuilds the dashboard from the raw table. Nothing is
//! cached between calls.

use super::aggregator::{self, Aggregates};
use super::filter::{self, DateRange};
use super::resolver::{self, ColumnMatch};
use super::cleaner;
use crate::error::SalesboardResult;
use crate::ingest;
use crate::types::{Binding, FilterSelection, Role, Table};
use serde::Serialize;
use std::path::Path;
use tracing::info;

/// Values offered by the multi-select controls; `None` when the role is unbound
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FilterChoices {
    pub regions: Option<Vec<String>>,
    pub states: Option<Vec<String>>,
    pub cities: Option<Vec<String>>,
}

impl FilterChoices {
    pub fn from_table(table: &Table, binding: &Binding) -> Self {
        let values = |role: Role| {
            binding
                .get(role)
                .map(|column| filter::distinct_values(table, column))
        };
        Self {
            regions: values(Role::Region),
            states: values(Role::State),
            cities: values(Role::City),
        }
    }

    pub fn for_role(&self, role: Role) -> Option<&[String]> {
        match role {
            Role::Region => self.regions.as_deref(),
            Role::State => self.states.as_deref(),
            Role::City => self.cities.as_deref(),
            _ => None,
        }
    }
}

/// One rendered state of the dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub binding: Binding,
    pub columns: Vec<ColumnMatch>,
    pub choices: FilterChoices,
    /// Effective date interval; `None` when no date column is bound
    pub date_range: Option<DateRange>,
    pub total_rows: usize,
    pub aggregates: Aggregates,
    pub filtered: Table,
}

impl Dashboard {
    /// Run every stage after ingestion against a decoded table
    pub fn build(raw: &Table, selection: &FilterSelection) -> SalesboardResult<Self> {
        let columns = resolver::explain(raw.headers());
        let binding = resolver::resolve(raw.headers());
        let cleaned = cleaner::clean(raw, &binding)?;
        let choices = FilterChoices::from_table(&cleaned, &binding);

        let filtered = filter::apply(&cleaned, &binding, selection);
        let aggregates = aggregator::aggregate(&filtered.table, &binding);

        info!(
            bound_roles = binding.bound_count(),
            rows = raw.row_count(),
            filtered_rows = filtered.table.row_count(),
            "dashboard built"
        );

        Ok(Self {
            binding,
            columns,
            choices,
            date_range: filtered.date_range,
            total_rows: raw.row_count(),
            aggregates,
            filtered: filtered.table,
        })
    }
}

/// Decode an uploaded file and build its dashboard
pub fn run(bytes: &[u8], filename: &str, selection: &FilterSelection) -> SalesboardResult<Dashboard> {
    let raw = ingest::load_bytes(bytes, filename)?;
    Dashboard::build(&raw, selection)
}

/// Read a file from disk and build its dashboard
pub fn run_path(path: &Path, selection: &FilterSelection) -> SalesboardResult<Dashboard> {
    let raw = ingest::load_path(path)?;
    Dashboard::build(&raw, selection)
}
