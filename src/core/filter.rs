//! Row filtering by category selections and an inclusive date range

use crate::types::{Binding, CellValue, FilterSelection, Role, Table};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Inclusive calendar interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Result of filtering: the surviving rows plus the date interval that was applied
#[derive(Debug, Clone, PartialEq)]
pub struct Filtered {
    pub table: Table,
    /// `None` when no date role is bound, or when the date column has no
    /// valid dates and the selection left an end of the interval open
    pub date_range: Option<DateRange>,
}

/// Distinct non-empty values of a column, in first-appearance order
pub fn distinct_values(table: &Table, column: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    table
        .column(column)
        .into_iter()
        .filter(|cell| !cell.is_empty())
        .map(CellValue::to_string)
        .filter(|value| seen.insert(value.clone()))
        .collect()
}

/// Minimum and maximum date present in a column
pub fn date_extent(table: &Table, column: &str) -> Option<DateRange> {
    let mut dates = table.column(column).into_iter().filter_map(CellValue::as_date);
    let first = dates.next()?;
    let (start, end) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
    Some(DateRange { start, end })
}

/// Keep rows whose dimension values are in the non-empty selections
pub fn filter_dimensions(table: &Table, binding: &Binding, selection: &FilterSelection) -> Table {
    let constraints: Vec<(usize, HashSet<&str>)> = Role::DIMENSIONS
        .iter()
        .filter_map(|&role| {
            let selected = selection.selected(role);
            if selected.is_empty() {
                return None;
            }
            let idx = table.column_index(binding.get(role)?)?;
            Some((idx, selected.iter().map(String::as_str).collect()))
        })
        .collect();

    if constraints.is_empty() {
        return table.clone();
    }

    table.filter_rows(|row| {
        constraints
            .iter()
            .all(|(idx, allowed)| allowed.contains(row[*idx].to_string().as_str()))
    })
}

/// Interval applied to the date column: user bounds, defaulting to the column's extent
pub fn effective_date_range(
    table: &Table,
    column: &str,
    selection: &FilterSelection,
) -> Option<DateRange> {
    let extent = date_extent(table, column);
    let start = selection.start.or(extent.map(|e| e.start))?;
    let end = selection.end.or(extent.map(|e| e.end))?;
    Some(DateRange { start, end })
}

/// Apply category selections, then the date range when a date role is bound
pub fn apply(table: &Table, binding: &Binding, selection: &FilterSelection) -> Filtered {
    let narrowed = filter_dimensions(table, binding, selection);

    let Some(date_column) = binding.get(Role::Date) else {
        return Filtered {
            table: narrowed,
            date_range: None,
        };
    };
    let Some(date_idx) = narrowed.column_index(date_column) else {
        return Filtered {
            table: narrowed,
            date_range: None,
        };
    };

    let date_range = effective_date_range(&narrowed, date_column, selection);
    if let Some(range) = date_range {
        if range.start > range.end {
            warn!(start = %range.start, end = %range.end, "start date is after end date");
        }
    }

    let table = narrowed.filter_rows(|row| match (date_range, row[date_idx].as_date()) {
        (Some(range), Some(date)) => range.contains(date),
        _ => false,
    });

    debug!(
        rows = table.row_count(),
        before_date_filter = narrowed.row_count(),
        "filters applied"
    );

    Filtered { table, date_range }
}
