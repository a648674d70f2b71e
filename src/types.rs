use chrono::NaiveDate;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

//==============================================================================
// Cells and Tables
//==============================================================================

/// A single cell of an uploaded table
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// Missing value (blank cell, failed date parse)
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Bool(bool),
}

impl CellValue {
    /// Build a cell from raw text, mapping blank text to `Empty`
    pub fn from_text(raw: &str) -> Self {
        if raw.trim().is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(raw.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            CellValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Get the type name as a string
    pub fn type_name(&self) -> &'static str {
        match self {
            CellValue::Empty => "Empty",
            CellValue::Text(_) => "Text",
            CellValue::Number(_) => "Number",
            CellValue::Date(_) => "Date",
            CellValue::Bool(_) => "Boolean",
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            CellValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Empty => serializer.serialize_none(),
            CellValue::Text(s) => serializer.serialize_str(s),
            CellValue::Number(n) => serializer.serialize_f64(*n),
            CellValue::Date(d) => serializer.collect_str(&d.format("%Y-%m-%d")),
            CellValue::Bool(b) => serializer.serialize_bool(*b),
        }
    }
}

/// A decoded table: a fixed, ordered header list and row-major cells.
///
/// Every pipeline stage derives a new `Table` from its input; none of them
/// mutate a table in place.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Build a table from headers and rows, padding or truncating each row to the header width
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let mut table = Self::new(headers);
        for row in rows {
            table.push_row(row);
        }
        table
    }

    pub fn push_row(&mut self, mut row: Vec<CellValue>) {
        row.resize(self.headers.len(), CellValue::Empty);
        self.rows.push(row);
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&CellValue> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    /// All cells of one column, top to bottom. Empty when the column is unknown.
    pub fn column(&self, name: &str) -> Vec<&CellValue> {
        match self.column_index(name) {
            Some(idx) => self.rows.iter().map(|r| &r[idx]).collect(),
            None => Vec::new(),
        }
    }

    /// New table with one column rewritten cell by cell
    pub fn map_column<F>(&self, name: &str, mut f: F) -> Table
    where
        F: FnMut(&CellValue) -> CellValue,
    {
        let Some(idx) = self.column_index(name) else {
            return self.clone();
        };
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut row = row.clone();
                row[idx] = f(&row[idx]);
                row
            })
            .collect();
        Table {
            headers: self.headers.clone(),
            rows,
        }
    }

    /// New table keeping only the rows the predicate accepts
    pub fn filter_rows<F>(&self, mut keep: F) -> Table
    where
        F: FnMut(&[CellValue]) -> bool,
    {
        Table {
            headers: self.headers.clone(),
            rows: self.rows.iter().filter(|r| keep(r)).cloned().collect(),
        }
    }
}

//==============================================================================
// Roles and Bindings
//==============================================================================

/// Semantic category a column may represent
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Date,
    Sales,
    Profit,
    Product,
    Region,
    State,
    City,
    Retailer,
    Quantity,
}

impl Role {
    pub const ALL: [Role; 9] = [
        Role::Date,
        Role::Sales,
        Role::Profit,
        Role::Product,
        Role::Region,
        Role::State,
        Role::City,
        Role::Retailer,
        Role::Quantity,
    ];

    /// Roles whose columns hold numbers after cleaning
    pub const NUMERIC: [Role; 3] = [Role::Sales, Role::Profit, Role::Quantity];

    /// Roles offered as multi-select filters
    pub const DIMENSIONS: [Role; 3] = [Role::Region, Role::State, Role::City];

    pub fn name(&self) -> &'static str {
        match self {
            Role::Date => "date",
            Role::Sales => "sales",
            Role::Profit => "profit",
            Role::Product => "product",
            Role::Region => "region",
            Role::State => "state",
            Role::City => "city",
            Role::Retailer => "retailer",
            Role::Quantity => "quantity",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Date => "Date",
            Role::Sales => "Sales",
            Role::Profit => "Profit",
            Role::Product => "Product",
            Role::Region => "Region",
            Role::State => "State",
            Role::City => "City",
            Role::Retailer => "Retailer",
            Role::Quantity => "Quantity",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolved role → column mapping for one uploaded table.
///
/// A role is either bound to a header that existed when the binding was
/// computed, or absent. Absence means "feature unavailable" downstream.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Binding {
    columns: BTreeMap<Role, String>,
}

impl Binding {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, role: Role, header: impl Into<String>) {
        self.columns.insert(role, header.into());
    }

    pub fn get(&self, role: Role) -> Option<&str> {
        self.columns.get(&role).map(String::as_str)
    }

    pub fn is_bound(&self, role: Role) -> bool {
        self.columns.contains_key(&role)
    }

    pub fn bound_count(&self) -> usize {
        self.columns.len()
    }
}

impl Serialize for Binding {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Role::ALL.len()))?;
        for role in Role::ALL {
            map.serialize_entry(role.name(), &self.get(role))?;
        }
        map.end()
    }
}

//==============================================================================
// Filter Selection
//==============================================================================

/// User-chosen filter state for one interaction
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSelection {
    pub regions: Vec<String>,
    pub states: Vec<String>,
    pub cities: Vec<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl FilterSelection {
    /// Selected values for a dimension role (empty for non-dimension roles)
    pub fn selected(&self, role: Role) -> &[String] {
        match role {
            Role::Region => &self.regions,
            Role::State => &self.states,
            Role::City => &self.cities,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> Table {
        Table::from_rows(
            vec!["Region".to_string(), "Sales".to_string()],
            vec![
                vec![CellValue::from_text("East"), CellValue::Number(10.0)],
                vec![CellValue::from_text("West")],
            ],
        )
    }

    #[test]
    fn test_from_rows_pads_short_rows() {
        let table = sample_table();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.cell(1, "Sales"), Some(&CellValue::Empty));
    }

    #[test]
    fn test_from_text_blank_is_empty() {
        assert_eq!(CellValue::from_text("   "), CellValue::Empty);
        assert_eq!(
            CellValue::from_text("East"),
            CellValue::Text("East".to_string())
        );
    }

    #[test]
    fn test_map_column_returns_new_table() {
        let table = sample_table();
        let doubled = table.map_column("Sales", |c| match c {
            CellValue::Number(n) => CellValue::Number(n * 2.0),
            other => other.clone(),
        });
        assert_eq!(doubled.cell(0, "Sales"), Some(&CellValue::Number(20.0)));
        assert_eq!(table.cell(0, "Sales"), Some(&CellValue::Number(10.0)));
    }

    #[test]
    fn test_map_unknown_column_is_identity() {
        let table = sample_table();
        assert_eq!(table.map_column("Nope", |_| CellValue::Empty), table);
    }

    #[test]
    fn test_display_formats() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(CellValue::Date(date).to_string(), "2024-03-07");
        assert_eq!(CellValue::Number(100.0).to_string(), "100");
        assert_eq!(CellValue::Number(12.5).to_string(), "12.5");
        assert_eq!(CellValue::Empty.to_string(), "");
    }

    #[test]
    fn test_binding_serializes_every_role() {
        let mut binding = Binding::new();
        binding.bind(Role::Sales, "Total Sales");
        let json = serde_json::to_value(&binding).unwrap();
        assert_eq!(json["sales"], "Total Sales");
        assert!(json["date"].is_null());
        assert_eq!(json.as_object().unwrap().len(), 9);
    }

    #[test]
    fn test_selection_for_non_dimension_is_empty() {
        let selection = FilterSelection {
            regions: vec!["East".to_string()],
            ..Default::default()
        };
        assert_eq!(selection.selected(Role::Region), ["East".to_string()]);
        assert!(selection.selected(Role::Sales).is_empty());
    }
}
