//! Data cleaning: type the date and numeric role columns
//!
//! Parsing is best-effort and never fails a run. A date cell that cannot be
//! read becomes empty; a numeric cell that cannot be read becomes zero, so
//! "missing" and "zero" are indistinguishable after cleaning.

use crate::error::{SalesboardError, SalesboardResult};
use crate::types::{Binding, CellValue, Role, Table};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use tracing::debug;

/// Date-only layouts, tried in order (month-first wins for slash dates)
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%y",
    "%m/%d/%Y",
    "%d/%m/%y",
    "%d/%m/%Y",
    "%m-%d-%Y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%B %d %Y",
];

/// Date + time-of-day layouts; the time is dropped
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
];

/// Parse a calendar date from free-form text
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    // Compact YYYYMMDD
    if s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit()) {
        let year = s[0..4].parse().ok()?;
        let month = s[4..6].parse().ok()?;
        let day = s[6..8].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    // Year-first layouts only apply to values that start with a 4-digit year
    let bytes = s.as_bytes();
    let year_first =
        bytes.len() >= 5 && bytes[..4].iter().all(u8::is_ascii_digit) && !bytes[4].is_ascii_digit();
    let applies = |fmt: &&&str| fmt.starts_with("%Y") == year_first;

    DATE_FORMATS
        .iter()
        .filter(applies)
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .filter(applies)
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

/// Coerces currency/number text into numbers
pub struct NumberParser {
    currency_prefix: Regex,
}

impl NumberParser {
    pub fn new() -> SalesboardResult<Self> {
        // Optional sign, then one currency symbol, at the start of the value
        let currency_prefix = Regex::new(r"^([+-]?)\s*[$€£¥]\s*")
            .map_err(|e| SalesboardError::Validation(format!("Regex error: {}", e)))?;
        Ok(Self { currency_prefix })
    }

    /// Parse `"$1,234.50"`-style text; anything unreadable is `None`
    pub fn parse(&self, raw: &str) -> Option<f64> {
        let without_separators = raw.replace(',', "");
        let trimmed = without_separators.trim();
        let unprefixed = self.currency_prefix.replace(trimmed, "$1");
        unprefixed
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
    }

    /// Zero-filling variant used by the cleaner
    pub fn parse_or_zero(&self, raw: &str) -> f64 {
        self.parse(raw).unwrap_or(0.0)
    }
}

fn clean_date_cell(cell: &CellValue) -> CellValue {
    match cell {
        CellValue::Date(d) => CellValue::Date(*d),
        CellValue::Text(s) => parse_date(s).map_or(CellValue::Empty, CellValue::Date),
        _ => CellValue::Empty,
    }
}

/// Returns the typed cell and whether a non-empty value had to be zero-filled
fn clean_number_cell(parser: &NumberParser, cell: &CellValue) -> (CellValue, bool) {
    let (n, coerced) = match cell {
        CellValue::Number(n) if n.is_finite() => (*n, false),
        CellValue::Number(_) => (0.0, true),
        CellValue::Bool(b) => (f64::from(u8::from(*b)), false),
        CellValue::Text(s) => match parser.parse(s) {
            Some(n) => (n, false),
            None => (0.0, true),
        },
        CellValue::Date(_) => (0.0, true),
        CellValue::Empty => (0.0, false),
    };
    (CellValue::Number(n), coerced)
}

/// Produce a table whose date, sales, profit and quantity columns are typed.
///
/// Unbound roles leave the table untouched.
pub fn clean(table: &Table, binding: &Binding) -> SalesboardResult<Table> {
    let mut cleaned = table.clone();

    if let Some(column) = binding.get(Role::Date) {
        let mut coerced = 0usize;
        cleaned = cleaned.map_column(column, |cell| {
            let out = clean_date_cell(cell);
            if out.is_empty() && !cell.is_empty() {
                coerced += 1;
            }
            out
        });
        debug!(role = "date", column, coerced, "cleaned date column");
    }

    let parser = NumberParser::new()?;
    for role in Role::NUMERIC {
        let Some(column) = binding.get(role) else {
            continue;
        };
        let mut coerced = 0usize;
        cleaned = cleaned.map_column(column, |cell| {
            let (out, zero_filled) = clean_number_cell(&parser, cell);
            coerced += usize::from(zero_filled);
            out
        });
        debug!(role = %role, column, coerced, "cleaned numeric column");
    }

    Ok(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_number_currency() {
        let parser = NumberParser::new().unwrap();
        assert_eq!(parser.parse_or_zero("$1,234.50"), 1234.50);
        assert_eq!(parser.parse_or_zero("  € 99 "), 99.0);
        assert_eq!(parser.parse_or_zero("-$5"), -5.0);
        assert_eq!(parser.parse_or_zero("1,000,000"), 1_000_000.0);
    }

    #[test]
    fn test_parse_number_zero_fill() {
        let parser = NumberParser::new().unwrap();
        assert_eq!(parser.parse_or_zero(""), 0.0);
        assert_eq!(parser.parse_or_zero("abc"), 0.0);
        assert_eq!(parser.parse_or_zero("NaN"), 0.0);
        assert_eq!(parser.parse_or_zero("inf"), 0.0);
        assert_eq!(parser.parse("abc"), None);
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("2023-01-05"), Some(date(2023, 1, 5)));
        assert_eq!(parse_date("01/05/2023"), Some(date(2023, 1, 5)));
        assert_eq!(parse_date("1/5/23"), Some(date(2023, 1, 5)));
        assert_eq!(parse_date("25/12/2023"), Some(date(2023, 12, 25)));
        assert_eq!(parse_date("05-Jan-2023"), Some(date(2023, 1, 5)));
        assert_eq!(parse_date("January 5, 2023"), Some(date(2023, 1, 5)));
        assert_eq!(parse_date("20230105"), Some(date(2023, 1, 5)));
        assert_eq!(parse_date("2023-01-05 13:45:00"), Some(date(2023, 1, 5)));
        assert_eq!(parse_date("2023-01-05T13:45:00+02:00"), Some(date(2023, 1, 5)));
    }

    #[test]
    fn test_parse_date_invalid_is_none() {
        assert_eq!(parse_date("2023-13-40"), None);
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date(""), None);
    }

    fn raw_table() -> Table {
        Table::from_rows(
            vec!["Order Date".to_string(), "Sales".to_string(), "Note".to_string()],
            vec![
                vec![
                    CellValue::from_text("2023-01-05"),
                    CellValue::from_text("$1,234.50"),
                    CellValue::from_text("$5"),
                ],
                vec![
                    CellValue::from_text("2023-13-40"),
                    CellValue::from_text("abc"),
                    CellValue::from_text("x"),
                ],
                vec![CellValue::Empty, CellValue::Empty, CellValue::Empty],
            ],
        )
    }

    fn binding() -> Binding {
        let mut binding = Binding::new();
        binding.bind(Role::Date, "Order Date");
        binding.bind(Role::Sales, "Sales");
        binding
    }

    #[test]
    fn test_clean_types_bound_columns() {
        let cleaned = clean(&raw_table(), &binding()).unwrap();

        assert_eq!(
            cleaned.column("Order Date"),
            vec![
                &CellValue::Date(date(2023, 1, 5)),
                &CellValue::Empty,
                &CellValue::Empty
            ]
        );
        assert_eq!(
            cleaned.column("Sales"),
            vec![
                &CellValue::Number(1234.5),
                &CellValue::Number(0.0),
                &CellValue::Number(0.0)
            ]
        );
        // Unbound columns are left alone
        assert_eq!(cleaned.column("Note"), raw_table().column("Note"));
    }

    #[test]
    fn test_clean_is_idempotent() {
        let once = clean(&raw_table(), &binding()).unwrap();
        let twice = clean(&once, &binding()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_clean_does_not_mutate_input() {
        let raw = raw_table();
        let _ = clean(&raw, &binding()).unwrap();
        assert_eq!(raw, raw_table());
    }

    #[test]
    fn test_clean_without_bindings_is_identity() {
        let raw = raw_table();
        assert_eq!(clean(&raw, &Binding::new()).unwrap(), raw);
    }
}
