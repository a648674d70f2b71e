use crate::core::pipeline;
use crate::error::{SalesboardError, SalesboardResult};
use crate::report::{self, OutputFormat};
use crate::types::FilterSelection;
use crate::writer;
use chrono::NaiveDate;
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Parse a `YYYY-MM-DD` flag value
fn parse_date_flag(flag: &str, value: Option<&str>) -> SalesboardResult<Option<NaiveDate>> {
    value
        .map(|raw| {
            NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
                SalesboardError::Validation(format!(
                    "Invalid --{} date '{}' (expected YYYY-MM-DD)",
                    flag, raw
                ))
            })
        })
        .transpose()
}

/// Trim values and drop blank ones; values are never split
fn clean_values(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

/// Build a filter selection from command-line values
pub fn build_selection(
    regions: Vec<String>,
    states: Vec<String>,
    cities: Vec<String>,
    start: Option<String>,
    end: Option<String>,
) -> SalesboardResult<FilterSelection> {
    Ok(FilterSelection {
        regions: clean_values(regions),
        states: clean_values(states),
        cities: clean_values(cities),
        start: parse_date_flag("start", start.as_deref())?,
        end: parse_date_flag("end", end.as_deref())?,
    })
}

fn describe_selection(selection: &FilterSelection) {
    let show = |label: &str, values: &[String]| {
        if !values.is_empty() {
            println!("   {}: {}", label, values.join(", ").bright_yellow());
        }
    };
    show("Region", &selection.regions);
    show("State", &selection.states);
    show("City", &selection.cities);
    if let Some(start) = selection.start {
        println!("   Start: {}", start.to_string().bright_yellow());
    }
    if let Some(end) = selection.end {
        println!("   End: {}", end.to_string().bright_yellow());
    }
}

/// Execute the report command
pub fn report(
    file: PathBuf,
    selection: FilterSelection,
    format: OutputFormat,
    rows: usize,
    verbose: bool,
) -> SalesboardResult<()> {
    if verbose && format == OutputFormat::Text {
        println!("{}", "📖 Loading sales file...".cyan());
        println!("   File: {}", file.display());
        describe_selection(&selection);
        println!();
    }

    let dashboard = pipeline::run_path(&file, &selection)?;
    println!("{}", report::render(&dashboard, format, rows)?);

    Ok(())
}

/// Execute the columns command
pub fn columns(file: PathBuf) -> SalesboardResult<()> {
    let dashboard = pipeline::run_path(&file, &FilterSelection::default())?;
    println!("   File: {}\n", file.display());
    println!("{}", report::render_columns(&dashboard));
    Ok(())
}

/// Output path for the export command
pub fn export_path(output: Option<PathBuf>) -> PathBuf {
    output.unwrap_or_else(|| PathBuf::from(writer::FILTERED_DATA_FILENAME))
}

/// Execute the export command
pub fn export(
    file: PathBuf,
    output: &Path,
    selection: FilterSelection,
    verbose: bool,
) -> SalesboardResult<()> {
    println!("{}", "💾 Salesboard - Export Filtered Data".bold().green());
    println!("   Input:  {}", file.display());
    println!("   Output: {}", output.display());
    if verbose {
        describe_selection(&selection);
    }
    println!();

    let dashboard = pipeline::run_path(&file, &selection)?;
    writer::export_table(&dashboard.filtered, output)?;

    println!("{}", "✅ Export Complete!".bold().green());
    println!(
        "   {} of {} rows written\n",
        dashboard.filtered.row_count().to_string().bold(),
        dashboard.total_rows
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const CSV: &str = "Order Date,Sales,Region\n\
2023-01-05,100,East\n\
2023-02-10,50,West\n";

    #[test]
    fn test_build_selection() {
        let selection = build_selection(
            vec!["East".to_string(), " ".to_string()],
            vec![],
            vec![" Boston ".to_string()],
            Some("2023-01-01".to_string()),
            None,
        )
        .unwrap();

        assert_eq!(selection.regions, ["East"]);
        assert_eq!(selection.cities, ["Boston"]);
        assert_eq!(selection.start, NaiveDate::from_ymd_opt(2023, 1, 1));
        assert_eq!(selection.end, None);
    }

    #[test]
    fn test_build_selection_bad_date() {
        let err = build_selection(vec![], vec![], vec![], None, Some("01/02/2023".to_string()))
            .unwrap_err();
        assert!(matches!(err, SalesboardError::Validation(ref m) if m.contains("--end")));
    }

    #[test]
    fn test_export_path_default() {
        assert_eq!(export_path(None), PathBuf::from("Filtered_Data.csv"));
        assert_eq!(
            export_path(Some(PathBuf::from("out.xlsx"))),
            PathBuf::from("out.xlsx")
        );
    }

    #[test]
    fn test_export_writes_filtered_rows() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("sales.csv");
        let output = dir.path().join("filtered.csv");
        fs::write(&input, CSV).unwrap();

        let selection = FilterSelection {
            regions: vec!["West".to_string()],
            ..Default::default()
        };
        export(input, &output, selection, false).unwrap();

        let written = fs::read_to_string(&output).unwrap();
        assert_eq!(written, "Order Date,Sales,Region\n2023-02-10,50,West\n");
    }

    #[test]
    fn test_report_missing_file_fails() {
        let result = report(
            PathBuf::from("/nonexistent/sales.csv"),
            FilterSelection::default(),
            OutputFormat::Json,
            0,
            false,
        );
        assert!(matches!(result, Err(SalesboardError::Io(_))));
    }
}
