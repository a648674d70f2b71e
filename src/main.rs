use clap::{Args, Parser, Subcommand};
use royalbit_salesboard::cli;
use royalbit_salesboard::error::SalesboardResult;
use royalbit_salesboard::report::OutputFormat;
use royalbit_salesboard::types::FilterSelection;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "salesboard")]
#[command(about = "Sales dashboard for CSV and spreadsheet exports")]
#[command(long_about = "Salesboard - Sales dashboard from any sales export

Finds the date, sales, profit, product, region, state, city, retailer and
quantity columns by fuzzy header matching, cleans them, applies your filters
and reports KPIs and grouped totals.

COMMANDS:
  report   - Render the dashboard (text, JSON or YAML)
  columns  - Show detected columns and filter choices
  export   - Write the filtered rows (.csv or .xlsx)

EXAMPLES:
  salesboard report sales.csv
  salesboard report sales.xlsx --region East --region West --start 2023-01-01
  salesboard report sales.csv --format json > dashboard.json
  salesboard export sales.csv --state CA -o Filtered_Data.csv")]
#[command(version)]
struct Cli {
    /// Show debug logging and pipeline steps
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Category and date filters shared by report and export
#[derive(Args, Debug, Default)]
struct FilterArgs {
    /// Regions to keep (repeat the flag for several)
    #[arg(long = "region")]
    regions: Vec<String>,

    /// States to keep (repeat the flag for several)
    #[arg(long = "state")]
    states: Vec<String>,

    /// Cities to keep (repeat the flag for several)
    #[arg(long = "city")]
    cities: Vec<String>,

    /// First day to include (YYYY-MM-DD, default: earliest date)
    #[arg(long)]
    start: Option<String>,

    /// Last day to include (YYYY-MM-DD, default: latest date)
    #[arg(long)]
    end: Option<String>,
}

impl FilterArgs {
    fn into_selection(self) -> SalesboardResult<FilterSelection> {
        cli::build_selection(self.regions, self.states, self.cities, self.start, self.end)
    }
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Render the sales dashboard for a file.

Shows the KPIs (total sales, total profit, units sold, orders) and every
chart whose columns were found: sales by retailer, sales over time, region
and city breakdown, sales and units by state, retailer and product shares,
followed by a preview of the filtered rows.

Use --format json or --format yaml to feed a charting front-end.")]
    /// Render the dashboard
    Report {
        /// Sales file (.csv, .txt, .xlsx, .xls, .ods)
        file: PathBuf,

        #[command(flatten)]
        filters: FilterArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Number of filtered rows to preview (text format)
        #[arg(short, long, default_value = "10")]
        rows: usize,
    },

    /// Show detected columns, match scores and filter choices
    Columns {
        /// Sales file (.csv, .txt, .xlsx, .xls, .ods)
        file: PathBuf,
    },

    #[command(long_about = "Write the filtered rows to a file.

The output format follows the extension: .xlsx writes a workbook, anything
else writes comma-separated UTF-8 text. Defaults to Filtered_Data.csv.")]
    /// Export the filtered rows
    Export {
        /// Sales file (.csv, .txt, .xlsx, .xls, .ods)
        file: PathBuf,

        /// Output file (.csv or .xlsx)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        filters: FilterArgs,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "royalbit_salesboard=debug"
    } else {
        "royalbit_salesboard=warn"
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .init();
}

fn main() -> SalesboardResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Report {
            file,
            filters,
            format,
            rows,
        } => cli::report(file, filters.into_selection()?, format, rows, cli.verbose),

        Commands::Columns { file } => cli::columns(file),

        Commands::Export {
            file,
            output,
            filters,
        } => cli::export(
            file,
            &cli::export_path(output),
            filters.into_selection()?,
            cli.verbose,
        ),
    }
}
