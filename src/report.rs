//! Dashboard rendering: terminal text, JSON and YAML

use crate::core::aggregator::{GroupTotal, ShareSlice};
use crate::core::{Dashboard, DateRange};
use crate::error::SalesboardResult;
use crate::types::{Role, Table};
use clap::ValueEnum;
use colored::Colorize;

/// Width of the longest bar in a chart
const BAR_WIDTH: usize = 30;

/// Widest cell shown in the data preview
const MAX_CELL_WIDTH: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

/// Insert `,` every three digits of a non-negative integer string
fn group_digits(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `$1,234` style, rounded to whole units. Negatives render as `-$1,234`.
pub fn format_currency(value: f64) -> String {
    let rounded = value.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{}${}", sign, group_digits(&format!("{:.0}", rounded.abs())))
}

/// Thousands-grouped quantity; fractional quantities keep up to two decimals
pub fn format_count(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let abs = value.abs();
    if abs.fract() == 0.0 {
        return format!("{}{}", sign, group_digits(&format!("{:.0}", abs)));
    }

    let fixed = format!("{:.2}", abs);
    let (whole, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        format!("{}{}", sign, group_digits(whole))
    } else {
        format!("{}{}.{}", sign, group_digits(whole), frac)
    }
}

fn format_percent(share: f64) -> String {
    format!("{:.1}%", share * 100.0)
}

fn bar(value: f64, max: f64) -> String {
    if max <= 0.0 || value <= 0.0 {
        return String::new();
    }
    let len = ((value / max) * BAR_WIDTH as f64).round() as usize;
    "█".repeat(len.clamp(1, BAR_WIDTH))
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
        cut.push('…');
        cut
    }
}

/// Pad to `width` display columns (format width counts chars, not colored escapes)
fn pad(text: &str, width: usize) -> String {
    format!("{:<width$}", text, width = width)
}

fn key_width<'a>(keys: impl Iterator<Item = &'a str>) -> usize {
    keys.map(|k| k.chars().count()).max().unwrap_or(0).min(MAX_CELL_WIDTH)
}

fn heading(lines: &mut Vec<String>, title: &str) {
    lines.push(String::new());
    lines.push(format!("{}", title.bold().cyan()));
}

fn push_bars(lines: &mut Vec<String>, groups: &[GroupTotal]) {
    if groups.is_empty() {
        lines.push(format!("   {}", "(no data)".dimmed()));
        return;
    }
    let max = groups.iter().map(|g| g.value).fold(0.0, f64::max);
    let width = key_width(groups.iter().map(|g| g.key.as_str()));
    for g in groups {
        lines.push(format!(
            "   {}  {:<bar_width$}  {}",
            pad(&truncate(&g.key, width), width).bright_blue(),
            bar(g.value, max).green(),
            format_currency(g.value).bold(),
            bar_width = BAR_WIDTH
        ));
    }
}

fn push_shares(lines: &mut Vec<String>, slices: &[ShareSlice]) {
    if slices.is_empty() {
        lines.push(format!("   {}", "(no data)".dimmed()));
        return;
    }
    let width = key_width(slices.iter().map(|s| s.key.as_str()));
    for s in slices {
        lines.push(format!(
            "   {}  {:>6}  {}",
            pad(&truncate(&s.key, width), width).bright_blue(),
            format_percent(s.share).bold(),
            format_currency(s.value)
        ));
    }
}

fn push_kpis(lines: &mut Vec<String>, dashboard: &Dashboard) {
    let kpis = &dashboard.aggregates.kpis;
    let money = |v: f64| {
        let text = format_currency(v);
        if v < 0.0 {
            text.red().bold()
        } else {
            text.green().bold()
        }
    };

    heading(lines, "💰 Key Metrics");
    lines.push(format!("   Total Sales:   {}", money(kpis.total_sales)));
    lines.push(format!("   Total Profit:  {}", money(kpis.total_profit)));
    lines.push(format!(
        "   Units Sold:    {}",
        format_count(kpis.total_units).bold()
    ));
    lines.push(format!(
        "   Total Orders:  {}",
        format_count(kpis.total_orders as f64).bold()
    ));
}

fn push_table(lines: &mut Vec<String>, table: &Table, limit: usize) {
    if table.is_empty() {
        lines.push(format!("   {}", "(no rows)".dimmed()));
        return;
    }

    let shown: Vec<Vec<String>> = table
        .rows()
        .iter()
        .take(limit)
        .map(|row| {
            row.iter()
                .map(|cell| truncate(&cell.to_string(), MAX_CELL_WIDTH))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = table
        .headers()
        .iter()
        .enumerate()
        .map(|(i, h)| {
            shown
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(truncate(h, MAX_CELL_WIDTH).chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let header_line: Vec<String> = table
        .headers()
        .iter()
        .zip(&widths)
        .map(|(h, w)| format!("{}", pad(&truncate(h, MAX_CELL_WIDTH), *w).bold()))
        .collect();
    lines.push(format!("   {}", header_line.join("  ")));
    lines.push(format!(
        "   {}",
        "─".repeat(widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1))
    ));

    for row in &shown {
        let cells: Vec<String> = row.iter().zip(&widths).map(|(c, w)| pad(c, *w)).collect();
        lines.push(format!("   {}", cells.join("  ")));
    }

    if table.row_count() > limit {
        lines.push(format!(
            "   {}",
            format!("… {} more rows", table.row_count() - limit).dimmed()
        ));
    }
}

fn describe_range(range: Option<DateRange>) -> String {
    match range {
        Some(r) => format!("{} → {}", r.start, r.end),
        None => "-".to_string(),
    }
}

/// Render the dashboard for a terminal, previewing at most `rows` filtered rows
pub fn render_text(dashboard: &Dashboard, rows: usize) -> String {
    let mut lines = Vec::new();
    let aggregates = &dashboard.aggregates;

    lines.push(format!("{}", "📊 Sales Dashboard".bold().green()));
    lines.push(format!(
        "   Rows: {} of {}",
        dashboard.filtered.row_count().to_string().bold(),
        dashboard.total_rows
    ));
    if dashboard.binding.is_bound(Role::Date) {
        lines.push(format!("   Dates: {}", describe_range(dashboard.date_range)));
    }

    push_kpis(&mut lines, dashboard);

    if let Some(groups) = &aggregates.sales_by_retailer {
        heading(&mut lines, "🏪 Total Sales by Retailer");
        push_bars(&mut lines, groups);
    }

    if let Some(months) = &aggregates.sales_by_month {
        heading(&mut lines, "📈 Total Sales Over Time");
        push_bars(&mut lines, months);
    }

    if let Some(tree) = &aggregates.sales_by_region_city {
        heading(&mut lines, "🗺️  Total Sales by Region and City");
        if tree.is_empty() {
            lines.push(format!("   {}", "(no data)".dimmed()));
        }
        for node in tree {
            lines.push(format!(
                "   {}  {}",
                node.region.bright_blue().bold(),
                format_currency(node.sales).bold()
            ));
            let max = node.cities.iter().map(|c| c.value).fold(0.0, f64::max);
            let width = key_width(node.cities.iter().map(|c| c.key.as_str()));
            for city in &node.cities {
                lines.push(format!(
                    "     {}  {:<bar_width$}  {}",
                    pad(&truncate(&city.key, width), width),
                    bar(city.value, max).green(),
                    format_currency(city.value),
                    bar_width = BAR_WIDTH
                ));
            }
        }
    }

    if let Some(states) = &aggregates.sales_and_units_by_state {
        heading(&mut lines, "📍 Total Sales and Units Sold by State");
        if states.is_empty() {
            lines.push(format!("   {}", "(no data)".dimmed()));
        }
        let width = key_width(states.iter().map(|s| s.state.as_str()));
        for s in states {
            lines.push(format!(
                "   {}  {:>14}  {:>10} units",
                pad(&truncate(&s.state, width), width).bright_blue(),
                format_currency(s.sales).bold(),
                format_count(s.units)
            ));
        }
    }

    if let Some(slices) = &aggregates.retailer_share {
        heading(&mut lines, "🥧 Retailer wise Sales");
        push_shares(&mut lines, slices);
    }

    if let Some(slices) = &aggregates.product_share {
        heading(&mut lines, "🥧 Product wise Sales");
        push_shares(&mut lines, slices);
    }

    if rows > 0 {
        heading(
            &mut lines,
            &format!(
                "📋 Filtered Data (first {} of {})",
                rows.min(dashboard.filtered.row_count()),
                dashboard.filtered.row_count()
            ),
        );
        push_table(&mut lines, &dashboard.filtered, rows);
    }

    lines.join("\n")
}

/// Render detected columns and the filter choices
pub fn render_columns(dashboard: &Dashboard) -> String {
    let mut lines = vec![format!("{}", "🔎 Detected Columns".bold().green())];

    for m in &dashboard.columns {
        let header = m.best_header.as_deref().unwrap_or("-");
        let status = if m.bound {
            "✅".to_string()
        } else {
            format!("{}", "unbound".yellow())
        };
        lines.push(format!(
            "   {:<10} {:<24} {:>5.1}  {}",
            m.role.label().bright_blue(),
            truncate(header, MAX_CELL_WIDTH),
            m.score,
            status
        ));
    }

    heading(&mut lines, "🎛️  Filter Choices");
    for role in Role::DIMENSIONS {
        let values = match dashboard.choices.for_role(role) {
            Some(values) => values.join(", "),
            None => format!("{}", "(column not found)".dimmed()),
        };
        lines.push(format!("   {:<8} {}", role.label().bright_blue(), values));
    }
    if dashboard.binding.is_bound(Role::Date) {
        lines.push(format!(
            "   {:<8} {}",
            "Dates".bright_blue(),
            describe_range(dashboard.date_range)
        ));
    }

    lines.join("\n")
}

/// Render the dashboard in the requested format
pub fn render(dashboard: &Dashboard, format: OutputFormat, rows: usize) -> SalesboardResult<String> {
    match format {
        OutputFormat::Text => Ok(render_text(dashboard, rows)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(dashboard)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(dashboard)?),
    }
}
