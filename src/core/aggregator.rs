//! KPI and grouped aggregates over a filtered, cleaned table
//!
//! Each grouped aggregate needs a fixed set of roles. If any of them is
//! unbound the aggregate is `None`; callers render whatever is present.

use crate::types::{Binding, CellValue, Role, Table};
use chrono::Datelike;
use serde::Serialize;
use std::collections::BTreeMap;

/// Headline metrics
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Kpis {
    pub total_sales: f64,
    pub total_profit: f64,
    pub total_units: f64,
    pub total_orders: usize,
}

/// One category and its summed value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupTotal {
    pub key: String,
    pub value: f64,
}

/// Region with its per-city breakdown (two-level treemap)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionNode {
    pub region: String,
    pub sales: f64,
    pub cities: Vec<GroupTotal>,
}

/// Parallel sales and units sums for one state (dual-axis chart)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateTotal {
    pub state: String,
    pub sales: f64,
    pub units: f64,
}

/// Pie slice: value and its fraction of the total
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareSlice {
    pub key: String,
    pub value: f64,
    pub share: f64,
}

/// Everything the presentation layer draws
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Aggregates {
    pub kpis: Kpis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sales_by_retailer: Option<Vec<GroupTotal>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sales_by_month: Option<Vec<GroupTotal>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sales_by_region_city: Option<Vec<RegionNode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sales_and_units_by_state: Option<Vec<StateTotal>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retailer_share: Option<Vec<ShareSlice>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_share: Option<Vec<ShareSlice>>,
}

fn number(cell: &CellValue) -> f64 {
    cell.as_number().unwrap_or(0.0)
}

/// Group key for a cell; empty cells belong to no group
fn key(cell: &CellValue) -> Option<String> {
    if cell.is_empty() {
        None
    } else {
        Some(cell.to_string())
    }
}

/// Sum of a numeric column (0 when the column is unknown or the table is empty)
pub fn column_sum(table: &Table, column: &str) -> f64 {
    table.column(column).into_iter().map(number).sum()
}

fn role_sum(table: &Table, binding: &Binding, role: Role) -> f64 {
    binding.get(role).map_or(0.0, |column| column_sum(table, column))
}

pub fn kpis(table: &Table, binding: &Binding) -> Kpis {
    Kpis {
        total_sales: role_sum(table, binding, Role::Sales),
        total_profit: role_sum(table, binding, Role::Profit),
        total_units: role_sum(table, binding, Role::Quantity),
        total_orders: table.row_count(),
    }
}

/// Sum `value_column` per distinct `key_column` value, ordered by key
pub fn group_totals(table: &Table, key_column: &str, value_column: &str) -> Vec<GroupTotal> {
    let (Some(k), Some(v)) = (table.column_index(key_column), table.column_index(value_column))
    else {
        return Vec::new();
    };

    let mut groups: BTreeMap<String, f64> = BTreeMap::new();
    for row in table.rows() {
        if let Some(group) = key(&row[k]) {
            *groups.entry(group).or_insert(0.0) += number(&row[v]);
        }
    }

    groups
        .into_iter()
        .map(|(key, value)| GroupTotal { key, value })
        .collect()
}

/// Monthly sums keyed `YYYY-MM`, in chronological order. Rows without a date are skipped.
pub fn monthly_totals(table: &Table, date_column: &str, value_column: &str) -> Vec<GroupTotal> {
    let (Some(d), Some(v)) = (table.column_index(date_column), table.column_index(value_column))
    else {
        return Vec::new();
    };

    let mut months: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    for row in table.rows() {
        if let Some(date) = row[d].as_date() {
            *months.entry((date.year(), date.month())).or_insert(0.0) += number(&row[v]);
        }
    }

    months
        .into_iter()
        .map(|((year, month), value)| GroupTotal {
            key: format!("{:04}-{:02}", year, month),
            value,
        })
        .collect()
}

/// Two-level region → city sums
pub fn region_city_totals(
    table: &Table,
    region_column: &str,
    city_column: &str,
    sales_column: &str,
) -> Vec<RegionNode> {
    let (Some(r), Some(c), Some(s)) = (
        table.column_index(region_column),
        table.column_index(city_column),
        table.column_index(sales_column),
    ) else {
        return Vec::new();
    };

    let mut tree: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
    for row in table.rows() {
        if let (Some(region), Some(city)) = (key(&row[r]), key(&row[c])) {
            *tree.entry(region).or_default().entry(city).or_insert(0.0) += number(&row[s]);
        }
    }

    tree.into_iter()
        .map(|(region, cities)| {
            let cities: Vec<GroupTotal> = cities
                .into_iter()
                .map(|(key, value)| GroupTotal { key, value })
                .collect();
            RegionNode {
                region,
                sales: cities.iter().map(|c| c.value).sum(),
                cities,
            }
        })
        .collect()
}

/// Per-state sales and units
pub fn state_totals(
    table: &Table,
    state_column: &str,
    sales_column: &str,
    units_column: &str,
) -> Vec<StateTotal> {
    let (Some(st), Some(s), Some(u)) = (
        table.column_index(state_column),
        table.column_index(sales_column),
        table.column_index(units_column),
    ) else {
        return Vec::new();
    };

    let mut states: BTreeMap<String, (f64, f64)> = BTreeMap::new();
    for row in table.rows() {
        if let Some(state) = key(&row[st]) {
            let entry = states.entry(state).or_insert((0.0, 0.0));
            entry.0 += number(&row[s]);
            entry.1 += number(&row[u]);
        }
    }

    states
        .into_iter()
        .map(|(state, (sales, units))| StateTotal {
            state,
            sales,
            units,
        })
        .collect()
}

/// Turn group totals into pie slices
pub fn shares(groups: Vec<GroupTotal>) -> Vec<ShareSlice> {
    let total: f64 = groups.iter().map(|g| g.value).sum();
    groups
        .into_iter()
        .map(|g| ShareSlice {
            share: if total != 0.0 { g.value / total } else { 0.0 },
            key: g.key,
            value: g.value,
        })
        .collect()
}

/// Compute KPIs and every aggregate whose roles are bound
pub fn aggregate(table: &Table, binding: &Binding) -> Aggregates {
    let sales = binding.get(Role::Sales);
    let date = binding.get(Role::Date);
    let retailer = binding.get(Role::Retailer);
    let region = binding.get(Role::Region);
    let city = binding.get(Role::City);
    let state = binding.get(Role::State);
    let quantity = binding.get(Role::Quantity);
    let product = binding.get(Role::Product);

    let retailer_totals = retailer
        .zip(sales)
        .map(|(retailer, sales)| group_totals(table, retailer, sales));

    Aggregates {
        kpis: kpis(table, binding),
        sales_by_month: date
            .zip(sales)
            .map(|(date, sales)| monthly_totals(table, date, sales)),
        sales_by_region_city: region
            .zip(city)
            .zip(sales)
            .map(|((region, city), sales)| region_city_totals(table, region, city, sales)),
        sales_and_units_by_state: state
            .zip(sales)
            .zip(quantity)
            .map(|((state, sales), units)| state_totals(table, state, sales, units)),
        retailer_share: retailer_totals.clone().map(shares),
        sales_by_retailer: retailer_totals,
        product_share: product
            .zip(sales)
            .map(|(product, sales)| shares(group_totals(table, product, sales))),
    }
}
