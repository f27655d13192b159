//! Presenter - turns aggregates into a declarative render payload.
//!
//! Charts are emitted as specs for an external renderer; nothing here draws.
//! Empty inputs produce charts with no points rather than errors.

use crate::aggregate::{Aggregates, GroupTotal, ScatterPoint};
use crate::error::{DashboardError, Result};
use crate::filter::FilterSelection;
use crate::format::{format_value, ValueFormat};
use crate::loader::SalesTable;
use crate::schema::{CUSTOMER_SEGMENT, DISCOUNT_PCT, MONTH, PRODUCT, QUANTITY, REGION, REVENUE};
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const TITLE: &str = "Sales Analytics Dashboard";
pub const SUBTITLE: &str = "Interactive dashboard for analyzing sales performance";
pub const FOOTER: &str = "Built with Rust | Sales Analytics Dashboard";
pub const TABLE_HEIGHT: u32 = 300;
pub const EXPORT_LABEL: &str = "Download Filtered Data as CSV";
pub const EXPORT_MIME: &str = "text/csv";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDisplay {
    pub label: String,
    pub value: String,
    pub raw: f64,
    pub format: ValueFormat,
}

impl MetricDisplay {
    fn new(label: &str, raw: f64, format: ValueFormat) -> Self {
        Self {
            label: label.to_string(),
            value: format_value(raw, &format),
            raw,
            format,
        }
    }
}

/// A sidebar multi-select: every option observed at load, and the current picks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterControl {
    pub label: String,
    pub options: Vec<String>,
    pub selected: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryPoint {
    pub category: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieSlice {
    pub name: String,
    pub value: f64,
    /// Fraction of the summed slice values; 0 when the sum is 0.
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartSpec {
    Bar {
        title: String,
        x: String,
        y: String,
        points: Vec<CategoryPoint>,
    },
    Pie {
        title: String,
        names: String,
        values: String,
        slices: Vec<PieSlice>,
    },
    Line {
        title: String,
        x: String,
        y: String,
        markers: bool,
        points: Vec<CategoryPoint>,
    },
    Scatter {
        title: String,
        x: String,
        y: String,
        color: String,
        size: String,
        points: Vec<ScatterPoint>,
    },
}

impl ChartSpec {
    pub fn title(&self) -> &str {
        match self {
            ChartSpec::Bar { title, .. }
            | ChartSpec::Pie { title, .. }
            | ChartSpec::Line { title, .. }
            | ChartSpec::Scatter { title, .. } => title,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ChartSpec::Bar { points, .. } | ChartSpec::Line { points, .. } => points.is_empty(),
            ChartSpec::Pie { slices, .. } => slices.is_empty(),
            ChartSpec::Scatter { points, .. } => points.is_empty(),
        }
    }
}

/// The filtered table as text cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableView {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub height: u32,
}

/// A user-triggered download of the filtered table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsvExport {
    pub label: String,
    pub file_name: String,
    pub mime: String,
    pub data: String,
}

impl CsvExport {
    pub fn build(df: &DataFrame, export_date: NaiveDate) -> Result<Self> {
        let mut buffer: Vec<u8> = Vec::new();
        CsvWriter::new(&mut buffer)
            .include_header(true)
            .with_separator(b',')
            .finish(&mut df.clone())?;

        let data = String::from_utf8(buffer)
            .map_err(|e| DashboardError::DataFormat(format!("Export is not valid UTF-8: {}", e)))?;

        Ok(Self {
            label: EXPORT_LABEL.to_string(),
            file_name: export_file_name(export_date),
            mime: EXPORT_MIME.to_string(),
            data,
        })
    }

    /// Persist the export into `dir`. Only called when the user asks for it.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(&self.file_name);
        fs::write(&path, self.data.as_bytes())?;
        info!("Exported filtered data to {}", path.display());
        Ok(path)
    }
}

pub fn export_file_name(date: NaiveDate) -> String {
    format!("filtered_sales_{}.csv", date.format("%Y%m%d"))
}

/// Everything a host needs to draw one frame of the dashboard, in layout order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardPayload {
    pub title: String,
    pub subtitle: String,
    pub filters: Vec<FilterControl>,
    pub metrics: Vec<MetricDisplay>,
    /// Rows of side-by-side charts.
    pub chart_rows: Vec<Vec<ChartSpec>>,
    pub table: TableView,
    pub download: CsvExport,
    pub footer: String,
}

impl DashboardPayload {
    pub fn charts(&self) -> impl Iterator<Item = &ChartSpec> {
        self.chart_rows.iter().flatten()
    }
}

pub fn present(
    table: &SalesTable,
    selection: &FilterSelection,
    filtered: &DataFrame,
    aggregates: &Aggregates,
    export_date: NaiveDate,
) -> Result<DashboardPayload> {
    Ok(DashboardPayload {
        title: TITLE.to_string(),
        subtitle: SUBTITLE.to_string(),
        filters: filter_controls(table, selection),
        metrics: metrics(aggregates),
        chart_rows: charts(aggregates),
        table: table_view(filtered)?,
        download: CsvExport::build(filtered, export_date)?,
        footer: FOOTER.to_string(),
    })
}

fn filter_controls(table: &SalesTable, selection: &FilterSelection) -> Vec<FilterControl> {
    let control = |label: &str, options: &[String], chosen: &std::collections::HashSet<String>| {
        FilterControl {
            label: label.to_string(),
            options: options.to_vec(),
            selected: options.iter().filter(|o| chosen.contains(*o)).cloned().collect(),
        }
    };

    vec![
        control("Regions", table.regions(), &selection.regions),
        control("Products", table.products(), &selection.products),
        control("Customer Segments", table.segments(), &selection.segments),
    ]
}

pub fn metrics(aggregates: &Aggregates) -> Vec<MetricDisplay> {
    let k = &aggregates.kpis;
    vec![
        MetricDisplay::new("Total Revenue", k.total_revenue, ValueFormat::rupees()),
        MetricDisplay::new("Total Orders", k.total_orders as f64, ValueFormat::Integer),
        MetricDisplay::new("Avg Order Value", k.avg_order_value, ValueFormat::rupees()),
        MetricDisplay::new("Quantity Sold", k.total_quantity as f64, ValueFormat::Integer),
    ]
}

pub fn charts(aggregates: &Aggregates) -> Vec<Vec<ChartSpec>> {
    vec![
        vec![
            ChartSpec::Bar {
                title: "Revenue by Region".to_string(),
                x: REGION.to_string(),
                y: REVENUE.to_string(),
                points: category_points(&aggregates.revenue_by_region),
            },
            ChartSpec::Pie {
                title: "Revenue by Product".to_string(),
                names: PRODUCT.to_string(),
                values: REVENUE.to_string(),
                slices: pie_slices(&aggregates.revenue_by_product),
            },
        ],
        vec![
            ChartSpec::Line {
                title: "Monthly Sales Trend".to_string(),
                x: MONTH.to_string(),
                y: REVENUE.to_string(),
                markers: true,
                points: category_points(&aggregates.revenue_by_month),
            },
            ChartSpec::Bar {
                title: "Revenue by Customer Segment".to_string(),
                x: CUSTOMER_SEGMENT.to_string(),
                y: REVENUE.to_string(),
                points: category_points(&aggregates.revenue_by_segment),
            },
        ],
        vec![ChartSpec::Scatter {
            title: "Discount % vs Revenue".to_string(),
            x: DISCOUNT_PCT.to_string(),
            y: REVENUE.to_string(),
            color: PRODUCT.to_string(),
            size: QUANTITY.to_string(),
            points: aggregates.discount_scatter.clone(),
        }],
    ]
}

fn category_points(groups: &[GroupTotal]) -> Vec<CategoryPoint> {
    groups
        .iter()
        .map(|g| CategoryPoint {
            category: g.key.clone(),
            value: g.revenue,
        })
        .collect()
}

fn pie_slices(groups: &[GroupTotal]) -> Vec<PieSlice> {
    let total: f64 = groups.iter().map(|g| g.revenue).sum();
    groups
        .iter()
        .map(|g| PieSlice {
            name: g.key.clone(),
            value: g.revenue,
            share: if total != 0.0 { g.revenue / total } else { 0.0 },
        })
        .collect()
}

pub fn table_view(df: &DataFrame) -> Result<TableView> {
    let columns: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    let text_columns = df
        .get_columns()
        .iter()
        .map(|s| s.cast(&DataType::String))
        .collect::<PolarsResult<Vec<Series>>>()?;

    let mut rows = vec![Vec::with_capacity(columns.len()); df.height()];
    for series in &text_columns {
        for (row, cell) in rows.iter_mut().zip(series.str()?.into_iter()) {
            row.push(cell.unwrap_or("").to_string());
        }
    }

    Ok(TableView {
        columns,
        rows,
        height: TABLE_HEIGHT,
    })
}

/// Plain-text rendering of a payload for terminal hosts.
pub fn render_text(payload: &DashboardPayload, max_table_rows: usize) -> String {
    let mut out = String::new();

    out.push_str(&format!("{}\n{}\n\n", payload.title, payload.subtitle));

    out.push_str("Filters\n");
    for control in &payload.filters {
        out.push_str(&format!(
            "  {} ({}/{}): {}\n",
            control.label,
            control.selected.len(),
            control.options.len(),
            control.selected.join(", ")
        ));
    }

    out.push_str("\nKey Performance Indicators\n");
    for metric in &payload.metrics {
        out.push_str(&format!("  {:<16} {}\n", metric.label, metric.value));
    }

    out.push_str("\nAnalytics Charts\n");
    for chart in payload.charts() {
        out.push_str(&render_chart_text(chart));
    }

    out.push_str(&format!("\nSales Data ({} rows)\n", payload.table.rows.len()));
    out.push_str(&format!("  {}\n", payload.table.columns.join(" | ")));
    for row in payload.table.rows.iter().take(max_table_rows) {
        out.push_str(&format!("  {}\n", row.join(" | ")));
    }
    if payload.table.rows.len() > max_table_rows {
        out.push_str(&format!(
            "  ... {} more rows\n",
            payload.table.rows.len() - max_table_rows
        ));
    }

    out.push_str(&format!(
        "\n[{}] {}\n---\n{}\n",
        payload.download.label, payload.download.file_name, payload.footer
    ));

    out
}

const BAR_WIDTH: f64 = 30.0;

fn render_chart_text(chart: &ChartSpec) -> String {
    let mut out = format!("\n  {}\n", chart.title());
    if chart.is_empty() {
        out.push_str("    (no data)\n");
        return out;
    }

    match chart {
        ChartSpec::Bar { points, .. } | ChartSpec::Line { points, .. } => {
            let max = points.iter().map(|p| p.value.abs()).fold(0.0, f64::max);
            for p in points {
                let len = if max > 0.0 {
                    (p.value.abs() / max * BAR_WIDTH).round() as usize
                } else {
                    0
                };
                out.push_str(&format!(
                    "    {:<14} {:<30} {}\n",
                    p.category,
                    "#".repeat(len),
                    format_value(p.value, &ValueFormat::rupees())
                ));
            }
        }
        ChartSpec::Pie { slices, .. } => {
            for s in slices {
                out.push_str(&format!(
                    "    {:<14} {:>6.1}%  {}\n",
                    s.name,
                    s.share * 100.0,
                    format_value(s.value, &ValueFormat::rupees())
                ));
            }
        }
        ChartSpec::Scatter { points, .. } => {
            out.push_str(&format!("    {} points\n", points.len()));
        }
    }

    out
}
