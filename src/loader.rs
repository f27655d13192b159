//! Loader - reads the sales CSV into a normalized, typed table.
//!
//! Every column is read as text first so a stray value in a numeric column
//! can never abort the scan; typing happens afterwards with non-strict casts.
//! `Revenue_INR` is coerced (unparseable or non-finite -> 0), `OrderDate` is
//! parsed against a list of common layouts, and the `Month` bucket is derived
//! once here, never per filter pass.

use crate::error::{DashboardError, Result};
use crate::schema::{
    CUSTOMER_SEGMENT, DIMENSION_COLUMNS, DISCOUNT_PCT, MONTH, ORDER_DATE, PRODUCT, QUANTITY,
    REGION, REQUIRED_COLUMNS, REVENUE, UNKNOWN_LABEL,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use itertools::Itertools;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// The loaded transaction table plus the dimension values observed at load time.
#[derive(Debug, Clone)]
pub struct SalesTable {
    path: PathBuf,
    df: DataFrame,
    regions: Vec<String>,
    products: Vec<String>,
    segments: Vec<String>,
}

impl SalesTable {
    /// Wrap an already-normalized frame (used by the loader and by tests).
    pub fn from_frame(path: PathBuf, df: DataFrame) -> Result<Self> {
        let regions = distinct_values(&df, REGION)?;
        let products = distinct_values(&df, PRODUCT)?;
        let segments = distinct_values(&df, CUSTOMER_SEGMENT)?;

        Ok(Self {
            path,
            df,
            regions,
            products,
            segments,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn data_frame(&self) -> &DataFrame {
        &self.df
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    /// Distinct regions in first-seen order.
    pub fn regions(&self) -> &[String] {
        &self.regions
    }

    /// Distinct products in first-seen order.
    pub fn products(&self) -> &[String] {
        &self.products
    }

    /// Distinct customer segments in first-seen order.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

/// Load and normalize the sales file at `path`.
pub fn load(path: impl AsRef<Path>) -> Result<SalesTable> {
    let path = path.as_ref();

    if !path.is_file() {
        return Err(DashboardError::DataSource(format!(
            "Sales file not found: {}",
            path.display()
        )));
    }

    let raw = read_raw(path)?;
    let raw = strip_column_names(raw)?;
    check_required_columns(&raw)?;

    let df = normalize(raw)?;

    let table = SalesTable::from_frame(path.to_path_buf(), df)?;
    info!(
        "Loaded {} rows from {} ({} regions, {} products, {} segments)",
        table.height(),
        path.display(),
        table.regions().len(),
        table.products().len(),
        table.segments().len()
    );

    Ok(table)
}

fn read_raw(path: &Path) -> Result<DataFrame> {
    // Schema inference over zero rows reads every column as String.
    LazyCsvReader::new(path)
        .with_infer_schema_length(Some(0))
        .finish()
        .map_err(|e| {
            DashboardError::DataSource(format!("Failed to scan CSV {}: {}", path.display(), e))
        })?
        .collect()
        .map_err(|e| {
            DashboardError::DataSource(format!("Failed to read CSV {}: {}", path.display(), e))
        })
}

/// Strip surrounding whitespace from every header.
fn strip_column_names(mut df: DataFrame) -> Result<DataFrame> {
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    for name in &names {
        let trimmed = name.trim();
        if trimmed != name {
            debug!("Renaming column '{}' -> '{}'", name, trimmed);
            df.rename(name, trimmed).map_err(|e| {
                DashboardError::DataFormat(format!("Cannot normalize column '{}': {}", name, e))
            })?;
        }
    }

    Ok(df)
}

fn check_required_columns(df: &DataFrame) -> Result<()> {
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|name| df.column(name).is_err())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(DashboardError::DataFormat(format!(
            "Missing required column(s): {}",
            missing.join(", ")
        )))
    }
}

fn normalize(mut raw: DataFrame) -> Result<DataFrame> {
    let order_dates = canonical_order_dates(&raw)?;
    raw.with_column(order_dates)?;

    let revenue = col(REVENUE).cast(DataType::Float64);
    let mut typed = vec![
        col(ORDER_DATE)
            .str()
            .to_date(StrptimeOptions {
                format: Some(CANONICAL_DATE_FORMAT.to_string()),
                ..Default::default()
            })
            .alias(ORDER_DATE),
        // Whole units; a fractional quantity truncates instead of vanishing.
        col(QUANTITY)
            .cast(DataType::Float64)
            .cast(DataType::Int64)
            .alias(QUANTITY),
        col(DISCOUNT_PCT).cast(DataType::Float64).alias(DISCOUNT_PCT),
        // Null, NaN and +/-inf all count as unparseable.
        when(revenue.clone().is_finite())
            .then(revenue)
            .otherwise(lit(0.0))
            .alias(REVENUE),
    ];
    typed.extend(
        DIMENSION_COLUMNS
            .iter()
            .map(|name| col(name).fill_null(lit(UNKNOWN_LABEL)).alias(name)),
    );

    let df = raw
        .lazy()
        .with_columns(typed)
        .with_column(
            col(ORDER_DATE)
                .dt()
                .to_string("%Y-%m")
                .fill_null(lit(UNKNOWN_LABEL))
                .alias(MONTH),
        )
        .collect()
        .map_err(|e| {
            DashboardError::DataFormat(format!("Failed to normalize sales table: {}", e))
        })?;

    Ok(df)
}

const CANONICAL_DATE_FORMAT: &str = "%Y-%m-%d";

const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
];

// Slashed dates are month-first.
const DATE_FORMATS: [&str; 6] = [
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%d-%m-%Y",
    "%d %b %Y",
    "%b %d, %Y",
];

/// Parse one `OrderDate` cell, dropping any time-of-day part.
pub fn parse_order_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        })
}

/// Rewrite `OrderDate` as `YYYY-MM-DD` text; unparseable cells become null.
///
/// Fails only when the column holds values and none of them parse.
fn canonical_order_dates(df: &DataFrame) -> Result<Series> {
    let raw = df.column(ORDER_DATE)?.str()?;
    let present = raw.len() - raw.null_count();

    let mut unparsed = 0usize;
    let canonical: StringChunked = raw
        .into_iter()
        .map(|value| {
            let value = value?;
            let parsed = parse_order_date(value);
            if parsed.is_none() {
                unparsed += 1;
            }
            parsed.map(|date| date.format(CANONICAL_DATE_FORMAT).to_string())
        })
        .collect();

    if present > 0 && unparsed == present {
        return Err(DashboardError::DataFormat(format!(
            "Column '{}' has no parseable dates",
            ORDER_DATE
        )));
    }
    if unparsed > 0 {
        warn!(
            "{} of {} '{}' values could not be parsed and were left empty",
            unparsed, present, ORDER_DATE
        );
    }

    let mut series = canonical.into_series();
    series.rename(ORDER_DATE);
    Ok(series)
}

/// Distinct non-null values of a text column, in first-seen order.
pub(crate) fn distinct_values(df: &DataFrame, column: &str) -> Result<Vec<String>> {
    Ok(df
        .column(column)?
        .str()?
        .into_iter()
        .flatten()
        .unique()
        .map(str::to_string)
        .collect())
}
