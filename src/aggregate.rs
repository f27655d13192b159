//! Aggregator - KPIs and grouped revenue totals over a filtered view.
//!
//! Every function here is total: an empty frame yields zeros and empty groups.

use crate::error::Result;
use crate::schema::{
    CUSTOMER_SEGMENT, DISCOUNT_PCT, MONTH, ORDER_ID, PRODUCT, QUANTITY, REGION, REVENUE,
    UNKNOWN_LABEL,
};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Scalar metrics for the KPI row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpis {
    pub total_revenue: f64,
    pub total_orders: usize,
    pub avg_order_value: f64,
    pub total_quantity: i64,
}

/// One group of a grouped aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupTotal {
    pub key: String,
    pub revenue: f64,
}

/// A single point of the discount-vs-revenue projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterPoint {
    pub discount_pct: Option<f64>,
    pub revenue: f64,
    pub product: String,
    pub quantity: Option<i64>,
}

/// Everything the presenter needs from one filtered view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregates {
    pub kpis: Kpis,
    pub revenue_by_region: Vec<GroupTotal>,
    pub revenue_by_product: Vec<GroupTotal>,
    pub revenue_by_month: Vec<GroupTotal>,
    pub revenue_by_segment: Vec<GroupTotal>,
    pub discount_scatter: Vec<ScatterPoint>,
}

impl Aggregates {
    pub fn compute(df: &DataFrame) -> Result<Self> {
        let mut revenue_by_month = revenue_by(df, MONTH)?;
        // "YYYY-MM" sorts chronologically as text.
        revenue_by_month.sort_by(|a, b| a.key.cmp(&b.key));

        Ok(Self {
            kpis: kpis(df)?,
            revenue_by_region: revenue_by(df, REGION)?,
            revenue_by_product: revenue_by(df, PRODUCT)?,
            revenue_by_month,
            revenue_by_segment: revenue_by(df, CUSTOMER_SEGMENT)?,
            discount_scatter: discount_scatter(df)?,
        })
    }
}

pub fn total_revenue(df: &DataFrame) -> Result<f64> {
    Ok(df.column(REVENUE)?.f64()?.into_iter().flatten().sum())
}

/// Distinct non-null order identifiers.
pub fn total_orders(df: &DataFrame) -> Result<usize> {
    let ids: HashSet<&str> = df.column(ORDER_ID)?.str()?.into_iter().flatten().collect();
    Ok(ids.len())
}

pub fn total_quantity(df: &DataFrame) -> Result<i64> {
    Ok(df.column(QUANTITY)?.i64()?.into_iter().flatten().sum())
}

pub fn kpis(df: &DataFrame) -> Result<Kpis> {
    let total_revenue = total_revenue(df)?;
    let total_orders = total_orders(df)?;
    let avg_order_value = if total_orders > 0 {
        total_revenue / total_orders as f64
    } else {
        0.0
    };

    Ok(Kpis {
        total_revenue,
        total_orders,
        avg_order_value,
        total_quantity: total_quantity(df)?,
    })
}

/// Summed revenue per distinct value of `key_column`, in first-seen order.
pub fn revenue_by(df: &DataFrame, key_column: &str) -> Result<Vec<GroupTotal>> {
    if df.height() == 0 {
        return Ok(Vec::new());
    }

    let grouped = df
        .clone()
        .lazy()
        .group_by_stable([col(key_column)])
        .agg([col(REVENUE).sum().alias(REVENUE)])
        .collect()?;

    let keys = grouped.column(key_column)?.str()?;
    let sums = grouped.column(REVENUE)?.f64()?;

    Ok(keys
        .into_iter()
        .zip(sums.into_iter())
        .map(|(key, revenue)| GroupTotal {
            key: key.unwrap_or(UNKNOWN_LABEL).to_string(),
            revenue: revenue.unwrap_or(0.0),
        })
        .collect())
}

/// Row-level (discount, revenue, product, quantity) projection, unaggregated.
pub fn discount_scatter(df: &DataFrame) -> Result<Vec<ScatterPoint>> {
    let discounts = df.column(DISCOUNT_PCT)?.f64()?;
    let revenues = df.column(REVENUE)?.f64()?;
    let products = df.column(PRODUCT)?.str()?;
    let quantities = df.column(QUANTITY)?.i64()?;

    Ok(discounts
        .into_iter()
        .zip(revenues.into_iter())
        .zip(products.into_iter())
        .zip(quantities.into_iter())
        .map(|(((discount_pct, revenue), product), quantity)| ScatterPoint {
            discount_pct,
            revenue: revenue.unwrap_or(0.0),
            product: product.unwrap_or(UNKNOWN_LABEL).to_string(),
            quantity,
        })
        .collect())
}
