//! Filter Engine - AND across dimensions, OR within a dimension.

use crate::error::{DashboardError, Result};
use crate::loader::SalesTable;
use crate::schema::{CUSTOMER_SEGMENT, PRODUCT, REGION};
use polars::prelude::*;
use std::collections::HashSet;

/// The three multi-select filters.
///
/// Not `Default`: an empty set selects nothing, while the dashboard's default
/// is every observed value. Use [`FilterSelection::all`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSelection {
    pub regions: HashSet<String>,
    pub products: HashSet<String>,
    pub segments: HashSet<String>,
}

impl FilterSelection {
    /// Every value observed in the loaded table.
    pub fn all(table: &SalesTable) -> Self {
        Self {
            regions: table.regions().iter().cloned().collect(),
            products: table.products().iter().cloned().collect(),
            segments: table.segments().iter().cloned().collect(),
        }
    }

    /// `None` for a dimension means "all observed values".
    pub fn from_options(
        table: &SalesTable,
        regions: Option<Vec<String>>,
        products: Option<Vec<String>>,
        segments: Option<Vec<String>>,
    ) -> Self {
        let all = Self::all(table);
        Self {
            regions: regions.map(|v| v.into_iter().collect()).unwrap_or(all.regions),
            products: products.map(|v| v.into_iter().collect()).unwrap_or(all.products),
            segments: segments.map(|v| v.into_iter().collect()).unwrap_or(all.segments),
        }
    }

    pub fn with_regions<I, S>(mut self, regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.regions = regions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_products<I, S>(mut self, products: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.products = products.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_segments<I, S>(mut self, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.segments = segments.into_iter().map(Into::into).collect();
        self
    }

    /// Apply this selection to a loaded table.
    pub fn apply(&self, table: &SalesTable) -> Result<DataFrame> {
        filter(
            table.data_frame(),
            &self.regions,
            &self.products,
            &self.segments,
        )
    }
}

/// Rows whose region, product and segment are all members of their selection set.
///
/// The input frame is never modified; an empty set yields an empty frame.
pub fn filter(
    df: &DataFrame,
    regions: &HashSet<String>,
    products: &HashSet<String>,
    segments: &HashSet<String>,
) -> Result<DataFrame> {
    let region_mask = membership_mask(df, REGION, regions)?;
    let product_mask = membership_mask(df, PRODUCT, products)?;
    let segment_mask = membership_mask(df, CUSTOMER_SEGMENT, segments)?;

    let mask = &(&region_mask & &product_mask) & &segment_mask;
    Ok(df.filter(&mask)?)
}

fn membership_mask(df: &DataFrame, column: &str, allowed: &HashSet<String>) -> Result<BooleanChunked> {
    let values = df
        .column(column)
        .map_err(|_| DashboardError::DataFormat(format!("Missing filter column '{}'", column)))?
        .str()?;

    Ok(values
        .into_iter()
        .map(|value| Some(value.is_some_and(|v| allowed.contains(v))))
        .collect())
}
