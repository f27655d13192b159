//! Dashboard entry point.
//!
//! The host calls [`Dashboard::render`] with the current filter selections on
//! every interaction. The whole pipeline reruns each time; only the load is
//! memoized, in the cache this struct owns.

use crate::aggregate::Aggregates;
use crate::cache::LoadCache;
use crate::error::Result;
use crate::filter::FilterSelection;
use crate::loader::SalesTable;
use crate::present::{self, DashboardPayload};
use chrono::{Local, NaiveDate};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug)]
pub struct Dashboard {
    source: PathBuf,
    cache: LoadCache,
}

impl Dashboard {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            cache: LoadCache::new(),
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn cache(&self) -> &LoadCache {
        &self.cache
    }

    /// The loaded table, reading the source only on first use.
    pub fn table(&mut self) -> Result<&SalesTable> {
        self.cache.get_or_load(&self.source)
    }

    /// Every observed region, product and segment selected.
    pub fn default_selection(&mut self) -> Result<FilterSelection> {
        Ok(FilterSelection::all(self.table()?))
    }

    /// Run load -> filter -> aggregate -> present, dating the export today.
    pub fn render(&mut self, selection: &FilterSelection) -> Result<DashboardPayload> {
        self.render_on(selection, Local::now().date_naive())
    }

    pub fn render_on(
        &mut self,
        selection: &FilterSelection,
        export_date: NaiveDate,
    ) -> Result<DashboardPayload> {
        let table = self.cache.get_or_load(&self.source)?;

        let filtered = selection.apply(table)?;
        let aggregates = Aggregates::compute(&filtered)?;
        info!(
            "Rendering {} of {} rows (revenue {:.2}, {} orders)",
            filtered.height(),
            table.height(),
            aggregates.kpis.total_revenue,
            aggregates.kpis.total_orders
        );

        present::present(table, selection, &filtered, &aggregates, export_date)
    }

    /// Forget the cached table so the next render re-reads the source.
    pub fn invalidate(&mut self) -> bool {
        self.cache.invalidate(&self.source)
    }
}
