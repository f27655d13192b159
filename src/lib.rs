pub mod aggregate;
pub mod cache;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod format;
pub mod loader;
pub mod present;
pub mod schema;
pub mod session;

pub use aggregate::{Aggregates, GroupTotal, Kpis, ScatterPoint};
pub use cache::LoadCache;
pub use dashboard::Dashboard;
pub use error::{DashboardError, Result};
pub use filter::{filter, FilterSelection};
pub use loader::{load, SalesTable};
pub use present::{ChartSpec, CsvExport, DashboardPayload};
