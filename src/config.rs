//! Runtime configuration: CLI flags, then environment, then defaults.

use std::path::PathBuf;

pub const DEFAULT_DATA_PATH: &str = "sales_data.csv";
pub const DATA_PATH_ENV: &str = "SALES_DATA_PATH";
pub const EXPORT_DIR_ENV: &str = "SALES_EXPORT_DIR";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    /// Where exports are written when the user asks for one.
    pub export_dir: Option<PathBuf>,
    pub output_format: OutputFormat,
    /// Rows shown by the text renderer; JSON output always carries every row.
    pub max_table_rows: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            export_dir: None,
            output_format: OutputFormat::Text,
            max_table_rows: 20,
        }
    }
}

impl DashboardConfig {
    /// Resolve against the process environment.
    pub fn resolve(
        data_path: Option<PathBuf>,
        export_dir: Option<PathBuf>,
        output_format: Option<OutputFormat>,
    ) -> Self {
        Self::resolve_with(data_path, export_dir, output_format, |key| {
            std::env::var(key).ok()
        })
    }

    /// Resolve with an explicit environment lookup.
    pub fn resolve_with<F>(
        data_path: Option<PathBuf>,
        export_dir: Option<PathBuf>,
        output_format: Option<OutputFormat>,
        env: F,
    ) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            data_path: data_path
                .or_else(|| env(DATA_PATH_ENV).map(PathBuf::from))
                .unwrap_or(defaults.data_path),
            export_dir: export_dir.or_else(|| env(EXPORT_DIR_ENV).map(PathBuf::from)),
            output_format: output_format.unwrap_or(defaults.output_format),
            max_table_rows: defaults.max_table_rows,
        }
    }
}
