//! Line-driven interactive session.
//!
//! Each command updates the selection and re-renders through the
//! [`Dashboard`] entry point, so every interaction reruns the full pipeline
//! against the memoized table.

use crate::dashboard::Dashboard;
use crate::error::Result;
use crate::filter::FilterSelection;
use crate::present::DashboardPayload;
use std::path::PathBuf;
use tracing::debug;

pub const HELP: &str = "\
Commands:
  region A,B      select regions (no values selects none, * selects all)
  product A,B     select products
  segment A,B     select customer segments
  reset           select everything again
  show            render the dashboard as text
  json            render the dashboard as JSON
  export          write the filtered data as CSV
  reload          drop the cached table and re-read the source
  help            show this help
  quit            leave the session";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dimension {
    Region,
    Product,
    Segment,
}

#[derive(Debug)]
pub enum SessionEvent {
    /// Render the payload as text.
    Render(Box<DashboardPayload>),
    /// Render the payload as JSON.
    Json(Box<DashboardPayload>),
    Exported(PathBuf),
    Message(String),
    Quit,
}

pub struct Session {
    dashboard: Dashboard,
    selection: FilterSelection,
    export_dir: PathBuf,
}

impl Session {
    pub fn start(mut dashboard: Dashboard, export_dir: Option<PathBuf>) -> Result<Self> {
        let selection = dashboard.default_selection()?;
        Ok(Self {
            dashboard,
            selection,
            export_dir: export_dir.unwrap_or_else(|| PathBuf::from(".")),
        })
    }

    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    pub fn render(&mut self) -> Result<DashboardPayload> {
        self.dashboard.render(&self.selection)
    }

    pub fn handle(&mut self, line: &str) -> Result<SessionEvent> {
        let line = line.trim();
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };
        debug!("Session command: {:?} {:?}", command, rest);

        match command.to_lowercase().as_str() {
            "" => Ok(SessionEvent::Message(String::new())),
            "region" | "regions" => self.select(Dimension::Region, rest),
            "product" | "products" => self.select(Dimension::Product, rest),
            "segment" | "segments" => self.select(Dimension::Segment, rest),
            "reset" => {
                self.selection = self.dashboard.default_selection()?;
                Ok(SessionEvent::Render(Box::new(self.render()?)))
            }
            "show" => Ok(SessionEvent::Render(Box::new(self.render()?))),
            "json" => Ok(SessionEvent::Json(Box::new(self.render()?))),
            "export" => {
                let payload = self.render()?;
                Ok(SessionEvent::Exported(payload.download.write_to(&self.export_dir)?))
            }
            "reload" => {
                self.dashboard.invalidate();
                self.selection = self.dashboard.default_selection()?;
                Ok(SessionEvent::Render(Box::new(self.render()?)))
            }
            "help" | "?" => Ok(SessionEvent::Message(HELP.to_string())),
            "quit" | "exit" => Ok(SessionEvent::Quit),
            other => Ok(SessionEvent::Message(format!(
                "Unknown command '{}'. Type 'help' for a list.",
                other
            ))),
        }
    }

    fn select(&mut self, dimension: Dimension, values: &str) -> Result<SessionEvent> {
        let table = self.dashboard.table()?;
        let chosen: Vec<String> = if values == "*" {
            match dimension {
                Dimension::Region => table.regions().to_vec(),
                Dimension::Product => table.products().to_vec(),
                Dimension::Segment => table.segments().to_vec(),
            }
        } else {
            parse_values(values)
        };

        let selection = self.selection.clone();
        self.selection = match dimension {
            Dimension::Region => selection.with_regions(chosen),
            Dimension::Product => selection.with_products(chosen),
            Dimension::Segment => selection.with_segments(chosen),
        };

        Ok(SessionEvent::Render(Box::new(self.render()?)))
    }
}

fn parse_values(values: &str) -> Vec<String> {
    values
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}
