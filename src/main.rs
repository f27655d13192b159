use sales_dashboard::config::{DashboardConfig, OutputFormat};
use sales_dashboard::dashboard::Dashboard;
use sales_dashboard::filter::FilterSelection;
use sales_dashboard::present::{render_text, DashboardPayload};
use sales_dashboard::session::{Session, SessionEvent, HELP};

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sales-dashboard")]
#[command(about = "Sales analytics dashboard over a CSV of sales transactions")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the dashboard once for the given filters
    Render {
        /// Sales CSV (or set SALES_DATA_PATH; default: sales_data.csv)
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Regions to include, comma separated (default: all; flag without values selects none)
        #[arg(long = "region", num_args = 0.., value_delimiter = ',')]
        regions: Option<Vec<String>>,

        /// Products to include
        #[arg(long = "product", num_args = 0.., value_delimiter = ',')]
        products: Option<Vec<String>>,

        /// Customer segments to include
        #[arg(long = "segment", num_args = 0.., value_delimiter = ',')]
        segments: Option<Vec<String>>,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Write the filtered CSV into this directory (or set SALES_EXPORT_DIR)
        #[arg(long)]
        export_dir: Option<PathBuf>,
    },
    /// Interactive session: change filters and re-render on every command
    Interactive {
        /// Sales CSV (or set SALES_DATA_PATH; default: sales_data.csv)
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Directory for the `export` command (default: current directory)
        #[arg(long)]
        export_dir: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Logs go to stderr so JSON on stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let result = match args.command {
        Commands::Render {
            data,
            regions,
            products,
            segments,
            format,
            export_dir,
        } => {
            let config = DashboardConfig::resolve(data, export_dir, format);
            run_render(&config, regions, products, segments)
        }
        Commands::Interactive { data, export_dir } => {
            let config = DashboardConfig::resolve(data, export_dir, None);
            run_interactive(&config)
        }
    };

    if let Err(e) = &result {
        error!("{:#}", e);
    }
    result
}

fn run_render(
    config: &DashboardConfig,
    regions: Option<Vec<String>>,
    products: Option<Vec<String>>,
    segments: Option<Vec<String>>,
) -> Result<()> {
    info!("Sales dashboard starting...");
    info!("Data: {}", config.data_path.display());

    let mut dashboard = Dashboard::new(config.data_path.clone());
    let selection = FilterSelection::from_options(dashboard.table()?, regions, products, segments);
    let payload = dashboard.render(&selection)?;

    print_payload(&payload, config)?;

    if let Some(dir) = &config.export_dir {
        let path = payload.download.write_to(dir)?;
        eprintln!("Saved {}", path.display());
    }

    Ok(())
}

fn print_payload(payload: &DashboardPayload, config: &DashboardConfig) -> Result<()> {
    match config.output_format {
        OutputFormat::Text => print!("{}", render_text(payload, config.max_table_rows)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(payload)?),
    }
    Ok(())
}

fn run_interactive(config: &DashboardConfig) -> Result<()> {
    let dashboard = Dashboard::new(config.data_path.clone());
    let mut session = Session::start(dashboard, config.export_dir.clone())?;

    print!("{}", render_text(&session.render()?, config.max_table_rows));
    println!("\n{}", HELP);

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    prompt(&mut stdout)?;

    for line in stdin.lock().lines() {
        let line = line?;
        match session.handle(&line)? {
            SessionEvent::Render(payload) => {
                print!("{}", render_text(&payload, config.max_table_rows))
            }
            SessionEvent::Json(payload) => {
                println!("{}", serde_json::to_string_pretty(&payload)?)
            }
            SessionEvent::Exported(path) => println!("Saved {}", path.display()),
            SessionEvent::Message(message) => {
                if !message.is_empty() {
                    println!("{}", message);
                }
            }
            SessionEvent::Quit => break,
        }
        prompt(&mut stdout)?;
    }

    Ok(())
}

fn prompt(stdout: &mut io::Stdout) -> Result<()> {
    print!("> ");
    stdout.flush()?;
    Ok(())
}
