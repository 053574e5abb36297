use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use std::path::{Path, PathBuf};
use stockcraft_core::{Session, Status, StockConfig};
use tracing::debug;

mod formatter;
mod logger;
mod prompt;

#[derive(Parser)]
#[command(name = "stockcraft")]
#[command(about = "Inventory excess and shortage calculator", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to configuration file (TOML)
    #[arg(short, long, global = true, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the cleaned inventory and data warnings
    Inspect {
        /// Path to the inventory file (xlsx, xls, ods or csv)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,
    },

    /// Write a targets template listing every inventory item
    Template {
        /// Path to the inventory file (xlsx, xls, ods or csv)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Template file to write (.csv or .xlsx)
        #[arg(short, long, value_name = "OUTPUT")]
        output: PathBuf,

        /// Existing targets to pre-fill the template with
        #[arg(short, long, value_name = "TARGETS")]
        targets: Option<PathBuf>,
    },

    /// Compare current stock against targets
    Calculate {
        /// Path to the inventory file (xlsx, xls, ods or csv)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Targets file (.csv, .xlsx or .toml)
        #[arg(short, long, value_name = "TARGETS")]
        targets: Option<PathBuf>,

        /// Enter targets item by item
        #[arg(short, long)]
        interactive: bool,

        /// Export results (.xlsx with summary sheet, or .csv)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Show only items with this status
        #[arg(long, value_enum)]
        status: Option<StatusFilter>,

        /// Number of items in the top excess and shortage lists
        #[arg(long, value_name = "N")]
        top: Option<usize>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,
    },

    /// Print the required input format with sample data
    Format,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON output for scripting
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusFilter {
    Excess,
    Shortage,
    Balanced,
}

impl From<StatusFilter> for Status {
    fn from(filter: StatusFilter) -> Self {
        match filter {
            StatusFilter::Excess => Status::Excess,
            StatusFilter::Shortage => Status::Shortage,
            StatusFilter::Balanced => Status::Balanced,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init_cli_logger(cli.verbose);

    let config = load_config(cli.config.as_deref())?;
    config.validate().context("Invalid configuration")?;

    match cli.command {
        Command::Inspect { file, format } => {
            let session = open_session(&file, config)?;
            match format {
                OutputFormat::Human => formatter::print_inventory(&session),
                OutputFormat::Json => formatter::print_inventory_json(&session)?,
            }
        }
        Command::Template {
            file,
            output,
            targets,
        } => {
            let mut session = open_session(&file, config)?;
            if let Some(targets_path) = &targets {
                let warnings = load_targets(&mut session, targets_path)?;
                formatter::print_warnings("Target warnings", &warnings);
            }
            session
                .write_template(&output)
                .with_context(|| format!("Failed to write template: {}", output.display()))?;
            println!(
                "{} Wrote targets template for {} items",
                "✓".green().bold(),
                session.items().len()
            );
            println!("Output: {}", output.display());
        }
        Command::Calculate {
            file,
            targets,
            interactive,
            output,
            status,
            top,
            format,
        } => {
            if targets.is_none() && !interactive {
                anyhow::bail!("No targets given. Use --targets <FILE> or --interactive.");
            }
            let top_n = top.unwrap_or(config.top_n);
            let mut session = open_session(&file, config)?;

            let mut target_warnings = Vec::new();
            if let Some(targets_path) = &targets {
                target_warnings = load_targets(&mut session, targets_path)?;
            }
            if interactive {
                prompt::enter_targets(&mut session)?;
            }

            let report = session.calculate().context("Calculation failed")?;

            if let Some(output_path) = &output {
                session
                    .export(&report, output_path)
                    .with_context(|| format!("Failed to export results: {}", output_path.display()))?;
            }

            let status = status.map(Status::from);
            match format {
                OutputFormat::Human => {
                    formatter::print_warnings("Data warnings", session.warnings());
                    formatter::print_warnings("Target warnings", &target_warnings);
                    formatter::print_report(&report, status, top_n);
                    if let Some(output_path) = &output {
                        println!();
                        println!("{} Exported results", "✓".green().bold());
                        println!("Output: {}", output_path.display());
                    }
                }
                OutputFormat::Json => {
                    formatter::print_report_json(&file, &report, status, top_n)?;
                }
            }
        }
        Command::Format => formatter::print_format(&config.columns),
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<StockConfig> {
    if let Some(config_path) = path {
        return StockConfig::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()));
    }

    // Try to load default config from current directory if it exists
    let default_config_path = PathBuf::from("stockcraft.toml");
    if default_config_path.exists() {
        debug!("Using {}", default_config_path.display());
        StockConfig::from_file(&default_config_path).with_context(|| {
            format!(
                "Failed to load config from {}",
                default_config_path.display()
            )
        })
    } else {
        Ok(StockConfig::default())
    }
}

fn open_session(file: &Path, config: StockConfig) -> Result<Session> {
    Session::open(file, config)
        .with_context(|| format!("Failed to read inventory file: {}", file.display()))
}

fn load_targets(session: &mut Session, path: &Path) -> Result<Vec<stockcraft_core::Warning>> {
    session
        .load_targets(path)
        .with_context(|| format!("Failed to load targets from {}", path.display()))
}
