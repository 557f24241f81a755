use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use salesdw_core::{Config, Report, Severity, WarehouseSchema};
use salesdw_engine::{verify_warehouse, LoadExecutor};
use salesdw_warehouse::Warehouse;

const DEFAULT_CONFIG: &str = "salesdw.toml";

/// salesdw - rebuild the smart sales warehouse from prepared extracts
#[derive(Parser)]
#[command(name = "salesdw")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: salesdw.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory holding the prepared extracts
    #[arg(long, global = true)]
    extract_dir: Option<PathBuf>,

    /// SQLite warehouse file
    #[arg(long, global = true)]
    warehouse: Option<PathBuf>,

    /// Write report.json to this path
    #[arg(short, long, global = true)]
    report: Option<PathBuf>,

    /// Defaults to `load`
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Commands {
    /// Drop, recreate and reload the warehouse
    Load,

    /// Verify an existing warehouse against its definition
    Check,

    /// Write a default config file
    InitConfig {
        /// Where to write the config
        #[arg(default_value = DEFAULT_CONFIG)]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    init_tracing(cli.verbose);

    if let Some(Commands::InitConfig { path, force }) = &cli.command {
        return init_config_command(path, *force);
    }

    let config = load_config(&cli)?;

    if cli.verbose {
        eprintln!("{} {}", "Extracts:".cyan(), config.resolve(&config.extract_dir).display());
        eprintln!("{} {}", "Warehouse:".cyan(), config.warehouse_file().display());
        eprintln!("{} {}", "Reset policy:".cyan(), config.reset_policy);
    }

    match cli.command {
        None | Some(Commands::Load) => load_command(config, cli.report.as_deref()),
        Some(Commands::Check) => check_command(&config, cli.report.as_deref(), cli.verbose),
        Some(Commands::InitConfig { .. }) => Ok(()),
    }
}

/// `RUST_LOG` wins; otherwise `info`, or `debug` with `--verbose`
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Config file, then `SALESDW_*` variables, then command-line flags
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = if let Some(config_path) = &cli.config {
        read_config_file(config_path)?
    } else if Path::new(DEFAULT_CONFIG).exists() {
        read_config_file(Path::new(DEFAULT_CONFIG))?
    } else {
        if cli.verbose {
            eprintln!("{}", "No config file found, using defaults".yellow());
        }
        Config::default()
    };

    config.apply_env_overrides();

    // flags are relative to the working directory, not the config file
    let cwd = std::env::current_dir().context("Failed to read working directory")?;
    if let Some(dir) = &cli.extract_dir {
        config.extract_dir = cwd.join(dir);
    }
    if let Some(path) = &cli.warehouse {
        config.warehouse_path = cwd.join(path);
    }

    Ok(config)
}

fn read_config_file(path: &Path) -> Result<Config> {
    Config::from_file(path).with_context(|| format!("Failed to load config {}", path.display()))
}

/// Load command - full refresh of the warehouse
fn load_command(config: Config, report_path: Option<&Path>) -> Result<()> {
    let executor = LoadExecutor::new(config);

    let report = match executor.run() {
        Ok(report) => report,
        Err(err) => {
            tracing::error!(step = %err.step(), "{}", err);
            eprintln!();
            eprintln!("{} {}", "✗ Load failed during".red().bold(), err.step().as_str().red().bold());
            eprintln!("  {}", err);
            std::process::exit(1);
        }
    };

    if let Some(path) = report_path {
        report
            .save_to_file(path)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
        eprintln!("{} {}", "Report saved to:".green(), path.display());
    }

    print_report_summary(&report, "Warehouse Load Report");
    Ok(())
}

/// Check command - drift and key uniqueness on an existing warehouse
fn check_command(config: &Config, report_path: Option<&Path>, verbose: bool) -> Result<()> {
    let path = config.warehouse_file();
    if verbose {
        eprintln!("{} {}", "Checking warehouse:".cyan(), path.display());
    }

    let warehouse = Warehouse::open_existing(&path)?;
    let report = verify_warehouse(&warehouse, &WarehouseSchema::standard())?;
    warehouse.close()?;

    if let Some(path) = report_path {
        report.save_to_file(path)?;
        if verbose {
            eprintln!("{} {}", "Report saved to:".green(), path.display());
        }
    }

    print_report_summary(&report, "Warehouse Check Report");

    if report.has_errors() {
        std::process::exit(1);
    }

    Ok(())
}

/// Init config command - write the defaults as TOML
fn init_config_command(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    Config::default().save_to_file(path)?;
    println!("{} {}", "Wrote".green(), path.display());
    Ok(())
}

/// Print report summary to stdout
fn print_report_summary(report: &Report, title: &str) {
    println!("\n{}", "=".repeat(60).bright_blue());
    println!("{}", title.bold().bright_blue());
    println!("{}", "=".repeat(60).bright_blue());
    println!();

    println!("Version: {}", report.version);
    println!("Timestamp: {}", report.timestamp);
    println!();

    if !report.tables.is_empty() {
        println!("{}", "Tables:".bold());
        for table in &report.tables {
            print!("  {:<10} {:>8} rows", table.table, table.rows_in_table);
            if table.rows_read > 0 {
                print!("  (read {}, duplicates dropped {})", table.rows_read, table.duplicate_rows);
            }
            println!();
        }
        println!();
    }

    println!("{}", "Summary:".bold());
    println!("  Total diagnostics: {}", report.summary.total);

    if report.summary.errors > 0 {
        println!("  Errors:   {}", format!("{}", report.summary.errors).red().bold());
    } else {
        println!("  Errors:   {}", format!("{}", report.summary.errors).green());
    }

    if report.summary.warnings > 0 {
        println!("  Warnings: {}", format!("{}", report.summary.warnings).yellow());
    } else {
        println!("  Warnings: {}", format!("{}", report.summary.warnings).green());
    }

    println!("  Info:     {}", report.summary.info);
    println!();

    if report.diagnostics.is_empty() {
        println!("{}", "✓ No issues found!".green().bold());
    } else {
        println!("{}", "Diagnostics:".bold());
        for diag in &report.diagnostics {
            let severity_str = match diag.severity {
                Severity::Error => "ERROR".red().bold(),
                Severity::Warn => "WARN".yellow().bold(),
                Severity::Info => "INFO".cyan(),
            };

            println!("  [{}] {}: {}", severity_str, diag.code, diag.message);

            if let Some(loc) = &diag.location {
                print!("    at {}", loc.file);
                if let Some(line) = loc.line {
                    print!(":{}", line);
                }
                println!();
            }

            if let Some(exp) = &diag.expected {
                println!("    Expected: {}", exp);
            }
            if let Some(act) = &diag.actual {
                println!("    Actual:   {}", act);
            }
        }
    }

    println!();
    println!("{}", "=".repeat(60).bright_blue());
}
