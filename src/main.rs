use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;

use cashflow::cli::{
    handle_dues_command, handle_report_command, handle_service_command, handle_years_command,
    DuesArgs, ReportArgs, ServiceCommands,
};
use cashflow::config::{paths::CashflowPaths, settings::Settings};
use cashflow::events::ChangeBus;
use cashflow::logging::init_tracing;
use cashflow::reports::CashFlowReport;
use cashflow::storage::Storage;

#[derive(Parser)]
#[command(
    name = "cashflow",
    version,
    about = "Track receivable and payable service legs by month or ISO week",
    long_about = "cashflow records services with up to three dated cash flows \
                  (gross sales price receivable, commission receivable and cost \
                  of sales payable) and reports inflows, outflows and net cash \
                  per month or ISO week of a chosen year."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Service record commands
    #[command(subcommand, alias = "svc")]
    Service(ServiceCommands),

    /// Per-period cash flow report for one year
    Report(ReportArgs),

    /// List the years that have dated cash flows
    Years,

    /// List receivables and payables not yet cleared
    Dues(DuesArgs),

    /// Initialize the data directory and settings
    Init,

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = CashflowPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;
    init_tracing(&settings.log_level);

    let mut storage = Storage::new(paths.clone())?;
    storage.load()?;
    let storage = Arc::new(storage);

    let bus = ChangeBus::new();
    bus.subscribe(|event| tracing::debug!(id = %event.service_id(), ?event, "records changed"));
    CashFlowReport::refresh_on_change(
        &bus,
        Arc::clone(&storage),
        None,
        settings.default_granularity,
        |report| match report {
            Ok(report) => tracing::debug!(
                year = report.year,
                net = %report.totals.net,
                "cash flow report refreshed"
            ),
            Err(e) => tracing::warn!(error = %e, "cash flow report refresh failed"),
        },
    );

    match cli.command {
        Some(Commands::Service(cmd)) => {
            handle_service_command(&storage, &settings, &bus, cmd)?;
        }
        Some(Commands::Report(args)) => {
            handle_report_command(&storage, &settings, args)?;
        }
        Some(Commands::Years) => {
            handle_years_command(&storage)?;
        }
        Some(Commands::Dues(args)) => {
            handle_dues_command(&storage, &settings, args)?;
        }
        Some(Commands::Init) => {
            println!("Initializing cashflow-cli at: {}", paths.base_dir().display());
            paths.ensure_directories()?;
            storage.save()?;
            settings.save(&paths)?;
            println!("Initialization complete!");
            println!();
            println!("Run 'cashflow service add --help' to record your first service.");
        }
        Some(Commands::Config) => {
            println!("cashflow-cli Configuration");
            println!("==========================");
            println!("Base directory:  {}", paths.base_dir().display());
            println!("Settings file:   {}", paths.settings_file().display());
            println!("Services file:   {}", paths.services_file().display());
            println!(
                "Initialized:     {}",
                if paths.is_initialized() { "Yes" } else { "No" }
            );
            println!();
            println!("Settings:");
            println!("  Default scale: {}", settings.default_granularity);
            println!("  Log level:     {}", settings.log_level);
            println!("  Date format:   {}", settings.date_format);
        }
        None => {
            println!("cashflow - receivable and payable cash flow by period");
            println!();
            println!("Run 'cashflow --help' for usage information.");
        }
    }

    Ok(())
}
