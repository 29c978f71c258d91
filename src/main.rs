use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use convenios::cli::{
    handle_agreement_command, handle_amendment_command, handle_company_command,
    handle_contract_command, handle_export_command, handle_payment_command,
    handle_report_command, AgreementCommands, AmendmentCommands, CompanyCommands,
    ContractCommands, ExportCommands, PaymentCommands, ReportCommands,
};
use convenios::config::{paths::ConvenioPaths, settings::Settings};
use convenios::storage::Storage;
use convenios::web::{self, AppState};

#[derive(Parser)]
#[command(
    name = "convenios",
    version,
    about = "Grant agreement (convênio) management backend",
    long_about = "Tracks government grant agreements with their contracts, amendments \
                  and payments. Serves a JSON API with dashboard and report data, \
                  renders PDF reports and manages everything from the command line."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Listen host (overrides config and HOST)
        #[arg(long)]
        host: Option<String>,
        /// Listen port (overrides config and PORT)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Create the data directory and default settings
    Init,

    /// Show current configuration and paths
    Config,

    /// Agreement management commands
    #[command(subcommand, alias = "convenio")]
    Agreement(AgreementCommands),

    /// Company management commands
    #[command(subcommand, alias = "empresa")]
    Company(CompanyCommands),

    /// Contract management commands
    #[command(subcommand, alias = "contrato")]
    Contract(ContractCommands),

    /// Contract amendment commands
    #[command(subcommand, alias = "aditivo")]
    Amendment(AmendmentCommands),

    /// Contract payment commands
    #[command(subcommand, alias = "pagamento")]
    Payment(PaymentCommands),

    /// Dashboard and reports
    #[command(subcommand)]
    Report(ReportCommands),

    /// Export data
    #[command(subcommand)]
    Export(ExportCommands),

    /// Show recent changes from the audit log
    History {
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "convenios=info,tower_http=info".into()),
        )
        .init();
}

fn main() -> Result<()> {
    // Load .env file (optional - won't fail if missing)
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    let paths = ConvenioPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;
    let storage = Storage::open(paths.clone())?;

    match cli.command {
        Some(Commands::Serve { host, port }) => {
            let mut server = settings.server.clone().with_env_overrides()?;
            if let Some(host) = host {
                server.host = host;
            }
            if let Some(port) = port {
                server.port = port;
            }

            let address = server.address();
            let state = AppState::new(storage, settings);
            tokio::runtime::Runtime::new()?.block_on(web::serve(state, &address))?;
        }
        Some(Commands::Init) => {
            println!("Initializing convenios at: {}", paths.base_dir().display());
            settings.save(&paths)?;
            storage.save_all()?;
            println!("Initialization complete!");
            println!();
            println!("Run 'convenios agreement create --help' to register an agreement.");
            println!("Run 'convenios serve' to start the HTTP API.");
        }
        Some(Commands::Config) => {
            println!("Convenios Configuration");
            println!("=======================");
            println!("Base directory:  {}", paths.base_dir().display());
            println!("Data directory:  {}", paths.data_dir().display());
            println!("Settings file:   {}", paths.settings_file().display());
            println!("Audit log:       {}", paths.audit_log().display());
            println!("Initialized:     {}", if storage.is_initialized() { "yes" } else { "no" });
            println!();
            println!("Settings:");
            println!("  Currency symbol: {}", settings.currency_symbol);
            println!("  Date format:     {}", settings.date_format);
            println!("  Server address:  {}", settings.server.address());
            println!("  Report limit:    {}", settings.reports.list_limit);
        }
        Some(Commands::Agreement(cmd)) => handle_agreement_command(&storage, &settings, cmd)?,
        Some(Commands::Company(cmd)) => handle_company_command(&storage, cmd)?,
        Some(Commands::Contract(cmd)) => handle_contract_command(&storage, &settings, cmd)?,
        Some(Commands::Amendment(cmd)) => handle_amendment_command(&storage, &settings, cmd)?,
        Some(Commands::Payment(cmd)) => handle_payment_command(&storage, &settings, cmd)?,
        Some(Commands::Report(cmd)) => handle_report_command(&storage, &settings, cmd)?,
        Some(Commands::Export(cmd)) => handle_export_command(&storage, cmd)?,
        Some(Commands::History { limit }) => {
            let entries = storage.audit().read_recent(limit)?;
            if entries.is_empty() {
                println!("No history yet.");
            }
            for entry in entries.iter().rev() {
                println!("{}", entry.format_human_readable());
            }
        }
        None => {
            println!("convenios - grant agreement management");
            println!();
            println!("Run 'convenios --help' for usage information.");
            println!("Run 'convenios serve' to start the HTTP API.");
        }
    }

    Ok(())
}
