use anyhow::{Context, Result};
use clap::Parser;
use todo_cli::config::Config;
use todo_cli::session::Session;
use todo_cli::setup::{ensure_database_directory, open_store};
use todo_cli::telemetry::{init_telemetry, log_startup_info, report_error};
use tokio::io::BufReader;
use tracing::{debug, info};

/// Command-line task tracker
///
/// Help and version are part of the command grammar (`-h`, `-v`), so clap's
/// own flags are disabled.
#[derive(Parser)]
#[command(name = "todo")]
#[command(disable_help_flag = true, disable_version_flag = true)]
struct Cli {
    /// Configuration file path
    #[arg(long, env = "TODO_CONFIG")]
    config_file: Option<String>,

    /// Database URL override
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Log level override
    #[arg(long, env = "LOG_LEVEL")]
    log_level: Option<String>,

    /// Run the initial command and exit without starting the REPL
    #[arg(long)]
    once: bool,

    /// Initial command, e.g. `--list pending`
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config_file {
        Some(config_file) => Config::from_file(config_file)
            .with_context(|| format!("Failed to load configuration file {config_file}"))?,
        None => Config::from_env()?,
    };

    // Apply CLI overrides
    if let Some(ref database_url) = cli.database_url {
        config.database.url = Some(database_url.clone());
    }

    if let Some(ref log_level) = cli.log_level {
        config.logging.level = log_level.clone();
    }

    Ok(config)
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli).context("Failed to load configuration")?;

    init_telemetry(&config.logging).context("Failed to initialize telemetry")?;

    if let Err(e) = config.validate() {
        report_error(&e, "configuration");
        return Err(e.context("Invalid configuration"));
    }

    let target = config
        .store_target()
        .context("Cannot determine which store to use")?;
    log_startup_info(&config, &target);

    ensure_database_directory(&target).context("Failed to create database directory")?;

    let store = open_store(&target, &config.database, config.store_options()).await;

    let mut session = Session::new(store, BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .with_prompt(config.session.prompt.clone());
    session
        .start(&cli.command, cli.once)
        .await
        .context("Terminal I/O failed")?;

    info!("Session ended");
    Ok(())
}

fn main() -> Result<()> {
    // Load .env file
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let result = runtime.block_on(run(cli));

    // The stdin reader may still be parked in a blocking read after Ctrl-C
    debug!("Shutting down runtime");
    runtime.shutdown_background();

    result
}
