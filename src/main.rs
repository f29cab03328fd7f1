use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, Instrument};

use safetyos::cli::{commands, Cli, Commands};
use safetyos::{
    create_command_span, generate_correlation_id, init_telemetry, AppContext, ConsoleNotifier, Notifier, SafetyOsConfig,
};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Could not load configuration: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_telemetry(&config.observability) {
        eprintln!("⚠️  Logging disabled: {e}");
    }

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("❌ Could not start the async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli.command, config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Services already told the user what went wrong
            debug!(error = %e, "command failed");
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> Result<SafetyOsConfig> {
    SafetyOsConfig::load_env_file()?;
    let mut config = match &cli.config {
        Some(path) => SafetyOsConfig::load_from(std::slice::from_ref(path))?,
        None => SafetyOsConfig::load()?,
    };
    if cli.json_logs {
        config.observability.json_logs = true;
    }
    Ok(config)
}

async fn run(command: Commands, config: SafetyOsConfig) -> Result<()> {
    let notifier = Arc::new(ConsoleNotifier);
    let mut ctx = AppContext::init(config, notifier.clone()).inspect_err(|e| {
        notifier.error(&format!("Could not start: {e}"));
    })?;

    let correlation_id = generate_correlation_id();
    let user_id = ctx.current_user().map(|u| u.id.clone());
    let span = create_command_span(command.name(), user_id.as_deref(), &correlation_id);

    dispatch(command, &mut ctx).instrument(span).await
}

async fn dispatch(command: Commands, ctx: &mut AppContext) -> Result<()> {
    match command {
        Commands::Login { username, password } => commands::account::login(ctx, &username, &password).await,
        Commands::Logout => commands::account::logout(ctx),
        Commands::Whoami => commands::account::whoami(ctx),
        Commands::Users => commands::account::users(ctx).await,
        Commands::Dashboard => commands::account::dashboard(ctx).await,
        Commands::Permit(cmd) => cmd.execute(ctx).await,
        Commands::Confined(cmd) => cmd.execute(ctx).await,
        Commands::Bbs(cmd) => cmd.execute(ctx).await,
        Commands::Cert(cmd) => cmd.execute(ctx).await,
        Commands::Incident(cmd) => cmd.execute(ctx).await,
        Commands::Equipment(cmd) => cmd.execute(ctx).await,
        Commands::Course(cmd) => cmd.execute(ctx).await,
    }
}
