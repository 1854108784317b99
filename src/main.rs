//! chatai - terminal chat client
//!
//! Main entry point for the chatai application.

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use chatai::auth::RegisterForm;
use chatai::cli::{Cli, Commands};
use chatai::commands;
use chatai::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    match cli.command {
        Commands::Chat => {
            commands::chat::run_chat(config).await?;
            Ok(())
        }
        Commands::Ask { prompt } => {
            tracing::info!("Sending one-shot prompt");
            commands::ask::run_ask(config, prompt).await?;
            Ok(())
        }
        Commands::Login { username, password } => {
            commands::login::run_login(config, username, password).await?;
            Ok(())
        }
        Commands::Register {
            username,
            email,
            password,
            confirm_password,
        } => {
            let form = RegisterForm {
                username,
                email,
                password,
                confirm_password,
            };
            commands::register::run_register(config, form).await?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so they never interleave with a streamed reply.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "chatai=debug" } else { "chatai=warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
