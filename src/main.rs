use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vision_capture::app::SessionError;
use vision_capture::{cli::Cli, config, start_session};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match config::get_configuration() {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("failed to load configuration: {err}");
            return ExitCode::FAILURE;
        }
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(settings.log_level.as_str())),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false).compact())
        .init();

    match start_session(cli, settings).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(SessionError::Configuration(err)) => {
            eprintln!("{err}");
            eprintln!("usage: vision_capture -k <API_KEY> (-c <INDEX> | -i <PATH>)");
            ExitCode::FAILURE
        }
        Err(err) => {
            tracing::error!("session failed: {}", err);
            ExitCode::FAILURE
        }
    }
}
