use chrono::{Datelike, Local};
use clap::Parser;
use habit_calendar::cli::{self, Cli, Command};
use habit_calendar::config::ServerConfig;
use habit_calendar::{bootstrap_document, load_document, router, AppState};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command.clone().unwrap_or(Command::Serve) {
        Command::Serve => serve(ServerConfig::from_env()).await,
        command => match cli::run(command, &cli.client_config()).await {
            Ok(output) => {
                print!("{output}");
                Ok(())
            }
            Err(err) => {
                error!("{err}");
                Err(err.into())
            }
        },
    }
}

async fn serve(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    bootstrap_document(&config.data_path)
        .await
        .map_err(|err| err.message)?;

    let data = load_document(&config.data_path).await;
    let state = AppState::new(config.data_path, data, Local::now().year()).await;
    let app = router(state);

    info!("listening on http://{}", config.addr);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
