use clap::{Parser, Subcommand};
use tracing::info;

use crate::config::{AppConfig, StorageBackend};
use crate::database::DatabaseManager;
use crate::router::create_app;
use crate::state::AppState;

#[derive(Parser)]
#[command(name = "case-manager")]
#[command(about = "Case Manager API - multi-tenant legal case management server")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Address to bind (overrides HOST)")]
        host: Option<String>,
        #[arg(long, help = "Port to bind (overrides PORT)")]
        port: Option<u16>,
    },

    #[command(about = "Apply database migrations and exit")]
    Migrate,
}

pub async fn run(cli: Cli, mut config: AppConfig) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Serve { host: None, port: None }) {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            serve(config).await
        }
        Commands::Migrate => {
            anyhow::ensure!(
                config.database.backend == StorageBackend::Postgres,
                "migrate needs DATABASE_URL pointing at PostgreSQL"
            );
            let pool = DatabaseManager::connect(&config.database).await?;
            DatabaseManager::migrate(&pool).await?;
            Ok(())
        }
    }
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    anyhow::ensure!(
        !config.security.jwt_secret.is_empty(),
        "JWT_SECRET must be set outside development"
    );

    let store = DatabaseManager::open(&config.database).await?;
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    info!(
        "Starting {} v{} in {} mode",
        config.server.app_name,
        config.server.app_version,
        config.environment.as_str()
    );

    let app = create_app(AppState::new(config, store));
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Listening on http://{}", bind_addr);

    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
