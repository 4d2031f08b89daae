/// AFK Visit Server - unique-visitor counter for the AFK site
use clap::{Parser, Subcommand};
use std::{net::SocketAddr, path::PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use visit_server::{api, config::ServerConfig, state::AppState};

#[derive(Parser)]
#[command(name = "visit-server")]
#[command(about = "AFK site unique-visitor counter", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Configuration file path
        #[arg(short, long, env = "AFK_CONFIG")]
        config: Option<PathBuf>,
    },
    /// Print the current visit count and exit
    Count {
        /// Configuration file path
        #[arg(short, long, env = "AFK_CONFIG")]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "visit_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => {
            serve(load_config(config)?).await?;
        }
        Commands::Count { config } => {
            print_count(load_config(config)?).await?;
        }
    }

    Ok(())
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<ServerConfig> {
    let config = ServerConfig::load(path.as_deref())?;
    config.validate()?;
    Ok(config)
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    tracing::info!("Starting AFK visit server");
    tracing::info!("Host: {}", config.server.host);
    tracing::info!("Port: {}", config.server.port);
    tracing::info!("Store: {:?}", config.store.backend);

    let app_state = AppState::from_config(&config)?;
    let app = api::router(app_state);

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

async fn print_count(config: ServerConfig) -> anyhow::Result<()> {
    let app_state = AppState::from_config(&config)?;
    let count = app_state.store.count().await?;
    println!("{}", count);
    Ok(())
}
