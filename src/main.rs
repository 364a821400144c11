use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tower::make::Shared;
use tracing_subscriber::EnvFilter;

use advocacia::auth::jwt::JwtService;
use advocacia::config::AppConfig;
use advocacia::db::Database;
use advocacia::routes;
use advocacia::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    tracing::info!(
        component = "server",
        database_path = %config.database_path,
        server_host = %config.server_host,
        server_port = config.server_port,
        static_dir = ?config.static_dir,
        "loaded backend configuration"
    );

    let database = Arc::new(Database::new(config.database_path.clone()));
    if let Err(err) = database.initialize() {
        tracing::error!(error = %err, "database initialization failed; shutting down");
        std::process::exit(1);
    }

    let jwt = JwtService::from_config(&config)?;
    let state = AppState::new(database, config, jwt);
    let listen_addr: SocketAddr = {
        let config = state.config.clone();
        format!("{}:{}", config.server_host, config.server_port).parse()?
    };
    let router = routes::create_router(state);

    let listener = TcpListener::bind(listen_addr).await?;
    tracing::info!("listening on http://{}", listen_addr);

    axum::serve(listener, Shared::new(router)).await?;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
