use glowtrust::utils::{config::AppConfig, telemetry};
use glowtrust::{app, build_state};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    telemetry::init(config.environment);

    let state = build_state(&config).await?;
    let listener = TcpListener::bind(config.listen_addr).await?;
    info!(addr = %config.listen_addr, "Server starting");

    axum::serve(listener, app(state).into_make_service()).await?;
    Ok(())
}
