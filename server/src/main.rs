use minifi_server::{app, AppState, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = ServerConfig::from_env()?;
    let state = AppState::from_config(&config)?;

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    log::info!("Mini.Fi API listening on {}", config.bind_addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}
