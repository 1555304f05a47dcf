use crate::output::Output;
use crate::routes;
use crate::state::AppState;
use cineflix_config::{Config, PathManager};
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use tokio::net::TcpListener;
use tracing::info;

pub async fn run_serve(mut config: Config, paths: &PathManager, bind: Option<String>, output: &Output) -> Result<()> {
    if let Some(bind) = bind {
        config.server.bind = bind;
    }
    config.validate().map_err(|e| eyre!("{}", e))?;

    let state = AppState::build(&config, paths)
        .await
        .map_err(|e| eyre!("Failed to initialise application state: {:#}", e))?;
    let app = routes::router(state);

    let listener = TcpListener::bind(&config.server.bind)
        .await
        .wrap_err_with(|| format!("Failed to bind {}", config.server.bind))?;
    let address = listener.local_addr()?;

    info!(%address, "Cineflix listening");
    output.success(format!("Listening on http://{}", address));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
