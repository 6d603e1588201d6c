use std::net::SocketAddr;
use std::sync::Arc;

use log::{error, info};

use menu_beacon::state::documents::seed_data_dir;
use menu_beacon::{app, AppState, ServerConfig};

#[tokio::main]
async fn main() {
    let config = ServerConfig::from_env();

    // Healthcheck mode: exit 0 if the server is running (port in use), 1 if not
    if std::env::args().any(|a| a == "--healthcheck") {
        use std::net::TcpListener;
        match TcpListener::bind(("127.0.0.1", config.port)) {
            Ok(_) => std::process::exit(1),
            Err(_) => std::process::exit(0),
        }
    }

    env_logger::init();

    if let Err(e) = seed_data_dir(&config.data_dir) {
        error!("Cannot prepare data dir {}: {}", config.data_dir.display(), e);
        std::process::exit(1);
    }

    let state = Arc::new(AppState::from_config(&config));
    let router = app(state, &config);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Cannot bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };
    info!("Menu beacon listening on http://{}", addr);
    info!("Relay WebSocket: ws://{}/ (or /ws)", addr);
    info!("Data dir: {}", config.data_dir.display());

    let graceful = axum::serve(listener, router).with_graceful_shutdown(async {
        tokio::signal::ctrl_c().await.ok();
        info!("Shutting down");
    });

    if let Err(e) = graceful.await {
        error!("Server error: {}", e);
    }
}
