use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::config::Config;
use crate::http::connection::{Connection, ReadSettings};
use crate::router::Router;

const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

pub async fn run(cfg: &Config) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&cfg.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", cfg.listen_addr))?;
    info!("Listening on {}", listener.local_addr()?);

    serve(listener, cfg).await
}

/// Accepts connections forever, one task per connection.
///
/// A failing connection only ends its own task; accept errors are logged
/// and the loop keeps going.
pub async fn serve(listener: TcpListener, cfg: &Config) -> anyhow::Result<()> {
    let router = Arc::new(Router::new(cfg.directory.clone()));
    let settings = ReadSettings::from(cfg);

    loop {
        let (socket, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                error!("Failed to accept connection: {}", e);
                tokio::time::sleep(ACCEPT_BACKOFF).await;
                continue;
            }
        };
        info!("Accepted connection from {}", peer);

        let router = Arc::clone(&router);
        tokio::spawn(async move {
            let mut conn = Connection::new(socket, router, settings);
            if let Err(e) = conn.run().await {
                error!("Connection error from {}: {:#}", peer, e);
            }
        });
    }
}
