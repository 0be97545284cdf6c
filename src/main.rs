use anyhow::Context;
use sparrow::config::Config;
use sparrow::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;
    cfg.validate().context("invalid configuration")?;
    tracing::info!(directory = %cfg.directory.display(), read_mode = ?cfg.read_mode, "Serving files");

    tokio::select! {
        res = server::listener::run(&cfg) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
