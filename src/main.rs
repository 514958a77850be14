use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;

use carepool::config::Config;
use carepool::console::{self, Console};
use carepool::engine::ReservationRegistry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;
    carepool::observability::init(config.metrics_port)?;

    let registry = Arc::new(ReservationRegistry::from_config(&config)?);
    info!("carepool ready");
    for (resource_type, capacity) in &config.capacities {
        info!("  {resource_type}: {capacity} units");
    }
    info!(
        "  metrics: {}",
        config
            .metrics_port
            .map_or("disabled".to_string(), |p| format!("http://0.0.0.0:{p}/metrics"))
    );

    let console = Console::new(registry, &config);
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    stdout.write_all(console::HELP.as_bytes()).await?;
    stdout.write_all(b"\n> ").await?;
    stdout.flush().await?;

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            stdout.write_all(b"> ").await?;
            stdout.flush().await?;
            continue;
        }
        let Some(out) = console.handle_line(&line).await else {
            break;
        };
        stdout.write_all(out.as_bytes()).await?;
        stdout.write_all(b"\n> ").await?;
        stdout.flush().await?;
    }

    info!("carepool stopped");
    Ok(())
}
