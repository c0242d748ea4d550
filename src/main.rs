mod cli;

use clap::Parser;
use fred::interfaces::ClientLike;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use engram::config::AppConfig;
use engram::store;

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;

    let default_filter = config
        .log_filter
        .clone()
        .unwrap_or_else(|| "engram=info".to_string());
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let url = config.redis_url(cli.url.as_deref());
    let client = store::connect(&url)
        .await
        .map_err(|e| anyhow::anyhow!("cannot reach store at {}: {}", url, e))?;

    let ok = match cli.command {
        Commands::Remember { path } => cli::remember(&client, &path).await?,
        Commands::Refresh { files, project } => {
            cli::refresh(&client, &files, project.as_deref()).await?
        }
        Commands::Recall {
            entity_type,
            name,
            project,
        } => cli::recall(&client, &entity_type, name.as_deref(), project.as_deref()).await?,
        Commands::Status { project } => cli::status(&client, project.as_deref()).await?,
        Commands::Forget { project } => cli::forget(&client, &project).await?,
    };

    let _ = client.quit().await;
    if !ok {
        std::process::exit(1);
    }
    Ok(())
}
