use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use rankscout::app::AppContext;
use rankscout::cli::{commands, Cli, Commands};
use rankscout::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Run {
            platform,
            dry_run,
            concurrency,
        } => {
            if let Some(n) = concurrency {
                config.pipeline.category_concurrency = n;
            }
            let ctx = AppContext::new(config)?;
            commands::run(&ctx, platform, dry_run).await?;
        }
        Commands::Show { platform, category } => {
            let ctx = AppContext::new(config)?;
            commands::show(&ctx, platform, category).await?;
        }
        Commands::Config => {
            let path = match cli.config {
                Some(p) => p,
                None => Config::default_config_path()?,
            };
            commands::show_config(&config, &path)?;
        }
    }

    Ok(())
}
