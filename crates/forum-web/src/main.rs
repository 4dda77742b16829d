use anyhow::Context;
use clap::Parser;
use forum_config::ForumConfig;
use forum_db::ForumDb;
use tracing::info;

mod cli;

use cli::{Cli, Commands, ServeArgs};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("forum error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let mut config = ForumConfig::load_with_dotenv().context("failed to load configuration")?;

    match cli.command.unwrap_or(Commands::Serve(ServeArgs::default())) {
        Commands::Serve(args) => {
            if let Some(bind) = args.bind {
                config.server.bind = bind;
            }
            if let Some(port) = args.port {
                config.server.port = port;
            }
            if let Some(database) = args.database {
                config.database.path = database;
            }
            config.validate()?;
            forum_web::serve(config).await
        }
        Commands::Migrate(args) => {
            if let Some(database) = args.database {
                config.database.path = database;
            }
            config.validate()?;
            ForumDb::open_local(&config.database.path)
                .await
                .with_context(|| format!("failed to migrate '{}'", config.database.path))?;
            info!(path = %config.database.path, "schema up to date");
            Ok(())
        }
    }
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("FORUM_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
