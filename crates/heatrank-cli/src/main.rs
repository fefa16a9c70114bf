mod collect;
mod query;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "heatrank-cli")]
#[command(about = "Competitive-shooter heat ranking command line interface")]
struct Cli {
    /// Print machine-readable JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one collection cycle now
    Collect {
        /// Score titles without writing to the database
        #[arg(long)]
        dry_run: bool,

        /// Override the number of candidates to discover
        #[arg(long)]
        count: Option<usize>,
    },
    /// Classify a single title through the full chain
    Classify {
        name: String,

        /// Spectator count to classify the title with
        #[arg(long, default_value_t = 0)]
        viewers: u64,
    },
    /// Show titles ranked by recent heat
    Ranking {
        #[arg(long, default_value_t = 20)]
        limit: usize,

        /// Look-back window in hours
        #[arg(long, default_value_t = 24)]
        hours: i64,

        /// Order by the local-market score instead of global heat
        #[arg(long)]
        local: bool,
    },
    /// Show day-over-day movers
    Trending {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Apply pending migrations
    Migrate,
    /// Check connectivity
    Ping,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = heatrank_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let Some(command) = cli.command else {
        println!("heatrank-cli ready; see --help for commands");
        return Ok(());
    };

    match command {
        Commands::Collect { dry_run, count } => {
            collect::run_collect(&config, dry_run, count, cli.json).await
        }
        Commands::Classify { name, viewers } => {
            collect::run_classify(&config, &name, viewers, cli.json).await
        }
        Commands::Ranking {
            limit,
            hours,
            local,
        } => query::run_ranking(&config, limit, hours, local, cli.json).await,
        Commands::Trending { limit } => query::run_trending(&config, limit, cli.json).await,
        Commands::Db { command } => {
            let pool = heatrank_db::connect_pool_from_config(&config).await?;
            match command {
                DbCommands::Migrate => {
                    let applied = heatrank_db::run_migrations(&pool).await?;
                    println!("migrations up to date ({applied} applied)");
                }
                DbCommands::Ping => {
                    heatrank_db::ping(&pool).await?;
                    println!("database reachable");
                }
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests;
