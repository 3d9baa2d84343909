mod query;
mod run;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use vibecheck_pipeline::JobKind;

#[derive(Debug, Parser)]
#[command(name = "vibecheck-cli")]
#[command(about = "VibeCheck command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Run one ingestion job now, recording it in the execution log
    Run {
        #[arg(value_enum)]
        job: JobArg,
    },
    /// List tracked entities
    Entities,
    /// Show recent job executions
    Executions {
        /// Only show runs of this job (`poll_news` or `poll_stories`)
        #[arg(long)]
        job_name: Option<String>,

        #[arg(long, default_value_t = 20)]
        limit: i64,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check database connectivity
    Ping,
    /// Apply pending migrations
    Migrate,
    /// Insert the curated entities (idempotent)
    Seed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum JobArg {
    News,
    Stories,
}

impl From<JobArg> for JobKind {
    fn from(arg: JobArg) -> Self {
        match arg {
            JobArg::News => JobKind::News,
            JobArg::Stories => JobKind::Stories,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("vibecheck-cli ready; see --help for commands");
        return Ok(());
    };

    let config = vibecheck_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = vibecheck_db::PoolConfig::from_app_config(&config);
    let pool = vibecheck_db::connect_pool(&config.database_url, pool_config).await?;

    match command {
        Commands::Db { command } => run_db(&pool, command).await?,
        Commands::Run { job } => run::run_job(&pool, &config, job.into()).await?,
        Commands::Entities => query::print_entities(&pool).await?,
        Commands::Executions { job_name, limit } => {
            query::print_executions(&pool, job_name.as_deref(), limit).await?;
        }
    }

    Ok(())
}

async fn run_db(pool: &sqlx::PgPool, command: DbCommands) -> anyhow::Result<()> {
    match command {
        DbCommands::Ping => {
            vibecheck_db::ping(pool).await?;
            println!("database reachable");
        }
        DbCommands::Migrate => {
            let applied = vibecheck_db::run_migrations(pool).await?;
            println!("applied {applied} migration(s)");
        }
        DbCommands::Seed => {
            vibecheck_db::run_migrations(pool).await?;
            let inserted =
                vibecheck_db::seed_entities(pool, vibecheck_core::curated_entities()).await?;
            println!(
                "seeded {inserted} new entit{} ({} curated)",
                if inserted == 1 { "y" } else { "ies" },
                vibecheck_core::curated_entities().len()
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests;
