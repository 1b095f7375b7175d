use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "fitform-cli")]
#[command(about = "FitForm operations command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Upsert size sets from a YAML seed file into a shop.
    Seed {
        /// Shop domain the sets belong to, e.g. demo.myshopify.com.
        #[arg(long)]
        shop: String,
        /// Seed file path; defaults to `FITFORM_SEED_PATH`.
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Parse the environment configuration and print the resolved values.
    CheckConfig,
    /// Run pending database migrations.
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Seed { shop, file } => seed(&shop, file).await,
        Commands::CheckConfig => check_config(),
        Commands::Migrate => migrate().await,
    }
}

async fn seed(shop: &str, file: Option<PathBuf>) -> anyhow::Result<()> {
    let config = fitform_core::load_app_config_from_env()?;
    let path = file.unwrap_or_else(|| config.seed_path.clone());

    let seed_file = fitform_core::load_seed_file(&path)?;
    tracing::info!(path = %path.display(), sets = seed_file.sets.len(), "seed file loaded");

    let pool = connect(&config).await?;
    fitform_db::run_migrations(&pool).await?;

    let count = fitform_db::seed_size_sets(&pool, shop, &seed_file.sets).await?;
    println!("seeded {count} size sets for {shop}");
    Ok(())
}

fn check_config() -> anyhow::Result<()> {
    let config = fitform_core::load_app_config_from_env()?;
    println!("{config:#?}");
    Ok(())
}

async fn migrate() -> anyhow::Result<()> {
    let config = fitform_core::load_app_config_from_env()?;
    let pool = connect(&config).await?;
    let applied = fitform_db::run_migrations(&pool).await?;
    println!("applied {applied} migrations");
    Ok(())
}

async fn connect(config: &fitform_core::AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool_config = fitform_db::PoolConfig::from_app_config(config);
    Ok(fitform_db::connect_pool(&config.database_url, pool_config).await?)
}
