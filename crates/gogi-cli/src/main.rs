mod stores;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use gogi_core::{Offering, PriceRegion};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "gogi-cli")]
#[command(about = "Gogi store directory and price visibility tools")]
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
    /// Inspect the store directory
    Stores {
        #[command(subcommand)]
        command: StoresCommands,
    },
    /// Show what the price gate renders for a store
    Prices {
        /// Store to select manually (by slug)
        #[arg(long)]
        store: Option<String>,

        /// Preferred offering (kbbq or hotpot)
        #[arg(long)]
        offering: Option<Offering>,

        /// Page region whose switch applies
        #[arg(long, default_value = "hero")]
        region: PriceRegion,

        /// Visitor latitude
        #[arg(long, allow_negative_numbers = true, requires = "lng")]
        lat: Option<f64>,

        /// Visitor longitude
        #[arg(long, allow_negative_numbers = true, requires = "lat")]
        lng: Option<f64>,

        /// Read stores from a YAML directory file instead of the database
        #[arg(long, value_name = "PATH")]
        from_file: Option<PathBuf>,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check database connectivity
    Ping,
    /// Apply pending migrations
    Migrate,
    /// Upsert stores (and the price policy) from the configured YAML file
    Seed,
}

#[derive(Debug, Subcommand)]
enum StoresCommands {
    /// List active stores in directory order
    List {
        /// Read stores from a YAML directory file instead of the database
        #[arg(long, value_name = "PATH")]
        from_file: Option<PathBuf>,
    },
    /// Resolve the store closest to a position
    Nearest {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        #[arg(long, allow_negative_numbers = true)]
        lng: f64,

        /// Read stores from a YAML directory file instead of the database
        #[arg(long, value_name = "PATH")]
        from_file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn"))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Db { command }) => run_db(command).await?,
        Some(Commands::Stores {
            command: StoresCommands::List { from_file },
        }) => {
            let source = stores::StoreSource::resolve(from_file).await?;
            stores::run_list(&source);
        }
        Some(Commands::Stores {
            command: StoresCommands::Nearest { lat, lng, from_file },
        }) => {
            let source = stores::StoreSource::resolve(from_file).await?;
            stores::run_nearest(&source, lat, lng)?;
        }
        Some(Commands::Prices {
            store,
            offering,
            region,
            lat,
            lng,
            from_file,
        }) => {
            let source = stores::StoreSource::resolve(from_file).await?;
            let request = stores::PricesRequest {
                store,
                offering,
                region,
                lat,
                lng,
            };
            stores::run_prices(&source, &request).await?;
        }
        None => println!("gogi-cli: run with --help for available commands"),
    }

    Ok(())
}

async fn connect() -> anyhow::Result<(gogi_core::AppConfig, sqlx::PgPool)> {
    let config = gogi_core::load_app_config()?;
    let pool_config = gogi_db::PoolConfig::from_app_config(&config);
    let pool = gogi_db::connect_pool(&config.database_url, pool_config).await?;
    Ok((config, pool))
}

async fn run_db(command: DbCommands) -> anyhow::Result<()> {
    let (config, pool) = connect().await?;
    match command {
        DbCommands::Ping => {
            gogi_db::health_check(&pool).await?;
            println!("database ok");
        }
        DbCommands::Migrate => {
            let applied = gogi_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
        DbCommands::Seed => {
            let stores_file = gogi_core::load_stores(&config.stores_path)?;
            let count = gogi_db::seed_stores(&pool, &stores_file).await?;
            println!(
                "seeded {count} store(s) from {}",
                config.stores_path.display()
            );
        }
    }
    Ok(())
}
