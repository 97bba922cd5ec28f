use anyhow::Result;
use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "franscore-migrate", about = "Apply FranScore schema migrations")]
struct Args {
    /// Postgres connection string
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// Print pending migrations without applying them
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&args.database_url)
        .await?;

    let migrator = sqlx::migrate!("./migrations");

    if args.dry_run {
        for migration in migrator.iter() {
            info!(
                version = migration.version,
                description = %migration.description,
                "pending"
            );
        }
        return Ok(());
    }

    migrator.run(&pool).await?;
    info!("Migrations applied");

    Ok(())
}
