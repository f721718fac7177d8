use blog_model::{Config, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blog_model=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    tracing::info!("Starting blog-model");
    tracing::info!("Project root: {}", config.project_root.display());

    let db_pool =
        blog_model::db::create_pool(&config.database_url, config.database_max_connections).await?;
    blog_model::db::run_migrations(&db_pool).await?;

    let storage = config.cover_storage();
    storage.ensure_dir().await?;
    tracing::info!("Covers stored in {}", storage.absolute_dir().display());

    tracing::info!("Database schema is up to date");
    Ok(())
}
