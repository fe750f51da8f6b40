use migration::{Migrator, MigratorTrait};
use settings::Database;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "budget_ledger={level},server={level},engine={level},migration={level}",
            level = settings.app.level
        ))
        .init();

    let server = settings.server;
    let db = parse_database(&server.database).await.inspect_err(|err| {
        tracing::error!("failed to initialize database: {err}");
    })?;

    let engine = engine::Engine::builder()
        .database(db)
        .tx_timeout(server.tx_timeout())
        .build()
        .await?;

    let addr = server.address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .inspect_err(|err| tracing::error!("failed to bind server listener on {addr}: {err}"))?;
    server::run_with_listener(engine, listener).await?;

    Ok(())
}

async fn parse_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    tracing::info!("database ready");
    Ok(database)
}
