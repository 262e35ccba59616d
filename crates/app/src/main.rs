use engine::{Engine, ModeCatalog};
use migration::{Migrator, MigratorTrait};
use settings::Database;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "ledgerbook={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let Some(server) = settings.server else {
        tracing::warn!("no server settings found, nothing to run");
        return Ok(());
    };

    tracing::info!("Found server settings...");
    let db = parse_database(&server.database).await?;
    let engine = build_engine(db, settings.ledger).await?;

    let bind = server.bind.unwrap_or_else(|| "127.0.0.1".to_string());
    let addr = format!("{}:{}", bind, server.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    server::run_with_listener(engine, listener).await?;

    Ok(())
}

async fn build_engine(
    db: sea_orm::DatabaseConnection,
    ledger: settings::Ledger,
) -> Result<Engine, Box<dyn std::error::Error + Send + Sync>> {
    let mut builder = Engine::builder().database(db);

    if ledger.income_modes.is_some() || ledger.expense_modes.is_some() {
        let defaults = ModeCatalog::default();
        let income = ledger
            .income_modes
            .unwrap_or_else(|| defaults.allowed(engine::EntryKind::Income).to_vec());
        let expense = ledger
            .expense_modes
            .unwrap_or_else(|| defaults.allowed(engine::EntryKind::Expense).to_vec());
        builder = builder.modes(ModeCatalog::new(income, expense)?);
    }
    if let Some(label) = ledger.currency_label {
        builder = builder.currency_label(label);
    }

    Ok(builder.build().await?)
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
    Ok(database)
}
