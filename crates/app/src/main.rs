use std::sync::Arc;

use migration::{Migrator, MigratorTrait};
use notifier::{HttpMailer, Notifier, SmsClient};
use settings::Database;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "assista={level},server={level},engine={level},notifier={level}",
            level = settings.app.level
        ))
        .init();

    let db = parse_database(&settings.server.database).await?;

    let engine = Arc::new(
        engine::Engine::builder()
            .database(db.clone())
            .build()
            .await?,
    );

    let client = reqwest::Client::new();
    let mut builder = Notifier::builder(engine.clone(), settings.server.base_url.clone());
    if let Some(mail) = settings.mail {
        tracing::info!("Found mail settings...");
        builder = builder.mail(Arc::new(HttpMailer::new(
            client.clone(),
            mail.base_url,
            mail.api_key,
            mail.from,
        )));
    }
    if let Some(sms) = settings.sms {
        tracing::info!("Found sms settings...");
        builder = builder.sms(SmsClient::new(
            client,
            sms.base_url,
            sms.device_id,
            sms.api_key,
        ));
    }
    let notifier = Arc::new(builder.build());

    let bind = settings
        .server
        .bind
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let addr = format!("{}:{}", bind, settings.server.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    server::run_with_listener(engine, notifier, db, listener).await?;

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
    Ok(database)
}
