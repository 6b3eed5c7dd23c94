use clap::Parser;
use tracing_subscriber::prelude::__tracing_subscriber_SubscriberExt;

const MIGRATIONS: diesel_async_migrations::EmbeddedMigrations =
    diesel_async_migrations::embed_migrations!("../migrations/");

async fn run_migrations(connection: &mut diesel_async::AsyncPgConnection) -> anyhow::Result<()> {
    MIGRATIONS
        .run_pending_migrations(connection)
        .await
        .map_err(|e| anyhow::anyhow!("Running migrations: {:?}", e))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = backend::config::Config::parse();

    let registry = tracing_subscriber::Registry::default()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::filter::filter_fn(|meta| {
            meta.target().starts_with("backend")
                || meta.target().starts_with("common")
                || meta.target().starts_with("tower_http")
        }));
    tracing::subscriber::set_global_default(registry)?;

    tracing::info!("Starting...");

    let catalog = config.messages.catalog()?;

    tracing::info!("Applying Migrations");
    run_migrations(&mut backend::db_connection(&config.database_url).await?).await?;
    tracing::info!("Completed Migrations");

    let state = backend::AppState::new(&config, catalog);

    let router = axum::Router::new()
        .nest("/api", backend::api::router(state))
        .layer(tower_http::trace::TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!("Listening on {}", config.listen_addr);
    axum::serve(listener, router).await?;

    Ok(())
}
