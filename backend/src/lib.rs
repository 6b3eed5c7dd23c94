pub mod config;
pub mod error;
pub mod models;
pub mod oauth;
pub mod schema;

pub mod api;

pub use error::ApiError;

/// Shared by every route.
#[derive(Clone)]
pub struct AppState {
    inner: std::sync::Arc<Inner>,
}

struct Inner {
    database_url: String,
    link_expiry: chrono::Duration,
    oauth: oauth::Client,
    catalog: common::messages::Catalog,
}

impl AppState {
    pub fn new(config: &config::Config, catalog: common::messages::Catalog) -> Self {
        Self {
            inner: std::sync::Arc::new(Inner {
                database_url: config.database_url.clone(),
                link_expiry: chrono::Duration::seconds(config.link_expiry_secs),
                oauth: oauth::Client::new(config.oauth.clone()),
                catalog,
            }),
        }
    }

    pub async fn db(&self) -> Result<diesel_async::AsyncPgConnection, ApiError> {
        db_connection(&self.inner.database_url)
            .await
            .map_err(ApiError::from)
    }

    pub fn oauth(&self) -> &oauth::Client {
        &self.inner.oauth
    }

    pub fn catalog(&self) -> &common::messages::Catalog {
        &self.inner.catalog
    }

    pub fn link_expiry(&self) -> chrono::Duration {
        self.inner.link_expiry
    }
}

pub async fn db_connection(
    database_url: &str,
) -> Result<diesel_async::AsyncPgConnection, diesel::ConnectionError> {
    use diesel_async::AsyncConnection;

    diesel_async::AsyncPgConnection::establish(database_url)
        .await
        .inspect_err(|e| tracing::error!("Connecting to database: {:?}", e))
}
