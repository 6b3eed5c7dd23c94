use axum::extract::State;
use diesel_async::RunQueryDsl;

use crate::AppState;

pub fn router(state: AppState) -> axum::Router {
    axum::Router::new()
        .route("/", axum::routing::get(health))
        .with_state(state)
}

/// Always answers; a broken database only shows up in the body.
#[tracing::instrument(skip(state))]
async fn health(State(state): State<AppState>) -> axum::Json<common::HealthStatus> {
    let database = match state.db().await {
        Ok(mut db_con) => match diesel::sql_query("SELECT 1").execute(&mut db_con).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("Database probe failed: {:?}", e);
                false
            }
        },
        Err(_) => false,
    };

    axum::Json(common::HealthStatus {
        status: "ok".to_owned(),
        database,
    })
}
