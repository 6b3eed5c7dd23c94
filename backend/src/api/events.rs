use axum::extract::{Path, Query, State};
use diesel::prelude::*;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::{ApiError, AppState};

pub fn router(state: AppState) -> axum::Router {
    axum::Router::new()
        .route("/", axum::routing::get(list).post(create))
        .route("/:id", axum::routing::get(info).delete(remove))
        .with_state(state)
}

fn validate(event: &common::NewEvent, now: chrono::DateTime<chrono::Utc>) -> Result<(), ApiError> {
    if event.title.trim().is_empty() {
        return Err(ApiError::BadRequest("title must not be empty".to_owned()));
    }
    if event.starts_at <= now {
        return Err(ApiError::BadRequest("start time is in the past".to_owned()));
    }
    Ok(())
}

#[tracing::instrument(skip(state))]
async fn create(
    State(state): State<AppState>,
    axum::Json(event): axum::Json<common::NewEvent>,
) -> Result<axum::Json<common::Event>, ApiError> {
    validate(&event, chrono::Utc::now())?;

    let mut db_con = state.db().await?;

    let created = db_con
        .transaction::<_, ApiError, _>(|con| {
            Box::pin(async move {
                super::users::upsert_user(con, &event.created_by, &event.created_by_name).await?;

                let query = diesel::dsl::insert_into(crate::schema::events::dsl::events)
                    .values(crate::models::NewEvent {
                        title: event.title.trim(),
                        starts_at: event.starts_at,
                        created_by: &event.created_by,
                    })
                    .returning(crate::models::Event::as_returning());
                tracing::trace!(?query, "Insert event query");

                let event: crate::models::Event = query.get_result(con).await?;
                Ok(event)
            })
        })
        .await?;

    tracing::info!(id = created.id, "Created event");

    Ok(axum::Json(created.into()))
}

#[tracing::instrument(skip(state))]
async fn list(State(state): State<AppState>) -> Result<axum::Json<Vec<common::Event>>, ApiError> {
    let query = crate::schema::events::dsl::events
        .filter(crate::schema::events::dsl::starts_at.gt(chrono::Utc::now()))
        .order(crate::schema::events::dsl::starts_at.asc())
        .select(crate::models::Event::as_select());

    let results: Vec<crate::models::Event> = query.load(&mut state.db().await?).await?;

    Ok(axum::Json(results.into_iter().map(Into::into).collect()))
}

#[tracing::instrument(skip(state))]
async fn info(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<axum::Json<common::Event>, ApiError> {
    let query = crate::schema::events::dsl::events
        .find(id)
        .select(crate::models::Event::as_select());

    let event: crate::models::Event = query.first(&mut state.db().await?).await?;

    Ok(axum::Json(event.into()))
}

#[derive(Debug, serde::Deserialize)]
struct RemoveParams {
    requested_by: String,
}

#[tracing::instrument(skip(state))]
async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(params): Query<RemoveParams>,
) -> Result<axum::http::StatusCode, ApiError> {
    let mut db_con = state.db().await?;

    let event: Option<crate::models::Event> = crate::schema::events::dsl::events
        .find(id)
        .select(crate::models::Event::as_select())
        .first(&mut db_con)
        .await
        .optional()?;

    let event = event.ok_or(ApiError::NotFound)?;
    if event.created_by != params.requested_by {
        tracing::info!(?event, "Refusing to delete event of another user");
        return Err(ApiError::Forbidden);
    }

    diesel::dsl::delete(crate::schema::events::dsl::events.find(id))
        .execute(&mut db_con)
        .await?;

    tracing::info!(id, "Deleted event");

    Ok(axum::http::StatusCode::NO_CONTENT)
}
