use axum::extract::{Path, State};
use diesel::prelude::*;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::{ApiError, AppState};

pub fn router(state: AppState) -> axum::Router {
    axum::Router::new()
        .route("/:match_id", axum::routing::get(participants))
        .route("/:match_id/participants", axum::routing::post(create_participant))
        .with_state(state)
}

/// Stores one participant of a match, creating the match on first use.
///
/// An unknown user is reported as `404`.
#[tracing::instrument(skip(state, participant))]
async fn create_participant(
    State(state): State<AppState>,
    Path(match_id): Path<uuid::Uuid>,
    axum::Json(participant): axum::Json<common::NewMatchParticipant>,
) -> Result<axum::Json<common::Created>, ApiError> {
    let mut db_con = state.db().await?;
    let discord_id = participant.discord_id.clone();

    let id = db_con
        .transaction::<_, ApiError, _>(|con| {
            Box::pin(async move {
                diesel::dsl::insert_into(crate::schema::matches::dsl::matches)
                    .values(crate::models::NewMatch { id: match_id })
                    .on_conflict_do_nothing()
                    .execute(con)
                    .await?;

                let row = crate::models::NewMatchParticipant::from_request(match_id, &participant)?;
                let id: i64 = diesel::dsl::insert_into(
                    crate::schema::match_participants::dsl::match_participants,
                )
                .values(&row)
                .returning(crate::schema::match_participants::dsl::id)
                .get_result(con)
                .await?;

                Ok(id)
            })
        })
        .await?;

    tracing::info!(%match_id, %discord_id, id, "Stored match participant");

    Ok(axum::Json(common::Created { id }))
}

#[tracing::instrument(skip(state))]
async fn participants(
    State(state): State<AppState>,
    Path(match_id): Path<uuid::Uuid>,
) -> Result<axum::Json<Vec<common::MatchParticipant>>, ApiError> {
    let query = crate::schema::match_participants::dsl::match_participants
        .filter(crate::schema::match_participants::dsl::match_id.eq(match_id))
        .order(crate::schema::match_participants::dsl::id.asc())
        .select(crate::models::MatchParticipant::as_select());

    let rows: Vec<crate::models::MatchParticipant> = query.load(&mut state.db().await?).await?;
    if rows.is_empty() {
        return Err(ApiError::NotFound);
    }

    let participants = rows
        .into_iter()
        .map(common::MatchParticipant::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(axum::Json(participants))
}
