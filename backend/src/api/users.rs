use axum::extract::{Path, State};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::{ApiError, AppState};

pub fn router(state: AppState) -> axum::Router {
    axum::Router::new()
        .route("/:discord_id", axum::routing::get(profile))
        .route("/:discord_id/roles", axum::routing::put(set_roles))
        .with_state(state)
}

/// Inserts the user or refreshes their display name.
pub(crate) async fn upsert_user(
    con: &mut diesel_async::AsyncPgConnection,
    discord_id: &str,
    name: &str,
) -> Result<(), diesel::result::Error> {
    let query = diesel::dsl::insert_into(crate::schema::users::dsl::users)
        .values(crate::models::NewUser { discord_id, name })
        .on_conflict(crate::schema::users::dsl::discord_id)
        .do_update()
        .set(crate::schema::users::dsl::name.eq(name));
    tracing::trace!(?query, "Upsert user query");

    query.execute(con).await?;
    Ok(())
}

#[tracing::instrument(skip(state))]
async fn profile(
    State(state): State<AppState>,
    Path(discord_id): Path<String>,
) -> Result<axum::Json<common::UserProfile>, ApiError> {
    let mut db_con = state.db().await?;

    let user: crate::models::User = crate::schema::users::dsl::users
        .find(&discord_id)
        .select(crate::models::User::as_select())
        .first(&mut db_con)
        .await?;

    let linked: Option<crate::models::LinkedAccount> =
        crate::schema::linked_accounts::dsl::linked_accounts
            .find(&discord_id)
            .select(crate::models::LinkedAccount::as_select())
            .first(&mut db_con)
            .await
            .optional()?;

    Ok(axum::Json(common::UserProfile {
        primary: user
            .primary_lane
            .as_deref()
            .map(crate::models::parse_lane)
            .transpose()?,
        secondary: user
            .secondary_lane
            .as_deref()
            .map(crate::models::parse_lane)
            .transpose()?,
        discord_id: user.discord_id,
        name: user.name,
        linked_account: linked.map(Into::into),
    }))
}

#[tracing::instrument(skip(state))]
async fn set_roles(
    State(state): State<AppState>,
    Path(discord_id): Path<String>,
    axum::Json(roles): axum::Json<common::RolePreferences>,
) -> Result<axum::http::StatusCode, ApiError> {
    if roles.primary == roles.secondary {
        return Err(ApiError::BadRequest(
            "primary and secondary lane must differ".to_owned(),
        ));
    }

    let query = diesel::dsl::insert_into(crate::schema::users::dsl::users)
        .values(crate::models::User {
            discord_id: discord_id.clone(),
            name: roles.name.clone(),
            primary_lane: Some(roles.primary.as_str().to_owned()),
            secondary_lane: Some(roles.secondary.as_str().to_owned()),
        })
        .on_conflict(crate::schema::users::dsl::discord_id)
        .do_update()
        .set((
            crate::schema::users::dsl::name.eq(&roles.name),
            crate::schema::users::dsl::primary_lane.eq(roles.primary.as_str()),
            crate::schema::users::dsl::secondary_lane.eq(roles.secondary.as_str()),
        ));
    tracing::debug!(?query, "Set roles query");

    query.execute(&mut state.db().await?).await?;

    Ok(axum::http::StatusCode::NO_CONTENT)
}
