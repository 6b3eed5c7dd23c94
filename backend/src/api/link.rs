//! Account linking: the bot starts a link for a chat user, the browser comes back
//! through the OAuth provider to `/callback` with the same `state`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use rand::Rng;

use crate::{ApiError, AppState};

const STATE_LENGTH: usize = 32;

pub fn router(state: AppState) -> axum::Router {
    axum::Router::new()
        .route("/callback", axum::routing::get(callback))
        .route("/:discord_id", axum::routing::post(start))
        .with_state(state)
}

fn new_state() -> String {
    rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(STATE_LENGTH)
        .map(char::from)
        .collect()
}

#[tracing::instrument(skip(state))]
async fn start(
    State(state): State<AppState>,
    Path(discord_id): Path<String>,
    axum::Json(request): axum::Json<common::StartLink>,
) -> Result<axum::Json<common::LinkRequest>, ApiError> {
    let mut db_con = state.db().await?;
    let now = chrono::Utc::now();

    let cleanup = diesel::dsl::delete(crate::schema::link_requests::dsl::link_requests)
        .filter(crate::schema::link_requests::dsl::expires_at.le(now));
    let removed = cleanup.execute(&mut db_con).await?;
    if removed > 0 {
        tracing::debug!("Removed {} expired link requests", removed);
    }

    super::users::upsert_user(&mut db_con, &discord_id, &request.name).await?;

    let link_state = new_state();
    let query = diesel::dsl::insert_into(crate::schema::link_requests::dsl::link_requests).values(
        crate::models::LinkRequest {
            state: link_state.clone(),
            discord_id,
            expires_at: now + state.link_expiry(),
        },
    );
    query.execute(&mut db_con).await?;

    let url = state.oauth().authorize_url(&link_state)?;

    Ok(axum::Json(common::LinkRequest { url }))
}

#[derive(Debug, serde::Deserialize)]
struct CallbackParams {
    code: String,
    state: String,
}

/// Browser facing, so failures are answered with a readable message instead of JSON.
#[tracing::instrument(skip(state, params))]
async fn callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> axum::response::Response {
    match finish_link(&state, params).await {
        Ok(account) => (
            StatusCode::OK,
            state.catalog().format(
                "link.success",
                &[
                    ("game_name", account.game_name.as_str()),
                    ("tag_line", account.tag_line.as_str()),
                ],
            ),
        )
            .into_response(),
        Err(ApiError::BadRequest(reason)) => {
            tracing::info!("Rejected link callback: {}", reason);
            (
                StatusCode::BAD_REQUEST,
                state.catalog().format("link.invalid_state", &[]),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!("Completing account link: {}", e);
            (e.status(), state.catalog().format("link.failed", &[])).into_response()
        }
    }
}

async fn finish_link(
    state: &AppState,
    params: CallbackParams,
) -> Result<crate::models::LinkedAccount, ApiError> {
    let mut db_con = state.db().await?;

    // States are single use, consume it before talking to the provider
    let request: Option<crate::models::LinkRequest> = diesel::dsl::delete(
        crate::schema::link_requests::dsl::link_requests.find(&params.state),
    )
    .returning(crate::models::LinkRequest::as_returning())
    .get_result(&mut db_con)
    .await
    .optional()?;

    let request = match request {
        Some(r) if !r.is_expired(chrono::Utc::now()) => r,
        Some(_) => return Err(ApiError::BadRequest("link state expired".to_owned())),
        None => return Err(ApiError::BadRequest("unknown link state".to_owned())),
    };

    let token = state.oauth().exchange_code(&params.code).await?;
    let info = state.oauth().account(&token).await?;

    let account = crate::models::LinkedAccount {
        discord_id: request.discord_id,
        account_id: info.puuid,
        game_name: info.game_name,
        tag_line: info.tag_line,
    };

    let query = diesel::dsl::insert_into(crate::schema::linked_accounts::dsl::linked_accounts)
        .values(&account)
        .on_conflict(crate::schema::linked_accounts::dsl::discord_id)
        .do_update()
        .set((
            crate::schema::linked_accounts::dsl::account_id.eq(&account.account_id),
            crate::schema::linked_accounts::dsl::game_name.eq(&account.game_name),
            crate::schema::linked_accounts::dsl::tag_line.eq(&account.tag_line),
            crate::schema::linked_accounts::dsl::linked_at.eq(chrono::Utc::now()),
        ));
    tracing::debug!(?query, "Store linked account query");
    query.execute(&mut db_con).await?;

    tracing::info!(discord_id = %account.discord_id, "Linked account");

    Ok(account)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn states_are_random_alphanumeric() {
        let first = new_state();
        let second = new_state();

        assert_eq!(STATE_LENGTH, first.len());
        assert!(first.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(first, second);
    }
}
