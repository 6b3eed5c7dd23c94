use axum::extract::State;
use diesel::prelude::*;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::{ApiError, AppState};

pub fn router(state: AppState) -> axum::Router {
    axum::Router::new()
        .route("/", axum::routing::get(active).put(replace))
        .with_state(state)
}

/// Orders the roster blue side first, each side in lane order.
fn sort_roster(entries: &mut [common::RosterEntry]) {
    entries.sort_by_key(|entry| (entry.team, entry.lane));
}

#[tracing::instrument(skip(state))]
async fn active(
    State(state): State<AppState>,
) -> Result<axum::Json<Vec<common::RosterEntry>>, ApiError> {
    let query = crate::schema::roster_entries::dsl::roster_entries
        .inner_join(crate::schema::users::dsl::users)
        .select((
            crate::models::RosterEntry::as_select(),
            crate::schema::users::dsl::name,
        ));

    let rows: Vec<(crate::models::RosterEntry, String)> =
        query.load(&mut state.db().await?).await?;

    let mut entries = rows
        .into_iter()
        .map(|(entry, name)| {
            Ok(common::RosterEntry {
                lane: crate::models::parse_lane(&entry.lane)?,
                team: crate::models::parse_team(&entry.team)?,
                discord_id: entry.discord_id,
                name,
            })
        })
        .collect::<Result<Vec<_>, ApiError>>()?;
    sort_roster(&mut entries);

    Ok(axum::Json(entries))
}

#[tracing::instrument(skip(state, entries))]
async fn replace(
    State(state): State<AppState>,
    axum::Json(entries): axum::Json<Vec<common::RosterEntry>>,
) -> Result<axum::http::StatusCode, ApiError> {
    if !common::is_complete_roster(&entries) {
        return Err(ApiError::BadRequest(
            "roster must hold one player per lane and team".to_owned(),
        ));
    }

    let mut db_con = state.db().await?;

    db_con
        .transaction::<_, ApiError, _>(|con| {
            Box::pin(async move {
                for entry in entries.iter() {
                    super::users::upsert_user(con, &entry.discord_id, &entry.name).await?;
                }

                diesel::dsl::delete(crate::schema::roster_entries::dsl::roster_entries)
                    .execute(con)
                    .await?;

                let rows: Vec<crate::models::RosterEntry> = entries
                    .iter()
                    .map(|entry| crate::models::RosterEntry {
                        lane: entry.lane.as_str().to_owned(),
                        team: entry.team.as_str().to_owned(),
                        discord_id: entry.discord_id.clone(),
                    })
                    .collect();

                diesel::dsl::insert_into(crate::schema::roster_entries::dsl::roster_entries)
                    .values(&rows)
                    .execute(con)
                    .await?;

                Ok(())
            })
        })
        .await?;

    tracing::info!("Replaced active roster");

    Ok(axum::http::StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{Lane, Team};

    fn entry(team: Team, lane: Lane) -> common::RosterEntry {
        common::RosterEntry {
            discord_id: format!("{}-{}", team, lane),
            name: String::new(),
            lane,
            team,
        }
    }

    #[test]
    fn roster_order() {
        let mut entries = vec![
            entry(Team::Red, Lane::Top),
            entry(Team::Blue, Lane::Support),
            entry(Team::Blue, Lane::Top),
            entry(Team::Red, Lane::Jungle),
        ];
        sort_roster(&mut entries);

        let order: Vec<_> = entries.iter().map(|e| (e.team, e.lane)).collect();
        assert_eq!(
            vec![
                (Team::Blue, Lane::Top),
                (Team::Blue, Lane::Support),
                (Team::Red, Lane::Top),
                (Team::Red, Lane::Jungle),
            ],
            order
        );
    }
}
