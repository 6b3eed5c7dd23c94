use diesel::prelude::*;

use crate::error::ApiError;

#[derive(Queryable, Selectable, Insertable, Debug)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub discord_id: String,
    pub name: String,
    pub primary_lane: Option<String>,
    pub secondary_lane: Option<String>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser<'a> {
    pub discord_id: &'a str,
    pub name: &'a str,
}

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = crate::schema::events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub starts_at: chrono::DateTime<chrono::Utc>,
    pub created_by: String,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::events)]
pub struct NewEvent<'a> {
    pub title: &'a str,
    pub starts_at: chrono::DateTime<chrono::Utc>,
    pub created_by: &'a str,
}

impl From<Event> for common::Event {
    fn from(value: Event) -> Self {
        Self {
            id: value.id,
            title: value.title,
            starts_at: value.starts_at,
            created_by: value.created_by,
        }
    }
}

#[derive(Queryable, Selectable, Insertable, Debug)]
#[diesel(table_name = crate::schema::linked_accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct LinkedAccount {
    pub discord_id: String,
    pub account_id: String,
    pub game_name: String,
    pub tag_line: String,
}

impl From<LinkedAccount> for common::LinkedAccount {
    fn from(value: LinkedAccount) -> Self {
        Self {
            account_id: value.account_id,
            game_name: value.game_name,
            tag_line: value.tag_line,
        }
    }
}

#[derive(Queryable, Selectable, Insertable, Debug)]
#[diesel(table_name = crate::schema::link_requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct LinkRequest {
    pub state: String,
    pub discord_id: String,
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

impl LinkRequest {
    pub fn is_expired(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        self.expires_at <= now
    }
}

#[derive(Queryable, Selectable, Insertable, Debug)]
#[diesel(table_name = crate::schema::roster_entries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RosterEntry {
    pub lane: String,
    pub team: String,
    pub discord_id: String,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::matches)]
pub struct NewMatch {
    pub id: uuid::Uuid,
}

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = crate::schema::match_participants)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MatchParticipant {
    pub id: i64,
    pub match_id: uuid::Uuid,
    pub discord_id: String,
    pub team: String,
    pub win: bool,
    pub lane: String,
    pub kills: i32,
    pub deaths: i32,
    pub assists: i32,
    pub cs: i32,
    pub gold: i32,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::match_participants)]
pub struct NewMatchParticipant<'a> {
    pub match_id: uuid::Uuid,
    pub discord_id: &'a str,
    pub team: &'static str,
    pub win: bool,
    pub lane: &'static str,
    pub kills: i32,
    pub deaths: i32,
    pub assists: i32,
    pub cs: i32,
    pub gold: i32,
}

impl<'a> NewMatchParticipant<'a> {
    pub fn from_request(
        match_id: uuid::Uuid,
        request: &'a common::NewMatchParticipant,
    ) -> Result<Self, ApiError> {
        Ok(Self {
            match_id,
            discord_id: &request.discord_id,
            team: request.team.as_str(),
            win: request.win,
            lane: request.lane.as_str(),
            kills: stat_column("kills", request.kills)?,
            deaths: stat_column("deaths", request.deaths)?,
            assists: stat_column("assists", request.assists)?,
            cs: stat_column("cs", request.cs)?,
            gold: stat_column("gold", request.gold)?,
        })
    }
}

fn stat_column(name: &str, value: u32) -> Result<i32, ApiError> {
    i32::try_from(value).map_err(|_| ApiError::BadRequest(format!("{} is out of range", name)))
}

fn stored_column(value: i32) -> Result<u32, ApiError> {
    u32::try_from(value).map_err(|_| ApiError::Corrupt(format!("negative stat {}", value)))
}

pub fn parse_lane(value: &str) -> Result<common::Lane, ApiError> {
    value
        .parse()
        .map_err(|e: common::UnknownVariant| ApiError::Corrupt(e.to_string()))
}

pub fn parse_team(value: &str) -> Result<common::Team, ApiError> {
    value
        .parse()
        .map_err(|e: common::UnknownVariant| ApiError::Corrupt(e.to_string()))
}

impl TryFrom<MatchParticipant> for common::MatchParticipant {
    type Error = ApiError;

    fn try_from(value: MatchParticipant) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id,
            match_id: value.match_id,
            team: parse_team(&value.team)?,
            lane: parse_lane(&value.lane)?,
            discord_id: value.discord_id,
            win: value.win,
            kills: stored_column(value.kills)?,
            deaths: stored_column(value.deaths)?,
            assists: stored_column(value.assists)?,
            cs: stored_column(value.cs)?,
            gold: stored_column(value.gold)?,
        })
    }
}
