pub mod messages;

/// One of the five fixed role slots a participant occupies in a match.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Lane {
    Top,
    Jungle,
    Middle,
    Bottom,
    Support,
}

impl Lane {
    pub const ALL: [Lane; 5] = [
        Lane::Top,
        Lane::Jungle,
        Lane::Middle,
        Lane::Bottom,
        Lane::Support,
    ];

    /// The stored/wire representation, e.g. `"MIDDLE"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Top => "TOP",
            Self::Jungle => "JUNGLE",
            Self::Middle => "MIDDLE",
            Self::Bottom => "BOTTOM",
            Self::Support => "SUPPORT",
        }
    }

    /// Message catalog key holding the display name of the lane.
    pub fn message_key(&self) -> &'static str {
        match self {
            Self::Top => "lane.top",
            Self::Jungle => "lane.jungle",
            Self::Middle => "lane.middle",
            Self::Bottom => "lane.bottom",
            Self::Support => "lane.support",
        }
    }
}

impl std::fmt::Display for Lane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Lane {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Lane::ALL
            .into_iter()
            .find(|lane| lane.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownVariant(s.to_owned()))
    }
}

/// One of the two fixed sides of a match.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Team {
    Blue,
    Red,
}

impl Team {
    pub const ALL: [Team; 2] = [Team::Blue, Team::Red];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blue => "BLUE",
            Self::Red => "RED",
        }
    }

    pub fn message_key(&self) -> &'static str {
        match self {
            Self::Blue => "team.blue",
            Self::Red => "team.red",
        }
    }
}

impl std::fmt::Display for Team {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Team {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Team::ALL
            .into_iter()
            .find(|team| team.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownVariant(s.to_owned()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown variant {0:?}")]
pub struct UnknownVariant(pub String);

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub starts_at: chrono::DateTime<chrono::Utc>,
    pub created_by: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct NewEvent {
    pub title: String,
    pub starts_at: chrono::DateTime<chrono::Utc>,
    pub created_by: String,
    pub created_by_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RolePreferences {
    pub name: String,
    pub primary: Lane,
    pub secondary: Lane,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LinkedAccount {
    pub account_id: String,
    pub game_name: String,
    pub tag_line: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UserProfile {
    pub discord_id: String,
    pub name: String,
    pub primary: Option<Lane>,
    pub secondary: Option<Lane>,
    pub linked_account: Option<LinkedAccount>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LinkRequest {
    pub url: String,
}

/// The name used for the linking user when they are not known yet.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StartLink {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RosterEntry {
    pub discord_id: String,
    pub name: String,
    pub lane: Lane,
    pub team: Team,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct NewMatchParticipant {
    pub discord_id: String,
    pub team: Team,
    pub win: bool,
    pub lane: Lane,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    pub cs: u32,
    pub gold: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MatchParticipant {
    pub id: i64,
    pub match_id: uuid::Uuid,
    pub discord_id: String,
    pub team: Team,
    pub win: bool,
    pub lane: Lane,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    pub cs: u32,
    pub gold: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Created {
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub database: bool,
}

/// Body of every non-success response of the store service.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Checks that the roster covers every (lane, team) pair exactly once.
pub fn is_complete_roster(entries: &[RosterEntry]) -> bool {
    if entries.len() != Lane::ALL.len() * Team::ALL.len() {
        return false;
    }

    let slots: std::collections::HashSet<(Lane, Team)> =
        entries.iter().map(|e| (e.lane, e.team)).collect();
    let players: std::collections::HashSet<&str> =
        entries.iter().map(|e| e.discord_id.as_str()).collect();

    slots.len() == entries.len() && players.len() == entries.len()
}
