//! Recording the result of a custom game.
//!
//! The invoking user is asked for every stat of every roster participant, one
//! after the other, then shown a summary to confirm. Only a confirmed summary is
//! submitted, one participant at a time in roster order, all under one freshly
//! minted match id. Any prompt running out of time ends the run without
//! submitting anything.

use std::time::Duration;

use common::messages::Catalog;
use common::{RosterEntry, Team};

use crate::api::ApiError;
use crate::conversation::{Choice, Conversation, TransportError};

pub mod collect;

pub use collect::{collect_stat, CollectionSettings, Kda, Prompted, StatPrompt};

/// Where the roster comes from and where results go.
#[async_trait::async_trait]
pub trait MatchStore: Send + Sync {
    async fn active_roster(&self) -> Result<Vec<RosterEntry>, ApiError>;

    async fn create_match_participant(
        &self,
        match_id: uuid::Uuid,
        participant: &common::NewMatchParticipant,
    ) -> Result<common::Created, ApiError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordingSettings {
    pub reply_timeout: Duration,
    pub confirm_timeout: Duration,
    pub notice_lifetime: Duration,
}

impl Default for RecordingSettings {
    fn default() -> Self {
        Self {
            reply_timeout: Duration::from_secs(60),
            confirm_timeout: Duration::from_secs(60),
            notice_lifetime: Duration::from_secs(5),
        }
    }
}

impl RecordingSettings {
    fn collection(&self) -> CollectionSettings {
        CollectionSettings {
            reply_timeout: self.reply_timeout,
            notice_lifetime: self.notice_lifetime,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerStats {
    pub kda: Kda,
    pub cs: u32,
    pub gold: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordingOutcome {
    /// Confirmed and submitted. `failed` participants were rejected by the store.
    Submitted {
        match_id: uuid::Uuid,
        submitted: usize,
        failed: usize,
    },
    Cancelled,
    ConfirmationExpired,
    /// A stat prompt went unanswered.
    Abandoned,
    RosterIncomplete,
    Failed,
}

#[derive(Debug, thiserror::Error)]
pub enum RecordingError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("store: {0}")]
    Store(#[from] ApiError),
}

/// Runs one complete recording for `winner`.
///
/// Errors are handled here: the user gets a generic notice if the interaction was
/// acknowledged, and the run ends as [`RecordingOutcome::Failed`].
#[tracing::instrument(skip(conversation, store, catalog, settings))]
pub async fn record_match<C, S>(
    conversation: &C,
    store: &S,
    catalog: &Catalog,
    settings: &RecordingSettings,
    winner: Team,
) -> RecordingOutcome
where
    C: Conversation + ?Sized,
    S: MatchStore + ?Sized,
{
    if let Err(e) = conversation.acknowledge().await {
        tracing::error!("Acknowledging match recording: {}", e);
        return RecordingOutcome::Failed;
    }

    match run(conversation, store, catalog, settings, winner).await {
        Ok(outcome) => {
            tracing::info!(?outcome, "Match recording finished");
            outcome
        }
        Err(e) => {
            tracing::error!("Match recording failed: {}", e);
            if let Err(e) = conversation
                .show(&catalog.format("error.generic", &[]))
                .await
            {
                tracing::warn!("Reporting failure: {}", e);
            }
            RecordingOutcome::Failed
        }
    }
}

async fn run<C, S>(
    conversation: &C,
    store: &S,
    catalog: &Catalog,
    settings: &RecordingSettings,
    winner: Team,
) -> Result<RecordingOutcome, RecordingError>
where
    C: Conversation + ?Sized,
    S: MatchStore + ?Sized,
{
    let roster = store.active_roster().await?;
    if !common::is_complete_roster(&roster) {
        tracing::info!(players = roster.len(), "Roster is not complete");
        conversation
            .show(&catalog.format("match.roster_incomplete", &[]))
            .await?;
        return Ok(RecordingOutcome::RosterIncomplete);
    }

    let mut collected = Vec::with_capacity(roster.len());
    for participant in roster {
        match collect_player(conversation, catalog, settings, &participant).await? {
            Prompted::Answered(stats) => collected.push((participant, stats)),
            Prompted::Expired => {
                tracing::info!(discord_id = %participant.discord_id, "Abandoning recording");
                return Ok(RecordingOutcome::Abandoned);
            }
        }
    }

    let choice = conversation
        .choose(
            &render_summary(catalog, winner, &collected),
            &catalog.format("match.button.confirm", &[]),
            &catalog.format("match.button.cancel", &[]),
            settings.confirm_timeout,
        )
        .await?;

    match choice {
        Some(Choice::Confirm) => {}
        Some(Choice::Cancel) => {
            conversation
                .show(&catalog.format("match.cancelled", &[]))
                .await?;
            return Ok(RecordingOutcome::Cancelled);
        }
        None => {
            conversation
                .show(&catalog.format("match.timeout", &[]))
                .await?;
            return Ok(RecordingOutcome::ConfirmationExpired);
        }
    }

    let match_id = uuid::Uuid::new_v4();
    let failed = submit(store, match_id, winner, &collected).await;
    let submitted = collected.len() - failed;

    let count = collected.len().to_string();
    let failed_count = failed.to_string();
    let match_id_text = match_id.to_string();
    let done = if failed == 0 {
        catalog.format(
            "match.done",
            &[("match_id", match_id_text.as_str()), ("count", count.as_str())],
        )
    } else {
        catalog.format(
            "match.done_with_failures",
            &[
                ("match_id", match_id_text.as_str()),
                ("count", count.as_str()),
                ("failed", failed_count.as_str()),
            ],
        )
    };
    conversation.show(&done).await?;

    Ok(RecordingOutcome::Submitted {
        match_id,
        submitted,
        failed,
    })
}

/// KDA, creep score and gold for one participant, in that order.
async fn collect_player<C>(
    conversation: &C,
    catalog: &Catalog,
    settings: &RecordingSettings,
    participant: &RosterEntry,
) -> Result<Prompted<PlayerStats>, TransportError>
where
    C: Conversation + ?Sized,
{
    let lane = catalog.format(participant.lane.message_key(), &[]);
    let team = catalog.format(participant.team.message_key(), &[]);
    let replacements = [
        ("player", participant.name.as_str()),
        ("lane", lane.as_str()),
        ("team", team.as_str()),
    ];
    let collection = settings.collection();

    let kda = match collect_stat(
        conversation,
        catalog,
        &StatPrompt::kda(),
        &replacements,
        &collection,
    )
    .await?
    {
        Prompted::Answered(kda) => kda,
        Prompted::Expired => return Ok(Prompted::Expired),
    };
    let cs = match collect_stat(
        conversation,
        catalog,
        &StatPrompt::creep_score(),
        &replacements,
        &collection,
    )
    .await?
    {
        Prompted::Answered(cs) => cs,
        Prompted::Expired => return Ok(Prompted::Expired),
    };
    let gold = match collect_stat(
        conversation,
        catalog,
        &StatPrompt::gold(),
        &replacements,
        &collection,
    )
    .await?
    {
        Prompted::Answered(gold) => gold,
        Prompted::Expired => return Ok(Prompted::Expired),
    };

    Ok(Prompted::Answered(PlayerStats { kda, cs, gold }))
}

pub fn render_summary(
    catalog: &Catalog,
    winner: Team,
    collected: &[(RosterEntry, PlayerStats)],
) -> String {
    let mut lines = Vec::with_capacity(collected.len() + 1);
    let winner_name = catalog.format(winner.message_key(), &[]);
    lines.push(catalog.format("match.summary.header", &[("team", winner_name.as_str())]));

    for (participant, stats) in collected {
        let lane = catalog.format(participant.lane.message_key(), &[]);
        let kills = stats.kda.kills.to_string();
        let deaths = stats.kda.deaths.to_string();
        let assists = stats.kda.assists.to_string();
        let cs = stats.cs.to_string();
        let gold = stats.gold.to_string();

        lines.push(catalog.format(
            "match.summary.line",
            &[
                ("player", participant.name.as_str()),
                ("lane", lane.as_str()),
                ("kills", kills.as_str()),
                ("deaths", deaths.as_str()),
                ("assists", assists.as_str()),
                ("cs", cs.as_str()),
                ("gold", gold.as_str()),
            ],
        ));
    }

    lines.join("\n")
}

pub fn to_submission(
    participant: &RosterEntry,
    stats: &PlayerStats,
    winner: Team,
) -> common::NewMatchParticipant {
    common::NewMatchParticipant {
        discord_id: participant.discord_id.clone(),
        team: participant.team,
        win: participant.team == winner,
        lane: participant.lane,
        kills: stats.kda.kills,
        deaths: stats.kda.deaths,
        assists: stats.kda.assists,
        cs: stats.cs,
        gold: stats.gold,
    }
}

/// Submits sequentially in roster order and returns how many were rejected.
///
/// A rejected participant does not stop the others and nothing is retried.
async fn submit<S>(
    store: &S,
    match_id: uuid::Uuid,
    winner: Team,
    collected: &[(RosterEntry, PlayerStats)],
) -> usize
where
    S: MatchStore + ?Sized,
{
    let mut failed = 0;

    for (participant, stats) in collected {
        let submission = to_submission(participant, stats, winner);
        match store.create_match_participant(match_id, &submission).await {
            Ok(created) => {
                tracing::debug!(
                    id = created.id,
                    discord_id = %participant.discord_id,
                    "Submitted participant"
                );
            }
            Err(e) => {
                tracing::warn!(
                    discord_id = %participant.discord_id,
                    "Submitting participant: {}",
                    e
                );
                failed += 1;
            }
        }
    }

    failed
}
