use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use bot::api::ApiError;
use bot::conversation::{Choice, Conversation, Reply, TransportError};
use bot::recording::{self, MatchStore, RecordingOutcome, RecordingSettings};
use common::messages::Catalog;
use common::{Lane, NewMatchParticipant, RosterEntry, Team};
use pretty_assertions::assert_eq;

/// Plays back scripted replies. An exhausted script behaves like a closed reply window.
#[derive(Default)]
struct ScriptedConversation {
    replies: Mutex<VecDeque<Option<String>>>,
    choice: Option<Choice>,
    broken_replies: bool,
    broken_acknowledge: bool,

    next_id: AtomicU64,
    shown: Mutex<Vec<String>>,
    notices: Mutex<Vec<String>>,
    discarded: Mutex<Vec<u64>>,
    summaries: Mutex<Vec<String>>,
}

impl ScriptedConversation {
    fn new(replies: VecDeque<Option<String>>, choice: Option<Choice>) -> Self {
        Self {
            replies: Mutex::new(replies),
            choice,
            ..Default::default()
        }
    }

    fn shown(&self) -> Vec<String> {
        self.shown.lock().unwrap().clone()
    }

    fn notices(&self) -> Vec<String> {
        self.notices.lock().unwrap().clone()
    }

    fn last_shown(&self) -> Option<String> {
        self.shown.lock().unwrap().last().cloned()
    }

    fn remaining_replies(&self) -> usize {
        self.replies.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl Conversation for ScriptedConversation {
    async fn acknowledge(&self) -> Result<(), TransportError> {
        if self.broken_acknowledge {
            return Err(TransportError::Unavailable("acknowledge".to_owned()));
        }
        Ok(())
    }

    async fn show(&self, content: &str) -> Result<(), TransportError> {
        self.shown.lock().unwrap().push(content.to_owned());
        Ok(())
    }

    async fn next_reply(&self, _timeout: Duration) -> Result<Option<Reply>, TransportError> {
        if self.broken_replies {
            return Err(TransportError::Unavailable("gateway closed".to_owned()));
        }

        let next = self.replies.lock().unwrap().pop_front().flatten();
        Ok(next.map(|content| Reply {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            content,
        }))
    }

    async fn discard(&self, reply: &Reply) {
        self.discarded.lock().unwrap().push(reply.id);
    }

    async fn notify(&self, content: &str, _lifetime: Duration) -> Result<(), TransportError> {
        self.notices.lock().unwrap().push(content.to_owned());
        Ok(())
    }

    async fn choose(
        &self,
        content: &str,
        _confirm_label: &str,
        _cancel_label: &str,
        _timeout: Duration,
    ) -> Result<Option<Choice>, TransportError> {
        self.summaries.lock().unwrap().push(content.to_owned());
        Ok(self.choice)
    }
}

#[derive(Default)]
struct MemoryStore {
    roster: Vec<RosterEntry>,
    rejected: Vec<String>,
    attempts: Mutex<Vec<(uuid::Uuid, NewMatchParticipant)>>,
}

impl MemoryStore {
    fn with_roster(roster: Vec<RosterEntry>) -> Self {
        Self {
            roster,
            ..Default::default()
        }
    }

    fn attempts(&self) -> Vec<(uuid::Uuid, NewMatchParticipant)> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl MatchStore for MemoryStore {
    async fn active_roster(&self) -> Result<Vec<RosterEntry>, ApiError> {
        Ok(self.roster.clone())
    }

    async fn create_match_participant(
        &self,
        match_id: uuid::Uuid,
        participant: &NewMatchParticipant,
    ) -> Result<common::Created, ApiError> {
        let mut attempts = self.attempts.lock().unwrap();
        attempts.push((match_id, participant.clone()));

        if self.rejected.contains(&participant.discord_id) {
            return Err(ApiError::Rejected("participant rejected".to_owned()));
        }
        Ok(common::Created {
            id: attempts.len() as i64,
        })
    }
}

fn roster() -> Vec<RosterEntry> {
    Team::ALL
        .into_iter()
        .flat_map(|team| {
            Lane::ALL.into_iter().map(move |lane| RosterEntry {
                discord_id: format!("{}-{}", team.as_str(), lane.as_str()).to_lowercase(),
                name: format!("{:?} {:?}", team, lane),
                lane,
                team,
            })
        })
        .collect()
}

/// Player `i` goes `i/1/2` with `100 + i` creep score and `10000 + i` gold.
fn valid_replies() -> VecDeque<Option<String>> {
    (0..10)
        .flat_map(|i| {
            [
                Some(format!("{}/1/2", i)),
                Some(format!("{}", 100 + i)),
                Some(format!("{}", 10_000 + i)),
            ]
        })
        .collect()
}

async fn record(
    conversation: &ScriptedConversation,
    store: &MemoryStore,
    winner: Team,
) -> RecordingOutcome {
    recording::record_match(
        conversation,
        store,
        &Catalog::builtin(),
        &RecordingSettings::default(),
        winner,
    )
    .await
}

#[tokio::test]
async fn records_every_participant_under_one_match() {
    let conversation = ScriptedConversation::new(valid_replies(), Some(Choice::Confirm));
    let store = MemoryStore::with_roster(roster());

    let outcome = record(&conversation, &store, Team::Blue).await;

    let match_id = match outcome {
        RecordingOutcome::Submitted {
            match_id,
            submitted,
            failed,
        } => {
            assert_eq!(10, submitted);
            assert_eq!(0, failed);
            match_id
        }
        other => panic!("unexpected outcome {:?}", other),
    };

    let attempts = store.attempts();
    assert_eq!(10, attempts.len());
    assert!(attempts.iter().all(|(id, _)| *id == match_id));

    let order: Vec<_> = attempts
        .iter()
        .map(|(_, p)| p.discord_id.clone())
        .collect();
    let expected: Vec<_> = roster().into_iter().map(|e| e.discord_id).collect();
    assert_eq!(expected, order);

    for (index, (_, participant)) in attempts.iter().enumerate() {
        assert_eq!(participant.team == Team::Blue, participant.win);
        assert_eq!(index as u32, participant.kills);
        assert_eq!(1, participant.deaths);
        assert_eq!(2, participant.assists);
        assert_eq!(100 + index as u32, participant.cs);
        assert_eq!(10_000 + index as u32, participant.gold);
    }

    assert!(conversation.notices().is_empty());
    assert_eq!(30, conversation.discarded.lock().unwrap().len());
    assert_eq!(1, conversation.summaries.lock().unwrap().len());

    let catalog = Catalog::builtin();
    let match_id = match_id.to_string();
    assert_eq!(
        Some(catalog.format(
            "match.done",
            &[("match_id", match_id.as_str()), ("count", "10")]
        )),
        conversation.last_shown()
    );
}

#[tokio::test]
async fn red_side_wins() {
    let conversation = ScriptedConversation::new(valid_replies(), Some(Choice::Confirm));
    let store = MemoryStore::with_roster(roster());

    record(&conversation, &store, Team::Red).await;

    let attempts = store.attempts();
    assert_eq!(10, attempts.len());
    for (_, participant) in attempts {
        assert_eq!(participant.team == Team::Red, participant.win);
    }
}

#[tokio::test]
async fn malformed_reply_is_asked_again() {
    let mut replies = valid_replies();
    replies[0] = Some("10/1/1".to_owned());
    replies.push_front(Some("abc".to_owned()));

    let conversation = ScriptedConversation::new(replies, Some(Choice::Confirm));
    let store = MemoryStore::with_roster(roster());

    let outcome = record(&conversation, &store, Team::Blue).await;
    assert!(matches!(
        outcome,
        RecordingOutcome::Submitted { submitted: 10, failed: 0, .. }
    ));

    let notices = conversation.notices();
    assert_eq!(1, notices.len());
    assert!(notices[0].contains("`abc`"), "notice {:?}", notices[0]);

    // The same prompt is shown again after the notice
    let shown = conversation.shown();
    assert_eq!(shown[0], shown[1]);

    let attempts = store.attempts();
    assert_eq!(10, attempts.len());
    assert_eq!(10, attempts[0].1.kills);
    assert_eq!(1, attempts[0].1.deaths);
    assert_eq!(1, attempts[0].1.assists);

    // Malformed replies are removed from the channel too
    assert_eq!(31, conversation.discarded.lock().unwrap().len());
}

#[tokio::test]
async fn every_malformed_number_gets_its_own_notice() {
    let malformed = ["abc", "12.5", "-3", "1/2/3"];

    // Player 0's creep score is the second reply
    let mut replies = valid_replies();
    for (offset, input) in malformed.iter().enumerate() {
        replies.insert(1 + offset, Some((*input).to_owned()));
    }

    let conversation = ScriptedConversation::new(replies, Some(Choice::Confirm));
    let store = MemoryStore::with_roster(roster());

    let outcome = record(&conversation, &store, Team::Blue).await;
    assert!(matches!(
        outcome,
        RecordingOutcome::Submitted { submitted: 10, failed: 0, .. }
    ));

    let catalog = Catalog::builtin();
    let expected: Vec<_> = malformed
        .iter()
        .map(|input| catalog.format("match.invalid.number", &[("input", *input)]))
        .collect();
    assert_eq!(expected, conversation.notices());

    let cs_prompt = conversation.shown()[1].clone();
    let cs_prompts = conversation
        .shown()
        .iter()
        .filter(|shown| **shown == cs_prompt)
        .count();
    assert_eq!(malformed.len() + 1, cs_prompts);

    assert_eq!(100, store.attempts()[0].1.cs);
}

#[tokio::test]
async fn gold_beyond_the_stored_range_is_asked_again() {
    // Player 0's gold is the third reply
    let mut replies = valid_replies();
    replies.insert(2, Some("3000000000".to_owned()));

    let conversation = ScriptedConversation::new(replies, Some(Choice::Confirm));
    let store = MemoryStore::with_roster(roster());

    let outcome = record(&conversation, &store, Team::Blue).await;
    assert!(matches!(
        outcome,
        RecordingOutcome::Submitted { submitted: 10, failed: 0, .. }
    ));

    assert_eq!(
        vec![Catalog::builtin().format("match.invalid.number", &[("input", "3000000000")])],
        conversation.notices()
    );

    let attempts = store.attempts();
    assert_eq!(10_000, attempts[0].1.gold);
    assert!(attempts
        .iter()
        .all(|(_, participant)| i32::try_from(participant.gold).is_ok()));

    let summaries = conversation.summaries.lock().unwrap();
    assert!(!summaries[0].contains("3000000000"));
}

#[tokio::test]
async fn unanswered_prompt_submits_nothing() {
    let replies: VecDeque<_> = vec![Some("1/2/3".to_owned()), Some("100".to_owned()), None].into();
    let conversation = ScriptedConversation::new(replies, Some(Choice::Confirm));
    let store = MemoryStore::with_roster(roster());

    let outcome = record(&conversation, &store, Team::Blue).await;

    assert_eq!(RecordingOutcome::Abandoned, outcome);
    assert!(store.attempts().is_empty());
    assert!(conversation.summaries.lock().unwrap().is_empty());
}

#[tokio::test]
async fn late_timeout_submits_nothing() {
    let mut replies = valid_replies();
    replies.truncate(29);

    let conversation = ScriptedConversation::new(replies, Some(Choice::Confirm));
    let store = MemoryStore::with_roster(roster());

    let outcome = record(&conversation, &store, Team::Blue).await;

    assert_eq!(RecordingOutcome::Abandoned, outcome);
    assert!(store.attempts().is_empty());
}

#[tokio::test]
async fn cancelled_summary_submits_nothing() {
    let conversation = ScriptedConversation::new(valid_replies(), Some(Choice::Cancel));
    let store = MemoryStore::with_roster(roster());

    let outcome = record(&conversation, &store, Team::Blue).await;

    assert_eq!(RecordingOutcome::Cancelled, outcome);
    assert!(store.attempts().is_empty());
    assert_eq!(
        Some(Catalog::builtin().format("match.cancelled", &[])),
        conversation.last_shown()
    );
}

#[tokio::test]
async fn unconfirmed_summary_submits_nothing() {
    let conversation = ScriptedConversation::new(valid_replies(), None);
    let store = MemoryStore::with_roster(roster());

    let outcome = record(&conversation, &store, Team::Blue).await;

    assert_eq!(RecordingOutcome::ConfirmationExpired, outcome);
    assert!(store.attempts().is_empty());
    assert_eq!(
        Some(Catalog::builtin().format("match.timeout", &[])),
        conversation.last_shown()
    );
}

#[tokio::test]
async fn summary_lists_every_participant() {
    let conversation = ScriptedConversation::new(valid_replies(), Some(Choice::Cancel));
    let store = MemoryStore::with_roster(roster());

    record(&conversation, &store, Team::Red).await;

    let summaries = conversation.summaries.lock().unwrap();
    let lines: Vec<_> = summaries[0].lines().collect();
    assert_eq!(11, lines.len());
    assert!(lines[0].contains("Red"));
    assert!(lines[1].contains("Blue Top"));
    assert!(lines[1].contains("0/1/2"));
    assert!(lines[10].contains("10009"));
}

#[tokio::test]
async fn incomplete_roster_is_refused() {
    let mut entries = roster();
    entries.pop();

    let conversation = ScriptedConversation::new(valid_replies(), Some(Choice::Confirm));
    let store = MemoryStore::with_roster(entries);

    let outcome = record(&conversation, &store, Team::Blue).await;

    assert_eq!(RecordingOutcome::RosterIncomplete, outcome);
    assert_eq!(
        vec![Catalog::builtin().format("match.roster_incomplete", &[])],
        conversation.shown()
    );
    assert_eq!(30, conversation.remaining_replies());
}

#[tokio::test]
#[tracing_test::traced_test]
async fn rejected_participant_does_not_stop_the_rest() {
    let conversation = ScriptedConversation::new(valid_replies(), Some(Choice::Confirm));
    let store = MemoryStore {
        roster: roster(),
        rejected: vec!["blue-jungle".to_owned()],
        ..Default::default()
    };

    let outcome = record(&conversation, &store, Team::Blue).await;

    let match_id = match outcome {
        RecordingOutcome::Submitted {
            match_id,
            submitted,
            failed,
        } => {
            assert_eq!(9, submitted);
            assert_eq!(1, failed);
            match_id
        }
        other => panic!("unexpected outcome {:?}", other),
    };

    assert_eq!(10, store.attempts().len());
    assert!(logs_contain("Submitting participant"));

    let match_id = match_id.to_string();
    assert_eq!(
        Some(Catalog::builtin().format(
            "match.done_with_failures",
            &[
                ("match_id", match_id.as_str()),
                ("count", "10"),
                ("failed", "1"),
            ]
        )),
        conversation.last_shown()
    );
}

#[tokio::test]
async fn transport_failure_shows_generic_error() {
    let conversation = ScriptedConversation {
        broken_replies: true,
        ..ScriptedConversation::new(valid_replies(), Some(Choice::Confirm))
    };
    let store = MemoryStore::with_roster(roster());

    let outcome = record(&conversation, &store, Team::Blue).await;

    assert_eq!(RecordingOutcome::Failed, outcome);
    assert!(store.attempts().is_empty());
    assert_eq!(
        Some(Catalog::builtin().format("error.generic", &[])),
        conversation.last_shown()
    );
}

#[tokio::test]
async fn failed_acknowledgement_stops_immediately() {
    let conversation = ScriptedConversation {
        broken_acknowledge: true,
        ..ScriptedConversation::new(valid_replies(), Some(Choice::Confirm))
    };
    let store = MemoryStore::with_roster(roster());

    let outcome = record(&conversation, &store, Team::Blue).await;

    assert_eq!(RecordingOutcome::Failed, outcome);
    assert!(conversation.shown().is_empty());
    assert_eq!(30, conversation.remaining_replies());
}
