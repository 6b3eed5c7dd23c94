//! Random team split with lanes assigned by preference.

use common::{Lane, RosterEntry, Team};
use rand::seq::SliceRandom;

pub const PLAYER_COUNT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub discord_id: String,
    pub name: String,
    pub primary: Option<Lane>,
    pub secondary: Option<Lane>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SplitError {
    #[error("expected 10 players, got {0}")]
    WrongPlayerCount(usize),
    #[error("player {0} is listed twice")]
    DuplicatePlayer(String),
}

/// Shuffles the players into two teams of five and gives every player a lane.
///
/// The returned roster is ordered blue side first, each side in lane order.
pub fn split<R>(mut players: Vec<Player>, rng: &mut R) -> Result<Vec<RosterEntry>, SplitError>
where
    R: rand::Rng + ?Sized,
{
    if players.len() != PLAYER_COUNT {
        return Err(SplitError::WrongPlayerCount(players.len()));
    }

    let mut seen = std::collections::HashSet::with_capacity(players.len());
    for player in players.iter() {
        if !seen.insert(player.discord_id.as_str()) {
            return Err(SplitError::DuplicatePlayer(player.discord_id.clone()));
        }
    }

    players.shuffle(rng);
    let red = players.split_off(PLAYER_COUNT / 2);

    let mut roster = assign_lanes(Team::Blue, players);
    roster.extend(assign_lanes(Team::Red, red));

    Ok(roster)
}

fn assign_lanes(team: Team, players: Vec<Player>) -> Vec<RosterEntry> {
    let mut free: Vec<Lane> = Lane::ALL.to_vec();
    let mut assigned: Vec<(Lane, Player)> = Vec::with_capacity(players.len());
    let mut waiting = players;

    let preferences: [fn(&Player) -> Option<Lane>; 2] = [|p| p.primary, |p| p.secondary];
    for preference in preferences {
        let mut unassigned = Vec::with_capacity(waiting.len());

        for player in waiting {
            match preference(&player).filter(|lane| free.contains(lane)) {
                Some(lane) => {
                    free.retain(|l| *l != lane);
                    assigned.push((lane, player));
                }
                None => unassigned.push(player),
            }
        }

        waiting = unassigned;
    }

    assigned.extend(free.into_iter().zip(waiting));
    assigned.sort_by_key(|(lane, _)| *lane);

    assigned
        .into_iter()
        .map(|(lane, player)| RosterEntry {
            discord_id: player.discord_id,
            name: player.name,
            lane,
            team,
        })
        .collect()
}
