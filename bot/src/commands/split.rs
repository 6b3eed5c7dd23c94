use serenity::all::{CommandInteraction, Context, CreateCommand, EditInteractionResponse, UserId};

use super::{api_failure, lane_name, respond};
use crate::handler::Handler;
use crate::teams::{self, Player, PLAYER_COUNT};
use common::{RosterEntry, Team};

pub fn register() -> CreateCommand {
    CreateCommand::new("split")
        .description("Split the players in your voice channel into two teams")
}

pub async fn run(
    ctx: &Context,
    command: &CommandInteraction,
    handler: &Handler,
) -> Result<(), serenity::Error> {
    let catalog = &handler.catalog;

    let members = match voice_channel_members(ctx, command) {
        Some(m) => m,
        None => {
            return respond(ctx, command, catalog.format("split.not_in_voice", &[]), true).await
        }
    };
    if members.len() != PLAYER_COUNT {
        let count = members.len().to_string();
        return respond(
            ctx,
            command,
            catalog.format("split.wrong_count", &[("count", count.as_str())]),
            true,
        )
        .await;
    }

    // Looking up every player takes longer than the initial response window
    command.defer(&ctx.http).await?;

    let content = match build_roster(handler, members).await {
        Ok(roster) => render_teams(handler, &roster),
        Err(message) => message,
    };

    command
        .edit_response(&ctx.http, EditInteractionResponse::new().content(content))
        .await?;

    Ok(())
}

/// Everyone in the invoking user's voice channel, from the cache.
fn voice_channel_members(
    ctx: &Context,
    command: &CommandInteraction,
) -> Option<Vec<(UserId, String)>> {
    let guild_id = command.guild_id?;
    let guild = ctx.cache.guild(guild_id)?;
    let channel = guild.voice_states.get(&command.user.id)?.channel_id?;

    let members = guild
        .voice_states
        .values()
        .filter(|state| state.channel_id == Some(channel))
        .map(|state| {
            let name = state
                .member
                .as_ref()
                .or_else(|| guild.members.get(&state.user_id))
                .map(|member| member.display_name().to_owned())
                .unwrap_or_else(|| state.user_id.to_string());
            (state.user_id, name)
        })
        .collect();

    Some(members)
}

async fn build_roster(
    handler: &Handler,
    members: Vec<(UserId, String)>,
) -> Result<Vec<RosterEntry>, String> {
    let catalog = &handler.catalog;

    let mut players = Vec::with_capacity(members.len());
    for (user_id, name) in members {
        let discord_id = user_id.to_string();
        let profile = handler
            .api
            .user(&discord_id)
            .await
            .map_err(|e| api_failure(catalog, &e))?;

        players.push(Player {
            discord_id,
            name,
            primary: profile.as_ref().and_then(|p| p.primary),
            secondary: profile.as_ref().and_then(|p| p.secondary),
        });
    }

    let roster = teams::split(players, &mut rand::rng()).map_err(|e| {
        tracing::error!("Splitting teams: {}", e);
        catalog.format("error.generic", &[])
    })?;

    handler
        .api
        .replace_roster(&roster)
        .await
        .map_err(|e| api_failure(catalog, &e))?;

    tracing::info!("Stored new roster");

    Ok(roster)
}

fn render_teams(handler: &Handler, roster: &[RosterEntry]) -> String {
    let catalog = &handler.catalog;
    let mut lines = Vec::with_capacity(roster.len() + Team::ALL.len() + 1);

    for team in Team::ALL {
        let team_name = catalog.format(team.message_key(), &[]);
        lines.push(catalog.format("split.team_header", &[("team", team_name.as_str())]));

        for entry in roster.iter().filter(|e| e.team == team) {
            let lane = lane_name(catalog, entry.lane);
            lines.push(catalog.format(
                "split.line",
                &[
                    ("lane", lane.as_str()),
                    ("player", entry.discord_id.as_str()),
                ],
            ));
        }
    }

    lines.push(catalog.format("split.stored", &[]));
    lines.join("\n")
}
