//! Slash commands. Every command module has a `register` building its
//! definition and a `run` handling one invocation.

use serenity::all::{
    CommandDataOption, CommandDataOptionValue, CommandInteraction, Context, CreateCommand,
    CreateInteractionResponse, CreateInteractionResponseMessage,
};

use crate::api::ApiError;
use crate::handler::Handler;
use common::messages::Catalog;

pub mod event;
pub mod health;
pub mod link;
pub mod record;
pub mod role;
pub mod split;

pub fn all() -> Vec<CreateCommand> {
    vec![
        event::register(),
        health::register(),
        link::register(),
        record::register(),
        role::register(),
        split::register(),
    ]
}

#[tracing::instrument(skip_all, fields(command = %command.data.name, user = %command.user.id))]
pub async fn dispatch(
    ctx: &Context,
    command: &CommandInteraction,
    handler: &Handler,
) -> Result<(), serenity::Error> {
    match command.data.name.as_str() {
        "event" => event::run(ctx, command, handler).await,
        "health" => health::run(ctx, command, handler).await,
        "link" => link::run(ctx, command, handler).await,
        "record" => record::run(ctx, command, handler).await,
        "role" => role::run(ctx, command, handler).await,
        "split" => split::run(ctx, command, handler).await,
        other => {
            tracing::warn!("Unknown command {:?}", other);
            Ok(())
        }
    }
}

pub(crate) async fn respond(
    ctx: &Context,
    command: &CommandInteraction,
    content: String,
    ephemeral: bool,
) -> Result<(), serenity::Error> {
    command
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .content(content)
                    .ephemeral(ephemeral),
            ),
        )
        .await
}

pub(crate) fn find_option<'a>(
    options: &'a [CommandDataOption],
    name: &str,
) -> Option<&'a CommandDataOptionValue> {
    options.iter().find(|o| o.name == name).map(|o| &o.value)
}

pub(crate) fn str_option<'a>(options: &'a [CommandDataOption], name: &str) -> Option<&'a str> {
    find_option(options, name).and_then(|v| v.as_str())
}

pub(crate) fn int_option(options: &[CommandDataOption], name: &str) -> Option<i64> {
    find_option(options, name).and_then(|v| v.as_i64())
}

/// The message shown when the store could not handle a request.
pub(crate) fn api_failure(catalog: &Catalog, error: &ApiError) -> String {
    tracing::error!("Store request failed: {}", error);

    match error {
        ApiError::Http(_) => catalog.format("error.api_unreachable", &[]),
        _ => catalog.format("error.generic", &[]),
    }
}

/// Display name of a lane in the catalog's language.
pub(crate) fn lane_name(catalog: &Catalog, lane: common::Lane) -> String {
    catalog.format(lane.message_key(), &[])
}
