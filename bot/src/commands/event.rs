use chrono::{DateTime, NaiveDateTime, Utc};
use serenity::all::{
    CommandDataOption, CommandDataOptionValue, CommandInteraction, CommandOptionType, Context,
    CreateCommand, CreateCommandOption,
};

use super::{api_failure, int_option, respond, str_option};
use crate::api::ApiError;
use crate::handler::Handler;

const START_FORMAT: &str = "%Y-%m-%d %H:%M";

pub fn register() -> CreateCommand {
    CreateCommand::new("event")
        .description("Schedule custom games")
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "create",
                "Schedule a custom game",
            )
            .add_sub_option(
                CreateCommandOption::new(CommandOptionType::String, "title", "What is played")
                    .required(true),
            )
            .add_sub_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    "start",
                    "Start time as YYYY-MM-DD HH:MM in UTC",
                )
                .required(true),
            ),
        )
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::SubCommand,
                "cancel",
                "Cancel a custom game you scheduled",
            )
            .add_sub_option(
                CreateCommandOption::new(CommandOptionType::Integer, "id", "Event number")
                    .required(true),
            ),
        )
        .add_option(CreateCommandOption::new(
            CommandOptionType::SubCommand,
            "list",
            "Show upcoming custom games",
        ))
}

pub async fn run(
    ctx: &Context,
    command: &CommandInteraction,
    handler: &Handler,
) -> Result<(), serenity::Error> {
    let sub = match command.data.options.first() {
        Some(s) => s,
        None => return Ok(()),
    };
    let options: &[CommandDataOption] = match &sub.value {
        CommandDataOptionValue::SubCommand(options) => options,
        _ => &[],
    };

    let (content, ephemeral) = match sub.name.as_str() {
        "create" => create(command, handler, options).await,
        "cancel" => cancel(command, handler, options).await,
        "list" => (list(handler).await, true),
        other => {
            tracing::warn!("Unknown event subcommand {:?}", other);
            return Ok(());
        }
    };

    respond(ctx, command, content, ephemeral).await
}

/// Start times are entered in UTC.
pub fn parse_start(input: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(input.trim(), START_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

async fn create(
    command: &CommandInteraction,
    handler: &Handler,
    options: &[CommandDataOption],
) -> (String, bool) {
    let catalog = &handler.catalog;

    let title = str_option(options, "title").unwrap_or_default().trim();
    if title.is_empty() {
        return (catalog.format("event.empty_title", &[]), true);
    }

    let input = str_option(options, "start").unwrap_or_default();
    let starts_at = match parse_start(input) {
        Some(s) => s,
        None => {
            return (
                catalog.format("event.invalid_start", &[("input", input)]),
                true,
            )
        }
    };
    if starts_at <= Utc::now() {
        return (catalog.format("event.in_past", &[]), true);
    }

    let new_event = common::NewEvent {
        title: title.to_owned(),
        starts_at,
        created_by: command.user.id.to_string(),
        created_by_name: command.user.display_name().to_owned(),
    };

    match handler.api.create_event(&new_event).await {
        Ok(event) => {
            tracing::info!(id = event.id, "Created event");
            let id = event.id.to_string();
            let timestamp = event.starts_at.timestamp().to_string();
            (
                catalog.format(
                    "event.created",
                    &[
                        ("title", event.title.as_str()),
                        ("timestamp", timestamp.as_str()),
                        ("id", id.as_str()),
                    ],
                ),
                false,
            )
        }
        Err(e) => (api_failure(catalog, &e), true),
    }
}

async fn cancel(
    command: &CommandInteraction,
    handler: &Handler,
    options: &[CommandDataOption],
) -> (String, bool) {
    let catalog = &handler.catalog;

    let id = match int_option(options, "id") {
        Some(id) => id,
        None => return (catalog.format("error.generic", &[]), true),
    };
    let id_text = id.to_string();
    let replacements = [("id", id_text.as_str())];

    match handler
        .api
        .cancel_event(id, &command.user.id.to_string())
        .await
    {
        Ok(()) => (catalog.format("event.cancelled", &replacements), false),
        Err(ApiError::NotFound) => (catalog.format("event.not_found", &replacements), true),
        Err(ApiError::Forbidden) => (catalog.format("event.not_owner", &replacements), true),
        Err(e) => (api_failure(catalog, &e), true),
    }
}

async fn list(handler: &Handler) -> String {
    let catalog = &handler.catalog;

    let events = match handler.api.upcoming_events().await {
        Ok(e) => e,
        Err(e) => return api_failure(catalog, &e),
    };
    if events.is_empty() {
        return catalog.format("event.list.empty", &[]);
    }

    let mut lines = Vec::with_capacity(events.len() + 1);
    lines.push(catalog.format("event.list.header", &[]));
    for event in events {
        let id = event.id.to_string();
        let timestamp = event.starts_at.timestamp().to_string();
        lines.push(catalog.format(
            "event.list.line",
            &[
                ("id", id.as_str()),
                ("title", event.title.as_str()),
                ("timestamp", timestamp.as_str()),
            ],
        ));
    }

    lines.join("\n")
}
