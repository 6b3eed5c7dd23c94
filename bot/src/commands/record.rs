use common::Team;
use serenity::all::{
    CommandInteraction, CommandOptionType, Context, CreateCommand, CreateCommandOption,
};

use super::{respond, str_option};
use crate::conversation::InteractionConversation;
use crate::handler::Handler;
use crate::recording;

pub fn register() -> CreateCommand {
    CreateCommand::new("record")
        .description("Record the result of the current custom game")
        .add_option(
            CreateCommandOption::new(CommandOptionType::String, "winner", "Side that won")
                .required(true)
                .add_string_choice("Blue", Team::Blue.as_str())
                .add_string_choice("Red", Team::Red.as_str()),
        )
}

pub async fn run(
    ctx: &Context,
    command: &CommandInteraction,
    handler: &Handler,
) -> Result<(), serenity::Error> {
    let winner = match str_option(&command.data.options, "winner").map(str::parse::<Team>) {
        Some(Ok(team)) => team,
        other => {
            tracing::warn!("Record command without a valid winner: {:?}", other);
            return respond(ctx, command, handler.catalog.format("error.generic", &[]), true)
                .await;
        }
    };

    let conversation = InteractionConversation::new(ctx, command);
    recording::record_match(
        &conversation,
        &handler.api,
        &handler.catalog,
        &handler.recording,
        winner,
    )
    .await;

    Ok(())
}
