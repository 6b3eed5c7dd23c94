use serenity::all::{CommandInteraction, Context, CreateCommand};

use super::{api_failure, respond};
use crate::handler::Handler;

pub fn register() -> CreateCommand {
    CreateCommand::new("link").description("Connect your game account")
}

pub async fn run(
    ctx: &Context,
    command: &CommandInteraction,
    handler: &Handler,
) -> Result<(), serenity::Error> {
    let catalog = &handler.catalog;

    let content = match handler
        .api
        .start_link(&command.user.id.to_string(), command.user.display_name())
        .await
    {
        Ok(request) => catalog.format("link.prompt", &[("url", request.url.as_str())]),
        Err(e) => api_failure(catalog, &e),
    };

    // The link is personal
    respond(ctx, command, content, true).await
}
