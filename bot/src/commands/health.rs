use serenity::all::{CommandInteraction, Context, CreateCommand};

use super::respond;
use crate::handler::Handler;

pub fn register() -> CreateCommand {
    CreateCommand::new("health").description("Check whether the custom games service is up")
}

pub async fn run(
    ctx: &Context,
    command: &CommandInteraction,
    handler: &Handler,
) -> Result<(), serenity::Error> {
    let catalog = &handler.catalog;

    let started = std::time::Instant::now();
    let content = match handler.api.health().await {
        Ok(health) => {
            let latency = started.elapsed().as_millis().to_string();
            let database = if health.database { "ok" } else { "down" };
            catalog.format(
                "health.ok",
                &[
                    ("status", health.status.as_str()),
                    ("database", database),
                    ("latency", latency.as_str()),
                ],
            )
        }
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            catalog.format("health.down", &[])
        }
    };

    respond(ctx, command, content, true).await
}
