use serenity::all::{Command, Context, EventHandler, GuildId, Interaction, Ready};

use crate::api::ApiClient;
use crate::recording::RecordingSettings;
use common::messages::Catalog;

/// Shared state of the bot, handed to every command.
pub struct Handler {
    pub(crate) api: ApiClient,
    pub(crate) catalog: Catalog,
    pub(crate) recording: RecordingSettings,
    guild_id: Option<GuildId>,
}

impl Handler {
    pub fn new(
        api: ApiClient,
        catalog: Catalog,
        recording: RecordingSettings,
        guild_id: Option<GuildId>,
    ) -> Self {
        Self {
            api,
            catalog,
            recording,
            guild_id,
        }
    }
}

#[async_trait::async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        tracing::info!("Connected as {}", ready.user.name);

        let registered = match self.guild_id {
            Some(guild_id) => guild_id.set_commands(&ctx.http, crate::commands::all()).await,
            None => Command::set_global_commands(&ctx.http, crate::commands::all()).await,
        };

        match registered {
            Ok(commands) => tracing::info!(
                guild = ?self.guild_id,
                "Registered {} commands",
                commands.len()
            ),
            Err(e) => tracing::error!("Registering commands: {:?}", e),
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let command = match interaction {
            Interaction::Command(command) => command,
            _ => return,
        };

        if let Err(e) = crate::commands::dispatch(&ctx, &command, self).await {
            tracing::error!("Handling command {:?}: {:?}", command.data.name, e);
        }
    }
}
