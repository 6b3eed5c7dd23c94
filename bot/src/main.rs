use clap::Parser;
use serenity::all::{GatewayIntents, GuildId};
use tracing_subscriber::prelude::__tracing_subscriber_SubscriberExt;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = bot::config::Config::parse();

    let registry = tracing_subscriber::Registry::default()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::filter::filter_fn(|meta| {
            meta.target().starts_with("bot") || meta.target().starts_with("common")
        }));
    tracing::subscriber::set_global_default(registry)?;

    tracing::info!("Starting...");

    let catalog = config.messages.catalog()?;
    let api = bot::api::ApiClient::new(&config.api_url)?;
    let handler = bot::Handler::new(
        api,
        catalog,
        config.recording(),
        config.guild_id.map(GuildId::from),
    );

    // Replies are read from guild messages, the split needs voice states
    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_VOICE_STATES;

    let mut client = serenity::Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .await?;

    tracing::info!("Connecting to the gateway");
    client.start().await?;

    Ok(())
}
