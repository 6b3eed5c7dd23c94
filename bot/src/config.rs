use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "bot", about = "Chat front-end for organizing custom games")]
pub struct Config {
    #[arg(long, env = "DISCORD_TOKEN", hide_env_values = true)]
    pub discord_token: String,

    /// Base URL of the store service
    #[arg(long, env = "API_URL", default_value = "http://localhost:3000/")]
    pub api_url: String,

    /// Register commands for this guild only instead of globally
    #[arg(long, env = "GUILD_ID")]
    pub guild_id: Option<std::num::NonZeroU64>,

    /// How long to wait for each stat reply
    #[arg(long, env = "REPLY_TIMEOUT_SECS", default_value_t = 60)]
    pub reply_timeout_secs: u64,

    /// How long to wait for the confirm/cancel choice
    #[arg(long, env = "CONFIRM_TIMEOUT_SECS", default_value_t = 60)]
    pub confirm_timeout_secs: u64,

    /// How long validation notices stay visible
    #[arg(long, env = "NOTICE_LIFETIME_SECS", default_value_t = 5)]
    pub notice_lifetime_secs: u64,

    #[command(flatten)]
    pub messages: MessageSettings,
}

impl Config {
    pub fn recording(&self) -> crate::recording::RecordingSettings {
        crate::recording::RecordingSettings {
            reply_timeout: std::time::Duration::from_secs(self.reply_timeout_secs),
            confirm_timeout: std::time::Duration::from_secs(self.confirm_timeout_secs),
            notice_lifetime: std::time::Duration::from_secs(self.notice_lifetime_secs),
        }
    }
}

#[derive(Debug, Clone, clap::Args)]
pub struct MessageSettings {
    /// Directory holding `lang/<language>.json` and `themes/<theme>.json`
    #[arg(long, env = "MESSAGES_DIR")]
    pub messages_dir: Option<std::path::PathBuf>,

    #[arg(long, env = "MESSAGES_LANGUAGE")]
    pub language: Option<String>,

    #[arg(long, env = "MESSAGES_THEME")]
    pub theme: Option<String>,
}

impl MessageSettings {
    pub fn catalog(&self) -> Result<common::messages::Catalog, common::messages::CatalogError> {
        common::messages::Catalog::load(
            self.messages_dir.as_deref(),
            self.language.as_deref(),
            self.theme.as_deref(),
        )
    }
}
