use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "backend", about = "Custom games account and event store")]
pub struct Config {
    /// Postgres connection string
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:3000")]
    pub listen_addr: std::net::SocketAddr,

    /// How long a started account link stays valid
    #[arg(long, env = "LINK_EXPIRY_SECS", default_value_t = 600)]
    pub link_expiry_secs: i64,

    #[command(flatten)]
    pub oauth: OAuthSettings,

    #[command(flatten)]
    pub messages: MessageSettings,
}

#[derive(Debug, Clone, clap::Args)]
pub struct OAuthSettings {
    #[arg(long = "oauth-client-id", env = "OAUTH_CLIENT_ID")]
    pub client_id: String,

    #[arg(long = "oauth-client-secret", env = "OAUTH_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: String,

    #[arg(
        long = "oauth-authorize-url",
        env = "OAUTH_AUTHORIZE_URL",
        default_value = "https://auth.riotgames.com/authorize"
    )]
    pub authorize_url: String,

    #[arg(
        long = "oauth-token-url",
        env = "OAUTH_TOKEN_URL",
        default_value = "https://auth.riotgames.com/token"
    )]
    pub token_url: String,

    #[arg(
        long = "oauth-account-url",
        env = "OAUTH_ACCOUNT_URL",
        default_value = "https://americas.api.riotgames.com/riot/account/v1/accounts/me"
    )]
    pub account_url: String,

    #[arg(
        long = "oauth-redirect-url",
        env = "OAUTH_REDIRECT_URL",
        default_value = "http://localhost:3000/api/link/callback"
    )]
    pub redirect_url: String,
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
