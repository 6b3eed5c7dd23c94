use serde::Deserialize;

use crate::config::OAuthSettings;

#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AccountInfo {
    pub puuid: String,
    #[serde(rename = "gameName")]
    pub game_name: String,
    #[serde(rename = "tagLine")]
    pub tag_line: String,
}

pub struct Client {
    http: reqwest::Client,
    settings: OAuthSettings,
}

impl Client {
    pub fn new(settings: OAuthSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            settings,
        }
    }

    /// Where the user is sent to authorize the link, carrying `state` back to the callback.
    pub fn authorize_url(&self, state: &str) -> Result<String, OAuthError> {
        let url = reqwest::Url::parse_with_params(
            &self.settings.authorize_url,
            &[
                ("response_type", "code"),
                ("client_id", self.settings.client_id.as_str()),
                ("redirect_uri", self.settings.redirect_url.as_str()),
                ("scope", "openid"),
                ("state", state),
            ],
        )
        .map_err(|e| OAuthError::InvalidUrl(e.to_string()))?;

        Ok(url.into())
    }

    #[tracing::instrument(skip(self, code))]
    pub async fn exchange_code(&self, code: &str) -> Result<String, OAuthError> {
        let response = self
            .http
            .post(&self.settings.token_url)
            .basic_auth(&self.settings.client_id, Some(&self.settings.client_secret))
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.settings.redirect_url.as_str()),
            ])
            .send()
            .await?;
        if !response.status().is_success() {
            tracing::error!("Token exchange rejected: {:?}", response.status());
            return Err(OAuthError::Status(response.status()));
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }

    #[tracing::instrument(skip(self, access_token))]
    pub async fn account(&self, access_token: &str) -> Result<AccountInfo, OAuthError> {
        let response = self
            .http
            .get(&self.settings.account_url)
            .bearer_auth(access_token)
            .send()
            .await?;
        if !response.status().is_success() {
            tracing::error!("Account lookup rejected: {:?}", response.status());
            return Err(OAuthError::Status(response.status()));
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> OAuthSettings {
        OAuthSettings {
            client_id: "customs".to_owned(),
            client_secret: "secret".to_owned(),
            authorize_url: "https://auth.example.com/authorize".to_owned(),
            token_url: "https://auth.example.com/token".to_owned(),
            account_url: "https://api.example.com/accounts/me".to_owned(),
            redirect_url: "http://localhost:3000/api/link/callback".to_owned(),
        }
    }

    #[test]
    fn authorize_url_carries_state() {
        let client = Client::new(settings());
        let url = reqwest::Url::parse(&client.authorize_url("abc123").unwrap()).unwrap();

        let params: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!("auth.example.com", url.host_str().unwrap());
        assert_eq!(Some("abc123"), params.get("state").map(|s| s.as_str()));
        assert_eq!(Some("customs"), params.get("client_id").map(|s| s.as_str()));
        assert_eq!(Some("code"), params.get("response_type").map(|s| s.as_str()));
        assert_eq!(
            Some("http://localhost:3000/api/link/callback"),
            params.get("redirect_uri").map(|s| s.as_str())
        );
    }

    #[test]
    fn invalid_authorize_url() {
        let mut settings = settings();
        settings.authorize_url = "not a url".to_owned();

        assert!(matches!(
            Client::new(settings).authorize_url("abc"),
            Err(OAuthError::InvalidUrl(_))
        ));
    }

    #[test]
    fn account_info_format() {
        let info: AccountInfo =
            serde_json::from_str(r#"{"puuid": "p-1", "gameName": "Faker", "tagLine": "KR1"}"#)
                .unwrap();

        assert_eq!(
            AccountInfo {
                puuid: "p-1".to_owned(),
                game_name: "Faker".to_owned(),
                tag_line: "KR1".to_owned(),
            },
            info
        );
    }
}
