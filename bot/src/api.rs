//! Typed client for the store service.

use serde::de::DeserializeOwned;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("record not found")]
    NotFound,
    #[error("not allowed")]
    Forbidden,
    #[error("rejected: {0}")]
    Rejected(String),
    #[error("unexpected status {status}: {message}")]
    Status {
        status: reqwest::StatusCode,
        message: String,
    },
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

fn error_for(status: reqwest::StatusCode, body: &str) -> ApiError {
    let message = serde_json::from_str::<common::ErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| body.to_owned());

    match status {
        reqwest::StatusCode::NOT_FOUND => ApiError::NotFound,
        reqwest::StatusCode::FORBIDDEN => ApiError::Forbidden,
        reqwest::StatusCode::BAD_REQUEST | reqwest::StatusCode::CONFLICT => {
            ApiError::Rejected(message)
        }
        status => ApiError::Status { status, message },
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: reqwest::Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        // Url::join drops the last path segment unless it ends in a slash
        let normalized = if base_url.ends_with('/') {
            base_url.to_owned()
        } else {
            format!("{}/", base_url)
        };

        let base =
            reqwest::Url::parse(&normalized).map_err(|e| ApiError::InvalidUrl(e.to_string()))?;

        Ok(Self {
            http: reqwest::Client::new(),
            base,
        })
    }

    fn url(&self, path: &str) -> Result<reqwest::Url, ApiError> {
        self.base
            .join(path)
            .map_err(|e| ApiError::InvalidUrl(e.to_string()))
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::debug!(?status, %body, "Request rejected");
        Err(error_for(status, &body))
    }

    async fn json<T>(response: reqwest::Response) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        Ok(Self::check(response).await?.json::<T>().await?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn health(&self) -> Result<common::HealthStatus, ApiError> {
        let response = self.http.get(self.url("api/health")?).send().await?;
        Self::json(response).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn create_event(&self, event: &common::NewEvent) -> Result<common::Event, ApiError> {
        let response = self
            .http
            .post(self.url("api/events")?)
            .json(event)
            .send()
            .await?;
        Self::json(response).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn upcoming_events(&self) -> Result<Vec<common::Event>, ApiError> {
        let response = self.http.get(self.url("api/events")?).send().await?;
        Self::json(response).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn cancel_event(&self, id: i64, requested_by: &str) -> Result<(), ApiError> {
        let response = self
            .http
            .delete(self.url(&format!("api/events/{}", id))?)
            .query(&[("requested_by", requested_by)])
            .send()
            .await?;
        Self::check(response).await.map(|_| ())
    }

    /// `None` when the user never interacted with the service.
    #[tracing::instrument(skip(self))]
    pub async fn user(&self, discord_id: &str) -> Result<Option<common::UserProfile>, ApiError> {
        let response = self
            .http
            .get(self.url(&format!("api/users/{}", discord_id))?)
            .send()
            .await?;

        match Self::json(response).await {
            Ok(profile) => Ok(Some(profile)),
            Err(ApiError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn set_roles(
        &self,
        discord_id: &str,
        roles: &common::RolePreferences,
    ) -> Result<(), ApiError> {
        let response = self
            .http
            .put(self.url(&format!("api/users/{}/roles", discord_id))?)
            .json(roles)
            .send()
            .await?;
        Self::check(response).await.map(|_| ())
    }

    #[tracing::instrument(skip(self))]
    pub async fn start_link(
        &self,
        discord_id: &str,
        name: &str,
    ) -> Result<common::LinkRequest, ApiError> {
        let response = self
            .http
            .post(self.url(&format!("api/link/{}", discord_id))?)
            .json(&common::StartLink {
                name: name.to_owned(),
            })
            .send()
            .await?;
        Self::json(response).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn active_roster(&self) -> Result<Vec<common::RosterEntry>, ApiError> {
        let response = self.http.get(self.url("api/roster")?).send().await?;
        Self::json(response).await
    }

    #[tracing::instrument(skip(self, roster))]
    pub async fn replace_roster(&self, roster: &[common::RosterEntry]) -> Result<(), ApiError> {
        let response = self
            .http
            .put(self.url("api/roster")?)
            .json(roster)
            .send()
            .await?;
        Self::check(response).await.map(|_| ())
    }

    #[tracing::instrument(skip(self, participant))]
    pub async fn create_match_participant(
        &self,
        match_id: uuid::Uuid,
        participant: &common::NewMatchParticipant,
    ) -> Result<common::Created, ApiError> {
        let response = self
            .http
            .post(self.url(&format!("api/matches/{}/participants", match_id))?)
            .json(participant)
            .send()
            .await?;
        Self::json(response).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn match_participants(
        &self,
        match_id: uuid::Uuid,
    ) -> Result<Vec<common::MatchParticipant>, ApiError> {
        let response = self
            .http
            .get(self.url(&format!("api/matches/{}", match_id))?)
            .send()
            .await?;
        Self::json(response).await
    }
}

#[async_trait::async_trait]
impl crate::recording::MatchStore for ApiClient {
    async fn active_roster(&self) -> Result<Vec<common::RosterEntry>, ApiError> {
        ApiClient::active_roster(self).await
    }

    async fn create_match_participant(
        &self,
        match_id: uuid::Uuid,
        participant: &common::NewMatchParticipant,
    ) -> Result<common::Created, ApiError> {
        ApiClient::create_match_participant(self, match_id, participant).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn joins_paths_onto_base() {
        let client = ApiClient::new("http://localhost:3000").unwrap();
        assert_eq!(
            "http://localhost:3000/api/roster",
            client.url("api/roster").unwrap().as_str()
        );

        let prefixed = ApiClient::new("https://example.com/customs").unwrap();
        assert_eq!(
            "https://example.com/customs/api/events/4",
            prefixed.url("api/events/4").unwrap().as_str()
        );
    }

    #[test]
    fn rejects_invalid_base() {
        assert!(matches!(
            ApiClient::new("not a url"),
            Err(ApiError::InvalidUrl(_))
        ));
    }

    #[test]
    fn maps_statuses() {
        assert!(matches!(
            error_for(reqwest::StatusCode::NOT_FOUND, ""),
            ApiError::NotFound
        ));
        assert!(matches!(
            error_for(reqwest::StatusCode::FORBIDDEN, ""),
            ApiError::Forbidden
        ));

        match error_for(
            reqwest::StatusCode::BAD_REQUEST,
            r#"{"error": "title must not be empty"}"#,
        ) {
            ApiError::Rejected(message) => assert_eq!("title must not be empty", message),
            other => panic!("unexpected {:?}", other),
        }

        match error_for(reqwest::StatusCode::BAD_GATEWAY, "upstream down") {
            ApiError::Status { status, message } => {
                assert_eq!(reqwest::StatusCode::BAD_GATEWAY, status);
                assert_eq!("upstream down", message);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
