use axum::http::StatusCode;
use diesel::result::DatabaseErrorKind;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("record not found")]
    NotFound,
    #[error("{0}")]
    BadRequest(String),
    #[error("not allowed")]
    Forbidden,
    #[error("record already exists")]
    Conflict,
    #[error("connecting to database: {0}")]
    Connection(#[from] diesel::ConnectionError),
    #[error("database: {0}")]
    Database(diesel::result::Error),
    #[error("upstream: {0}")]
    Upstream(#[from] crate::oauth::OAuthError),
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

impl From<diesel::result::Error> for ApiError {
    fn from(value: diesel::result::Error) -> Self {
        match value {
            diesel::result::Error::NotFound => Self::NotFound,
            diesel::result::Error::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
                tracing::debug!("Foreign key violation: {}", info.message());
                Self::NotFound
            }
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                Self::Conflict
            }
            other => Self::Database(other),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Conflict => StatusCode::CONFLICT,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Connection(_) | Self::Database(_) | Self::Corrupt(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();

        // Internal details stay in the log
        let message = if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
            status
                .canonical_reason()
                .unwrap_or("internal error")
                .to_owned()
        } else {
            self.to_string()
        };

        (status, axum::Json(common::ErrorBody { error: message })).into_response()
    }
}
