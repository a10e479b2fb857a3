use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

pub type Result<T, E = Report> = color_eyre::Result<T, E>;

pub struct Report(color_eyre::Report);

impl std::fmt::Debug for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl<E> From<E> for Report
where
    E: Into<color_eyre::Report>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for Report {
    fn into_response(self) -> Response {
        let err = self.0;
        let err_string = format!("{err:?}");

        if let Some(err) = err.downcast_ref::<HttpError>() {
            if err.is_server_error() {
                tracing::error!("{err_string}");
            } else {
                tracing::warn!("{err_string}");
            }
            return err.response();
        }

        tracing::error!("{err_string}");
        HttpError::UnexpectedError.response()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("validation error: {0}")]
    ValidationError(String),
    #[error("database error")]
    DatabaseError(#[from] sqlx::Error),
    #[error("unexpected error")]
    UnexpectedError,
}

impl HttpError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::DatabaseError(_) | Self::UnexpectedError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn is_server_error(&self) -> bool {
        self.status().is_server_error()
    }

    /// Validation messages reach the client verbatim; everything else is
    /// reported with a generic message.
    pub fn response(&self) -> Response {
        let message = match self {
            Self::ValidationError(message) => message.as_str(),
            Self::DatabaseError(_) | Self::UnexpectedError => "Failed to submit referral",
        };

        (self.status(), Json(json!({ "message": message }))).into_response()
    }
}
