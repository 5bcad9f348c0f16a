use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use prophunt_core::RejectedAction;

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotFound(String),
    /// A session refused the command; nothing changed.
    Rejected(RejectedAction),
    /// The tick loop is gone.
    Unavailable,
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadRequest(m) | Self::NotFound(m) => write!(f, "{m}"),
            Self::Rejected(r) => write!(f, "{r}"),
            Self::Unavailable => write!(f, "session loop is not running"),
        }
    }
}

impl From<RejectedAction> for AppError {
    fn from(reason: RejectedAction) -> Self {
        match reason {
            RejectedAction::UnknownArena(name) => Self::NotFound(format!("no arena named {name}")),
            other => Self::Rejected(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        match self {
            Self::BadRequest(_) => {
                (StatusCode::BAD_REQUEST, Json(serde_json::json!({ "error": message })))
                    .into_response()
            }
            Self::NotFound(_) => {
                (StatusCode::NOT_FOUND, Json(serde_json::json!({ "error": message })))
                    .into_response()
            }
            Self::Rejected(reason) => {
                let mut body = serde_json::json!({
                    "error": message,
                    "reason": reason.code(),
                });
                if let RejectedAction::SetupIncomplete(missing) = &reason {
                    body["missing"] = serde_json::json!(missing);
                }
                (StatusCode::CONFLICT, Json(body)).into_response()
            }
            Self::Unavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({ "error": message })),
            )
                .into_response(),
        }
    }
}
