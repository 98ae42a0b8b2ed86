use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::application::TradeError;

/// HTTP face of [`TradeError`]
#[derive(Debug)]
pub struct ApiError(pub TradeError);

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self(TradeError::Validation(msg.into()))
    }

    pub fn status(&self) -> StatusCode {
        if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl From<TradeError> for ApiError {
    fn from(err: TradeError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(kind = self.0.kind(), error = %self.0, "Request failed");
        } else {
            tracing::warn!(kind = self.0.kind(), error = %self.0, "Request rejected");
        }

        let mut body = json!({
            "error": self.0.to_string(),
            "kind": self.0.kind(),
        });
        if let Some(signature) = self.0.signature() {
            body["signature"] = json!(signature);
        }

        (status, Json(body)).into_response()
    }
}
