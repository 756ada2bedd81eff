// API error module
// Error taxonomy for request handlers and its JSON envelope

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Response, StatusCode};
use serde::Serialize;
use thiserror::Error;

use super::response::json_response;
use crate::logger;
use crate::store::StoreError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// A required top-level key is missing or malformed
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Missing entity or empty result set
    #[error("not found: {0}")]
    NotFound(String),

    #[error("method {method} not allowed")]
    MethodNotAllowed { method: Method, allow: &'static str },

    #[error("request body larger than {0} bytes")]
    PayloadTooLarge(u64),

    /// Missing or invalid JSON body
    #[error("unprocessable request: {0}")]
    Unprocessable(String),

    #[error("store failure: {0}")]
    Store(#[from] StoreError),
}

/// `{success: false, error, message}`
#[derive(Debug, Serialize)]
struct ErrorEnvelope {
    success: bool,
    error: u16,
    message: &'static str,
}

impl ApiError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Public message; details stay in the log
    pub const fn message(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "This is a Bad Request",
            Self::NotFound(_) => "Resource Not Found",
            Self::MethodNotAllowed { .. } => "Method Not Allowed",
            Self::PayloadTooLarge(_) => "Payload Too Large",
            Self::Unprocessable(_) => "Request is Unprocessable",
            Self::Store(_) => "Internal Server Error",
        }
    }

    pub fn into_response(self) -> Response<Full<Bytes>> {
        let status = self.status();
        if status.is_server_error() {
            logger::log_error(&self.to_string());
        } else {
            logger::log_debug(&self.to_string());
        }

        let envelope = ErrorEnvelope {
            success: false,
            error: status.as_u16(),
            message: self.message(),
        };
        let mut response = json_response(status, &envelope);

        if let Self::MethodNotAllowed { allow, .. } = self {
            response
                .headers_mut()
                .insert(hyper::header::ALLOW, hyper::header::HeaderValue::from_static(allow));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn envelope(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_envelope_shape() {
        let (status, body) = envelope(ApiError::NotFound("question 9".to_string())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body,
            serde_json::json!({"success": false, "error": 404, "message": "Resource Not Found"})
        );
    }

    #[tokio::test]
    async fn test_store_errors_are_500_without_detail() {
        let err = ApiError::from(StoreError::Write {
            path: "/data/trivia.toml".into(),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        });
        let (status, body) = envelope(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], 500);
        assert_eq!(body["message"], "Internal Server Error");
        assert!(!body.to_string().contains("disk full"));
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::BadRequest(String::new()).status().as_u16(), 400);
        assert_eq!(ApiError::Unprocessable(String::new()).status().as_u16(), 422);
        assert_eq!(ApiError::PayloadTooLarge(10).status().as_u16(), 413);
        let err = ApiError::MethodNotAllowed {
            method: Method::PATCH,
            allow: "GET",
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()["allow"], "GET");
    }
}
