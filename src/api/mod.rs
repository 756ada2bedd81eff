//! Trivia API module
//!
//! Request routing, body handling and response decoration for the game
//! endpoints. Each route maps to exactly one handler in [`handlers`].

mod error;
mod handlers;
mod pagination;
mod response;
mod types;

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::{AppState, HealthConfig};
use crate::logger::{self, AccessLogEntry};

pub use error::{ApiError, ApiResult};
use response::{apply_common_headers, preflight_response};
use types::{parse_json_object, JsonObject};

/// Resolved route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Categories,
    Questions,
    Question(i64),
    SearchQuestions,
    CategoryQuestions(i64),
    Quizzes,
    Liveness,
    Readiness,
}

impl Route {
    /// Match a request path; numeric segments must parse as integers
    fn resolve(path: &str, health: &HealthConfig) -> Option<Self> {
        if health.enabled {
            if path == health.liveness_path {
                return Some(Self::Liveness);
            }
            if path == health.readiness_path {
                return Some(Self::Readiness);
            }
        }

        let segments: Vec<&str> = path.strip_prefix('/')?.split('/').collect();
        match segments.as_slice() {
            ["categories"] => Some(Self::Categories),
            ["questions"] => Some(Self::Questions),
            ["questions", "find"] => Some(Self::SearchQuestions),
            ["questions", id] => id.parse().ok().map(Self::Question),
            ["categories", id, "questions"] => id.parse().ok().map(Self::CategoryQuestions),
            ["quizzes"] => Some(Self::Quizzes),
            _ => None,
        }
    }

    /// Methods served on this path, for `Allow`
    const fn allowed(self) -> &'static str {
        match self {
            Self::Questions => "GET, POST, OPTIONS",
            Self::Question(_) => "DELETE, OPTIONS",
            Self::SearchQuestions | Self::Quizzes => "POST, OPTIONS",
            Self::Categories | Self::CategoryQuestions(_) | Self::Liveness | Self::Readiness => {
                "GET, OPTIONS"
            }
        }
    }
}

/// Main entry point for API requests
pub async fn handle_request<B>(
    req: Request<B>,
    peer: SocketAddr,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let mut entry = state
        .access_log_enabled()
        .then(|| AccessLogEntry::start(peer, &req));

    let mut response = if req.method() == Method::OPTIONS {
        preflight_response()
    } else {
        dispatch(req, &state)
            .await
            .unwrap_or_else(ApiError::into_response)
    };
    apply_common_headers(&mut response, &state.config.http);

    if let Some(entry) = entry.as_mut() {
        let body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        entry.finish(response.status().as_u16(), body_bytes);
        logger::log_access(entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

async fn dispatch<B>(req: Request<B>, state: &AppState) -> ApiResult<Response<Full<Bytes>>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let route = Route::resolve(req.uri().path(), &state.config.health)
        .ok_or_else(|| ApiError::NotFound(format!("no route for {}", req.uri().path())))?;
    let page = pagination::page_from_query(req.uri().query());
    let method = req.method().clone();

    match (&method, route) {
        (&Method::GET, Route::Liveness) => Ok(handlers::liveness()),
        (&Method::GET, Route::Readiness) => handlers::readiness(state).await,
        (&Method::GET, Route::Categories) => handlers::list_categories(state).await,
        (&Method::GET, Route::Questions) => handlers::list_questions(state, page).await,
        (&Method::POST, Route::Questions) => {
            let body = read_json_body(req, state).await?;
            handlers::create_question(state, body).await
        }
        (&Method::DELETE, Route::Question(id)) => handlers::delete_question(state, id).await,
        (&Method::POST, Route::SearchQuestions) => {
            let body = read_json_body(req, state).await?;
            handlers::search_questions(state, &body).await
        }
        (&Method::GET, Route::CategoryQuestions(id)) => {
            handlers::category_questions(state, id, page).await
        }
        (&Method::POST, Route::Quizzes) => {
            let body = read_json_body(req, state).await?;
            handlers::quiz_draw(state, &body).await
        }
        (_, route) => Err(ApiError::MethodNotAllowed {
            method: method.clone(),
            allow: route.allowed(),
        }),
    }
}

/// Collect the body up to `http.max_body_size` and parse it as a JSON object
async fn read_json_body<B>(req: Request<B>, state: &AppState) -> ApiResult<JsonObject>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let limit = state.config.http.max_body_size;

    if let Some(declared) = req
        .headers()
        .get(hyper::header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
    {
        if declared > limit {
            return Err(ApiError::PayloadTooLarge(limit));
        }
    }

    let limited = Limited::new(req.into_body(), usize::try_from(limit).unwrap_or(usize::MAX));
    let bytes = match limited.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.is::<LengthLimitError>() => return Err(ApiError::PayloadTooLarge(limit)),
        Err(e) => return Err(ApiError::BadRequest(format!("failed to read body: {e}"))),
    };

    parse_json_object(&bytes)
}
