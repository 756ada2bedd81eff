// API response utility functions module

use crate::config::HttpConfig;
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{self, HeaderValue};
use hyper::{Response, StatusCode};
use serde::Serialize;

/// Header names the web client may send
pub const CORS_ALLOW_HEADERS: &str = "Content-Type,Authorization,true";
pub const CORS_ALLOW_METHODS: &str = "GET,PUT,POST,DELETE,OPTIONS";

/// Build JSON response
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let json = match serde_json::to_vec(body) {
        Ok(j) => j,
        Err(e) => {
            logger::log_error(&format!("Failed to serialize response: {e}"));
            return Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Full::new(Bytes::from_static(
                    br#"{"success":false,"error":500,"message":"Internal Server Error"}"#,
                )))
                .unwrap_or_else(|_| Response::new(Full::new(Bytes::from("Error"))));
        }
    };

    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from(json)))
        .unwrap_or_else(|e| {
            logger::log_error(&format!("Failed to build response: {e}"));
            Response::new(Full::new(Bytes::from("Error")))
        })
}

/// Answer to a CORS preflight (`OPTIONS` on any path)
pub fn preflight_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::ALLOW, CORS_ALLOW_METHODS)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            logger::log_error(&format!("Failed to build OPTIONS response: {e}"));
            Response::new(Full::new(Bytes::new()))
        })
}

/// Add CORS and `Server` headers; applied to every response
pub fn apply_common_headers(response: &mut Response<Full<Bytes>>, http: &HttpConfig) {
    let headers = response.headers_mut();

    match HeaderValue::from_str(&http.cors_allowed_origin) {
        Ok(origin) => {
            headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
        }
        Err(_) => logger::log_warning(&format!(
            "Invalid cors_allowed_origin '{}', header omitted",
            http.cors_allowed_origin
        )),
    }
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(CORS_ALLOW_HEADERS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(CORS_ALLOW_METHODS),
    );
    if let Ok(server) = HeaderValue::from_str(&http.server_name) {
        headers.insert(header::SERVER, server);
    }
}
