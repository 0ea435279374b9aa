//! Mapping of application errors and warp rejections to HTTP replies.
//!
//! Only provider rejections reach the caller with their own status and
//! message. Every other failure becomes a generic 500.

use std::convert::Infallible;

use serde::Serialize;
use skylog_core::{AppError, WeatherError};
use warp::filters::cors::CorsForbidden;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Rejection, Reply};

pub const INTERNAL_ERROR: &str = "Internal server error";

/// JSON error body: `{"statusCode": 404, "message": "city not found"}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub status_code: u16,
    pub message: String,
}

/// Status and caller-visible message for an application error.
pub fn status_and_message(err: &AppError) -> (StatusCode, String) {
    match err {
        AppError::Weather(WeatherError::UpstreamRejected { status, message }) => (
            StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
            message.clone(),
        ),
        AppError::Weather(WeatherError::EmptyCity) => {
            (StatusCode::BAD_REQUEST, err.user_message().to_string())
        }
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            err.user_message().to_string(),
        ),
    }
}

pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let body = ErrorBody {
        status_code: status.as_u16(),
        message: message.into(),
    };
    warp::reply::with_status(warp::reply::json(&body), status).into_response()
}

pub fn app_error_response(err: &AppError) -> Response {
    let (status, message) = status_and_message(err);
    if status.is_server_error() {
        tracing::error!("Request failed: {}", err);
    } else {
        tracing::debug!("Request rejected: {}", err);
    }
    error_response(status, message)
}

/// Turn warp's own rejections (unknown path, bad query) into JSON errors.
pub async fn handle_rejection(err: Rejection) -> Result<Response, Infallible> {
    let response = if err.is_not_found() {
        error_response(StatusCode::NOT_FOUND, "Not found")
    } else if let Some(e) = err.find::<warp::reject::InvalidQuery>() {
        error_response(StatusCode::BAD_REQUEST, format!("Invalid query: {}", e))
    } else if let Some(e) = err.find::<CorsForbidden>() {
        tracing::debug!("CORS request refused: {}", e);
        error_response(StatusCode::FORBIDDEN, e.to_string())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        error_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
    } else {
        tracing::error!("Unhandled rejection: {:?}", err);
        error_response(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR)
    };
    Ok(response)
}
