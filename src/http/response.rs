//! Canned data-plane responses.
//!
//! # Design Decisions
//! - Upstream connection failures result in 502 Bad Gateway
//! - Upstream timeouts result in 504 Gateway Timeout
//! - Bodies are short plain-text reasons

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

pub fn bad_gateway() -> Response {
    (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
}

pub fn gateway_timeout() -> Response {
    (StatusCode::GATEWAY_TIMEOUT, "Upstream request timed out").into_response()
}
