use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::admin::AdminState;
use crate::routing::{RouteError, RouteInfo};

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub routes: usize,
}

/// Body of `POST /admin/routes`.
#[derive(Debug, Deserialize, Serialize)]
pub struct RegisterRequest {
    pub pattern: String,
    #[serde(default)]
    pub destination: Option<String>,
}

/// Query of `DELETE /admin/routes`.
#[derive(Debug, Deserialize)]
pub struct DeregisterParams {
    pub pattern: String,
}

/// Result of a control operation.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MutationResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl MutationResponse {
    fn ok(pattern: &str) -> Self {
        Self {
            success: true,
            pattern: Some(pattern.to_string()),
            error: None,
            reason: None,
        }
    }

    fn failed(error: &str, reason: String) -> Self {
        Self {
            success: false,
            pattern: None,
            error: Some(error.to_string()),
            reason: Some(reason),
        }
    }
}

impl IntoResponse for RouteError {
    fn into_response(self) -> Response {
        let status = match self {
            RouteError::InvalidPattern(_)
            | RouteError::NilBackend(_)
            | RouteError::InvalidDestination { .. } => StatusCode::BAD_REQUEST,
            RouteError::DuplicateRegistration(_) => StatusCode::CONFLICT,
            RouteError::UnknownPattern(_) => StatusCode::NOT_FOUND,
        };
        (status, Json(MutationResponse::failed(self.kind(), self.to_string()))).into_response()
    }
}

fn bad_request(reason: String) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(MutationResponse::failed("invalid_request", reason)),
    )
        .into_response()
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        routes: state.router.table().len(),
    })
}

pub async fn list_routes(State(state): State<AdminState>) -> Json<Vec<RouteInfo>> {
    Json(state.router.table().routes())
}

pub async fn register_route(
    State(state): State<AdminState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match body {
        Ok(body) => body,
        Err(rejection) => return bad_request(rejection.body_text()),
    };

    match state.router.register(&req.pattern, req.destination.as_deref()) {
        Ok(()) => (StatusCode::CREATED, Json(MutationResponse::ok(&req.pattern))).into_response(),
        Err(e) => {
            tracing::warn!(pattern = %req.pattern, error = %e, "Route registration rejected");
            e.into_response()
        }
    }
}

pub async fn deregister_route(
    State(state): State<AdminState>,
    params: Result<Query<DeregisterParams>, QueryRejection>,
) -> Response {
    let Query(params) = match params {
        Ok(params) => params,
        Err(rejection) => return bad_request(rejection.body_text()),
    };

    match state.router.deregister(&params.pattern) {
        Ok(()) => Json(MutationResponse::ok(&params.pattern)).into_response(),
        Err(e) => {
            tracing::warn!(pattern = %params.pattern, error = %e, "Route removal rejected");
            e.into_response()
        }
    }
}
