//! Response envelopes and error rendering.
//!
//! # Responsibilities
//! - Shape every success body the way consumers expect (`data`, `count`, ...)
//! - Map store and request errors to status codes
//! - Render every failure as `{ "error": "<message>" }`

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::store::{CategorySlice, Record, Statistics, StoreError};

/// Result type for handlers.
pub type ApiResult<T> = Result<Json<T>, ApiError>;

/// Errors surfaced at the HTTP boundary.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Receive body lacks the `data` wrapper.
    #[error("request body must contain a `data` object")]
    MissingEnvelope,

    /// Body is not valid JSON or has the wrong content type.
    #[error("malformed request body: {0}")]
    MalformedBody(String),

    /// Query string is missing a parameter or holds an unusable value.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// Path id is not an integer, so no record can carry it.
    #[error("record with id {0:?} not found")]
    UnknownId(String),

    /// No route matches the request path.
    #[error("no route for {0}")]
    RouteNotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingEnvelope
            | ApiError::MalformedBody(_)
            | ApiError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            ApiError::UnknownId(_) | ApiError::RouteNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Store(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            ApiError::Store(_) => StatusCode::BAD_REQUEST,
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}

/// `{ data }`
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub data: T,
}

/// `{ data, count }`
#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub data: Vec<Record>,
    pub count: usize,
}

impl From<Vec<Record>> for ListResponse {
    fn from(data: Vec<Record>) -> Self {
        Self {
            count: data.len(),
            data,
        }
    }
}

/// `{ data, count, valor_total }`
#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub data: Vec<Record>,
    pub count: usize,
    pub valor_total: f64,
}

impl From<CategorySlice> for CategoryResponse {
    fn from(slice: CategorySlice) -> Self {
        Self {
            count: slice.count(),
            valor_total: slice.valor_total,
            data: slice.records,
        }
    }
}

/// `{ estatisticas }`
#[derive(Debug, Serialize)]
pub struct StatisticsResponse {
    pub estatisticas: Statistics,
}

/// Liveness probe body.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}
