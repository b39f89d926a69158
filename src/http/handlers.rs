//! Route handlers.
//!
//! Each handler is a thin translation from HTTP to one `RecordStore` call;
//! all error mapping happens in `ApiError`.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{HeaderMap, Uri},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::http::request::request_id;
use crate::http::response::{
    ApiError, ApiResult, CategoryResponse, DataResponse, HealthResponse, ListResponse,
    StatisticsResponse,
};
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::store::Record;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PeriodParams {
    pub inicio: Option<String>,
    pub fim: Option<String>,
}

/// `GET /health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `POST /api/receive`
pub async fn receive(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<DataResponse<Record>> {
    let request_id = request_id(&headers);
    let result = unwrap_envelope(body)
        .and_then(|payload| state.store.insert(payload).map_err(ApiError::from));

    match result {
        Ok(record) => {
            tracing::info!(
                request_id = %request_id,
                id = record.id,
                nome = %record.nome,
                "Record received"
            );
            Ok(Json(DataResponse { data: record }))
        }
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Record rejected");
            metrics::record_ingest("rejected");
            Err(e)
        }
    }
}

/// Pull the record payload out of `{ "data": { ... } }`.
fn unwrap_envelope(body: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
    let Json(body) = body.map_err(|rejection| ApiError::MalformedBody(rejection.body_text()))?;
    match body {
        Value::Object(mut fields) => match fields.remove("data") {
            None | Some(Value::Null) => Err(ApiError::MissingEnvelope),
            Some(data) => Ok(data),
        },
        _ => Err(ApiError::MissingEnvelope),
    }
}

/// `GET /api/consultar`
pub async fn list_all(State(state): State<AppState>) -> Json<ListResponse> {
    Json(state.store.list_all().into())
}

/// `GET /api/consultar/{id}`
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<DataResponse<Record>> {
    let id: i64 = raw_id
        .trim()
        .parse()
        .map_err(|_| ApiError::UnknownId(raw_id.clone()))?;
    let record = state.store.get(id)?;
    Ok(Json(DataResponse { data: record }))
}

/// `GET /api/consultar/categoria/{categoria}`
pub async fn by_category(
    State(state): State<AppState>,
    Path(categoria): Path<String>,
) -> Json<CategoryResponse> {
    Json(state.store.by_category(&categoria).into())
}

/// `GET /api/consultar/categoria/{categoria}/ultimo`
pub async fn latest_in_category(
    State(state): State<AppState>,
    Path(categoria): Path<String>,
) -> ApiResult<DataResponse<Record>> {
    let record = state.store.latest_in_category(&categoria)?;
    Ok(Json(DataResponse { data: record }))
}

/// `GET /api/consultar/recentes`
pub async fn recent(State(state): State<AppState>) -> Json<ListResponse> {
    Json(state.store.recent(state.recent_window).into())
}

/// `GET /api/consultar/periodo?inicio=..&fim=..`
pub async fn period(
    State(state): State<AppState>,
    params: Result<Query<PeriodParams>, QueryRejection>,
) -> ApiResult<ListResponse> {
    let Query(params) = params.map_err(|r| ApiError::InvalidQuery(r.body_text()))?;
    let start = parse_bound("inicio", params.inicio.as_deref())?;
    let end = parse_bound("fim", params.fim.as_deref())?;
    let records = state.store.received_between(start, end)?;
    Ok(Json(records.into()))
}

fn parse_bound(name: &str, value: Option<&str>) -> Result<DateTime<Utc>, ApiError> {
    let value = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::InvalidQuery(format!("missing `{name}` parameter")))?;
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ApiError::InvalidQuery(format!("`{name}` is not an RFC 3339 timestamp: {e}")))
}

/// `GET /api/estatisticas`
pub async fn statistics(State(state): State<AppState>) -> Json<StatisticsResponse> {
    Json(StatisticsResponse {
        estatisticas: state.store.statistics(),
    })
}

/// `GET /api/buscar?q=..`
pub async fn search(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> ApiResult<ListResponse> {
    let Query(params) = params.map_err(|r| ApiError::InvalidQuery(r.body_text()))?;
    let records = state.store.search(params.q.as_deref().unwrap_or_default())?;
    Ok(Json(records.into()))
}

/// Fallback for unknown paths.
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::RouteNotFound(uri.path().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    use ::metrics::{Counter, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit};
    use chrono::TimeDelta;
    use serde_json::json;

    use crate::store::RecordStore;

    /// Counts `ingest_records_received_total` by outcome.
    #[derive(Default)]
    struct OutcomeRecorder {
        inserted: Arc<AtomicU64>,
        rejected: Arc<AtomicU64>,
    }

    impl Recorder for OutcomeRecorder {
        fn describe_counter(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
        fn describe_gauge(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
        fn describe_histogram(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

        fn register_counter(&self, key: &Key, _: &Metadata<'_>) -> Counter {
            if key.name() != "ingest_records_received_total" {
                return Counter::noop();
            }
            match key.labels().find(|l| l.key() == "outcome").map(|l| l.value()) {
                Some("inserted") => Counter::from_arc(self.inserted.clone()),
                Some("rejected") => Counter::from_arc(self.rejected.clone()),
                _ => Counter::noop(),
            }
        }

        fn register_gauge(&self, _: &Key, _: &Metadata<'_>) -> Gauge {
            Gauge::noop()
        }

        fn register_histogram(&self, _: &Key, _: &Metadata<'_>) -> Histogram {
            Histogram::noop()
        }
    }

    #[test]
    fn test_every_rejected_receive_is_counted() {
        let recorder = OutcomeRecorder::default();
        let state = AppState {
            store: Arc::new(RecordStore::new()),
            recent_window: TimeDelta::hours(24),
        };

        ::metrics::with_local_recorder(&recorder, || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async {
                let bodies = [
                    Json::<Value>::from_bytes(b"{\"data\": {"),
                    Ok(Json(json!({"nome": "Produto sem envelope", "valor": 1}))),
                    Ok(Json(json!({"data": {"id": 1, "nome": "Cabo"}}))),
                    Ok(Json(json!({"data": {"id": 2, "nome": "Cabo", "valor": 9.9}}))),
                ];
                for body in bodies {
                    let _ = receive(State(state.clone()), HeaderMap::new(), body).await;
                }
            });
        });

        assert_eq!(recorder.rejected.load(Ordering::Relaxed), 3);
        assert_eq!(recorder.inserted.load(Ordering::Relaxed), 1);
        assert_eq!(state.store.len(), 1);
    }

    #[test]
    fn test_parse_bound() {
        let parsed = parse_bound("inicio", Some("2024-05-01T09:00:00-03:00")).unwrap();
        assert_eq!(parsed, "2024-05-01T12:00:00Z".parse::<DateTime<Utc>>().unwrap());

        assert!(matches!(
            parse_bound("fim", None),
            Err(ApiError::InvalidQuery(msg)) if msg.contains("fim")
        ));
        assert!(matches!(
            parse_bound("fim", Some("  ")),
            Err(ApiError::InvalidQuery(_))
        ));
        assert!(matches!(
            parse_bound("inicio", Some("yesterday")),
            Err(ApiError::InvalidQuery(_))
        ));
    }
}
