use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;

/// Errors returned by [`IngestClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// The service answered with a non-success status.
    #[error("service returned {status}: {error}")]
    Api { status: u16, error: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid service url: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    /// HTTP status for API errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// A stored record as returned by the service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Record {
    pub id: i64,
    pub nome: String,
    pub valor: f64,
    pub categoria: String,
    pub received_at: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// `{ data, count }`
#[derive(Debug, Clone, Deserialize)]
pub struct RecordList {
    pub data: Vec<Record>,
    pub count: usize,
}

/// `{ data, count, valor_total }`
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryListing {
    pub data: Vec<Record>,
    pub count: usize,
    pub valor_total: f64,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Statistics {
    pub total_registros: usize,
    pub total_categorias: usize,
    pub valor_medio: f64,
    pub valor_total: f64,
}

#[derive(Debug, Deserialize)]
struct StatisticsEnvelope {
    estatisticas: Statistics,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
}

pub struct IngestClient {
    client: Client,
    base_url: String,
}

impl IngestClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        let resp = self.client.get(self.url("/health")).send().await?;
        decode(resp).await
    }

    /// Send a record. `data` is wrapped in the `{ "data": ... }` envelope.
    pub async fn send(&self, data: Value) -> Result<Record, ClientError> {
        let resp = self
            .client
            .post(self.url("/api/receive"))
            .json(&json!({ "data": data }))
            .send()
            .await?;
        decode::<Envelope<Record>>(resp).await.map(|e| e.data)
    }

    pub async fn list(&self) -> Result<RecordList, ClientError> {
        let resp = self.client.get(self.url("/api/consultar")).send().await?;
        decode(resp).await
    }

    pub async fn get(&self, id: i64) -> Result<Record, ClientError> {
        let resp = self
            .client
            .get(self.url(&format!("/api/consultar/{id}")))
            .send()
            .await?;
        decode::<Envelope<Record>>(resp).await.map(|e| e.data)
    }

    pub async fn by_category(&self, categoria: &str) -> Result<CategoryListing, ClientError> {
        let resp = self
            .client
            .get(self.segments_url(&["api", "consultar", "categoria", categoria])?)
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn latest_in_category(&self, categoria: &str) -> Result<Record, ClientError> {
        let resp = self
            .client
            .get(self.segments_url(&["api", "consultar", "categoria", categoria, "ultimo"])?)
            .send()
            .await?;
        decode::<Envelope<Record>>(resp).await.map(|e| e.data)
    }

    pub async fn recent(&self) -> Result<RecordList, ClientError> {
        let resp = self
            .client
            .get(self.url("/api/consultar/recentes"))
            .send()
            .await?;
        decode(resp).await
    }

    /// Records received between two RFC 3339 timestamps, inclusive.
    pub async fn period(&self, inicio: &str, fim: &str) -> Result<RecordList, ClientError> {
        let resp = self
            .client
            .get(self.url("/api/consultar/periodo"))
            .query(&[("inicio", inicio), ("fim", fim)])
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn statistics(&self) -> Result<Statistics, ClientError> {
        let resp = self.client.get(self.url("/api/estatisticas")).send().await?;
        decode::<StatisticsEnvelope>(resp)
            .await
            .map(|e| e.estatisticas)
    }

    pub async fn search(&self, q: &str) -> Result<RecordList, ClientError> {
        let resp = self
            .client
            .get(self.url("/api/buscar"))
            .query(&[("q", q)])
            .send()
            .await?;
        decode(resp).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Base url with `segments` appended, each percent-encoded as one segment.
    fn segments_url(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
    let status = resp.status();
    let text = resp.text().await?;

    if !status.is_success() {
        let error = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.error)
            .unwrap_or(text);
        return Err(ClientError::Api {
            status: status.as_u16(),
            error,
        });
    }

    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_segment_is_encoded() {
        let client = IngestClient::new("http://localhost:1880/");
        let url = client
            .segments_url(&["api", "consultar", "categoria", "Cama/Mesa"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:1880/api/consultar/categoria/Cama%2FMesa"
        );

        let url = client
            .segments_url(&["api", "consultar", "categoria", "C#", "ultimo"])
            .unwrap();
        assert_eq!(url.path(), "/api/consultar/categoria/C%23/ultimo");
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn test_invalid_base_url() {
        let client = IngestClient::new("not a url");
        assert!(matches!(
            client.segments_url(&["api"]),
            Err(ClientError::InvalidUrl(_))
        ));
    }
}
