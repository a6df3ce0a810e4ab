use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::GenerateError;
use crate::payload::ImagePayload;

const GENERATE_PATH: &str = "api/generate-infographic";
const HISTORY_PATH: &str = "api/infographics";
const STATUS_PATH: &str = "api/";

/// The infographic backend as seen by the client.
#[async_trait]
pub trait InfographicApi: Send + Sync {
    /// Asks the backend for a new infographic. Takes no parameters.
    async fn generate(&self) -> Result<ImagePayload, GenerateError>;

    /// Previously generated infographics, newest last as the backend stores them.
    async fn list_infographics(&self) -> Result<Vec<InfographicRecord>, GenerateError>;

    /// Greeting message of the API root, used as a reachability probe.
    async fn status(&self) -> Result<String, GenerateError>;
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    #[serde(default, deserialize_with = "lenient_text")]
    pub id: Option<String>,
    pub image_base64: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfographicRecord {
    pub id: String,
    pub image_base64: ImagePayload,
    #[serde(default)]
    pub prompt: String,
    #[serde(deserialize_with = "flexible_timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl InfographicRecord {
    pub fn payload(&self) -> ImagePayload {
        self.image_base64.clone()
    }
}

/// Informational fields never fail a response: numbers are kept as text,
/// anything else that is not a string is dropped.
fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(text)) => Some(text),
        Some(Value::Number(number)) => Some(number.to_string()),
        _ => None,
    })
}

/// RFC 3339, or an ISO 8601 timestamp without offset, which is taken as UTC.
fn flexible_timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(timestamp.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(serde::de::Error::custom)
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<Value>,
}

/// Extracts a human-readable message from an error body.
///
/// `detail` is a string for application errors and a list of
/// `{ "msg": ... }` objects for request validation errors.
pub fn error_detail(body: &str) -> Option<String> {
    let body: ErrorBody = serde_json::from_str(body).ok()?;
    match body.detail? {
        Value::String(detail) => Some(detail),
        Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        _ => None,
    }
}

/// Accepts only a JSON object carrying a non-empty string `image_base64`.
pub fn parse_generate_body(body: &[u8]) -> Result<GenerateResponse, GenerateError> {
    let response: GenerateResponse =
        serde_json::from_slice(body).map_err(|_| GenerateError::MalformedResponse)?;

    match response.image_base64.as_deref() {
        Some(image) if !image.is_empty() => Ok(response),
        _ => Err(GenerateError::MalformedResponse),
    }
}

pub struct HttpBackend {
    client: reqwest::Client,
    config: ClientConfig,
}

impl HttpBackend {
    pub fn new(config: ClientConfig) -> Result<Self, GenerateError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(GenerateError::transport)?;

        Ok(Self { client, config })
    }

    async fn fail(status: StatusCode, response: reqwest::Response) -> GenerateError {
        let body = response.text().await.unwrap_or_default();
        let detail = error_detail(&body);
        warn!("Backend returned {}: {}", status, detail.as_deref().unwrap_or(&body));

        GenerateError::Backend {
            status: status.as_u16(),
            detail,
        }
    }
}

#[async_trait]
impl InfographicApi for HttpBackend {
    async fn generate(&self) -> Result<ImagePayload, GenerateError> {
        let url = self.config.endpoint(GENERATE_PATH);
        info!("Requesting infographic from {}", url);

        let response = self
            .client
            .post(&url)
            .send()
            .await
            .map_err(GenerateError::transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::fail(status, response).await);
        }

        let body = response.bytes().await.map_err(GenerateError::transport)?;
        let parsed = parse_generate_body(&body).inspect_err(|_| {
            warn!("Backend answered {} without image data ({} bytes)", status, body.len());
        })?;

        debug!(
            "Infographic {} received: {}",
            parsed.id.as_deref().unwrap_or("<no id>"),
            parsed.message.as_deref().unwrap_or("")
        );

        // parse_generate_body guarantees the field is present
        Ok(ImagePayload::new(parsed.image_base64.unwrap_or_default()))
    }

    async fn list_infographics(&self) -> Result<Vec<InfographicRecord>, GenerateError> {
        let url = self.config.endpoint(HISTORY_PATH);
        debug!("Fetching infographic history from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(GenerateError::transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::fail(status, response).await);
        }

        let body = response.bytes().await.map_err(GenerateError::transport)?;
        let records: Vec<InfographicRecord> =
            serde_json::from_slice(&body).map_err(|_| GenerateError::MalformedResponse)?;

        debug!("Loaded {} infographics", records.len());
        Ok(records)
    }

    async fn status(&self) -> Result<String, GenerateError> {
        let url = self.config.endpoint(STATUS_PATH);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(GenerateError::transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::fail(status, response).await);
        }

        let body = response.bytes().await.map_err(GenerateError::transport)?;
        let parsed: StatusResponse =
            serde_json::from_slice(&body).map_err(|_| GenerateError::MalformedResponse)?;

        Ok(parsed.message)
    }
}
