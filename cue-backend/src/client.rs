//! Client for the local cue backend.

use std::time::{Duration, Instant};

use bytes::Bytes;
use cue_stream::{StreamRenderer, drive_stream};
use cue_types::{
    AiRequest, ApiKeyCheck, BackendError, CueConfig, LicenseStatus, ModelInfo, RenderSink,
    StreamError, StreamReport,
};
use futures::Stream;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::error::{is_timeout, map_http_status, map_reqwest_error};

/// Message used when the backend refuses an API key without saying why.
const DEFAULT_KEY_REJECTION: &str = "Invalid API key";

/// HTTP client for the backend that proxies model calls.
///
/// # Example
///
/// ```no_run
/// use cue_backend::BackendClient;
/// use cue_types::{AiRequest, CueConfig};
/// use cue_stream::RecordingSink;
///
/// # async fn run() -> Result<(), cue_types::BackendError> {
/// let client = BackendClient::new(CueConfig::default())?;
/// let request = AiRequest::new("What is a CTE?", None, "gpt-4o", "data engineer", true)
///     .ok_or(cue_types::BackendError::EmptyPrompt)?;
/// let mut sink = RecordingSink::default();
/// let report = client.ask(&request, &mut sink).await?;
/// println!("{}", report.html);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct BackendClient {
    config: CueConfig,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct LicenseReply {
    #[serde(default)]
    status: String,
}

impl BackendClient {
    /// Build a client for `config.backend_url`.
    ///
    /// The configured timeout bounds connecting and each single read. JSON
    /// calls are also bounded as a whole; an answer stream may run as long
    /// as data keeps arriving.
    pub fn new(config: CueConfig) -> Result<Self, BackendError> {
        let timeout = config.request_timeout();
        let http = reqwest::Client::builder()
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .build()
            .map_err(|e| map_reqwest_error(e, timeout))?;
        Ok(Self { config, http })
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &CueConfig {
        &self.config
    }

    /// Check a licence key.
    ///
    /// A blank key is [`LicenseStatus::Empty`] without contacting the
    /// backend. When the backend cannot be reached or answers nonsense the
    /// result is also `Empty`, so the app falls back to demo mode.
    pub async fn validate_license(&self, key: &str) -> LicenseStatus {
        let key = key.trim();
        if key.is_empty() {
            return LicenseStatus::Empty;
        }
        let request = self
            .http
            .post(self.config.endpoint("validate-license"))
            .json(&json!({ "license_key": key }));
        match self.send_json::<LicenseReply>(request).await {
            Ok(reply) => LicenseStatus::from_wire(&reply.status),
            Err(e) => {
                tracing::warn!(error = %e, "licence check failed, using demo mode");
                LicenseStatus::Empty
            }
        }
    }

    /// Ask the backend whether a model API key works.
    pub async fn validate_api_key(&self, key: &str) -> Result<(), BackendError> {
        let request = self
            .http
            .post(self.config.endpoint("validate-api-key"))
            .json(&json!({ "api_key": key }));
        let check: ApiKeyCheck = self.send_json(request).await?;
        if check.valid {
            Ok(())
        } else {
            Err(BackendError::Rejected(
                check
                    .error
                    .filter(|e| !e.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_KEY_REJECTION.to_string()),
            ))
        }
    }

    /// Models the backend can answer with.
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>, BackendError> {
        let request = self.http.get(self.config.endpoint("models"));
        let body: Value = self.send_json(request).await?;
        parse_models(&body)
    }

    /// Drop the backend's conversation memory.
    pub async fn clear_conversation(&self) -> Result<(), BackendError> {
        let url = self.config.endpoint("conversation/clear");
        tracing::debug!(url = %url, "clearing conversation");
        let response = self
            .http
            .post(url)
            .timeout(self.timeout())
            .send()
            .await
            .map_err(|e| self.map_err(e))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_http_status(status, &body));
        }
        Ok(())
    }

    /// Start an answer and return the raw response body.
    ///
    /// Fails before sending when the request has nothing to answer, and
    /// with the mapped status when the backend refuses the request.
    pub async fn open_stream(
        &self,
        request: &AiRequest,
    ) -> Result<impl Stream<Item = Result<Bytes, reqwest::Error>>, BackendError> {
        if !request.has_prompt() {
            return Err(BackendError::EmptyPrompt);
        }
        let url = self.config.endpoint("ai/stream");
        tracing::debug!(
            url = %url,
            model = %request.text_model,
            screenshot = request.screenshot.is_some(),
            "opening answer stream"
        );
        let response = self
            .http
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| self.map_err(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_http_status(status, &body));
        }
        Ok(response.bytes_stream())
    }

    /// Ask a question and render the streamed answer into `sink`.
    ///
    /// Time to first chunk is measured from just before the request is sent.
    /// A stream that stalls for longer than the configured timeout fails
    /// with [`BackendError::Timeout`].
    pub async fn ask<K>(&self, request: &AiRequest, sink: K) -> Result<StreamReport, BackendError>
    where
        K: RenderSink,
    {
        let started = Instant::now();
        let body = self.open_stream(request).await?;
        let renderer = StreamRenderer::new(request.text_model.clone(), started);
        match drive_stream(body, renderer, sink).await {
            Ok(report) => Ok(report),
            Err(StreamError::Network(source)) if is_timeout(&*source) => {
                tracing::warn!(model = %request.text_model, "answer stream stalled");
                Err(BackendError::Timeout(self.timeout()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, BackendError> {
        let response = request
            .timeout(self.timeout())
            .send()
            .await
            .map_err(|e| self.map_err(e))?;
        let status = response.status();
        let text = response.text().await.map_err(|e| self.map_err(e))?;
        if !status.is_success() {
            return Err(map_http_status(status, &text));
        }
        serde_json::from_str(&text).map_err(|e| BackendError::InvalidResponse(e.to_string()))
    }

    fn map_err(&self, err: reqwest::Error) -> BackendError {
        map_reqwest_error(err, self.timeout())
    }

    fn timeout(&self) -> Duration {
        self.config.request_timeout()
    }
}

/// Accepts `{"models": [...]}` or a bare array; entries are ids or
/// `{"id", "name"}` objects.
fn parse_models(body: &Value) -> Result<Vec<ModelInfo>, BackendError> {
    let entries = match body {
        Value::Array(items) => items,
        Value::Object(obj) => obj
            .get("models")
            .and_then(Value::as_array)
            .ok_or_else(|| BackendError::InvalidResponse("missing \"models\" array".into()))?,
        _ => {
            return Err(BackendError::InvalidResponse(
                "expected a model list".into(),
            ));
        }
    };

    let models = entries
        .iter()
        .filter_map(|entry| match entry {
            Value::String(id) if !id.is_empty() => Some(ModelInfo {
                id: id.clone(),
                name: None,
            }),
            Value::Object(obj) => {
                let id = obj.get("id").and_then(Value::as_str).filter(|s| !s.is_empty())?;
                Some(ModelInfo {
                    id: id.to_string(),
                    name: obj.get("name").and_then(Value::as_str).map(str::to_string),
                })
            }
            other => {
                tracing::debug!(entry = %other, "skipping unrecognised model entry");
                None
            }
        })
        .collect();
    Ok(models)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_keeps_config() {
        let client = BackendClient::new(CueConfig::default()).unwrap();
        assert_eq!(client.config().backend_url, "http://127.0.0.1:5050");
        assert_eq!(client.timeout(), Duration::from_secs(120));
    }

    #[test]
    fn models_from_wrapped_strings() {
        let models = parse_models(&json!({ "models": ["gpt-4o", "gpt-3.5-turbo"] })).unwrap();
        let ids: Vec<&str> = models.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["gpt-4o", "gpt-3.5-turbo"]);
        assert!(models.iter().all(|m| m.name.is_none()));
    }

    #[test]
    fn models_from_bare_array_of_objects() {
        let models = parse_models(&json!([
            { "id": "gpt-4o", "name": "GPT-4o" },
            { "id": "o1-mini" },
            { "name": "no id" },
            42
        ]))
        .unwrap();
        assert_eq!(models.len(), 2);
        assert_eq!(models[0].label(), "GPT-4o");
        assert_eq!(models[1].label(), "o1-mini");
    }

    #[test]
    fn models_rejects_other_shapes() {
        assert!(matches!(
            parse_models(&json!({ "data": [] })),
            Err(BackendError::InvalidResponse(_))
        ));
        assert!(matches!(
            parse_models(&json!("gpt-4o")),
            Err(BackendError::InvalidResponse(_))
        ));
    }
}
