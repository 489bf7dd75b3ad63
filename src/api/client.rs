/// HTTP client for the detection service.
///
/// Uses the synchronous `ureq` client. Every call carries its own timeout.
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::types::{error_message, history_from_value};
use super::{
    DashboardSource, FetchError, PredictionRecord, PredictionRequest, PredictionResult,
    PredictionService, StatsSnapshot,
};
use crate::config::schema::BackendConfig;

const STATS_PATH: &str = "/predictions/stats";
const HISTORY_PATH: &str = "/predictions/history";
const PREDICT_PATH: &str = "/predict";
const HEALTH_PATH: &str = "/health";

/// Timeout for the health probe, independent of the configured one.
const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Synchronous client for the detection service.
#[derive(Debug, Clone)]
pub struct BackendClient {
    base_url: String,
    timeout: Duration,
}

impl BackendClient {
    /// Build a client from the resolved config.
    pub fn from_config(config: &BackendConfig) -> Self {
        Self::new(&config.base_url, Duration::from_millis(config.timeout_ms))
    }

    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    /// Cap the request timeout. Only ever lowers it.
    pub fn with_timeout_cap(mut self, cap: Duration) -> Self {
        self.timeout = self.timeout.min(cap);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Check whether the backend answers `GET /health` with
    /// `{"status": "healthy"}`.
    pub fn is_healthy(&self) -> bool {
        let result = ureq::get(&self.url(HEALTH_PATH))
            .timeout(HEALTH_TIMEOUT.min(self.timeout))
            .call();

        match result {
            Ok(resp) => resp
                .into_json::<Value>()
                .ok()
                .and_then(|body| body.get("status").and_then(Value::as_str).map(str::to_owned))
                .is_some_and(|status| status == "healthy"),
            Err(_) => false,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET a JSON document.
    ///
    /// A 2xx body that is an object carrying `error` is reported as
    /// [`FetchError::Application`] instead of being decoded as an empty value.
    fn get_value(&self, path: &str) -> Result<Value, FetchError> {
        let resp = ureq::get(&self.url(path))
            .timeout(self.timeout)
            .call()
            .map_err(map_call_error)?;

        let body = parse_body(read_body(resp)?)?;
        if let Some(msg) = body.as_object().and_then(error_message) {
            return Err(FetchError::Application(msg));
        }
        Ok(body)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        serde_json::from_value(self.get_value(path)?)
            .map_err(|e| FetchError::Malformed(format!("{path}: {e}")))
    }
}

impl DashboardSource for BackendClient {
    fn fetch_stats(&self) -> Result<StatsSnapshot, FetchError> {
        self.get_json(STATS_PATH)
    }

    fn fetch_history(&self) -> Result<Vec<PredictionRecord>, FetchError> {
        history_from_value(&self.get_value(HISTORY_PATH)?)
    }
}

impl PredictionService for BackendClient {
    fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult, FetchError> {
        let body = match ureq::post(&self.url(PREDICT_PATH))
            .timeout(self.timeout)
            .send_json(request)
        {
            Ok(resp) => parse_body(read_body(resp)?)?,
            // The service answers bad input with 400 + {"error": ...}
            Err(ureq::Error::Status(code, resp)) => match read_body(resp).map(parse_body) {
                Ok(Ok(body)) if body.is_object() => body,
                _ => return Err(FetchError::Transport(format!("HTTP {code}"))),
            },
            Err(err) => return Err(map_call_error(err)),
        };

        PredictionResult::from_value(&body)
    }
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn read_body(resp: ureq::Response) -> Result<String, FetchError> {
    resp.into_string()
        .map_err(|e| FetchError::Transport(format!("failed to read response body: {e}")))
}

fn parse_body(body: String) -> Result<Value, FetchError> {
    serde_json::from_str(&body).map_err(|e| FetchError::Malformed(format!("invalid JSON: {e}")))
}

/// Translate a `ureq` error, surfacing `{"error": ...}` bodies on non-2xx
/// statuses as application errors.
fn map_call_error(err: ureq::Error) -> FetchError {
    match err {
        ureq::Error::Status(code, resp) => {
            let message = read_body(resp)
                .ok()
                .and_then(|body| serde_json::from_str::<Value>(&body).ok())
                .and_then(|body| body.as_object().and_then(error_message));
            match message {
                Some(msg) => FetchError::Application(msg),
                None => FetchError::Transport(format!("HTTP {code}")),
            }
        }
        ureq::Error::Transport(transport) => FetchError::Transport(transport.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
