//! Backend access for the login anomaly detection service.
//!
//! The service exposes three endpoints that loginscope consumes:
//!
//! - `GET /predictions/stats` — aggregate [`StatsSnapshot`]
//! - `GET /predictions/history` — chronological [`PredictionRecord`] list
//! - `POST /predict` — classify one login event ([`PredictionResult`])
//!
//! The dashboard and the prediction flow depend on the [`DashboardSource`]
//! and [`PredictionService`] traits rather than on [`BackendClient`]
//! directly, so both can be driven by in-memory fakes.

use std::fmt;

pub mod client;
pub mod types;

pub use client::BackendClient;
pub use types::{Prediction, PredictionRecord, PredictionRequest, PredictionResult, StatsSnapshot};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a backend call produced no usable payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The request never completed: connection refused, DNS, timeout, or a
    /// non-2xx status without an explanatory body.
    Transport(String),
    /// A response arrived but its body was not the expected JSON shape.
    Malformed(String),
    /// The backend answered with an explicit `{"error": ...}` body.
    Application(String),
}

impl FetchError {
    /// Short machine-readable kind, used in the event log.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Malformed(_) => "malformed",
            Self::Application(_) => "application",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Transport(msg) | Self::Malformed(msg) | Self::Application(msg) => msg,
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(msg) => write!(f, "request failed: {msg}"),
            Self::Malformed(msg) => write!(f, "unexpected response: {msg}"),
            Self::Application(msg) => write!(f, "backend error: {msg}"),
        }
    }
}

impl std::error::Error for FetchError {}

// ---------------------------------------------------------------------------
// Seams
// ---------------------------------------------------------------------------

/// Read side of the backend, polled by the dashboard.
pub trait DashboardSource {
    fn fetch_stats(&self) -> Result<StatsSnapshot, FetchError>;
    fn fetch_history(&self) -> Result<Vec<PredictionRecord>, FetchError>;
}

/// Write side of the backend, used by the prediction flow.
pub trait PredictionService {
    /// Submit one login event. An `{"error": ...}` answer is returned as
    /// `Ok(PredictionResult::Failure)`, not as an `Err`.
    fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult, FetchError>;
}

impl<T: DashboardSource + ?Sized> DashboardSource for &T {
    fn fetch_stats(&self) -> Result<StatsSnapshot, FetchError> {
        (**self).fetch_stats()
    }

    fn fetch_history(&self) -> Result<Vec<PredictionRecord>, FetchError> {
        (**self).fetch_history()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_kind_prefix() {
        let err = FetchError::Transport("connection refused".to_string());
        assert_eq!(err.to_string(), "request failed: connection refused");
        assert_eq!(err.kind(), "transport");
        assert_eq!(err.message(), "connection refused");

        let err = FetchError::Application("model unavailable".to_string());
        assert_eq!(err.to_string(), "backend error: model unavailable");
        assert_eq!(err.kind(), "application");
    }

    #[test]
    fn converts_into_anyhow() {
        let err: anyhow::Error = FetchError::Malformed("expected array".to_string()).into();
        assert!(err.to_string().contains("expected array"));
    }
}
