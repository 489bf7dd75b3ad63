/// Wire types exchanged with the detection service.
///
/// Absent fields fall back to empty values; a missing key degrades one panel
/// rather than rejecting the payload.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::FetchError;

// ---------------------------------------------------------------------------
// Stats snapshot
// ---------------------------------------------------------------------------

/// Aggregate statistics returned by `GET /predictions/stats`.
///
/// A new snapshot fully replaces the previous one on every poll.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsSnapshot {
    pub total_predictions: u64,
    pub anomaly_count: u64,
    pub normal_count: u64,
    /// Share of normal predictions, `0.0..=1.0`.
    pub accuracy: f64,
    /// Hour of day (`"0"`..`"23"`) to login count.
    pub hourly_distribution: BTreeMap<String, Value>,
    /// Location label to login count.
    pub geographic_distribution: BTreeMap<String, Value>,
}

impl StatsSnapshot {
    /// Login count for one hour of the day, `0` when the hour is absent.
    pub fn hour_count(&self, hour: usize) -> u64 {
        self.hourly_distribution
            .get(&hour.to_string())
            .or_else(|| self.hourly_distribution.get(&format!("{hour:02}")))
            .map(count_value)
            .unwrap_or(0)
    }

    /// Location counts in key order.
    pub fn location_counts(&self) -> impl Iterator<Item = (&str, u64)> {
        self.geographic_distribution
            .iter()
            .map(|(label, value)| (label.as_str(), count_value(value)))
    }
}

/// Interpret a JSON value as a non-negative count. Anything else counts as 0.
pub fn count_value(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && *f >= 0.0)
                    .map(|f| f as u64)
            })
            .unwrap_or(0),
        _ => 0,
    }
}

// ---------------------------------------------------------------------------
// Prediction history
// ---------------------------------------------------------------------------

/// One stored prediction from `GET /predictions/history`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    /// ISO-8601 time the backend stored the prediction.
    #[serde(default)]
    pub timestamp: String,
    /// The login event as submitted (`user_id`, `geo_location`, ...).
    #[serde(default)]
    pub input_data: Map<String, Value>,
    #[serde(default)]
    pub prediction: Verdict,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability_normal: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability_anomaly: Option<f64>,
}

/// The classification stored with a history record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    #[serde(default)]
    pub anomaly: i64,
}

impl PredictionRecord {
    /// Build a record from one element of the history array.
    ///
    /// Each field is read on its own: a null or non-object `input_data` is an
    /// empty map, a non-string `timestamp` is empty, and `anomaly` is set for
    /// `1`, `1.0` or `true`.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };

        let anomaly = obj
            .get("prediction")
            .and_then(|p| p.get("anomaly"))
            .map(flag_value)
            .unwrap_or(0);

        Self {
            timestamp: obj
                .get("timestamp")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            input_data: obj
                .get("input_data")
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default(),
            prediction: Verdict { anomaly },
            probability_normal: obj.get("probability_normal").and_then(Value::as_f64),
            probability_anomaly: obj.get("probability_anomaly").and_then(Value::as_f64),
        }
    }

    pub fn is_anomaly(&self) -> bool {
        self.prediction.anomaly == 1
    }

    /// Raw input field by name.
    pub fn input(&self, key: &str) -> Option<&Value> {
        self.input_data.get(key)
    }
}

/// Decode a `GET /predictions/history` body, one record per array element.
pub fn history_from_value(value: &Value) -> Result<Vec<PredictionRecord>, FetchError> {
    let Some(items) = value.as_array() else {
        return Err(FetchError::Malformed(
            "history response is not a JSON array".to_string(),
        ));
    };
    Ok(items.iter().map(PredictionRecord::from_value).collect())
}

/// `1`, `1.0` and `true` map to 1; other integers pass through; anything else is 0.
fn flag_value(value: &Value) -> i64 {
    match value {
        Value::Bool(b) => i64::from(*b),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| *f == 1.0).map(|_| 1))
            .unwrap_or(0),
        _ => 0,
    }
}

// ---------------------------------------------------------------------------
// Prediction request
// ---------------------------------------------------------------------------

/// JSON body for `POST /predict`.
///
/// Built from form fields by [`crate::predict::form::PredictionForm`]; the
/// numeric fields have already been coerced when this value exists.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PredictionRequest {
    fields: Map<String, Value>,
}

impl PredictionRequest {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn as_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}

// ---------------------------------------------------------------------------
// Prediction result
// ---------------------------------------------------------------------------

/// A successful classification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub anomaly: bool,
    pub probability_normal: f64,
    pub probability_anomaly: f64,
}

/// Answer of `POST /predict`: either a classification or an explicit error.
#[derive(Debug, Clone, PartialEq)]
pub enum PredictionResult {
    Outcome(Prediction),
    Failure { error: String },
}

impl PredictionResult {
    /// Decode a response body.
    ///
    /// A non-empty `error` field always wins. Otherwise `anomaly`,
    /// `probability_normal` and `probability_anomaly` must all be present and
    /// numeric, or the body is [`FetchError::Malformed`].
    pub fn from_value(value: &Value) -> Result<Self, FetchError> {
        let Some(obj) = value.as_object() else {
            return Err(FetchError::Malformed(
                "prediction response is not a JSON object".to_string(),
            ));
        };

        if let Some(error) = error_message(obj) {
            return Ok(Self::Failure { error });
        }

        let anomaly = match obj.get("anomaly") {
            Some(Value::Number(n)) => n.as_f64() == Some(1.0),
            Some(Value::Bool(b)) => *b,
            _ => return Err(missing("anomaly")),
        };
        let probability_normal = obj
            .get("probability_normal")
            .and_then(Value::as_f64)
            .ok_or_else(|| missing("probability_normal"))?;
        let probability_anomaly = obj
            .get("probability_anomaly")
            .and_then(Value::as_f64)
            .ok_or_else(|| missing("probability_anomaly"))?;

        Ok(Self::Outcome(Prediction {
            anomaly,
            probability_normal,
            probability_anomaly,
        }))
    }
}

/// Extract a non-empty `error` message from a response object.
pub(crate) fn error_message(obj: &Map<String, Value>) -> Option<String> {
    match obj.get("error")? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn missing(field: &str) -> FetchError {
    FetchError::Malformed(format!("missing or non-numeric field `{field}`"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
