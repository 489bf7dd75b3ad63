//! Prediction form model: ordered fields, defaults, and request encoding.

use std::sync::LazyLock;

use anyhow::{Result, bail};
use chrono::Local;
use regex::Regex;
use serde_json::{Map, Value};

use crate::api::PredictionRequest;

/// Fields of a login event, in the order they are prompted for.
pub const FORM_FIELDS: [&str; 10] = [
    "user_id",
    "timestamp",
    "ip_address",
    "geo_location",
    "device_id",
    "login_hour",
    "is_new_device",
    "bytes_in",
    "bytes_out",
    "success",
];

/// Fields sent to the backend as integers.
pub const NUMERIC_FIELDS: [&str; 5] = [
    "login_hour",
    "is_new_device",
    "bytes_in",
    "bytes_out",
    "success",
];

/// Leading integer, optionally signed, with an optional `0x` hex prefix.
static LEADING_INT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([+-]?)(?:0[xX]([0-9a-fA-F]+)|([0-9]+))")
        .expect("leading integer regex must compile")
});

/// Current local time as a `YYYY-MM-DDTHH:MM` value, the format used to
/// pre-fill the `timestamp` field.
pub fn now_as_local_input_value() -> String {
    Local::now().format("%Y-%m-%dT%H:%M").to_string()
}

/// Parse the integer prefix of `raw`; `None` when there is none.
///
/// `"42"` → 42, `" 7 hours"` → 7, `"-3"` → -3, `"0x1f"` → 31,
/// `"abc"` → `None`, `""` → `None`.
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let caps = LEADING_INT_RE.captures(raw)?;
    let negative = caps.get(1).is_some_and(|m| m.as_str() == "-");

    let magnitude = match (caps.get(2), caps.get(3)) {
        (Some(hex), _) => i64::from_str_radix(hex.as_str(), 16).ok()?,
        (None, Some(dec)) => dec.as_str().parse::<i64>().ok()?,
        (None, None) => return None,
    };

    Some(if negative { -magnitude } else { magnitude })
}

fn is_numeric_field(key: &str) -> bool {
    NUMERIC_FIELDS.contains(&key)
}

// ---------------------------------------------------------------------------
// Form
// ---------------------------------------------------------------------------

/// User-entered key/value pairs, kept in entry order.
///
/// Every field is a string while it lives in the form; coercion happens only
/// when [`PredictionForm::to_request`] builds the request body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredictionForm {
    fields: Vec<(String, String)>,
}

impl PredictionForm {
    /// An empty form with no fields at all.
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard login-event form: every field present and blank, except
    /// `timestamp`, which holds the current local minute.
    pub fn with_defaults() -> Self {
        let mut form = Self::new();
        for key in FORM_FIELDS {
            form.set(key, "");
        }
        form.set("timestamp", &now_as_local_input_value());
        form
    }

    /// Build a form from `(key, value)` pairs, later duplicates overwriting
    /// earlier ones in place.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut form = Self::new();
        for (key, value) in pairs {
            form.set(key.as_ref(), value.as_ref());
        }
        form
    }

    /// Set a field, keeping its original position if it already exists.
    pub fn set(&mut self, key: &str, value: &str) {
        match self.fields.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.fields.push((key.to_string(), value.to_string())),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Apply a `key=value` assignment from the command line.
    pub fn apply_assignment(&mut self, raw: &str) -> Result<()> {
        let (key, value) = parse_assignment(raw)?;
        self.set(key, value);
        Ok(())
    }

    /// Back to the standard defaults with a fresh timestamp.
    pub fn clear(&mut self) {
        *self = Self::with_defaults();
    }

    /// Encode the form as a request body.
    ///
    /// Numeric fields become JSON integers via [`parse_leading_int`]; a value
    /// with no integer prefix (including a blank one) becomes `null`. All other
    /// fields are sent as strings unchanged.
    pub fn to_request(&self) -> PredictionRequest {
        let mut body = Map::new();
        for (key, value) in &self.fields {
            let encoded = if is_numeric_field(key) {
                parse_leading_int(value).map_or(Value::Null, Value::from)
            } else {
                Value::String(value.clone())
            };
            body.insert(key.clone(), encoded);
        }
        PredictionRequest::new(body)
    }
}

/// Split `key=value` at the first `=`. The key must be non-empty.
pub fn parse_assignment(raw: &str) -> Result<(&str, &str)> {
    let Some((key, value)) = raw.split_once('=') else {
        bail!("expected key=value, got '{raw}'");
    };
    let key = key.trim();
    if key.is_empty() {
        bail!("empty field name in '{raw}'");
    }
    Ok((key, value))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
