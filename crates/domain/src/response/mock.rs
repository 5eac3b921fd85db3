//! Mock response record
//!
//! The state a controller writes through the response contract, and that
//! expectations are evaluated against once a body has been sent.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::headers::{canonical_name, normalize_value};
use super::status::StatusCode;

/// In-memory stand-in for an HTTP response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MockResponse {
    /// Status written by the controller, unset until written.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Mirror of `status`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    /// Response headers keyed by lower-cased name.
    #[serde(default)]
    pub headers: BTreeMap<String, Value>,
    /// Value passed to `send`/`json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    /// String form of the body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Caller-injected or controller-written fields.
    #[serde(default, flatten)]
    pub extensions: Map<String, Value>,
}

impl MockResponse {
    /// Creates an empty response.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a status in both `status` and `status_code`.
    pub fn set_status(&mut self, code: u16) {
        self.status = Some(code);
        self.status_code = Some(code);
    }

    /// Returns the status as a `StatusCode`, if one was written.
    #[must_use]
    pub fn status_code(&self) -> Option<StatusCode> {
        self.status.map(StatusCode::new)
    }

    /// Merges headers into the response, normalizing names and values.
    pub fn merge_headers<I, K, V>(&mut self, headers: I, lowercase_values: bool)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        for (name, value) in headers {
            self.headers.insert(
                canonical_name(name.as_ref()),
                normalize_value(value.into(), lowercase_values),
            );
        }
    }

    /// Looks up a header case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&Value> {
        self.headers.get(&canonical_name(name))
    }

    /// Records a sent body and derives its text form.
    ///
    /// Text bodies keep their string; structured bodies are rendered as
    /// compact JSON.
    pub fn record_body(&mut self, body: Value) {
        self.text = Some(match &body {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        });
        self.body = Some(body);
    }

    /// Looks up a field by name, recognized or extension.
    ///
    /// `status`, `statusCode`, `status_code`, `headers`, `body` and `text`
    /// read the recognized fields; any other name reads an extension.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<Value> {
        match field {
            "status" | "statusCode" | "status_code" => self.status.map(Value::from),
            "headers" => Some(Value::Object(self.headers.clone().into_iter().collect())),
            "body" => self.body.clone(),
            "text" => self.text.clone().map(Value::String),
            _ => self.extensions.get(field).cloned(),
        }
    }

    /// Writes a field by name, overwriting its previous value.
    ///
    /// Recognized names replace the matching field: a status must be a valid
    /// code, `headers` an object whose keys are stored lower-cased, and
    /// `text` a string. A value the field cannot hold leaves it unset. Header
    /// values are stored as given.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        let field = field.into();
        let value = value.into();
        match field.as_str() {
            "status" | "statusCode" | "status_code" => {
                match value.as_u64().and_then(|code| u16::try_from(code).ok()) {
                    Some(code) => self.set_status(code),
                    None => {
                        self.status = None;
                        self.status_code = None;
                    }
                }
            }
            "headers" => {
                self.headers.clear();
                if let Value::Object(headers) = value {
                    self.merge_headers(headers, false);
                }
            }
            "body" => match value {
                Value::Null => {
                    self.body = None;
                    self.text = None;
                }
                body => self.record_body(body),
            },
            "text" => self.text = value.as_str().map(str::to_string),
            _ => {
                self.extensions.insert(field, value);
            }
        }
    }

    /// Shallow-merges a JSON object into the response.
    ///
    /// Each key is written as by [`MockResponse::set`]. Anything other than
    /// an object is ignored.
    pub fn extend(&mut self, data: Value) {
        let Value::Object(fields) = data else {
            return;
        };
        for (key, value) in fields {
            self.set(key, value);
        }
    }
}
