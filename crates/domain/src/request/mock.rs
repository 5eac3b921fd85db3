//! Mock request record

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// In-memory stand-in for an HTTP request.
///
/// None of the recognized fields is required: `None` means "not set",
/// which a controller can tell apart from an empty object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MockRequest {
    /// Route parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    /// Query string parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<Value>,
    /// Parsed request body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    /// Request headers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Value>,
    /// Uploaded files, as multipart middleware would expose them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Value>,
    /// Arbitrary caller-added fields.
    #[serde(default, flatten)]
    pub extensions: Map<String, Value>,
}

impl MockRequest {
    /// Creates an empty request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a field by name, recognized or extension.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        match self.slot(field) {
            Some(slot) => slot.as_ref(),
            None => self.extensions.get(field),
        }
    }

    /// Returns a route parameter.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.as_ref()?.get(name)
    }

    /// Returns a query string parameter.
    #[must_use]
    pub fn query_value(&self, name: &str) -> Option<&Value> {
        self.query.as_ref()?.get(name)
    }

    /// Returns a request header, matching the name case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&Value> {
        self.headers
            .as_ref()?
            .as_object()?
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    /// Shallow-merges a JSON object into the request.
    ///
    /// Keys naming a recognized field replace that field; all other keys
    /// land in the extension fields. Anything other than an object is
    /// ignored.
    pub fn extend(&mut self, data: Value) {
        let Value::Object(fields) = data else {
            return;
        };
        for (key, value) in fields {
            match self.slot_mut(&key) {
                Some(slot) => *slot = Some(value),
                None => {
                    self.extensions.insert(key, value);
                }
            }
        }
    }

    fn slot(&self, field: &str) -> Option<&Option<Value>> {
        match field {
            "params" => Some(&self.params),
            "query" => Some(&self.query),
            "body" => Some(&self.body),
            "headers" => Some(&self.headers),
            "files" => Some(&self.files),
            _ => None,
        }
    }

    fn slot_mut(&mut self, field: &str) -> Option<&mut Option<Value>> {
        match field {
            "params" => Some(&mut self.params),
            "query" => Some(&mut self.query),
            "body" => Some(&mut self.body),
            "headers" => Some(&mut self.headers),
            "files" => Some(&mut self.files),
            _ => None,
        }
    }
}
