//! Request descriptor types
//!
//! Defines the data structures deserialized from the YAML test case table.

use serde::{Deserialize, Serialize};
use std::fmt;

/// HTTP verb used for a resource operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    /// Read (or observe, on an `/observe` path)
    Get,
    /// Write or write-attributes
    Put,
    /// Create an object instance
    Post,
    /// Delete an object instance
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Put => "PUT",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        }
    }

    /// Whether requests with this method carry the descriptor's payload
    pub fn carries_body(&self) -> bool {
        matches!(self, Method::Put | Method::Post)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Put => reqwest::Method::PUT,
            Method::Post => reqwest::Method::POST,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Encoding the server should use for the resource value
///
/// Sent as the `format` query parameter. `None` sends no parameter and
/// lets the server pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub enum ContentFormat {
    #[serde(rename = "Text")]
    Text,
    #[serde(rename = "TLV")]
    Tlv,
    #[serde(rename = "JSON")]
    Json,
    #[default]
    #[serde(rename = "none", alias = "")]
    None,
}

impl ContentFormat {
    /// Value for the `format` query parameter, if any
    pub fn query_value(&self) -> Option<&'static str> {
        match self {
            ContentFormat::Text => Some("Text"),
            ContentFormat::Tlv => Some("TLV"),
            ContentFormat::Json => Some("JSON"),
            ContentFormat::None => None,
        }
    }
}

impl fmt::Display for ContentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.query_value().unwrap_or("none"))
    }
}

/// One entry of the test case table
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RequestDescriptor {
    /// Optional note on what the step does (e.g. "read instance")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// HTTP verb
    pub method: Method,
    /// LWM2M resource path, e.g. `/3/0/0`, optionally with a query
    pub path: String,
    /// Requested content format
    #[serde(default)]
    pub format: ContentFormat,
    /// JSON body for PUT/POST
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
    /// Test case to run right after this one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub then: Option<String>,
}

impl RequestDescriptor {
    /// Check the entry on its own; table-level links are checked by the table
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();

        let path = self.path.trim();
        if path.is_empty() || path == "/" {
            problems.push("resource path is empty".to_string());
        }
        if self.path.chars().any(char::is_whitespace) {
            problems.push(format!("resource path '{}' contains whitespace", self.path));
        }
        if self.payload.is_some() && !self.method.carries_body() {
            problems.push(format!("{} requests cannot carry a payload", self.method));
        }

        problems
    }
}
