//! handleRequest: invoked per inbound HTTP request; returns the response.
//!
//! `rawBody` is always present. `body` is only filled when the raw body
//! parses as a JSON object or array, so handlers must cope with both.

use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use flowhook_core::error::AppError;

use crate::hooks::violation::ContractViolation;

/// Input of handleRequest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandleRequestOptions {
    /// Upper-case HTTP method.
    #[serde(deserialize_with = "deserialize_method")]
    pub method: String,
    /// Request headers.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Query string parameters.
    #[serde(default)]
    pub query_string: BTreeMap<String, String>,
    /// The parsed body, when it is a JSON object or array.
    #[serde(
        default,
        deserialize_with = "deserialize_body",
        skip_serializing_if = "Option::is_none"
    )]
    pub body: Option<Value>,
    /// The unparsed body.
    #[serde(default)]
    pub raw_body: String,
    /// Sandbox flag.
    #[serde(default)]
    pub sandbox: bool,
}

impl HandleRequestOptions {
    /// Build options from a raw request, parsing the body when possible.
    pub fn from_raw(
        method: &str,
        headers: BTreeMap<String, String>,
        query_string: BTreeMap<String, String>,
        raw_body: impl Into<String>,
        sandbox: bool,
    ) -> Result<Self, AppError> {
        let method = normalize_method(method)?;
        let raw_body = raw_body.into();
        let body = serde_json::from_str(&raw_body).ok().and_then(structured);

        Ok(Self {
            method,
            headers,
            query_string,
            body,
            raw_body,
            sandbox,
        })
    }

    /// Upper-cases the method, rejecting one that is not an HTTP token, and
    /// clears a `body` that is not a structured mapping.
    pub fn normalize(&mut self) -> Result<(), AppError> {
        self.method = normalize_method(&self.method)?;
        self.body = self.body.take().and_then(structured);
        Ok(())
    }
}

fn structured(body: Value) -> Option<Value> {
    (body.is_object() || body.is_array()).then_some(body)
}

fn deserialize_method<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let method = String::deserialize(deserializer)?;
    normalize_method(&method).map_err(|e| D::Error::custom(e.message))
}

fn deserialize_body<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Value>, D::Error> {
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(structured))
}

fn normalize_method(method: &str) -> Result<String, AppError> {
    let method = method.trim();
    let is_token = !method.is_empty()
        && method
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b));
    if !is_token {
        return Err(AppError::validation(format!("invalid HTTP method '{method}'")));
    }
    Ok(method.to_ascii_uppercase())
}

/// Output of handleRequest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandleRequestResponse {
    /// HTTP status code.
    pub status_code: u16,
    /// Response headers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    /// Response body.
    #[serde(default)]
    pub body: Value,
}

impl HandleRequestResponse {
    /// A response with no extra headers.
    pub fn new(status_code: u16, body: Value) -> Self {
        Self {
            status_code,
            headers: None,
            body,
        }
    }

    /// The status code must be in `100..=599`.
    pub fn validate(&self) -> Result<(), ContractViolation> {
        if (100..=599).contains(&self.status_code) {
            Ok(())
        } else {
            Err(ContractViolation::InvalidStatusCode(self.status_code))
        }
    }
}
