use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// RPC Values - Loosely typed parameters as they arrive from the transport
// ============================================================================

/// A single parameter or result value.
///
/// `Nil` is what a JSON `null` decodes to; it is treated like a missing key
/// everywhere parameters are read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RpcValue {
    Nil,
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    Array(Vec<RpcValue>),
}

impl RpcValue {
    /// Loose truthiness used for flags such as `test_mode`.
    ///
    /// `false`, `0`, `0.0`, `""`, `"0"`, nil and empty arrays are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            RpcValue::Nil => false,
            RpcValue::Bool(b) => *b,
            RpcValue::Int(i) => *i != 0,
            RpcValue::Double(d) => *d != 0.0,
            RpcValue::String(s) => !(s.is_empty() || s == "0"),
            RpcValue::Array(items) => !items.is_empty(),
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, RpcValue::Nil)
    }

    /// Render a scalar as text. Arrays and nil have no text form.
    pub fn as_text(&self) -> Option<String> {
        match self {
            RpcValue::Nil | RpcValue::Array(_) => None,
            RpcValue::Bool(true) => Some("1".to_string()),
            RpcValue::Bool(false) => Some(String::new()),
            RpcValue::Int(i) => Some(i.to_string()),
            RpcValue::Double(d) => Some(d.to_string()),
            RpcValue::String(s) => Some(s.clone()),
        }
    }
}

impl From<&str> for RpcValue {
    fn from(value: &str) -> Self {
        RpcValue::String(value.to_string())
    }
}

impl From<String> for RpcValue {
    fn from(value: String) -> Self {
        RpcValue::String(value)
    }
}

impl From<bool> for RpcValue {
    fn from(value: bool) -> Self {
        RpcValue::Bool(value)
    }
}

impl From<i64> for RpcValue {
    fn from(value: i64) -> Self {
        RpcValue::Int(value)
    }
}

impl fmt::Display for RpcValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_text() {
            Some(text) => f.write_str(&text),
            None => write!(f, "{:?}", self),
        }
    }
}

// ============================================================================
// Call Parameters
// ============================================================================

/// String-keyed parameter mapping of a single call.
///
/// Built once by the transport and only ever read afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallParams(BTreeMap<String, RpcValue>);

impl CallParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, used by transports and tests.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<RpcValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Value for `key`, with nil treated as absent.
    pub fn get(&self, key: &str) -> Option<&RpcValue> {
        self.0.get(key).filter(|v| !v.is_nil())
    }

    /// Text form of `key` when present.
    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key).and_then(RpcValue::as_text)
    }

    /// Text form of `key` only when its value is truthy.
    pub fn supplied_text(&self, key: &str) -> Option<String> {
        self.get(key)
            .filter(|v| v.is_truthy())
            .and_then(RpcValue::as_text)
    }

    pub fn flag(&self, key: &str) -> bool {
        self.get(key).map(RpcValue::is_truthy).unwrap_or(false)
    }

    /// Credentials, with absent values rendered as empty strings.
    pub fn credentials(&self) -> (String, String) {
        (
            self.text("username").unwrap_or_default(),
            self.text("password").unwrap_or_default(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, RpcValue)> for CallParams {
    fn from_iter<I: IntoIterator<Item = (String, RpcValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(!RpcValue::Nil.is_truthy());
        assert!(!RpcValue::Bool(false).is_truthy());
        assert!(!RpcValue::Int(0).is_truthy());
        assert!(!RpcValue::from("").is_truthy());
        assert!(!RpcValue::from("0").is_truthy());
        assert!(!RpcValue::Array(vec![]).is_truthy());

        assert!(RpcValue::Bool(true).is_truthy());
        assert!(RpcValue::Int(1).is_truthy());
        assert!(RpcValue::from("yes").is_truthy());
        assert!(RpcValue::from("false").is_truthy());
    }

    #[test]
    fn test_null_is_treated_as_missing() {
        let params: CallParams =
            serde_json::from_str(r#"{"order_number": null, "username": "u"}"#).unwrap();

        assert!(params.get("order_number").is_none());
        assert!(params.get("username").is_some());
    }

    #[test]
    fn test_integer_order_number_renders_as_text() {
        let params: CallParams = serde_json::from_str(r#"{"order_number": 123}"#).unwrap();
        assert_eq!(params.text("order_number").as_deref(), Some("123"));
    }

    #[test]
    fn test_supplied_text_skips_empty_values() {
        let params = CallParams::new()
            .with("date_shipped", "")
            .with("custom_tracking_link", "https://track.example/1");

        assert_eq!(params.supplied_text("date_shipped"), None);
        assert_eq!(
            params.supplied_text("custom_tracking_link").as_deref(),
            Some("https://track.example/1")
        );
    }

    #[test]
    fn test_missing_credentials_become_empty() {
        let params = CallParams::new().with("username", "shop");
        assert_eq!(params.credentials(), ("shop".to_string(), String::new()));
    }

    #[test]
    fn test_flag_accepts_string_and_bool() {
        assert!(CallParams::new().with("test_mode", true).flag("test_mode"));
        assert!(CallParams::new().with("test_mode", "1").flag("test_mode"));
        assert!(!CallParams::new().with("test_mode", "0").flag("test_mode"));
        assert!(!CallParams::new().flag("test_mode"));
    }
}
