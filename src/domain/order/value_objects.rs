use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

use super::errors::OrderError;

// ============================================================================
// Order Metadata Keys
// ============================================================================

pub mod meta {
    pub const ORDER_NUMBER: &str = "_order_number";
    pub const TRACKING_PROVIDER: &str = "_tracking_provider";
    pub const TRACKING_NUMBER: &str = "_tracking_number";
    pub const DATE_SHIPPED: &str = "_date_shipped";
    pub const CUSTOM_TRACKING_PROVIDER: &str = "_custom_tracking_provider";
    pub const CUSTOM_TRACKING_LINK: &str = "_custom_tracking_link";
}

// ============================================================================
// Order Value Objects
// ============================================================================

/// What a caller uses to name an order: the numeric id or a custom number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderReference(String);

impl OrderReference {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// The reference read as a host order id, if it is one.
    ///
    /// Only plain ASCII digits count. Signs and padding leave the reference
    /// to the custom number lookup.
    pub fn as_id(&self) -> Option<u64> {
        if self.0.is_empty() || !self.0.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        self.0.parse().ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Timestamp(i64),
    Text(String),
}

impl MetaValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MetaValue::Text(s) => Some(s),
            MetaValue::Timestamp(_) => None,
        }
    }
}

impl From<&str> for MetaValue {
    fn from(value: &str) -> Self {
        MetaValue::Text(value.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(value: String) -> Self {
        MetaValue::Text(value)
    }
}

/// An order as the host store holds it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: u64,
    pub status: String,
    #[serde(default = "default_published")]
    pub published: bool,
    #[serde(default, deserialize_with = "deserialize_metadata")]
    pub metadata: BTreeMap<String, MetaValue>,
    #[serde(default)]
    pub notes: Vec<String>,
}

fn default_published() -> bool {
    true
}

/// Custom order numbers are text even when written as a bare JSON number.
fn deserialize_metadata<'de, D>(deserializer: D) -> Result<BTreeMap<String, MetaValue>, D::Error>
where
    D: Deserializer<'de>,
{
    let mut metadata = BTreeMap::<String, MetaValue>::deserialize(deserializer)?;
    if let Some(&MetaValue::Timestamp(number)) = metadata.get(meta::ORDER_NUMBER) {
        metadata.insert(meta::ORDER_NUMBER.to_string(), MetaValue::Text(number.to_string()));
    }
    Ok(metadata)
}

impl OrderRecord {
    pub fn new(id: u64, status: impl Into<String>) -> Self {
        Self {
            id,
            status: status.into(),
            published: true,
            metadata: BTreeMap::new(),
            notes: Vec::new(),
        }
    }

    pub fn with_custom_number(mut self, number: impl Into<String>) -> Self {
        self.metadata
            .insert(meta::ORDER_NUMBER.to_string(), MetaValue::Text(number.into()));
        self
    }

    pub fn unpublished(mut self) -> Self {
        self.published = false;
        self
    }

    pub fn custom_number(&self) -> Option<&str> {
        self.metadata.get(meta::ORDER_NUMBER).and_then(MetaValue::as_text)
    }

    pub fn meta(&self, key: &str) -> Option<&MetaValue> {
        self.metadata.get(key)
    }
}

/// Which lookup found the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedBy {
    Id,
    CustomNumber,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub status: String,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingUpdate {
    pub provider: String,
    pub number: String,
    pub date_shipped: Option<i64>,
    pub custom_provider: Option<String>,
    pub custom_link: Option<String>,
    pub status: Option<StatusUpdate>,
}

impl TrackingUpdate {
    /// Metadata writes in the order they are applied.
    pub fn metadata_writes(&self) -> Vec<(&'static str, MetaValue)> {
        let mut writes = vec![
            (meta::TRACKING_PROVIDER, MetaValue::Text(clean_text(&self.provider))),
            (meta::TRACKING_NUMBER, MetaValue::Text(clean_text(&self.number))),
        ];

        if let Some(ts) = self.date_shipped {
            writes.push((meta::DATE_SHIPPED, MetaValue::Timestamp(ts)));
        }
        if let Some(provider) = &self.custom_provider {
            writes.push((meta::CUSTOM_TRACKING_PROVIDER, MetaValue::Text(clean_text(provider))));
        }
        if let Some(link) = &self.custom_link {
            writes.push((meta::CUSTOM_TRACKING_LINK, MetaValue::Text(clean_text(link))));
        }

        writes
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Strip markup, fold line breaks and tabs, collapse whitespace and trim.
///
/// A `<` only opens a tag when a `>` follows before the next `<`. A stray
/// `<` is kept, escaped as `&lt;`.
pub fn clean_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_space = false;
    let mut rest = input;

    while let Some(ch) = rest.chars().next() {
        let (token, tail) = rest.split_at(ch.len_utf8());
        rest = tail;

        if ch == '<' {
            if let Some(end) = tail.find(|c: char| c == '<' || c == '>') {
                if tail[end..].starts_with('>') {
                    rest = &tail[end + 1..];
                    continue;
                }
            }
        }

        if ch.is_whitespace() {
            pending_space = true;
            continue;
        }

        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;

        if ch == '<' {
            out.push_str(&html_escape::encode_text(token));
        } else {
            out.push_str(token);
        }
    }

    out
}

/// Parse a ship date into a UTC Unix timestamp.
///
/// Accepts `YYYY-MM-DD` (midnight UTC) or a full RFC 3339 timestamp.
pub fn parse_ship_date(input: &str) -> Result<i64, OrderError> {
    let trimmed = input.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc().timestamp());
        }
    }

    DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.timestamp())
        .map_err(|_| OrderError::InvalidDate(input.to_string()))
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_as_id() {
        assert_eq!(OrderReference::new("123").as_id(), Some(123));
        assert_eq!(OrderReference::new("WC-123").as_id(), None);
        assert_eq!(OrderReference::new("-5").as_id(), None);
        assert_eq!(OrderReference::new("+123").as_id(), None);
        assert_eq!(OrderReference::new(" 123").as_id(), None);
        assert_eq!(OrderReference::new("").as_id(), None);
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("  ups  "), "ups");
        assert_eq!(clean_text("<b>1Z999</b>"), "1Z999");
        assert_eq!(clean_text("line\none\ttwo"), "line one two");
        assert_eq!(clean_text("a   b"), "a b");
    }

    #[test]
    fn test_clean_text_keeps_stray_angle_bracket() {
        assert_eq!(clean_text("1Z<999 AA"), "1Z&lt;999 AA");
        assert_eq!(
            clean_text("https://t.example/?a=1&b<2"),
            "https://t.example/?a=1&b&lt;2"
        );
        assert_eq!(clean_text("a <<b>c"), "a &lt;c");
        assert_eq!(clean_text("5 > 3"), "5 > 3");
    }

    #[test]
    fn test_parse_ship_date() {
        assert_eq!(parse_ship_date("2013-05-01").unwrap(), 1_367_366_400);
        assert_eq!(
            parse_ship_date("2013-05-01T12:00:00+00:00").unwrap(),
            1_367_366_400 + 12 * 3600
        );
    }

    #[test]
    fn test_parse_ship_date_rejects_garbage() {
        let err = parse_ship_date("next tuesday").unwrap_err();
        assert_eq!(err.code(), 500);
        assert!(err.to_string().contains("next tuesday"));
    }

    #[test]
    fn test_metadata_writes_only_include_supplied_fields() {
        let update = TrackingUpdate {
            provider: "ups".to_string(),
            number: "1Z999".to_string(),
            date_shipped: None,
            custom_provider: None,
            custom_link: Some("https://track.example/1Z999".to_string()),
            status: None,
        };

        let keys: Vec<_> = update.metadata_writes().into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            vec![meta::TRACKING_PROVIDER, meta::TRACKING_NUMBER, meta::CUSTOM_TRACKING_LINK]
        );
    }

    #[test]
    fn test_record_custom_number() {
        let order = OrderRecord::new(7, "processing").with_custom_number("WC-0007");
        assert_eq!(order.custom_number(), Some("WC-0007"));
        assert!(order.published);
        assert!(!order.unpublished().published);
    }

    #[test]
    fn test_numeric_custom_number_loads_as_text() {
        let order: OrderRecord = serde_json::from_str(
            r#"{"id": 3, "status": "pending", "metadata": {"_order_number": 1001, "_date_shipped": 1367366400}}"#,
        )
        .unwrap();

        assert_eq!(order.custom_number(), Some("1001"));
        assert_eq!(order.meta(meta::DATE_SHIPPED), Some(&MetaValue::Timestamp(1_367_366_400)));
    }
}
