use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// Reported when a successful payload carries no latest order at all.
pub const LATEST_NONE: &str = "none";
/// Reported when a latest-order object exists but has no `number` field.
pub const LATEST_UNKNOWN: &str = "unknown";

/// Open order count plus its attribute map.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct OpenOrdersMetric {
    pub value: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statuses: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
}

/// Identifier of the most recent open order plus its attribute map.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct LatestOrderMetric {
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
}

/// Both derived metrics, ready for a consumer. `available` is false only
/// when no snapshot has ever been obtained.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct MetricsReport {
    pub available: bool,
    pub open_orders: OpenOrdersMetric,
    pub latest_order: LatestOrderMetric,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refreshed_at: Option<DateTime<Utc>>,
}

impl OpenOrdersMetric {
    pub fn from_value(data: &Value) -> Self {
        Self {
            value: data.get("count").and_then(|v| v.as_i64()).unwrap_or(0),
            statuses: data.get("statuses").cloned(),
            generated_at: generated_at(data),
        }
    }
}

impl LatestOrderMetric {
    pub fn from_value(data: &Value) -> Self {
        let latest = data.get("latest").filter(|v| has_latest(v)).cloned();
        let value = match &latest {
            None => LATEST_NONE.to_string(),
            Some(obj) => obj
                .get("number")
                .and_then(order_number)
                .unwrap_or_else(|| LATEST_UNKNOWN.to_string()),
        };

        Self {
            value,
            latest,
            generated_at: generated_at(data),
        }
    }
}

impl MetricsReport {
    pub fn from_snapshot(snapshot: Option<&Value>, refreshed_at: Option<DateTime<Utc>>) -> Self {
        let empty = Value::Object(serde_json::Map::new());
        let data = snapshot.unwrap_or(&empty);

        Self {
            available: snapshot.is_some(),
            open_orders: OpenOrdersMetric::from_value(data),
            latest_order: LatestOrderMetric::from_value(data),
            refreshed_at,
        }
    }
}

// A null or empty latest object counts as "no latest order".
fn has_latest(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        _ => true,
    }
}

// Order numbers arrive as strings from WooCommerce but numeric ids show
// up in the wild too.
fn order_number(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn generated_at(data: &Value) -> Option<String> {
    data.get("generated_at")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn count_defaults_to_zero_when_absent() {
        let metric = OpenOrdersMetric::from_value(&json!({"statuses": []}));
        assert_eq!(metric.value, 0);
    }

    #[test]
    fn count_and_attributes_come_from_payload() {
        let data = json!({
            "count": 3,
            "statuses": ["processing", "on-hold"],
            "generated_at": "2024-01-01T00:00:00Z"
        });
        let metric = OpenOrdersMetric::from_value(&data);
        assert_eq!(metric.value, 3);
        assert_eq!(metric.statuses, Some(json!(["processing", "on-hold"])));
        assert_eq!(metric.generated_at.as_deref(), Some("2024-01-01T00:00:00Z"));
    }

    #[test]
    fn missing_latest_reports_none() {
        let metric = LatestOrderMetric::from_value(&json!({"count": 0}));
        assert_eq!(metric.value, LATEST_NONE);
        assert!(metric.latest.is_none());
    }

    #[test]
    fn null_and_empty_latest_report_none() {
        let metric = LatestOrderMetric::from_value(&json!({"latest": null}));
        assert_eq!(metric.value, LATEST_NONE);

        let metric = LatestOrderMetric::from_value(&json!({"latest": {}}));
        assert_eq!(metric.value, LATEST_NONE);
    }

    #[test]
    fn latest_without_number_reports_unknown() {
        let metric = LatestOrderMetric::from_value(&json!({"latest": {"id": 7}}));
        assert_eq!(metric.value, LATEST_UNKNOWN);
        assert_eq!(metric.latest, Some(json!({"id": 7})));
    }

    #[test]
    fn latest_number_is_reported_verbatim() {
        let metric = LatestOrderMetric::from_value(&json!({"latest": {"number": "A1007"}}));
        assert_eq!(metric.value, "A1007");

        let metric = LatestOrderMetric::from_value(&json!({"latest": {"number": 1007}}));
        assert_eq!(metric.value, "1007");
    }

    #[test]
    fn report_is_unavailable_without_a_snapshot() {
        let report = MetricsReport::from_snapshot(None, None);
        assert!(!report.available);
        assert_eq!(report.open_orders.value, 0);
        assert_eq!(report.latest_order.value, LATEST_NONE);
    }
}
