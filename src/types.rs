use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Current time, both as a value and in the stored string form
pub fn current_time() -> (DateTime<Utc>, String) {
    let now = Utc::now();
    (now, format_date_time(&now))
}

pub fn format_date_time(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_date_time(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parse a stored timestamp, substituting the current time when it is unreadable
pub fn parse_or_now(value: &str, field: &str, record_id: &str) -> DateTime<Utc> {
    parse_date_time(value).unwrap_or_else(|| {
        warn!(
            "Unable to parse {} '{}' for {} - using current time",
            field, value, record_id
        );
        Utc::now()
    })
}

/// Query parameters shared by paginated list endpoints
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    pub page_size: Option<usize>,
    pub next_key: Option<String>,
}

/// Count-only metrics section reported by each entity table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountMetrics {
    pub total_count: i64,
}

/// Treat an empty or whitespace-only string as absent
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_formatting() {
        let (now, stored) = current_time();
        let parsed = parse_date_time(&stored).unwrap();
        assert_eq!(parsed.timestamp_millis(), now.timestamp_millis());
    }

    #[test]
    fn test_parse_or_now_falls_back() {
        let before = Utc::now();
        let parsed = parse_or_now("not a date", "date_created", "c-1");
        assert!(parsed >= before);
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  ")), None);
        assert_eq!(non_blank(None), None);
        assert_eq!(non_blank(Some(" x ")), Some("x"));
    }
}
