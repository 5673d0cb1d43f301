// Reading domain model - one timestamped sensor sample
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A single sample as stored upstream. Never mutated after it is received.
///
/// Deserialization accepts the upstream column names (`temperatura`,
/// `umidade`, `gas_mq2`, `alerta`, `created_at`) as well as the English ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(alias = "temperatura")]
    pub temperature: f64,
    #[serde(alias = "umidade")]
    pub humidity: f64,
    #[serde(alias = "gas_mq2")]
    pub gas: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(alias = "alerta", default, deserialize_with = "null_as_default")]
    pub alert: bool,
    #[serde(alias = "created_at", default, deserialize_with = "timestamp_or_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Reading {
    pub fn new(temperature: f64, humidity: f64, gas: f64, status: impl Into<String>) -> Self {
        Self {
            id: None,
            temperature,
            humidity,
            gas,
            status: status.into(),
            alert: false,
            timestamp: None,
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_alert(mut self, alert: bool) -> Self {
        self.alert = alert;
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

// Upstream columns are nullable; a null status or alert flag reads as empty/false
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse RFC 3339, a zone-less date-time or a plain date. Zone-less values
/// are read as UTC.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return Some(instant.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

// `timestamp without time zone` columns come back without an offset
fn timestamp_or_none<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .as_deref()
        .and_then(parse_timestamp))
}
