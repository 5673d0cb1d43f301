// Filter engine - compound predicate over the history, order preserving
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::reading::{parse_timestamp, Reading};

/// Optional inclusive numeric range, kept as the text the user typed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeInput {
    pub min: String,
    pub max: String,
}

impl RangeInput {
    pub fn new(min: impl Into<String>, max: impl Into<String>) -> Self {
        Self {
            min: min.into(),
            max: max.into(),
        }
    }

    pub fn min(min: impl Into<String>) -> Self {
        Self::new(min, "")
    }

    pub fn max(max: impl Into<String>) -> Self {
        Self::new("", max)
    }

    fn is_empty(&self) -> bool {
        self.min.is_empty() && self.max.is_empty()
    }
}

/// `all` or an exact, case-sensitive status value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StatusSelector {
    #[default]
    All,
    Exact(String),
}

impl From<String> for StatusSelector {
    fn from(value: String) -> Self {
        if value.is_empty() || value == "all" {
            StatusSelector::All
        } else {
            StatusSelector::Exact(value)
        }
    }
}

impl From<StatusSelector> for String {
    fn from(selector: StatusSelector) -> Self {
        match selector {
            StatusSelector::All => "all".to_string(),
            StatusSelector::Exact(value) => value,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertSelector {
    #[default]
    #[serde(rename = "all")]
    All,
    #[serde(rename = "yes", alias = "alerting")]
    Alerting,
    #[serde(rename = "no", alias = "not_alerting")]
    NotAlerting,
}

/// The single active set of inclusion constraints.
///
/// Blank or unparseable bounds are treated as unset and never exclude a
/// reading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    pub date_start: String,
    pub date_end: String,
    pub temperature: RangeInput,
    pub humidity: RangeInput,
    pub gas: RangeInput,
    pub status: StatusSelector,
    pub alert: AlertSelector,
}

impl FilterCriteria {
    pub fn has_active_filters(&self) -> bool {
        !self.date_start.is_empty()
            || !self.date_end.is_empty()
            || !self.temperature.is_empty()
            || !self.humidity.is_empty()
            || !self.gas.is_empty()
            || self.status != StatusSelector::All
            || self.alert != AlertSelector::All
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn matches(&self, reading: &Reading) -> bool {
        CompiledFilter::new(self).matches(reading)
    }
}

/// Parse a numeric bound. Anything that is not a finite number is unset.
pub fn parse_bound(text: &str) -> Option<f64> {
    let value = text.trim().parse::<f64>().ok()?;
    value.is_finite().then_some(value)
}

#[derive(Debug, Clone, Copy, Default)]
struct Bounds {
    min: Option<f64>,
    max: Option<f64>,
}

impl Bounds {
    fn parse(range: &RangeInput) -> Self {
        Self {
            min: parse_bound(&range.min),
            max: parse_bound(&range.max),
        }
    }

    fn admits(&self, value: f64) -> bool {
        if let Some(min) = self.min {
            if value < min {
                return false;
            }
        }
        if let Some(max) = self.max {
            if value > max {
                return false;
            }
        }
        true
    }
}

/// Criteria with every bound parsed once, reused across all rows.
struct CompiledFilter<'a> {
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    temperature: Bounds,
    humidity: Bounds,
    gas: Bounds,
    status: Option<&'a str>,
    alert: AlertSelector,
}

impl<'a> CompiledFilter<'a> {
    fn new(criteria: &'a FilterCriteria) -> Self {
        Self {
            start: parse_timestamp(&criteria.date_start),
            end: parse_timestamp(&criteria.date_end),
            temperature: Bounds::parse(&criteria.temperature),
            humidity: Bounds::parse(&criteria.humidity),
            gas: Bounds::parse(&criteria.gas),
            status: match &criteria.status {
                StatusSelector::All => None,
                StatusSelector::Exact(value) => Some(value.as_str()),
            },
            alert: criteria.alert,
        }
    }

    fn matches(&self, reading: &Reading) -> bool {
        // Readings without a timestamp always pass the date clauses
        if let Some(timestamp) = reading.timestamp {
            if self.start.is_some_and(|start| timestamp < start) {
                return false;
            }
            if self.end.is_some_and(|end| timestamp > end) {
                return false;
            }
        }

        if !self.temperature.admits(reading.temperature)
            || !self.humidity.admits(reading.humidity)
            || !self.gas.admits(reading.gas)
        {
            return false;
        }

        if let Some(status) = self.status {
            if reading.status != status {
                return false;
            }
        }

        match self.alert {
            AlertSelector::All => true,
            AlertSelector::Alerting => reading.alert,
            AlertSelector::NotAlerting => !reading.alert,
        }
    }
}

/// Readings passing every active clause, in history order.
pub fn apply(history: &[Reading], criteria: &FilterCriteria) -> Vec<Reading> {
    let filter = CompiledFilter::new(criteria);
    history
        .iter()
        .filter(|reading| filter.matches(reading))
        .cloned()
        .collect()
}
