// Response bodies for the HTTP surface
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::dashboard_view::{ClassifiedReading, PageView};
use crate::application::feed_reconciler::{ConnectionState, FeedSnapshot};
use crate::application::filter::FilterCriteria;
use crate::application::paginator::PageSummary;
use crate::domain::classification::{
    humidity_gauge_percent, temperature_gauge_percent, AlertCondition, Classification,
    GasSeverity, HumidityBand, RowIndicator, StatusIndicator, StatusLevel, TemperatureBand,
};
use crate::domain::reading::Reading;

#[derive(Debug, Serialize)]
pub struct ClassificationDto {
    pub gas_level: GasSeverity,
    pub gas_label: &'static str,
    pub gas_color: &'static str,
    pub is_critical: bool,
    pub alert_message: String,
    pub alert_headline: &'static str,
    pub alert_conditions: Vec<AlertCondition>,
    pub status_level: StatusLevel,
    pub status_label: &'static str,
    pub status_color: &'static str,
    pub status_indicator: StatusIndicator,
    pub temperature_band: TemperatureBand,
    pub humidity_band: HumidityBand,
    pub row_indicator: RowIndicator,
}

impl From<&Classification> for ClassificationDto {
    fn from(c: &Classification) -> Self {
        Self {
            gas_level: c.gas,
            gas_label: c.gas.label(),
            gas_color: c.gas.color(),
            is_critical: c.gas.is_critical(),
            alert_message: c.alert_message.to_string(),
            alert_headline: c.alert_message.headline(),
            alert_conditions: c.alert_message.conditions().to_vec(),
            status_level: c.status,
            status_label: c.status.label(),
            status_color: c.status.color(),
            status_indicator: c.status.indicator(),
            temperature_band: c.temperature_band,
            humidity_band: c.humidity_band,
            row_indicator: c.row_indicator,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReadingRowDto {
    #[serde(flatten)]
    pub reading: Reading,
    pub classification: ClassificationDto,
}

impl From<ClassifiedReading> for ReadingRowDto {
    fn from(row: ClassifiedReading) -> Self {
        let classification = ClassificationDto::from(&row.classification);
        Self {
            reading: row.reading,
            classification,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LatestDto {
    #[serde(flatten)]
    pub row: ReadingRowDto,
    /// Banner is shown only when upstream flagged the reading.
    pub show_banner: bool,
    pub temperature_gauge: f64,
    pub humidity_gauge: f64,
}

impl From<ClassifiedReading> for LatestDto {
    fn from(latest: ClassifiedReading) -> Self {
        Self {
            show_banner: latest.reading.alert,
            temperature_gauge: temperature_gauge_percent(latest.reading.temperature),
            humidity_gauge: humidity_gauge_percent(latest.reading.humidity),
            row: ReadingRowDto::from(latest),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PageDto {
    pub rows: Vec<ReadingRowDto>,
    pub summary: PageSummary,
    pub filters_active: bool,
}

impl From<PageView> for PageDto {
    fn from(page: PageView) -> Self {
        Self {
            rows: page.rows.into_iter().map(ReadingRowDto::from).collect(),
            summary: page.summary,
            filters_active: page.filters_active,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusDto {
    pub connection: ConnectionState,
    pub error: Option<String>,
    pub warning: Option<String>,
    pub stale: bool,
    pub total_readings: usize,
    pub generation: u64,
    pub last_refreshed: Option<DateTime<Utc>>,
}

impl From<&FeedSnapshot> for StatusDto {
    fn from(feed: &FeedSnapshot) -> Self {
        Self {
            connection: feed.connection,
            error: feed.error.clone(),
            warning: feed.warning.clone(),
            stale: feed.stale,
            total_readings: feed.history.len(),
            generation: feed.generation,
            last_refreshed: feed.last_refreshed,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FiltersDto {
    pub criteria: FilterCriteria,
    pub active: bool,
}

impl From<&FilterCriteria> for FiltersDto {
    fn from(criteria: &FilterCriteria) -> Self {
        Self {
            criteria: criteria.clone(),
            active: criteria.has_active_filters(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PageAction {
    First,
    Previous,
    Next,
    Last,
    Goto,
}

#[derive(Debug, Deserialize)]
pub struct PageRequest {
    pub action: PageAction,
    #[serde(default)]
    pub page: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}
