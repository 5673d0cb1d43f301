// Reading classification - severity tiers, alert messages and status banner mapping
//
// Everything here is pure so it can run on the latest reading and on every
// table row without I/O.
use serde::Serialize;
use std::fmt;

use super::reading::Reading;

pub const GAS_ATTENTION_PPM: f64 = 400.0;
pub const GAS_DANGER_PPM: f64 = 800.0;
pub const GAS_CRITICAL_PPM: f64 = 1200.0;

const ALL_NORMAL: &str = "✅ All normal";
const ALERT_SEPARATOR: &str = " | ";

/// Gas concentration tier. Boundary values belong to the higher tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GasSeverity {
    Normal,
    Attention,
    Danger,
    Critical,
}

impl GasSeverity {
    pub fn from_ppm(gas: f64) -> Self {
        if gas >= GAS_CRITICAL_PPM {
            GasSeverity::Critical
        } else if gas >= GAS_DANGER_PPM {
            GasSeverity::Danger
        } else if gas >= GAS_ATTENTION_PPM {
            GasSeverity::Attention
        } else {
            GasSeverity::Normal
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GasSeverity::Normal => "NORMAL",
            GasSeverity::Attention => "ATTENTION",
            GasSeverity::Danger => "DANGER",
            GasSeverity::Critical => "CRITICAL",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            GasSeverity::Normal => "green",
            GasSeverity::Attention => "yellow",
            GasSeverity::Danger => "orange",
            GasSeverity::Critical => "red",
        }
    }

    pub fn is_critical(&self) -> bool {
        !matches!(self, GasSeverity::Normal)
    }
}

/// One condition contributing to a reading's alert message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertCondition {
    CriticalHeat,
    ElevatedHeat,
    TooCold,
    TooHumid,
    TooDry,
    GasAttention,
    GasDanger,
    GasCritical,
}

impl AlertCondition {
    pub fn text(&self) -> &'static str {
        match self {
            AlertCondition::CriticalHeat => "🔥 Critical temperature",
            AlertCondition::ElevatedHeat => "⚠️ Elevated temperature",
            AlertCondition::TooCold => "❄️ Temperature too low",
            AlertCondition::TooHumid => "💧 Humidity too high",
            AlertCondition::TooDry => "🏜️ Humidity too low",
            AlertCondition::GasAttention => "⚠️ Gas detected - ATTENTION",
            AlertCondition::GasDanger => "⚠️ Gas level DANGEROUS",
            AlertCondition::GasCritical => "☠️ Gas level CRITICAL",
        }
    }
}

/// Ordered list of conditions: temperature, then humidity, then gas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertMessage {
    conditions: Vec<AlertCondition>,
}

impl AlertMessage {
    pub fn for_reading(reading: &Reading) -> Self {
        let mut conditions = Vec::new();

        if reading.temperature >= 50.0 {
            conditions.push(AlertCondition::CriticalHeat);
        } else if reading.temperature >= 40.0 {
            conditions.push(AlertCondition::ElevatedHeat);
        } else if reading.temperature <= 10.0 {
            conditions.push(AlertCondition::TooCold);
        }

        if reading.humidity > 80.0 {
            conditions.push(AlertCondition::TooHumid);
        } else if reading.humidity < 30.0 {
            conditions.push(AlertCondition::TooDry);
        }

        match GasSeverity::from_ppm(reading.gas) {
            GasSeverity::Normal => {}
            GasSeverity::Attention => conditions.push(AlertCondition::GasAttention),
            GasSeverity::Danger => conditions.push(AlertCondition::GasDanger),
            GasSeverity::Critical => conditions.push(AlertCondition::GasCritical),
        }

        Self { conditions }
    }

    pub fn conditions(&self) -> &[AlertCondition] {
        &self.conditions
    }

    pub fn is_all_normal(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Leading segment shown in the banner.
    pub fn headline(&self) -> &'static str {
        self.conditions.first().map(|c| c.text()).unwrap_or(ALL_NORMAL)
    }
}

impl fmt::Display for AlertMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.conditions.is_empty() {
            return f.write_str(ALL_NORMAL);
        }
        for (i, condition) in self.conditions.iter().enumerate() {
            if i > 0 {
                f.write_str(ALERT_SEPARATOR)?;
            }
            f.write_str(condition.text())?;
        }
        Ok(())
    }
}

/// Animated indicator shown next to the status banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusIndicator {
    FireIntense,
    DangerPulse,
    WarningShake,
    AttentionBlink,
    NormalPulse,
}

/// Closed vocabulary for the upstream free-form `status` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusLevel {
    Fire,
    Critical,
    Danger,
    Attention,
    Normal,
}

impl StatusLevel {
    /// Case-insensitive match; anything unrecognised is `Normal`.
    pub fn classify(status: &str) -> Self {
        match status.trim().to_lowercase().as_str() {
            "incendio" | "incêndio" | "fire" => StatusLevel::Fire,
            "critico" | "crítico" | "critical" => StatusLevel::Critical,
            "perigo" | "danger" => StatusLevel::Danger,
            "atencao" | "atenção" | "attention" => StatusLevel::Attention,
            _ => StatusLevel::Normal,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusLevel::Fire => "FIRE",
            StatusLevel::Critical => "CRITICAL",
            StatusLevel::Danger => "DANGER",
            StatusLevel::Attention => "ATTENTION",
            StatusLevel::Normal => "NORMAL",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            StatusLevel::Fire => "red",
            StatusLevel::Critical => "orange",
            StatusLevel::Danger => "yellow",
            StatusLevel::Attention => "blue",
            StatusLevel::Normal => "green",
        }
    }

    pub fn indicator(&self) -> StatusIndicator {
        match self {
            StatusLevel::Fire => StatusIndicator::FireIntense,
            StatusLevel::Critical => StatusIndicator::DangerPulse,
            StatusLevel::Danger => StatusIndicator::WarningShake,
            StatusLevel::Attention => StatusIndicator::AttentionBlink,
            StatusLevel::Normal => StatusIndicator::NormalPulse,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TemperatureBand {
    Cold,
    Comfortable,
    Hot,
}

impl TemperatureBand {
    pub fn from_celsius(temperature: f64) -> Self {
        if temperature > 35.0 {
            TemperatureBand::Hot
        } else if temperature < 10.0 {
            TemperatureBand::Cold
        } else {
            TemperatureBand::Comfortable
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HumidityBand {
    Dry,
    Comfortable,
    Humid,
}

impl HumidityBand {
    pub fn from_percent(humidity: f64) -> Self {
        if humidity > 80.0 {
            HumidityBand::Humid
        } else if humidity < 30.0 {
            HumidityBand::Dry
        } else {
            HumidityBand::Comfortable
        }
    }
}

/// Fill level of the temperature gauge; 50 °C is a full gauge.
pub fn temperature_gauge_percent(temperature: f64) -> f64 {
    (temperature / 50.0 * 100.0).clamp(0.0, 100.0)
}

pub fn humidity_gauge_percent(humidity: f64) -> f64 {
    humidity.clamp(0.0, 100.0)
}

/// Per-row icon. First match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowIndicator {
    Heat,
    Cold,
    Rain,
    GasCritical,
    GasDanger,
    GasAttention,
    Ok,
}

impl RowIndicator {
    pub fn for_reading(reading: &Reading) -> Self {
        if reading.temperature > 35.0 {
            return RowIndicator::Heat;
        }
        if reading.temperature < 10.0 {
            return RowIndicator::Cold;
        }
        if reading.humidity > 80.0 {
            return RowIndicator::Rain;
        }
        match GasSeverity::from_ppm(reading.gas) {
            GasSeverity::Critical => RowIndicator::GasCritical,
            GasSeverity::Danger => RowIndicator::GasDanger,
            GasSeverity::Attention => RowIndicator::GasAttention,
            GasSeverity::Normal => RowIndicator::Ok,
        }
    }
}

/// Everything the presentation layer needs to decorate one reading.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub gas: GasSeverity,
    pub alert_message: AlertMessage,
    pub status: StatusLevel,
    pub temperature_band: TemperatureBand,
    pub humidity_band: HumidityBand,
    pub row_indicator: RowIndicator,
}

impl Classification {
    pub fn of(reading: &Reading) -> Self {
        Self {
            gas: GasSeverity::from_ppm(reading.gas),
            alert_message: AlertMessage::for_reading(reading),
            status: StatusLevel::classify(&reading.status),
            temperature_band: TemperatureBand::from_celsius(reading.temperature),
            humidity_band: HumidityBand::from_percent(reading.humidity),
            row_indicator: RowIndicator::for_reading(reading),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(temperature: f64, humidity: f64, gas: f64) -> Reading {
        Reading::new(temperature, humidity, gas, "normal")
    }

    #[test]
    fn test_gas_tiers() {
        for gas in [0.0, 120.0, 399.99] {
            let tier = GasSeverity::from_ppm(gas);
            assert_eq!(tier, GasSeverity::Normal);
            assert!(!tier.is_critical());
        }
        assert_eq!(GasSeverity::from_ppm(400.0), GasSeverity::Attention);
        assert_eq!(GasSeverity::from_ppm(799.9), GasSeverity::Attention);
        assert_eq!(GasSeverity::from_ppm(800.0), GasSeverity::Danger);
        assert_eq!(GasSeverity::from_ppm(1199.9), GasSeverity::Danger);
        assert_eq!(GasSeverity::from_ppm(1200.0), GasSeverity::Critical);
        assert_eq!(GasSeverity::from_ppm(5000.0), GasSeverity::Critical);

        for tier in [GasSeverity::Attention, GasSeverity::Danger, GasSeverity::Critical] {
            assert!(tier.is_critical());
        }
    }

    #[test]
    fn test_gas_nan_is_normal() {
        assert_eq!(GasSeverity::from_ppm(f64::NAN), GasSeverity::Normal);
    }

    #[test]
    fn test_all_normal_message() {
        let message = AlertMessage::for_reading(&reading(25.0, 50.0, 100.0));
        assert!(message.is_all_normal());
        assert_eq!(message.to_string(), "✅ All normal");
        assert_eq!(message.headline(), "✅ All normal");
    }

    #[test]
    fn test_critical_heat_with_normal_gas() {
        let r = reading(55.0, 50.0, 100.0);
        let message = AlertMessage::for_reading(&r);
        assert_eq!(message.conditions(), &[AlertCondition::CriticalHeat]);
        assert!(message.to_string().contains("Critical temperature"));

        let gas = GasSeverity::from_ppm(r.gas);
        assert_eq!(gas, GasSeverity::Normal);
        assert!(!gas.is_critical());
    }

    #[test]
    fn test_temperature_thresholds_are_exclusive() {
        let at = |t| AlertMessage::for_reading(&reading(t, 50.0, 0.0)).conditions().to_vec();
        assert_eq!(at(50.0), vec![AlertCondition::CriticalHeat]);
        assert_eq!(at(49.9), vec![AlertCondition::ElevatedHeat]);
        assert_eq!(at(40.0), vec![AlertCondition::ElevatedHeat]);
        assert_eq!(at(39.9), Vec::<AlertCondition>::new());
        assert_eq!(at(10.0), vec![AlertCondition::TooCold]);
        assert_eq!(at(-5.0), vec![AlertCondition::TooCold]);
    }

    #[test]
    fn test_humidity_thresholds() {
        let at = |h| AlertMessage::for_reading(&reading(25.0, h, 0.0)).conditions().to_vec();
        assert_eq!(at(80.0), Vec::<AlertCondition>::new());
        assert_eq!(at(80.1), vec![AlertCondition::TooHumid]);
        assert_eq!(at(30.0), Vec::<AlertCondition>::new());
        assert_eq!(at(29.9), vec![AlertCondition::TooDry]);
    }

    #[test]
    fn test_multiple_conditions_in_fixed_order() {
        let message = AlertMessage::for_reading(&reading(45.0, 90.0, 1300.0));
        assert_eq!(
            message.conditions(),
            &[
                AlertCondition::ElevatedHeat,
                AlertCondition::TooHumid,
                AlertCondition::GasCritical
            ]
        );
        assert_eq!(
            message.to_string(),
            "⚠️ Elevated temperature | 💧 Humidity too high | ☠️ Gas level CRITICAL"
        );
        assert_eq!(message.headline(), "⚠️ Elevated temperature");
    }

    #[test]
    fn test_gas_condition_text_per_tier() {
        let gas = |g| AlertMessage::for_reading(&reading(25.0, 50.0, g)).conditions().to_vec();
        assert_eq!(gas(400.0), vec![AlertCondition::GasAttention]);
        assert_eq!(gas(800.0), vec![AlertCondition::GasDanger]);
        assert_eq!(gas(1200.0), vec![AlertCondition::GasCritical]);
    }

    #[test]
    fn test_status_classification_is_case_insensitive() {
        assert_eq!(StatusLevel::classify("INCENDIO"), StatusLevel::Fire);
        assert_eq!(StatusLevel::classify("Incêndio"), StatusLevel::Fire);
        assert_eq!(StatusLevel::classify("Critico"), StatusLevel::Critical);
        assert_eq!(StatusLevel::classify("CRÍTICO"), StatusLevel::Critical);
        assert_eq!(StatusLevel::classify("perigo"), StatusLevel::Danger);
        assert_eq!(StatusLevel::classify("Atenção"), StatusLevel::Attention);
        assert_eq!(StatusLevel::classify("atencao"), StatusLevel::Attention);
        assert_eq!(StatusLevel::classify(" fire "), StatusLevel::Fire);
    }

    #[test]
    fn test_unknown_status_falls_back_to_normal() {
        for status in ["", "normal", "alerta", "???", "\u{0}", "critico!"] {
            let level = StatusLevel::classify(status);
            assert_eq!(level, StatusLevel::Normal, "status {status:?}");
            assert_eq!(level.label(), "NORMAL");
            assert_eq!(level.indicator(), StatusIndicator::NormalPulse);
        }
    }

    #[test]
    fn test_status_presentation_table() {
        assert_eq!(StatusLevel::Fire.color(), "red");
        assert_eq!(StatusLevel::Fire.indicator(), StatusIndicator::FireIntense);
        assert_eq!(StatusLevel::Critical.indicator(), StatusIndicator::DangerPulse);
        assert_eq!(StatusLevel::Danger.indicator(), StatusIndicator::WarningShake);
        assert_eq!(StatusLevel::Attention.color(), "blue");
        assert_eq!(StatusLevel::Attention.indicator(), StatusIndicator::AttentionBlink);
    }

    #[test]
    fn test_bands_and_gauges() {
        assert_eq!(TemperatureBand::from_celsius(36.0), TemperatureBand::Hot);
        assert_eq!(TemperatureBand::from_celsius(35.0), TemperatureBand::Comfortable);
        assert_eq!(TemperatureBand::from_celsius(9.9), TemperatureBand::Cold);
        assert_eq!(HumidityBand::from_percent(81.0), HumidityBand::Humid);
        assert_eq!(HumidityBand::from_percent(29.0), HumidityBand::Dry);

        assert_eq!(temperature_gauge_percent(25.0), 50.0);
        assert_eq!(temperature_gauge_percent(80.0), 100.0);
        assert_eq!(temperature_gauge_percent(-10.0), 0.0);
        assert_eq!(humidity_gauge_percent(120.0), 100.0);
    }

    #[test]
    fn test_row_indicator_precedence() {
        assert_eq!(RowIndicator::for_reading(&reading(36.0, 90.0, 1500.0)), RowIndicator::Heat);
        assert_eq!(RowIndicator::for_reading(&reading(5.0, 90.0, 1500.0)), RowIndicator::Cold);
        assert_eq!(RowIndicator::for_reading(&reading(20.0, 90.0, 1500.0)), RowIndicator::Rain);
        assert_eq!(RowIndicator::for_reading(&reading(20.0, 50.0, 1500.0)), RowIndicator::GasCritical);
        assert_eq!(RowIndicator::for_reading(&reading(20.0, 50.0, 900.0)), RowIndicator::GasDanger);
        assert_eq!(RowIndicator::for_reading(&reading(20.0, 50.0, 450.0)), RowIndicator::GasAttention);
        assert_eq!(RowIndicator::for_reading(&reading(20.0, 50.0, 100.0)), RowIndicator::Ok);
    }

    #[test]
    fn test_classification_bundle() {
        let r = Reading::new(55.0, 50.0, 100.0, "normal");
        let c = Classification::of(&r);
        assert_eq!(c.gas, GasSeverity::Normal);
        assert_eq!(c.status, StatusLevel::Normal);
        assert_eq!(c.temperature_band, TemperatureBand::Hot);
        assert!(c.alert_message.to_string().contains("🔥"));
    }
}
