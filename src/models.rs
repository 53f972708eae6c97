//! Display records exchanged with the backend or produced by the simulations.

use serde::{Deserialize, Serialize};

/// Article from `/api/agri-news`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewsArticle {
    pub title: String,
    pub description: String,
    pub source: String,
    pub url: String,
    pub image: Option<String>,
    pub published_at: String,
    pub category: Option<String>,
}

/// Article from `/api/weather-news`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherNewsArticle {
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub link: String,
    #[serde(rename = "pubDate")]
    pub pub_date: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BotStatus {
    Active,
    Charging,
    Maintenance,
}

impl std::fmt::Display for BotStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BotStatus::Active => write!(f, "active"),
            BotStatus::Charging => write!(f, "charging"),
            BotStatus::Maintenance => write!(f, "maintenance"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotLocation {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub battery: f64,
    pub status: BotStatus,
    #[serde(default)]
    pub task: String,
    #[serde(default)]
    pub speed: String,
    #[serde(default)]
    pub last_update: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CropType {
    Corn,
    Wheat,
    Soy,
    Cotton,
    Other,
}

impl std::fmt::Display for CropType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CropType::Corn => write!(f, "corn"),
            CropType::Wheat => write!(f, "wheat"),
            CropType::Soy => write!(f, "soy"),
            CropType::Cotton => write!(f, "cotton"),
            CropType::Other => write!(f, "other"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldData {
    pub id: String,
    pub name: String,
    pub crop_type: CropType,
    pub acres: f64,
    pub coordinates: Vec<Coordinate>,
    pub soil_health: u8,
    pub moisture_level: u8,
    pub ndvi_value: f64,
    pub planting_date: String,
    pub expected_harvest: String,
    pub current_stage: String,
    pub yield_prediction: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SoilReading {
    pub moisture: f64,
    pub temperature: f64,
    pub ph: f64,
}

impl Default for SoilReading {
    fn default() -> Self {
        Self {
            moisture: 32.5,
            temperature: 24.3,
            ph: 6.8,
        }
    }
}

/// Response body of the detection endpoint. Every field is optional: 400
/// replies carry only `error`, so a missing `success` reads as false.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub threat_detected: bool,
    #[serde(default)]
    pub animal_type: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationKind {
    Warning,
    Success,
    Info,
    Schedule,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NotificationItem {
    pub id: u32,
    pub kind: NotificationKind,
    pub title: &'static str,
    pub message: &'static str,
    pub time: &'static str,
}

/// A chart sample. The backend has served both shapes over time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChartPoint {
    Labeled { label: String, value: f64 },
    Series { month: String, desktop: f64, mobile: f64 },
}

impl ChartPoint {
    pub fn label(&self) -> &str {
        match self {
            ChartPoint::Labeled { label, .. } => label,
            ChartPoint::Series { month, .. } => month,
        }
    }
}

/// Telemetry summary object; every metric is optional.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetrySummary {
    pub soil_moisture: Option<f64>,
    pub temperature: Option<f64>,
    pub battery: Option<f64>,
    pub weather: Option<String>,
    pub wind: Option<String>,
    pub graph: Vec<ChartPoint>,
}

/// A bot as served by `/api/bots`. Looser than [`BotLocation`]: the backend
/// lets clients PUT arbitrary fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetBot {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub battery: Option<f64>,
    #[serde(default)]
    pub task: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Telemetry {
    Fleet(Vec<FleetBot>),
    Summary(TelemetrySummary),
}

impl Telemetry {
    pub fn soil_moisture(&self) -> Option<f64> {
        match self {
            Telemetry::Summary(s) => s.soil_moisture,
            Telemetry::Fleet(_) => None,
        }
    }

    pub fn temperature(&self) -> Option<f64> {
        match self {
            Telemetry::Summary(s) => s.temperature,
            Telemetry::Fleet(_) => None,
        }
    }

    /// Summary battery, or the fleet average over bots reporting one.
    pub fn battery(&self) -> Option<f64> {
        match self {
            Telemetry::Summary(s) => s.battery,
            Telemetry::Fleet(bots) => {
                let levels: Vec<f64> = bots.iter().filter_map(|b| b.battery).collect();
                if levels.is_empty() {
                    None
                } else {
                    Some(levels.iter().sum::<f64>() / levels.len() as f64)
                }
            }
        }
    }

    pub fn weather(&self) -> Option<(&str, Option<&str>)> {
        match self {
            Telemetry::Summary(s) => s.weather.as_deref().map(|w| (w, s.wind.as_deref())),
            Telemetry::Fleet(_) => None,
        }
    }

    pub fn chart_points(&self) -> Vec<ChartPoint> {
        match self {
            Telemetry::Summary(s) => s.graph.clone(),
            Telemetry::Fleet(bots) => bots
                .iter()
                .filter_map(|b| {
                    b.battery.map(|value| ChartPoint::Labeled {
                        label: b.id.clone(),
                        value,
                    })
                })
                .collect(),
        }
    }
}

/// Formats a percentage the way the cards show it: one decimal, trailing
/// `.0` dropped.
pub fn format_percent(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{:.0}%", rounded)
    } else {
        format!("{:.1}%", rounded)
    }
}
