//! Mock field records and their placement on the map.

use crate::models::{Coordinate, CropType, FieldData};
use chrono::NaiveDate;

fn offset(origin: Coordinate, dlat: f64, dlng: f64) -> Coordinate {
    Coordinate {
        lat: origin.lat + dlat,
        lng: origin.lng + dlng,
    }
}

/// Three fields laid out around `origin`.
pub fn generate_fields(origin: Coordinate) -> Vec<FieldData> {
    vec![
        FieldData {
            id: "FIELD_001".to_string(),
            name: "North Quarter Section".to_string(),
            crop_type: CropType::Corn,
            acres: 120.5,
            coordinates: vec![
                offset(origin, 0.002, -0.003),
                offset(origin, 0.002, 0.001),
                offset(origin, -0.001, 0.001),
                offset(origin, -0.001, -0.003),
            ],
            soil_health: 78,
            moisture_level: 65,
            ndvi_value: clamp_ndvi(0.72),
            planting_date: "2025-04-15".to_string(),
            expected_harvest: "2025-10-20".to_string(),
            current_stage: "Grain Filling (R4)".to_string(),
            yield_prediction: 185,
        },
        FieldData {
            id: "FIELD_002".to_string(),
            name: "South East Field".to_string(),
            crop_type: CropType::Soy,
            acres: 85.2,
            coordinates: vec![
                offset(origin, -0.001, 0.002),
                offset(origin, -0.001, 0.004),
                offset(origin, -0.003, 0.004),
                offset(origin, -0.003, 0.002),
            ],
            soil_health: 82,
            moisture_level: 58,
            ndvi_value: clamp_ndvi(0.68),
            planting_date: "2025-05-10".to_string(),
            expected_harvest: "2025-09-25".to_string(),
            current_stage: "Pod Development (R3)".to_string(),
            yield_prediction: 52,
        },
        FieldData {
            id: "FIELD_003".to_string(),
            name: "West Quarter".to_string(),
            crop_type: CropType::Wheat,
            acres: 95.8,
            coordinates: vec![
                offset(origin, 0.001, -0.005),
                offset(origin, 0.001, -0.002),
                offset(origin, -0.002, -0.002),
                offset(origin, -0.002, -0.005),
            ],
            soil_health: 75,
            moisture_level: 72,
            ndvi_value: clamp_ndvi(0.64),
            planting_date: "2024-09-20".to_string(),
            expected_harvest: "2025-07-15".to_string(),
            current_stage: "Harvest Ready".to_string(),
            yield_prediction: 68,
        },
    ]
}

/// Metadata of the imagery pass behind the field overlay.
#[derive(Clone, Debug, PartialEq)]
pub struct SatelliteImagery {
    pub date: String,
    pub cloud_cover: u8,
    /// Metres per pixel.
    pub resolution: u32,
}

pub fn satellite_imagery(date: NaiveDate) -> SatelliteImagery {
    SatelliteImagery {
        date: date.format("%Y-%m-%d").to_string(),
        cloud_cover: 15,
        resolution: 10,
    }
}

impl SatelliteImagery {
    pub fn chip(&self) -> String {
        format!("{}m · {}% clouds", self.resolution, self.cloud_cover)
    }
}

pub fn total_acres(fields: &[FieldData]) -> f64 {
    fields.iter().map(|f| f.acres).sum()
}

pub fn fields_summary(fields: &[FieldData]) -> String {
    format!(
        "Fields: {} | Total: {:.1} acres",
        fields.len(),
        total_acres(fields)
    )
}

pub fn clamp_ndvi(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// Corners of the `index`-th field quad, in percent of the map area
/// (x from the left, y from the top). Three quads per row.
pub fn field_quad(index: usize) -> [(f64, f64); 4] {
    let dx = (index % 3) as f64 * 30.0;
    let dy = (index / 3) as f64 * 25.0;
    [
        (10.0 + dx, 15.0 + dy),
        (35.0 + dx, 12.0 + dy),
        (32.0 + dx, 40.0 + dy),
        (8.0 + dx, 38.0 + dy),
    ]
}

pub fn quad_center(quad: &[(f64, f64); 4]) -> (f64, f64) {
    let (sx, sy) = quad
        .iter()
        .fold((0.0, 0.0), |(ax, ay), (x, y)| (ax + x, ay + y));
    (sx / 4.0, sy / 4.0)
}

/// Outline colour for a crop, dimmed by vegetation health. Low NDVI never
/// drops below 30% intensity so every field stays visible.
pub fn crop_color(crop: CropType, ndvi: f64) -> (u8, u8, u8) {
    let (r, g, b) = match crop {
        CropType::Corn => (0x22, 0xc5, 0x5e),
        CropType::Soy => (0x84, 0xcc, 0x16),
        CropType::Wheat => (0xf5, 0x9e, 0x0b),
        CropType::Cotton => (0xf8, 0xfa, 0xfc),
        CropType::Other => (0x6b, 0x72, 0x80),
    };
    let intensity = ndvi.max(0.3).min(1.0);
    let scale = |c: u8| (c as f64 * intensity).floor() as u8;
    (scale(r), scale(g), scale(b))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HealthGrade {
    Good,
    Fair,
    Poor,
}

pub fn health_grade(value: u8) -> HealthGrade {
    if value >= 80 {
        HealthGrade::Good
    } else if value >= 60 {
        HealthGrade::Fair
    } else {
        HealthGrade::Poor
    }
}

pub fn format_field_info(field: &FieldData) -> Vec<String> {
    vec![
        format!("Health: {}%", field.soil_health),
        format!("Moisture: {}%", field.moisture_level),
        format!("NDVI: {:.2}", field.ndvi_value),
        format!("Size: {} acres", field.acres),
        format!("Stage: {}", field.current_stage),
        format!("Est. Yield: {} bu/ac", field.yield_prediction),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_are_placed_around_origin() {
        let origin = Coordinate {
            lat: 40.0,
            lng: -74.0,
        };
        let fields = generate_fields(origin);
        assert_eq!(fields.len(), 3);
        for field in &fields {
            assert!((0.0..=1.0).contains(&field.ndvi_value));
            for c in &field.coordinates {
                assert!((c.lat - origin.lat).abs() <= 0.003 + 1e-9);
                assert!((c.lng - origin.lng).abs() <= 0.005 + 1e-9);
            }
        }
    }

    #[test]
    fn quads_tile_three_per_row() {
        assert_eq!(field_quad(0)[0], (10.0, 15.0));
        assert_eq!(field_quad(2)[1], (95.0, 12.0));
        assert_eq!(field_quad(3)[3], (8.0, 63.0));
        assert_eq!(quad_center(&field_quad(0)), (21.25, 26.25));
    }

    #[test]
    fn crop_color_has_minimum_intensity() {
        assert_eq!(crop_color(CropType::Corn, 1.0), (0x22, 0xc5, 0x5e));
        assert_eq!(crop_color(CropType::Corn, 0.0), crop_color(CropType::Corn, 0.3));
    }

    #[test]
    fn summary_sums_acres() {
        let fields = generate_fields(Coordinate { lat: 0.0, lng: 0.0 });
        assert!((total_acres(&fields) - 301.5).abs() < 1e-9);
        assert_eq!(fields_summary(&fields), "Fields: 3 | Total: 301.5 acres");
        assert_eq!(fields_summary(&[]), "Fields: 0 | Total: 0.0 acres");
    }

    #[test]
    fn imagery_chip() {
        let date = NaiveDate::from_ymd_opt(2025, 9, 23).unwrap();
        let imagery = satellite_imagery(date);
        assert_eq!(imagery.date, "2025-09-23");
        assert_eq!(imagery.chip(), "10m · 15% clouds");
    }

    #[test]
    fn health_thresholds() {
        assert_eq!(health_grade(80), HealthGrade::Good);
        assert_eq!(health_grade(79), HealthGrade::Fair);
        assert_eq!(health_grade(59), HealthGrade::Poor);
    }
}
