use crate::models::SoilReading;
use rand::Rng;

pub const SENSOR_MODEL: &str = "SoilNode-01";

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// One random-walk step. Moisture is clamped to [0, 100]; temperature and
/// pH walk freely.
pub fn jitter<R: Rng>(prev: SoilReading, rng: &mut R) -> SoilReading {
    let step = |rng: &mut R, span: f64| (rng.gen::<f64>() - 0.5) * span;
    let moisture = round_to(prev.moisture + step(rng, 2.0), 1).clamp(0.0, 100.0);
    let temperature = round_to(prev.temperature + step(rng, 0.6), 1);
    let ph = round_to(prev.ph + step(rng, 0.05), 2);
    SoilReading {
        moisture,
        temperature,
        ph,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn moisture_stays_in_range_from_any_seed() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            for start in [0.0, 0.4, 50.0, 99.6, 100.0] {
                let mut reading = SoilReading {
                    moisture: start,
                    ..SoilReading::default()
                };
                for _ in 0..2_000 {
                    reading = jitter(reading, &mut rng);
                    assert!((0.0..=100.0).contains(&reading.moisture));
                }
            }
        }
    }

    #[test]
    fn steps_are_bounded() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut reading = SoilReading::default();
        for _ in 0..500 {
            let next = jitter(reading, &mut rng);
            assert!((next.moisture - reading.moisture).abs() <= 1.001);
            assert!((next.temperature - reading.temperature).abs() <= 0.301);
            assert!((next.ph - reading.ph).abs() <= 0.031);
            reading = next;
        }
    }
}
