use crate::models::{BotLocation, BotStatus, Coordinate};

pub const USER_LOCATION_ID: &str = "USER-LOCATION";

/// Battery lost per drift tick by a working bot.
pub const ACTIVE_DRAIN: f64 = 0.2;
/// Battery gained per drift tick on the charger.
pub const CHARGE_RATE: f64 = 1.0;

#[allow(clippy::too_many_arguments)]
fn bot(
    id: &str,
    name: &str,
    lat: f64,
    lng: f64,
    battery: f64,
    status: BotStatus,
    task: &str,
    speed: &str,
    last_update: &str,
) -> BotLocation {
    BotLocation {
        id: id.to_string(),
        name: name.to_string(),
        lat,
        lng,
        battery,
        status,
        task: task.to_string(),
        speed: speed.to_string(),
        last_update: last_update.to_string(),
    }
}

/// The seeded fleet shown on the map.
pub fn generate_bot_locations() -> Vec<BotLocation> {
    vec![
        bot(
            "AGR-001",
            "Harvester Bot Alpha",
            40.7589,
            -73.9851,
            85.0,
            BotStatus::Active,
            "Harvesting Tomatoes",
            "1.2 m/s",
            "2 minutes ago",
        ),
        bot(
            "AGR-002",
            "Irrigation Bot Beta",
            40.7595,
            -73.9845,
            92.0,
            BotStatus::Active,
            "Watering Corn Fields",
            "0.8 m/s",
            "1 minute ago",
        ),
        bot(
            "AGR-003",
            "Planting Bot Gamma",
            40.7583,
            -73.9855,
            67.0,
            BotStatus::Charging,
            "Seed Planting",
            "0 m/s",
            "5 minutes ago",
        ),
        bot(
            "AGR-004",
            "Monitoring Drone Delta",
            40.7597,
            -73.9843,
            45.0,
            BotStatus::Maintenance,
            "Crop Monitoring",
            "3.5 m/s",
            "8 minutes ago",
        ),
    ]
}

/// Pseudo-bot marking the user's own position.
pub fn user_marker(at: Coordinate) -> BotLocation {
    bot(
        USER_LOCATION_ID,
        "Your Location",
        at.lat,
        at.lng,
        100.0,
        BotStatus::Active,
        "Current Position",
        "0 m/s",
        "Now",
    )
}

/// One drift tick: active bots drain, charging bots recharge, bots in
/// maintenance keep their level. Status never changes.
pub fn drift(bots: &mut [BotLocation]) {
    for bot in bots.iter_mut() {
        if bot.id == USER_LOCATION_ID {
            continue;
        }
        bot.battery = match bot.status {
            BotStatus::Active => (bot.battery - ACTIVE_DRAIN).max(0.0),
            BotStatus::Charging => (bot.battery + CHARGE_RATE).min(100.0),
            BotStatus::Maintenance => bot.battery,
        };
        bot.last_update = "Just now".to_string();
    }
}

/// Grid slot for the `index`-th bot, in percent of the map area
/// (x from the left, y from the top).
pub fn grid_position(index: usize) -> (f64, f64) {
    let x = 20.0 + (index % 4) as f64 * 20.0;
    let y = 20.0 + (index / 4) as f64 * 20.0;
    (x, y)
}

/// The user marker sits in the middle of the map, off the grid.
pub const USER_POSITION: (f64, f64) = (50.0, 50.0);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FleetCounts {
    pub active: usize,
    pub charging: usize,
    pub maintenance: usize,
    pub total: usize,
}

pub fn fleet_counts(bots: &[BotLocation]) -> FleetCounts {
    bots.iter()
        .filter(|b| b.id != USER_LOCATION_ID)
        .fold(FleetCounts::default(), |mut acc, b| {
            match b.status {
                BotStatus::Active => acc.active += 1,
                BotStatus::Charging => acc.charging += 1,
                BotStatus::Maintenance => acc.maintenance += 1,
            }
            acc.total += 1;
            acc
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drift_never_changes_status_and_keeps_battery_in_range() {
        let mut bots = generate_bot_locations();
        let before: Vec<BotStatus> = bots.iter().map(|b| b.status).collect();
        for _ in 0..1_000 {
            drift(&mut bots);
        }
        let after: Vec<BotStatus> = bots.iter().map(|b| b.status).collect();
        assert_eq!(before, after);
        assert!(bots.iter().all(|b| (0.0..=100.0).contains(&b.battery)));
    }

    #[test]
    fn drift_applies_per_status_step() {
        let mut bots = generate_bot_locations();
        drift(&mut bots);
        assert!((bots[0].battery - 84.8).abs() < 1e-9);
        assert_eq!(bots[2].battery, 68.0);
        assert_eq!(bots[3].battery, 45.0);
        assert!(bots.iter().all(|b| b.last_update == "Just now"));
    }

    #[test]
    fn user_marker_is_not_drained() {
        let mut bots = vec![user_marker(Coordinate { lat: 1.0, lng: 2.0 })];
        drift(&mut bots);
        assert_eq!(bots[0].battery, 100.0);
        assert_eq!(bots[0].last_update, "Now");
    }

    #[test]
    fn grid_wraps_every_four_bots() {
        assert_eq!(grid_position(0), (20.0, 20.0));
        assert_eq!(grid_position(3), (80.0, 20.0));
        assert_eq!(grid_position(4), (20.0, 40.0));
        assert_eq!(grid_position(9), (40.0, 60.0));
    }

    #[test]
    fn counts_exclude_user_marker() {
        let mut bots = generate_bot_locations();
        bots.insert(0, user_marker(Coordinate { lat: 0.0, lng: 0.0 }));
        let counts = fleet_counts(&bots);
        assert_eq!(
            counts,
            FleetCounts {
                active: 2,
                charging: 1,
                maintenance: 1,
                total: 4
            }
        );
    }
}
