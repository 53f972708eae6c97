//! Where the user is. Coordinates come from `AGRIBOT_LOCATION` or the
//! `[location]` config table; failures map to a fixed set of messages.

use crate::config::LocationConfig;
use crate::models::Coordinate;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

pub const LOCATION_ENV: &str = "AGRIBOT_LOCATION";
pub const LOCATION_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LocationError {
    #[error("Location access denied by user.")]
    PermissionDenied,
    #[error("Location information is unavailable.")]
    Unavailable,
    #[error("Location request timed out.")]
    Timeout,
    #[error("An unknown error occurred.")]
    Unknown,
}

impl LocationError {
    /// Full banner text shown on the map page.
    pub fn banner(&self) -> String {
        format!("Unable to get location: {}", self)
    }
}

/// Resolves the location from an env value (takes precedence) or config.
pub fn resolve(config: &LocationConfig, env_value: Option<&str>) -> Result<Coordinate, LocationError> {
    if !config.enabled {
        return Err(LocationError::PermissionDenied);
    }
    if let Some(raw) = env_value.filter(|v| !v.trim().is_empty()) {
        return parse_coordinate(raw);
    }
    match (config.lat, config.lng) {
        (Some(lat), Some(lng)) => validate(lat, lng),
        _ => Err(LocationError::Unavailable),
    }
}

/// Parses `"lat,lng"`.
pub fn parse_coordinate(raw: &str) -> Result<Coordinate, LocationError> {
    let (lat, lng) = raw.split_once(',').ok_or(LocationError::Unavailable)?;
    let lat: f64 = lat.trim().parse().map_err(|_| LocationError::Unavailable)?;
    let lng: f64 = lng.trim().parse().map_err(|_| LocationError::Unavailable)?;
    validate(lat, lng)
}

fn validate(lat: f64, lng: f64) -> Result<Coordinate, LocationError> {
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return Err(LocationError::Unavailable);
    }
    Ok(Coordinate { lat, lng })
}

/// Bounds a location lookup by `limit`.
pub async fn with_timeout<F>(lookup: F, limit: Duration) -> Result<Coordinate, LocationError>
where
    F: Future<Output = Result<Coordinate, LocationError>>,
{
    match tokio::time::timeout(limit, lookup).await {
        Ok(result) => result,
        Err(_) => Err(LocationError::Timeout),
    }
}

/// Looks the location up from the process environment and `config`.
pub async fn locate(config: LocationConfig) -> Result<Coordinate, LocationError> {
    with_timeout(
        async move {
            let env_value = match std::env::var(LOCATION_ENV) {
                Ok(v) => Some(v),
                Err(std::env::VarError::NotPresent) => None,
                Err(std::env::VarError::NotUnicode(_)) => return Err(LocationError::Unknown),
            };
            resolve(&config, env_value.as_deref())
        },
        LOCATION_TIMEOUT,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured(lat: f64, lng: f64) -> LocationConfig {
        LocationConfig {
            enabled: true,
            lat: Some(lat),
            lng: Some(lng),
        }
    }

    #[test]
    fn disabled_location_is_permission_denied() {
        let cfg = LocationConfig {
            enabled: false,
            ..configured(1.0, 2.0)
        };
        let err = resolve(&cfg, Some("1,2")).unwrap_err();
        assert_eq!(
            err.banner(),
            "Unable to get location: Location access denied by user."
        );
    }

    #[test]
    fn env_value_wins_over_config() {
        let coord = resolve(&configured(1.0, 2.0), Some(" 40.7589 , -73.9851 ")).unwrap();
        assert_eq!(coord.lat, 40.7589);
        assert_eq!(coord.lng, -73.9851);
    }

    #[test]
    fn missing_source_is_unavailable() {
        let err = resolve(&LocationConfig::default(), None).unwrap_err();
        assert_eq!(err, LocationError::Unavailable);
        assert_eq!(parse_coordinate("north"), Err(LocationError::Unavailable));
        assert_eq!(parse_coordinate("95,0"), Err(LocationError::Unavailable));
    }

    #[tokio::test]
    async fn slow_lookup_times_out() {
        let never = std::future::pending::<Result<Coordinate, LocationError>>();
        let err = with_timeout(never, Duration::from_millis(10)).await.unwrap_err();
        assert_eq!(err.banner(), "Unable to get location: Location request timed out.");
    }
}
