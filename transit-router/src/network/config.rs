//! Walking configuration for the transit network.

use chrono::Duration;

/// Rejected walking parameters.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("walking speed must be a positive number of km/h, got {0}")]
    WalkingSpeed(f64),

    #[error("maximum walking distance must be a non-negative number of km, got {0}")]
    MaxWalk(f64),
}

/// Parameters for the walking legs at either end of a journey.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkConfig {
    /// Maximum straight-line distance walked to or from a station (km).
    max_walk_km: f64,

    /// Walking speed (km/h).
    walking_speed_kmh: f64,
}

impl NetworkConfig {
    /// Create a new configuration with the given parameters.
    ///
    /// The speed must be finite and positive, the distance finite and not
    /// negative.
    pub fn new(max_walk_km: f64, walking_speed_kmh: f64) -> Result<Self, ConfigError> {
        if !walking_speed_kmh.is_finite() || walking_speed_kmh <= 0.0 {
            return Err(ConfigError::WalkingSpeed(walking_speed_kmh));
        }
        if !max_walk_km.is_finite() || max_walk_km < 0.0 {
            return Err(ConfigError::MaxWalk(max_walk_km));
        }
        Ok(Self {
            max_walk_km,
            walking_speed_kmh,
        })
    }

    pub fn max_walk_km(&self) -> f64 {
        self.max_walk_km
    }

    pub fn walking_speed_kmh(&self) -> f64 {
        self.walking_speed_kmh
    }

    /// Time needed to walk `distance_km`, rounded to the second.
    ///
    /// `None` when the distance is negative or not finite, or the walk is
    /// too long to represent.
    pub fn walk_time(&self, distance_km: f64) -> Option<Duration> {
        if !distance_km.is_finite() || distance_km < 0.0 {
            return None;
        }
        let seconds = (distance_km / self.walking_speed_kmh * 3600.0).round();
        if seconds >= i64::MAX as f64 {
            return None;
        }
        Duration::try_seconds(seconds as i64)
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            max_walk_km: 1.0,
            walking_speed_kmh: 5.0,
        }
    }
}
