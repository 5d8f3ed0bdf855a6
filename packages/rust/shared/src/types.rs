//! Core domain types for the fleet-to-scenario transform.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ReactorRecord
// ---------------------------------------------------------------------------

/// Geographic position of a unit, always finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Build coordinates only if both components are finite numbers.
    pub fn from_finite(latitude: f64, longitude: f64) -> Option<Self> {
        (latitude.is_finite() && longitude.is_finite()).then_some(Self {
            latitude,
            longitude,
        })
    }
}

/// One operating power reactor that survived fleet filtering.
///
/// Net capacity is always above the filter threshold; the status column is
/// consumed by the filter and not carried here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactorRecord {
    /// Country the unit belongs to.
    pub country: String,
    /// Unit name, parenthetical annotations stripped and `&` spelled `and`.
    pub name: String,
    /// Reactor type key, e.g. `PWR` or `BWR`.
    pub reactor_type: String,
    /// Net electrical capacity in MWe.
    pub net_capacity_mwe: f64,
    /// Commercial operation date.
    pub commercial: NaiveDate,
    /// Permanent shutdown date, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shutdown: Option<NaiveDate>,
    /// Site position, if the source carried finite coordinates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Coordinates>,
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// When a unit enters the simulation and how long it stays, in months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lifecycle {
    /// Entry timestep, never below 1.
    pub entry_time: i32,
    /// Active months; zero or less means the unit is not deployed.
    pub lifetime: i32,
}

impl Lifecycle {
    /// Whether the unit takes part in the scenario at all.
    pub fn is_deployed(&self) -> bool {
        self.lifetime > 0
    }
}

/// A reactor record with its lifecycle attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetUnit {
    pub record: ReactorRecord,
    pub lifecycle: Lifecycle,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_reject_non_finite() {
        assert!(Coordinates::from_finite(50.85, 4.35).is_some());
        assert!(Coordinates::from_finite(f64::NAN, 4.35).is_none());
        assert!(Coordinates::from_finite(50.85, f64::INFINITY).is_none());
    }

    #[test]
    fn lifecycle_deployment() {
        assert!(Lifecycle { entry_time: 1, lifetime: 12 }.is_deployed());
        assert!(!Lifecycle { entry_time: 1, lifetime: 0 }.is_deployed());
        assert!(!Lifecycle { entry_time: 1, lifetime: -4 }.is_deployed());
    }

    #[test]
    fn record_serialization_skips_missing_optionals() {
        let record = ReactorRecord {
            country: "Belgium".into(),
            name: "Doel-1".into(),
            reactor_type: "PWR".into(),
            net_capacity_mwe: 433.0,
            commercial: NaiveDate::from_ymd_opt(1975, 2, 15).unwrap(),
            shutdown: None,
            position: None,
        };

        let json = serde_json::to_string(&record).expect("serialize");
        assert!(!json.contains("shutdown"));
        assert!(!json.contains("position"));
        let parsed: ReactorRecord = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, record);
    }
}
