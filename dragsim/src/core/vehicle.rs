use crate::core::error::RaceError;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

/// Unit system in which the performance figures and the race distance are given. Speeds are
/// given in MPH (imperial) or km/h (metric), distances in feet or metres, times in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitSystem {
    Imperial,
    Metric,
}

impl Default for UnitSystem {
    fn default() -> Self {
        UnitSystem::Imperial
    }
}

impl UnitSystem {
    /// Returns the length of a standard drag strip (a quarter mile) in the distance unit.
    pub fn quarter_mile(&self) -> f64 {
        match self {
            UnitSystem::Imperial => 1320.0,
            UnitSystem::Metric => 402.336,
        }
    }

    /// Returns the factor converting a speed into distance units per second.
    pub fn speed_to_distance_per_s(&self) -> f64 {
        match self {
            UnitSystem::Imperial => 5280.0 / 3600.0,
            UnitSystem::Metric => 1000.0 / 3600.0,
        }
    }

    pub fn speed_label(&self) -> &'static str {
        match self {
            UnitSystem::Imperial => "MPH",
            UnitSystem::Metric => "km/h",
        }
    }

    pub fn distance_label(&self) -> &'static str {
        match self {
            UnitSystem::Imperial => "ft",
            UnitSystem::Metric => "m",
        }
    }
}

/// Performance figures of a vehicle as they are read from the parameter file.
/// * `label` - Name shown on the track, e.g. Koenigsegg Jesko Absolut
/// * `top_speed` - Top speed
/// * `speed_0_to_60` - (s) Time to accelerate from standstill to 60 (MPH or km/h)
/// * `quarter_mile_time` - (s) Time to cover the race distance from a standing start
/// * `color` - (Optional) CSS color of the vehicle glyph, e.g. #3B82F6
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct VehiclePars {
    pub label: String,
    pub top_speed: f64,
    pub speed_0_to_60: f64,
    pub quarter_mile_time: f64,
    #[serde(default)]
    pub color: Option<String>,
}

/// Validated performance profile of a vehicle. Instances can only be created with figures that are
/// positive and finite and with a quarter mile time not shorter than the 0-60 time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Vehicle {
    label: String,
    top_speed: f64,
    speed_0_to_60: f64,
    quarter_mile_time: f64,
}

impl Vehicle {
    pub fn new(
        label: &str,
        top_speed: f64,
        speed_0_to_60: f64,
        quarter_mile_time: f64,
    ) -> Result<Vehicle, RaceError> {
        let invalid = |reason: String| RaceError::InvalidProfile {
            label: label.to_owned(),
            reason,
        };

        if label.trim().is_empty() {
            return Err(invalid(String::from("label must not be empty")));
        }

        for (name, val) in [
            ("top speed", top_speed),
            ("0-60 time", speed_0_to_60),
            ("quarter mile time", quarter_mile_time),
        ]
        .iter()
        {
            if !val.is_finite() || *val <= 0.0 {
                return Err(invalid(format!(
                    "{} must be positive and finite, but is {}",
                    name, val
                )));
            }
        }

        if quarter_mile_time < speed_0_to_60 {
            return Err(invalid(format!(
                "quarter mile time ({}s) is shorter than 0-60 time ({}s)",
                quarter_mile_time, speed_0_to_60
            )));
        }

        Ok(Vehicle {
            label: label.to_owned(),
            top_speed,
            speed_0_to_60,
            quarter_mile_time,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn top_speed(&self) -> f64 {
        self.top_speed
    }

    pub fn speed_0_to_60(&self) -> f64 {
        self.speed_0_to_60
    }

    pub fn quarter_mile_time(&self) -> f64 {
        self.quarter_mile_time
    }
}

impl TryFrom<&VehiclePars> for Vehicle {
    type Error = RaceError;

    fn try_from(pars: &VehiclePars) -> Result<Self, Self::Error> {
        Vehicle::new(
            &pars.label,
            pars.top_speed,
            pars.speed_0_to_60,
            pars.quarter_mile_time,
        )
    }
}
