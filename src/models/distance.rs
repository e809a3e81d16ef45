use std::str::FromStr;
use serde::{Deserialize, Serialize};
use crate::models::error::ServiceError;
use crate::models::position::Position;

/// Nautical miles per kilometre.
pub const KM_TO_NM: f64 = 0.539957;

pub const GEODESIC_METHOD: &str = "geodesic";
pub const INVALID_UNIT: &str = "invalid";
pub const INVALID_DISTANCE: f64 = -1.0;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct DistanceRequest {
    #[serde(default)]
    pub source: Position,
    #[serde(default)]
    pub destination: Position,
    #[serde(default)]
    pub unit: String,
}

impl DistanceRequest {
    pub fn new(source: Position, destination: Position, unit: impl Into<String>) -> Self {
        Self { source, destination, unit: unit.into() }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DistanceResult {
    pub distance: f64,
    pub unit: String,
    pub method: String,
}

impl DistanceResult {
    pub fn measured(distance: f64, unit: DistanceUnit) -> Self {
        Self {
            distance,
            unit: unit.token().to_string(),
            method: GEODESIC_METHOD.to_string(),
        }
    }

    /// Sentinel for a request whose coordinates failed validation.
    pub fn invalid() -> Self {
        Self {
            distance: INVALID_DISTANCE,
            unit: INVALID_UNIT.to_string(),
            method: GEODESIC_METHOD.to_string(),
        }
    }

    pub fn is_invalid(&self) -> bool {
        self.unit == INVALID_UNIT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceUnit {
    #[default]
    Kilometers,
    NauticalMiles,
}

impl DistanceUnit {
    pub fn token(&self) -> &'static str {
        match self {
            DistanceUnit::Kilometers => "km",
            DistanceUnit::NauticalMiles => "nm",
        }
    }

    pub fn convert_km(&self, km: f64) -> f64 {
        match self {
            DistanceUnit::Kilometers => km,
            DistanceUnit::NauticalMiles => km * KM_TO_NM,
        }
    }
}

impl FromStr for DistanceUnit {
    type Err = ServiceError;

    // Case-sensitive; the empty token selects the default.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Ok(DistanceUnit::default()),
            "km" => Ok(DistanceUnit::Kilometers),
            "nm" => Ok(DistanceUnit::NauticalMiles),
            other => Err(ServiceError::UnrecognizedUnit(other.to_string())),
        }
    }
}
