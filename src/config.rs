//! Simulation configuration.
//!
//! A [`SimConfig`] is loaded from JSON (every field has a default) and checked
//! once by [`SimConfig::validate`] before anything is built. Validation also
//! resolves the policy identifiers into the kinds the factories understand.

use crate::call::FloorNumber;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

const STANDARD: &str = "Standard";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub floors: FloorNumber,
    pub elevators: u32,
    pub door_time_ms: u64,
    pub travel_time_ms: u64,
    pub default_floor: FloorNumber,
    pub idle_timeout_ms: u64,
    pub max_capacity: usize,
    pub selector: String,
    pub processor: String,
    pub elevator_kind: String,
    pub production: ProductionConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductionConfig {
    pub people_per_minute: u32,
    pub duration_ms: u64,
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            floors: 16,
            elevators: 4,
            door_time_ms: 500,
            travel_time_ms: 500,
            default_floor: 1,
            idle_timeout_ms: 15_000,
            max_capacity: 8,
            selector: STANDARD.to_string(),
            processor: STANDARD.to_string(),
            elevator_kind: STANDARD.to_string(),
            production: ProductionConfig::default(),
        }
    }
}

impl Default for ProductionConfig {
    fn default() -> Self {
        Self {
            people_per_minute: 15,
            duration_ms: 5 * 60 * 1000,
            seed: None,
        }
    }
}

/// Policy variants resolved from a validated configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policies {
    pub selector: SelectorKind,
    pub processor: ProcessorKind,
    pub elevator: ElevatorKind,
}

/// Timing and capacity every unit of the fleet shares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitSettings {
    pub floors: FloorNumber,
    pub default_floor: FloorNumber,
    pub door_time: Duration,
    pub travel_time: Duration,
    pub idle_timeout: Duration,
    pub max_capacity: usize,
}

impl SimConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Check every bound and resolve the policy identifiers.
    pub fn validate(&self) -> Result<Policies, ConfigError> {
        if self.floors < 2 {
            return Err(ConfigError::invalid("floors", "a building needs at least 2 floors"));
        }
        if self.elevators < 1 {
            return Err(ConfigError::invalid("elevators", "at least one elevator is required"));
        }
        if self.door_time_ms < 1 {
            return Err(ConfigError::invalid("door_time_ms", "must be at least 1 ms"));
        }
        if self.travel_time_ms < 1 {
            return Err(ConfigError::invalid("travel_time_ms", "must be at least 1 ms"));
        }
        if self.default_floor < 1 || self.default_floor > self.floors {
            return Err(ConfigError::invalid(
                "default_floor",
                format!("must be within 1..={}", self.floors),
            ));
        }
        if self.idle_timeout_ms < 1 {
            return Err(ConfigError::invalid("idle_timeout_ms", "must be at least 1 ms"));
        }
        if self.max_capacity < 1 {
            return Err(ConfigError::invalid("max_capacity", "must be at least 1 rider"));
        }
        if self.production.people_per_minute < 1 {
            return Err(ConfigError::invalid("people_per_minute", "must be at least 1"));
        }
        if self.production.duration_ms < 1 {
            return Err(ConfigError::invalid("duration_ms", "must be at least 1 ms"));
        }

        Ok(Policies {
            selector: self.selector.parse()?,
            processor: self.processor.parse()?,
            elevator: self.elevator_kind.parse()?,
        })
    }

    pub fn unit_settings(&self) -> UnitSettings {
        UnitSettings {
            floors: self.floors,
            default_floor: self.default_floor,
            door_time: Duration::from_millis(self.door_time_ms),
            travel_time: Duration::from_millis(self.travel_time_ms),
            idle_timeout: Duration::from_millis(self.idle_timeout_ms),
            max_capacity: self.max_capacity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorKind {
    Standard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorKind {
    Standard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElevatorKind {
    Standard,
}

impl FromStr for SelectorKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            STANDARD => Ok(SelectorKind::Standard),
            other => Err(ConfigError::UnknownPolicy { role: "elevator selector", name: other.to_string() }),
        }
    }
}

impl FromStr for ProcessorKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            STANDARD => Ok(ProcessorKind::Standard),
            other => Err(ConfigError::UnknownPolicy {
                role: "pending requests processor",
                name: other.to_string(),
            }),
        }
    }
}

impl FromStr for ElevatorKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            STANDARD => Ok(ElevatorKind::Standard),
            other => Err(ConfigError::UnknownPolicy { role: "elevator", name: other.to_string() }),
        }
    }
}
