//! Sensor entity.
//!
//! Identity is `(name, type)`. The `active` flag is mutable state carried by the
//! entity and deliberately excluded from equality, ordering and hashing, so a
//! sensor stays the same set member while it toggles.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::SensorType;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("sensor name must not be empty")]
pub struct EmptySensorNameError;

/// A sensor name guaranteed to be non-empty (after trimming).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SensorName(String);

impl SensorName {
    pub fn new(value: impl Into<String>) -> Result<Self, EmptySensorNameError> {
        let value = value.into();
        if value.trim().is_empty() {
            Err(EmptySensorNameError)
        } else {
            Ok(Self(value))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SensorName {
    type Error = EmptySensorNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for SensorName {
    type Error = EmptySensorNameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SensorName> for String {
    fn from(value: SensorName) -> Self {
        value.0
    }
}

impl AsRef<str> for SensorName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for SensorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A door, window or motion sensor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sensor {
    name: SensorName,
    #[serde(rename = "sensor_type")]
    kind: SensorType,
    #[serde(default)]
    active: bool,
}

impl Sensor {
    /// Create an inactive sensor.
    #[must_use]
    pub fn new(name: SensorName, kind: SensorType) -> Self {
        Self {
            name,
            kind,
            active: false,
        }
    }

    /// Validate `name` and create an inactive sensor.
    pub fn try_new(name: impl Into<String>, kind: SensorType) -> Result<Self, EmptySensorNameError> {
        Ok(Self::new(SensorName::new(name)?, kind))
    }

    #[must_use]
    pub fn name(&self) -> &SensorName {
        &self.name
    }

    #[must_use]
    pub fn sensor_type(&self) -> SensorType {
        self.kind
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Builder-style variant of [`Sensor::set_active`].
    #[must_use]
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }
}

impl PartialEq for Sensor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.kind == other.kind
    }
}

impl Eq for Sensor {}

impl PartialOrd for Sensor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Sensor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(&other.name)
            .then_with(|| self.kind.cmp(&other.kind))
    }
}

impl Hash for Sensor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.kind.hash(state);
    }
}

impl fmt::Display for Sensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}): {}",
            self.name,
            self.kind,
            if self.active { "Active" } else { "Inactive" }
        )
    }
}
