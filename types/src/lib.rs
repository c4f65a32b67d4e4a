//! Core domain types for Catpoint.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application: the store
//! persists these values, the core state machine transitions between them, and
//! the CLI renders them.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

mod sensor;

pub use sensor::{EmptySensorNameError, Sensor, SensorName};

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A textual status, sensor type or mode did not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} `{value}` (expected one of: {expected})")]
pub struct ParseStatusError {
    kind: &'static str,
    value: String,
    expected: &'static str,
}

impl ParseStatusError {
    fn new(kind: &'static str, value: &str, expected: &'static str) -> Self {
        Self {
            kind,
            value: value.to_string(),
            expected,
        }
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Lowercase and fold `-`/` ` into `_` so `armed-home`, `Armed Home` and
/// `ARMED_HOME` all compare equal.
fn normalize(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| match c {
            '-' | ' ' => '_',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}

// ============================================================================
// Sensor Types
// ============================================================================

/// The kind of physical sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SensorType {
    Door,
    Window,
    Motion,
}

impl SensorType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorType::Door => "DOOR",
            SensorType::Window => "WINDOW",
            SensorType::Motion => "MOTION",
        }
    }

    /// Parse a sensor type, ignoring case.
    pub fn parse(raw: &str) -> Result<Self, ParseStatusError> {
        match normalize(raw).as_str() {
            "door" => Ok(SensorType::Door),
            "window" => Ok(SensorType::Window),
            "motion" => Ok(SensorType::Motion),
            _ => Err(ParseStatusError::new(
                "sensor type",
                raw,
                "door, window, motion",
            )),
        }
    }
}

impl fmt::Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Alarm Status
// ============================================================================

/// Escalation level of a potential intrusion.
///
/// Variants are declared in escalation order, so `NoAlarm < PendingAlarm < Alarm`.
/// Transitions between them are rule-driven and may de-escalate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlarmStatus {
    #[default]
    NoAlarm,
    PendingAlarm,
    Alarm,
}

impl AlarmStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            AlarmStatus::NoAlarm => "NO_ALARM",
            AlarmStatus::PendingAlarm => "PENDING_ALARM",
            AlarmStatus::Alarm => "ALARM",
        }
    }

    /// Human-facing headline for the status.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            AlarmStatus::NoAlarm => "Cool and Good",
            AlarmStatus::PendingAlarm => "I'm in Danger...",
            AlarmStatus::Alarm => "Awooga!",
        }
    }
}

impl fmt::Display for AlarmStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Arming Status
// ============================================================================

/// Whether the system is watching sensors, and under which profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArmingStatus {
    #[default]
    Disarmed,
    ArmedHome,
    ArmedAway,
}

impl ArmingStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ArmingStatus::Disarmed => "DISARMED",
            ArmingStatus::ArmedHome => "ARMED_HOME",
            ArmingStatus::ArmedAway => "ARMED_AWAY",
        }
    }

    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            ArmingStatus::Disarmed => "Disarmed",
            ArmingStatus::ArmedHome => "Armed - At Home",
            ArmingStatus::ArmedAway => "Armed - Away",
        }
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        !matches!(self, ArmingStatus::Disarmed)
    }

    /// Parse an arming status. Accepts the short forms `home`, `away` and `disarm`.
    pub fn parse(raw: &str) -> Result<Self, ParseStatusError> {
        match normalize(raw).as_str() {
            "disarmed" | "disarm" | "off" => Ok(ArmingStatus::Disarmed),
            "armed_home" | "home" => Ok(ArmingStatus::ArmedHome),
            "armed_away" | "away" => Ok(ArmingStatus::ArmedAway),
            _ => Err(ParseStatusError::new(
                "arming status",
                raw,
                "disarmed, home, away",
            )),
        }
    }
}

impl fmt::Display for ArmingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
