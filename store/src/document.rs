//! On-disk JSON document.
//!
//! ```json
//! {
//!   "sensors": [{ "name": "Front", "sensor_type": "DOOR", "active": false }],
//!   "alarm_status": "NO_ALARM",
//!   "arming_status": "DISARMED"
//! }
//! ```
//!
//! Decoding is field-by-field so one corrupt value does not discard the rest.

use std::collections::BTreeSet;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use catpoint_types::{AlarmStatus, ArmingStatus, Sensor};

use crate::SecurityState;

const SENSORS: &str = "sensors";
const ALARM_STATUS: &str = "alarm_status";
const ARMING_STATUS: &str = "arming_status";

#[derive(Serialize)]
struct DocumentRef<'a> {
    sensors: Vec<&'a Sensor>,
    alarm_status: AlarmStatus,
    arming_status: ArmingStatus,
}

pub(crate) fn encode(state: &SecurityState) -> serde_json::Result<Vec<u8>> {
    let document = DocumentRef {
        sensors: state.sensors.iter().collect(),
        alarm_status: state.alarm_status,
        arming_status: state.arming_status,
    };
    serde_json::to_vec_pretty(&document)
}

/// Decode a document, substituting defaults for anything missing or malformed.
pub(crate) fn decode(raw: &str) -> SecurityState {
    let root = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(root)) => root,
        Ok(other) => {
            warn!(found = %json_kind(&other), "State document is not an object, using defaults");
            return SecurityState::default();
        }
        Err(e) => {
            warn!("State document is not valid JSON, using defaults: {e}");
            return SecurityState::default();
        }
    };

    SecurityState {
        sensors: decode_sensors(&root),
        alarm_status: decode_field(&root, ALARM_STATUS),
        arming_status: decode_field(&root, ARMING_STATUS),
    }
}

fn decode_field<T: DeserializeOwned + Default>(root: &Map<String, Value>, key: &str) -> T {
    let Some(value) = root.get(key) else {
        return T::default();
    };
    match T::deserialize(value) {
        Ok(decoded) => decoded,
        Err(e) => {
            warn!(field = key, "Malformed state field, using default: {e}");
            T::default()
        }
    }
}

fn decode_sensors(root: &Map<String, Value>) -> BTreeSet<Sensor> {
    let entries = match root.get(SENSORS) {
        None | Some(Value::Null) => return BTreeSet::new(),
        Some(Value::Array(entries)) => entries,
        Some(other) => {
            warn!(found = %json_kind(other), "Sensor list is not an array, using empty set");
            return BTreeSet::new();
        }
    };

    entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| match Sensor::deserialize(entry) {
            Ok(sensor) => Some(sensor),
            Err(e) => {
                warn!(index, "Skipping malformed sensor entry: {e}");
                None
            }
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
