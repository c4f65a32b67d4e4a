use std::collections::BTreeSet;

use catpoint_types::{AlarmStatus, ArmingStatus, Sensor};

/// The complete persisted state, as held in memory by a repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityState {
    pub sensors: BTreeSet<Sensor>,
    pub alarm_status: AlarmStatus,
    pub arming_status: ArmingStatus,
}

impl SecurityState {
    pub(crate) fn add_sensor(&mut self, sensor: &Sensor) {
        // `insert` keeps the existing member on a duplicate, so a re-add cannot
        // clobber the stored active flag.
        self.sensors.insert(sensor.clone());
    }

    pub(crate) fn remove_sensor(&mut self, sensor: &Sensor) {
        self.sensors.remove(sensor);
    }

    pub(crate) fn update_sensor(&mut self, sensor: &Sensor) {
        self.sensors.replace(sensor.clone());
    }
}
