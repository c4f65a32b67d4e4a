//! Volatile repository for tests and ephemeral sessions.

use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use catpoint_types::{AlarmStatus, ArmingStatus, Sensor};

use crate::{SecurityRepository, SecurityState, StoreError};

#[derive(Debug, Default)]
pub struct MemoryRepository {
    state: Mutex<SecurityState>,
}

impl MemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_state(state: SecurityState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SecurityState> {
        // State is plain data; a panic mid-update cannot leave it torn.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SecurityRepository for MemoryRepository {
    fn sensors(&self) -> BTreeSet<Sensor> {
        self.lock().sensors.clone()
    }

    fn add_sensor(&self, sensor: &Sensor) -> Result<(), StoreError> {
        self.lock().add_sensor(sensor);
        Ok(())
    }

    fn remove_sensor(&self, sensor: &Sensor) -> Result<(), StoreError> {
        self.lock().remove_sensor(sensor);
        Ok(())
    }

    fn update_sensor(&self, sensor: &Sensor) -> Result<(), StoreError> {
        self.lock().update_sensor(sensor);
        Ok(())
    }

    fn alarm_status(&self) -> AlarmStatus {
        self.lock().alarm_status
    }

    fn set_alarm_status(&self, status: AlarmStatus) -> Result<(), StoreError> {
        self.lock().alarm_status = status;
        Ok(())
    }

    fn arming_status(&self) -> ArmingStatus {
        self.lock().arming_status
    }

    fn set_arming_status(&self, status: ArmingStatus) -> Result<(), StoreError> {
        self.lock().arming_status = status;
        Ok(())
    }
}
