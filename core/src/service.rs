//! The alarm state machine.
//!
//! # Transitions
//!
//! ```text
//! event                                   guard                          alarm status
//! --------------------------------------  -----------------------------  -------------------
//! arm (home | away)                       -                              sensors deactivated
//! arm home                                cat detected                   -> ALARM
//! disarm                                  -                              -> NO_ALARM
//! sensor activated                        status == ALARM                (ignored)
//! sensor activated                        armed, PENDING or re-trip      -> ALARM
//! sensor activated                        armed, otherwise               -> PENDING_ALARM
//! sensor deactivated                      was active, PENDING, all idle  -> NO_ALARM
//! image: cat                              armed home                     -> ALARM
//! image: no cat                           all idle, status != ALARM      -> NO_ALARM
//! ```
//!
//! Every alarm write goes through [`SecurityService::set_alarm_status`], which
//! persists before notifying listeners.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use catpoint_store::SecurityRepository;
use catpoint_types::{AlarmStatus, ArmingStatus, Sensor};
use catpoint_vision::{CAT_CONFIDENCE_THRESHOLD, Image, ImageClassifier};

use crate::SecurityError;
use crate::listener::{ListenerRegistry, StatusListener};

pub struct SecurityService {
    repository: Arc<dyn SecurityRepository>,
    classifier: Arc<dyn ImageClassifier>,
    listeners: ListenerRegistry,
    /// Result of the most recent classification. Process-local, never persisted.
    cat_detected: AtomicBool,
}

impl SecurityService {
    #[must_use]
    pub fn new(
        repository: Arc<dyn SecurityRepository>,
        classifier: Arc<dyn ImageClassifier>,
    ) -> Self {
        Self {
            repository,
            classifier,
            listeners: ListenerRegistry::default(),
            cat_detected: AtomicBool::new(false),
        }
    }

    /// Arm or disarm the system.
    ///
    /// Arming deactivates every sensor; arming home while a cat is in view
    /// raises the alarm immediately. Disarming always clears the alarm. The new
    /// arming status is persisted last.
    pub fn set_arming_status(&self, status: ArmingStatus) -> Result<(), SecurityError> {
        debug!(arming = %status, "Setting arming status");
        if status.is_armed() {
            self.deactivate_all_sensors()?;
            if status == ArmingStatus::ArmedHome && self.cat_detected() {
                self.set_alarm_status(AlarmStatus::Alarm)?;
            }
        } else {
            self.set_alarm_status(AlarmStatus::NoAlarm)?;
        }
        self.repository.set_arming_status(status)?;
        Ok(())
    }

    /// Set `sensor` active or inactive and apply the resulting alarm transition.
    ///
    /// While the alarm is sounding this is a strict no-op: `sensor` is left
    /// untouched and nothing is written. Otherwise `sensor` is updated in place
    /// and persisted even if its flag did not change. If that write fails,
    /// `sensor` gets its old flag back and no alarm rule runs.
    pub fn change_sensor_activation_status(
        &self,
        sensor: &mut Sensor,
        active: bool,
    ) -> Result<(), SecurityError> {
        let alarm = self.alarm_status();
        if alarm == AlarmStatus::Alarm {
            debug!(sensor = %sensor.name(), "Alarm active, ignoring sensor change");
            return Ok(());
        }

        let was_active = sensor.is_active();
        sensor.set_active(active);
        if let Err(err) = self.repository.update_sensor(sensor) {
            sensor.set_active(was_active);
            return Err(err.into());
        }

        if active {
            self.handle_sensor_activated(alarm, was_active)
        } else if was_active && alarm == AlarmStatus::PendingAlarm {
            self.check_sensors_and_update_status()
        } else {
            Ok(())
        }
    }

    fn handle_sensor_activated(
        &self,
        alarm: AlarmStatus,
        was_active: bool,
    ) -> Result<(), SecurityError> {
        if !self.arming_status().is_armed() {
            return Ok(());
        }
        // A sensor tripping again while already active counts as a second trip.
        let escalate = alarm == AlarmStatus::PendingAlarm || was_active;
        self.set_alarm_status(if escalate {
            AlarmStatus::Alarm
        } else {
            AlarmStatus::PendingAlarm
        })
    }

    /// Drop a pending alarm once every sensor has gone idle.
    pub fn check_sensors_and_update_status(&self) -> Result<(), SecurityError> {
        if self.alarm_status() == AlarmStatus::PendingAlarm && self.all_sensors_inactive() {
            self.set_alarm_status(AlarmStatus::NoAlarm)?;
        }
        Ok(())
    }

    /// Classify a camera frame and apply the cat rules.
    ///
    /// `None` is a no-op that touches neither the repository nor the classifier.
    /// Otherwise listeners always hear the classification result, even when the
    /// alarm status is unchanged or persisting it failed.
    pub fn process_image(&self, image: Option<&Image>) -> Result<(), SecurityError> {
        let Some(image) = image else {
            return Ok(());
        };

        let cat = self
            .classifier
            .contains_cat(image, CAT_CONFIDENCE_THRESHOLD);
        self.cat_detected.store(cat, Ordering::SeqCst);
        debug!(cat, "Image processed");

        let applied = self.apply_cat_detection(cat);
        self.listeners.cat_detected(cat);
        applied
    }

    fn apply_cat_detection(&self, cat: bool) -> Result<(), SecurityError> {
        if cat && self.arming_status() == ArmingStatus::ArmedHome {
            self.set_alarm_status(AlarmStatus::Alarm)
        } else if !cat
            && self.all_sensors_inactive()
            && self.alarm_status() != AlarmStatus::Alarm
        {
            self.set_alarm_status(AlarmStatus::NoAlarm)
        } else {
            Ok(())
        }
    }

    /// Persist `status` and notify every listener.
    ///
    /// Listeners are only notified once the write succeeded.
    pub fn set_alarm_status(&self, status: AlarmStatus) -> Result<(), SecurityError> {
        self.repository.set_alarm_status(status)?;
        debug!(alarm = %status, "Alarm status set");
        self.listeners.alarm_status_changed(status);
        Ok(())
    }

    /// Register `listener`. Registering the same `Arc` twice has no effect.
    pub fn add_status_listener(&self, listener: Arc<dyn StatusListener>) {
        self.listeners.add(listener);
    }

    /// Unregister `listener`. Unknown listeners are ignored.
    pub fn remove_status_listener(&self, listener: &Arc<dyn StatusListener>) {
        self.listeners.remove(listener);
    }

    pub fn add_sensor(&self, sensor: &Sensor) -> Result<(), SecurityError> {
        self.repository.add_sensor(sensor)?;
        Ok(())
    }

    pub fn remove_sensor(&self, sensor: &Sensor) -> Result<(), SecurityError> {
        self.repository.remove_sensor(sensor)?;
        Ok(())
    }

    #[must_use]
    pub fn sensors(&self) -> BTreeSet<Sensor> {
        self.repository.sensors()
    }

    #[must_use]
    pub fn alarm_status(&self) -> AlarmStatus {
        self.repository.alarm_status()
    }

    #[must_use]
    pub fn arming_status(&self) -> ArmingStatus {
        self.repository.arming_status()
    }

    /// Result of the most recent image classification (`false` before the first).
    #[must_use]
    pub fn cat_detected(&self) -> bool {
        self.cat_detected.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Deactivate every sensor ahead of arming.
    ///
    /// A sensor is rewritten if it was active, or if the system is already
    /// armed (then even idle sensors are rewritten). Idle sensors of a
    /// disarmed system are skipped.
    // NOTE: when already armed, idle sensors are rewritten too, which changes
    // nothing on disk.
    fn deactivate_all_sensors(&self) -> Result<(), SecurityError> {
        let already_armed = self.arming_status().is_armed();
        for mut sensor in self.repository.sensors() {
            let was_active = sensor.is_active();
            sensor.set_active(false);
            if was_active || already_armed {
                self.repository.update_sensor(&sensor)?;
            }
        }
        Ok(())
    }

    fn all_sensors_inactive(&self) -> bool {
        !self.repository.sensors().iter().any(Sensor::is_active)
    }
}
