//! Security service over the on-disk store.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use catpoint_core::StatusListener;
use catpoint_types::{AlarmStatus, ArmingStatus, Sensor, SensorType};

use crate::common::{Workspace, frame};

fn sensor(name: &str, kind: SensorType) -> Sensor {
    Sensor::try_new(name, kind).expect("valid name")
}

#[derive(Default)]
struct AlarmLog(Mutex<Vec<AlarmStatus>>);

impl AlarmLog {
    fn seen(&self) -> Vec<AlarmStatus> {
        self.0.lock().expect("alarm log lock").clone()
    }
}

impl StatusListener for AlarmLog {
    fn on_alarm_status_changed(&self, status: AlarmStatus) {
        self.0.lock().expect("alarm log lock").push(status);
    }

    fn on_cat_detected(&self, _cat_detected: bool) {}
}

/// A state file inside its own directory, so the directory can be swapped
/// for a plain file to make every write fail.
struct Vault {
    dir: PathBuf,
}

impl Vault {
    fn new(ws: &Workspace) -> Self {
        let dir = ws.root().join("vault");
        fs::create_dir(&dir).unwrap();
        Self { dir }
    }

    fn state_path(&self) -> PathBuf {
        self.dir.join("state.json")
    }

    fn break_disk(&self) {
        fs::remove_dir_all(&self.dir).unwrap();
        fs::write(&self.dir, b"not a directory").unwrap();
    }

    fn restore_disk(&self) {
        fs::remove_file(&self.dir).unwrap();
        fs::create_dir(&self.dir).unwrap();
    }

    fn document(&self) -> serde_json::Value {
        read_document(&self.state_path())
    }
}

fn read_document(path: &Path) -> serde_json::Value {
    let raw = fs::read_to_string(path).expect("read state");
    serde_json::from_str(&raw).expect("state is JSON")
}

#[test]
fn arming_survives_restart_with_sensors_reset() {
    let ws = Workspace::new();
    {
        let (_, service) = ws.service(false);
        let mut door = sensor("Front", SensorType::Door);
        service.add_sensor(&door).unwrap();
        service
            .change_sensor_activation_status(&mut door, true)
            .unwrap();
        service.set_arming_status(ArmingStatus::ArmedAway).unwrap();
    }

    let (_, service) = ws.service(false);
    assert_eq!(service.arming_status(), ArmingStatus::ArmedAway);
    assert_eq!(service.alarm_status(), AlarmStatus::NoAlarm);
    let sensors = service.sensors();
    assert_eq!(sensors.len(), 1);
    assert!(sensors.iter().all(|s| !s.is_active()));
}

#[test]
fn pending_alarm_resolves_across_restart() {
    let ws = Workspace::new();
    {
        let (_, service) = ws.service(false);
        service.set_arming_status(ArmingStatus::ArmedHome).unwrap();
        let mut motion = sensor("Hall", SensorType::Motion);
        service.add_sensor(&motion).unwrap();
        service
            .change_sensor_activation_status(&mut motion, true)
            .unwrap();
        assert_eq!(service.alarm_status(), AlarmStatus::PendingAlarm);
    }

    let (_, service) = ws.service(false);
    assert_eq!(service.alarm_status(), AlarmStatus::PendingAlarm);
    let mut motion = service
        .sensors()
        .into_iter()
        .next()
        .expect("sensor persisted");
    assert!(motion.is_active());

    service
        .change_sensor_activation_status(&mut motion, false)
        .unwrap();

    assert_eq!(service.alarm_status(), AlarmStatus::NoAlarm);
    assert_eq!(ws.document()["alarm_status"], "NO_ALARM");
}

#[test]
fn second_trip_while_pending_sounds_alarm_on_disk() {
    let ws = Workspace::new();
    let (_, service) = ws.service(false);
    let mut door = sensor("Door", SensorType::Door);
    let mut window = sensor("Window", SensorType::Window);
    service.add_sensor(&door).unwrap();
    service.add_sensor(&window).unwrap();
    service.set_arming_status(ArmingStatus::ArmedAway).unwrap();

    service
        .change_sensor_activation_status(&mut door, true)
        .unwrap();
    service
        .change_sensor_activation_status(&mut window, true)
        .unwrap();

    assert_eq!(ws.document()["alarm_status"], "ALARM");

    // Sounding alarm ignores further sensor changes, on disk too.
    service
        .change_sensor_activation_status(&mut door, false)
        .unwrap();
    assert!(door.is_active());
    let doc = ws.document();
    let sensors = doc["sensors"].as_array().expect("sensors array");
    assert!(sensors.iter().all(|s| s["active"] == true));
}

#[test]
fn cat_flag_is_not_persisted() {
    let ws = Workspace::new();
    {
        let (_, service) = ws.service(true);
        service.process_image(Some(&frame())).unwrap();
        assert!(service.cat_detected());
    }

    let (_, service) = ws.service(true);
    assert!(!service.cat_detected());
    service.set_arming_status(ArmingStatus::ArmedHome).unwrap();
    assert_eq!(service.alarm_status(), AlarmStatus::NoAlarm);
}

#[test]
fn cat_then_arm_home_sounds_alarm() {
    let ws = Workspace::new();
    let (_, service) = ws.service(true);

    service.process_image(Some(&frame())).unwrap();
    service.set_arming_status(ArmingStatus::ArmedHome).unwrap();

    let doc = ws.document();
    assert_eq!(doc["alarm_status"], "ALARM");
    assert_eq!(doc["arming_status"], "ARMED_HOME");
}

#[test]
fn document_uses_stable_names() {
    let ws = Workspace::new();
    let (_, service) = ws.service(false);
    service
        .add_sensor(&sensor("Garage", SensorType::Window).with_active(true))
        .unwrap();
    service.set_alarm_status(AlarmStatus::PendingAlarm).unwrap();

    let doc = ws.document();
    assert_eq!(doc["arming_status"], "DISARMED");
    assert_eq!(doc["alarm_status"], "PENDING_ALARM");
    assert_eq!(
        doc["sensors"],
        serde_json::json!([
            { "name": "Garage", "sensor_type": "WINDOW", "active": true }
        ])
    );
}

#[test]
fn hand_edited_document_keeps_valid_fields() {
    let ws = Workspace::new();
    fs::write(
        ws.state_path(),
        r#"{
            "sensors": [
                { "name": "Back", "sensor_type": "DOOR", "active": true },
                { "name": "", "sensor_type": "DOOR" },
                { "name": "Laser", "sensor_type": "LASER" }
            ],
            "alarm_status": "SIREN",
            "arming_status": "ARMED_AWAY"
        }"#,
    )
    .unwrap();

    let (_, service) = ws.service(false);

    assert_eq!(service.arming_status(), ArmingStatus::ArmedAway);
    assert_eq!(service.alarm_status(), AlarmStatus::NoAlarm);
    let names: Vec<String> = service
        .sensors()
        .iter()
        .map(|s| s.name().to_string())
        .collect();
    assert_eq!(names, vec!["Back"]);
}

#[test]
fn corrupt_document_is_replaced_on_first_write() {
    let ws = Workspace::new();
    fs::write(ws.state_path(), "not json at all").unwrap();

    let (_, service) = ws.service(false);
    assert_eq!(service.arming_status(), ArmingStatus::Disarmed);
    assert!(service.sensors().is_empty());

    service.set_arming_status(ArmingStatus::ArmedHome).unwrap();

    assert_eq!(ws.document()["arming_status"], "ARMED_HOME");
}

#[test]
fn removed_sensor_stays_removed() {
    let ws = Workspace::new();
    {
        let (_, service) = ws.service(false);
        let door = sensor("Door", SensorType::Door);
        service.add_sensor(&door).unwrap();
        service.add_sensor(&sensor("Hall", SensorType::Motion)).unwrap();
        service.remove_sensor(&door).unwrap();
    }

    let (repo, service) = ws.service(false);
    let names: Vec<String> = service
        .sensors()
        .iter()
        .map(|s| s.name().to_string())
        .collect();
    assert_eq!(names, vec!["Hall"]);
    assert_eq!(repo.path(), ws.state_path().as_path());
}

#[test]
fn failed_alarm_write_changes_nothing_until_disk_returns() {
    let ws = Workspace::new();
    let vault = Vault::new(&ws);
    let (_, service) = ws.service_at(vault.state_path(), false);
    let log = Arc::new(AlarmLog::default());
    service.add_status_listener(log.clone());
    let mut front = sensor("Front", SensorType::Door);
    service.add_sensor(&front).unwrap();
    service.set_arming_status(ArmingStatus::ArmedAway).unwrap();

    vault.break_disk();
    assert!(service.set_alarm_status(AlarmStatus::Alarm).is_err());

    assert_eq!(service.alarm_status(), AlarmStatus::NoAlarm);
    assert!(log.seen().is_empty());

    vault.restore_disk();
    service
        .change_sensor_activation_status(&mut front, true)
        .unwrap();

    assert_eq!(service.alarm_status(), AlarmStatus::PendingAlarm);
    assert_eq!(log.seen(), vec![AlarmStatus::PendingAlarm]);
    let doc = vault.document();
    assert_eq!(doc["alarm_status"], "PENDING_ALARM");
    assert_eq!(doc["arming_status"], "ARMED_AWAY");
}

#[test]
fn failed_sensor_write_while_pending_escalates_after_disk_returns() {
    let ws = Workspace::new();
    let vault = Vault::new(&ws);
    let (_, service) = ws.service_at(vault.state_path(), false);
    let log = Arc::new(AlarmLog::default());
    service.add_status_listener(log.clone());
    let mut front = sensor("Front", SensorType::Door);
    let mut back = sensor("Back", SensorType::Door);
    service.add_sensor(&front).unwrap();
    service.add_sensor(&back).unwrap();
    service.set_arming_status(ArmingStatus::ArmedAway).unwrap();
    service
        .change_sensor_activation_status(&mut front, true)
        .unwrap();
    assert_eq!(service.alarm_status(), AlarmStatus::PendingAlarm);

    vault.break_disk();
    assert!(
        service
            .change_sensor_activation_status(&mut back, true)
            .is_err()
    );

    assert!(!back.is_active());
    let stored = service
        .sensors()
        .into_iter()
        .find(|s| s.name().as_str() == "Back")
        .expect("back registered");
    assert!(!stored.is_active());
    assert_eq!(service.alarm_status(), AlarmStatus::PendingAlarm);

    vault.restore_disk();
    service
        .change_sensor_activation_status(&mut back, true)
        .unwrap();

    assert_eq!(service.alarm_status(), AlarmStatus::Alarm);
    assert_eq!(
        log.seen(),
        vec![AlarmStatus::PendingAlarm, AlarmStatus::Alarm]
    );
    assert_eq!(vault.document()["alarm_status"], "ALARM");
}
