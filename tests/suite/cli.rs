//! End-to-end runs of the `catpoint` binary.

use std::fs;

use crate::common::{Workspace, stderr, stdout};

#[test]
fn fresh_status_shows_defaults() {
    let ws = Workspace::new();

    let out = ws.run(&["status"]);

    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let text = stdout(&out);
    assert!(text.contains("Arming: Disarmed"));
    assert!(text.contains("System Status: Cool and Good"));
    assert!(text.contains("No sensors."));
    assert!(!ws.state_path().exists());
}

#[test]
fn sensors_are_listed_sorted_with_state() {
    let ws = Workspace::new();
    assert!(ws.run(&["sensor", "add", "Window", "window"]).status.success());
    assert!(ws.run(&["sensor", "add", "Door", "DOOR"]).status.success());
    assert!(ws.run(&["sensor", "activate", "Door", "door"]).status.success());

    let text = stdout(&ws.run(&["status"]));

    let door = text.find("Door(DOOR): Active").expect("door listed");
    let window = text.find("Window(WINDOW): Inactive").expect("window listed");
    assert!(door < window);
}

#[test]
fn fifth_sensor_requires_premium() {
    let ws = Workspace::new();
    for name in ["A", "B", "C", "D"] {
        let out = ws.run(&["sensor", "add", name, "motion"]);
        assert!(out.status.success(), "stderr: {}", stderr(&out));
    }

    let out = ws.run(&["sensor", "add", "E", "motion"]);

    assert!(!out.status.success());
    assert!(stderr(&out).contains("Premium Membership"));
    let doc = ws.document();
    assert_eq!(doc["sensors"].as_array().map(Vec::len), Some(4));
}

#[test]
fn premium_message_follows_configured_limit() {
    let ws = Workspace::new();
    let config = ws.root().join("config.toml");
    fs::write(&config, "[sensors]\nmax = 2\n").unwrap();
    let add = |name: &str| {
        ws.catpoint()
            .env("CATPOINT_CONFIG", &config)
            .args(["sensor", "add", name, "door"])
            .output()
            .expect("run catpoint")
    };
    assert!(add("A").status.success());
    assert!(add("B").status.success());

    let out = add("C");

    assert!(!out.status.success());
    assert!(stderr(&out).contains("To add more than 2 sensors"));
    assert_eq!(ws.document()["sensors"].as_array().map(Vec::len), Some(2));
}

#[test]
fn armed_trip_prints_pending_then_alarm() {
    let ws = Workspace::new();
    assert!(ws.run(&["sensor", "add", "Front", "door"]).status.success());
    assert!(ws.run(&["sensor", "add", "Back", "door"]).status.success());
    assert!(ws.run(&["arm", "away"]).status.success());

    let first = ws.run(&["sensor", "activate", "Front", "door"]);
    assert!(stdout(&first).contains("System Status: I'm in Danger..."));

    let second = ws.run(&["sensor", "activate", "Back", "door"]);
    assert!(stdout(&second).contains("System Status: Awooga!"));

    let out = ws.run(&["arm", "disarmed"]);
    assert!(stdout(&out).contains("System Status: Cool and Good"));
    assert_eq!(ws.document()["arming_status"], "DISARMED");
}

#[test]
fn unknown_sensor_is_reported() {
    let ws = Workspace::new();

    let out = ws.run(&["sensor", "activate", "Ghost", "motion"]);

    assert!(!out.status.success());
    assert!(stderr(&out).contains("no sensor Ghost(MOTION)"));
}

#[test]
fn invalid_arming_status_is_rejected() {
    let ws = Workspace::new();

    let out = ws.run(&["arm", "vacation"]);

    assert!(!out.status.success());
    assert!(stderr(&out).contains("vacation"));
    assert!(!ws.state_path().exists());
}

#[test]
fn scan_reports_classification() {
    let ws = Workspace::new();
    let image = ws.image("frame.png");
    let image = image.to_str().expect("utf-8 temp path");

    let cat = ws.run(&["--classifier", "cat", "scan", image]);
    assert!(stdout(&cat).contains("DANGER - CAT DETECTED"));

    let none = ws.run(&["--classifier", "no-cat", "scan", image]);
    assert!(stdout(&none).contains("Camera Feed - No Cats Detected"));
}

#[test]
fn scan_of_missing_file_fails() {
    let ws = Workspace::new();

    let out = ws.run(&["scan", "does-not-exist.png"]);

    assert!(!out.status.success());
    assert!(stderr(&out).contains("invalid image selected"));
}

#[test]
fn scan_of_empty_file_fails() {
    let ws = Workspace::new();
    let empty = ws.root().join("blank.png");
    fs::write(&empty, b"").unwrap();
    let empty = empty.to_str().expect("utf-8 temp path");

    let out = ws.run(&["--classifier", "cat", "scan", empty]);

    assert!(!out.status.success());
    assert!(stderr(&out).contains("is empty"));
    assert!(!stdout(&out).contains("DANGER - CAT DETECTED"));
}

#[test]
fn shell_keeps_cat_flag_between_commands() {
    let ws = Workspace::new();
    let image = ws.image("cat.png");
    let script = format!("scan {}\narm home\nstatus\nquit\n", image.display());

    let out = ws.run_shell(&["--classifier", "cat"], &script);

    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let text = stdout(&out);
    assert!(text.contains("DANGER - CAT DETECTED"));
    assert!(text.contains("System Status: Awooga!"));
    assert_eq!(ws.document()["alarm_status"], "ALARM");
}

#[test]
fn shell_survives_bad_commands() {
    let ws = Workspace::new();

    let out = ws.run_shell(&[], "frobnicate\nsensor add Hall motion\nexit\n");

    assert!(out.status.success());
    assert!(stdout(&out).contains("Added Hall(MOTION): Inactive"));
    assert!(!stderr(&out).is_empty());
}

#[test]
fn shell_addresses_names_with_spaces() {
    let ws = Workspace::new();
    let script = "sensor add \"Front Door\" door\n\
                  arm away\n\
                  sensor activate 'Front Door' door\n\
                  sensor add \"Broken motion\n\
                  quit\n";

    let out = ws.run_shell(&[], script);

    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let text = stdout(&out);
    assert!(text.contains("Added Front Door(DOOR): Inactive"));
    assert!(text.contains("Front Door(DOOR): Active"));
    assert!(text.contains("System Status: I'm in Danger..."));
    assert!(stderr(&out).contains("unterminated"));
    assert_eq!(ws.document()["sensors"][0]["name"], "Front Door");
}

#[test]
fn logs_go_to_home_not_stdout() {
    let ws = Workspace::new();

    let out = ws.run(&["status"]);

    assert!(!stdout(&out).contains("Logging initialized"));
    let log = ws.home().join(".catpoint").join("logs").join("catpoint.log");
    assert!(log.exists());
}
