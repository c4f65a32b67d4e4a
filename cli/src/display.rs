//! Console rendering of security state.
//!
//! Each status keeps the panel color it has always had; color is dropped when
//! stdout is not a terminal or `NO_COLOR` is set.

use std::env;
use std::io::{IsTerminal, stdout};

use crossterm::style::{Color, Stylize};

use catpoint_types::{AlarmStatus, ArmingStatus, Sensor};

/// Refusal shown when the free sensor allowance of `max` is used up.
pub(crate) fn premium_message(max: usize) -> String {
    format!("To add more than {max} sensors, please subscribe to our Premium Membership!")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Palette {
    color: bool,
}

impl Palette {
    pub(crate) fn detect() -> Self {
        let no_color = env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
        Self {
            color: !no_color && stdout().is_terminal(),
        }
    }

    #[cfg(test)]
    pub(crate) const fn plain() -> Self {
        Self { color: false }
    }

    fn paint(self, text: &str, color: Color) -> String {
        if self.color {
            text.with(Color::Black).on(color).to_string()
        } else {
            text.to_string()
        }
    }

    pub(crate) fn alarm_line(self, status: AlarmStatus) -> String {
        format!(
            "System Status: {}",
            self.paint(status.description(), alarm_color(status))
        )
    }

    pub(crate) fn arming_line(self, status: ArmingStatus) -> String {
        format!(
            "Arming: {}",
            self.paint(status.description(), arming_color(status))
        )
    }

    pub(crate) fn cat_line(self, cat_detected: bool) -> String {
        if cat_detected {
            self.paint("DANGER - CAT DETECTED", Color::Red)
        } else {
            "Camera Feed - No Cats Detected".to_string()
        }
    }
}

const fn alarm_color(status: AlarmStatus) -> Color {
    match status {
        AlarmStatus::NoAlarm => Color::Rgb {
            r: 120,
            g: 200,
            b: 30,
        },
        AlarmStatus::PendingAlarm => Color::Rgb {
            r: 200,
            g: 150,
            b: 20,
        },
        AlarmStatus::Alarm => Color::Rgb {
            r: 250,
            g: 80,
            b: 50,
        },
    }
}

const fn arming_color(status: ArmingStatus) -> Color {
    match status {
        ArmingStatus::Disarmed => Color::Rgb {
            r: 120,
            g: 135,
            b: 180,
        },
        ArmingStatus::ArmedHome => Color::Rgb {
            r: 190,
            g: 180,
            b: 50,
        },
        ArmingStatus::ArmedAway => Color::Rgb {
            r: 170,
            g: 30,
            b: 150,
        },
    }
}

/// One line per sensor in identity order, or a placeholder when there are none.
pub(crate) fn sensor_lines<'a>(sensors: impl IntoIterator<Item = &'a Sensor>) -> Vec<String> {
    let lines: Vec<String> = sensors.into_iter().map(ToString::to_string).collect();
    if lines.is_empty() {
        vec!["No sensors.".to_string()]
    } else {
        lines
    }
}
