use catpoint_core::StatusListener;
use catpoint_types::AlarmStatus;

use crate::display::Palette;

/// Prints every alarm change and classification result to stdout.
pub(crate) struct ConsoleListener {
    palette: Palette,
}

impl ConsoleListener {
    pub(crate) fn new(palette: Palette) -> Self {
        Self { palette }
    }
}

impl StatusListener for ConsoleListener {
    fn on_alarm_status_changed(&self, status: AlarmStatus) {
        println!("{}", self.palette.alarm_line(status));
    }

    fn on_cat_detected(&self, cat_detected: bool) {
        println!("{}", self.palette.cat_line(cat_detected));
    }
}
