//! Command execution against a persisted security service.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use catpoint_config::CatpointSettings;
use catpoint_core::SecurityService;
use catpoint_store::FileRepository;
use catpoint_types::{ArmingStatus, Sensor, SensorType};
use catpoint_vision::{FakeImageClassifier, Image};

use crate::display::{Palette, premium_message, sensor_lines};
use crate::listener::ConsoleListener;

/// Commands shared by one-shot invocations and the interactive shell.
#[derive(Debug, Subcommand)]
pub(crate) enum Action {
    /// Show arming status, alarm status and sensors
    Status,
    /// Set the arming status
    Arm {
        /// disarmed, home or away
        #[arg(value_parser = ArmingStatus::parse)]
        status: ArmingStatus,
    },
    /// Manage sensors
    Sensor {
        #[command(subcommand)]
        op: SensorOp,
    },
    /// Classify a camera image
    Scan {
        image: PathBuf,
    },
}

#[derive(Debug, Subcommand)]
pub(crate) enum SensorOp {
    /// Register a new sensor
    Add(SensorArgs),
    /// Remove a sensor
    Remove(SensorArgs),
    /// Mark a sensor as triggered
    Activate(SensorArgs),
    /// Mark a sensor as idle
    Deactivate(SensorArgs),
}

#[derive(Debug, clap::Args)]
pub(crate) struct SensorArgs {
    name: String,
    /// door, window or motion
    #[arg(value_parser = SensorType::parse)]
    kind: SensorType,
}

impl SensorArgs {
    fn sensor(&self) -> Result<Sensor> {
        Sensor::try_new(self.name.clone(), self.kind).context("invalid sensor")
    }
}

#[derive(Debug, Parser)]
#[command(no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Debug, Subcommand)]
enum ShellCommand {
    #[command(flatten)]
    Action(Action),
    /// Leave the shell
    #[command(alias = "exit")]
    Quit,
}

pub(crate) struct Session {
    service: SecurityService,
    max_sensors: usize,
    palette: Palette,
}

impl Session {
    pub(crate) fn open(settings: &CatpointSettings, palette: Palette) -> Self {
        let repository = Arc::new(FileRepository::open(&settings.store.path));
        let classifier = match settings.classifier.fixed_answer() {
            Some(cat) => FakeImageClassifier::new().with_deterministic_result(cat),
            None => FakeImageClassifier::new(),
        };
        let service = SecurityService::new(repository, Arc::new(classifier));
        service.add_status_listener(Arc::new(ConsoleListener::new(palette)));

        tracing::info!(
            state = %settings.store.path.display(),
            classifier = %settings.classifier,
            "Session opened"
        );

        Self {
            service,
            max_sensors: settings.sensors.max,
            palette,
        }
    }

    pub(crate) fn run(&self, action: Action) -> Result<()> {
        match action {
            Action::Status => {
                self.print_status();
                Ok(())
            }
            Action::Arm { status } => self
                .service
                .set_arming_status(status)
                .context("failed to change arming status"),
            Action::Sensor { op } => self.run_sensor(op),
            Action::Scan { image } => self.scan(&image),
        }
    }

    fn run_sensor(&self, op: SensorOp) -> Result<()> {
        match op {
            SensorOp::Add(args) => {
                let sensor = args.sensor()?;
                if self.service.sensors().len() >= self.max_sensors {
                    bail!(premium_message(self.max_sensors));
                }
                self.service
                    .add_sensor(&sensor)
                    .context("failed to add sensor")?;
                println!("Added {sensor}");
            }
            SensorOp::Remove(args) => {
                let sensor = self.registered(&args)?;
                self.service
                    .remove_sensor(&sensor)
                    .context("failed to remove sensor")?;
                println!("Removed {}({})", sensor.name(), sensor.sensor_type());
            }
            SensorOp::Activate(args) => self.set_active(&args, true)?,
            SensorOp::Deactivate(args) => self.set_active(&args, false)?,
        }
        Ok(())
    }

    fn set_active(&self, args: &SensorArgs, active: bool) -> Result<()> {
        let mut sensor = self.registered(args)?;
        self.service
            .change_sensor_activation_status(&mut sensor, active)
            .context("failed to change sensor activation")?;
        println!("{sensor}");
        Ok(())
    }

    /// The stored copy of the sensor `args` names, carrying its current flag.
    fn registered(&self, args: &SensorArgs) -> Result<Sensor> {
        let wanted = args.sensor()?;
        self.service
            .sensors()
            .into_iter()
            .find(|sensor| *sensor == wanted)
            .with_context(|| format!("no sensor {}({})", args.name, args.kind))
    }

    fn scan(&self, path: &Path) -> Result<()> {
        let image = Image::open(path)
            .with_context(|| format!("invalid image selected: {}", path.display()))?;
        if image.is_empty() {
            bail!("invalid image selected: {} is empty", path.display());
        }
        self.service
            .process_image(Some(&image))
            .context("failed to record scan result")
    }

    fn print_status(&self) {
        println!("{}", self.palette.arming_line(self.service.arming_status()));
        println!("{}", self.palette.alarm_line(self.service.alarm_status()));
        for line in sensor_lines(&self.service.sensors()) {
            println!("  {line}");
        }
    }

    /// Read commands from `input` until EOF or `quit`.
    ///
    /// The cat-detected flag lives only as long as this session, so a scan
    /// followed by `arm home` behaves as it would on a running panel.
    pub(crate) fn shell(&self, input: impl BufRead) -> Result<()> {
        let mut stdout = io::stdout();
        prompt(&mut stdout)?;
        for line in input.lines() {
            let line = line.context("failed to read command")?;
            let words = split_words(&line).unwrap_or_else(|err| {
                eprintln!("Error: {err}");
                Vec::new()
            });
            if !words.is_empty() {
                match ShellLine::try_parse_from(words) {
                    Ok(ShellLine {
                        command: ShellCommand::Quit,
                    }) => return Ok(()),
                    Ok(ShellLine {
                        command: ShellCommand::Action(action),
                    }) => {
                        if let Err(err) = self.run(action) {
                            eprintln!("Error: {err:#}");
                        }
                    }
                    Err(err) => eprintln!("{err}"),
                }
            }
            prompt(&mut stdout)?;
        }
        Ok(())
    }
}

/// Split a shell line into words. Single or double quotes group a word that
/// contains spaces; there are no escapes.
fn split_words(line: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut word = String::new();
    let mut in_word = false;
    let mut quote = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => word.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut word));
                    in_word = false;
                }
            }
            None => {
                word.push(c);
                in_word = true;
            }
        }
    }

    if let Some(q) = quote {
        bail!("unterminated {q} quote");
    }
    if in_word {
        words.push(word);
    }
    Ok(words)
}

fn prompt(out: &mut impl Write) -> Result<()> {
    write!(out, "catpoint> ")?;
    out.flush()?;
    Ok(())
}
