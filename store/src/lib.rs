//! Durable state for Catpoint.
//!
//! The repository is the sole owner of persisted state: the sensor set, the
//! alarm status and the arming status. The core state machine reads and writes
//! through the [`SecurityRepository`] trait and never sees the backing store.
//!
//! # Architecture
//!
//! ```text
//! SecurityRepository (trait, &self + internal locking)
//! ├── MemoryRepository  Mutex<SecurityState>, no IO
//! └── FileRepository    Mutex<SecurityState> + JSON document
//!                       └── atomic_write (temp + rename)
//! ```
//!
//! Loading never fails: a missing document yields defaults, and malformed
//! fields fall back to their defaults individually with a warning.

mod atomic_write;
mod document;
mod file;
mod memory;
mod state;

pub use atomic_write::{FileSyncPolicy, atomic_write, recover_bak_file};
pub use file::FileRepository;
pub use memory::MemoryRepository;
pub use state::SecurityState;

use std::collections::BTreeSet;
use std::path::PathBuf;

use catpoint_types::{AlarmStatus, ArmingStatus, Sensor};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to write state to {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode state: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Store of sensors, alarm status and arming status.
///
/// Implementations synchronize internally; every method takes `&self` so one
/// repository can be shared between threads behind an `Arc`.
///
/// A mutation becomes visible only once it is durable: a returned error means
/// nothing changed, in memory or on disk.
pub trait SecurityRepository: Send + Sync {
    /// Snapshot of the sensor set, ordered by identity.
    fn sensors(&self) -> BTreeSet<Sensor>;

    /// Insert `sensor`. Adding a sensor that is already a member is a no-op.
    fn add_sensor(&self, sensor: &Sensor) -> Result<(), StoreError>;

    /// Remove the member with the same identity. Removing a non-member is a no-op.
    fn remove_sensor(&self, sensor: &Sensor) -> Result<(), StoreError>;

    /// Replace the member with the same identity (inserting it if absent).
    fn update_sensor(&self, sensor: &Sensor) -> Result<(), StoreError>;

    fn alarm_status(&self) -> AlarmStatus;

    fn set_alarm_status(&self, status: AlarmStatus) -> Result<(), StoreError>;

    fn arming_status(&self) -> ArmingStatus;

    fn set_arming_status(&self, status: ArmingStatus) -> Result<(), StoreError>;
}
