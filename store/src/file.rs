//! JSON-file repository.
//!
//! The whole document is rewritten on every mutation. Writes happen while the
//! state lock is held so two concurrent mutations cannot persist out of order.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use catpoint_types::{AlarmStatus, ArmingStatus, Sensor};

use crate::atomic_write::{FileSyncPolicy, atomic_write, recover_bak_file};
use crate::{SecurityRepository, SecurityState, StoreError, document};

#[derive(Debug)]
pub struct FileRepository {
    path: PathBuf,
    sync: FileSyncPolicy,
    state: Mutex<SecurityState>,
}

impl FileRepository {
    /// Load the document at `path`.
    ///
    /// Never fails: a missing or unreadable document starts from defaults
    /// (`NO_ALARM`, `DISARMED`, no sensors). Nothing is written until the first
    /// mutation.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        recover_bak_file(&path);

        let state = match fs::read_to_string(&path) {
            Ok(raw) => document::decode(&raw),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.display(), "No saved state, starting from defaults");
                SecurityState::default()
            }
            Err(e) => {
                warn!(path = %path.display(), "Failed to read saved state, using defaults: {e}");
                SecurityState::default()
            }
        };
        debug!(
            path = %path.display(),
            sensors = state.sensors.len(),
            alarm = %state.alarm_status,
            arming = %state.arming_status,
            "Loaded security state"
        );

        Self {
            path,
            sync: FileSyncPolicy::SyncAll,
            state: Mutex::new(state),
        }
    }

    /// Skip fsync on writes. Intended for tests and throwaway sessions.
    #[must_use]
    pub fn with_sync_policy(mut self, sync: FileSyncPolicy) -> Self {
        self.sync = sync;
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, SecurityState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `mutate` to a copy, persist it, then publish it under the same lock.
    ///
    /// On error the in-memory state is left exactly as it was.
    fn mutate(&self, mutate: impl FnOnce(&mut SecurityState)) -> Result<(), StoreError> {
        let mut state = self.lock();
        let mut next = state.clone();
        mutate(&mut next);
        let bytes = document::encode(&next)?;
        atomic_write(&self.path, &bytes, self.sync).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        *state = next;
        Ok(())
    }
}

impl SecurityRepository for FileRepository {
    fn sensors(&self) -> BTreeSet<Sensor> {
        self.lock().sensors.clone()
    }

    fn add_sensor(&self, sensor: &Sensor) -> Result<(), StoreError> {
        self.mutate(|state| state.add_sensor(sensor))
    }

    fn remove_sensor(&self, sensor: &Sensor) -> Result<(), StoreError> {
        self.mutate(|state| state.remove_sensor(sensor))
    }

    fn update_sensor(&self, sensor: &Sensor) -> Result<(), StoreError> {
        self.mutate(|state| state.update_sensor(sensor))
    }

    fn alarm_status(&self) -> AlarmStatus {
        self.lock().alarm_status
    }

    fn set_alarm_status(&self, status: AlarmStatus) -> Result<(), StoreError> {
        self.mutate(|state| state.alarm_status = status)
    }

    fn arming_status(&self) -> ArmingStatus {
        self.lock().arming_status
    }

    fn set_arming_status(&self, status: ArmingStatus) -> Result<(), StoreError> {
        self.mutate(|state| state.arming_status = status)
    }
}
