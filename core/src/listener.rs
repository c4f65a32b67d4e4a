//! Status listeners and their registry.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock};

use catpoint_types::AlarmStatus;

/// Observer of security state changes.
///
/// Callbacks run synchronously on the thread that caused the change. They may
/// register or unregister listeners (including themselves) without deadlocking.
pub trait StatusListener: Send + Sync {
    /// The alarm status was persisted with a new value.
    fn on_alarm_status_changed(&self, status: AlarmStatus);

    /// An image was classified; `cat_detected` is the result.
    fn on_cat_detected(&self, cat_detected: bool);

    /// The sensor list changed.
    ///
    /// Part of the listener contract for observers that track the sensor
    /// list; the security service does not currently emit it.
    fn on_sensor_list_changed(&self) {}
}

/// Set of listeners keyed by `Arc` identity.
#[derive(Default)]
pub(crate) struct ListenerRegistry {
    listeners: RwLock<Vec<Arc<dyn StatusListener>>>,
}

fn same_listener(a: &Arc<dyn StatusListener>, b: &Arc<dyn StatusListener>) -> bool {
    // Compare data pointers only; vtable pointers for the same type can differ
    // between codegen units.
    std::ptr::eq(Arc::as_ptr(a).cast::<()>(), Arc::as_ptr(b).cast::<()>())
}

impl ListenerRegistry {
    /// Returns `false` if `listener` was already registered.
    pub(crate) fn add(&self, listener: Arc<dyn StatusListener>) -> bool {
        let mut listeners = self
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if listeners.iter().any(|existing| same_listener(existing, &listener)) {
            return false;
        }
        listeners.push(listener);
        true
    }

    /// Returns `false` if `listener` was not registered.
    pub(crate) fn remove(&self, listener: &Arc<dyn StatusListener>) -> bool {
        let mut listeners = self
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|existing| !same_listener(existing, listener));
        listeners.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub(crate) fn alarm_status_changed(&self, status: AlarmStatus) {
        self.for_each("alarm_status_changed", |listener| {
            listener.on_alarm_status_changed(status);
        });
    }

    pub(crate) fn cat_detected(&self, cat_detected: bool) {
        self.for_each("cat_detected", |listener| {
            listener.on_cat_detected(cat_detected);
        });
    }

    /// Deliver to a snapshot of the registry so callbacks can mutate it.
    ///
    /// A panicking listener is logged and skipped; the rest still receive the event.
    fn for_each(&self, event: &'static str, deliver: impl Fn(&dyn StatusListener)) {
        let snapshot: Vec<Arc<dyn StatusListener>> = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        for listener in &snapshot {
            let delivered = panic::catch_unwind(AssertUnwindSafe(|| deliver(listener.as_ref())));
            if delivered.is_err() {
                tracing::warn!(event, "Status listener panicked; continuing with remaining listeners");
            }
        }
    }
}
