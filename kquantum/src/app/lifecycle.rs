//! Lifecycle of the activity-retained scope

use crate::{error::{DiError, Error}, scopes::ACTIVITY_RETAINED};
use kquantum_di::ContainerBuilder;
use std::{
    fmt,
    mem,
    sync::{Mutex, MutexGuard, PoisonError},
};

type OnClearedListener = Box<dyn FnOnce() + Send>;

#[derive(Default)]
struct Listeners {
    cleared: bool,
    pending: Vec<OnClearedListener>,
}

/// Notifies listeners when an [`ACTIVITY_RETAINED`] scope is cleared,
/// after the view models it holds were released.
#[derive(Default)]
pub struct ActivityRetainedLifecycle {
    listeners: Mutex<Listeners>,
}

impl fmt::Debug for ActivityRetainedLifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners = self.lock();
        f.debug_struct("ActivityRetainedLifecycle")
            .field("cleared", &listeners.cleared)
            .field("listeners", &listeners.pending.len())
            .finish()
    }
}

impl ActivityRetainedLifecycle {
    /// Registers a listener run once when the scope is cleared.
    ///
    /// Fails with a `ScopeClosed` error if the scope was already cleared.
    pub fn add_on_cleared_listener<F>(&self, listener: F) -> Result<(), Error>
    where
        F: FnOnce() + Send + 'static
    {
        let mut listeners = self.lock();
        if listeners.cleared {
            return Err(DiError::ScopeClosed(ACTIVITY_RETAINED).into());
        }
        listeners.pending.push(Box::new(listener));
        Ok(())
    }

    /// Returns `true` once the scope was cleared
    pub fn is_cleared(&self) -> bool {
        self.lock().cleared
    }

    /// Runs the listeners in registration order
    pub(crate) fn dispatch_on_cleared(&self) {
        let pending = {
            let mut listeners = self.lock();
            listeners.cleared = true;
            mem::take(&mut listeners.pending)
        };

        tracing::debug!(listeners = pending.len(), "activity retained scope cleared");
        for listener in pending {
            listener();
        }
    }

    fn lock(&self) -> MutexGuard<'_, Listeners> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub(crate) fn register(builder: &mut ContainerBuilder) {
    builder
        .register_scoped_default::<ActivityRetainedLifecycle>(ACTIVITY_RETAINED)
        .on_dispose(ActivityRetainedLifecycle::dispatch_on_cleared);
}
