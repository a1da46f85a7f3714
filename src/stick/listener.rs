//! Single-slot value listener registry
//!
//! One handler per controller, installed with [`ListenerSlot::register`] and
//! removed with [`ListenerSlot::unregister`]. Registering over an installed
//! handler is an error rather than a silent replacement.

use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

use super::command::PolarCommand;
use crate::error::{StickError, StickResult};

/// Value listener callback
///
/// Receives every emitted command. Must be Send + Sync: the runtime invokes
/// it from its own task.
pub type ValueListener = Arc<dyn Fn(PolarCommand) + Send + Sync>;

/// Shared slot holding at most one listener
#[derive(Clone, Default)]
pub struct ListenerSlot {
    inner: Arc<Mutex<Option<ValueListener>>>,
}

impl ListenerSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `listener`, failing if one is already present
    pub fn register(&self, listener: ValueListener) -> StickResult<()> {
        let mut slot = self.inner.lock();
        if slot.is_some() {
            return Err(StickError::ListenerAlreadyRegistered);
        }
        *slot = Some(listener);
        debug!("Value listener registered");
        Ok(())
    }

    /// Remove the installed listener; returns whether one was present
    pub fn unregister(&self) -> bool {
        let removed = self.inner.lock().take().is_some();
        if removed {
            debug!("Value listener unregistered");
        }
        removed
    }

    pub fn is_registered(&self) -> bool {
        self.inner.lock().is_some()
    }

    /// Deliver `command` to the listener, if any
    ///
    /// The listener is cloned out before the call so it may re-enter the
    /// slot (e.g. unregister itself) without deadlocking.
    pub fn notify(&self, command: PolarCommand) -> bool {
        let listener = self.inner.lock().clone();
        match listener {
            Some(listener) => {
                listener(command);
                true
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for ListenerSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerSlot")
            .field("registered", &self.is_registered())
            .finish()
    }
}
