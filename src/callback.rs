//! Vendor callback plumbing
//!
//! The library invokes hooks from its own polling thread and passes no user
//! pointer, so every hook kind owns a process-global [`EventSlot`] holding the
//! sender of the one active watcher.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::{PspError, Result};

pub struct EventSlot<T> {
    tx: Mutex<Option<Sender<T>>>,
}

impl<T> Default for EventSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> EventSlot<T> {
    pub const fn new() -> Self {
        Self { tx: Mutex::new(None) }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Sender<T>>> {
        self.tx.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claim the slot; only one watcher may be hooked at a time
    pub fn subscribe(&self) -> Result<Receiver<T>> {
        let mut tx = self.lock();
        if tx.is_some() {
            return Err(PspError::BusyInUses("another watcher is already hooked".into()));
        }
        let (sender, receiver) = mpsc::channel();
        *tx = Some(sender);
        Ok(receiver)
    }

    /// Called from the vendor thread; events without a watcher are dropped
    pub fn publish(&self, event: T) {
        if let Some(tx) = self.lock().as_ref() {
            if tx.send(event).is_err() {
                debug!("event dropped, watcher is gone");
            }
        }
    }

    pub fn release(&self) {
        self.lock().take();
    }

    pub fn is_hooked(&self) -> bool {
        self.lock().is_some()
    }
}

/// Hand events to `on_event` until `duration` has elapsed
pub fn pump<T>(rx: &Receiver<T>, duration: Duration, mut on_event: impl FnMut(T)) {
    let deadline = Instant::now() + duration;
    loop {
        let left = deadline.saturating_duration_since(Instant::now());
        match rx.recv_timeout(left) {
            Ok(event) => on_event(event),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}

/// Subscribe, hook, pump for `duration`, unhook and release the slot.
///
/// The slot is released on every path; a failed hook skips the unhook.
pub fn watch<T>(
    slot: &EventSlot<T>,
    duration: Duration,
    hook: impl FnOnce() -> Result<()>,
    unhook: impl FnOnce() -> Result<()>,
    on_event: impl FnMut(T),
) -> Result<()> {
    let rx = slot.subscribe()?;
    let result = hook().map(|()| pump(&rx, duration, on_event));
    let unhooked = match &result {
        Ok(()) => unhook(),
        Err(e) => {
            warn!("hook failed: {}", e);
            Ok(())
        }
    };
    slot.release();
    result.and(unhooked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_single_watcher() {
        let slot: EventSlot<u8> = EventSlot::new();
        let _rx = slot.subscribe().unwrap();
        assert!(matches!(slot.subscribe(), Err(PspError::BusyInUses(_))));
        slot.release();
        assert!(!slot.is_hooked());
        assert!(slot.subscribe().is_ok());
    }

    #[test]
    fn test_publish_without_watcher_is_dropped() {
        let slot: EventSlot<u8> = EventSlot::new();
        slot.publish(1);
        let rx = slot.subscribe().unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_watch_delivers_from_other_thread() {
        let slot = Arc::new(EventSlot::<u32>::new());
        let mut seen = Vec::new();
        let publisher = Arc::clone(&slot);
        watch(
            &slot,
            Duration::from_millis(200),
            || {
                thread::spawn(move || {
                    for i in 0..3 {
                        publisher.publish(i);
                    }
                });
                Ok(())
            },
            || Ok(()),
            |e| seen.push(e),
        )
        .unwrap();
        assert_eq!(seen, vec![0, 1, 2]);
        assert!(!slot.is_hooked());
    }

    #[test]
    fn test_failed_hook_releases_slot() {
        let slot: EventSlot<u8> = EventSlot::new();
        let mut unhooked = false;
        let err = watch(
            &slot,
            Duration::from_millis(10),
            || Err(PspError::not_support("no hook")),
            || {
                unhooked = true;
                Ok(())
            },
            |_| {},
        )
        .unwrap_err();
        assert!(err.is_not_support());
        assert!(!unhooked);
        assert!(!slot.is_hooked());
    }
}
