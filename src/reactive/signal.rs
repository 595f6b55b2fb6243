use std::sync::{Arc, RwLock};

use super::runtime::{self, SignalId};

#[derive(Debug)]
struct SignalInner<T> {
    id: SignalId,
    value: RwLock<T>,
}

/// A reactive value with change notification.
///
/// Signals carry the controller's published state. Writing a signal re-runs
/// every effect that read it (on the thread that owns the reactive graph);
/// writes that compare equal to the current value are dropped, so repeated
/// recomputations that land on the same scrollbar state produce no downstream
/// work. Reads always observe the most recent published snapshot
/// (last-write-wins).
pub struct Signal<T> {
    inner: Arc<SignalInner<T>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Signal<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(SignalInner {
                id: runtime::register_signal(),
                value: RwLock::new(value),
            }),
        }
    }

    /// Splits into independent read and write halves.
    pub fn split(self) -> (ReadSignal<T>, WriteSignal<T>) {
        (
            ReadSignal {
                inner: self.inner.clone(),
            },
            WriteSignal { inner: self.inner },
        )
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        runtime::track_read(self.inner.id);
        f(&self.inner.value.read().expect("signal lock poisoned"))
    }

    pub fn with_untracked<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.read().expect("signal lock poisoned"))
    }
}

impl<T: Clone> Signal<T> {
    pub fn get(&self) -> T {
        runtime::track_read(self.inner.id);
        self.get_untracked()
    }

    /// Reads without registering the running effect as a subscriber.
    pub fn get_untracked(&self) -> T {
        self.inner
            .value
            .read()
            .expect("signal lock poisoned")
            .clone()
    }
}

impl<T: PartialEq> Signal<T> {
    /// Writes the value, notifying subscribers only if it actually changed.
    pub fn set(&self, value: T) {
        let Ok(mut guard) = self.inner.value.write() else {
            return;
        };
        if *guard != value {
            *guard = value;
            drop(guard);
            runtime::notify_write(self.inner.id);
        }
    }
}

impl<T: PartialEq + Clone> Signal<T> {
    /// In-place update, notifying subscribers only on an actual change.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let Ok(mut guard) = self.inner.value.write() else {
            return;
        };
        let before = guard.clone();
        f(&mut *guard);
        if *guard != before {
            drop(guard);
            runtime::notify_write(self.inner.id);
        }
    }
}

/// Read half of a split signal.
#[derive(Debug)]
pub struct ReadSignal<T> {
    inner: Arc<SignalInner<T>>,
}

impl<T> Clone for ReadSignal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone> ReadSignal<T> {
    pub fn get(&self) -> T {
        runtime::track_read(self.inner.id);
        self.get_untracked()
    }

    pub fn get_untracked(&self) -> T {
        self.inner
            .value
            .read()
            .expect("signal lock poisoned")
            .clone()
    }
}

/// Write half of a split signal.
pub struct WriteSignal<T> {
    inner: Arc<SignalInner<T>>,
}

impl<T> Clone for WriteSignal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: PartialEq> WriteSignal<T> {
    pub fn set(&self, value: T) {
        let Ok(mut guard) = self.inner.value.write() else {
            return;
        };
        if *guard != value {
            *guard = value;
            drop(guard);
            runtime::notify_write(self.inner.id);
        }
    }
}

pub fn create_signal<T>(value: T) -> Signal<T> {
    Signal::new(value)
}
