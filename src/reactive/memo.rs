use std::sync::Arc;

use super::effect::{create_effect, Effect};
use super::signal::{create_signal, Signal};

/// An eagerly derived read-only value.
///
/// Recomputes whenever a dependency signal changes, but only notifies its own
/// subscribers when the derived result actually differs (`PartialEq`). The
/// controller's public projections (style block, per-axis display flags) are
/// memos over the state signal, so a recomputation that changes `display_y`
/// without touching the style block wakes only the consumers watching
/// `display_y`.
pub struct Memo<T: 'static> {
    signal: Signal<T>,
    // Keeps the driving effect subscribed for as long as any clone lives.
    _effect: Arc<Effect>,
}

impl<T> Clone for Memo<T> {
    fn clone(&self) -> Self {
        Self {
            signal: self.signal.clone(),
            _effect: self._effect.clone(),
        }
    }
}

impl<T: Clone + PartialEq + 'static> Memo<T> {
    /// Current derived value (tracked: effects reading this subscribe to it).
    pub fn get(&self) -> T {
        self.signal.get()
    }

    pub fn get_untracked(&self) -> T {
        self.signal.get_untracked()
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.signal.with(f)
    }
}

pub fn create_memo<T, F>(f: F) -> Memo<T>
where
    T: Clone + PartialEq + 'static,
    F: Fn() -> T + 'static,
{
    let signal = create_signal(f());
    let effect = {
        let signal = signal.clone();
        // Establishes dependencies immediately; Signal::set drops writes that
        // compare equal, so no-op recomputations stay invisible downstream.
        create_effect(move || signal.set(f()))
    };
    Memo {
        signal,
        _effect: Arc::new(effect),
    }
}
