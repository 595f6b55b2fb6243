use std::cell::RefCell;
use std::collections::HashSet;

thread_local! {
    static RUNTIME: RefCell<Runtime> = RefCell::new(Runtime::default());
}

pub type SignalId = usize;
pub type EffectId = usize;

/// Thread-local dependency graph linking signals to the effects that read them.
///
/// The controller publishes scrollbar state through signals; consumers observe
/// it through effects and memos. Everything runs on the event-loop thread, so
/// the graph lives in a thread local. Signal values written from another
/// thread still land (the value storage is shared), but effect notification is
/// skipped there; the owning thread observes the new value on its next read.
#[derive(Default)]
struct Runtime {
    /// Effects currently executing, innermost last. Reads are attributed to
    /// the top of the stack.
    effect_stack: Vec<EffectId>,
    /// Effects whose dependencies changed and that still need a re-run.
    dirty: HashSet<EffectId>,
    callbacks: Vec<Option<Box<dyn FnMut()>>>,
    alive: Vec<bool>,
    /// Per-effect set of signals read during its last run.
    reads: Vec<HashSet<SignalId>>,
    /// Per-signal set of effects subscribed to it.
    subscribers: Vec<HashSet<EffectId>>,
    next_signal: SignalId,
    batch_depth: usize,
    flushing: bool,
}

impl Runtime {
    fn register_signal(&mut self) -> SignalId {
        let id = self.next_signal;
        self.next_signal += 1;
        self.subscribers.push(HashSet::new());
        id
    }

    fn register_effect(&mut self, callback: Box<dyn FnMut()>) -> EffectId {
        let id = self.callbacks.len();
        self.callbacks.push(Some(callback));
        self.alive.push(true);
        self.reads.push(HashSet::new());
        id
    }

    fn track_read(&mut self, signal: SignalId) {
        // A signal allocated by another thread's graph is out of range here.
        if signal >= self.subscribers.len() {
            return;
        }
        if let Some(&effect) = self.effect_stack.last() {
            self.subscribers[signal].insert(effect);
            self.reads[effect].insert(signal);
        }
    }

    /// Marks the signal's subscribers dirty. Returns whether the caller
    /// should flush now (it must not while a flush or batch is in progress).
    fn mark_dirty(&mut self, signal: SignalId) -> bool {
        if signal >= self.subscribers.len() {
            return false;
        }
        let subscribed: Vec<EffectId> = self.subscribers[signal].iter().copied().collect();
        self.dirty.extend(subscribed);
        !self.dirty.is_empty() && self.batch_depth == 0 && !self.flushing
    }

    fn next_dirty(&mut self) -> Option<EffectId> {
        let id = self.dirty.iter().copied().next()?;
        self.dirty.remove(&id);
        Some(id)
    }

    /// Takes the effect's callback out of the graph so it can run without the
    /// runtime borrowed, clearing its previous subscriptions first.
    fn begin_effect(&mut self, effect: EffectId) -> Option<Box<dyn FnMut()>> {
        if !self.alive.get(effect).copied().unwrap_or(false) {
            return None;
        }
        let callback = self.callbacks[effect].take()?;
        let previous = std::mem::take(&mut self.reads[effect]);
        for signal in previous {
            self.subscribers[signal].remove(&effect);
        }
        self.effect_stack.push(effect);
        Some(callback)
    }

    fn finish_effect(&mut self, effect: EffectId, callback: Box<dyn FnMut()>) {
        self.effect_stack.pop();
        // The effect may have been disposed from inside its own run.
        if self.alive.get(effect).copied().unwrap_or(false) {
            self.callbacks[effect] = Some(callback);
        }
    }

    fn dispose_effect(&mut self, effect: EffectId) {
        if effect >= self.alive.len() {
            return;
        }
        self.alive[effect] = false;
        self.callbacks[effect] = None;
        let reads = std::mem::take(&mut self.reads[effect]);
        for signal in reads {
            self.subscribers[signal].remove(&effect);
        }
        self.dirty.remove(&effect);
    }
}

fn with_runtime<R>(f: impl FnOnce(&mut Runtime) -> R) -> R {
    RUNTIME.with(|rt| f(&mut rt.borrow_mut()))
}

/// Runtime access that tolerates being called off the owning thread or while
/// the graph is already borrowed; returns `None` in those cases.
fn try_with_runtime<R>(f: impl FnOnce(&mut Runtime) -> R) -> Option<R> {
    RUNTIME.with(|rt| match rt.try_borrow_mut() {
        Ok(mut runtime) => Some(f(&mut runtime)),
        Err(_) => None,
    })
}

pub(crate) fn register_signal() -> SignalId {
    with_runtime(Runtime::register_signal)
}

pub(crate) fn register_effect(callback: Box<dyn FnMut()>) -> EffectId {
    with_runtime(|rt| rt.register_effect(callback))
}

pub(crate) fn track_read(signal: SignalId) {
    let _ = try_with_runtime(|rt| rt.track_read(signal));
}

pub(crate) fn notify_write(signal: SignalId) {
    if try_with_runtime(|rt| rt.mark_dirty(signal)) == Some(true) {
        flush();
    }
}

/// Runs one effect. The callback executes with the runtime unborrowed, so it
/// may freely read and write signals; nested writes are queued and drained by
/// the flush loop that called us.
pub(crate) fn run_effect(effect: EffectId) {
    let Some(mut callback) = with_runtime(|rt| rt.begin_effect(effect)) else {
        return;
    };
    callback();
    with_runtime(|rt| rt.finish_effect(effect, callback));
}

fn flush() {
    with_runtime(|rt| rt.flushing = true);
    while let Some(effect) = with_runtime(Runtime::next_dirty) {
        run_effect(effect);
    }
    with_runtime(|rt| rt.flushing = false);
}

pub(crate) fn dispose_effect(effect: EffectId) {
    let _ = try_with_runtime(|rt| rt.dispose_effect(effect));
}

/// Groups several signal writes into a single notification pass: effects run
/// once after the closure returns, not once per write.
pub fn batch<R>(f: impl FnOnce() -> R) -> R {
    with_runtime(|rt| rt.batch_depth += 1);
    let out = f();
    let flush_now = with_runtime(|rt| {
        rt.batch_depth -= 1;
        rt.batch_depth == 0 && !rt.flushing && !rt.dirty.is_empty()
    });
    if flush_now {
        flush();
    }
    out
}
