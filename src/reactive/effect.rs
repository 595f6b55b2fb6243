use super::runtime::{self, EffectId};

/// A subscription that re-runs a callback whenever a signal it reads changes.
///
/// The effect runs once on creation to establish its dependencies. Dropping
/// the handle revokes the subscription; revocation is idempotent and safe at
/// any point, including while other effects are mid-flush.
pub struct Effect {
    id: EffectId,
}

impl Effect {
    pub fn new<F>(f: F) -> Self
    where
        F: FnMut() + 'static,
    {
        let id = runtime::register_effect(Box::new(f));
        runtime::run_effect(id);
        Self { id }
    }
}

impl Drop for Effect {
    fn drop(&mut self) {
        runtime::dispose_effect(self.id);
    }
}

pub fn create_effect<F>(f: F) -> Effect
where
    F: FnMut() + 'static,
{
    Effect::new(f)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::reactive::signal::create_signal;

    #[test]
    fn runs_once_on_creation() {
        let runs = Rc::new(Cell::new(0));
        let counter = runs.clone();
        let _effect = create_effect(move || counter.set(counter.get() + 1));
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn reruns_when_dependency_changes() {
        let signal = create_signal(0);
        let runs = Rc::new(Cell::new(0));
        let counter = runs.clone();
        let tracked = signal.clone();
        let _effect = create_effect(move || {
            tracked.get();
            counter.set(counter.get() + 1);
        });
        signal.set(1);
        signal.set(2);
        assert_eq!(runs.get(), 3);
    }

    #[test]
    fn unchanged_write_does_not_rerun() {
        let signal = create_signal(1);
        let runs = Rc::new(Cell::new(0));
        let counter = runs.clone();
        let tracked = signal.clone();
        let _effect = create_effect(move || {
            tracked.get();
            counter.set(counter.get() + 1);
        });
        signal.set(1);
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn dropped_effect_stops_observing() {
        let signal = create_signal(0);
        let runs = Rc::new(Cell::new(0));
        let counter = runs.clone();
        let tracked = signal.clone();
        let effect = create_effect(move || {
            tracked.get();
            counter.set(counter.get() + 1);
        });
        drop(effect);
        signal.set(1);
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn batch_coalesces_writes() {
        let a = create_signal(0);
        let b = create_signal(0);
        let runs = Rc::new(Cell::new(0));
        let counter = runs.clone();
        let (ta, tb) = (a.clone(), b.clone());
        let _effect = create_effect(move || {
            ta.get();
            tb.get();
            counter.set(counter.get() + 1);
        });
        crate::reactive::batch(|| {
            a.set(1);
            b.set(1);
        });
        assert_eq!(runs.get(), 2);
    }
}
