//! Reactive primitives backing the public state surface.
//!
//! A [`Signal`] holds the controller's published [`ScrollbarState`]
//! (single-writer: the controller), [`Memo`]s project it into the style block
//! and per-axis display flags, and consumers attach [`Effect`]s to re-render
//! when a projection changes. Reads observe immutable snapshots, so any
//! number of consumers may watch concurrently.
//!
//! [`ScrollbarState`]: crate::state::ScrollbarState

mod effect;
mod memo;
mod runtime;
mod signal;

pub use effect::{create_effect, Effect};
pub use memo::{create_memo, Memo};
pub use runtime::batch;
pub use signal::{create_signal, ReadSignal, Signal, WriteSignal};
