//! External observation boundaries: content mutations and breakpoints.
//!
//! Both primitives are environment-specific, so the controller consumes them
//! as traits supplied at attach time. Passing no content observer marks the
//! environment as not supporting observation, and auto-update is silently
//! skipped.

use bitflags::bitflags;
use calloop::channel::Channel;

use crate::settings::Breakpoint;

bitflags! {
    /// What the content observer watches inside the viewport.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct WatchFlags: u8 {
        /// Changes anywhere in the descendant subtree.
        const SUBTREE = 0b001;
        /// Child additions and removals.
        const CHILD_LIST = 0b010;
        /// Text content changes.
        const CHARACTER_DATA = 0b100;
    }
}

impl WatchFlags {
    /// The full content watch-scope the controller arms for auto-update.
    pub fn content() -> Self {
        Self::SUBTREE | Self::CHILD_LIST | Self::CHARACTER_DATA
    }
}

/// Mutation-detection primitive for the viewport's content.
///
/// `observe` wires a callback to relevant changes; `disconnect` stops
/// delivery and must be idempotent (the controller calls it on disable and
/// again on destruction).
pub trait ContentObserver {
    fn observe(&mut self, watch: WatchFlags, on_change: Box<dyn FnMut()>);
    fn disconnect(&mut self);
}

/// One match-state snapshot from the breakpoint matcher: whether any
/// configured breakpoint currently matches the environment viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakpointState {
    pub matches: bool,
}

/// Media-query evaluation boundary.
///
/// Given the configured breakpoint descriptors, returns a channel that emits
/// a [`BreakpointState`] snapshot whenever the aggregate match state changes.
/// The controller registers the channel on its event loop and owns the
/// registration.
pub trait BreakpointMatcher {
    fn watch(&mut self, breakpoints: &[Breakpoint]) -> Channel<BreakpointState>;
}
