//! Custom scrollbar overlay control for scrollable hosts.
//!
//! `gutter` replaces a host element's native scrollbars with custom-styled
//! indicators while preserving native scroll behavior. The crate owns the
//! reactive visibility/sizing state machine and its update-triggering
//! subsystem: deciding whether each axis shows a custom track, what
//! compensating sizing the viewport needs to hide the native bars without
//! clipping content, and which events (content mutation, breakpoint change,
//! manual request) recompute that state — coalescing bursts into at most one
//! externally visible transition per 200 ms window.
//!
//! Rendering of track/thumb visuals, drag gestures and the smooth-scroll
//! animation itself are external; this crate exposes only their interface
//! boundaries ([`Viewport`], [`ContentObserver`], [`BreakpointMatcher`],
//! [`ScrollEngine`]).
//!
//! Everything runs cooperatively on a [`calloop`] event loop:
//!
//! ```ignore
//! let mut event_loop: EventLoop<'static, ()> = EventLoop::try_new()?;
//! let controller = ScrollbarController::new(
//!     event_loop.handle(),
//!     ScrollbarSettings::builder().track_x(true).build(),
//! )?;
//! controller.attach(Attachment {
//!     viewport,
//!     engine: None,
//!     observer: Some(observer),
//!     matcher: None,
//! })?;
//!
//! let display_y = controller.display_y();
//! let _render = create_effect(move || {
//!     if display_y.get() { /* show the vertical track */ }
//! });
//!
//! event_loop.run(None, &mut (), |_| {})?;
//! ```
//!
//! [`Viewport`]: viewport::Viewport
//! [`ContentObserver`]: observe::ContentObserver
//! [`BreakpointMatcher`]: observe::BreakpointMatcher
//! [`ScrollEngine`]: scroll_to::ScrollEngine

pub mod controller;
pub mod easing;
pub mod observe;
pub mod reactive;
pub mod scroll_to;
pub mod settings;
pub mod state;
pub mod update_bus;
pub mod viewport;

pub use controller::{Attachment, ControllerError, ScrollbarController};
pub use settings::{Breakpoint, ScrollbarSettings};
pub use state::{ScrollbarState, ViewStyle};
pub use update_bus::{UpdateHandle, UPDATE_WINDOW};

pub mod prelude {
    pub use crate::controller::{Attachment, ControllerError, ScrollbarController};
    pub use crate::easing::TimingFunction;
    pub use crate::observe::{BreakpointMatcher, BreakpointState, ContentObserver, WatchFlags};
    pub use crate::reactive::{
        batch, create_effect, create_memo, create_signal, Effect, Memo, ReadSignal, Signal,
        WriteSignal,
    };
    pub use crate::scroll_to::{
        Completion, ScrollEdge, ScrollEngine, ScrollError, ScrollOptions, ScrollRequest,
        ScrollTarget,
    };
    pub use crate::settings::{Breakpoint, ScrollbarSettings, ScrollbarSettingsBuilder};
    pub use crate::state::{ScrollbarState, ViewStyle};
    pub use crate::update_bus::{UpdateHandle, UPDATE_WINDOW};
    pub use crate::viewport::{NativeScrollbarSize, ScrollMetrics, Viewport};
}
