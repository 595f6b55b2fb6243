//! Lifecycle controller and public state surface.

use std::cell::RefCell;
use std::rc::Rc;

use calloop::channel;
use calloop::{LoopHandle, RegistrationToken};
use thiserror::Error;

use crate::observe::{BreakpointMatcher, BreakpointState, ContentObserver, WatchFlags};
use crate::reactive::{create_memo, create_signal, Memo, Signal};
use crate::scroll_to::{
    Completion, ScrollEdge, ScrollEngine, ScrollError, ScrollOptions, ScrollRequest, ScrollTarget,
};
use crate::settings::ScrollbarSettings;
use crate::state::{compute, ScrollbarState, ViewStyle};
use crate::update_bus::{UpdateBus, UpdateHandle, UPDATE_WINDOW};
use crate::viewport::{NativeScrollbarSize, ScrollMetrics, Viewport};

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("event loop registration failed: {0}")]
    EventLoop(String),
}

/// Collaborators wired in when the controller attaches to a host.
///
/// `observer` doubles as the environment capability: passing `None` declares
/// that content observation is not available (e.g. a non-browser rendering
/// context) and auto-update is silently skipped. The decision is made once,
/// here, not re-queried later.
pub struct Attachment {
    pub viewport: Rc<dyn Viewport>,
    pub engine: Option<Rc<RefCell<dyn ScrollEngine>>>,
    pub observer: Option<Box<dyn ContentObserver>>,
    pub matcher: Option<Box<dyn BreakpointMatcher>>,
}

/// Replaces a host element's native scrollbars with custom indicators while
/// preserving native scroll behavior.
///
/// The controller owns a two-state lifecycle (enabled/disabled) and three
/// revocable subscriptions: the breakpoint-match stream, the debounced
/// update bus, and the content-mutation observer. All callbacks run on the
/// single event-loop thread, so state recomputation is totally ordered and
/// the published state is last-write-wins.
///
/// Consumers observe through [`style`](Self::style),
/// [`display_x`](Self::display_x) and [`display_y`](Self::display_y); the
/// only upstream influence they have is [`update`](Self::update) and the
/// lifecycle methods.
pub struct ScrollbarController {
    inner: Rc<RefCell<Inner>>,
    style: Memo<ViewStyle>,
    display_x: Memo<bool>,
    display_y: Memo<bool>,
}

struct Inner {
    handle: LoopHandle<'static, ()>,
    settings: ScrollbarSettings,
    state: Signal<ScrollbarState>,
    bus: UpdateBus,
    viewport: Option<Rc<dyn Viewport>>,
    engine: Option<Rc<RefCell<dyn ScrollEngine>>>,
    observer: Option<Box<dyn ContentObserver>>,
    observer_armed: bool,
    breakpoint_token: Option<RegistrationToken>,
    native_size: NativeScrollbarSize,
    disabled: bool,
    /// The consumer's explicit wish, set through `set_disabled`. While true,
    /// breakpoint events are ignored entirely: an explicit disable is never
    /// overridden by a non-matching breakpoint.
    user_disabled: bool,
    destroyed: bool,
}

impl ScrollbarController {
    pub fn new(
        handle: LoopHandle<'static, ()>,
        settings: ScrollbarSettings,
    ) -> Result<Self, ControllerError> {
        let state = create_signal(ScrollbarState::default());
        let bus = UpdateBus::new(handle.clone(), UPDATE_WINDOW)?;
        let inner = Rc::new(RefCell::new(Inner {
            handle,
            settings,
            state: state.clone(),
            bus,
            viewport: None,
            engine: None,
            observer: None,
            observer_armed: false,
            breakpoint_token: None,
            native_size: NativeScrollbarSize::default(),
            disabled: true,
            user_disabled: false,
            destroyed: false,
        }));

        let weak = Rc::downgrade(&inner);
        inner.borrow().bus.set_on_fire(move || {
            if let Some(inner) = weak.upgrade() {
                Inner::recompute(&inner);
            }
        });

        let style = {
            let state = state.clone();
            create_memo(move || state.get().view_style)
        };
        let display_x = {
            let state = state.clone();
            create_memo(move || state.get().display_x)
        };
        let display_y = create_memo(move || state.get().display_y);

        Ok(Self {
            inner,
            style,
            display_x,
            display_y,
        })
    }

    /// Attach to a host viewport and wire the collaborators.
    ///
    /// The initial lifecycle state is enabled unless the settings start
    /// disabled. The breakpoint stream is subscribed only when breakpoints
    /// are configured and the consumer has not disabled the controller at
    /// attach time.
    pub fn attach(&self, attachment: Attachment) -> Result<(), ControllerError> {
        let matcher = {
            let mut inner = self.inner.borrow_mut();
            if inner.destroyed {
                return Ok(());
            }
            inner.viewport = Some(attachment.viewport);
            inner.engine = attachment.engine;
            inner.observer = attachment.observer;
            inner.user_disabled = inner.settings.disabled;
            attachment.matcher
        };

        if self.inner.borrow().user_disabled {
            Inner::disable(&self.inner);
        } else {
            Inner::enable(&self.inner);
        }

        let subscribe = {
            let inner = self.inner.borrow();
            !inner.settings.breakpoints.is_empty() && !inner.user_disabled
        };
        if subscribe {
            if let Some(mut matcher) = matcher {
                let stream = {
                    let inner = self.inner.borrow();
                    matcher.watch(&inner.settings.breakpoints)
                };
                let weak = Rc::downgrade(&self.inner);
                let token = self
                    .inner
                    .borrow()
                    .handle
                    .insert_source(stream, move |event, _, _| {
                        if let channel::Event::Msg(snapshot) = event {
                            if let Some(inner) = weak.upgrade() {
                                Inner::on_breakpoint(&inner, snapshot);
                            }
                        }
                    })
                    .map_err(|err| ControllerError::EventLoop(err.to_string()))?;
                self.inner.borrow_mut().breakpoint_token = Some(token);
            }
        }
        Ok(())
    }

    /// Request a recomputation. No-op while disabled; bursts within one
    /// window coalesce into a single recompute at window expiry.
    pub fn update(&self) {
        self.inner.borrow().bus.request();
    }

    /// Explicit transition to the enabled state. No-op before a viewport is
    /// attached.
    pub fn enable(&self) {
        Inner::enable(&self.inner);
    }

    /// Explicit transition to the disabled state: publishes the fixed default
    /// state and tears down content observation. Idempotent.
    pub fn disable(&self) {
        Inner::disable(&self.inner);
    }

    pub fn disabled(&self) -> bool {
        self.inner.borrow().disabled
    }

    /// Assigning the disabled flag: records the consumer's explicit wish
    /// (which breakpoint events never override) and runs the matching
    /// transition as one atomic step.
    pub fn set_disabled(&self, disabled: bool) {
        self.inner.borrow_mut().user_disabled = disabled;
        if disabled {
            Inner::disable(&self.inner);
        } else {
            Inner::enable(&self.inner);
        }
    }

    /// The internal update-request stream, for embedding code that hooks
    /// additional mutation sources.
    pub fn update_handle(&self) -> UpdateHandle {
        self.inner.borrow().bus.handle()
    }

    pub fn settings(&self) -> ScrollbarSettings {
        self.inner.borrow().settings.clone()
    }

    /// Current style block the viewport should carry.
    pub fn style(&self) -> Memo<ViewStyle> {
        self.style.clone()
    }

    /// Whether the horizontal custom track is shown.
    pub fn display_x(&self) -> Memo<bool> {
        self.display_x.clone()
    }

    /// Whether the vertical custom track is shown.
    pub fn display_y(&self) -> Memo<bool> {
        self.display_y.clone()
    }

    /// Revoke every subscription and stop publishing. Safe to call more than
    /// once; also runs on drop. A debounce window pending at this point will
    /// never fire.
    pub fn destroy(&self) {
        Inner::destroy(&self.inner);
    }

    pub fn scroll_to_position(
        &self,
        x: f32,
        y: f32,
        options: ScrollOptions,
    ) -> Result<Completion, ScrollError> {
        self.delegate(ScrollTarget::Position { x, y }, options)
    }

    pub fn scroll_to_element(
        &self,
        selector: &str,
        options: ScrollOptions,
    ) -> Result<Completion, ScrollError> {
        self.delegate(ScrollTarget::Element(selector.to_owned()), options)
    }

    pub fn scroll_to_edge(
        &self,
        edge: ScrollEdge,
        options: ScrollOptions,
    ) -> Result<Completion, ScrollError> {
        self.delegate(ScrollTarget::Edge(edge), options)
    }

    /// Forwards a scroll operation to the engine verbatim; the engine's
    /// completion signal (or failure) is returned unchanged.
    fn delegate(
        &self,
        target: ScrollTarget,
        options: ScrollOptions,
    ) -> Result<Completion, ScrollError> {
        let (engine, default_duration) = {
            let inner = self.inner.borrow();
            (inner.engine.clone(), inner.settings.scroll_to_duration)
        };
        let engine = engine.ok_or(ScrollError::EngineUnavailable)?;
        let request = ScrollRequest {
            target,
            duration: options.duration.unwrap_or(default_duration),
            easing: options.easing.unwrap_or_default(),
        };
        let completion = engine.borrow_mut().scroll_to(request);
        completion
    }
}

impl Drop for ScrollbarController {
    fn drop(&mut self) {
        Inner::destroy(&self.inner);
    }
}

impl Inner {
    /// Disabled → Enabled. Re-measures the native scrollbar, publishes state
    /// synchronously (not through the debounced bus) and arms content
    /// observation when configured and supported. Running it while already
    /// enabled just re-measures and republishes.
    fn enable(rc: &Rc<RefCell<Inner>>) {
        let published = {
            let mut me = rc.borrow_mut();
            if me.destroyed {
                return;
            }
            let Some(viewport) = me.viewport.clone() else {
                log::debug!("enable() before a viewport is attached; ignoring");
                return;
            };
            me.disabled = false;
            me.bus.open_gate();
            me.native_size = NativeScrollbarSize::measure(viewport.as_ref());
            let metrics = ScrollMetrics::read(viewport.as_ref());
            let next = compute(&metrics, &me.settings, &me.native_size);

            if me.settings.auto_update && !me.observer_armed {
                if me.observer.is_some() {
                    let updates = me.bus.handle();
                    let observer = me.observer.as_mut().unwrap();
                    observer.observe(WatchFlags::content(), Box::new(move || updates.request()));
                    me.observer_armed = true;
                }
            }

            log::debug!(
                "custom scrollbars enabled (native scrollbar size {})",
                me.native_size
            );
            (me.state.clone(), next)
        };
        // Publish outside the borrow: consumer effects may call back in.
        published.0.set(published.1);
    }

    /// Enabled → Disabled. Closes the update gate (cancelling a pending
    /// window), disconnects the observer and force-publishes the default
    /// state. Idempotent.
    fn disable(rc: &Rc<RefCell<Inner>>) {
        let state = {
            let mut me = rc.borrow_mut();
            if me.disabled {
                return;
            }
            me.disabled = true;
            me.bus.close_gate();
            if me.observer_armed {
                if let Some(observer) = me.observer.as_mut() {
                    observer.disconnect();
                }
                me.observer_armed = false;
            }
            log::debug!("custom scrollbars disabled; publishing default state");
            me.state.clone()
        };
        state.set(ScrollbarState::default());
    }

    /// One debounced recompute: read the metrics, run the pure computer,
    /// publish. The most recent recompute always supersedes earlier ones.
    fn recompute(rc: &Rc<RefCell<Inner>>) {
        let published = {
            let me = rc.borrow();
            if me.disabled || me.destroyed {
                return;
            }
            let Some(viewport) = me.viewport.clone() else {
                return;
            };
            let metrics = ScrollMetrics::read(viewport.as_ref());
            let next = compute(&metrics, &me.settings, &me.native_size);
            log::debug!(
                "recomputed scrollbar state: display_x={} display_y={}",
                next.display_x,
                next.display_y
            );
            (me.state.clone(), next)
        };
        published.0.set(published.1);
    }

    fn on_breakpoint(rc: &Rc<RefCell<Inner>>, snapshot: BreakpointState) {
        {
            let me = rc.borrow();
            if me.user_disabled || me.destroyed {
                return;
            }
        }
        if snapshot.matches {
            log::debug!("breakpoint matched; disabling custom scrollbars");
            Inner::disable(rc);
        } else {
            Inner::enable(rc);
        }
    }

    fn destroy(rc: &Rc<RefCell<Inner>>) {
        let mut me = rc.borrow_mut();
        if me.destroyed {
            return;
        }
        me.destroyed = true;
        me.disabled = true;
        if let Some(token) = me.breakpoint_token.take() {
            me.handle.remove(token);
        }
        me.bus.shutdown();
        // Disconnect regardless of current state; observers are idempotent.
        if let Some(observer) = me.observer.as_mut() {
            observer.disconnect();
        }
        me.observer_armed = false;
        log::debug!("scrollbar controller destroyed; subscriptions revoked");
    }
}
