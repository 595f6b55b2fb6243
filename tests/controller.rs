//! Lifecycle, debounce and teardown behavior of the scrollbar controller,
//! driven through a real calloop event loop with fake collaborators.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::{Duration, Instant};

use calloop::channel::{self, Channel, Sender};
use calloop::EventLoop;

use gutter::prelude::*;

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Viewport with adjustable extents. `compute_snapshots` counts how many
/// times the controller took a metrics snapshot, i.e. how many
/// recomputations actually ran.
struct FakeViewport {
    scroll_width: Cell<u32>,
    scroll_height: Cell<u32>,
    client_width: Cell<u32>,
    client_height: Cell<u32>,
    offset_width: Cell<u32>,
    compute_snapshots: Cell<u32>,
}

impl FakeViewport {
    /// 300x200 viewport with 500px-tall content and a 16px native scrollbar.
    fn overflowing_y() -> Rc<Self> {
        Rc::new(Self {
            scroll_width: Cell::new(300),
            scroll_height: Cell::new(500),
            client_width: Cell::new(300),
            client_height: Cell::new(200),
            offset_width: Cell::new(316),
            compute_snapshots: Cell::new(0),
        })
    }

    fn snapshots(&self) -> u32 {
        self.compute_snapshots.get()
    }
}

impl Viewport for FakeViewport {
    fn scroll_width(&self) -> u32 {
        self.scroll_width.get()
    }
    fn scroll_height(&self) -> u32 {
        // Called exactly once per metrics snapshot.
        self.compute_snapshots.set(self.compute_snapshots.get() + 1);
        self.scroll_height.get()
    }
    fn client_width(&self) -> u32 {
        self.client_width.get()
    }
    fn client_height(&self) -> u32 {
        self.client_height.get()
    }
    fn offset_width(&self) -> u32 {
        self.offset_width.get()
    }
}

#[derive(Clone, Default)]
struct FakeObserver {
    callback: Rc<RefCell<Option<Box<dyn FnMut()>>>>,
    connected: Rc<Cell<bool>>,
}

impl FakeObserver {
    fn mutate(&self) {
        if let Some(callback) = self.callback.borrow_mut().as_mut() {
            callback();
        }
    }
}

impl ContentObserver for FakeObserver {
    fn observe(&mut self, watch: WatchFlags, on_change: Box<dyn FnMut()>) {
        assert_eq!(watch, WatchFlags::content());
        *self.callback.borrow_mut() = Some(on_change);
        self.connected.set(true);
    }

    fn disconnect(&mut self) {
        self.connected.set(false);
        *self.callback.borrow_mut() = None;
    }
}

#[derive(Clone, Default)]
struct FakeMatcher {
    sender: Rc<RefCell<Option<Sender<BreakpointState>>>>,
}

impl FakeMatcher {
    fn emit(&self, matches: bool) {
        let sender = self.sender.borrow();
        let sender = sender.as_ref().expect("matcher was never asked to watch");
        sender
            .send(BreakpointState { matches })
            .expect("breakpoint stream closed");
    }
}

impl BreakpointMatcher for FakeMatcher {
    fn watch(&mut self, breakpoints: &[Breakpoint]) -> Channel<BreakpointState> {
        assert!(!breakpoints.is_empty());
        let (sender, stream) = channel::channel();
        *self.sender.borrow_mut() = Some(sender);
        stream
    }
}

#[derive(Clone, Default)]
struct FakeEngine {
    requests: Rc<RefCell<Vec<ScrollRequest>>>,
}

impl ScrollEngine for FakeEngine {
    fn scroll_to(&mut self, request: ScrollRequest) -> Result<Completion, ScrollError> {
        if let ScrollTarget::Element(selector) = &request.target {
            if selector == "#missing" {
                return Err(ScrollError::NoSuchElement(selector.clone()));
            }
        }
        self.requests.borrow_mut().push(request);
        let (done, resolve) = create_signal(false).split();
        resolve.set(true);
        Ok(done)
    }
}

fn attachment(viewport: Rc<FakeViewport>) -> Attachment {
    Attachment {
        viewport,
        engine: None,
        observer: None,
        matcher: None,
    }
}

/// Dispatches the loop until `duration` of wall time has passed.
fn pump(event_loop: &mut EventLoop<'static, ()>, duration: Duration) {
    let deadline = Instant::now() + duration;
    loop {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        let slice = (deadline - now).min(Duration::from_millis(20));
        event_loop
            .dispatch(Some(slice), &mut ())
            .expect("event loop dispatch failed");
    }
}

/// Dispatches until `condition` holds, panicking after `timeout`.
fn pump_until(
    event_loop: &mut EventLoop<'static, ()>,
    timeout: Duration,
    mut condition: impl FnMut() -> bool,
) {
    let start = Instant::now();
    while !condition() {
        assert!(start.elapsed() < timeout, "condition not met in {timeout:?}");
        event_loop
            .dispatch(Some(Duration::from_millis(10)), &mut ())
            .expect("event loop dispatch failed");
    }
}

fn new_controller(
    event_loop: &EventLoop<'static, ()>,
    settings: ScrollbarSettings,
) -> ScrollbarController {
    ScrollbarController::new(event_loop.handle(), settings).expect("controller construction failed")
}

#[test]
fn attach_publishes_state_synchronously() {
    init_logs();
    let event_loop: EventLoop<'static, ()> = EventLoop::try_new().unwrap();
    let controller = new_controller(&event_loop, ScrollbarSettings::default());
    let viewport = FakeViewport::overflowing_y();
    controller.attach(attachment(viewport.clone())).unwrap();

    assert!(!controller.disabled());
    assert_eq!(viewport.snapshots(), 1);
    assert!(controller.display_y().get());
    assert!(!controller.display_x().get());
    let style = controller.style().get();
    assert_eq!(style.width, "calc(100% + 17px)");
    assert_eq!(style.height, "calc(100% + 17px)");
    assert_eq!(style.padding_right, "17px");
    assert_eq!(style.padding_bottom, "0");
}

#[test]
fn enable_before_attach_is_a_noop() {
    let event_loop: EventLoop<'static, ()> = EventLoop::try_new().unwrap();
    let controller = new_controller(&event_loop, ScrollbarSettings::default());
    controller.enable();
    assert!(controller.disabled());
    // Requests without a viewport are dropped, not queued.
    controller.update();
}

#[test]
fn debounce_coalesces_bursts_into_one_recompute() {
    init_logs();
    let mut event_loop: EventLoop<'static, ()> = EventLoop::try_new().unwrap();
    let controller = new_controller(&event_loop, ScrollbarSettings::default());
    let viewport = FakeViewport::overflowing_y();
    controller.attach(attachment(viewport.clone())).unwrap();
    assert_eq!(viewport.snapshots(), 1);

    let start = Instant::now();
    for _ in 0..10 {
        controller.update();
        pump(&mut event_loop, Duration::from_millis(5));
    }
    // The burst spans well under one window; nothing has fired yet unless
    // the host stalled past the window.
    if start.elapsed() < Duration::from_millis(150) {
        assert_eq!(viewport.snapshots(), 1);
    }

    let vp = viewport.clone();
    pump_until(&mut event_loop, Duration::from_secs(2), move || {
        vp.snapshots() >= 2
    });

    // Exactly one recompute for the whole burst, and none trailing behind.
    assert_eq!(viewport.snapshots(), 2);
    assert!(
        start.elapsed() >= Duration::from_millis(195),
        "recompute fired before the window expired"
    );
    pump(&mut event_loop, Duration::from_millis(300));
    assert_eq!(viewport.snapshots(), 2);
}

#[test]
fn requests_while_disabled_are_dropped_not_queued() {
    let mut event_loop: EventLoop<'static, ()> = EventLoop::try_new().unwrap();
    let controller = new_controller(&event_loop, ScrollbarSettings::default());
    let viewport = FakeViewport::overflowing_y();
    controller.attach(attachment(viewport.clone())).unwrap();
    assert_eq!(viewport.snapshots(), 1);

    controller.set_disabled(true);
    for _ in 0..5 {
        controller.update();
    }
    pump(&mut event_loop, Duration::from_millis(300));
    assert_eq!(viewport.snapshots(), 1, "suppressed requests recomputed");

    // Re-enabling publishes synchronously but must not replay dropped
    // requests through the bus.
    controller.set_disabled(false);
    assert_eq!(viewport.snapshots(), 2);
    pump(&mut event_loop, Duration::from_millis(300));
    assert_eq!(viewport.snapshots(), 2, "a stale request fired after enable");

    controller.update();
    pump(&mut event_loop, Duration::from_millis(400));
    assert_eq!(viewport.snapshots(), 3);
}

#[test]
fn disable_cancels_a_pending_window() {
    let mut event_loop: EventLoop<'static, ()> = EventLoop::try_new().unwrap();
    let controller = new_controller(&event_loop, ScrollbarSettings::default());
    let viewport = FakeViewport::overflowing_y();
    controller.attach(attachment(viewport.clone())).unwrap();

    controller.update();
    pump(&mut event_loop, Duration::from_millis(20));
    controller.disable();
    controller.enable();
    assert_eq!(viewport.snapshots(), 2); // attach + re-enable, both synchronous
    pump(&mut event_loop, Duration::from_millis(400));
    assert_eq!(viewport.snapshots(), 2, "cancelled window still fired");
}

#[test]
fn disable_forces_the_default_state() {
    let event_loop: EventLoop<'static, ()> = EventLoop::try_new().unwrap();
    let controller = new_controller(&event_loop, ScrollbarSettings::default());
    let viewport = FakeViewport::overflowing_y();
    controller.attach(attachment(viewport)).unwrap();
    assert!(controller.display_y().get());

    controller.set_disabled(true);
    assert!(controller.disabled());
    assert!(!controller.display_y().get());
    assert!(!controller.display_x().get());
    assert_eq!(controller.style().get(), ViewStyle::default());

    // Idempotent.
    controller.set_disabled(true);
    assert!(controller.disabled());
}

#[test]
fn breakpoint_matches_toggle_the_lifecycle() {
    init_logs();
    let mut event_loop: EventLoop<'static, ()> = EventLoop::try_new().unwrap();
    let settings = ScrollbarSettings::builder()
        .breakpoint(Breakpoint::new("(max-width: 600px)"))
        .build();
    let controller = new_controller(&event_loop, settings);
    let viewport = FakeViewport::overflowing_y();
    let matcher = FakeMatcher::default();
    controller
        .attach(Attachment {
            viewport: viewport.clone(),
            engine: None,
            observer: None,
            matcher: Some(Box::new(matcher.clone())),
        })
        .unwrap();
    assert!(!controller.disabled());

    matcher.emit(true);
    pump(&mut event_loop, Duration::from_millis(50));
    assert!(controller.disabled());
    assert_eq!(controller.style().get(), ViewStyle::default());

    matcher.emit(false);
    pump(&mut event_loop, Duration::from_millis(50));
    assert!(!controller.disabled());
    assert!(controller.display_y().get());
}

#[test]
fn explicit_disable_wins_over_breakpoints() {
    let mut event_loop: EventLoop<'static, ()> = EventLoop::try_new().unwrap();
    let settings = ScrollbarSettings::builder()
        .breakpoint(Breakpoint::new("(max-width: 600px)"))
        .build();
    let controller = new_controller(&event_loop, settings);
    let viewport = FakeViewport::overflowing_y();
    let matcher = FakeMatcher::default();
    controller
        .attach(Attachment {
            viewport: viewport.clone(),
            engine: None,
            observer: None,
            matcher: Some(Box::new(matcher.clone())),
        })
        .unwrap();

    controller.set_disabled(true);
    let snapshots = viewport.snapshots();

    // A non-matching breakpoint must not re-enable past an explicit disable.
    matcher.emit(false);
    pump(&mut event_loop, Duration::from_millis(50));
    assert!(controller.disabled());
    assert_eq!(viewport.snapshots(), snapshots);
}

#[test]
fn breakpoints_are_not_watched_when_attached_disabled() {
    let event_loop: EventLoop<'static, ()> = EventLoop::try_new().unwrap();
    let settings = ScrollbarSettings::builder()
        .breakpoint(Breakpoint::new("(max-width: 600px)"))
        .disabled(true)
        .build();
    let controller = new_controller(&event_loop, settings);
    let matcher = FakeMatcher::default();
    controller
        .attach(Attachment {
            viewport: FakeViewport::overflowing_y(),
            engine: None,
            observer: None,
            matcher: Some(Box::new(matcher.clone())),
        })
        .unwrap();

    assert!(controller.disabled());
    assert!(matcher.sender.borrow().is_none());
}

#[test]
fn destroy_prevents_a_pending_window_from_publishing() {
    let mut event_loop: EventLoop<'static, ()> = EventLoop::try_new().unwrap();
    let controller = new_controller(&event_loop, ScrollbarSettings::default());
    let viewport = FakeViewport::overflowing_y();
    controller.attach(attachment(viewport.clone())).unwrap();

    controller.update();
    pump(&mut event_loop, Duration::from_millis(20));
    controller.destroy();
    pump(&mut event_loop, Duration::from_millis(400));
    assert_eq!(viewport.snapshots(), 1, "a recompute published after teardown");

    // Teardown is idempotent and later calls are inert.
    controller.destroy();
    controller.update();
    pump(&mut event_loop, Duration::from_millis(250));
    assert_eq!(viewport.snapshots(), 1);
}

#[test]
fn dropping_the_controller_tears_down() {
    let mut event_loop: EventLoop<'static, ()> = EventLoop::try_new().unwrap();
    let viewport = FakeViewport::overflowing_y();
    {
        let controller = new_controller(&event_loop, ScrollbarSettings::default());
        controller.attach(attachment(viewport.clone())).unwrap();
        controller.update();
        pump(&mut event_loop, Duration::from_millis(20));
    }
    pump(&mut event_loop, Duration::from_millis(400));
    assert_eq!(viewport.snapshots(), 1);
}

#[test]
fn content_mutations_drive_debounced_updates() {
    init_logs();
    let mut event_loop: EventLoop<'static, ()> = EventLoop::try_new().unwrap();
    let controller = new_controller(&event_loop, ScrollbarSettings::default());
    let viewport = FakeViewport::overflowing_y();
    let observer = FakeObserver::default();
    controller
        .attach(Attachment {
            viewport: viewport.clone(),
            engine: None,
            observer: Some(Box::new(observer.clone())),
            matcher: None,
        })
        .unwrap();
    assert!(observer.connected.get());

    observer.mutate();
    observer.mutate();
    observer.mutate();
    pump(&mut event_loop, Duration::from_millis(500));
    assert_eq!(viewport.snapshots(), 2, "mutation burst did not coalesce");

    controller.set_disabled(true);
    assert!(!observer.connected.get(), "observer survived disable");
    controller.set_disabled(false);
    assert!(observer.connected.get(), "observer not re-armed on enable");
}

#[test]
fn observer_is_skipped_without_auto_update() {
    let event_loop: EventLoop<'static, ()> = EventLoop::try_new().unwrap();
    let settings = ScrollbarSettings::builder().auto_update(false).build();
    let controller = new_controller(&event_loop, settings);
    let observer = FakeObserver::default();
    controller
        .attach(Attachment {
            viewport: FakeViewport::overflowing_y(),
            engine: None,
            observer: Some(Box::new(observer.clone())),
            matcher: None,
        })
        .unwrap();
    assert!(!observer.connected.get());
}

#[test]
fn consumer_effects_follow_recomputed_state() {
    let mut event_loop: EventLoop<'static, ()> = EventLoop::try_new().unwrap();
    let controller = new_controller(&event_loop, ScrollbarSettings::default());
    let viewport = FakeViewport::overflowing_y();
    controller.attach(attachment(viewport.clone())).unwrap();

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let display_y = controller.display_y();
    let _render = create_effect(move || sink.borrow_mut().push(display_y.get()));
    assert_eq!(*seen.borrow(), vec![true]);

    // Content shrinks below the viewport: the next recompute hides the track.
    viewport.scroll_height.set(150);
    controller.update();
    pump(&mut event_loop, Duration::from_millis(400));
    assert_eq!(*seen.borrow(), vec![true, false]);
}

#[test]
fn scroll_delegation_forwards_verbatim() {
    let event_loop: EventLoop<'static, ()> = EventLoop::try_new().unwrap();
    let controller = new_controller(&event_loop, ScrollbarSettings::default());
    let viewport = FakeViewport::overflowing_y();
    let engine = Rc::new(RefCell::new(FakeEngine::default()));
    let requests = engine.borrow().requests.clone();
    let engine: Rc<RefCell<dyn ScrollEngine>> = engine;
    controller
        .attach(Attachment {
            viewport,
            engine: Some(engine),
            observer: None,
            matcher: None,
        })
        .unwrap();

    let done = controller
        .scroll_to_position(0.0, 120.0, ScrollOptions::default())
        .unwrap();
    assert!(done.get_untracked());
    {
        let requests = requests.borrow();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].target,
            ScrollTarget::Position { x: 0.0, y: 120.0 }
        );
        // Unset options fall back to the configured default duration.
        assert_eq!(requests[0].duration, Duration::from_millis(300));
    }

    controller
        .scroll_to_edge(
            ScrollEdge::Bottom,
            ScrollOptions::default().duration(Duration::from_millis(500)),
        )
        .unwrap();
    {
        let requests = requests.borrow();
        assert_eq!(requests[1].target, ScrollTarget::Edge(ScrollEdge::Bottom));
        assert_eq!(requests[1].duration, Duration::from_millis(500));
    }
}

#[test]
fn engine_failures_propagate_unchanged() {
    let event_loop: EventLoop<'static, ()> = EventLoop::try_new().unwrap();
    let controller = new_controller(&event_loop, ScrollbarSettings::default());
    let engine: Rc<RefCell<dyn ScrollEngine>> = Rc::new(RefCell::new(FakeEngine::default()));
    controller
        .attach(Attachment {
            viewport: FakeViewport::overflowing_y(),
            engine: Some(engine),
            observer: None,
            matcher: None,
        })
        .unwrap();

    let err = controller
        .scroll_to_element("#missing", ScrollOptions::default())
        .unwrap_err();
    assert!(matches!(err, ScrollError::NoSuchElement(ref s) if s == "#missing"));
}

#[test]
fn scrolling_without_an_engine_fails_cleanly() {
    let event_loop: EventLoop<'static, ()> = EventLoop::try_new().unwrap();
    let controller = new_controller(&event_loop, ScrollbarSettings::default());
    controller
        .attach(attachment(FakeViewport::overflowing_y()))
        .unwrap();
    let err = controller
        .scroll_to_position(0.0, 0.0, ScrollOptions::default())
        .unwrap_err();
    assert!(matches!(err, ScrollError::EngineUnavailable));
}
