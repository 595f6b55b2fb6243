//! Debounced fan-in of update triggers.
//!
//! Heterogeneous trigger sources (the content-mutation observer, explicit
//! [`update()`] calls, embedder hooks) all funnel into one channel. The first
//! request of an idle period arms a one-shot window timer; further requests
//! inside the window are dropped; the timer's expiry fires exactly one
//! recompute (trailing edge). A gate mirrors the controller's disabled state:
//! while closed, requests are dropped outright — never queued — and closing
//! it also removes an armed timer so no window outlives a disable.
//!
//! [`update()`]: crate::controller::ScrollbarController::update

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use calloop::channel::{self, Channel, Sender};
use calloop::timer::{TimeoutAction, Timer};
use calloop::{LoopHandle, RegistrationToken};

use crate::controller::ControllerError;

/// Coalescing window for bursts of update requests.
pub const UPDATE_WINDOW: Duration = Duration::from_millis(200);

/// Cloneable request stream. Embedding code that needs to hook additional
/// mutation sources holds one of these and calls [`request`](Self::request);
/// the mutation-observer callback uses the same mechanism.
#[derive(Clone)]
pub struct UpdateHandle {
    sender: Sender<()>,
}

impl UpdateHandle {
    /// Request a recomputation. Dropped while the controller is disabled and
    /// coalesced with other requests in the same window; a no-op once the
    /// controller is destroyed.
    pub fn request(&self) {
        let _ = self.sender.send(());
    }
}

struct BusShared {
    /// Open while the controller is enabled.
    gate: Cell<bool>,
    /// Registration of the armed window timer, if a window is open.
    armed: RefCell<Option<RegistrationToken>>,
    on_fire: RefCell<Option<Rc<dyn Fn()>>>,
    window: Duration,
}

pub(crate) struct UpdateBus {
    handle: LoopHandle<'static, ()>,
    sender: Sender<()>,
    shared: Rc<BusShared>,
    channel_token: Option<RegistrationToken>,
}

impl UpdateBus {
    pub(crate) fn new(
        handle: LoopHandle<'static, ()>,
        window: Duration,
    ) -> Result<Self, ControllerError> {
        let (sender, chan): (Sender<()>, Channel<()>) = channel::channel();
        let shared = Rc::new(BusShared {
            gate: Cell::new(false),
            armed: RefCell::new(None),
            on_fire: RefCell::new(None),
            window,
        });

        let channel_token = {
            let shared = shared.clone();
            let loop_handle = handle.clone();
            handle
                .insert_source(chan, move |event, _, _| {
                    if !matches!(event, channel::Event::Msg(())) {
                        return;
                    }
                    if !shared.gate.get() {
                        log::debug!("update request dropped while disabled");
                        return;
                    }
                    if shared.armed.borrow().is_some() {
                        // Inside an open window: coalesced.
                        return;
                    }
                    let timer_shared = shared.clone();
                    let armed = loop_handle.insert_source(
                        Timer::from_duration(shared.window),
                        move |_deadline, _, _| {
                            let _ = timer_shared.armed.borrow_mut().take();
                            let fire = timer_shared.on_fire.borrow().clone();
                            if let Some(fire) = fire {
                                fire();
                            }
                            TimeoutAction::Drop
                        },
                    );
                    match armed {
                        Ok(token) => {
                            *shared.armed.borrow_mut() = Some(token);
                        }
                        Err(err) => log::warn!("failed to arm update window timer: {err}"),
                    }
                })
                .map_err(|err| ControllerError::EventLoop(err.to_string()))?
        };

        Ok(Self {
            handle,
            sender,
            shared,
            channel_token: Some(channel_token),
        })
    }

    /// Wires the downstream recompute. Set once, right after construction.
    pub(crate) fn set_on_fire(&self, fire: impl Fn() + 'static) {
        *self.shared.on_fire.borrow_mut() = Some(Rc::new(fire));
    }

    pub(crate) fn request(&self) {
        let _ = self.sender.send(());
    }

    pub(crate) fn handle(&self) -> UpdateHandle {
        UpdateHandle {
            sender: self.sender.clone(),
        }
    }

    pub(crate) fn open_gate(&self) {
        self.shared.gate.set(true);
    }

    /// Closes the gate and cancels a pending window, so nothing published by
    /// this bus can postdate a disable.
    pub(crate) fn close_gate(&self) {
        self.shared.gate.set(false);
        self.cancel_pending();
    }

    pub(crate) fn cancel_pending(&self) {
        if let Some(token) = self.shared.armed.borrow_mut().take() {
            self.handle.remove(token);
            log::debug!("pending update window cancelled");
        }
    }

    /// Revokes the channel registration and any pending window. Idempotent.
    pub(crate) fn shutdown(&mut self) {
        self.cancel_pending();
        if let Some(token) = self.channel_token.take() {
            self.handle.remove(token);
        }
    }
}
