/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The driver's end of the completion handshake and the geolocation permission
//! rendezvous.

use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, after, select};
use layout_test_traits::DriverDelegate;
use log::{debug, info, warn};

use crate::controller::LayoutTestController;

/// What a test sent to the driver.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DriverEvent {
    NotifyDone,
    GeolocationPermissionSet,
    Error(String),
}

/// A [`DriverDelegate`] that queues events for a [`TestDriver`] on another thread.
#[derive(Clone)]
pub struct DriverChannel {
    sender: Sender<DriverEvent>,
}

impl DriverChannel {
    fn send(&self, event: DriverEvent) {
        if let Err(error) = self.sender.send(event) {
            warn!("Test driver is gone, dropping {:?}", error.into_inner());
        }
    }
}

impl DriverDelegate for DriverChannel {
    fn notify_done_from_test(&self) {
        self.send(DriverEvent::NotifyDone);
    }

    fn notify_geolocation_permission_set(&self) {
        self.send(DriverEvent::GeolocationPermissionSet);
    }

    fn report_error(&self, message: String) {
        self.send(DriverEvent::Error(message));
    }
}

/// How a test ended, as far as the driver is concerned.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Completion {
    /// The test did not ask to wait; dump right after the load event.
    DumpNow,
    /// The test waited and then called `notifyDone`.
    NotifiedDone,
    /// The test waited and never called `notifyDone`, or went away.
    TimedOut,
}

/// Answers a single geolocation permission prompt raised by the engine.
pub type GeolocationPromptResponder = Box<dyn FnOnce(bool) + Send>;

/// Prompts raised before the test expressed a permission decision.
#[derive(Default)]
struct GeolocationPromptQueue {
    pending: Vec<GeolocationPromptResponder>,
}

impl GeolocationPromptQueue {
    fn len(&self) -> usize {
        self.pending.len()
    }

    fn push(&mut self, responder: GeolocationPromptResponder) {
        self.pending.push(responder);
    }

    fn resolve_all(&mut self, allow: bool) {
        for responder in self.pending.drain(..) {
            responder(allow);
        }
    }
}

/// The driver thread's side of one test.
pub struct TestDriver {
    receiver: Receiver<DriverEvent>,
    notify_done_received: bool,
    errors: Vec<String>,
    geolocation_prompts: GeolocationPromptQueue,
}

impl TestDriver {
    /// Returns the driver together with the delegate to build the test's controller with.
    pub fn new() -> (Self, DriverChannel) {
        let (sender, receiver) = crossbeam_channel::unbounded();
        let driver = Self {
            receiver,
            notify_done_received: false,
            errors: Vec::new(),
            geolocation_prompts: GeolocationPromptQueue::default(),
        };
        (driver, DriverChannel { sender })
    }

    /// Every message the test reported, in order.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn pending_geolocation_prompts(&self) -> usize {
        self.geolocation_prompts.len()
    }

    /// Handles every event that has already arrived. Queued geolocation prompts are only
    /// answered from here or from [`Self::wait_for_completion`].
    pub fn pump_events(&mut self, controller: &LayoutTestController) {
        while let Ok(event) = self.receiver.try_recv() {
            self.handle_event(controller, event);
        }
    }

    fn handle_event(&mut self, controller: &LayoutTestController, event: DriverEvent) {
        debug!("Driver received {event:?}");
        match event {
            DriverEvent::NotifyDone => self.notify_done_received = true,
            DriverEvent::GeolocationPermissionSet => {
                let allow = controller.should_allow_geolocation_usage();
                self.geolocation_prompts.resolve_all(allow);
            },
            DriverEvent::Error(message) => self.errors.push(message),
        }
    }

    /// Called once the test's load event has fired. Dumps immediately unless the test
    /// asked to wait, in which case this blocks until `notifyDone` or `timeout`.
    pub fn wait_for_completion(
        &mut self,
        controller: &LayoutTestController,
        timeout: Duration,
    ) -> Completion {
        self.pump_events(controller);
        if !controller.should_wait_until_done() {
            return Completion::DumpNow;
        }

        let deadline = Instant::now() + timeout;
        while !self.notify_done_received {
            let remaining = deadline.saturating_duration_since(Instant::now());
            select! {
                recv(self.receiver) -> event => match event {
                    Ok(event) => self.handle_event(controller, event),
                    Err(_) => {
                        warn!("Test went away without calling notifyDone");
                        return Completion::TimedOut;
                    },
                },
                recv(after(remaining)) -> _ => {
                    info!("Timed out waiting for notifyDone");
                    return Completion::TimedOut;
                },
            }
        }
        Completion::NotifiedDone
    }

    /// The engine raised a geolocation permission prompt. It is answered now if the test
    /// has already decided, and queued until it does otherwise.
    pub fn handle_geolocation_prompt(
        &mut self,
        controller: &LayoutTestController,
        responder: GeolocationPromptResponder,
    ) {
        self.pump_events(controller);
        if controller.should_respond_to_geolocation_permission_prompts() {
            responder(controller.should_allow_geolocation_usage());
        } else {
            self.geolocation_prompts.push(responder);
        }
    }
}
