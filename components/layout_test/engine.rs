/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use layout_test_traits::{DeviceOrientation, EngineMsg, EngineView, TestWebView, WebViewSettings};
use log::{debug, warn};
use parking_lot::RwLock;

use crate::error::EngineError;

/// A [`TestWebView`] that forwards work to a view living on its own engine thread.
///
/// Fire-and-forget posts may still be queued when a test is torn down; the engine
/// thread runs them regardless. Settings are kept on this side of the channel so that
/// reads and writes from the script thread never wait for the engine.
#[derive(Clone)]
pub struct EngineWebView {
    sender: Sender<EngineMsg>,
    settings: Arc<RwLock<WebViewSettings>>,
    disconnected: Arc<AtomicBool>,
    layer_tree_timeout: Duration,
}

impl EngineWebView {
    /// Starts the engine thread. The view is built on that thread by `create_view`, so it
    /// never has to cross threads itself.
    pub fn spawn<F>(
        create_view: F,
        settings: WebViewSettings,
        layer_tree_timeout: Duration,
    ) -> (Self, JoinHandle<()>)
    where
        F: FnOnce() -> Box<dyn EngineView> + Send + 'static,
    {
        let (sender, receiver) = crossbeam_channel::unbounded();
        let initial_settings = settings.clone();
        let join_handle = thread::Builder::new()
            .name("LayoutTestEngine".to_owned())
            .spawn(move || {
                let mut view = create_view();
                view.apply_settings(&initial_settings);
                run_engine_loop(view.as_mut(), receiver);
            })
            .expect("Thread spawning failed");

        let web_view = Self {
            sender,
            settings: Arc::new(RwLock::new(settings)),
            disconnected: Arc::default(),
            layer_tree_timeout,
        };
        (web_view, join_handle)
    }

    pub fn disconnected(&self) -> bool {
        self.disconnected.load(Ordering::SeqCst)
    }

    /// Asks the engine thread to stop once it has drained the messages before this one.
    pub fn exit(&self) {
        self.post(EngineMsg::Exit);
    }

    fn post(&self, msg: EngineMsg) {
        if self.try_post(msg).is_err() {
            warn!("Lost connection to the engine thread.");
        }
    }

    fn try_post(&self, msg: EngineMsg) -> Result<(), EngineError> {
        if self.disconnected() {
            return Err(EngineError::Disconnected);
        }
        let name: &'static str = (&msg).into();
        debug!("Posting {name} to the engine thread");
        if self.sender.send(msg).is_err() {
            self.disconnected.store(true, Ordering::SeqCst);
            return Err(EngineError::Disconnected);
        }
        Ok(())
    }

    fn update_settings(&self, update: impl FnOnce(&mut WebViewSettings)) {
        let settings = {
            let mut settings = self.settings.write();
            update(&mut settings);
            settings.clone()
        };
        self.post(EngineMsg::SettingsChanged(settings));
    }

    /// Round trip to the engine thread for a layer tree dump.
    pub fn try_snapshot_layer_tree(&self) -> Result<String, EngineError> {
        let (sender, receiver) = crossbeam_channel::bounded(1);
        self.try_post(EngineMsg::LayerTreeAsText(sender))?;
        receiver
            .recv_timeout(self.layer_tree_timeout)
            .map_err(|error| match error {
                RecvTimeoutError::Timeout => EngineError::Timeout,
                RecvTimeoutError::Disconnected => EngineError::Disconnected,
            })
    }
}

impl TestWebView for EngineWebView {
    fn settings(&self) -> WebViewSettings {
        self.settings.read().clone()
    }

    fn set_app_cache_enabled(&self, enabled: bool) {
        self.update_settings(|settings| settings.app_cache_enabled = enabled);
    }

    fn set_page_cache_capacity(&self, capacity: i32) {
        self.update_settings(|settings| settings.page_cache_capacity = capacity);
    }

    fn set_xss_auditor_enabled(&self, enabled: bool) {
        self.update_settings(|settings| settings.xss_auditor_enabled = enabled);
    }

    fn request_focus_async(&self) {
        self.post(EngineMsg::RequestFocus);
    }

    fn build_layer_async(&self) {
        self.post(EngineMsg::BuildLayer);
    }

    fn set_drawing_paused(&self, paused: bool) {
        self.post(EngineMsg::SetDrawingPaused(paused));
    }

    fn show_find_dialog_async(&self, text: String) {
        self.post(EngineMsg::ShowFindDialog(text));
    }

    fn find_next_async(&self, forward: bool) {
        self.post(EngineMsg::FindNext(forward));
    }

    fn hide_find_dialog_async(&self) {
        self.post(EngineMsg::HideFindDialog);
    }

    fn snapshot_layer_tree(&self) -> String {
        self.try_snapshot_layer_tree().unwrap_or_else(|error| {
            warn!("Could not dump the layer tree: {error}");
            String::new()
        })
    }

    fn set_mock_device_orientation(&self, orientation: DeviceOrientation) {
        self.post(EngineMsg::SetMockDeviceOrientation(orientation));
    }
}

fn run_engine_loop(view: &mut dyn EngineView, receiver: Receiver<EngineMsg>) {
    while let Ok(msg) = receiver.recv() {
        match msg {
            EngineMsg::RequestFocus => view.focus(),
            EngineMsg::BuildLayer => view.build_layer(),
            EngineMsg::SetDrawingPaused(paused) => view.set_drawing_paused(paused),
            EngineMsg::ShowFindDialog(text) => view.show_find_dialog(&text),
            EngineMsg::FindNext(forward) => view.find_next(forward),
            EngineMsg::HideFindDialog => view.hide_find_dialog(),
            EngineMsg::SetMockDeviceOrientation(orientation) => {
                view.set_mock_device_orientation(orientation)
            },
            EngineMsg::SettingsChanged(settings) => view.apply_settings(&settings),
            EngineMsg::LayerTreeAsText(sender) => {
                let _ = sender.send(view.layer_tree_as_text());
            },
            EngineMsg::Exit => break,
        }
    }
    debug!("Engine thread exiting");
}
