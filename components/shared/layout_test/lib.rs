/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The collaborators a layout test controller talks to: the web view under test, the
//! engine's web storage, the mock sensor sources and the harness driver.

#![deny(unsafe_code)]

use crossbeam_channel::Sender;
use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

/// Engine settings that a layout test is allowed to change.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct WebViewSettings {
    pub app_cache_enabled: bool,
    pub page_cache_capacity: i32,
    pub xss_auditor_enabled: bool,
}

/// A device orientation reading injected by a test. An angle is only meaningful when the
/// matching `can_provide_*` flag is set.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct DeviceOrientation {
    pub can_provide_alpha: bool,
    pub alpha: f64,
    pub can_provide_beta: bool,
    pub beta: f64,
    pub can_provide_gamma: bool,
    pub gamma: f64,
}

impl DeviceOrientation {
    pub fn alpha(&self) -> Option<f64> {
        self.can_provide_alpha.then_some(self.alpha)
    }

    pub fn beta(&self) -> Option<f64> {
        self.can_provide_beta.then_some(self.beta)
    }

    pub fn gamma(&self) -> Option<f64> {
        self.can_provide_gamma.then_some(self.gamma)
    }
}

/// The web view a test is rendered into, as seen from the script thread.
///
/// Settings writes are synchronous: once a setter returns, [`TestWebView::settings`]
/// reflects the new value. Every method suffixed with `_async` posts work to the engine
/// thread and returns without waiting for it to run.
pub trait TestWebView: Send + Sync {
    fn settings(&self) -> WebViewSettings;
    fn set_app_cache_enabled(&self, enabled: bool);
    fn set_page_cache_capacity(&self, capacity: i32);
    fn set_xss_auditor_enabled(&self, enabled: bool);

    fn request_focus_async(&self);
    fn build_layer_async(&self);
    /// Pausing and resuming drawing is posted to the engine thread as well.
    fn set_drawing_paused(&self, paused: bool);
    fn show_find_dialog_async(&self, text: String);
    fn find_next_async(&self, forward: bool);
    fn hide_find_dialog_async(&self);

    /// A textual dump of the compositing layer tree. This is the one synchronous query.
    fn snapshot_layer_tree(&self) -> String;
    fn set_mock_device_orientation(&self, orientation: DeviceOrientation);
}

/// The engine's persistent web storage subsystem.
pub trait WebStorage: Send + Sync {
    fn delete_all_data(&self);
    fn set_app_cache_maximum_size(&self, size: i64);
    fn set_quota_for_origin(&self, origin: &str, quota: i64);
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct GeolocationPosition {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: f64,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct GeolocationError {
    pub code: i32,
    pub message: String,
}

/// What the mock geolocation provider hands the engine on its next request.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum GeolocationReading {
    Position(GeolocationPosition),
    Error(GeolocationError),
}

/// Source of injected geolocation readings. Each setter replaces the previous reading.
pub trait GeolocationMock: Send + Sync {
    fn set_error(&self, code: i32, message: String);
    fn set_position(&self, latitude: f64, longitude: f64, accuracy: f64);
    fn current(&self) -> Option<GeolocationReading>;
}

/// Events a running test sends to the harness driver.
///
/// The controller calls these while holding its own state lock, so an implementation
/// must not call back into the controller before returning.
pub trait DriverDelegate: Send + Sync {
    /// The test called `notifyDone()`.
    fn notify_done_from_test(&self);
    /// The test expressed its first geolocation permission decision.
    fn notify_geolocation_permission_set(&self);
    /// A recoverable error that should show up in the test output.
    fn report_error(&self, message: String);
}

/// Work posted from the script thread to the engine thread.
#[derive(Debug, IntoStaticStr)]
pub enum EngineMsg {
    RequestFocus,
    BuildLayer,
    SetDrawingPaused(bool),
    ShowFindDialog(String),
    FindNext(bool),
    HideFindDialog,
    SetMockDeviceOrientation(DeviceOrientation),
    /// The settings changed; the engine should re-read them.
    SettingsChanged(WebViewSettings),
    LayerTreeAsText(Sender<String>),
    Exit,
}

/// The rendering view, owned by and only ever touched on the engine thread.
pub trait EngineView {
    fn apply_settings(&mut self, settings: &WebViewSettings);
    fn focus(&mut self);
    fn build_layer(&mut self);
    fn set_drawing_paused(&mut self, paused: bool);
    fn show_find_dialog(&mut self, text: &str);
    fn find_next(&mut self, forward: bool);
    fn hide_find_dialog(&mut self);
    fn layer_tree_as_text(&mut self) -> String;
    fn set_mock_device_orientation(&mut self, orientation: DeviceOrientation);
}
