/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::sync::Arc;

use layout_test_traits::{
    DeviceOrientation, DriverDelegate, GeolocationMock, TestWebView, WebStorage,
};
use log::{debug, info};
use parking_lot::Mutex;
use url::Url;

use crate::config::HarnessConfig;
use crate::error::ControllerError;
use crate::mock::MockGeolocation;
use crate::{prefs, resources};

/// Everything a single test can configure. Created with defaults when the test starts and
/// dropped with the controller.
#[derive(Clone, Debug, PartialEq)]
struct ControllerState {
    dump_as_text: bool,
    enable_pixel_test: bool,
    dump_child_frames_as_text: bool,
    dump_database_callbacks: bool,
    can_open_windows: bool,
    wait_until_done: bool,
    notify_done_seen: bool,
    geolocation_permission_set: bool,
    allow_geolocation: bool,
    xss_auditor_enabled: bool,
}

impl ControllerState {
    fn new(xss_auditor_enabled: bool) -> Self {
        Self {
            dump_as_text: false,
            enable_pixel_test: true,
            dump_child_frames_as_text: false,
            dump_database_callbacks: false,
            can_open_windows: false,
            wait_until_done: false,
            notify_done_seen: false,
            geolocation_permission_set: false,
            allow_geolocation: false,
            xss_auditor_enabled,
        }
    }

    fn begin_waiting(&mut self) -> Result<(), ControllerError> {
        if self.wait_until_done {
            return Err(ControllerError::WaitUntilDoneTwice);
        }
        if self.notify_done_seen {
            return Err(ControllerError::WaitUntilDoneAfterNotifyDone);
        }
        self.wait_until_done = true;
        Ok(())
    }

    fn dump_options(&self) -> DumpOptions {
        DumpOptions {
            as_text: self.dump_as_text,
            pixels: self.enable_pixel_test,
            child_frames_as_text: self.dump_child_frames_as_text,
            database_callbacks: self.dump_database_callbacks,
        }
    }
}

/// How the driver should dump the test, read in one consistent snapshot.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DumpOptions {
    pub as_text: bool,
    pub pixels: bool,
    pub child_frames_as_text: bool,
    pub database_callbacks: bool,
}

struct ControllerInner {
    /// Guards every flag. Held while notifying the driver, never while calling the view.
    state: Mutex<ControllerState>,
    /// Serializes `setXSSAuditorEnabled` so the engine setting and its mirror agree.
    /// Taken before the view's settings lock and before `state`.
    xss_auditor_update: Mutex<()>,
    web_view: Arc<dyn TestWebView>,
    storage: Arc<dyn WebStorage>,
    geolocation: Arc<dyn GeolocationMock>,
    driver: Arc<dyn DriverDelegate>,
    config: HarnessConfig,
}

pub struct LayoutTestControllerBuilder {
    web_view: Arc<dyn TestWebView>,
    storage: Arc<dyn WebStorage>,
    driver: Arc<dyn DriverDelegate>,
    geolocation: Option<Arc<dyn GeolocationMock>>,
    config: HarnessConfig,
}

impl LayoutTestControllerBuilder {
    pub fn new(
        web_view: Arc<dyn TestWebView>,
        storage: Arc<dyn WebStorage>,
        driver: Arc<dyn DriverDelegate>,
    ) -> Self {
        Self {
            web_view,
            storage,
            driver,
            geolocation: None,
            config: HarnessConfig::default(),
        }
    }

    /// Defaults to the process-wide [`MockGeolocation`].
    pub fn geolocation(mut self, geolocation: Arc<dyn GeolocationMock>) -> Self {
        self.geolocation = Some(geolocation);
        self
    }

    pub fn config(mut self, config: HarnessConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> LayoutTestController {
        let xss_auditor_enabled = self.web_view.settings().xss_auditor_enabled;
        let geolocation = self
            .geolocation
            .unwrap_or_else(|| MockGeolocation::instance() as Arc<dyn GeolocationMock>);
        LayoutTestController(Arc::new(ControllerInner {
            state: Mutex::new(ControllerState::new(xss_auditor_enabled)),
            xss_auditor_update: Mutex::new(()),
            web_view: self.web_view,
            storage: self.storage,
            geolocation,
            driver: self.driver,
            config: self.config,
        }))
    }
}

/// The driver's view of the controller for one test: read-only flags that decide how and
/// when the test is dumped.
///
/// The same state is mutated through the [`LayoutTestControllerScript`] handed to the
/// page, see [`LayoutTestController::script_object`]. Every read takes the state lock,
/// so a flag is observed in the order the script thread wrote it.
#[derive(Clone)]
pub struct LayoutTestController(Arc<ControllerInner>);

impl LayoutTestController {
    pub fn builder(
        web_view: Arc<dyn TestWebView>,
        storage: Arc<dyn WebStorage>,
        driver: Arc<dyn DriverDelegate>,
    ) -> LayoutTestControllerBuilder {
        LayoutTestControllerBuilder::new(web_view, storage, driver)
    }

    /// The object installed on the test's script global.
    pub fn script_object(&self) -> LayoutTestControllerScript {
        LayoutTestControllerScript(self.0.clone())
    }

    pub fn should_dump_as_text(&self) -> bool {
        self.0.state.lock().dump_as_text
    }

    pub fn should_test_pixels(&self) -> bool {
        self.0.state.lock().enable_pixel_test
    }

    pub fn should_dump_child_frames_as_text(&self) -> bool {
        self.0.state.lock().dump_child_frames_as_text
    }

    pub fn should_dump_database_callbacks(&self) -> bool {
        self.0.state.lock().dump_database_callbacks
    }

    pub fn should_open_windows(&self) -> bool {
        self.0.state.lock().can_open_windows
    }

    pub fn should_wait_until_done(&self) -> bool {
        self.0.state.lock().wait_until_done
    }

    pub fn should_respond_to_geolocation_permission_prompts(&self) -> bool {
        self.0.state.lock().geolocation_permission_set
    }

    /// Only meaningful once [`Self::should_respond_to_geolocation_permission_prompts`]
    /// is true.
    pub fn should_allow_geolocation_usage(&self) -> bool {
        self.0.state.lock().allow_geolocation
    }

    pub fn is_xss_auditor_enabled(&self) -> bool {
        self.0.state.lock().xss_auditor_enabled
    }

    /// All dump flags at once; `as_text` and `pixels` always come from the same write.
    pub fn dump_options(&self) -> DumpOptions {
        self.0.state.lock().dump_options()
    }

    /// Forces a text-only dump, for fixtures the driver knows cannot be pixel tested.
    pub fn set_should_dump_as_text(&self) {
        self.script_object().dump_as_text();
    }
}

/// The page's view of the controller. Methods never fail: anything the harness should
/// hear about goes through [`DriverDelegate::report_error`].
#[derive(Clone)]
pub struct LayoutTestControllerScript(Arc<ControllerInner>);

impl LayoutTestControllerScript {
    fn report(&self, error: ControllerError) {
        debug!("Reporting {:?} error: {error}", error.kind());
        self.0.driver.report_error(error.to_string());
    }

    /// Text dump without pixels.
    pub fn dump_as_text(&self) {
        self.dump_as_text_with_pixels(false);
    }

    pub fn dump_as_text_with_pixels(&self, enable_pixel_test: bool) {
        let mut state = self.0.state.lock();
        state.dump_as_text = true;
        state.enable_pixel_test = enable_pixel_test;
    }

    pub fn dump_child_frames_as_text(&self) {
        self.0.state.lock().dump_child_frames_as_text = true;
    }

    pub fn dump_database_callbacks(&self) {
        self.0.state.lock().dump_database_callbacks = true;
    }

    pub fn set_can_open_windows(&self) {
        self.0.state.lock().can_open_windows = true;
    }

    /// Defers the dump until [`Self::notify_done`]. Calling it twice, or after
    /// `notifyDone`, is reported and leaves the state untouched.
    pub fn wait_until_done(&self) {
        let mut state = self.0.state.lock();
        if let Err(error) = state.begin_waiting() {
            self.report(error);
        }
    }

    /// Whether this ends the test is up to the driver: it only matters if the test is
    /// waiting.
    pub fn notify_done(&self) {
        let mut state = self.0.state.lock();
        state.notify_done_seen = true;
        info!("Test called notifyDone (waiting: {})", state.wait_until_done);
        self.0.driver.notify_done_from_test();
    }

    pub fn set_geolocation_permission(&self, allow: bool) {
        let mut state = self.0.state.lock();
        state.allow_geolocation = allow;
        if !state.geolocation_permission_set {
            state.geolocation_permission_set = true;
            info!("Test set geolocation permission (allow: {allow})");
            self.0.driver.notify_geolocation_permission_set();
        }
    }

    pub fn set_xss_auditor_enabled(&self, enabled: bool) {
        let _update = self.0.xss_auditor_update.lock();
        self.0.web_view.set_xss_auditor_enabled(enabled);
        self.0.state.lock().xss_auditor_enabled = enabled;
    }

    pub fn clear_all_databases(&self) {
        self.0.storage.delete_all_data();
    }

    pub fn set_app_cache_maximum_size(&self, size: i64) {
        self.0.storage.set_app_cache_maximum_size(size);
    }

    /// Sets the quota of the configured sentinel origin, an empty-path file URI unless the
    /// harness says otherwise.
    pub fn set_database_quota(&self, quota: i64) {
        self.0
            .storage
            .set_quota_for_origin(&self.0.config.database_quota_origin, quota);
    }

    pub fn set_database_quota_for_origin(&self, origin: &Url, quota: i64) {
        self.0
            .storage
            .set_quota_for_origin(&origin.origin().ascii_serialization(), quota);
    }

    pub fn override_preference(&self, key: &str, value: bool) {
        prefs::override_preference(&*self.0.web_view, key, value);
    }

    pub fn set_mock_device_orientation(
        &self,
        can_provide_alpha: bool,
        alpha: f64,
        can_provide_beta: bool,
        beta: f64,
        can_provide_gamma: bool,
        gamma: f64,
    ) {
        self.0
            .web_view
            .set_mock_device_orientation(DeviceOrientation {
                can_provide_alpha,
                alpha,
                can_provide_beta,
                beta,
                can_provide_gamma,
                gamma,
            });
    }

    pub fn set_mock_geolocation_error(&self, code: i32, message: String) {
        self.0.geolocation.set_error(code, message);
    }

    pub fn set_mock_geolocation_position(&self, latitude: f64, longitude: f64, accuracy: f64) {
        self.0.geolocation.set_position(latitude, longitude, accuracy);
    }

    pub fn set_always_accept_cookies(&self, always_accept: bool) {
        if always_accept {
            self.report(ControllerError::AlwaysAcceptCookiesUnimplemented);
        }
    }

    // TODO: fixtures expect this to be synchronous, and unfocusing is not supported.
    pub fn set_window_is_key(&self, is_key: bool) {
        if is_key {
            self.0.web_view.request_focus_async();
        } else {
            debug!("setWindowIsKey(false) is not supported");
        }
    }

    pub fn display(&self) {
        self.0.web_view.build_layer_async();
    }

    /// The whole view is redisplayed.
    pub fn display_invalidated_region(&self) {
        self.display();
    }

    pub fn pause_drawing(&self) {
        self.0.web_view.set_drawing_paused(true);
    }

    pub fn resume_drawing(&self) {
        self.0.web_view.set_drawing_paused(false);
    }

    pub fn show_find_dialog(&self, text: String) {
        self.0.web_view.show_find_dialog_async(text);
    }

    pub fn find_next(&self, forward: bool) {
        self.0.web_view.find_next_async(forward);
    }

    pub fn hide_find_dialog(&self) {
        self.0.web_view.hide_find_dialog_async();
    }

    pub fn layer_tree_as_text(&self) -> String {
        self.0.web_view.snapshot_layer_tree()
    }

    pub fn path_to_local_resource(&self, name: &str) -> String {
        resources::path_to_local_resource(&self.0.config.sandbox_root, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state() {
        let state = ControllerState::new(false);
        assert_eq!(
            state.dump_options(),
            DumpOptions {
                as_text: false,
                pixels: true,
                child_frames_as_text: false,
                database_callbacks: false,
            }
        );
        assert!(!state.wait_until_done);
        assert!(!state.notify_done_seen);
        assert!(!state.geolocation_permission_set);
    }

    #[test]
    fn begin_waiting_checks_both_completion_flags() {
        let mut state = ControllerState::new(false);
        assert_eq!(state.begin_waiting(), Ok(()));
        assert_eq!(
            state.begin_waiting(),
            Err(ControllerError::WaitUntilDoneTwice)
        );
        assert!(state.wait_until_done);

        let mut state = ControllerState::new(false);
        state.notify_done_seen = true;
        assert_eq!(
            state.begin_waiting(),
            Err(ControllerError::WaitUntilDoneAfterNotifyDone)
        );
        assert!(!state.wait_until_done);
    }

    #[test]
    fn double_wait_after_notify_reports_the_double_wait() {
        let mut state = ControllerState::new(false);
        state.begin_waiting().unwrap();
        state.notify_done_seen = true;
        assert_eq!(
            state.begin_waiting(),
            Err(ControllerError::WaitUntilDoneTwice)
        );
    }
}
