/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Recording stand-ins for the collaborators a controller is bound to.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use layout_test::{
    DeviceOrientation, DriverDelegate, HarnessConfig, LayoutTestController,
    LayoutTestControllerScript, MockGeolocation, TestWebView, WebStorage, WebViewSettings,
};
use parking_lot::Mutex;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Default)]
pub struct RecordingDriver {
    notify_done: AtomicUsize,
    permission_set: AtomicUsize,
    errors: Mutex<Vec<String>>,
}

impl RecordingDriver {
    pub fn notify_done_count(&self) -> usize {
        self.notify_done.load(Ordering::SeqCst)
    }

    pub fn permission_set_count(&self) -> usize {
        self.permission_set.load(Ordering::SeqCst)
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().clone()
    }
}

impl DriverDelegate for RecordingDriver {
    fn notify_done_from_test(&self) {
        self.notify_done.fetch_add(1, Ordering::SeqCst);
    }

    fn notify_geolocation_permission_set(&self) {
        self.permission_set.fetch_add(1, Ordering::SeqCst);
    }

    fn report_error(&self, message: String) {
        self.errors.lock().push(message);
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ViewCall {
    SetAppCacheEnabled(bool),
    SetPageCacheCapacity(i32),
    SetXssAuditorEnabled(bool),
    RequestFocus,
    BuildLayer,
    SetDrawingPaused(bool),
    ShowFindDialog(String),
    FindNext(bool),
    HideFindDialog,
    SnapshotLayerTree,
    SetMockDeviceOrientation(DeviceOrientation),
}

#[derive(Default)]
pub struct RecordingWebView {
    settings: Mutex<WebViewSettings>,
    calls: Mutex<Vec<ViewCall>>,
}

impl RecordingWebView {
    pub fn with_settings(settings: WebViewSettings) -> Self {
        Self {
            settings: Mutex::new(settings),
            calls: Mutex::default(),
        }
    }

    pub fn calls(&self) -> Vec<ViewCall> {
        self.calls.lock().clone()
    }

    fn record(&self, call: ViewCall) {
        self.calls.lock().push(call);
    }
}

impl TestWebView for RecordingWebView {
    fn settings(&self) -> WebViewSettings {
        self.settings.lock().clone()
    }

    fn set_app_cache_enabled(&self, enabled: bool) {
        self.settings.lock().app_cache_enabled = enabled;
        self.record(ViewCall::SetAppCacheEnabled(enabled));
    }

    fn set_page_cache_capacity(&self, capacity: i32) {
        self.settings.lock().page_cache_capacity = capacity;
        self.record(ViewCall::SetPageCacheCapacity(capacity));
    }

    fn set_xss_auditor_enabled(&self, enabled: bool) {
        self.settings.lock().xss_auditor_enabled = enabled;
        self.record(ViewCall::SetXssAuditorEnabled(enabled));
    }

    fn request_focus_async(&self) {
        self.record(ViewCall::RequestFocus);
    }

    fn build_layer_async(&self) {
        self.record(ViewCall::BuildLayer);
    }

    fn set_drawing_paused(&self, paused: bool) {
        self.record(ViewCall::SetDrawingPaused(paused));
    }

    fn show_find_dialog_async(&self, text: String) {
        self.record(ViewCall::ShowFindDialog(text));
    }

    fn find_next_async(&self, forward: bool) {
        self.record(ViewCall::FindNext(forward));
    }

    fn hide_find_dialog_async(&self) {
        self.record(ViewCall::HideFindDialog);
    }

    fn snapshot_layer_tree(&self) -> String {
        self.record(ViewCall::SnapshotLayerTree);
        "(GraphicsLayer\n  (bounds 800.00 600.00)\n)\n".to_owned()
    }

    fn set_mock_device_orientation(&self, orientation: DeviceOrientation) {
        self.record(ViewCall::SetMockDeviceOrientation(orientation));
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum StorageCall {
    DeleteAllData,
    SetAppCacheMaximumSize(i64),
    SetQuotaForOrigin(String, i64),
}

#[derive(Default)]
pub struct RecordingStorage {
    calls: Mutex<Vec<StorageCall>>,
}

impl RecordingStorage {
    pub fn calls(&self) -> Vec<StorageCall> {
        self.calls.lock().clone()
    }
}

impl WebStorage for RecordingStorage {
    fn delete_all_data(&self) {
        self.calls.lock().push(StorageCall::DeleteAllData);
    }

    fn set_app_cache_maximum_size(&self, size: i64) {
        self.calls.lock().push(StorageCall::SetAppCacheMaximumSize(size));
    }

    fn set_quota_for_origin(&self, origin: &str, quota: i64) {
        self.calls
            .lock()
            .push(StorageCall::SetQuotaForOrigin(origin.to_owned(), quota));
    }
}

/// A controller wired to recording collaborators.
pub struct TestHarness {
    pub controller: LayoutTestController,
    pub script: LayoutTestControllerScript,
    pub driver: Arc<RecordingDriver>,
    pub web_view: Arc<RecordingWebView>,
    pub storage: Arc<RecordingStorage>,
    pub geolocation: Arc<MockGeolocation>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with(RecordingWebView::default(), HarnessConfig::default())
    }

    pub fn with(web_view: RecordingWebView, config: HarnessConfig) -> Self {
        init_logging();
        let driver = Arc::new(RecordingDriver::default());
        let web_view = Arc::new(web_view);
        let storage = Arc::new(RecordingStorage::default());
        let geolocation = Arc::new(MockGeolocation::default());
        let controller =
            LayoutTestController::builder(web_view.clone(), storage.clone(), driver.clone())
                .geolocation(geolocation.clone())
                .config(config)
                .build();
        let script = controller.script_object();
        Self {
            controller,
            script,
            driver,
            web_view,
            storage,
            geolocation,
        }
    }
}
