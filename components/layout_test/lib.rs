/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The `layoutTestController` object that layout test fixtures use to reconfigure the
//! harness they run in.
//!
//! A [`LayoutTestController`] is created for every test and shared by three threads:
//!
//! - the script thread calls the mutators on [`LayoutTestControllerScript`], usually
//!   through [`LayoutTestControllerScript::invoke`];
//! - the engine thread owns the view, and only ever receives posted work (see
//!   [`EngineWebView`]);
//! - the driver thread reads the `should_*` flags and waits for completion (see
//!   [`TestDriver`]).
//!
//! ## Known limitations
//!
//! `display()`, `setWindowIsKey()` and friends are asynchronous posts, even though
//! fixtures were written against a harness where they were synchronous. A fixture that
//! relies on the view having repainted before its next statement may be flaky.

#![deny(unsafe_code)]

mod config;
mod controller;
mod driver;
mod engine;
mod error;
mod mock;
mod prefs;
mod resources;
mod script;

pub use layout_test_traits::{
    DeviceOrientation, DriverDelegate, EngineMsg, EngineView, GeolocationError, GeolocationMock,
    GeolocationPosition, GeolocationReading, TestWebView, WebStorage, WebViewSettings,
};

pub use crate::config::HarnessConfig;
pub use crate::controller::{
    DumpOptions, LayoutTestController, LayoutTestControllerBuilder, LayoutTestControllerScript,
};
pub use crate::driver::{
    Completion, DriverChannel, DriverEvent, GeolocationPromptResponder, TestDriver,
};
pub use crate::engine::EngineWebView;
pub use crate::error::{ConfigError, ControllerError, DispatchError, EngineError, ErrorKind};
pub use crate::mock::MockGeolocation;
pub use crate::prefs::{LayoutTestPreference, override_preference};
pub use crate::resources::path_to_local_resource;
pub use crate::script::{ScriptMethod, ScriptValue};
