/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Name-based entry point for the bindings layer that exposes
//! [`LayoutTestControllerScript`] to page script.

use std::str::FromStr;

use strum::{EnumString, IntoStaticStr};

use crate::controller::LayoutTestControllerScript;
use crate::error::DispatchError;

/// The primitive values that cross the script bridge.
#[derive(Clone, Debug, PartialEq)]
pub enum ScriptValue {
    Undefined,
    Boolean(bool),
    Number(f64),
    String(String),
}

impl ScriptValue {
    /// Script truthiness.
    pub fn to_boolean(&self) -> bool {
        match self {
            ScriptValue::Undefined => false,
            ScriptValue::Boolean(value) => *value,
            ScriptValue::Number(value) => *value != 0.0 && !value.is_nan(),
            ScriptValue::String(value) => !value.is_empty(),
        }
    }
}

impl From<bool> for ScriptValue {
    fn from(value: bool) -> Self {
        ScriptValue::Boolean(value)
    }
}

impl From<f64> for ScriptValue {
    fn from(value: f64) -> Self {
        ScriptValue::Number(value)
    }
}

impl From<&str> for ScriptValue {
    fn from(value: &str) -> Self {
        ScriptValue::String(value.to_owned())
    }
}

impl From<String> for ScriptValue {
    fn from(value: String) -> Self {
        ScriptValue::String(value)
    }
}

/// Every method a fixture can call, under the name it calls it by.
#[derive(Clone, Copy, Debug, EnumString, Eq, IntoStaticStr, PartialEq)]
#[strum(serialize_all = "camelCase")]
pub enum ScriptMethod {
    DumpAsText,
    DumpChildFramesAsText,
    DumpDatabaseCallbacks,
    SetCanOpenWindows,
    WaitUntilDone,
    NotifyDone,
    SetGeolocationPermission,
    #[strum(serialize = "setXSSAuditorEnabled")]
    SetXssAuditorEnabled,
    ClearAllDatabases,
    SetAppCacheMaximumSize,
    SetDatabaseQuota,
    OverridePreference,
    SetMockDeviceOrientation,
    SetMockGeolocationError,
    SetMockGeolocationPosition,
    SetAlwaysAcceptCookies,
    SetWindowIsKey,
    Display,
    DisplayInvalidatedRegion,
    PauseDrawing,
    ResumeDrawing,
    ShowFindDialog,
    FindNext,
    HideFindDialog,
    LayerTreeAsText,
    PathToLocalResource,
}

struct Arguments<'a> {
    method: &'static str,
    values: &'a [ScriptValue],
}

impl Arguments<'_> {
    fn expect_count(&self, expected: usize) -> Result<(), DispatchError> {
        if self.values.len() == expected {
            return Ok(());
        }
        Err(DispatchError::WrongArgumentCount {
            method: self.method,
            expected,
            found: self.values.len(),
        })
    }

    fn boolean(&self, index: usize) -> bool {
        self.values[index].to_boolean()
    }

    fn number(&self, index: usize) -> Result<f64, DispatchError> {
        match &self.values[index] {
            ScriptValue::Number(value) => Ok(*value),
            _ => Err(self.invalid(index, "number")),
        }
    }

    /// Integral arguments truncate toward zero; non-finite values are rejected.
    fn integer(&self, index: usize) -> Result<i64, DispatchError> {
        let value = self.number(index)?;
        if !value.is_finite() {
            return Err(self.invalid(index, "finite number"));
        }
        Ok(value.trunc() as i64)
    }

    fn string(&self, index: usize) -> Result<String, DispatchError> {
        match &self.values[index] {
            ScriptValue::String(value) => Ok(value.clone()),
            _ => Err(self.invalid(index, "string")),
        }
    }

    fn invalid(&self, index: usize, expected: &'static str) -> DispatchError {
        DispatchError::InvalidArgument {
            method: self.method,
            index,
            expected,
        }
    }
}

impl LayoutTestControllerScript {
    /// Calls the method named `name`. Errors describe a malformed call; they are the
    /// bindings layer's to raise, the method itself was not run.
    pub fn invoke(&self, name: &str, args: &[ScriptValue]) -> Result<ScriptValue, DispatchError> {
        let method = ScriptMethod::from_str(name)
            .map_err(|_| DispatchError::UnknownMethod(name.to_owned()))?;
        let args = Arguments {
            method: method.into(),
            values: args,
        };

        match method {
            ScriptMethod::DumpAsText => match args.values.len() {
                0 => self.dump_as_text(),
                1 => self.dump_as_text_with_pixels(args.boolean(0)),
                _ => args.expect_count(1)?,
            },
            ScriptMethod::DumpChildFramesAsText => {
                args.expect_count(0)?;
                self.dump_child_frames_as_text();
            },
            ScriptMethod::DumpDatabaseCallbacks => {
                args.expect_count(0)?;
                self.dump_database_callbacks();
            },
            ScriptMethod::SetCanOpenWindows => {
                args.expect_count(0)?;
                self.set_can_open_windows();
            },
            ScriptMethod::WaitUntilDone => {
                args.expect_count(0)?;
                self.wait_until_done();
            },
            ScriptMethod::NotifyDone => {
                args.expect_count(0)?;
                self.notify_done();
            },
            ScriptMethod::SetGeolocationPermission => {
                args.expect_count(1)?;
                self.set_geolocation_permission(args.boolean(0));
            },
            ScriptMethod::SetXssAuditorEnabled => {
                args.expect_count(1)?;
                self.set_xss_auditor_enabled(args.boolean(0));
            },
            ScriptMethod::ClearAllDatabases => {
                args.expect_count(0)?;
                self.clear_all_databases();
            },
            ScriptMethod::SetAppCacheMaximumSize => {
                args.expect_count(1)?;
                self.set_app_cache_maximum_size(args.integer(0)?);
            },
            ScriptMethod::SetDatabaseQuota => {
                args.expect_count(1)?;
                self.set_database_quota(args.integer(0)?);
            },
            ScriptMethod::OverridePreference => {
                args.expect_count(2)?;
                self.override_preference(&args.string(0)?, args.boolean(1));
            },
            ScriptMethod::SetMockDeviceOrientation => {
                args.expect_count(6)?;
                self.set_mock_device_orientation(
                    args.boolean(0),
                    args.number(1)?,
                    args.boolean(2),
                    args.number(3)?,
                    args.boolean(4),
                    args.number(5)?,
                );
            },
            ScriptMethod::SetMockGeolocationError => {
                args.expect_count(2)?;
                self.set_mock_geolocation_error(args.integer(0)? as i32, args.string(1)?);
            },
            ScriptMethod::SetMockGeolocationPosition => {
                args.expect_count(3)?;
                self.set_mock_geolocation_position(
                    args.number(0)?,
                    args.number(1)?,
                    args.number(2)?,
                );
            },
            ScriptMethod::SetAlwaysAcceptCookies => {
                args.expect_count(1)?;
                self.set_always_accept_cookies(args.boolean(0));
            },
            ScriptMethod::SetWindowIsKey => {
                args.expect_count(1)?;
                self.set_window_is_key(args.boolean(0));
            },
            ScriptMethod::Display => {
                args.expect_count(0)?;
                self.display();
            },
            ScriptMethod::DisplayInvalidatedRegion => {
                args.expect_count(0)?;
                self.display_invalidated_region();
            },
            ScriptMethod::PauseDrawing => {
                args.expect_count(0)?;
                self.pause_drawing();
            },
            ScriptMethod::ResumeDrawing => {
                args.expect_count(0)?;
                self.resume_drawing();
            },
            ScriptMethod::ShowFindDialog => {
                args.expect_count(1)?;
                self.show_find_dialog(args.string(0)?);
            },
            ScriptMethod::FindNext => {
                args.expect_count(1)?;
                self.find_next(args.boolean(0));
            },
            ScriptMethod::HideFindDialog => {
                args.expect_count(0)?;
                self.hide_find_dialog();
            },
            ScriptMethod::LayerTreeAsText => {
                args.expect_count(0)?;
                return Ok(ScriptValue::String(self.layer_tree_as_text()));
            },
            ScriptMethod::PathToLocalResource => {
                args.expect_count(1)?;
                return Ok(ScriptValue::String(
                    self.path_to_local_resource(&args.string(0)?),
                ));
            },
        }
        Ok(ScriptValue::Undefined)
    }
}
