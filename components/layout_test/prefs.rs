/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Translation from the preference names fixtures pass to `overridePreference` into
//! engine setting changes.

use std::str::FromStr;

use layout_test_traits::TestWebView;
use log::debug;
use strum::{EnumString, IntoStaticStr};

/// The preferences a layout test can override. Any other key is accepted and ignored,
/// since many fixtures still probe keys that no longer exist.
#[derive(Clone, Copy, Debug, EnumString, Eq, IntoStaticStr, PartialEq)]
pub enum LayoutTestPreference {
    #[strum(serialize = "WebKitOfflineWebApplicationCacheEnabled")]
    OfflineWebApplicationCacheEnabled,
    #[strum(serialize = "WebKitUsesPageCachePreferenceKey")]
    UsesPageCache,
}

impl LayoutTestPreference {
    pub fn apply(self, web_view: &dyn TestWebView, value: bool) {
        match self {
            LayoutTestPreference::OfflineWebApplicationCacheEnabled => {
                web_view.set_app_cache_enabled(value)
            },
            // The capacity is saturated rather than toggled; a false value leaves the
            // page cache alone.
            LayoutTestPreference::UsesPageCache => {
                if value {
                    web_view.set_page_cache_capacity(i32::MAX);
                }
            },
        }
    }
}

/// Applies `value` to the setting behind `key`. Returns whether the key was recognized.
pub fn override_preference(web_view: &dyn TestWebView, key: &str, value: bool) -> bool {
    match LayoutTestPreference::from_str(key) {
        Ok(preference) => {
            preference.apply(web_view, value);
            true
        },
        Err(_) => {
            debug!("Ignoring override of unknown preference {key:?}");
            false
        },
    }
}
