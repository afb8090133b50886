/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::sync::{Arc, LazyLock};

use layout_test_traits::{
    GeolocationError, GeolocationMock, GeolocationPosition, GeolocationReading,
};
use parking_lot::Mutex;

static MOCK_GEOLOCATION: LazyLock<Arc<MockGeolocation>> =
    LazyLock::new(|| Arc::new(MockGeolocation::default()));

/// Holds the single geolocation reading the engine receives while running layout tests.
///
/// Nothing resets it between tests. A driver that needs determinism calls
/// [`MockGeolocation::reset`] before each test.
#[derive(Default)]
pub struct MockGeolocation {
    reading: Mutex<Option<GeolocationReading>>,
}

impl MockGeolocation {
    /// The process-wide instance the engine reads from.
    pub fn instance() -> Arc<MockGeolocation> {
        MOCK_GEOLOCATION.clone()
    }

    pub fn reset(&self) {
        *self.reading.lock() = None;
    }
}

impl GeolocationMock for MockGeolocation {
    fn set_error(&self, code: i32, message: String) {
        *self.reading.lock() = Some(GeolocationReading::Error(GeolocationError { code, message }));
    }

    fn set_position(&self, latitude: f64, longitude: f64, accuracy: f64) {
        *self.reading.lock() = Some(GeolocationReading::Position(GeolocationPosition {
            latitude,
            longitude,
            accuracy,
        }));
    }

    fn current(&self) -> Option<GeolocationReading> {
        self.reading.lock().clone()
    }
}
