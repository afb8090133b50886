/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

use std::io;

/// How a problem raised by a test is treated by the harness.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// The test drove the completion handshake in an illegal order.
    ProtocolMisuse,
    /// The test asked for something the harness does not provide.
    Unimplemented,
    /// Accepted without effect and never reported.
    Ignored,
}

/// Recoverable problems that are reported to the driver instead of surfacing in the page.
/// The `Display` output is the message that ends up in the test output.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ControllerError {
    #[error("Test set waitUntilDone multiple times.")]
    WaitUntilDoneTwice,
    #[error("Test tried to waitUntilDone after notifyDone.")]
    WaitUntilDoneAfterNotifyDone,
    #[error("Always accepting cookies not implemented.")]
    AlwaysAcceptCookiesUnimplemented,
}

impl ControllerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ControllerError::WaitUntilDoneTwice |
            ControllerError::WaitUntilDoneAfterNotifyDone => ErrorKind::ProtocolMisuse,
            ControllerError::AlwaysAcceptCookiesUnimplemented => ErrorKind::Unimplemented,
        }
    }
}

/// Errors while loading a [`crate::HarnessConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read harness config: {0}")]
    Io(#[from] io::Error),
    #[error("invalid harness config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failures of the script bridge itself, surfaced by the bindings layer as a script
/// exception. The controller methods behind the bridge never fail.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum DispatchError {
    #[error("layoutTestController has no method named {0:?}")]
    UnknownMethod(String),
    #[error("{method} expects {expected} argument(s) but was given {found}")]
    WrongArgumentCount {
        method: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("argument {index} of {method} must be a {expected}")]
    InvalidArgument {
        method: &'static str,
        index: usize,
        expected: &'static str,
    },
}

/// The engine thread is no longer receiving messages.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("engine thread has shut down")]
    Disconnected,
    #[error("engine thread did not answer in time")]
    Timeout,
}
