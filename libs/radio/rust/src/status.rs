/*
 * Copyright (C) 2020 The Android Open Source Project
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *      http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

//! Error vocabulary of the radio API.
//!
//! Older operations report a [`RadioStatus`] code; newer ones fail with a
//! [`TunerError`]. Neither exposes the binder transport types directly.

use crate::types::Band;

use std::result;

use thiserror::Error;

/// Status code returned when an operation succeeds.
pub const STATUS_OK: i32 = 0;

/// Failure codes of the status-returning radio operations.
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum RadioStatus {
    #[error("error")]
    Error = i32::MIN,
    #[error("permission denied")]
    PermissionDenied = -1,
    #[error("not initialized")]
    NoInit = -19,
    #[error("bad value")]
    BadValue = -22,
    #[error("dead object")]
    DeadObject = -32,
    #[error("invalid operation")]
    InvalidOperation = -38,
    #[error("timed out")]
    TimedOut = -110,
}

impl RadioStatus {
    pub fn to_raw(self) -> i32 {
        self as i32
    }

    /// Map a raw status code back, with [`STATUS_OK`] as `Ok(())`. Unknown
    /// codes become [`RadioStatus::Error`].
    pub fn from_raw(raw: i32) -> result::Result<(), RadioStatus> {
        match raw {
            STATUS_OK => Ok(()),
            -1 => Err(RadioStatus::PermissionDenied),
            -19 => Err(RadioStatus::NoInit),
            -22 => Err(RadioStatus::BadValue),
            -32 => Err(RadioStatus::DeadObject),
            -38 => Err(RadioStatus::InvalidOperation),
            -110 => Err(RadioStatus::TimedOut),
            _ => Err(RadioStatus::Error),
        }
    }
}

/// Flatten a status-surface result into its integer code.
pub fn status_code<T>(result: &result::Result<T, RadioStatus>) -> i32 {
    match result {
        Ok(_) => STATUS_OK,
        Err(status) => status.to_raw(),
    }
}

/// Opaque cause of a remote failure, reachable through
/// [`std::error::Error::source`].
#[derive(Debug, Error)]
#[error(transparent)]
pub struct RemoteError(binder::Status);

impl From<binder::Status> for RemoteError {
    fn from(status: binder::Status) -> RemoteError {
        RemoteError(status)
    }
}

/// Failures of the value-returning tuner operations.
#[derive(Debug, Error)]
pub enum TunerError {
    /// The call was rejected before or by the tuner because of an argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The tuner cannot do this in its current state.
    #[error("illegal state: {0}")]
    IllegalState(String),

    /// The tuner was closed through this adapter.
    #[error("tuner is closed")]
    Closed,

    /// The radio service could not be reached.
    #[error("service died")]
    ServiceDied {
        #[source]
        source: RemoteError,
    },

    /// Any other remote failure.
    #[error("remote failure")]
    Remote {
        #[source]
        source: RemoteError,
    },
}

/// Why an AM/FM selector could not be built.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SelectorError {
    #[error("sub-channel {0} is out of range")]
    SubChannelOutOfRange(i32),

    #[error("sub-channels are not supported on {0:?}")]
    SubChannelWithoutHd(Band),

    #[error("{frequency_khz} kHz is not a valid {band:?} frequency")]
    FrequencyOutOfRange { band: Band, frequency_khz: i32 },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn raw_status_codes() {
        assert_eq!(RadioStatus::BadValue.to_raw(), -22);
        assert_eq!(RadioStatus::DeadObject.to_raw(), -32);
        assert_eq!(RadioStatus::InvalidOperation.to_raw(), -38);
        assert_eq!(RadioStatus::Error.to_raw(), i32::MIN);
        assert_eq!(RadioStatus::from_raw(0), Ok(()));
        assert_eq!(RadioStatus::from_raw(-19), Err(RadioStatus::NoInit));
        assert_eq!(RadioStatus::from_raw(42), Err(RadioStatus::Error));
        assert_eq!(status_code::<()>(&Ok(())), STATUS_OK);
        assert_eq!(status_code::<()>(&Err(RadioStatus::TimedOut)), -110);
    }

    #[test]
    fn service_died_keeps_cause() {
        let err = TunerError::ServiceDied {
            source: binder::Status::from(binder::StatusCode::DEAD_OBJECT).into(),
        };
        assert_eq!(err.to_string(), "service died");
        let cause = err.source().unwrap();
        assert!(cause.to_string().contains("dead object"));
    }
}
