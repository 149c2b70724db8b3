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

use crate::parcel::{Parcel, Parcelable};

use std::fmt;
use std::result;

use thiserror::Error;

/// Raw status value as carried over the wire.
#[allow(non_camel_case_types)]
pub type status_t = i32;

/// Low-level status codes from Android `libutils`.
// All error codes are negative integer values. Derived from the anonymous enum
// in utils/Errors.h
#[allow(non_camel_case_types, clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum StatusCode {
    #[error("ok")]
    OK = 0,
    #[error("unknown error")]
    UNKNOWN_ERROR = i32::MIN,
    #[error("no memory")]
    NO_MEMORY = -12,
    #[error("invalid operation")]
    INVALID_OPERATION = -38,
    #[error("bad value")]
    BAD_VALUE = -22,
    #[error("bad type")]
    BAD_TYPE = i32::MIN + 1,
    #[error("name not found")]
    NAME_NOT_FOUND = -2,
    #[error("permission denied")]
    PERMISSION_DENIED = -1,
    #[error("no init")]
    NO_INIT = -19,
    #[error("already exists")]
    ALREADY_EXISTS = -17,
    #[error("dead object")]
    DEAD_OBJECT = -32,
    #[error("failed transaction")]
    FAILED_TRANSACTION = i32::MIN + 2,
    #[error("bad index")]
    BAD_INDEX = -75,
    #[error("not enough data")]
    NOT_ENOUGH_DATA = -61,
    #[error("would block")]
    WOULD_BLOCK = -11,
    #[error("timed out")]
    TIMED_OUT = -110,
    #[error("unknown transaction")]
    UNKNOWN_TRANSACTION = -74,
    #[error("fds not allowed")]
    FDS_NOT_ALLOWED = i32::MIN + 7,
    #[error("unexpected null")]
    UNEXPECTED_NULL = i32::MIN + 8,
}

impl StatusCode {
    const ALL: [StatusCode; 19] = [
        StatusCode::OK,
        StatusCode::UNKNOWN_ERROR,
        StatusCode::NO_MEMORY,
        StatusCode::INVALID_OPERATION,
        StatusCode::BAD_VALUE,
        StatusCode::BAD_TYPE,
        StatusCode::NAME_NOT_FOUND,
        StatusCode::PERMISSION_DENIED,
        StatusCode::NO_INIT,
        StatusCode::ALREADY_EXISTS,
        StatusCode::DEAD_OBJECT,
        StatusCode::FAILED_TRANSACTION,
        StatusCode::BAD_INDEX,
        StatusCode::NOT_ENOUGH_DATA,
        StatusCode::WOULD_BLOCK,
        StatusCode::TIMED_OUT,
        StatusCode::UNKNOWN_TRANSACTION,
        StatusCode::FDS_NOT_ALLOWED,
        StatusCode::UNEXPECTED_NULL,
    ];

    /// Map a raw [`status_t`] onto a known code. Unrecognized values become
    /// `UNKNOWN_ERROR`.
    pub fn from_raw(status: status_t) -> StatusCode {
        StatusCode::ALL
            .iter()
            .copied()
            .find(|code| *code as status_t == status)
            .unwrap_or(StatusCode::UNKNOWN_ERROR)
    }
}

/// Convert a raw [`status_t`] error code to the idiomatic Rust result type.
pub fn status_result(status: status_t) -> result::Result<(), StatusCode> {
    match StatusCode::from_raw(status) {
        StatusCode::OK => Ok(()),
        code => Err(code),
    }
}

/// Exception codes carried in the header of an AIDL reply.
#[allow(non_camel_case_types, clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ExceptionCode {
    NONE = 0,
    SECURITY = -1,
    BAD_PARCELABLE = -2,
    ILLEGAL_ARGUMENT = -3,
    NULL_POINTER = -4,
    ILLEGAL_STATE = -5,
    NETWORK_MAIN_THREAD = -6,
    UNSUPPORTED_OPERATION = -7,
    SERVICE_SPECIFIC = -8,
    PARCELABLE = -9,
    /// Not an exception thrown by the service: the transaction itself did not
    /// complete. The accompanying [`StatusCode`] says why.
    TRANSACTION_FAILED = -129,
}

impl ExceptionCode {
    const ALL: [ExceptionCode; 11] = [
        ExceptionCode::NONE,
        ExceptionCode::SECURITY,
        ExceptionCode::BAD_PARCELABLE,
        ExceptionCode::ILLEGAL_ARGUMENT,
        ExceptionCode::NULL_POINTER,
        ExceptionCode::ILLEGAL_STATE,
        ExceptionCode::NETWORK_MAIN_THREAD,
        ExceptionCode::UNSUPPORTED_OPERATION,
        ExceptionCode::SERVICE_SPECIFIC,
        ExceptionCode::PARCELABLE,
        ExceptionCode::TRANSACTION_FAILED,
    ];

    pub fn from_raw(code: i32) -> Option<ExceptionCode> {
        ExceptionCode::ALL.iter().copied().find(|e| *e as i32 == code)
    }
}

/// How a failed remote call should be treated by a client adapter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The remote refused one of the arguments.
    ArgumentRejected,
    /// The call is not valid in the remote's current state.
    StateRejected,
    /// The remote could not be reached; cached handles to it are stale.
    Unreachable,
    /// Any other remote failure (security, service specific, ...).
    Other,
}

/// Outcome of a binder call: an exception code, and for transaction failures
/// the transport [`StatusCode`].
#[derive(Clone, PartialEq, Eq)]
pub struct Status {
    exception: ExceptionCode,
    transaction_error: StatusCode,
    service_specific_error: i32,
    message: Option<String>,
}

/// A specialized [`Result`](result::Result) for binder interface methods.
pub type Result<T> = result::Result<T, Status>;

impl Status {
    /// A successful status.
    pub fn ok() -> Self {
        Status {
            exception: ExceptionCode::NONE,
            transaction_error: StatusCode::OK,
            service_specific_error: 0,
            message: None,
        }
    }

    /// An exception raised by the remote implementation.
    ///
    /// Use [`Status::from`] with a [`StatusCode`] for transport failures
    /// instead.
    pub fn new_exception(exception: ExceptionCode, message: Option<&str>) -> Self {
        if exception == ExceptionCode::NONE {
            return Status::ok();
        }
        Status {
            exception,
            transaction_error: if exception == ExceptionCode::TRANSACTION_FAILED {
                StatusCode::UNKNOWN_ERROR
            } else {
                StatusCode::OK
            },
            service_specific_error: 0,
            message: message.map(str::to_owned),
        }
    }

    pub fn new_service_specific_error(code: i32, message: Option<&str>) -> Self {
        Status {
            exception: ExceptionCode::SERVICE_SPECIFIC,
            transaction_error: StatusCode::OK,
            service_specific_error: code,
            message: message.map(str::to_owned),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.exception == ExceptionCode::NONE
    }

    pub fn exception_code(&self) -> ExceptionCode {
        self.exception
    }

    /// The transport failure, or `OK` unless the exception is
    /// `TRANSACTION_FAILED`.
    pub fn transaction_error(&self) -> StatusCode {
        self.transaction_error
    }

    pub fn service_specific_error(&self) -> i32 {
        self.service_specific_error
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Classify a failed status. Returns `None` for a successful status.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self.exception {
            ExceptionCode::NONE => None,
            ExceptionCode::ILLEGAL_ARGUMENT | ExceptionCode::NULL_POINTER => {
                Some(FailureKind::ArgumentRejected)
            }
            ExceptionCode::ILLEGAL_STATE | ExceptionCode::UNSUPPORTED_OPERATION => {
                Some(FailureKind::StateRejected)
            }
            ExceptionCode::TRANSACTION_FAILED => match self.transaction_error {
                StatusCode::DEAD_OBJECT | StatusCode::FAILED_TRANSACTION => {
                    Some(FailureKind::Unreachable)
                }
                // Marshalling errors on either side; the remote is still there.
                _ => Some(FailureKind::Other),
            },
            _ => Some(FailureKind::Other),
        }
    }

    /// Whether the remote end can no longer be reached through this handle.
    pub fn is_unreachable(&self) -> bool {
        self.failure_kind() == Some(FailureKind::Unreachable)
    }
}

impl fmt::Debug for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Status");
        s.field("exception", &self.exception);
        if self.exception == ExceptionCode::TRANSACTION_FAILED {
            s.field("transaction_error", &self.transaction_error);
        }
        if self.exception == ExceptionCode::SERVICE_SPECIFIC {
            s.field("service_specific_error", &self.service_specific_error);
        }
        s.field("message", &self.message).finish()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Status({}, {:?}): ", self.exception as i32, self.exception)?;
        match self.exception {
            ExceptionCode::TRANSACTION_FAILED => write!(f, "{}", self.transaction_error)?,
            ExceptionCode::SERVICE_SPECIFIC => write!(f, "{}", self.service_specific_error)?,
            _ => {}
        }
        write!(f, " '{}'", self.message.as_deref().unwrap_or(""))
    }
}

impl std::error::Error for Status {}

impl From<StatusCode> for Status {
    fn from(status: StatusCode) -> Status {
        if status == StatusCode::OK {
            return Status::ok();
        }
        Status {
            exception: ExceptionCode::TRANSACTION_FAILED,
            transaction_error: status,
            service_specific_error: 0,
            message: None,
        }
    }
}

impl From<ExceptionCode> for Status {
    fn from(exception: ExceptionCode) -> Status {
        Status::new_exception(exception, None)
    }
}

impl From<Status> for result::Result<(), Status> {
    fn from(status: Status) -> result::Result<(), Status> {
        if status.is_ok() {
            Ok(())
        } else {
            Err(status)
        }
    }
}

// Reply header layout: exception code, then the message, then the service
// specific code or transport status when relevant.
impl Parcelable for Status {
    type Deserialized = Status;

    fn serialize(&self, parcel: &mut Parcel) -> result::Result<(), StatusCode> {
        parcel.write(&(self.exception as i32))?;
        if self.exception == ExceptionCode::NONE {
            return Ok(());
        }
        parcel.write(&self.message)?;
        match self.exception {
            ExceptionCode::SERVICE_SPECIFIC => parcel.write(&self.service_specific_error),
            ExceptionCode::TRANSACTION_FAILED => parcel.write(&(self.transaction_error as i32)),
            _ => Ok(()),
        }
    }

    fn deserialize(parcel: &Parcel) -> result::Result<Status, StatusCode> {
        let raw: i32 = parcel.read()?;
        let exception = ExceptionCode::from_raw(raw).ok_or(StatusCode::BAD_VALUE)?;
        if exception == ExceptionCode::NONE {
            return Ok(Status::ok());
        }
        let message: Option<String> = parcel.read()?;
        let mut status = Status::new_exception(exception, message.as_deref());
        match exception {
            ExceptionCode::SERVICE_SPECIFIC => {
                status.service_specific_error = parcel.read()?;
            }
            ExceptionCode::TRANSACTION_FAILED => {
                status.transaction_error = StatusCode::from_raw(parcel.read()?);
            }
            _ => {}
        }
        Ok(status)
    }
}

#[test]
fn test_status_result() {
    assert_eq!(status_result(0), Ok(()));
    assert_eq!(status_result(-32), Err(StatusCode::DEAD_OBJECT));
    assert_eq!(status_result(-22), Err(StatusCode::BAD_VALUE));
    assert_eq!(status_result(12345), Err(StatusCode::UNKNOWN_ERROR));
}

#[test]
fn test_failure_kind() {
    assert_eq!(Status::ok().failure_kind(), None);
    assert_eq!(
        Status::new_exception(ExceptionCode::ILLEGAL_ARGUMENT, Some("bad band")).failure_kind(),
        Some(FailureKind::ArgumentRejected)
    );
    assert_eq!(
        Status::from(ExceptionCode::NULL_POINTER).failure_kind(),
        Some(FailureKind::ArgumentRejected)
    );
    assert_eq!(
        Status::from(ExceptionCode::ILLEGAL_STATE).failure_kind(),
        Some(FailureKind::StateRejected)
    );
    assert_eq!(
        Status::from(StatusCode::DEAD_OBJECT).failure_kind(),
        Some(FailureKind::Unreachable)
    );
    assert_eq!(
        Status::from(StatusCode::FAILED_TRANSACTION).failure_kind(),
        Some(FailureKind::Unreachable)
    );
    assert_eq!(Status::from(StatusCode::BAD_TYPE).failure_kind(), Some(FailureKind::Other));
    assert_eq!(
        Status::from(StatusCode::NOT_ENOUGH_DATA).failure_kind(),
        Some(FailureKind::Other)
    );
    assert!(!Status::from(StatusCode::BAD_VALUE).is_unreachable());
    assert_eq!(
        Status::new_service_specific_error(3, None).failure_kind(),
        Some(FailureKind::Other)
    );
    assert_eq!(Status::from(ExceptionCode::SECURITY).failure_kind(), Some(FailureKind::Other));
}

#[test]
fn test_status_from_ok_code_is_ok() {
    assert!(Status::from(StatusCode::OK).is_ok());
    assert!(Status::from(ExceptionCode::NONE).is_ok());
    let res: Result<()> = Status::from(StatusCode::DEAD_OBJECT).into();
    assert_eq!(res.unwrap_err().transaction_error(), StatusCode::DEAD_OBJECT);
}

#[test]
fn test_status_parcel_header() {
    let statuses = [
        Status::ok(),
        Status::new_exception(ExceptionCode::ILLEGAL_STATE, Some("Tuner is closed")),
        Status::new_service_specific_error(7, Some("vendor")),
        Status::from(StatusCode::DEAD_OBJECT),
    ];

    let mut parcel = Parcel::new();
    for status in &statuses {
        assert!(parcel.write(status).is_ok());
    }
    assert!(parcel.set_data_position(0).is_ok());
    for status in &statuses {
        assert_eq!(&parcel.read::<Status>().unwrap(), status);
    }
}
