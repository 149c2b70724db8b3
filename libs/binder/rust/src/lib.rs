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

//! In-process binder: typed interfaces over parcels, a service registry, and
//! cached service handles.
//!
//! # Example
//!
//! ```
//! use binder::{
//!     check_interface, Binder, FromIBinder, Interface, Parcel, Remotable, ServiceHandle,
//!     ServiceManager, SpIBinder, Status, StatusCode, Strong, TransactionCode,
//!     FIRST_CALL_TRANSACTION,
//! };
//! use std::sync::Arc;
//!
//! const DESCRIPTOR: &str = "android.os.ITest";
//!
//! pub trait ITest: Interface {
//!     fn test(&self) -> binder::Result<String>;
//! }
//!
//! // Local implementation of the ITest remotable interface.
//! struct TestService;
//!
//! impl Remotable for TestService {
//!     fn get_descriptor(&self) -> &str {
//!         DESCRIPTOR
//!     }
//!
//!     fn on_transact(
//!         &self,
//!         _code: TransactionCode,
//!         _data: &Parcel,
//!         reply: &mut Parcel,
//!     ) -> Result<(), StatusCode> {
//!         reply.write(&Status::ok())?;
//!         reply.write("testing service")
//!     }
//! }
//!
//! // Proxy that forwards ITest calls to a remote object.
//! struct BpTest(SpIBinder);
//!
//! impl Interface for BpTest {}
//!
//! impl ITest for BpTest {
//!     fn test(&self) -> binder::Result<String> {
//!         let reply = self.0.transact(FIRST_CALL_TRANSACTION, 0, |_| Ok(()))?;
//!         let status: Status = reply.read()?;
//!         if !status.is_ok() {
//!             return Err(status);
//!         }
//!         Ok(reply.read()?)
//!     }
//! }
//!
//! impl FromIBinder for dyn ITest {
//!     fn try_from(ibinder: SpIBinder) -> Result<Strong<dyn ITest>, StatusCode> {
//!         check_interface(&ibinder, DESCRIPTOR)?;
//!         Ok(Arc::new(BpTest(ibinder)))
//!     }
//! }
//!
//! let sm = Arc::new(ServiceManager::new());
//! let service = Binder::new(TestService);
//! sm.add_service("test", service.as_binder()).unwrap();
//!
//! let handle = ServiceHandle::<dyn ITest>::new("test", sm);
//! let test = handle.resolve().unwrap();
//! assert_eq!(test.test().unwrap(), "testing service");
//! ```

mod binder;
mod error;
mod handle;
mod native;
mod proxy;

pub mod parcel;
pub mod service_manager;

pub use crate::binder::{
    check_interface, FromIBinder, IBinder, Interface, Remotable, Strong, TransactionCode,
    TransactionFlags, FIRST_CALL_TRANSACTION, FLAG_ONEWAY, INTERFACE_TRANSACTION,
    LAST_CALL_TRANSACTION, PING_TRANSACTION,
};
pub use error::{status_result, status_t, ExceptionCode, FailureKind, Result, Status, StatusCode};
pub use handle::{ServiceGuard, ServiceHandle};
pub use native::Binder;
pub use parcel::{Parcel, Parcelable};
pub use proxy::SpIBinder;
pub use service_manager::{
    add_service, check_service, default_service_manager, get_interface, get_service,
    wait_for_service, ServiceLookup, ServiceManager,
};

/// Re-exports of core structures, prefixed with `Binder`.
///
/// This module renames binder exports so they be glob-imported without
/// conflicting with standard structures. Import the prelude with:
/// ```rust
/// use binder::prelude::*;
/// ```
pub mod prelude {
    pub use super::Binder;
    pub use super::FromIBinder;
    pub use super::IBinder;
    pub use super::Interface as BinderInterface;
    pub use super::Remotable as BinderRemotable;
    pub use super::Result as BinderResult;
    pub use super::Status as BinderStatus;
    pub use super::Strong;
}
