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

//! Rust API for interacting with a remote binder service.

use crate::binder::{
    IBinder, TransactionCode, TransactionFlags, FLAG_ONEWAY, INTERFACE_TRANSACTION,
    PING_TRANSACTION,
};
use crate::error::{Status, StatusCode};
use crate::native::BinderNode;
use crate::parcel::Parcel;

use std::fmt;
use std::result;
use std::sync::Arc;

/// A strong reference to a Binder remote object.
///
/// This struct is untyped; typed proxies implementing a particular binder
/// interface wrap it after checking the interface descriptor.
#[derive(Clone)]
pub struct SpIBinder(Arc<dyn BinderNode>);

impl SpIBinder {
    pub(crate) fn new(node: Arc<dyn BinderNode>) -> SpIBinder {
        SpIBinder(node)
    }

    /// Perform a binder transaction.
    ///
    /// `input_callback` fills in the request parcel. The returned parcel is
    /// positioned at its start, ready to be read. A dead remote fails with
    /// `DEAD_OBJECT` before `input_callback` runs.
    ///
    /// For [`FLAG_ONEWAY`] transactions the reply is always empty and failures
    /// inside the remote are not reported back; only delivery failures are.
    pub fn transact<F>(
        &self,
        code: TransactionCode,
        flags: TransactionFlags,
        input_callback: F,
    ) -> result::Result<Parcel, StatusCode>
    where
        F: FnOnce(&mut Parcel) -> result::Result<(), StatusCode>,
    {
        if !self.0.is_alive() {
            return Err(StatusCode::DEAD_OBJECT);
        }

        let mut data = Parcel::new();
        input_callback(&mut data)?;
        data.set_data_position(0)?;

        let mut reply = Parcel::new();
        let result = self.0.dispatch(code, &data, &mut reply);

        if flags & FLAG_ONEWAY != 0 {
            if let Err(e) = result {
                log::debug!("oneway transaction {} on {} failed: {}", code, self.0.descriptor(), e);
            }
            return Ok(Parcel::new());
        }

        result?;
        // The remote may have died while handling the call.
        if !self.0.is_alive() {
            return Err(StatusCode::DEAD_OBJECT);
        }
        reply.set_data_position(0)?;
        Ok(reply)
    }

    /// Perform an AIDL-style call on interface `descriptor`.
    ///
    /// Writes the interface token followed by whatever `args` writes. Unless
    /// the call is [`FLAG_ONEWAY`], reads the reply's [`Status`] header and
    /// turns an exception into `Err`; on success the returned parcel is
    /// positioned at the return value.
    pub fn call<F>(
        &self,
        descriptor: &str,
        code: TransactionCode,
        flags: TransactionFlags,
        args: F,
    ) -> crate::Result<Parcel>
    where
        F: FnOnce(&mut Parcel) -> result::Result<(), StatusCode>,
    {
        let reply = self.transact(code, flags, |data| {
            data.write_interface_token(descriptor)?;
            args(data)
        })?;
        if flags & FLAG_ONEWAY == 0 {
            let status: Status = reply.read()?;
            if !status.is_ok() {
                return Err(status);
            }
        }
        Ok(reply)
    }

    /// Whether both handles refer to the same binder object.
    pub fn ptr_eq(&self, other: &SpIBinder) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl IBinder for SpIBinder {
    fn get_interface_descriptor(&self) -> String {
        self.0.descriptor().to_owned()
    }

    fn is_binder_alive(&self) -> bool {
        self.0.is_alive()
    }

    fn ping_binder(&self) -> result::Result<(), StatusCode> {
        self.transact(PING_TRANSACTION, 0, |_| Ok(())).map(|_| ())
    }
}

impl SpIBinder {
    /// Ask the remote object for its descriptor, as opposed to
    /// [`IBinder::get_interface_descriptor`] which answers locally.
    pub fn query_interface_descriptor(&self) -> result::Result<String, StatusCode> {
        let reply = self.transact(INTERFACE_TRANSACTION, 0, |_| Ok(()))?;
        reply.read()
    }
}

impl fmt::Debug for SpIBinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpIBinder")
            .field("descriptor", &self.0.descriptor())
            .field("alive", &self.0.is_alive())
            .finish()
    }
}

impl PartialEq for SpIBinder {
    fn eq(&self, other: &SpIBinder) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for SpIBinder {}
