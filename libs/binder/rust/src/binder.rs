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

//! Trait definitions for binder objects

use crate::error::StatusCode;
use crate::parcel::Parcel;
use crate::proxy::SpIBinder;

use std::result;
use std::sync::Arc;

/// Binder action to perform.
///
/// This must be a number between [`FIRST_CALL_TRANSACTION`] and
/// [`LAST_CALL_TRANSACTION`]. Transaction codes for a binder interface are
/// generally enumerated next to the interface's proxy.
pub type TransactionCode = u32;

/// Additional operation flags.
///
/// Can be either 0 for a normal RPC, or [`FLAG_ONEWAY`] for a one-way RPC.
pub type TransactionFlags = u32;

pub const FIRST_CALL_TRANSACTION: TransactionCode = 0x0000_0001;
pub const LAST_CALL_TRANSACTION: TransactionCode = 0x00ff_ffff;

const fn pack_chars(c1: char, c2: char, c3: char, c4: char) -> u32 {
    ((c1 as u32) << 24) | ((c2 as u32) << 16) | ((c3 as u32) << 8) | (c4 as u32)
}

pub const PING_TRANSACTION: TransactionCode = pack_chars('_', 'P', 'N', 'G');
pub const INTERFACE_TRANSACTION: TransactionCode = pack_chars('_', 'N', 'T', 'F');

/// Corresponds to TF_ONE_WAY -- an asynchronous call.
pub const FLAG_ONEWAY: TransactionFlags = 0x01;

/// Strong reference to a typed binder interface.
pub type Strong<I> = Arc<I>;

/// Super-trait for Binder interfaces.
///
/// Every interface trait (`ITuner`, `IStatsd`, ...) extends this trait so that
/// both local implementations and remote proxies can be shared across threads.
pub trait Interface: Send + Sync {
    /// The binder object behind this interface, if there is one.
    ///
    /// Proxies return the remote they forward to. Plain local implementations
    /// return `None` and must be wrapped in a native binder before they can be
    /// sent in a [`Parcel`].
    fn to_binder(&self) -> Option<SpIBinder> {
        None
    }
}

/// A struct that is remotable via Binder.
///
/// This is a low-level interface that should normally be automatically
/// generated from AIDL.
pub trait Remotable: Send + Sync {
    /// The interface descriptor this object answers to.
    fn get_descriptor(&self) -> &str;

    /// Handle and reply to a request to invoke a transaction on this object.
    ///
    /// Returning an error from this method fails the transaction itself; AIDL
    /// style interfaces report service exceptions inside `reply` instead.
    fn on_transact(
        &self,
        code: TransactionCode,
        data: &Parcel,
        reply: &mut Parcel,
    ) -> result::Result<(), StatusCode>;
}

/// Interface of binder local or remote objects.
///
/// This trait corresponds to the interface of the C++ `IBinder` class.
pub trait IBinder {
    /// Return the canonical name of the interface provided by this IBinder
    /// object.
    fn get_interface_descriptor(&self) -> String;

    /// Is this object still alive?
    fn is_binder_alive(&self) -> bool;

    /// Send a ping transaction to this object
    fn ping_binder(&self) -> result::Result<(), StatusCode>;
}

/// Conversion from an untyped [`SpIBinder`] into a typed interface.
///
/// Implemented for `dyn ITrait` by each interface, usually by wrapping the
/// binder in the interface's proxy after checking its descriptor.
pub trait FromIBinder: Interface {
    /// Try to interpret a generic Binder object as this interface.
    fn try_from(ibinder: SpIBinder) -> result::Result<Strong<Self>, StatusCode>;
}

/// Check that `ibinder` answers to `descriptor` before wrapping it in a proxy.
pub fn check_interface(ibinder: &SpIBinder, descriptor: &str) -> result::Result<(), StatusCode> {
    if ibinder.get_interface_descriptor() == descriptor {
        Ok(())
    } else {
        Err(StatusCode::BAD_TYPE)
    }
}

/// Declare a client-side proxy for a binder interface.
///
/// ```ignore
/// declare_binder_proxy!(BpTest: ITest["android.os.ITest"]);
/// ```
///
/// defines `pub struct BpTest(SpIBinder)` with a `DESCRIPTOR` constant, makes
/// it an [`Interface`], and implements [`FromIBinder`] for `dyn ITest` by
/// checking the remote's descriptor and wrapping it in a `BpTest`. The
/// interface methods themselves are implemented by hand on `BpTest`, usually
/// with [`SpIBinder::call`].
#[macro_export]
macro_rules! declare_binder_proxy {
    ($name:ident: $interface:ident[$descriptor:expr]) => {
        #[doc = concat!("Proxy for a remote [`", stringify!($interface), "`].")]
        pub struct $name($crate::SpIBinder);

        impl $name {
            pub const DESCRIPTOR: &'static str = $descriptor;
        }

        impl $crate::Interface for $name {
            fn to_binder(&self) -> Option<$crate::SpIBinder> {
                Some(self.0.clone())
            }
        }

        impl $crate::FromIBinder for dyn $interface {
            fn try_from(
                ibinder: $crate::SpIBinder,
            ) -> ::std::result::Result<$crate::Strong<dyn $interface>, $crate::StatusCode> {
                $crate::check_interface(&ibinder, $descriptor)?;
                Ok(::std::sync::Arc::new($name(ibinder)))
            }
        }
    };
}
