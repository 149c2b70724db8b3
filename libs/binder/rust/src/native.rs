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

use crate::binder::{Remotable, TransactionCode, INTERFACE_TRANSACTION, PING_TRANSACTION};
use crate::error::StatusCode;
use crate::parcel::Parcel;
use crate::proxy::SpIBinder;

use std::ops::Deref;
use std::result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Transaction endpoint shared between a native [`Binder`] and every
/// [`SpIBinder`] that refers to it.
pub(crate) trait BinderNode: Send + Sync {
    fn descriptor(&self) -> &str;

    fn is_alive(&self) -> bool;

    fn dispatch(
        &self,
        code: TransactionCode,
        data: &Parcel,
        reply: &mut Parcel,
    ) -> result::Result<(), StatusCode>;
}

struct Node<T: Remotable> {
    remotable: T,
    alive: AtomicBool,
}

impl<T: Remotable> BinderNode for Node<T> {
    fn descriptor(&self) -> &str {
        self.remotable.get_descriptor()
    }

    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    fn dispatch(
        &self,
        code: TransactionCode,
        data: &Parcel,
        reply: &mut Parcel,
    ) -> result::Result<(), StatusCode> {
        match code {
            PING_TRANSACTION => Ok(()),
            INTERFACE_TRANSACTION => reply.write(self.descriptor()),
            _ => self.remotable.on_transact(code, data, reply),
        }
    }
}

/// Rust wrapper around Binder remotable objects.
///
/// Owns the service implementation. Clients reach it through the
/// [`SpIBinder`] returned by [`as_binder`](Binder::as_binder); killing the
/// binder makes every outstanding handle fail with `DEAD_OBJECT`, the same way
/// a crashed service process would.
pub struct Binder<T: Remotable + 'static> {
    node: Arc<Node<T>>,
}

impl<T: Remotable + 'static> Binder<T> {
    /// Create a new Binder remotable object.
    pub fn new(remotable: T) -> Binder<T> {
        Binder {
            node: Arc::new(Node {
                remotable,
                alive: AtomicBool::new(true),
            }),
        }
    }

    /// Get an untyped handle to this object that can be registered or sent in
    /// a [`Parcel`].
    pub fn as_binder(&self) -> SpIBinder {
        SpIBinder::new(self.node.clone())
    }

    /// Simulate the hosting process dying. Irreversible.
    pub fn kill(&self) {
        log::debug!("Binder for {} killed", self.node.descriptor());
        self.node.alive.store(false, Ordering::Release);
    }

    pub fn is_alive(&self) -> bool {
        self.node.is_alive()
    }
}

impl<T: Remotable + 'static> Clone for Binder<T> {
    fn clone(&self) -> Self {
        Binder {
            node: self.node.clone(),
        }
    }
}

impl<T: Remotable + 'static> Deref for Binder<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.node.remotable
    }
}

impl<T: Remotable + 'static> From<&Binder<T>> for SpIBinder {
    fn from(binder: &Binder<T>) -> SpIBinder {
        binder.as_binder()
    }
}
