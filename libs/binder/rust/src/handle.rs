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

//! Lazily resolved, cached connection to a named service.

use crate::binder::{FromIBinder, Strong};
use crate::service_manager::{default_service_manager, ServiceLookup};

use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

/// A cached handle to the service registered under a fixed name.
///
/// The first [`resolve`](ServiceHandle::resolve) looks the service up and
/// caches the typed interface. A cached interface was obtained without error
/// but may have died since; callers that see an unreachable failure from a
/// call must [`invalidate`](ServiceHandle::invalidate) the handle so the next
/// resolve looks the service up again. The handle never retries on its own.
pub struct ServiceHandle<T: FromIBinder + ?Sized> {
    name: String,
    lookup: Arc<dyn ServiceLookup>,
    cached: Mutex<Option<Strong<T>>>,
}

impl<T: FromIBinder + ?Sized> ServiceHandle<T> {
    pub fn new(name: impl Into<String>, lookup: Arc<dyn ServiceLookup>) -> Self {
        ServiceHandle {
            name: name.into(),
            lookup,
            cached: Mutex::new(None),
        }
    }

    /// A handle that looks `name` up in the process-wide service manager.
    pub fn with_default_manager(name: impl Into<String>) -> Self {
        ServiceHandle::new(name, default_service_manager())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the cached interface, looking it up first if needed.
    ///
    /// Never fails: a missing service, or one that does not implement `T`,
    /// yields `None` and leaves nothing cached.
    pub fn resolve(&self) -> Option<Strong<T>> {
        self.lock().resolve()
    }

    /// Drop the cached interface so that the next resolve looks it up again.
    pub fn invalidate(&self) {
        self.lock().invalidate()
    }

    /// Drop the cached interface only if it is still `stale`, an interface
    /// earlier returned by [`resolve`](ServiceHandle::resolve). An interface
    /// resolved again since then is kept.
    pub fn invalidate_if(&self, stale: &Strong<T>) {
        self.lock().invalidate_if(stale)
    }

    /// Whether an interface is currently cached.
    pub fn is_resolved(&self) -> bool {
        self.cached.lock().is_some()
    }

    /// Hold the handle for a whole call: resolve, use, and invalidate on
    /// failure without another thread swapping the cached interface in
    /// between. Other callers of this handle block until the guard drops.
    pub fn lock(&self) -> ServiceGuard<'_, T> {
        ServiceGuard {
            name: &self.name,
            lookup: self.lookup.as_ref(),
            cached: self.cached.lock(),
        }
    }
}

impl<T: FromIBinder + ?Sized> fmt::Debug for ServiceHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceHandle")
            .field("name", &self.name)
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

/// Exclusive access to a [`ServiceHandle`]'s cached interface.
pub struct ServiceGuard<'a, T: FromIBinder + ?Sized> {
    name: &'a str,
    lookup: &'a dyn ServiceLookup,
    cached: MutexGuard<'a, Option<Strong<T>>>,
}

impl<'a, T: FromIBinder + ?Sized> ServiceGuard<'a, T> {
    /// See [`ServiceHandle::resolve`].
    pub fn resolve(&mut self) -> Option<Strong<T>> {
        if let Some(service) = self.cached.as_ref() {
            return Some(service.clone());
        }

        let binder = match self.lookup.get_service(self.name) {
            Some(binder) => binder,
            None => {
                log::warn!("Service '{}' not found", self.name);
                return None;
            }
        };
        match <T as FromIBinder>::try_from(binder) {
            Ok(service) => {
                log::debug!("Resolved service '{}'", self.name);
                *self.cached = Some(service.clone());
                Some(service)
            }
            Err(e) => {
                log::warn!("Service '{}' has an unexpected interface: {}", self.name, e);
                None
            }
        }
    }

    /// See [`ServiceHandle::invalidate`].
    pub fn invalidate(&mut self) {
        if self.cached.take().is_some() {
            log::debug!("Invalidated cached service '{}'", self.name);
        }
    }

    /// See [`ServiceHandle::invalidate_if`].
    pub fn invalidate_if(&mut self, stale: &Strong<T>) {
        if self.cached.as_ref().is_some_and(|cached| Arc::ptr_eq(cached, stale)) {
            self.invalidate();
        } else {
            log::trace!("Cached service '{}' was already replaced", self.name);
        }
    }
}
