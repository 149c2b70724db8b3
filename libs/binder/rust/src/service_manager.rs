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

//! Name registry for binder services.

use crate::binder::{FromIBinder, IBinder, Strong};
use crate::error::StatusCode;
use crate::proxy::SpIBinder;

use std::collections::BTreeMap;
use std::result;
use std::sync::Arc;
use std::time::{Duration, Instant};

use once_cell::sync::Lazy;
use parking_lot::{Condvar, Mutex};

/// Something that can find a service by name.
///
/// [`ServiceHandle`](crate::ServiceHandle) takes one of these so that the
/// registry can be replaced in tests.
pub trait ServiceLookup: Send + Sync {
    /// Look up a registered service. Returns `None` when nothing live is
    /// registered under `name`.
    fn get_service(&self, name: &str) -> Option<SpIBinder>;
}

/// Registry of services, keyed by name.
///
/// Registering a name that is already taken replaces the previous binder, so a
/// restarted service can publish itself again under the same name. Dead
/// binders are never handed out.
#[derive(Default)]
pub struct ServiceManager {
    services: Mutex<BTreeMap<String, SpIBinder>>,
    registered: Condvar,
}

static DEFAULT_SERVICE_MANAGER: Lazy<Arc<ServiceManager>> =
    Lazy::new(|| Arc::new(ServiceManager::new()));

impl ServiceManager {
    pub fn new() -> ServiceManager {
        ServiceManager::default()
    }

    /// Register a service.
    pub fn add_service(&self, name: &str, binder: SpIBinder) -> result::Result<(), StatusCode> {
        if name.is_empty() || !binder.is_binder_alive() {
            return Err(StatusCode::BAD_VALUE);
        }
        let mut services = self.services.lock();
        if services.insert(name.to_owned(), binder).is_some() {
            log::info!("Replacing registration for service '{}'", name);
        }
        self.registered.notify_all();
        Ok(())
    }

    /// Retrieve an existing service, non-blocking.
    pub fn check_service(&self, name: &str) -> Option<SpIBinder> {
        let mut services = self.services.lock();
        let binder = services.get(name)?.clone();
        if binder.is_binder_alive() {
            Some(binder)
        } else {
            log::debug!("Dropping dead registration for service '{}'", name);
            services.remove(name);
            None
        }
    }

    /// Wait up to `timeout` for a service to be registered.
    pub fn wait_for_service(&self, name: &str, timeout: Duration) -> Option<SpIBinder> {
        let deadline = Instant::now() + timeout;
        let mut services = self.services.lock();
        loop {
            if let Some(binder) = services.get(name).filter(|b| b.is_binder_alive()) {
                return Some(binder.clone());
            }
            if self.registered.wait_until(&mut services, deadline).timed_out() {
                return services.get(name).filter(|b| b.is_binder_alive()).cloned();
            }
        }
    }

    /// Return list of all registered services that are still alive.
    pub fn list_services(&self) -> Vec<String> {
        self.services
            .lock()
            .iter()
            .filter(|(_, binder)| binder.is_binder_alive())
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Check if a live service is registered under `name`.
    pub fn is_declared(&self, name: &str) -> bool {
        self.check_service(name).is_some()
    }

    /// Retrieve a service and interpret it as interface `T`.
    pub fn get_interface<T: FromIBinder + ?Sized>(
        &self,
        name: &str,
    ) -> result::Result<Strong<T>, StatusCode> {
        interface_cast(self.check_service(name))
    }
}

impl ServiceLookup for ServiceManager {
    fn get_service(&self, name: &str) -> Option<SpIBinder> {
        self.check_service(name)
    }
}

/// The process-wide service manager.
pub fn default_service_manager() -> Arc<ServiceManager> {
    DEFAULT_SERVICE_MANAGER.clone()
}

/// Register a service with the process-wide service manager.
pub fn add_service(name: &str, binder: SpIBinder) -> result::Result<(), StatusCode> {
    DEFAULT_SERVICE_MANAGER.add_service(name, binder)
}

/// Retrieve an existing service from the process-wide service manager.
pub fn get_service(name: &str) -> Option<SpIBinder> {
    let service = DEFAULT_SERVICE_MANAGER.check_service(name);
    if service.is_none() {
        log::warn!("Service '{}' is not registered", name);
    }
    service
}

/// Retrieve an existing service from the process-wide service manager,
/// without logging a miss.
pub fn check_service(name: &str) -> Option<SpIBinder> {
    DEFAULT_SERVICE_MANAGER.check_service(name)
}

/// Wait up to `timeout` for a service to appear in the process-wide service
/// manager.
pub fn wait_for_service(name: &str, timeout: Duration) -> Option<SpIBinder> {
    DEFAULT_SERVICE_MANAGER.wait_for_service(name, timeout)
}

/// Retrieve an existing service for a particular interface from the
/// process-wide service manager.
pub fn get_interface<T: FromIBinder + ?Sized>(name: &str) -> result::Result<Strong<T>, StatusCode> {
    DEFAULT_SERVICE_MANAGER.get_interface(name)
}

fn interface_cast<T: FromIBinder + ?Sized>(
    service: Option<SpIBinder>,
) -> result::Result<Strong<T>, StatusCode> {
    if let Some(service) = service {
        <T as FromIBinder>::try_from(service)
    } else {
        Err(StatusCode::NAME_NOT_FOUND)
    }
}
