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

use crate::radio_service::IRadioService;
use crate::status::RadioStatus;
use crate::tuner::{StatusResult, TunerAdapter};
use crate::types::{BandConfig, ModuleProperties};

use binder::{ServiceHandle, ServiceLookup};

use std::sync::Arc;

/// Entry point of the radio API: lists modules and opens tuners on them.
///
/// The radio service is looked up on first use. When it turns out to be
/// unreachable the cached connection is dropped, here or by any tuner opened
/// through this manager, and the next call looks it up again.
pub struct RadioManager {
    service: Arc<ServiceHandle<dyn IRadioService>>,
}

impl RadioManager {
    pub fn new(service: Arc<ServiceHandle<dyn IRadioService>>) -> RadioManager {
        RadioManager { service }
    }

    /// A manager that finds the radio service through `lookup`.
    pub fn with_lookup(lookup: Arc<dyn ServiceLookup>) -> RadioManager {
        RadioManager::new(Arc::new(ServiceHandle::new(
            <dyn IRadioService>::SERVICE_NAME,
            lookup,
        )))
    }

    pub fn list_modules(&self) -> StatusResult<Vec<ModuleProperties>> {
        let mut service = self.service.lock();
        let Some(radio) = service.resolve() else {
            return Err(RadioStatus::NoInit);
        };
        radio.list_modules().map_err(|status| {
            log::error!("Failed to list modules: {}", status);
            if status.is_unreachable() {
                service.invalidate();
                RadioStatus::DeadObject
            } else {
                RadioStatus::Error
            }
        })
    }

    /// Open a tuner on module `module_id`, optionally configured up front.
    ///
    /// Returns `None` if the config is invalid, the service is unavailable or
    /// the service refuses; the reason is logged.
    pub fn open_tuner(
        &self,
        module_id: i32,
        config: Option<&BandConfig>,
        with_audio: bool,
    ) -> Option<TunerAdapter> {
        if let Some(config) = config.filter(|config| !config.is_valid()) {
            log::error!("Can't open tuner: invalid band config {:?}", config);
            return None;
        }

        let mut service = self.service.lock();
        let radio = service.resolve()?;
        let opened = radio.open_tuner(module_id, config, with_audio);
        match opened {
            Ok(tuner) => {
                let band = config.map(|config| config.band);
                Some(TunerAdapter::with_service(tuner, band, self.service.clone(), radio))
            }
            Err(status) => {
                log::error!("Failed to open tuner on module {}: {}", module_id, status);
                if status.is_unreachable() {
                    service.invalidate();
                }
                None
            }
        }
    }
}

impl Default for RadioManager {
    /// A manager that uses the process-wide service manager.
    fn default() -> RadioManager {
        RadioManager::new(Arc::new(ServiceHandle::with_default_manager(
            <dyn IRadioService>::SERVICE_NAME,
        )))
    }
}
