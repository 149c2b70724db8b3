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

//! In-memory radio service and tuner used by the integration tests.

#![allow(dead_code)]

use binder::{
    Binder, ExceptionCode, FromIBinder, Interface, ServiceLookup, ServiceManager, SpIBinder,
    Status, StatusCode, Strong,
};
use radio::{
    BandConfig, BnTuner, IRadioService, ITuner, ModuleProperties, ProgramInfo, ProgramSelector,
};

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn illegal_argument() -> Status {
    Status::new_exception(ExceptionCode::ILLEGAL_ARGUMENT, Some("rejected by tuner"))
}

pub fn illegal_state() -> Status {
    Status::new_exception(ExceptionCode::ILLEGAL_STATE, Some("tuner is busy"))
}

pub fn dead_object() -> Status {
    Status::from(StatusCode::DEAD_OBJECT)
}

pub fn security() -> Status {
    Status::new_exception(ExceptionCode::SECURITY, Some("not allowed"))
}

/// Tuner that records every call and optionally fails all of them.
#[derive(Default)]
pub struct FakeTuner {
    calls: Mutex<Vec<&'static str>>,
    failure: Mutex<Option<Status>>,
    /// Answer of `is_closed`, for sessions closed on the service side.
    pub closed_remotely: AtomicBool,
    muted: AtomicBool,
    config: Mutex<Option<BandConfig>>,
    tuned: Mutex<Option<ProgramSelector>>,
    flags: Mutex<BTreeMap<i32, bool>>,
    parameters: Mutex<BTreeMap<String, String>>,
}

impl FakeTuner {
    pub fn new() -> Arc<FakeTuner> {
        Arc::new(FakeTuner::default())
    }

    pub fn with_config(config: &BandConfig) -> Arc<FakeTuner> {
        let tuner = FakeTuner::default();
        *tuner.config.lock() = Some(config.clone());
        Arc::new(tuner)
    }

    /// Make every following call fail with `status`.
    pub fn fail_with(&self, status: Status) {
        *self.failure.lock() = Some(status);
    }

    pub fn recover(&self) {
        *self.failure.lock() = None;
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls.lock().iter().filter(|c| **c == call).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn tuned(&self) -> Option<ProgramSelector> {
        self.tuned.lock().clone()
    }

    fn record(&self, call: &'static str) -> binder::Result<()> {
        self.calls.lock().push(call);
        match self.failure.lock().clone() {
            Some(status) => Err(status),
            None => Ok(()),
        }
    }
}

impl Interface for FakeTuner {}

impl ITuner for FakeTuner {
    fn close(&self) -> binder::Result<()> {
        self.record("close")?;
        self.closed_remotely.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_closed(&self) -> binder::Result<bool> {
        self.record("is_closed")?;
        Ok(self.closed_remotely.load(Ordering::SeqCst))
    }

    fn set_configuration(&self, config: &BandConfig) -> binder::Result<()> {
        self.record("set_configuration")?;
        *self.config.lock() = Some(config.clone());
        Ok(())
    }

    fn get_configuration(&self) -> binder::Result<BandConfig> {
        self.record("get_configuration")?;
        self.config
            .lock()
            .clone()
            .ok_or_else(|| Status::new_exception(ExceptionCode::ILLEGAL_STATE, Some("not configured")))
    }

    fn set_muted(&self, mute: bool) -> binder::Result<()> {
        self.record("set_muted")?;
        self.muted.store(mute, Ordering::SeqCst);
        Ok(())
    }

    fn is_muted(&self) -> binder::Result<bool> {
        self.record("is_muted")?;
        Ok(self.muted.load(Ordering::SeqCst))
    }

    fn step(&self, _direction_down: bool, _skip_sub_channel: bool) -> binder::Result<()> {
        self.record("step")
    }

    fn scan(&self, _direction_down: bool, _skip_sub_channel: bool) -> binder::Result<()> {
        self.record("scan")
    }

    fn tune(&self, selector: &ProgramSelector) -> binder::Result<()> {
        self.record("tune")?;
        *self.tuned.lock() = Some(selector.clone());
        Ok(())
    }

    fn cancel(&self) -> binder::Result<()> {
        self.record("cancel")
    }

    fn cancel_announcement(&self) -> binder::Result<()> {
        self.record("cancel_announcement")
    }

    fn get_program_information(&self) -> binder::Result<ProgramInfo> {
        self.record("get_program_information")?;
        Ok(ProgramInfo::new(self.tuned.lock().clone().unwrap_or_default()))
    }

    fn get_image(&self, id: i32) -> binder::Result<Option<Vec<u8>>> {
        self.record("get_image")?;
        Ok((id == 1).then(|| vec![0x89, b'P', b'N', b'G']))
    }

    fn start_background_scan(&self) -> binder::Result<bool> {
        self.record("start_background_scan")?;
        Ok(true)
    }

    fn get_program_list(
        &self,
        vendor_filter: Option<&BTreeMap<String, String>>,
    ) -> binder::Result<Vec<ProgramInfo>> {
        self.record("get_program_list")?;
        let mut info = ProgramInfo::new(self.tuned.lock().clone().unwrap_or_default());
        if let Some(filter) = vendor_filter {
            info.vendor_info = filter.clone();
        }
        Ok(vec![info])
    }

    fn is_config_flag_supported(&self, flag: i32) -> binder::Result<bool> {
        self.record("is_config_flag_supported")?;
        Ok(flag <= radio::config_flag::RDS_REG)
    }

    fn is_config_flag_set(&self, flag: i32) -> binder::Result<bool> {
        self.record("is_config_flag_set")?;
        Ok(self.flags.lock().get(&flag).copied().unwrap_or(false))
    }

    fn set_config_flag(&self, flag: i32, value: bool) -> binder::Result<()> {
        self.record("set_config_flag")?;
        self.flags.lock().insert(flag, value);
        Ok(())
    }

    fn set_parameters(
        &self,
        parameters: &BTreeMap<String, String>,
    ) -> binder::Result<BTreeMap<String, String>> {
        self.record("set_parameters")?;
        self.parameters.lock().extend(parameters.clone());
        Ok(parameters.clone())
    }

    fn get_parameters(&self, keys: &[String]) -> binder::Result<BTreeMap<String, String>> {
        self.record("get_parameters")?;
        let parameters = self.parameters.lock();
        Ok(keys
            .iter()
            .filter_map(|key| parameters.get(key).map(|value| (key.clone(), value.clone())))
            .collect())
    }

    fn is_antenna_connected(&self) -> binder::Result<bool> {
        self.record("is_antenna_connected")?;
        Ok(true)
    }
}

/// Radio service whose tuners are [`FakeTuner`]s behind native binders.
pub struct FakeRadioService {
    modules: Vec<ModuleProperties>,
    failure: Mutex<Option<Status>>,
    opened: Mutex<Vec<(Arc<FakeTuner>, Binder<BnTuner>)>>,
}

impl FakeRadioService {
    pub fn new(modules: Vec<ModuleProperties>) -> Arc<FakeRadioService> {
        Arc::new(FakeRadioService {
            modules,
            failure: Mutex::new(None),
            opened: Mutex::new(Vec::new()),
        })
    }

    pub fn fail_with(&self, status: Status) {
        *self.failure.lock() = Some(status);
    }

    /// The fake behind the `index`th opened tuner, and its binder.
    pub fn opened(&self, index: usize) -> (Arc<FakeTuner>, Binder<BnTuner>) {
        self.opened.lock()[index].clone()
    }

    pub fn opened_count(&self) -> usize {
        self.opened.lock().len()
    }
}

impl Interface for FakeRadioService {}

impl IRadioService for FakeRadioService {
    fn list_modules(&self) -> binder::Result<Vec<ModuleProperties>> {
        if let Some(status) = self.failure.lock().clone() {
            return Err(status);
        }
        Ok(self.modules.clone())
    }

    fn open_tuner(
        &self,
        module_id: i32,
        config: Option<&BandConfig>,
        _with_audio: bool,
    ) -> binder::Result<Strong<dyn ITuner>> {
        if let Some(status) = self.failure.lock().clone() {
            return Err(status);
        }
        if !self.modules.iter().any(|module| module.id == module_id) {
            return Err(Status::new_exception(
                ExceptionCode::ILLEGAL_ARGUMENT,
                Some("no such module"),
            ));
        }
        let fake = match config {
            Some(config) => FakeTuner::with_config(config),
            None => FakeTuner::new(),
        };
        let binder = BnTuner::new_binder(fake.clone());
        let tuner = <dyn ITuner as FromIBinder>::try_from(binder.as_binder())?;
        self.opened.lock().push((fake, binder));
        Ok(tuner)
    }
}

pub fn fm_module(id: i32) -> ModuleProperties {
    ModuleProperties {
        id,
        service_name: "default".to_owned(),
        implementor: "Fake".to_owned(),
        product: "Fake radio".to_owned(),
        version: "1.0".to_owned(),
        serial: format!("SN{}", id),
        num_tuners: 1,
        num_audio_sources: 1,
        is_capture_supported: false,
        is_background_scanning_supported: true,
        bands: vec![BandConfig::new(radio::Band::Fm, 87_500, 108_000, 100)],
    }
}

/// Lookup over a private registry that counts lookups.
#[derive(Default)]
pub struct CountingLookup {
    pub sm: ServiceManager,
    lookups: AtomicUsize,
}

impl CountingLookup {
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl ServiceLookup for CountingLookup {
    fn get_service(&self, name: &str) -> Option<SpIBinder> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.sm.check_service(name)
    }
}
