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

//! Public tuner API and its binder-backed implementation.

use crate::ituner::ITuner;
use crate::program::{ProgramInfo, ProgramSelector};
use crate::radio_service::IRadioService;
use crate::status::{RadioStatus, TunerError};
use crate::types::{config_flag, Band, BandConfig, Direction};

use binder::{FailureKind, ServiceHandle, Status, Strong};

use std::collections::BTreeMap;
use std::result;
use std::sync::Arc;

use parking_lot::Mutex;

/// Result of the operations that report a [`RadioStatus`].
pub type StatusResult<T> = result::Result<T, RadioStatus>;

/// Result of the operations that fail with a [`TunerError`].
pub type TunerResult<T> = result::Result<T, TunerError>;

/// Control of one radio tuner.
///
/// Once [`close`](RadioTuner::close) has been called every other operation
/// fails without contacting the tuner: status operations with
/// [`RadioStatus::InvalidOperation`], the others with [`TunerError::Closed`].
pub trait RadioTuner: Send + Sync {
    /// Release the tuner. Calling it again does nothing.
    fn close(&self);

    fn set_configuration(&self, config: &BandConfig) -> StatusResult<()>;

    fn get_configuration(&self) -> StatusResult<BandConfig>;

    fn set_mute(&self, mute: bool) -> StatusResult<()>;

    /// Whether audio is muted. Reports `true` when the tuner is closed or
    /// its service is unreachable.
    fn get_mute(&self) -> TunerResult<bool>;

    fn step(&self, direction: Direction, skip_sub_channel: bool) -> StatusResult<()>;

    fn scan(&self, direction: Direction, skip_sub_channel: bool) -> StatusResult<()>;

    /// Tune to an AM/FM channel (kHz) of the current band. `sub_channel` is
    /// the 1-based HD Radio sub-channel, or 0.
    fn tune(&self, channel: i32, sub_channel: i32) -> StatusResult<()>;

    fn cancel(&self) -> StatusResult<()>;

    fn get_program_information(&self) -> StatusResult<ProgramInfo>;

    fn tune_selector(&self, selector: &ProgramSelector) -> TunerResult<()>;

    fn cancel_announcement(&self) -> TunerResult<()>;

    fn get_metadata_image(&self, id: i32) -> TunerResult<Option<Vec<u8>>>;

    fn start_background_scan(&self) -> TunerResult<bool>;

    fn get_program_list(
        &self,
        vendor_filter: Option<&BTreeMap<String, String>>,
    ) -> TunerResult<Vec<ProgramInfo>>;

    fn is_analog_forced(&self) -> TunerResult<bool> {
        self.is_config_flag_set(config_flag::FORCE_ANALOG)
    }

    fn set_analog_forced(&self, is_forced: bool) -> TunerResult<()> {
        self.set_config_flag(config_flag::FORCE_ANALOG, is_forced)
    }

    fn is_config_flag_supported(&self, flag: i32) -> TunerResult<bool>;

    fn is_config_flag_set(&self, flag: i32) -> TunerResult<bool>;

    fn set_config_flag(&self, flag: i32, value: bool) -> TunerResult<()>;

    fn set_parameters(
        &self,
        parameters: &BTreeMap<String, String>,
    ) -> TunerResult<BTreeMap<String, String>>;

    fn get_parameters(&self, keys: &[String]) -> TunerResult<BTreeMap<String, String>>;

    fn is_antenna_connected(&self) -> TunerResult<bool>;

    /// Whether this client still controls the tuner. Reports `false` when
    /// the tuner is closed or its service is unreachable.
    fn has_control(&self) -> TunerResult<bool>;
}

struct State {
    closed: bool,
    /// Band of the last configuration the tuner accepted.
    band: Option<Band>,
}

/// [`RadioTuner`] that forwards to an [`ITuner`] session.
///
/// Remote failures are translated: rejected arguments become
/// [`RadioStatus::BadValue`] / [`TunerError::InvalidArgument`], rejected
/// states [`RadioStatus::InvalidOperation`] / [`TunerError::IllegalState`],
/// and an unreachable service [`RadioStatus::DeadObject`] /
/// [`TunerError::ServiceDied`]. An unreachable service also invalidates the
/// radio service handle the tuner was opened through, if any, unless that
/// handle has already moved on to a newer connection.
///
/// Dropping the adapter closes it.
pub struct TunerAdapter {
    tuner: Strong<dyn ITuner>,
    state: Mutex<State>,
    opened_through: Option<OpenedThrough>,
}

/// The radio service connection a tuner session came from.
struct OpenedThrough {
    handle: Arc<ServiceHandle<dyn IRadioService>>,
    service: Strong<dyn IRadioService>,
}

impl TunerAdapter {
    /// Adapter for a tuner session opened on `band`, or on an unknown band.
    pub fn new(tuner: Strong<dyn ITuner>, band: Option<Band>) -> TunerAdapter {
        TunerAdapter {
            tuner,
            state: Mutex::new(State { closed: false, band }),
            opened_through: None,
        }
    }

    pub(crate) fn with_service(
        tuner: Strong<dyn ITuner>,
        band: Option<Band>,
        handle: Arc<ServiceHandle<dyn IRadioService>>,
        service: Strong<dyn IRadioService>,
    ) -> TunerAdapter {
        TunerAdapter {
            tuner,
            state: Mutex::new(State { closed: false, band }),
            opened_through: Some(OpenedThrough { handle, service }),
        }
    }

    /// Band of the last accepted configuration. Advisory only.
    pub fn band(&self) -> Option<Band> {
        self.state.lock().band
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    fn invalidate_service(&self) {
        if let Some(opened) = &self.opened_through {
            opened.handle.invalidate_if(&opened.service);
        }
    }

    fn service_died(&self, op: &str, status: &Status) {
        log::error!("service died during {}: {}", op, status);
        self.invalidate_service();
    }

    fn status_for(&self, op: &str, status: Status, state_rejected: RadioStatus) -> RadioStatus {
        match status.failure_kind().unwrap_or(FailureKind::Other) {
            FailureKind::ArgumentRejected => {
                log::error!("Can't {}: {}", op, status);
                RadioStatus::BadValue
            }
            FailureKind::StateRejected => {
                log::error!("Can't {}: {}", op, status);
                state_rejected
            }
            FailureKind::Unreachable => {
                self.service_died(op, &status);
                RadioStatus::DeadObject
            }
            FailureKind::Other => {
                log::error!("Failed to {}: {}", op, status);
                RadioStatus::Error
            }
        }
    }

    fn error_for(&self, op: &str, status: Status) -> TunerError {
        match status.failure_kind().unwrap_or(FailureKind::Other) {
            FailureKind::ArgumentRejected => TunerError::InvalidArgument(describe(op, &status)),
            FailureKind::StateRejected => TunerError::IllegalState(describe(op, &status)),
            FailureKind::Unreachable => {
                self.service_died(op, &status);
                TunerError::ServiceDied { source: status.into() }
            }
            FailureKind::Other => {
                log::error!("Failed to {}: {}", op, status);
                TunerError::Remote { source: status.into() }
            }
        }
    }

    /// Forward a status-surface operation.
    fn forward_status<T>(
        &self,
        op: &str,
        state_rejected: RadioStatus,
        call: impl FnOnce(&dyn ITuner) -> binder::Result<T>,
    ) -> StatusResult<T> {
        if self.is_closed() {
            log::debug!("Can't {}: tuner is closed", op);
            return Err(RadioStatus::InvalidOperation);
        }
        call(self.tuner.as_ref()).map_err(|status| self.status_for(op, status, state_rejected))
    }

    /// Forward a value-surface operation.
    fn forward<T>(
        &self,
        op: &str,
        call: impl FnOnce(&dyn ITuner) -> binder::Result<T>,
    ) -> TunerResult<T> {
        if self.is_closed() {
            return Err(TunerError::Closed);
        }
        call(self.tuner.as_ref()).map_err(|status| self.error_for(op, status))
    }
}

fn describe(op: &str, status: &Status) -> String {
    status.message().unwrap_or(op).to_owned()
}

impl RadioTuner for TunerAdapter {
    fn close(&self) {
        {
            let mut state = self.state.lock();
            if state.closed {
                log::trace!("Tuner is already closed");
                return;
            }
            state.closed = true;
        }
        if let Err(status) = self.tuner.close() {
            log::error!("Exception trying to close tuner: {}", status);
            if status.is_unreachable() {
                self.invalidate_service();
            }
        }
    }

    fn set_configuration(&self, config: &BandConfig) -> StatusResult<()> {
        if self.is_closed() {
            return Err(RadioStatus::InvalidOperation);
        }
        if !config.is_valid() {
            log::error!("Can't set configuration: invalid band config {:?}", config);
            return Err(RadioStatus::BadValue);
        }
        self.forward_status("set configuration", RadioStatus::InvalidOperation, |tuner| {
            tuner.set_configuration(config)
        })?;
        self.state.lock().band = Some(config.band);
        Ok(())
    }

    fn get_configuration(&self) -> StatusResult<BandConfig> {
        self.forward_status("get configuration", RadioStatus::InvalidOperation, |tuner| {
            tuner.get_configuration()
        })
    }

    fn set_mute(&self, mute: bool) -> StatusResult<()> {
        self.forward_status("set muted", RadioStatus::Error, |tuner| tuner.set_muted(mute))
    }

    fn get_mute(&self) -> TunerResult<bool> {
        if self.is_closed() {
            return Ok(true);
        }
        match self.tuner.is_muted() {
            Err(status) if status.is_unreachable() => {
                self.service_died("get mute", &status);
                Ok(true)
            }
            result => result.map_err(|status| self.error_for("get mute", status)),
        }
    }

    fn step(&self, direction: Direction, skip_sub_channel: bool) -> StatusResult<()> {
        self.forward_status("step", RadioStatus::InvalidOperation, |tuner| {
            tuner.step(direction.is_down(), skip_sub_channel)
        })
    }

    fn scan(&self, direction: Direction, skip_sub_channel: bool) -> StatusResult<()> {
        self.forward_status("scan", RadioStatus::InvalidOperation, |tuner| {
            tuner.scan(direction.is_down(), skip_sub_channel)
        })
    }

    fn tune(&self, channel: i32, sub_channel: i32) -> StatusResult<()> {
        if self.is_closed() {
            return Err(RadioStatus::InvalidOperation);
        }
        let selector = ProgramSelector::create_am_fm(self.band(), channel, sub_channel)
            .map_err(|e| {
                log::error!("Can't tune: {}", e);
                RadioStatus::BadValue
            })?;
        self.forward_status("tune", RadioStatus::InvalidOperation, |tuner| tuner.tune(&selector))
    }

    fn cancel(&self) -> StatusResult<()> {
        self.forward_status("cancel", RadioStatus::InvalidOperation, |tuner| tuner.cancel())
    }

    fn get_program_information(&self) -> StatusResult<ProgramInfo> {
        self.forward_status("get program information", RadioStatus::InvalidOperation, |tuner| {
            tuner.get_program_information()
        })
    }

    fn tune_selector(&self, selector: &ProgramSelector) -> TunerResult<()> {
        if self.is_closed() {
            return Err(TunerError::Closed);
        }
        if !selector.is_valid() {
            return Err(TunerError::InvalidArgument("selector has no primary id".to_owned()));
        }
        self.forward("tune", |tuner| tuner.tune(selector))
    }

    fn cancel_announcement(&self) -> TunerResult<()> {
        self.forward("cancel announcement", |tuner| tuner.cancel_announcement())
    }

    fn get_metadata_image(&self, id: i32) -> TunerResult<Option<Vec<u8>>> {
        self.forward("get metadata image", |tuner| tuner.get_image(id))
    }

    fn start_background_scan(&self) -> TunerResult<bool> {
        self.forward("start background scan", |tuner| tuner.start_background_scan())
    }

    fn get_program_list(
        &self,
        vendor_filter: Option<&BTreeMap<String, String>>,
    ) -> TunerResult<Vec<ProgramInfo>> {
        self.forward("get program list", |tuner| tuner.get_program_list(vendor_filter))
    }

    fn is_config_flag_supported(&self, flag: i32) -> TunerResult<bool> {
        self.forward("check config flag support", |tuner| tuner.is_config_flag_supported(flag))
    }

    fn is_config_flag_set(&self, flag: i32) -> TunerResult<bool> {
        self.forward("get config flag", |tuner| tuner.is_config_flag_set(flag))
    }

    fn set_config_flag(&self, flag: i32, value: bool) -> TunerResult<()> {
        self.forward("set config flag", |tuner| tuner.set_config_flag(flag, value))
    }

    fn set_parameters(
        &self,
        parameters: &BTreeMap<String, String>,
    ) -> TunerResult<BTreeMap<String, String>> {
        self.forward("set parameters", |tuner| tuner.set_parameters(parameters))
    }

    fn get_parameters(&self, keys: &[String]) -> TunerResult<BTreeMap<String, String>> {
        self.forward("get parameters", |tuner| tuner.get_parameters(keys))
    }

    fn is_antenna_connected(&self) -> TunerResult<bool> {
        self.forward("check antenna", |tuner| tuner.is_antenna_connected())
    }

    fn has_control(&self) -> TunerResult<bool> {
        if self.is_closed() {
            return Ok(false);
        }
        // The session can be closed on the service side, so ask it.
        match self.tuner.is_closed() {
            Ok(closed) => Ok(!closed),
            Err(status) if status.is_unreachable() => {
                self.service_died("check control", &status);
                Ok(false)
            }
            Err(status) => Err(self.error_for("check control", status)),
        }
    }
}

impl Drop for TunerAdapter {
    fn drop(&mut self) {
        self.close();
    }
}
