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

//! Manually implemented IRadioService interface.

use crate::ituner::{BnTuner, ITuner};
use crate::types::{BandConfig, ModuleProperties};

use binder::{
    declare_binder_proxy, Binder, FromIBinder, Interface, Parcel, Remotable, SpIBinder,
    StatusCode, Strong, TransactionCode, FIRST_CALL_TRANSACTION,
};

use std::result;

/// Entry point of the broadcast radio service: enumerates modules and opens
/// tuner sessions on them.
pub trait IRadioService: Interface {
    fn list_modules(&self) -> binder::Result<Vec<ModuleProperties>>;

    fn open_tuner(
        &self,
        module_id: i32,
        config: Option<&BandConfig>,
        with_audio: bool,
    ) -> binder::Result<Strong<dyn ITuner>>;
}

impl dyn IRadioService {
    /// Name the service registers under.
    pub const SERVICE_NAME: &'static str = "broadcastradio";
}

declare_binder_proxy!(BpRadioService: IRadioService["android.hardware.radio.IRadioService"]);

const TRANSACTION_LIST_MODULES: TransactionCode = FIRST_CALL_TRANSACTION;
const TRANSACTION_OPEN_TUNER: TransactionCode = FIRST_CALL_TRANSACTION + 1;

impl IRadioService for BpRadioService {
    fn list_modules(&self) -> binder::Result<Vec<ModuleProperties>> {
        let reply = self.0.call(Self::DESCRIPTOR, TRANSACTION_LIST_MODULES, 0, |_| Ok(()))?;
        Ok(reply.read()?)
    }

    fn open_tuner(
        &self,
        module_id: i32,
        config: Option<&BandConfig>,
        with_audio: bool,
    ) -> binder::Result<Strong<dyn ITuner>> {
        let reply = self.0.call(Self::DESCRIPTOR, TRANSACTION_OPEN_TUNER, 0, |data| {
            data.write(&module_id)?;
            data.write(&config)?;
            data.write(&with_audio)
        })?;
        let tuner: SpIBinder = reply.read()?;
        Ok(<dyn ITuner as FromIBinder>::try_from(tuner)?)
    }
}

/// Native side of [`IRadioService`].
pub struct BnRadioService(Strong<dyn IRadioService>);

impl BnRadioService {
    pub fn new_binder(service: Strong<dyn IRadioService>) -> Binder<BnRadioService> {
        Binder::new(BnRadioService(service))
    }
}

impl Remotable for BnRadioService {
    fn get_descriptor(&self) -> &str {
        BpRadioService::DESCRIPTOR
    }

    fn on_transact(
        &self,
        code: TransactionCode,
        data: &Parcel,
        reply: &mut Parcel,
    ) -> result::Result<(), StatusCode> {
        data.enforce_interface(BpRadioService::DESCRIPTOR)?;
        match code {
            TRANSACTION_LIST_MODULES => reply.write_result(self.0.list_modules()),
            TRANSACTION_OPEN_TUNER => {
                let module_id: i32 = data.read()?;
                let config: Option<BandConfig> = data.read()?;
                let with_audio: bool = data.read()?;
                let tuner = self.0.open_tuner(module_id, config.as_ref(), with_audio).map(|tuner| {
                    // Local tuners get a native binder of their own.
                    tuner.to_binder().unwrap_or_else(|| BnTuner::new_binder(tuner).as_binder())
                });
                reply.write_result(tuner)
            }
            _ => Err(StatusCode::UNKNOWN_TRANSACTION),
        }
    }
}
