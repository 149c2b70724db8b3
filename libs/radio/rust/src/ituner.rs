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

//! Manually implemented ITuner interface.

use crate::program::{ProgramInfo, ProgramSelector};
use crate::types::BandConfig;

use binder::{
    declare_binder_proxy, Binder, Interface, Parcel, Remotable, StatusCode, Strong,
    TransactionCode, FIRST_CALL_TRANSACTION,
};

use std::collections::BTreeMap;
use std::result;

/// One open session with a radio module.
///
/// Implementations report rejected arguments as `ILLEGAL_ARGUMENT` and
/// operations that do not fit the tuner's state (closed, busy, unsupported)
/// as `ILLEGAL_STATE`.
pub trait ITuner: Interface {
    fn close(&self) -> binder::Result<()>;

    /// Whether the session has ended, from this or any other side.
    fn is_closed(&self) -> binder::Result<bool>;

    fn set_configuration(&self, config: &BandConfig) -> binder::Result<()>;

    fn get_configuration(&self) -> binder::Result<BandConfig>;

    fn set_muted(&self, mute: bool) -> binder::Result<()>;

    fn is_muted(&self) -> binder::Result<bool>;

    fn step(&self, direction_down: bool, skip_sub_channel: bool) -> binder::Result<()>;

    fn scan(&self, direction_down: bool, skip_sub_channel: bool) -> binder::Result<()>;

    fn tune(&self, selector: &ProgramSelector) -> binder::Result<()>;

    fn cancel(&self) -> binder::Result<()>;

    fn cancel_announcement(&self) -> binder::Result<()>;

    fn get_program_information(&self) -> binder::Result<ProgramInfo>;

    /// Raw image data for a metadata image id, if the tuner still has it.
    fn get_image(&self, id: i32) -> binder::Result<Option<Vec<u8>>>;

    fn start_background_scan(&self) -> binder::Result<bool>;

    fn get_program_list(
        &self,
        vendor_filter: Option<&BTreeMap<String, String>>,
    ) -> binder::Result<Vec<ProgramInfo>>;

    fn is_config_flag_supported(&self, flag: i32) -> binder::Result<bool>;

    fn is_config_flag_set(&self, flag: i32) -> binder::Result<bool>;

    fn set_config_flag(&self, flag: i32, value: bool) -> binder::Result<()>;

    fn set_parameters(
        &self,
        parameters: &BTreeMap<String, String>,
    ) -> binder::Result<BTreeMap<String, String>>;

    fn get_parameters(&self, keys: &[String]) -> binder::Result<BTreeMap<String, String>>;

    fn is_antenna_connected(&self) -> binder::Result<bool>;
}

declare_binder_proxy!(BpTuner: ITuner["android.hardware.radio.ITuner"]);

const TRANSACTION_CLOSE: TransactionCode = FIRST_CALL_TRANSACTION;
const TRANSACTION_IS_CLOSED: TransactionCode = FIRST_CALL_TRANSACTION + 1;
const TRANSACTION_SET_CONFIGURATION: TransactionCode = FIRST_CALL_TRANSACTION + 2;
const TRANSACTION_GET_CONFIGURATION: TransactionCode = FIRST_CALL_TRANSACTION + 3;
const TRANSACTION_SET_MUTED: TransactionCode = FIRST_CALL_TRANSACTION + 4;
const TRANSACTION_IS_MUTED: TransactionCode = FIRST_CALL_TRANSACTION + 5;
const TRANSACTION_STEP: TransactionCode = FIRST_CALL_TRANSACTION + 6;
const TRANSACTION_SCAN: TransactionCode = FIRST_CALL_TRANSACTION + 7;
const TRANSACTION_TUNE: TransactionCode = FIRST_CALL_TRANSACTION + 8;
const TRANSACTION_CANCEL: TransactionCode = FIRST_CALL_TRANSACTION + 9;
const TRANSACTION_CANCEL_ANNOUNCEMENT: TransactionCode = FIRST_CALL_TRANSACTION + 10;
const TRANSACTION_GET_PROGRAM_INFORMATION: TransactionCode = FIRST_CALL_TRANSACTION + 11;
const TRANSACTION_GET_IMAGE: TransactionCode = FIRST_CALL_TRANSACTION + 12;
const TRANSACTION_START_BACKGROUND_SCAN: TransactionCode = FIRST_CALL_TRANSACTION + 13;
const TRANSACTION_GET_PROGRAM_LIST: TransactionCode = FIRST_CALL_TRANSACTION + 14;
const TRANSACTION_IS_CONFIG_FLAG_SUPPORTED: TransactionCode = FIRST_CALL_TRANSACTION + 15;
const TRANSACTION_IS_CONFIG_FLAG_SET: TransactionCode = FIRST_CALL_TRANSACTION + 16;
const TRANSACTION_SET_CONFIG_FLAG: TransactionCode = FIRST_CALL_TRANSACTION + 17;
const TRANSACTION_SET_PARAMETERS: TransactionCode = FIRST_CALL_TRANSACTION + 18;
const TRANSACTION_GET_PARAMETERS: TransactionCode = FIRST_CALL_TRANSACTION + 19;
const TRANSACTION_IS_ANTENNA_CONNECTED: TransactionCode = FIRST_CALL_TRANSACTION + 20;

impl BpTuner {
    fn call<F>(&self, code: TransactionCode, args: F) -> binder::Result<Parcel>
    where
        F: FnOnce(&mut Parcel) -> result::Result<(), StatusCode>,
    {
        self.0.call(Self::DESCRIPTOR, code, 0, args)
    }
}

impl ITuner for BpTuner {
    fn close(&self) -> binder::Result<()> {
        self.call(TRANSACTION_CLOSE, |_| Ok(()))?;
        Ok(())
    }

    fn is_closed(&self) -> binder::Result<bool> {
        let reply = self.call(TRANSACTION_IS_CLOSED, |_| Ok(()))?;
        Ok(reply.read()?)
    }

    fn set_configuration(&self, config: &BandConfig) -> binder::Result<()> {
        self.call(TRANSACTION_SET_CONFIGURATION, |data| data.write(config))?;
        Ok(())
    }

    fn get_configuration(&self) -> binder::Result<BandConfig> {
        let reply = self.call(TRANSACTION_GET_CONFIGURATION, |_| Ok(()))?;
        Ok(reply.read()?)
    }

    fn set_muted(&self, mute: bool) -> binder::Result<()> {
        self.call(TRANSACTION_SET_MUTED, |data| data.write(&mute))?;
        Ok(())
    }

    fn is_muted(&self) -> binder::Result<bool> {
        let reply = self.call(TRANSACTION_IS_MUTED, |_| Ok(()))?;
        Ok(reply.read()?)
    }

    fn step(&self, direction_down: bool, skip_sub_channel: bool) -> binder::Result<()> {
        self.call(TRANSACTION_STEP, |data| {
            data.write(&direction_down)?;
            data.write(&skip_sub_channel)
        })?;
        Ok(())
    }

    fn scan(&self, direction_down: bool, skip_sub_channel: bool) -> binder::Result<()> {
        self.call(TRANSACTION_SCAN, |data| {
            data.write(&direction_down)?;
            data.write(&skip_sub_channel)
        })?;
        Ok(())
    }

    fn tune(&self, selector: &ProgramSelector) -> binder::Result<()> {
        self.call(TRANSACTION_TUNE, |data| data.write(selector))?;
        Ok(())
    }

    fn cancel(&self) -> binder::Result<()> {
        self.call(TRANSACTION_CANCEL, |_| Ok(()))?;
        Ok(())
    }

    fn cancel_announcement(&self) -> binder::Result<()> {
        self.call(TRANSACTION_CANCEL_ANNOUNCEMENT, |_| Ok(()))?;
        Ok(())
    }

    fn get_program_information(&self) -> binder::Result<ProgramInfo> {
        let reply = self.call(TRANSACTION_GET_PROGRAM_INFORMATION, |_| Ok(()))?;
        Ok(reply.read()?)
    }

    fn get_image(&self, id: i32) -> binder::Result<Option<Vec<u8>>> {
        let reply = self.call(TRANSACTION_GET_IMAGE, |data| data.write(&id))?;
        Ok(reply.read()?)
    }

    fn start_background_scan(&self) -> binder::Result<bool> {
        let reply = self.call(TRANSACTION_START_BACKGROUND_SCAN, |_| Ok(()))?;
        Ok(reply.read()?)
    }

    fn get_program_list(
        &self,
        vendor_filter: Option<&BTreeMap<String, String>>,
    ) -> binder::Result<Vec<ProgramInfo>> {
        let reply = self.call(TRANSACTION_GET_PROGRAM_LIST, |data| data.write(&vendor_filter))?;
        Ok(reply.read()?)
    }

    fn is_config_flag_supported(&self, flag: i32) -> binder::Result<bool> {
        let reply = self.call(TRANSACTION_IS_CONFIG_FLAG_SUPPORTED, |data| data.write(&flag))?;
        Ok(reply.read()?)
    }

    fn is_config_flag_set(&self, flag: i32) -> binder::Result<bool> {
        let reply = self.call(TRANSACTION_IS_CONFIG_FLAG_SET, |data| data.write(&flag))?;
        Ok(reply.read()?)
    }

    fn set_config_flag(&self, flag: i32, value: bool) -> binder::Result<()> {
        self.call(TRANSACTION_SET_CONFIG_FLAG, |data| {
            data.write(&flag)?;
            data.write(&value)
        })?;
        Ok(())
    }

    fn set_parameters(
        &self,
        parameters: &BTreeMap<String, String>,
    ) -> binder::Result<BTreeMap<String, String>> {
        let reply = self.call(TRANSACTION_SET_PARAMETERS, |data| data.write(parameters))?;
        Ok(reply.read()?)
    }

    fn get_parameters(&self, keys: &[String]) -> binder::Result<BTreeMap<String, String>> {
        let reply = self.call(TRANSACTION_GET_PARAMETERS, |data| data.write(keys))?;
        Ok(reply.read()?)
    }

    fn is_antenna_connected(&self) -> binder::Result<bool> {
        let reply = self.call(TRANSACTION_IS_ANTENNA_CONNECTED, |_| Ok(()))?;
        Ok(reply.read()?)
    }
}

/// Native side of [`ITuner`]: decodes transactions and calls the wrapped
/// implementation.
pub struct BnTuner(Strong<dyn ITuner>);

impl BnTuner {
    /// Wrap a local tuner so that it can be handed out as a binder.
    pub fn new_binder(tuner: Strong<dyn ITuner>) -> Binder<BnTuner> {
        Binder::new(BnTuner(tuner))
    }
}

impl Remotable for BnTuner {
    fn get_descriptor(&self) -> &str {
        BpTuner::DESCRIPTOR
    }

    fn on_transact(
        &self,
        code: TransactionCode,
        data: &Parcel,
        reply: &mut Parcel,
    ) -> result::Result<(), StatusCode> {
        data.enforce_interface(BpTuner::DESCRIPTOR)?;
        let tuner = self.0.as_ref();
        match code {
            TRANSACTION_CLOSE => reply.write_result(tuner.close()),
            TRANSACTION_IS_CLOSED => reply.write_result(tuner.is_closed()),
            TRANSACTION_SET_CONFIGURATION => {
                let config: BandConfig = data.read()?;
                reply.write_result(tuner.set_configuration(&config))
            }
            TRANSACTION_GET_CONFIGURATION => reply.write_result(tuner.get_configuration()),
            TRANSACTION_SET_MUTED => {
                let mute: bool = data.read()?;
                reply.write_result(tuner.set_muted(mute))
            }
            TRANSACTION_IS_MUTED => reply.write_result(tuner.is_muted()),
            TRANSACTION_STEP => {
                let direction_down: bool = data.read()?;
                let skip_sub_channel: bool = data.read()?;
                reply.write_result(tuner.step(direction_down, skip_sub_channel))
            }
            TRANSACTION_SCAN => {
                let direction_down: bool = data.read()?;
                let skip_sub_channel: bool = data.read()?;
                reply.write_result(tuner.scan(direction_down, skip_sub_channel))
            }
            TRANSACTION_TUNE => {
                let selector: ProgramSelector = data.read()?;
                reply.write_result(tuner.tune(&selector))
            }
            TRANSACTION_CANCEL => reply.write_result(tuner.cancel()),
            TRANSACTION_CANCEL_ANNOUNCEMENT => reply.write_result(tuner.cancel_announcement()),
            TRANSACTION_GET_PROGRAM_INFORMATION => {
                reply.write_result(tuner.get_program_information())
            }
            TRANSACTION_GET_IMAGE => {
                let id: i32 = data.read()?;
                reply.write_result(tuner.get_image(id))
            }
            TRANSACTION_START_BACKGROUND_SCAN => reply.write_result(tuner.start_background_scan()),
            TRANSACTION_GET_PROGRAM_LIST => {
                let vendor_filter: Option<BTreeMap<String, String>> = data.read()?;
                reply.write_result(tuner.get_program_list(vendor_filter.as_ref()))
            }
            TRANSACTION_IS_CONFIG_FLAG_SUPPORTED => {
                let flag: i32 = data.read()?;
                reply.write_result(tuner.is_config_flag_supported(flag))
            }
            TRANSACTION_IS_CONFIG_FLAG_SET => {
                let flag: i32 = data.read()?;
                reply.write_result(tuner.is_config_flag_set(flag))
            }
            TRANSACTION_SET_CONFIG_FLAG => {
                let flag: i32 = data.read()?;
                let value: bool = data.read()?;
                reply.write_result(tuner.set_config_flag(flag, value))
            }
            TRANSACTION_SET_PARAMETERS => {
                let parameters: BTreeMap<String, String> = data.read()?;
                reply.write_result(tuner.set_parameters(&parameters))
            }
            TRANSACTION_GET_PARAMETERS => {
                let keys: Vec<String> = data.read()?;
                reply.write_result(tuner.get_parameters(&keys))
            }
            TRANSACTION_IS_ANTENNA_CONNECTED => reply.write_result(tuner.is_antenna_connected()),
            _ => Err(StatusCode::UNKNOWN_TRANSACTION),
        }
    }
}
