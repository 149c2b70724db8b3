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

//! Manually implemented IStatsd interface.

use binder::{
    declare_binder_proxy, Binder, Interface, Parcel, Remotable, StatusCode, Strong,
    TransactionCode, FIRST_CALL_TRANSACTION, FLAG_ONEWAY,
};

use std::result;

/// The stats daemon. Every method is one-way: the caller only learns about
/// transport failures, never about what the daemon did with the atom.
pub trait IStatsd: Interface {
    fn send_app_breadcrumb_atom(&self, label: i32, state: i32) -> binder::Result<()>;

    fn send_binary_push_state_changed_atom(
        &self,
        train_name: &str,
        train_version_code: i64,
        options: i32,
        state: i32,
        experiment_ids: &[i64],
    ) -> binder::Result<()>;
}

impl dyn IStatsd {
    /// Name the service registers under.
    pub const SERVICE_NAME: &'static str = "stats";

    pub const FLAG_REQUIRE_STAGING: i32 = 0x01;
    pub const FLAG_ROLLBACK_ENABLED: i32 = 0x02;
    pub const FLAG_REQUIRE_LOW_LATENCY_MONITOR: i32 = 0x04;
}

declare_binder_proxy!(BpStatsd: IStatsd["android.os.IStatsd"]);

const TRANSACTION_SEND_APP_BREADCRUMB_ATOM: TransactionCode = FIRST_CALL_TRANSACTION;
const TRANSACTION_SEND_BINARY_PUSH_STATE_CHANGED_ATOM: TransactionCode =
    FIRST_CALL_TRANSACTION + 1;

impl IStatsd for BpStatsd {
    fn send_app_breadcrumb_atom(&self, label: i32, state: i32) -> binder::Result<()> {
        self.0.call(Self::DESCRIPTOR, TRANSACTION_SEND_APP_BREADCRUMB_ATOM, FLAG_ONEWAY, |data| {
            data.write(&label)?;
            data.write(&state)
        })?;
        Ok(())
    }

    fn send_binary_push_state_changed_atom(
        &self,
        train_name: &str,
        train_version_code: i64,
        options: i32,
        state: i32,
        experiment_ids: &[i64],
    ) -> binder::Result<()> {
        self.0.call(
            Self::DESCRIPTOR,
            TRANSACTION_SEND_BINARY_PUSH_STATE_CHANGED_ATOM,
            FLAG_ONEWAY,
            |data| {
                data.write(train_name)?;
                data.write(&train_version_code)?;
                data.write(&options)?;
                data.write(&state)?;
                data.write(experiment_ids)
            },
        )?;
        Ok(())
    }
}

/// Native side of [`IStatsd`].
pub struct BnStatsd(Strong<dyn IStatsd>);

impl BnStatsd {
    pub fn new_binder(statsd: Strong<dyn IStatsd>) -> Binder<BnStatsd> {
        Binder::new(BnStatsd(statsd))
    }
}

impl Remotable for BnStatsd {
    fn get_descriptor(&self) -> &str {
        BpStatsd::DESCRIPTOR
    }

    fn on_transact(
        &self,
        code: TransactionCode,
        data: &Parcel,
        _reply: &mut Parcel,
    ) -> result::Result<(), StatusCode> {
        data.enforce_interface(BpStatsd::DESCRIPTOR)?;
        let result = match code {
            TRANSACTION_SEND_APP_BREADCRUMB_ATOM => {
                let label: i32 = data.read()?;
                let state: i32 = data.read()?;
                self.0.send_app_breadcrumb_atom(label, state)
            }
            TRANSACTION_SEND_BINARY_PUSH_STATE_CHANGED_ATOM => {
                let train_name: String = data.read()?;
                let train_version_code: i64 = data.read()?;
                let options: i32 = data.read()?;
                let state: i32 = data.read()?;
                let experiment_ids: Vec<i64> = data.read()?;
                self.0.send_binary_push_state_changed_atom(
                    &train_name,
                    train_version_code,
                    options,
                    state,
                    &experiment_ids,
                )
            }
            _ => return Err(StatusCode::UNKNOWN_TRANSACTION),
        };
        // One-way: nobody reads the reply.
        if let Err(status) = result {
            log::debug!("statsd transaction {} failed: {}", code, status);
        }
        Ok(())
    }
}
