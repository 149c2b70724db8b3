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

//! Broadcast radio client.
//!
//! [`RadioManager`] finds the `broadcastradio` service and opens tuner
//! sessions on it; each session is driven through a [`TunerAdapter`], which
//! implements the public [`RadioTuner`] API on top of the [`ITuner`] binder
//! interface.

mod ituner;
mod manager;
mod program;
mod radio_service;
mod status;
mod tuner;
mod types;

pub use ituner::{BnTuner, BpTuner, ITuner};
pub use manager::RadioManager;
pub use program::{
    identifier_type, metadata_key, program_info_flag, program_type, Identifier, ProgramInfo,
    ProgramSelector, RadioMetadata, MAX_SUB_CHANNEL,
};
pub use radio_service::{BnRadioService, BpRadioService, IRadioService};
pub use status::{status_code, RadioStatus, RemoteError, SelectorError, TunerError, STATUS_OK};
pub use tuner::{RadioTuner, StatusResult, TunerAdapter, TunerResult};
pub use types::{config_flag, Band, BandConfig, Direction, ModuleProperties, BAND_INVALID};
