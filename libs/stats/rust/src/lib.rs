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

//! Best-effort telemetry client.
//!
//! [`StatsLog`] forwards atoms to the `stats` service. Logging never fails
//! loudly: every method reports whether the atom was handed over, and any
//! failure drops the cached connection so the next call looks the service up
//! again.
//!
//! ```
//! use statslog::StatsLog;
//! use std::sync::Arc;
//!
//! // Nothing is registered in a fresh service manager.
//! let stats = StatsLog::new(Arc::new(binder::ServiceManager::new()));
//! assert!(!stats.log_event(42));
//! ```

mod istatsd;

pub use istatsd::{BnStatsd, BpStatsd, IStatsd};

use binder::{ServiceHandle, ServiceLookup};

use std::sync::Arc;

/// States of the app breadcrumb atom.
pub mod app_breadcrumb_state {
    pub const UNSPECIFIED: i32 = 0;
    pub const STOP: i32 = 1;
    pub const START: i32 = 2;
}

const KNOWN_PUSH_OPTIONS: i32 = <dyn IStatsd>::FLAG_REQUIRE_STAGING
    | <dyn IStatsd>::FLAG_ROLLBACK_ENABLED
    | <dyn IStatsd>::FLAG_REQUIRE_LOW_LATENCY_MONITOR;

/// Client of the stats service.
pub struct StatsLog {
    service: ServiceHandle<dyn IStatsd>,
}

impl StatsLog {
    /// A client that finds the stats service through `lookup`.
    pub fn new(lookup: Arc<dyn ServiceLookup>) -> StatsLog {
        StatsLog { service: ServiceHandle::new(<dyn IStatsd>::SERVICE_NAME, lookup) }
    }

    /// Log the start of an event labelled `label`.
    pub fn log_start(&self, label: i32) -> bool {
        self.send("start", |statsd| {
            statsd.send_app_breadcrumb_atom(label, app_breadcrumb_state::START)
        })
    }

    /// Log the end of an event labelled `label`.
    pub fn log_stop(&self, label: i32) -> bool {
        self.send("stop", |statsd| {
            statsd.send_app_breadcrumb_atom(label, app_breadcrumb_state::STOP)
        })
    }

    /// Log a one-off event labelled `label`.
    pub fn log_event(&self, label: i32) -> bool {
        self.send("event", |statsd| {
            statsd.send_app_breadcrumb_atom(label, app_breadcrumb_state::UNSPECIFIED)
        })
    }

    /// Log a state change of a binary push (train) install.
    ///
    /// `options` is a combination of the `IStatsd::FLAG_*` bits; other bits
    /// are ignored.
    pub fn log_binary_push_state_changed(
        &self,
        train_name: &str,
        train_version_code: i64,
        options: i32,
        state: i32,
        experiment_ids: &[i64],
    ) -> bool {
        self.send("binary push state changed", |statsd| {
            statsd.send_binary_push_state_changed_atom(
                train_name,
                train_version_code,
                options & KNOWN_PUSH_OPTIONS,
                state,
                experiment_ids,
            )
        })
    }

    fn send<F>(&self, what: &str, call: F) -> bool
    where
        F: FnOnce(&dyn IStatsd) -> binder::Result<()>,
    {
        let mut service = self.service.lock();
        let Some(statsd) = service.resolve() else {
            log::debug!("Failed to find statsd when logging {}", what);
            return false;
        };
        match call(statsd.as_ref()) {
            Ok(()) => true,
            Err(status) => {
                service.invalidate();
                log::debug!("Failed to connect to statsd when logging {}: {}", what, status);
                false
            }
        }
    }
}

impl Default for StatsLog {
    /// A client of the process-wide service manager.
    fn default() -> StatsLog {
        StatsLog { service: ServiceHandle::with_default_manager(<dyn IStatsd>::SERVICE_NAME) }
    }
}
