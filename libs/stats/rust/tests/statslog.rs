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

//! Rust StatsLog tests against in-process stats daemons.

use binder::{Binder, ExceptionCode, Interface, ServiceLookup, ServiceManager, SpIBinder, Status};
use statslog::{app_breadcrumb_state, BnStatsd, IStatsd, StatsLog};

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;

#[derive(Clone, Debug, PartialEq)]
enum Atom {
    Breadcrumb { label: i32, state: i32 },
    BinaryPush {
        train_name: String,
        version: i64,
        options: i32,
        state: i32,
        experiments: Vec<i64>,
    },
}

#[derive(Default)]
struct FakeStatsd {
    atoms: Mutex<Vec<Atom>>,
    failure: Mutex<Option<Status>>,
}

impl FakeStatsd {
    fn atoms(&self) -> Vec<Atom> {
        self.atoms.lock().clone()
    }

    fn record(&self, atom: Atom) -> binder::Result<()> {
        if let Some(status) = self.failure.lock().clone() {
            return Err(status);
        }
        self.atoms.lock().push(atom);
        Ok(())
    }
}

impl Interface for FakeStatsd {}

impl IStatsd for FakeStatsd {
    fn send_app_breadcrumb_atom(&self, label: i32, state: i32) -> binder::Result<()> {
        self.record(Atom::Breadcrumb { label, state })
    }

    fn send_binary_push_state_changed_atom(
        &self,
        train_name: &str,
        train_version_code: i64,
        options: i32,
        state: i32,
        experiment_ids: &[i64],
    ) -> binder::Result<()> {
        self.record(Atom::BinaryPush {
            train_name: train_name.to_owned(),
            version: train_version_code,
            options,
            state,
            experiments: experiment_ids.to_vec(),
        })
    }
}

/// Private registry that counts lookups.
#[derive(Default)]
struct FakeLookup {
    sm: ServiceManager,
    lookups: AtomicUsize,
}

impl FakeLookup {
    fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    fn start_statsd(&self) -> (Arc<FakeStatsd>, Binder<BnStatsd>) {
        let statsd = Arc::new(FakeStatsd::default());
        let binder = BnStatsd::new_binder(statsd.clone());
        self.sm
            .add_service(<dyn IStatsd>::SERVICE_NAME, binder.as_binder())
            .expect("Could not register statsd");
        (statsd, binder)
    }
}

impl ServiceLookup for FakeLookup {
    fn get_service(&self, name: &str) -> Option<SpIBinder> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.sm.check_service(name)
    }
}

fn setup() -> (Arc<FakeLookup>, StatsLog) {
    let _ = env_logger::builder().is_test(true).try_init();
    let lookup = Arc::new(FakeLookup::default());
    let stats = StatsLog::new(lookup.clone());
    (lookup, stats)
}

#[test]
fn breadcrumbs_reach_statsd() {
    let (lookup, stats) = setup();
    let (statsd, _binder) = lookup.start_statsd();

    assert!(stats.log_start(7));
    assert!(stats.log_stop(7));
    assert!(stats.log_event(8));

    assert_eq!(
        statsd.atoms(),
        vec![
            Atom::Breadcrumb { label: 7, state: app_breadcrumb_state::START },
            Atom::Breadcrumb { label: 7, state: app_breadcrumb_state::STOP },
            Atom::Breadcrumb { label: 8, state: app_breadcrumb_state::UNSPECIFIED },
        ]
    );
    assert_eq!(lookup.lookups(), 1);
}

#[test]
fn binary_push_masks_unknown_options() {
    let (lookup, stats) = setup();
    let (statsd, _binder) = lookup.start_statsd();

    assert!(stats.log_binary_push_state_changed(
        "com.example.train",
        3_000_000_042,
        0xf3,
        5,
        &[11, 22]
    ));
    assert!(stats.log_binary_push_state_changed("", 0, 0, 0, &[]));

    assert_eq!(
        statsd.atoms(),
        vec![
            Atom::BinaryPush {
                train_name: "com.example.train".to_owned(),
                version: 3_000_000_042,
                options: <dyn IStatsd>::FLAG_REQUIRE_STAGING | <dyn IStatsd>::FLAG_ROLLBACK_ENABLED,
                state: 5,
                experiments: vec![11, 22],
            },
            Atom::BinaryPush {
                train_name: String::new(),
                version: 0,
                options: 0,
                state: 0,
                experiments: vec![],
            },
        ]
    );
}

#[test]
fn missing_statsd_is_looked_up_again() {
    let (lookup, stats) = setup();
    assert!(!stats.log_start(1));
    assert!(!stats.log_event(1));
    assert_eq!(lookup.lookups(), 2);

    let (statsd, _binder) = lookup.start_statsd();
    assert!(stats.log_event(1));
    assert_eq!(statsd.atoms().len(), 1);
}

#[test]
fn dead_statsd_is_replaced() {
    let (lookup, stats) = setup();
    let (first, binder) = lookup.start_statsd();
    assert!(stats.log_start(1));

    binder.kill();
    assert!(!stats.log_stop(1));
    assert_eq!(lookup.lookups(), 1);
    // The dead registration is dropped and nothing replaced it.
    assert!(!stats.log_stop(1));
    assert_eq!(lookup.lookups(), 2);

    let (second, _binder) = lookup.start_statsd();
    assert!(stats.log_stop(1));
    assert_eq!(lookup.lookups(), 3);
    assert_eq!(first.atoms().len(), 1);
    assert_eq!(
        second.atoms(),
        vec![Atom::Breadcrumb { label: 1, state: app_breadcrumb_state::STOP }]
    );
}

#[test]
fn daemon_exceptions_are_not_reported() {
    let (lookup, stats) = setup();
    let (statsd, _binder) = lookup.start_statsd();
    *statsd.failure.lock() =
        Some(Status::new_exception(ExceptionCode::ILLEGAL_ARGUMENT, Some("unknown label")));

    // One-way calls never see the daemon's answer.
    assert!(stats.log_event(-1));
    assert!(statsd.atoms().is_empty());
    assert_eq!(lookup.lookups(), 1);
}

#[test]
fn concurrent_logging_shares_one_connection() {
    let (lookup, stats) = setup();
    let (statsd, _binder) = lookup.start_statsd();
    let stats = Arc::new(stats);

    let threads: Vec<_> = (0..8)
        .map(|label| {
            let stats = stats.clone();
            thread::spawn(move || {
                for _ in 0..10 {
                    assert!(stats.log_event(label));
                }
            })
        })
        .collect();
    for t in threads {
        t.join().unwrap();
    }

    assert_eq!(statsd.atoms().len(), 80);
    assert_eq!(lookup.lookups(), 1);
}
