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

mod common;

use common::{dead_object, illegal_argument, illegal_state, init_logger, security, FakeTuner};

use radio::{
    config_flag, identifier_type, program_type, Band, BandConfig, Direction, Identifier,
    ProgramSelector, RadioStatus, RadioTuner, TunerAdapter, TunerError,
};

use std::collections::BTreeMap;
use std::error::Error;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;

fn fm_config() -> BandConfig {
    BandConfig::new(Band::Fm, 87_500, 108_000, 100)
}

fn am_config() -> BandConfig {
    BandConfig::new(Band::Am, 531, 1_602, 9)
}

fn open(band: Option<Band>) -> (Arc<FakeTuner>, TunerAdapter) {
    init_logger();
    let fake = FakeTuner::new();
    let adapter = TunerAdapter::new(fake.clone(), band);
    (fake, adapter)
}

#[test]
fn close_is_idempotent() {
    let (fake, adapter) = open(Some(Band::Fm));
    for _ in 0..5 {
        adapter.close();
    }
    assert!(adapter.is_closed());
    assert_eq!(fake.count("close"), 1);

    drop(adapter);
    assert_eq!(fake.count("close"), 1);
}

#[test]
fn concurrent_close_notifies_once() {
    let (fake, adapter) = open(Some(Band::Fm));
    let adapter = Arc::new(adapter);
    let threads: Vec<_> = (0..16)
        .map(|_| {
            let adapter = adapter.clone();
            thread::spawn(move || adapter.close())
        })
        .collect();
    for t in threads {
        t.join().unwrap();
    }
    assert_eq!(fake.count("close"), 1);
}

#[test]
fn close_failure_is_swallowed() {
    let (fake, adapter) = open(Some(Band::Fm));
    fake.fail_with(dead_object());
    adapter.close();
    assert!(adapter.is_closed());
    adapter.close();
    assert_eq!(fake.count("close"), 1);
}

#[test]
fn drop_closes_tuner() {
    let (fake, adapter) = open(None);
    drop(adapter);
    assert_eq!(fake.count("close"), 1);
}

#[test]
fn closed_adapter_never_calls_remote() {
    let (fake, adapter) = open(Some(Band::Fm));
    adapter.close();
    let calls = fake.total_calls();

    assert_eq!(adapter.set_configuration(&fm_config()), Err(RadioStatus::InvalidOperation));
    assert_eq!(adapter.get_configuration(), Err(RadioStatus::InvalidOperation));
    assert_eq!(adapter.set_mute(true), Err(RadioStatus::InvalidOperation));
    assert!(adapter.get_mute().unwrap());
    assert_eq!(adapter.step(Direction::Up, false), Err(RadioStatus::InvalidOperation));
    assert_eq!(adapter.scan(Direction::Down, true), Err(RadioStatus::InvalidOperation));
    assert_eq!(adapter.tune(101_100, 0), Err(RadioStatus::InvalidOperation));
    assert_eq!(adapter.cancel(), Err(RadioStatus::InvalidOperation));
    assert_eq!(adapter.get_program_information(), Err(RadioStatus::InvalidOperation));
    assert!(!adapter.has_control().unwrap());

    let selector = ProgramSelector::create_am_fm(Some(Band::Fm), 101_100, 0).unwrap();
    assert!(matches!(adapter.tune_selector(&selector), Err(TunerError::Closed)));
    assert!(matches!(adapter.cancel_announcement(), Err(TunerError::Closed)));
    assert!(matches!(adapter.get_metadata_image(1), Err(TunerError::Closed)));
    assert!(matches!(adapter.start_background_scan(), Err(TunerError::Closed)));
    assert!(matches!(adapter.get_program_list(None), Err(TunerError::Closed)));
    assert!(matches!(adapter.is_analog_forced(), Err(TunerError::Closed)));
    assert!(matches!(adapter.set_analog_forced(true), Err(TunerError::Closed)));
    assert!(matches!(
        adapter.is_config_flag_supported(config_flag::RDS_AF),
        Err(TunerError::Closed)
    ));
    assert!(matches!(adapter.set_parameters(&BTreeMap::new()), Err(TunerError::Closed)));
    assert!(matches!(adapter.get_parameters(&[]), Err(TunerError::Closed)));
    assert!(matches!(adapter.is_antenna_connected(), Err(TunerError::Closed)));

    assert_eq!(fake.total_calls(), calls);
}

#[test]
fn argument_rejected_maps_to_bad_value_and_keeps_band() {
    let (fake, adapter) = open(Some(Band::Fm));
    fake.fail_with(illegal_argument());

    assert_eq!(adapter.set_configuration(&am_config()), Err(RadioStatus::BadValue));
    assert_eq!(adapter.band(), Some(Band::Fm));
    assert_eq!(adapter.step(Direction::Up, false), Err(RadioStatus::BadValue));
    assert_eq!(adapter.tune(101_100, 0), Err(RadioStatus::BadValue));
    assert_eq!(adapter.set_mute(false), Err(RadioStatus::BadValue));
}

#[test]
fn state_rejected_maps_to_invalid_operation() {
    let (fake, adapter) = open(Some(Band::Fm));
    fake.fail_with(illegal_state());

    assert_eq!(adapter.step(Direction::Up, false), Err(RadioStatus::InvalidOperation));
    assert_eq!(adapter.scan(Direction::Up, false), Err(RadioStatus::InvalidOperation));
    assert_eq!(adapter.tune(101_100, 0), Err(RadioStatus::InvalidOperation));
    assert_eq!(adapter.cancel(), Err(RadioStatus::InvalidOperation));
    assert_eq!(adapter.get_configuration(), Err(RadioStatus::InvalidOperation));
    // Muting reports a generic error instead.
    assert_eq!(adapter.set_mute(true), Err(RadioStatus::Error));
}

#[test]
fn unreachable_maps_to_dead_object() {
    let (fake, adapter) = open(Some(Band::Fm));
    fake.fail_with(dead_object());

    assert_eq!(adapter.set_configuration(&fm_config()), Err(RadioStatus::DeadObject));
    assert_eq!(adapter.get_configuration(), Err(RadioStatus::DeadObject));
    assert_eq!(adapter.set_mute(true), Err(RadioStatus::DeadObject));
    assert_eq!(adapter.step(Direction::Down, true), Err(RadioStatus::DeadObject));
    assert_eq!(adapter.cancel(), Err(RadioStatus::DeadObject));
    assert_eq!(adapter.get_program_information(), Err(RadioStatus::DeadObject));
}

#[test]
fn other_remote_failure_maps_to_error() {
    let (fake, adapter) = open(Some(Band::Fm));
    fake.fail_with(security());
    assert_eq!(adapter.cancel(), Err(RadioStatus::Error));
    assert!(matches!(adapter.start_background_scan(), Err(TunerError::Remote { .. })));
}

#[test]
fn value_operations_wrap_failures() {
    let (fake, adapter) = open(Some(Band::Fm));

    fake.fail_with(illegal_argument());
    match adapter.set_config_flag(config_flag::FORCE_MONO, true) {
        Err(TunerError::InvalidArgument(message)) => assert_eq!(message, "rejected by tuner"),
        other => panic!("unexpected {:?}", other),
    }

    fake.fail_with(illegal_state());
    assert!(matches!(adapter.cancel_announcement(), Err(TunerError::IllegalState(_))));

    fake.fail_with(dead_object());
    let err = adapter.get_program_list(None).unwrap_err();
    assert!(matches!(err, TunerError::ServiceDied { .. }));
    assert!(err.source().unwrap().to_string().contains("dead object"));
}

#[test]
fn fail_safe_answers_when_unreachable() {
    let (fake, adapter) = open(Some(Band::Fm));
    adapter.set_mute(false).unwrap();
    assert!(!adapter.get_mute().unwrap());

    fake.fail_with(dead_object());
    assert!(adapter.get_mute().unwrap());
    assert!(!adapter.has_control().unwrap());
}

#[test]
fn mute_and_control_surface_rejections() {
    let (fake, adapter) = open(Some(Band::Fm));

    fake.fail_with(illegal_argument());
    assert!(matches!(adapter.get_mute(), Err(TunerError::InvalidArgument(_))));
    assert!(matches!(adapter.has_control(), Err(TunerError::InvalidArgument(_))));

    fake.fail_with(illegal_state());
    assert!(matches!(adapter.get_mute(), Err(TunerError::IllegalState(_))));
    assert!(matches!(adapter.has_control(), Err(TunerError::IllegalState(_))));

    fake.fail_with(security());
    assert!(matches!(adapter.get_mute(), Err(TunerError::Remote { .. })));
    assert!(matches!(adapter.has_control(), Err(TunerError::Remote { .. })));
}

#[test]
fn has_control_asks_tuner() {
    let (fake, adapter) = open(Some(Band::Fm));
    assert!(adapter.has_control().unwrap());
    assert!(adapter.has_control().unwrap());
    assert_eq!(fake.count("is_closed"), 2);

    // Closed on the service side: the local flag still says open.
    fake.closed_remotely.store(true, Ordering::SeqCst);
    assert!(!adapter.has_control().unwrap());
    assert!(!adapter.is_closed());
    assert_eq!(fake.count("is_closed"), 3);
}

#[test]
fn band_is_committed_after_success() {
    let (fake, adapter) = open(Some(Band::Fm));
    adapter.set_configuration(&am_config()).unwrap();
    assert_eq!(adapter.band(), Some(Band::Am));

    adapter.tune(1_000, 0).unwrap();
    let tuned = fake.tuned().unwrap();
    assert_eq!(tuned.program_type, program_type::AM);
    assert_eq!(tuned.primary_id, Identifier::new(identifier_type::AMFM_FREQUENCY, 1_000));
}

#[test]
fn invalid_config_is_rejected_locally() {
    let (fake, adapter) = open(Some(Band::Fm));
    let invalid = BandConfig::new(Band::Fm, 108_000, 87_500, 100);
    assert_eq!(adapter.set_configuration(&invalid), Err(RadioStatus::BadValue));
    assert_eq!(fake.count("set_configuration"), 0);
}

#[test]
fn tune_validates_channel_for_current_band() {
    let (fake, adapter) = open(Some(Band::Am));
    assert_eq!(adapter.tune(101_100, 0), Err(RadioStatus::BadValue));
    assert_eq!(adapter.tune(1_000, 1), Err(RadioStatus::BadValue));
    assert_eq!(fake.count("tune"), 0);
}

#[test]
fn tune_without_band_infers_it() {
    let (fake, adapter) = open(None);
    adapter.tune(97_900, 2).unwrap();
    let tuned = fake.tuned().unwrap();
    assert_eq!(tuned.program_type, program_type::FM);
    assert_eq!(
        tuned.first_secondary_id(identifier_type::HD_SUBCHANNEL),
        Some(&Identifier::new(identifier_type::HD_SUBCHANNEL, 1))
    );
}

#[test]
fn tune_selector_requires_primary_id() {
    let (fake, adapter) = open(Some(Band::Fm));
    assert!(matches!(
        adapter.tune_selector(&ProgramSelector::default()),
        Err(TunerError::InvalidArgument(_))
    ));
    assert_eq!(fake.count("tune"), 0);

    let selector = ProgramSelector::new(
        program_type::DAB,
        Identifier::new(identifier_type::DAB_SIDECC, 0x1_e0c1),
    );
    adapter.tune_selector(&selector).unwrap();
    assert_eq!(fake.tuned(), Some(selector));
}

#[test]
fn analog_forced_uses_config_flag() {
    let (fake, adapter) = open(Some(Band::Fm));
    assert!(!adapter.is_analog_forced().unwrap());
    adapter.set_analog_forced(true).unwrap();
    assert!(adapter.is_analog_forced().unwrap());
    assert!(adapter.is_config_flag_set(config_flag::FORCE_ANALOG).unwrap());
    assert!(!adapter.is_config_flag_set(config_flag::FORCE_DIGITAL).unwrap());
    assert_eq!(fake.count("set_config_flag"), 1);
}

#[test]
fn value_operations_forward_results() {
    let (_fake, adapter) = open(Some(Band::Fm));
    assert_eq!(adapter.get_metadata_image(1).unwrap().map(|image| image.len()), Some(4));
    assert_eq!(adapter.get_metadata_image(2).unwrap(), None);
    assert!(adapter.start_background_scan().unwrap());
    assert!(adapter.is_antenna_connected().unwrap());
    assert!(adapter.is_config_flag_supported(config_flag::RDS_AF).unwrap());
    assert!(!adapter.is_config_flag_supported(config_flag::DAB_FM_LINKING).unwrap());

    let parameters = BTreeMap::from([("vendor.volume".to_owned(), "7".to_owned())]);
    assert_eq!(adapter.set_parameters(&parameters).unwrap(), parameters);
    assert_eq!(
        adapter
            .get_parameters(&["vendor.volume".to_owned(), "vendor.missing".to_owned()])
            .unwrap(),
        parameters
    );
    assert_eq!(adapter.get_program_list(Some(&parameters)).unwrap()[0].vendor_info, parameters);
}

#[test]
fn configure_then_service_dies() {
    let (fake, adapter) = open(Some(Band::Am));
    let config = fm_config();

    assert_eq!(adapter.set_configuration(&config), Ok(()));
    assert_eq!(adapter.get_configuration(), Ok(config));
    assert_eq!(adapter.band(), Some(Band::Fm));

    fake.fail_with(dead_object());
    assert_eq!(adapter.set_mute(true), Err(RadioStatus::DeadObject));
    let err = adapter.set_config_flag(config_flag::FORCE_MONO, true).unwrap_err();
    assert!(matches!(err, TunerError::ServiceDied { .. }));
    assert!(err.source().is_some());

    fake.recover();
    assert_eq!(adapter.set_mute(true), Ok(()));
    assert!(adapter.get_mute().unwrap());
}
