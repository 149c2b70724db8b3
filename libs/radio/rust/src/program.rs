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

//! Program identification: identifiers, selectors, program info and
//! metadata.

use crate::status::SelectorError;
use crate::types::Band;

use binder::{Parcel, Parcelable, StatusCode};

use std::collections::BTreeMap;
use std::result;

type Result<T> = result::Result<T, StatusCode>;

pub mod program_type {
    pub const INVALID: i32 = 0;
    pub const AM: i32 = 1;
    pub const FM: i32 = 2;
    pub const AM_HD: i32 = 3;
    pub const FM_HD: i32 = 4;
    pub const DAB: i32 = 5;
    pub const DRMO: i32 = 6;
    pub const SXM: i32 = 7;
}

pub mod identifier_type {
    pub const INVALID: i32 = 0;
    pub const AMFM_FREQUENCY: i32 = 1;
    pub const RDS_PI: i32 = 2;
    pub const HD_STATION_ID_EXT: i32 = 3;
    pub const HD_SUBCHANNEL: i32 = 4;
    pub const DAB_SIDECC: i32 = 5;
    pub const DAB_ENSEMBLE: i32 = 6;
    pub const DAB_SCID: i32 = 7;
    pub const DAB_FREQUENCY: i32 = 8;
    pub const DRMO_SERVICE_ID: i32 = 9;
    pub const DRMO_FREQUENCY: i32 = 10;
    pub const DRMO_MODULATION: i32 = 11;
    pub const SXM_SERVICE_ID: i32 = 12;
    pub const SXM_CHANNEL: i32 = 13;
}

/// HD Radio allows up to eight sub-channels per station.
pub const MAX_SUB_CHANNEL: i32 = 8;

/// A typed program identifier, for example an AM/FM frequency in kHz.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Identifier {
    pub id_type: i32,
    pub value: i64,
}

impl Identifier {
    pub fn new(id_type: i32, value: i64) -> Identifier {
        Identifier { id_type, value }
    }
}

impl Parcelable for Identifier {
    type Deserialized = Identifier;

    fn serialize(&self, parcel: &mut Parcel) -> Result<()> {
        parcel.write(&self.id_type)?;
        parcel.write(&self.value)
    }

    fn deserialize(parcel: &Parcel) -> Result<Identifier> {
        Ok(Identifier {
            id_type: parcel.read()?,
            value: parcel.read()?,
        })
    }
}

/// Selects a program: the primary identifier plus optional secondary ones
/// that narrow it down (an HD sub-channel, for instance).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProgramSelector {
    pub program_type: i32,
    pub primary_id: Identifier,
    pub secondary_ids: Vec<Identifier>,
    pub vendor_ids: Vec<i64>,
}

impl ProgramSelector {
    pub fn new(program_type: i32, primary_id: Identifier) -> ProgramSelector {
        ProgramSelector {
            program_type,
            primary_id,
            secondary_ids: Vec::new(),
            vendor_ids: Vec::new(),
        }
    }

    /// A selector without a primary identifier cannot select anything.
    pub fn is_valid(&self) -> bool {
        self.primary_id.id_type != identifier_type::INVALID
    }

    /// The first secondary identifier of the given type.
    pub fn first_secondary_id(&self, id_type: i32) -> Option<&Identifier> {
        self.secondary_ids.iter().find(|id| id.id_type == id_type)
    }

    /// Build an AM/FM selector for `frequency_khz`.
    ///
    /// Without a band, AM or FM is inferred from the frequency (below
    /// 50 MHz is AM), and an HD band is picked when `sub_channel` is set.
    /// `sub_channel` is 1-based; 0 means none.
    pub fn create_am_fm(
        band: Option<Band>,
        frequency_khz: i32,
        sub_channel: i32,
    ) -> result::Result<ProgramSelector, SelectorError> {
        let band = band.unwrap_or(match (frequency_khz < 50_000, sub_channel > 0) {
            (true, false) => Band::Am,
            (true, true) => Band::AmHd,
            (false, false) => Band::Fm,
            (false, true) => Band::FmHd,
        });

        if !(0..=MAX_SUB_CHANNEL).contains(&sub_channel) {
            return Err(SelectorError::SubChannelOutOfRange(sub_channel));
        }
        if sub_channel > 0 && !band.is_hd() {
            return Err(SelectorError::SubChannelWithoutHd(band));
        }
        if !is_valid_am_fm_frequency(band.is_am(), frequency_khz) {
            return Err(SelectorError::FrequencyOutOfRange { band, frequency_khz });
        }

        let program_type = if band.is_am() { program_type::AM } else { program_type::FM };
        let mut selector = ProgramSelector::new(
            program_type,
            Identifier::new(identifier_type::AMFM_FREQUENCY, frequency_khz.into()),
        );
        if sub_channel > 0 {
            // Sub-channel identifiers are 0-based.
            selector
                .secondary_ids
                .push(Identifier::new(identifier_type::HD_SUBCHANNEL, (sub_channel - 1).into()));
        }
        Ok(selector)
    }
}

fn is_valid_am_fm_frequency(is_am: bool, frequency_khz: i32) -> bool {
    if is_am {
        frequency_khz > 150 && frequency_khz <= 30_000
    } else {
        frequency_khz > 60_000 && frequency_khz < 110_000
    }
}

impl Parcelable for ProgramSelector {
    type Deserialized = ProgramSelector;

    fn serialize(&self, parcel: &mut Parcel) -> Result<()> {
        parcel.write(&self.program_type)?;
        parcel.write(&self.primary_id)?;
        parcel.write(&self.secondary_ids)?;
        parcel.write(&self.vendor_ids)
    }

    fn deserialize(parcel: &Parcel) -> Result<ProgramSelector> {
        Ok(ProgramSelector {
            program_type: parcel.read()?,
            primary_id: parcel.read()?,
            secondary_ids: parcel.read()?,
            vendor_ids: parcel.read()?,
        })
    }
}

/// Well-known metadata keys.
pub mod metadata_key {
    pub const RDS_PI: &str = "android.hardware.radio.metadata.RDS_PI";
    pub const RDS_PS: &str = "android.hardware.radio.metadata.RDS_PS";
    pub const RDS_PTY: &str = "android.hardware.radio.metadata.RDS_PTY";
    pub const RDS_RT: &str = "android.hardware.radio.metadata.RDS_RT";
    pub const TITLE: &str = "android.hardware.radio.metadata.TITLE";
    pub const ARTIST: &str = "android.hardware.radio.metadata.ARTIST";
    pub const ALBUM: &str = "android.hardware.radio.metadata.ALBUM";
    pub const GENRE: &str = "android.hardware.radio.metadata.GENRE";
    pub const ICON: &str = "android.hardware.radio.metadata.ICON";
    pub const ART: &str = "android.hardware.radio.metadata.ART";
    pub const PROGRAM_NAME: &str = "android.hardware.radio.metadata.PROGRAM_NAME";
}

/// Program metadata. Image keys ([`metadata_key::ICON`],
/// [`metadata_key::ART`]) hold an int id for `ITuner::get_image`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RadioMetadata {
    ints: BTreeMap<String, i32>,
    strings: BTreeMap<String, String>,
}

impl RadioMetadata {
    pub fn new() -> RadioMetadata {
        RadioMetadata::default()
    }

    pub fn put_int(&mut self, key: &str, value: i32) -> &mut Self {
        self.ints.insert(key.to_owned(), value);
        self
    }

    pub fn put_string(&mut self, key: &str, value: &str) -> &mut Self {
        self.strings.insert(key.to_owned(), value.to_owned());
        self
    }

    pub fn get_int(&self, key: &str) -> Option<i32> {
        self.ints.get(key).copied()
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.strings.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.ints.contains_key(key) || self.strings.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.ints.len() + self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Parcelable for RadioMetadata {
    type Deserialized = RadioMetadata;

    fn serialize(&self, parcel: &mut Parcel) -> Result<()> {
        parcel.write(&self.ints)?;
        parcel.write(&self.strings)
    }

    fn deserialize(parcel: &Parcel) -> Result<RadioMetadata> {
        Ok(RadioMetadata {
            ints: parcel.read()?,
            strings: parcel.read()?,
        })
    }
}

pub mod program_info_flag {
    pub const LIVE: i32 = 1 << 0;
    pub const MUTED: i32 = 1 << 1;
    pub const TRAFFIC_PROGRAM: i32 = 1 << 2;
    pub const TRAFFIC_ANNOUNCEMENT: i32 = 1 << 3;
    pub const TUNED: i32 = 1 << 4;
    pub const STEREO: i32 = 1 << 5;
}

/// What the tuner is (or could be) playing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProgramInfo {
    pub selector: ProgramSelector,
    pub logically_tuned_to: Option<Identifier>,
    pub physically_tuned_to: Option<Identifier>,
    pub related_content: Vec<Identifier>,
    pub info_flags: i32,
    pub signal_quality: i32,
    pub metadata: Option<RadioMetadata>,
    pub vendor_info: BTreeMap<String, String>,
}

impl ProgramInfo {
    pub fn new(selector: ProgramSelector) -> ProgramInfo {
        ProgramInfo {
            logically_tuned_to: Some(selector.primary_id),
            physically_tuned_to: Some(selector.primary_id),
            selector,
            ..Default::default()
        }
    }

    pub fn is_tuned(&self) -> bool {
        self.info_flags & program_info_flag::TUNED != 0
    }

    pub fn is_stereo(&self) -> bool {
        self.info_flags & program_info_flag::STEREO != 0
    }

    pub fn is_live(&self) -> bool {
        self.info_flags & program_info_flag::LIVE != 0
    }

    pub fn is_muted(&self) -> bool {
        self.info_flags & program_info_flag::MUTED != 0
    }
}

impl Parcelable for ProgramInfo {
    type Deserialized = ProgramInfo;

    fn serialize(&self, parcel: &mut Parcel) -> Result<()> {
        parcel.write(&self.selector)?;
        parcel.write(&self.logically_tuned_to)?;
        parcel.write(&self.physically_tuned_to)?;
        parcel.write(&self.related_content)?;
        parcel.write(&self.info_flags)?;
        parcel.write(&self.signal_quality)?;
        parcel.write(&self.metadata)?;
        parcel.write(&self.vendor_info)
    }

    fn deserialize(parcel: &Parcel) -> Result<ProgramInfo> {
        Ok(ProgramInfo {
            selector: parcel.read()?,
            logically_tuned_to: parcel.read()?,
            physically_tuned_to: parcel.read()?,
            related_content: parcel.read()?,
            info_flags: parcel.read()?,
            signal_quality: parcel.read()?,
            metadata: parcel.read()?,
            vendor_info: parcel.read()?,
        })
    }
}
