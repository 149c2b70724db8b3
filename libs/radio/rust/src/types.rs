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

//! Band configuration and module description types.

use binder::{Parcel, Parcelable, StatusCode};

use std::result;

type Result<T> = result::Result<T, StatusCode>;

/// Wire value for "no band". Never a valid [`Band`].
pub const BAND_INVALID: i32 = -1;

/// Broadcast band.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Band {
    Am = 0,
    Fm = 1,
    FmHd = 2,
    AmHd = 3,
}

impl Band {
    pub fn from_raw(raw: i32) -> Option<Band> {
        match raw {
            0 => Some(Band::Am),
            1 => Some(Band::Fm),
            2 => Some(Band::FmHd),
            3 => Some(Band::AmHd),
            _ => None,
        }
    }

    pub fn to_raw(self) -> i32 {
        self as i32
    }

    pub fn is_am(self) -> bool {
        matches!(self, Band::Am | Band::AmHd)
    }

    /// Whether the band carries HD Radio sub-channels.
    pub fn is_hd(self) -> bool {
        matches!(self, Band::AmHd | Band::FmHd)
    }
}

impl Parcelable for Band {
    type Deserialized = Band;

    fn serialize(&self, parcel: &mut Parcel) -> Result<()> {
        parcel.write(&self.to_raw())
    }

    fn deserialize(parcel: &Parcel) -> Result<Band> {
        Band::from_raw(parcel.read()?).ok_or(StatusCode::BAD_VALUE)
    }
}

/// Direction for step and scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Direction {
    Up = 0,
    Down = 1,
}

impl Direction {
    pub fn is_down(self) -> bool {
        self == Direction::Down
    }
}

/// Tuner configuration flags, see `ITuner::is_config_flag_set`.
pub mod config_flag {
    pub const FORCE_MONO: i32 = 1;
    pub const FORCE_ANALOG: i32 = 2;
    pub const FORCE_DIGITAL: i32 = 3;
    pub const RDS_AF: i32 = 4;
    pub const RDS_REG: i32 = 5;
    pub const DAB_DAB_LINKING: i32 = 6;
    pub const DAB_FM_LINKING: i32 = 7;
    pub const DAB_DAB_SOFT_LINKING: i32 = 8;
    pub const DAB_FM_SOFT_LINKING: i32 = 9;
}

/// Configuration of one band: limits and spacing in kHz plus feature
/// switches.
///
/// `rds`, `ta`, `af` and `ea` only mean something for FM bands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BandConfig {
    pub region: i32,
    pub band: Band,
    pub lower_limit: i32,
    pub upper_limit: i32,
    pub spacing: i32,
    pub stereo: bool,
    pub rds: bool,
    pub ta: bool,
    pub af: bool,
    pub ea: bool,
}

impl BandConfig {
    /// A stereo configuration with every other feature off.
    pub fn new(band: Band, lower_limit: i32, upper_limit: i32, spacing: i32) -> BandConfig {
        BandConfig {
            region: 0,
            band,
            lower_limit,
            upper_limit,
            spacing,
            stereo: true,
            rds: false,
            ta: false,
            af: false,
            ea: false,
        }
    }

    /// Check limits and spacing. A config that fails is never sent.
    pub fn is_valid(&self) -> bool {
        self.lower_limit > 0
            && self.upper_limit > self.lower_limit
            && self.spacing > 0
            && self.spacing <= self.upper_limit - self.lower_limit
    }
}

impl Parcelable for BandConfig {
    type Deserialized = BandConfig;

    fn serialize(&self, parcel: &mut Parcel) -> Result<()> {
        parcel.write(&self.region)?;
        parcel.write(&self.band)?;
        parcel.write(&self.lower_limit)?;
        parcel.write(&self.upper_limit)?;
        parcel.write(&self.spacing)?;
        parcel.write(&self.stereo)?;
        parcel.write(&self.rds)?;
        parcel.write(&self.ta)?;
        parcel.write(&self.af)?;
        parcel.write(&self.ea)
    }

    fn deserialize(parcel: &Parcel) -> Result<BandConfig> {
        Ok(BandConfig {
            region: parcel.read()?,
            band: parcel.read()?,
            lower_limit: parcel.read()?,
            upper_limit: parcel.read()?,
            spacing: parcel.read()?,
            stereo: parcel.read()?,
            rds: parcel.read()?,
            ta: parcel.read()?,
            af: parcel.read()?,
            ea: parcel.read()?,
        })
    }
}

/// Description of one broadcast radio module (a HAL instance).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModuleProperties {
    pub id: i32,
    pub service_name: String,
    pub implementor: String,
    pub product: String,
    pub version: String,
    pub serial: String,
    pub num_tuners: i32,
    pub num_audio_sources: i32,
    pub is_capture_supported: bool,
    pub is_background_scanning_supported: bool,
    pub bands: Vec<BandConfig>,
}

impl Parcelable for ModuleProperties {
    type Deserialized = ModuleProperties;

    fn serialize(&self, parcel: &mut Parcel) -> Result<()> {
        parcel.write(&self.id)?;
        parcel.write(&self.service_name)?;
        parcel.write(&self.implementor)?;
        parcel.write(&self.product)?;
        parcel.write(&self.version)?;
        parcel.write(&self.serial)?;
        parcel.write(&self.num_tuners)?;
        parcel.write(&self.num_audio_sources)?;
        parcel.write(&self.is_capture_supported)?;
        parcel.write(&self.is_background_scanning_supported)?;
        parcel.write(&self.bands)
    }

    fn deserialize(parcel: &Parcel) -> Result<ModuleProperties> {
        Ok(ModuleProperties {
            id: parcel.read()?,
            service_name: parcel.read()?,
            implementor: parcel.read()?,
            product: parcel.read()?,
            version: parcel.read()?,
            serial: parcel.read()?,
            num_tuners: parcel.read()?,
            num_audio_sources: parcel.read()?,
            is_capture_supported: parcel.read()?,
            is_background_scanning_supported: parcel.read()?,
            bands: parcel.read()?,
        })
    }
}

#[test]
fn test_band_raw_values() {
    for band in [Band::Am, Band::Fm, Band::FmHd, Band::AmHd] {
        assert_eq!(Band::from_raw(band.to_raw()), Some(band));
    }
    assert_eq!(Band::from_raw(BAND_INVALID), None);
    assert_eq!(Band::from_raw(4), None);
    assert!(Band::AmHd.is_am() && Band::AmHd.is_hd());
    assert!(!Band::Fm.is_am() && !Band::Fm.is_hd());
}

#[test]
fn test_band_config_validity() {
    assert!(BandConfig::new(Band::Fm, 87500, 108000, 100).is_valid());
    assert!(BandConfig::new(Band::Am, 531, 1602, 9).is_valid());
    assert!(!BandConfig::new(Band::Fm, 108000, 87500, 100).is_valid());
    assert!(!BandConfig::new(Band::Fm, 0, 108000, 100).is_valid());
    assert!(!BandConfig::new(Band::Fm, 87500, 108000, 0).is_valid());
    assert!(!BandConfig::new(Band::Am, 531, 540, 10).is_valid());
}

#[test]
fn test_unknown_band_is_rejected_on_read() {
    let mut parcel = Parcel::new();
    parcel.write(&7i32).unwrap();
    parcel.set_data_position(0).unwrap();
    assert_eq!(parcel.read::<Band>(), Err(StatusCode::BAD_VALUE));
}
