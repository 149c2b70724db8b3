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

use crate::error::StatusCode;
use crate::parcel::Parcel;
use crate::proxy::SpIBinder;

use std::collections::BTreeMap;
use std::result;

type Result<T> = result::Result<T, StatusCode>;

/// A struct whose instances can be written to and restored from a
/// [`Parcel`].
pub trait Parcelable {
    /// The owned type this struct deserializes into.
    type Deserialized;

    /// Serialize this instance into the given [`Parcel`].
    fn serialize(&self, parcel: &mut Parcel) -> Result<()>;

    /// Deserialize an instance from the given [`Parcel`].
    fn deserialize(parcel: &Parcel) -> Result<Self::Deserialized>;
}

// Unit return values take no space in a reply.
impl Parcelable for () {
    type Deserialized = ();

    fn serialize(&self, _parcel: &mut Parcel) -> Result<()> {
        Ok(())
    }

    fn deserialize(_parcel: &Parcel) -> Result<()> {
        Ok(())
    }
}

impl Parcelable for bool {
    type Deserialized = Self;

    fn serialize(&self, parcel: &mut Parcel) -> Result<()> {
        parcel.write_i32(*self as i32)
    }

    fn deserialize(parcel: &Parcel) -> Result<Self> {
        Ok(parcel.read_i32()? != 0)
    }
}

// Single bytes are written unpadded so byte arrays stay packed; the array
// impl pads once at the end.
impl Parcelable for u8 {
    type Deserialized = Self;

    fn serialize(&self, parcel: &mut Parcel) -> Result<()> {
        parcel.write_u8(*self)
    }

    fn deserialize(parcel: &Parcel) -> Result<Self> {
        parcel.read_u8()
    }
}

impl Parcelable for i32 {
    type Deserialized = Self;

    fn serialize(&self, parcel: &mut Parcel) -> Result<()> {
        parcel.write_i32(*self)
    }

    fn deserialize(parcel: &Parcel) -> Result<Self> {
        parcel.read_i32()
    }
}

impl Parcelable for u32 {
    type Deserialized = Self;

    fn serialize(&self, parcel: &mut Parcel) -> Result<()> {
        parcel.write_i32(*self as i32)
    }

    fn deserialize(parcel: &Parcel) -> Result<Self> {
        Ok(parcel.read_i32()? as u32)
    }
}

impl Parcelable for i64 {
    type Deserialized = Self;

    fn serialize(&self, parcel: &mut Parcel) -> Result<()> {
        parcel.write_i64(*self)
    }

    fn deserialize(parcel: &Parcel) -> Result<Self> {
        parcel.read_i64()
    }
}

impl Parcelable for str {
    type Deserialized = String;

    fn serialize(&self, parcel: &mut Parcel) -> Result<()> {
        parcel.write_len(self.len())?;
        parcel.write_padded(self.as_bytes())
    }

    fn deserialize(parcel: &Parcel) -> Result<String> {
        let len = parcel.read_len()?;
        let bytes = parcel.read_padded(len)?;
        String::from_utf8(bytes).map_err(|_| StatusCode::BAD_VALUE)
    }
}

impl Parcelable for String {
    type Deserialized = String;

    fn serialize(&self, parcel: &mut Parcel) -> Result<()> {
        self.as_str().serialize(parcel)
    }

    fn deserialize(parcel: &Parcel) -> Result<String> {
        str::deserialize(parcel)
    }
}

impl<P: Parcelable> Parcelable for [P] {
    type Deserialized = Vec<P::Deserialized>;

    fn serialize(&self, parcel: &mut Parcel) -> Result<()> {
        parcel.write_len(self.len())?;
        for item in self {
            item.serialize(parcel)?;
        }
        parcel.pad();
        Ok(())
    }

    fn deserialize(parcel: &Parcel) -> Result<Self::Deserialized> {
        let len = parcel.read_len()?;
        let mut vec = Vec::with_capacity(len);
        for _ in 0..len {
            vec.push(P::deserialize(parcel)?);
        }
        parcel.skip_padding()?;
        Ok(vec)
    }
}

impl<P: Parcelable> Parcelable for Vec<P> {
    type Deserialized = Vec<P::Deserialized>;

    fn serialize(&self, parcel: &mut Parcel) -> Result<()> {
        self.as_slice().serialize(parcel)
    }

    fn deserialize(parcel: &Parcel) -> Result<Self::Deserialized> {
        <[P]>::deserialize(parcel)
    }
}

impl<P: Parcelable> Parcelable for Option<P> {
    type Deserialized = Option<P::Deserialized>;

    fn serialize(&self, parcel: &mut Parcel) -> Result<()> {
        match self {
            Some(value) => {
                parcel.write_i32(1)?;
                value.serialize(parcel)
            }
            None => parcel.write_i32(0),
        }
    }

    fn deserialize(parcel: &Parcel) -> Result<Self::Deserialized> {
        match parcel.read_i32()? {
            0 => Ok(None),
            1 => P::deserialize(parcel).map(Some),
            _ => Err(StatusCode::BAD_VALUE),
        }
    }
}

impl<K, V> Parcelable for BTreeMap<K, V>
where
    K: Parcelable,
    K::Deserialized: Ord,
    V: Parcelable,
{
    type Deserialized = BTreeMap<K::Deserialized, V::Deserialized>;

    fn serialize(&self, parcel: &mut Parcel) -> Result<()> {
        parcel.write_len(self.len())?;
        for (key, value) in self {
            key.serialize(parcel)?;
            value.serialize(parcel)?;
        }
        Ok(())
    }

    fn deserialize(parcel: &Parcel) -> Result<Self::Deserialized> {
        let len = parcel.read_len()?;
        let mut map = BTreeMap::new();
        for _ in 0..len {
            let key = K::deserialize(parcel)?;
            let value = V::deserialize(parcel)?;
            map.insert(key, value);
        }
        Ok(map)
    }
}

impl Parcelable for SpIBinder {
    type Deserialized = SpIBinder;

    fn serialize(&self, parcel: &mut Parcel) -> Result<()> {
        parcel.write_binder(self)
    }

    fn deserialize(parcel: &Parcel) -> Result<SpIBinder> {
        parcel.read_binder()
    }
}

impl<P: Parcelable + ?Sized> Parcelable for &P {
    type Deserialized = P::Deserialized;

    fn serialize(&self, parcel: &mut Parcel) -> Result<()> {
        (**self).serialize(parcel)
    }

    fn deserialize(parcel: &Parcel) -> Result<Self::Deserialized> {
        P::deserialize(parcel)
    }
}

#[test]
fn test_custom_parcelable() {
    struct Custom(u32, bool, String, Vec<String>);

    impl Parcelable for Custom {
        type Deserialized = Self;

        fn serialize(&self, parcel: &mut Parcel) -> Result<()> {
            self.0.serialize(parcel)?;
            self.1.serialize(parcel)?;
            self.2.serialize(parcel)?;
            self.3.serialize(parcel)
        }

        fn deserialize(parcel: &Parcel) -> Result<Self> {
            Ok(Custom(parcel.read()?, parcel.read()?, parcel.read()?, parcel.read()?))
        }
    }

    let custom = Custom(
        123_456_789,
        true,
        "Custom Parcelable".to_string(),
        vec!["str1".to_string(), "str2".to_string(), "str3".to_string()],
    );

    let mut parcel = Parcel::new();

    assert!(custom.serialize(&mut parcel).is_ok());
    // 4 + 4 + (4 + 20) + 4 + 3 * (4 + 4)
    assert_eq!(parcel.data_size(), 60);

    assert!(parcel.set_data_position(0).is_ok());

    let custom2 = Custom::deserialize(&parcel).unwrap();

    assert_eq!(custom2.0, 123_456_789);
    assert!(custom2.1);
    assert_eq!(custom2.2, custom.2);
    assert_eq!(custom2.3, custom.3);
    assert_eq!(parcel.data_avail(), 0);
}

#[test]
fn test_byte_slices_are_packed() {
    let u8s = [101u8, 255, 42, 117, 7];

    let mut parcel = Parcel::new();

    assert!(u8s.serialize(&mut parcel).is_ok());
    assert_eq!(parcel.data(), [5, 0, 0, 0, 101, 255, 42, 117, 7, 0, 0, 0]);

    assert!(parcel.write(&-1i32).is_ok());
    assert!(parcel.set_data_position(0).is_ok());

    assert_eq!(parcel.read::<Vec<u8>>().unwrap(), u8s);
    assert_eq!(parcel.read::<i32>(), Ok(-1));
}

#[test]
fn test_option_and_map() {
    let mut map = BTreeMap::new();
    map.insert("region".to_string(), "eu".to_string());
    map.insert("vendor.key".to_string(), String::new());

    let mut parcel = Parcel::new();
    assert!(parcel.write(&Some(42i64)).is_ok());
    assert!(parcel.write(&None::<String>).is_ok());
    assert!(parcel.write(&map).is_ok());
    assert!(parcel.set_data_position(0).is_ok());

    assert_eq!(parcel.read::<Option<i64>>(), Ok(Some(42)));
    assert_eq!(parcel.read::<Option<String>>(), Ok(None));
    assert_eq!(parcel.read::<BTreeMap<String, String>>(), Ok(map));
}

#[test]
fn test_invalid_utf8_is_bad_value() {
    let mut parcel = Parcel::new();
    assert!(parcel.write(&vec![0xffu8, 0xfe]).is_ok());
    assert!(parcel.set_data_position(0).is_ok());
    assert_eq!(parcel.read::<String>(), Err(StatusCode::BAD_VALUE));
}
