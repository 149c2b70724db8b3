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

//! Container for messages that are sent via binder.

use crate::error::{Status, StatusCode};
use crate::proxy::SpIBinder;

use std::cell::Cell;
use std::fmt;
use std::result;

use bytes::{Buf, BufMut, BytesMut};

mod parcelable;

pub use self::parcelable::Parcelable;

type Result<T> = result::Result<T, StatusCode>;

/// Container for a message (data and object references) that can be sent
/// through Binder.
///
/// A Parcel holds flattened data written with the [`Parcelable`] trait and
/// references to live Binder objects. Reads advance an internal position, so
/// they only need a shared reference; writes always append.
pub struct Parcel {
    data: BytesMut,
    position: Cell<usize>,
    objects: Vec<SpIBinder>,
}

impl Parcel {
    pub fn new() -> Self {
        Self {
            data: BytesMut::new(),
            position: Cell::new(0),
            objects: Vec::new(),
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the total amount of data contained in the parcel.
    pub fn data_size(&self) -> usize {
        self.data.len()
    }

    /// Returns the amount of data remaining to be read from the parcel. That is,
    /// data_size() - data_position().
    pub fn data_avail(&self) -> usize {
        self.data_size() - self.data_position()
    }

    /// Returns the current read position in the parcel data. Never more than
    /// data_size().
    pub fn data_position(&self) -> usize {
        self.position.get()
    }

    /// Move the current read position in the parcel.
    pub fn set_data_position(&self, pos: usize) -> Result<()> {
        // pos: New offset in the parcel; must be between 0 and data_size().
        if pos > self.data_size() {
            return Err(StatusCode::BAD_VALUE);
        }
        self.position.set(pos);
        Ok(())
    }

    /// Number of binder objects referenced by this parcel.
    pub fn objects_count(&self) -> usize {
        self.objects.len()
    }

    /// Writes any `Parcelable` type to this `Parcel`.
    pub fn write<P: Parcelable + ?Sized>(&mut self, parcelable: &P) -> Result<()> {
        parcelable.serialize(self)
    }

    /// Reads any `Parcelable` type from this `Parcel`.
    pub fn read<D: Parcelable<Deserialized = D>>(&self) -> Result<D> {
        D::deserialize(self)
    }

    /// Write an AIDL-style reply: the status header, then the value if the
    /// call succeeded.
    pub fn write_result<P: Parcelable>(&mut self, result: crate::Result<P>) -> Result<()> {
        match result {
            Ok(value) => {
                self.write(&Status::ok())?;
                self.write(&value)
            }
            Err(status) => self.write(&status),
        }
    }

    /// Write the interface token that the receiving side checks with
    /// [`enforce_interface`](Parcel::enforce_interface).
    pub fn write_interface_token(&mut self, descriptor: &str) -> Result<()> {
        self.write(descriptor)
    }

    /// Read the interface token and check that it names `descriptor`.
    pub fn enforce_interface(&self, descriptor: &str) -> Result<()> {
        let token: String = self.read()?;
        if token == descriptor {
            Ok(())
        } else {
            Err(StatusCode::BAD_TYPE)
        }
    }

    pub(crate) fn write_i32(&mut self, val: i32) -> Result<()> {
        self.data.put_i32_le(val);
        Ok(())
    }

    pub(crate) fn write_i64(&mut self, val: i64) -> Result<()> {
        self.data.put_i64_le(val);
        Ok(())
    }

    pub(crate) fn write_u8(&mut self, val: u8) -> Result<()> {
        self.data.put_u8(val);
        Ok(())
    }

    /// Write raw bytes followed by zero padding up to a 4 byte boundary.
    pub(crate) fn write_padded(&mut self, bytes: &[u8]) -> Result<()> {
        self.data.put_slice(bytes);
        self.pad();
        Ok(())
    }

    /// Write zero padding up to the next 4 byte boundary.
    pub(crate) fn pad(&mut self) {
        let padding = padding_for(self.data.len());
        self.data.put_bytes(0, padding);
    }

    /// Length prefix for a sequence of `len` elements.
    pub(crate) fn write_len(&mut self, len: usize) -> Result<()> {
        let len = i32::try_from(len).map_err(|_| StatusCode::BAD_VALUE)?;
        self.write_i32(len)
    }

    pub(crate) fn write_binder(&mut self, binder: &SpIBinder) -> Result<()> {
        let index = self.objects.len();
        self.objects.push(binder.clone());
        self.write_len(index)
    }

    /// Consume `len` bytes at the read position.
    fn read_bytes(&self, len: usize) -> Result<&[u8]> {
        let start = self.data_position();
        let end = start.checked_add(len).ok_or(StatusCode::BAD_VALUE)?;
        if end > self.data_size() {
            return Err(StatusCode::NOT_ENOUGH_DATA);
        }
        self.position.set(end);
        Ok(&self.data[start..end])
    }

    pub(crate) fn read_i32(&self) -> Result<i32> {
        self.read_bytes(4).map(|mut bytes| bytes.get_i32_le())
    }

    pub(crate) fn read_i64(&self) -> Result<i64> {
        self.read_bytes(8).map(|mut bytes| bytes.get_i64_le())
    }

    pub(crate) fn read_u8(&self) -> Result<u8> {
        self.read_bytes(1).map(|bytes| bytes[0])
    }

    /// Read `len` raw bytes and skip the padding that follows them.
    pub(crate) fn read_padded(&self, len: usize) -> Result<Vec<u8>> {
        let bytes = self.read_bytes(len)?.to_vec();
        self.skip_padding()?;
        Ok(bytes)
    }

    pub(crate) fn skip_padding(&self) -> Result<()> {
        self.read_bytes(padding_for(self.data_position())).map(|_| ())
    }

    /// Read a length prefix. Lengths are checked against the remaining data so
    /// a corrupt parcel cannot trigger a huge allocation.
    pub(crate) fn read_len(&self) -> Result<usize> {
        let len = usize::try_from(self.read_i32()?).map_err(|_| StatusCode::BAD_VALUE)?;
        if len > self.data_avail() {
            return Err(StatusCode::NOT_ENOUGH_DATA);
        }
        Ok(len)
    }

    pub(crate) fn read_binder(&self) -> Result<SpIBinder> {
        let index = usize::try_from(self.read_i32()?).map_err(|_| StatusCode::BAD_VALUE)?;
        self.objects.get(index).cloned().ok_or(StatusCode::BAD_INDEX)
    }
}

impl Default for Parcel {
    fn default() -> Self {
        Parcel::new()
    }
}

impl fmt::Debug for Parcel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parcel")
            .field("data_size", &self.data_size())
            .field("data_position", &self.data_position())
            .field("objects", &self.objects.len())
            .finish()
    }
}

fn padding_for(len: usize) -> usize {
    (4 - len % 4) % 4
}

#[test]
fn test_read_past_end() {
    let mut parcel = Parcel::new();
    assert!(parcel.write(&1i32).is_ok());
    assert!(parcel.set_data_position(0).is_ok());
    assert_eq!(parcel.read::<i32>(), Ok(1));
    assert_eq!(parcel.read::<i32>(), Err(StatusCode::NOT_ENOUGH_DATA));
    assert_eq!(parcel.set_data_position(5), Err(StatusCode::BAD_VALUE));
}

#[test]
fn test_interface_token() {
    let mut parcel = Parcel::new();
    assert!(parcel.write_interface_token("android.os.IStatsd").is_ok());
    assert!(parcel.write_interface_token("android.os.IStatsd").is_ok());
    assert!(parcel.set_data_position(0).is_ok());
    assert_eq!(parcel.enforce_interface("android.os.IStatsd"), Ok(()));
    assert_eq!(parcel.enforce_interface("android.hardware.radio.ITuner"), Err(StatusCode::BAD_TYPE));
}

#[test]
fn test_negative_length_is_rejected() {
    let mut parcel = Parcel::new();
    assert!(parcel.write(&-5i32).is_ok());
    assert!(parcel.set_data_position(0).is_ok());
    assert_eq!(parcel.read::<Vec<i32>>(), Err(StatusCode::BAD_VALUE));

    let mut parcel = Parcel::new();
    assert!(parcel.write(&1000i32).is_ok());
    assert!(parcel.set_data_position(0).is_ok());
    assert_eq!(parcel.read::<Vec<i32>>(), Err(StatusCode::NOT_ENOUGH_DATA));
}
