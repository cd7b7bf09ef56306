// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Binary persistence for `f32` indexes (feature `std`).
//!
//! The stream is big-endian:
//!
//! ```text
//! i32 next_id
//! i32 entry_count
//! entry_count × {
//!     i32 id
//!     i32 payload_len, payload_len bytes of object payload
//!     f32 min_x, f32 max_x, f32 min_y, f32 max_y
//! }
//! ```
//!
//! Object payloads are produced and consumed by a caller-supplied [`ObjectCodec`].
//! Loading replays each entry under its original id, then restores the saved
//! counter, so ids survive a round trip exactly.
//!
//! Loading is not transactional: entries are added as they are read, so a
//! failure part-way through leaves the entries read so far in the index.

use core::hash::Hash;
use std::boxed::Box;
use std::io::{self, Read, Write};
use std::vec::Vec;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use thiserror::Error;

use crate::index::GenericIndex;
use crate::store::{Id, Store};
use crate::types::Rect;

/// Encodes and decodes application objects as opaque byte payloads.
pub trait ObjectCodec<O> {
    /// Error produced by the codec.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Append the encoding of `object` to `out`.
    fn encode(&self, object: &O, out: &mut Vec<u8>) -> Result<(), Self::Error>;

    /// Decode an object from exactly the bytes `encode` produced.
    fn decode(&self, bytes: &[u8]) -> Result<O, Self::Error>;
}

/// Errors while reading or writing a persisted index.
#[derive(Debug, Error)]
pub enum PersistError {
    /// The underlying reader or writer failed, including truncated input.
    #[error("I/O error on index stream")]
    Io(#[from] io::Error),
    /// The object codec rejected an object or payload.
    #[error("object codec failed for id {id}")]
    Codec {
        /// Id of the entry being encoded or decoded.
        id: Id,
        /// The codec's error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// A count, id or length field was negative.
    #[error("negative {field} in index stream: {value}")]
    Negative {
        /// Name of the field.
        field: &'static str,
        /// The value read.
        value: i32,
    },
    /// A value is too large for its 32-bit stream field.
    #[error("{field} does not fit in 32 bits: {value}")]
    TooLarge {
        /// Name of the field.
        field: &'static str,
        /// The value that did not fit.
        value: u64,
    },
    /// The id is already taken in the index being loaded into.
    #[error("duplicate id {0} in index stream")]
    DuplicateId(Id),
    /// The decoded object is already in the index being loaded into.
    #[error("object for id {0} is already in the index")]
    DuplicateObject(Id),
    /// An entry id is not below the stored counter, so it could be issued again.
    #[error("id {id} is not below the stored id counter {next_id}")]
    IdBeyondCounter {
        /// The entry id.
        id: Id,
        /// The stored counter.
        next_id: Id,
    },
}

fn write_u32<W: Write>(writer: &mut W, field: &'static str, value: u32) -> Result<(), PersistError> {
    let value = i32::try_from(value).map_err(|_| PersistError::TooLarge {
        field,
        value: u64::from(value),
    })?;
    writer.write_i32::<BigEndian>(value)?;
    Ok(())
}

fn write_len<W: Write>(writer: &mut W, field: &'static str, len: usize) -> Result<(), PersistError> {
    let value = u32::try_from(len).map_err(|_| PersistError::TooLarge {
        field,
        value: len as u64,
    })?;
    write_u32(writer, field, value)
}

fn read_u32<R: Read>(reader: &mut R, field: &'static str) -> Result<u32, PersistError> {
    let value = reader.read_i32::<BigEndian>()?;
    u32::try_from(value).map_err(|_| PersistError::Negative { field, value })
}

impl<O, S> GenericIndex<f32, O, S>
where
    O: Clone + Eq + Hash,
    S: Store<f32>,
{
    /// Write the index to `writer`, entries in ascending id order.
    ///
    /// Any index can be written: ids and the counter never exceed `i32::MAX`.
    pub fn write_to<W, C>(&self, mut writer: W, codec: &C) -> Result<(), PersistError>
    where
        W: Write,
        C: ObjectCodec<O>,
    {
        let mut entries: Vec<(Id, &O, Rect<f32>)> = self.iter().collect();
        entries.sort_unstable_by_key(|&(id, _, _)| id);

        write_u32(&mut writer, "id counter", self.next_id())?;
        write_len(&mut writer, "entry count", entries.len())?;

        let mut payload = Vec::new();
        for (id, object, rect) in &entries {
            write_u32(&mut writer, "id", *id)?;
            payload.clear();
            codec
                .encode(object, &mut payload)
                .map_err(|e| PersistError::Codec {
                    id: *id,
                    source: Box::new(e),
                })?;
            write_len(&mut writer, "payload length", payload.len())?;
            writer.write_all(&payload)?;
            writer.write_f32::<BigEndian>(rect.min_x)?;
            writer.write_f32::<BigEndian>(rect.max_x)?;
            writer.write_f32::<BigEndian>(rect.min_y)?;
            writer.write_f32::<BigEndian>(rect.max_y)?;
        }
        writer.flush()?;
        log::debug!(
            "wrote {} entries, next id {}",
            entries.len(),
            self.next_id()
        );
        Ok(())
    }

    /// Read entries from `reader` into this index, keeping their stored ids.
    ///
    /// The id counter becomes the stored counter (or stays at its current value
    /// if that is higher). On error, entries read before the failure remain.
    pub fn read_from<R, C>(&mut self, mut reader: R, codec: &C) -> Result<(), PersistError>
    where
        R: Read,
        C: ObjectCodec<O>,
    {
        let next_id = read_u32(&mut reader, "id counter")?;
        let count = read_u32(&mut reader, "entry count")?;

        let mut payload = Vec::new();
        for _ in 0..count {
            let id = read_u32(&mut reader, "id")?;
            let len = read_u32(&mut reader, "payload length")?;

            payload.clear();
            (&mut reader)
                .take(u64::from(len))
                .read_to_end(&mut payload)?;
            if payload.len() != len as usize {
                return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
            }
            let object = codec.decode(&payload).map_err(|e| PersistError::Codec {
                id,
                source: Box::new(e),
            })?;

            let min_x = reader.read_f32::<BigEndian>()?;
            let max_x = reader.read_f32::<BigEndian>()?;
            let min_y = reader.read_f32::<BigEndian>()?;
            let max_y = reader.read_f32::<BigEndian>()?;

            if id >= next_id {
                return Err(PersistError::IdBeyondCounter { id, next_id });
            }
            if self.get(id).is_some() {
                return Err(PersistError::DuplicateId(id));
            }
            if self.contains_object(&object) {
                return Err(PersistError::DuplicateObject(id));
            }
            self.insert_with_id(Rect::new(min_x, min_y, max_x, max_y), object, id);
        }

        self.set_next_id(self.next_id().max(next_id));
        log::debug!("read {count} entries, next id {}", self.next_id());
        Ok(())
    }
}

impl<O, S> GenericIndex<f32, O, S>
where
    O: Clone + Eq + Hash,
    S: Store<f32> + Default,
{
    /// Build a new index from a stream written by [`write_to`][Self::write_to].
    pub fn load<R, C>(reader: R, codec: &C) -> Result<Self, PersistError>
    where
        R: Read,
        C: ObjectCodec<O>,
    {
        let mut index = Self::new();
        index.read_from(reader, codec)?;
        Ok(index)
    }
}
