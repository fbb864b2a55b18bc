//! Reading and writing scalars at tuple slots.
//!
//! Fixed-width kinds occupy their native-endian footprint in place; the
//! NULL sentinel travels through storage unchanged. Variable-length columns
//! either inline `prefix + bytes` into the slot or store the 8-byte pool id
//! of a [`Varlen`](crate::varlen::Varlen) handle, with id 0 standing for
//! the NULL handle.

use crate::codec;
use crate::error::ValueError;
use crate::types::Kind;
use crate::utf8;
use crate::value::{ObjectRef, Value};
use crate::varlen::{temp_pool, VarlenPool};

fn ensure_slot(storage: &[u8], required: usize) -> Result<(), ValueError> {
    if storage.len() < required {
        return Err(ValueError::BufferTooSmall {
            required,
            available: storage.len(),
        });
    }
    Ok(())
}

/// Validates an object's width against its column declaration.
///
/// Varbinary columns and byte-constrained Varchar columns limit the byte
/// count; character-constrained Varchar columns limit UTF-8 code points.
/// Oversize input is an error, never an implicit truncation.
pub(crate) fn check_object_width(
    kind: Kind,
    bytes: &[u8],
    max_len: usize,
    in_bytes: bool,
) -> Result<(), ValueError> {
    if max_len == 0 {
        return Err(ValueError::ObjectTooLarge {
            actual: bytes.len(),
            max: 0,
            kind,
        });
    }
    if kind == Kind::Varbinary || in_bytes {
        if bytes.len() > max_len {
            return Err(ValueError::ObjectTooLarge {
                actual: bytes.len(),
                max: max_len,
                kind,
            });
        }
    } else {
        let chars = utf8::char_length(bytes);
        if chars > max_len {
            return Err(ValueError::ObjectTooLarge {
                actual: chars,
                max: max_len,
                kind,
            });
        }
    }
    Ok(())
}

fn write_object_inline(
    bytes: Option<&[u8]>,
    storage: &mut [u8],
    max_len: usize,
) -> Result<(), ValueError> {
    match bytes {
        None => {
            let total = max_len + codec::SHORT_PREFIX_LEN;
            ensure_slot(storage, total)?;
            storage[..total].fill(0);
            storage[0] = codec::OBJECT_NULL_BIT;
        }
        Some(bytes) => {
            let prefix = codec::prefix_len(bytes.len());
            let total = max_len + prefix;
            ensure_slot(storage, total)?;
            storage[..total].fill(0);
            codec::encode_length(Some(bytes.len()), storage)?;
            storage[prefix..prefix + bytes.len()].copy_from_slice(bytes);
        }
    }
    Ok(())
}

impl<'a> Value<'a> {
    /// Reads a scalar of `kind` from a tuple slot.
    ///
    /// With `inlined` set, object bytes are borrowed straight from
    /// `storage` and the returned value must not outlive it. Otherwise the
    /// slot carries a handle id resolved through `pool`.
    ///
    /// # Errors
    ///
    /// Returns `BufferTooSmall` for an undersized slot, `InvalidFormat` for
    /// a handle id the pool no longer knows, and `UnsupportedOperation` for
    /// kinds that are never tuple-resident.
    pub fn init_from_tuple_storage(
        storage: &'a [u8],
        kind: Kind,
        inlined: bool,
        pool: &VarlenPool,
    ) -> Result<Value<'a>, ValueError> {
        match kind {
            Kind::TinyInt => {
                ensure_slot(storage, 1)?;
                Ok(Value::TinyInt(storage[0] as i8))
            }
            Kind::Boolean => {
                ensure_slot(storage, 1)?;
                Ok(Value::Boolean(storage[0] as i8))
            }
            Kind::SmallInt => {
                ensure_slot(storage, 2)?;
                Ok(Value::SmallInt(i16::from_le_bytes(
                    storage[..2].try_into().unwrap(),
                )))
            }
            Kind::Integer => {
                ensure_slot(storage, 4)?;
                Ok(Value::Integer(i32::from_le_bytes(
                    storage[..4].try_into().unwrap(),
                )))
            }
            Kind::BigInt => {
                ensure_slot(storage, 8)?;
                Ok(Value::BigInt(i64::from_le_bytes(
                    storage[..8].try_into().unwrap(),
                )))
            }
            Kind::Timestamp => {
                ensure_slot(storage, 8)?;
                Ok(Value::Timestamp(i64::from_le_bytes(
                    storage[..8].try_into().unwrap(),
                )))
            }
            Kind::Double => {
                ensure_slot(storage, 8)?;
                Ok(Value::Double(f64::from_le_bytes(
                    storage[..8].try_into().unwrap(),
                )))
            }
            Kind::Decimal => {
                ensure_slot(storage, 16)?;
                Ok(Value::Decimal(i128::from_le_bytes(
                    storage[..16].try_into().unwrap(),
                )))
            }
            Kind::Varchar | Kind::Varbinary => {
                let object = if inlined {
                    let (len, prefix) = codec::decode_length(storage)?;
                    match len {
                        None => ObjectRef::Null,
                        Some(len) => {
                            let end = prefix + len;
                            ensure_slot(storage, end)?;
                            ObjectRef::Inlined(&storage[..end])
                        }
                    }
                } else {
                    ensure_slot(storage, 8)?;
                    let id = u64::from_le_bytes(storage[..8].try_into().unwrap());
                    if id == 0 {
                        ObjectRef::Null
                    } else {
                        let varlen = pool.lookup(id).ok_or_else(|| {
                            ValueError::InvalidFormat(format!(
                                "varlen handle {} is not live in the pool",
                                id
                            ))
                        })?;
                        ObjectRef::Owned(varlen)
                    }
                };
                Ok(match kind {
                    Kind::Varchar => Value::Varchar(object),
                    _ => Value::Varbinary(object),
                })
            }
            _ => Err(ValueError::UnsupportedOperation(format!(
                "{} cannot be read from tuple storage",
                kind
            ))),
        }
    }

    /// Writes this scalar into a tuple slot.
    ///
    /// Inlined objects are laid down as `prefix + bytes`, zero-padded to
    /// `max_len + prefix` bytes. Non-inlined objects are copied into a
    /// fresh allocation from `pool` (the temp pool when `None`) and the
    /// slot receives the handle id; a NULL object writes the zero id.
    /// Object widths are checked against `max_len`, in bytes or code
    /// points per `in_bytes`.
    pub fn serialize_to_tuple_storage(
        &self,
        storage: &mut [u8],
        inlined: bool,
        max_len: usize,
        in_bytes: bool,
        pool: Option<&VarlenPool>,
    ) -> Result<(), ValueError> {
        match self {
            Value::TinyInt(v) | Value::Boolean(v) => {
                ensure_slot(storage, 1)?;
                storage[0] = *v as u8;
            }
            Value::SmallInt(v) => {
                ensure_slot(storage, 2)?;
                storage[..2].copy_from_slice(&v.to_le_bytes());
            }
            Value::Integer(v) => {
                ensure_slot(storage, 4)?;
                storage[..4].copy_from_slice(&v.to_le_bytes());
            }
            Value::BigInt(v) | Value::Timestamp(v) => {
                ensure_slot(storage, 8)?;
                storage[..8].copy_from_slice(&v.to_le_bytes());
            }
            Value::Double(v) => {
                ensure_slot(storage, 8)?;
                storage[..8].copy_from_slice(&v.to_le_bytes());
            }
            Value::Decimal(v) => {
                ensure_slot(storage, 16)?;
                storage[..16].copy_from_slice(&v.to_le_bytes());
            }
            Value::Varchar(object) | Value::Varbinary(object) => {
                let bytes = object.bytes()?;
                if let Some(bytes) = bytes {
                    check_object_width(self.kind(), bytes, max_len, in_bytes)?;
                }
                if inlined {
                    write_object_inline(bytes, storage, max_len)?;
                } else {
                    ensure_slot(storage, 8)?;
                    match bytes {
                        None => storage[..8].fill(0),
                        Some(bytes) => {
                            let pool = pool.unwrap_or(temp_pool());
                            let varlen = pool.allocate(bytes);
                            storage[..8].copy_from_slice(&varlen.id().to_le_bytes());
                        }
                    }
                }
            }
            other => {
                return Err(ValueError::UnsupportedOperation(format!(
                    "{} cannot be written to tuple storage",
                    other.kind()
                )))
            }
        }
        Ok(())
    }
}
