//! Stream serialization for parameter sets and export records.
//!
//! The wire format is big-endian throughout. Objects travel as an `i32`
//! length (`-1` for NULL) followed by raw bytes; decimals as two 64-bit
//! limbs, high before low; arrays as an element kind byte, an `i16` count,
//! and the encoded elements. The export form differs in two ways: NULL is
//! never written (callers keep a bitmap), and decimals carry a
//! `(scale, byte count)` prefix.

use bytes::{Buf, BufMut, BytesMut};

use crate::decimal;
use crate::error::ValueError;
use crate::types::Kind;
use crate::value::Value;
use crate::varlen::{temp_pool, VarlenPool};

/// Length written in place of a NULL object.
const WIRE_NULL_LENGTH: i32 = -1;

fn ensure_remaining(buf: &impl Buf, required: usize) -> Result<(), ValueError> {
    if buf.remaining() < required {
        return Err(ValueError::BufferTooSmall {
            required,
            available: buf.remaining(),
        });
    }
    Ok(())
}

fn decimal_limbs(scaled: i128) -> (i64, u64) {
    ((scaled >> 64) as i64, scaled as u64)
}

impl<'a> Value<'a> {
    /// Writes this value in the wire encoding, without a kind byte.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedOperation` for kinds with no wire form
    /// (Boolean, Address, untyped NULL) and for a NULL array.
    pub fn serialize_to(&self, out: &mut BytesMut) -> Result<(), ValueError> {
        match self {
            Value::TinyInt(v) => out.put_i8(*v),
            Value::SmallInt(v) => out.put_i16(*v),
            Value::Integer(v) => out.put_i32(*v),
            Value::BigInt(v) | Value::Timestamp(v) => out.put_i64(*v),
            Value::Double(v) => out.put_f64(*v),
            Value::Decimal(v) => {
                let (high, low) = decimal_limbs(*v);
                out.put_i64(high);
                out.put_u64(low);
            }
            Value::Varchar(_) | Value::Varbinary(_) => match self.object_bytes()? {
                None => out.put_i32(WIRE_NULL_LENGTH),
                Some(bytes) => {
                    let len = i32::try_from(bytes.len()).map_err(|_| {
                        ValueError::arithmetic_out_of_range(format!(
                            "object length {} exceeds the wire length field",
                            bytes.len()
                        ))
                    })?;
                    out.put_i32(len);
                    out.put_slice(bytes);
                }
            },
            Value::Array(Some(array)) => {
                out.put_i8(array.element_kind().to_wire());
                let count = i16::try_from(array.len()).map_err(|_| {
                    ValueError::arithmetic_out_of_range(format!(
                        "array length {} exceeds the wire count field",
                        array.len()
                    ))
                })?;
                out.put_i16(count);
                array.for_each(|element| {
                    element.serialize_to(out)?;
                    Ok(None::<()>)
                })?;
            }
            other => {
                return Err(ValueError::UnsupportedOperation(format!(
                    "{} has no wire serialization",
                    other.kind()
                )))
            }
        }
        Ok(())
    }

    /// Writes a kind byte followed by the wire encoding, producing one
    /// parameter in a parameter set.
    pub fn serialize_parameter(&self, out: &mut BytesMut) -> Result<(), ValueError> {
        out.put_i8(self.kind().to_wire());
        if self.kind() == Kind::Null {
            return Ok(());
        }
        self.serialize_to(out)
    }

    /// Reads one parameter: a kind byte, then the value in wire encoding.
    /// Object bytes are allocated from `pool` (the temp pool when `None`).
    pub fn deserialize_parameter(
        input: &mut impl Buf,
        pool: Option<&VarlenPool>,
    ) -> Result<Value<'static>, ValueError> {
        ensure_remaining(input, 1)?;
        let byte = input.get_i8();
        let kind = Kind::from_wire(byte)
            .ok_or_else(|| ValueError::InvalidFormat(format!("unknown kind byte {}", byte)))?;
        Value::deserialize_of_kind(kind, input, pool)
    }

    /// Reads a value of a known kind in wire encoding.
    pub fn deserialize_of_kind(
        kind: Kind,
        input: &mut impl Buf,
        pool: Option<&VarlenPool>,
    ) -> Result<Value<'static>, ValueError> {
        match kind {
            Kind::TinyInt => {
                ensure_remaining(input, 1)?;
                Ok(Value::TinyInt(input.get_i8()))
            }
            Kind::SmallInt => {
                ensure_remaining(input, 2)?;
                Ok(Value::SmallInt(input.get_i16()))
            }
            Kind::Integer => {
                ensure_remaining(input, 4)?;
                Ok(Value::Integer(input.get_i32()))
            }
            Kind::BigInt => {
                ensure_remaining(input, 8)?;
                Ok(Value::BigInt(input.get_i64()))
            }
            Kind::Timestamp => {
                ensure_remaining(input, 8)?;
                Ok(Value::Timestamp(input.get_i64()))
            }
            Kind::Double => {
                ensure_remaining(input, 8)?;
                Ok(Value::Double(input.get_f64()))
            }
            Kind::Decimal => {
                ensure_remaining(input, 16)?;
                let high = input.get_i64();
                let low = input.get_u64();
                Ok(Value::Decimal(((high as i128) << 64) | low as i128))
            }
            Kind::Varchar | Kind::Varbinary => {
                ensure_remaining(input, 4)?;
                let len = input.get_i32();
                if len == WIRE_NULL_LENGTH {
                    return Ok(Value::null_of(kind));
                }
                if len < 0 {
                    return Err(ValueError::InvalidFormat(format!(
                        "negative object length {} on the wire",
                        len
                    )));
                }
                let len = len as usize;
                ensure_remaining(input, len)?;
                let mut bytes = vec![0u8; len];
                input.copy_to_slice(&mut bytes);
                let pool = pool.unwrap_or(temp_pool());
                Ok(match kind {
                    Kind::Varchar => {
                        Value::Varchar(crate::value::ObjectRef::Owned(pool.allocate(&bytes)))
                    }
                    _ => Value::Varbinary(crate::value::ObjectRef::Owned(pool.allocate(&bytes))),
                })
            }
            Kind::Null => Ok(Value::Null),
            Kind::Array => {
                ensure_remaining(input, 3)?;
                let element_byte = input.get_i8();
                let element_kind = Kind::from_wire(element_byte).ok_or_else(|| {
                    ValueError::InvalidFormat(format!(
                        "unknown array element kind byte {}",
                        element_byte
                    ))
                })?;
                if element_kind == Kind::Array {
                    return Err(ValueError::UnsupportedOperation(
                        "nested arrays have no wire form".to_string(),
                    ));
                }
                let count = input.get_i16();
                if count < 0 {
                    return Err(ValueError::InvalidFormat(format!(
                        "negative array count {} on the wire",
                        count
                    )));
                }
                let array = Value::array_of(count as usize, element_kind)?;
                let mut elements = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    elements.push(Value::deserialize_of_kind(element_kind, input, pool)?);
                }
                array.set_array_elements(elements)?;
                Ok(array)
            }
            _ => Err(ValueError::UnsupportedOperation(format!(
                "{} has no wire deserialization",
                kind
            ))),
        }
    }

    /// Writes this non-NULL value in the export encoding. NULL columns are
    /// recorded in a caller-owned bitmap and must not reach this method.
    pub fn serialize_to_export(&self, out: &mut BytesMut) -> Result<(), ValueError> {
        if self.is_null() {
            return Err(ValueError::UnsupportedOperation(
                "NULL is signaled by the export bitmap, not serialized".to_string(),
            ));
        }
        match self {
            Value::TinyInt(v) => out.put_i8(*v),
            Value::SmallInt(v) => out.put_i16(*v),
            Value::Integer(v) => out.put_i32(*v),
            Value::BigInt(v) | Value::Timestamp(v) => out.put_i64(*v),
            Value::Double(v) => out.put_f64(*v),
            Value::Decimal(v) => {
                out.put_i8(decimal::SCALE as i8);
                out.put_i8(16);
                let (high, low) = decimal_limbs(*v);
                out.put_i64(high);
                out.put_u64(low);
            }
            Value::Varchar(_) | Value::Varbinary(_) => {
                let bytes = self.object_bytes()?.unwrap_or(&[]);
                out.put_i32(bytes.len() as i32);
                out.put_slice(bytes);
            }
            other => {
                return Err(ValueError::UnsupportedOperation(format!(
                    "{} has no export serialization",
                    other.kind()
                )))
            }
        }
        Ok(())
    }
}
