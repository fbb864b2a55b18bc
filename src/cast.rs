//! Cross-kind conversion engine.
//!
//! [`Value::cast_as`] implements the full conversion matrix with
//! overflow and out-of-range detection. A NULL input always casts to the
//! typed NULL of the destination; narrowing conversions refuse to produce
//! a NULL sentinel by accident.

use crate::decimal;
use crate::error::ValueError;
use crate::types::Kind;
use crate::value::{
    Value, MIN_VALID_BIGINT, MIN_VALID_INTEGER, MIN_VALID_SMALLINT, MIN_VALID_TINYINT,
};

impl<'a> Value<'a> {
    /// Converts this value to `target`, checking ranges on the way down.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` for pairs outside the conversion matrix,
    /// `NumericOutOfRange` when the value does not fit the destination,
    /// and `InvalidFormat` for unparsable text.
    pub fn cast_as(&self, target: Kind) -> Result<Value<'a>, ValueError> {
        tracing::trace!(from = %self.kind(), to = %target, "cast");
        if self.kind() == target {
            return Ok(self.clone());
        }
        if self.is_null() {
            return Ok(Value::null_of(target));
        }
        match target {
            Kind::TinyInt => self.cast_as_tinyint(),
            Kind::SmallInt => self.cast_as_smallint(),
            Kind::Integer => self.cast_as_integer(),
            Kind::BigInt => self.cast_as_bigint(),
            Kind::Timestamp => self.cast_as_timestamp(),
            Kind::Double => self.cast_as_double(),
            Kind::Decimal => self.cast_as_decimal(),
            Kind::Varchar => self.cast_as_string(),
            Kind::Varbinary => Err(self.mismatch(Kind::Varbinary)),
            _ => Err(ValueError::UnsupportedOperation(format!(
                "{} is not a recognized cast target",
                target
            ))),
        }
    }

    fn mismatch(&self, to: Kind) -> ValueError {
        ValueError::TypeMismatch {
            from: self.kind(),
            to,
        }
    }

    fn cast_as_tinyint(&self) -> Result<Value<'a>, ValueError> {
        let narrowed = match self {
            Value::SmallInt(v) => narrow_i64(*v as i64, self.kind(), Kind::TinyInt)?,
            Value::Integer(v) => narrow_i64(*v as i64, self.kind(), Kind::TinyInt)?,
            Value::BigInt(v) | Value::Timestamp(v) => narrow_i64(*v, self.kind(), Kind::TinyInt)?,
            Value::Double(v) => narrow_f64(*v, self.kind(), Kind::TinyInt)?,
            Value::Decimal(v) => narrow_i64(decimal_whole(*v)?, Kind::BigInt, Kind::TinyInt)?,
            Value::Varchar(_) => narrow_f64(self.number_from_string()?, self.kind(), Kind::TinyInt)?,
            _ => return Err(self.mismatch(Kind::TinyInt)),
        };
        Ok(Value::TinyInt(narrowed as i8))
    }

    fn cast_as_smallint(&self) -> Result<Value<'a>, ValueError> {
        let narrowed = match self {
            Value::TinyInt(v) => *v as i64,
            Value::Integer(v) => narrow_i64(*v as i64, self.kind(), Kind::SmallInt)?,
            Value::BigInt(v) | Value::Timestamp(v) => narrow_i64(*v, self.kind(), Kind::SmallInt)?,
            Value::Double(v) => narrow_f64(*v, self.kind(), Kind::SmallInt)?,
            Value::Decimal(v) => narrow_i64(decimal_whole(*v)?, Kind::BigInt, Kind::SmallInt)?,
            Value::Varchar(_) => {
                narrow_f64(self.number_from_string()?, self.kind(), Kind::SmallInt)?
            }
            _ => return Err(self.mismatch(Kind::SmallInt)),
        };
        Ok(Value::SmallInt(narrowed as i16))
    }

    fn cast_as_integer(&self) -> Result<Value<'a>, ValueError> {
        let narrowed = match self {
            Value::TinyInt(v) => *v as i64,
            Value::SmallInt(v) => *v as i64,
            Value::BigInt(v) | Value::Timestamp(v) => narrow_i64(*v, self.kind(), Kind::Integer)?,
            Value::Double(v) => narrow_f64(*v, self.kind(), Kind::Integer)?,
            Value::Decimal(v) => narrow_i64(decimal_whole(*v)?, Kind::BigInt, Kind::Integer)?,
            Value::Varchar(_) => {
                narrow_f64(self.number_from_string()?, self.kind(), Kind::Integer)?
            }
            _ => return Err(self.mismatch(Kind::Integer)),
        };
        Ok(Value::Integer(narrowed as i32))
    }

    fn cast_as_bigint(&self) -> Result<Value<'a>, ValueError> {
        let widened = match self {
            Value::TinyInt(v) => *v as i64,
            Value::SmallInt(v) => *v as i64,
            Value::Integer(v) => *v as i64,
            Value::Address(v) => *v as i64,
            Value::Timestamp(v) => *v,
            Value::Double(v) => narrow_f64(*v, self.kind(), Kind::BigInt)?,
            Value::Decimal(v) => decimal_whole(*v)?,
            Value::Varchar(_) => self.number_from_string()? as i64,
            _ => return Err(self.mismatch(Kind::BigInt)),
        };
        Ok(Value::BigInt(widened))
    }

    fn cast_as_timestamp(&self) -> Result<Value<'a>, ValueError> {
        let micros = match self {
            Value::TinyInt(v) => *v as i64,
            Value::SmallInt(v) => *v as i64,
            Value::Integer(v) => *v as i64,
            Value::BigInt(v) => *v,
            #[cfg(feature = "numeric-timestamp-casts")]
            Value::Double(v) => narrow_f64(*v, self.kind(), Kind::BigInt)?,
            #[cfg(feature = "numeric-timestamp-casts")]
            Value::Decimal(v) => decimal_whole(*v)?,
            Value::Varchar(_) => {
                let bytes = self.object_bytes()?.unwrap_or(&[]);
                parse_timestamp(bytes)?
            }
            _ => return Err(self.mismatch(Kind::Timestamp)),
        };
        Ok(Value::Timestamp(micros))
    }

    fn cast_as_double(&self) -> Result<Value<'a>, ValueError> {
        let value = match self {
            Value::TinyInt(v) => *v as f64,
            Value::SmallInt(v) => *v as f64,
            Value::Integer(v) => *v as f64,
            Value::BigInt(v) | Value::Timestamp(v) => *v as f64,
            Value::Decimal(v) => decimal_to_double(*v)?,
            Value::Varchar(_) => self.number_from_string()?,
            _ => return Err(self.mismatch(Kind::Double)),
        };
        Ok(Value::Double(value))
    }

    fn cast_as_decimal(&self) -> Result<Value<'a>, ValueError> {
        let scaled = match self {
            Value::TinyInt(_)
            | Value::SmallInt(_)
            | Value::Integer(_)
            | Value::BigInt(_)
            | Value::Timestamp(_) => self.bigint_value()? as i128 * decimal::SCALE_FACTOR,
            Value::Double(v) => decimal::from_double(*v)?,
            Value::Varchar(_) => {
                let bytes = self.object_bytes()?.unwrap_or(&[]);
                let text = utf8_text(bytes)?;
                decimal::parse(text)?
            }
            _ => return Err(self.mismatch(Kind::Decimal)),
        };
        Ok(Value::Decimal(scaled))
    }

    fn cast_as_string(&self) -> Result<Value<'a>, ValueError> {
        let rendered = match self {
            Value::TinyInt(v) => v.to_string(),
            Value::SmallInt(v) => v.to_string(),
            Value::Integer(v) => v.to_string(),
            Value::BigInt(v) => v.to_string(),
            Value::Double(v) => sql_float_format(*v),
            Value::Decimal(v) => decimal::format(*v),
            Value::Timestamp(v) => format_timestamp(*v)?,
            // Binary reinterprets as text; the bytes are shared, not copied.
            Value::Varbinary(o) => return Ok(Value::Varchar(o.clone())),
            _ => return Err(self.mismatch(Kind::Varchar)),
        };
        Ok(Value::temp_string(&rendered))
    }

    /// Parses this Varchar's bytes as a number, tolerating surrounding
    /// whitespace.
    fn number_from_string(&self) -> Result<f64, ValueError> {
        let bytes = self.object_bytes()?.unwrap_or(&[]);
        let text = utf8_text(bytes)?;
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ValueError::InvalidFormat(format!(
                "could not convert to number: '{}'",
                text
            )));
        }
        trimmed.parse::<f64>().map_err(|_| {
            ValueError::InvalidFormat(format!(
                "could not convert to number: '{}' contains an invalid character value",
                text
            ))
        })
    }
}

fn utf8_text(bytes: &[u8]) -> Result<&str, ValueError> {
    std::str::from_utf8(bytes)
        .map_err(|_| ValueError::InvalidFormat("varchar bytes are not valid UTF-8".to_string()))
}

/// Range limits of each integer destination, the NULL sentinel excluded.
fn integer_bounds(to: Kind) -> (i64, i64) {
    match to {
        Kind::TinyInt => (MIN_VALID_TINYINT as i64, i8::MAX as i64),
        Kind::SmallInt => (MIN_VALID_SMALLINT as i64, i16::MAX as i64),
        Kind::Integer => (MIN_VALID_INTEGER as i64, i32::MAX as i64),
        _ => (MIN_VALID_BIGINT, i64::MAX),
    }
}

fn narrow_i64(value: i64, from: Kind, to: Kind) -> Result<i64, ValueError> {
    let (min, max) = integer_bounds(to);
    if value > max || value < min {
        return Err(ValueError::cast_out_of_range(value, from, to));
    }
    Ok(value)
}

/// Narrows a double into an integer destination, truncating toward zero.
fn narrow_f64(value: f64, from: Kind, to: Kind) -> Result<i64, ValueError> {
    let (min, max) = integer_bounds(to);
    if value > max as f64 || value < min as f64 {
        return Err(ValueError::cast_out_of_range(value, from, to));
    }
    Ok(value as i64)
}

/// Extracts a decimal's whole part as `i64`, or the canonical out-of-range
/// error.
fn decimal_whole(scaled: i128) -> Result<i64, ValueError> {
    decimal::whole_part(scaled).ok_or_else(|| {
        ValueError::cast_out_of_range(decimal::format(scaled), Kind::Decimal, Kind::BigInt)
    })
}

/// Converts a scaled decimal to `f64` as whole part plus scaled fraction.
pub(crate) fn decimal_to_double(scaled: i128) -> Result<f64, ValueError> {
    let whole = decimal_whole(scaled)?;
    let fractional = decimal::fractional_part(scaled);
    Ok(whole as f64 + fractional as f64 / decimal::SCALE_FACTOR as f64)
}

/// Renders a double in SQL standard E-notation: `0E0` for zero, otherwise
/// a minimal mantissa with a capital `E` and an unpadded exponent.
fn sql_float_format(value: f64) -> String {
    if value == 0.0 {
        return "0E0".to_string();
    }
    format!("{:E}", value)
}

/// Renders microseconds since the epoch as calendar text.
fn format_timestamp(micros: i64) -> Result<String, ValueError> {
    let datetime = chrono::DateTime::from_timestamp_micros(micros).ok_or_else(|| {
        ValueError::InvalidFormat(format!("timestamp {} is outside the calendar range", micros))
    })?;
    Ok(datetime
        .naive_utc()
        .format("%Y-%m-%d %H:%M:%S%.6f")
        .to_string())
}

/// Parses ISO-like timestamp text (`YYYY-MM-DD[ HH:MM:SS[.ffffff]]`) into
/// microseconds since the epoch.
fn parse_timestamp(bytes: &[u8]) -> Result<i64, ValueError> {
    let text = utf8_text(bytes)?;
    let trimmed = text.trim();
    if let Ok(datetime) = chrono::NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f") {
        return Ok(datetime.and_utc().timestamp_micros());
    }
    if let Ok(date) = chrono::NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date
            .and_time(chrono::NaiveTime::MIN)
            .and_utc()
            .timestamp_micros());
    }
    Err(ValueError::InvalidFormat(format!(
        "'{}' is not a valid timestamp",
        text
    )))
}
