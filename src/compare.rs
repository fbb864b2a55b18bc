//! Total-order comparison across scalar kinds.
//!
//! [`Value::compare`] orders NULL before every non-NULL value and NULL equal
//! to NULL, which is what sorting, grouping, and index maintenance need.
//! Predicate evaluation short-circuits NULL itself and calls
//! [`Value::compare_without_null`].
//!
//! NaN compares equal to NaN and below every other double. That knowingly
//! breaks IEEE 754: an index needs a total order.

use std::cmp::Ordering;

use crate::decimal;
use crate::error::ValueError;
use crate::types::Kind;
use crate::value::Value;

/// NaN-aware double ordering: NaN == NaN, NaN < everything else.
fn compare_doubles(lhs: f64, rhs: f64) -> Ordering {
    if lhs.is_nan() {
        if rhs.is_nan() {
            Ordering::Equal
        } else {
            Ordering::Less
        }
    } else if rhs.is_nan() {
        Ordering::Greater
    } else if lhs > rhs {
        Ordering::Greater
    } else if lhs < rhs {
        Ordering::Less
    } else {
        Ordering::Equal
    }
}

/// Reads a comparison partner as `f64`. Unlike the cast path this rejects
/// Address values outright.
fn comparable_double(value: &Value<'_>) -> Result<f64, ValueError> {
    match value {
        Value::Double(v) => Ok(*v),
        Value::Decimal(v) => crate::cast::decimal_to_double(*v),
        other if other.kind().is_integer_family() => Ok(other.bigint_value()? as f64),
        other => Err(ValueError::TypeMismatch {
            from: other.kind(),
            to: Kind::Double,
        }),
    }
}

impl<'a> Value<'a> {
    /// NULL-aware three-way comparison: NULL < non-NULL, NULL == NULL.
    pub fn compare(&self, rhs: &Value<'_>) -> Result<Ordering, ValueError> {
        match (self.is_null(), rhs.is_null()) {
            (true, true) => Ok(Ordering::Equal),
            (true, false) => Ok(Ordering::Less),
            (false, true) => Ok(Ordering::Greater),
            (false, false) => self.compare_without_null(rhs),
        }
    }

    /// Three-way comparison; the caller guarantees both sides are non-NULL.
    /// Cross-kind pairs promote exactly once before comparing.
    pub fn compare_without_null(&self, rhs: &Value<'_>) -> Result<Ordering, ValueError> {
        debug_assert!(!self.is_null() && !rhs.is_null());
        match self {
            v if v.kind().is_integer_family() => self.compare_integer_family(rhs),
            Value::Double(v) => Ok(compare_doubles(*v, comparable_double(rhs)?)),
            Value::Decimal(v) => compare_decimal(*v, rhs),
            Value::Varchar(_) => self.compare_string(rhs),
            Value::Varbinary(_) => self.compare_binary(rhs),
            other => Err(ValueError::UnsupportedOperation(format!(
                "{} and {} are not comparable",
                other.kind(),
                rhs.kind()
            ))),
        }
    }

    fn compare_integer_family(&self, rhs: &Value<'_>) -> Result<Ordering, ValueError> {
        match rhs {
            Value::Double(d) => Ok(compare_doubles(self.bigint_value()? as f64, *d)),
            Value::Decimal(d) => {
                let widened = self.bigint_value()? as i128 * decimal::SCALE_FACTOR;
                Ok(widened.cmp(d))
            }
            _ => Ok(self.bigint_value()?.cmp(&rhs.bigint_value()?)),
        }
    }

    fn compare_string(&self, rhs: &Value<'_>) -> Result<Ordering, ValueError> {
        // Varchar also accepts a Varbinary partner for equality checks.
        if !matches!(rhs.kind(), Kind::Varchar | Kind::Varbinary) {
            return Err(ValueError::TypeMismatch {
                from: rhs.kind(),
                to: self.kind(),
            });
        }
        let lhs_bytes = self.object_bytes()?.unwrap_or(&[]);
        let rhs_bytes = rhs.object_bytes()?.unwrap_or(&[]);
        Ok(lhs_bytes.cmp(rhs_bytes))
    }

    fn compare_binary(&self, rhs: &Value<'_>) -> Result<Ordering, ValueError> {
        if rhs.kind() != Kind::Varbinary {
            return Err(ValueError::TypeMismatch {
                from: rhs.kind(),
                to: self.kind(),
            });
        }
        let lhs_bytes = self.object_bytes()?.unwrap_or(&[]);
        let rhs_bytes = rhs.object_bytes()?.unwrap_or(&[]);
        Ok(lhs_bytes.cmp(rhs_bytes))
    }

    /// `self == rhs` under the NULL-aware order.
    pub fn op_equals(&self, rhs: &Value<'_>) -> Result<bool, ValueError> {
        Ok(self.compare(rhs)? == Ordering::Equal)
    }

    /// `self != rhs` under the NULL-aware order.
    pub fn op_not_equals(&self, rhs: &Value<'_>) -> Result<bool, ValueError> {
        Ok(self.compare(rhs)? != Ordering::Equal)
    }

    /// `self < rhs` under the NULL-aware order.
    pub fn op_less_than(&self, rhs: &Value<'_>) -> Result<bool, ValueError> {
        Ok(self.compare(rhs)? == Ordering::Less)
    }

    /// `self <= rhs` under the NULL-aware order.
    pub fn op_less_than_or_equal(&self, rhs: &Value<'_>) -> Result<bool, ValueError> {
        Ok(self.compare(rhs)? != Ordering::Greater)
    }

    /// `self > rhs` under the NULL-aware order.
    pub fn op_greater_than(&self, rhs: &Value<'_>) -> Result<bool, ValueError> {
        Ok(self.compare(rhs)? == Ordering::Greater)
    }

    /// `self >= rhs` under the NULL-aware order.
    pub fn op_greater_than_or_equal(&self, rhs: &Value<'_>) -> Result<bool, ValueError> {
        Ok(self.compare(rhs)? != Ordering::Less)
    }

    /// Copy of the greater value under the NULL-aware order.
    pub fn op_max(&self, rhs: &Value<'a>) -> Result<Value<'a>, ValueError> {
        if self.compare(rhs)? == Ordering::Greater {
            Ok(self.clone())
        } else {
            Ok(rhs.clone())
        }
    }

    /// Copy of the lesser value under the NULL-aware order.
    pub fn op_min(&self, rhs: &Value<'a>) -> Result<Value<'a>, ValueError> {
        if self.compare(rhs)? == Ordering::Less {
            Ok(self.clone())
        } else {
            Ok(rhs.clone())
        }
    }
}

fn compare_decimal(lhs: i128, rhs: &Value<'_>) -> Result<Ordering, ValueError> {
    match rhs {
        Value::Decimal(d) => Ok(lhs.cmp(d)),
        Value::Double(d) => Ok(compare_doubles(crate::cast::decimal_to_double(lhs)?, *d)),
        other if other.kind().is_integer_family() => {
            let widened = other.bigint_value()? as i128 * decimal::SCALE_FACTOR;
            Ok(lhs.cmp(&widened))
        }
        other => Err(ValueError::TypeMismatch {
            from: other.kind(),
            to: Kind::Decimal,
        }),
    }
}
