//! Arithmetic and logic over scalar values.
//!
//! Binary arithmetic promotes both sides per
//! [`promote_for_op`](crate::types::promote_for_op) and dispatches to one of
//! three domains: overflow-checked 64-bit integers, IEEE doubles with a
//! NaN/infinity guard after the fact, and scale-12 decimals computed through
//! 256-bit intermediates. A NULL operand yields the NULL of the promoted
//! kind; arithmetic itself never raises on NULL.

use crate::decimal;
use crate::error::ValueError;
use crate::types::{promote_for_op, Kind};
use crate::value::{
    Value, MIN_VALID_BIGINT, MIN_VALID_INTEGER, MIN_VALID_SMALLINT, MIN_VALID_TINYINT,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArithOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl ArithOp {
    fn symbol(self) -> char {
        match self {
            ArithOp::Add => '+',
            ArithOp::Subtract => '-',
            ArithOp::Multiply => '*',
            ArithOp::Divide => '/',
        }
    }

    fn verb(self) -> &'static str {
        match self {
            ArithOp::Add => "add",
            ArithOp::Subtract => "subtract",
            ArithOp::Multiply => "multiply",
            ArithOp::Divide => "divide",
        }
    }
}

impl<'a> Value<'a> {
    /// `self + rhs` in the promoted kind.
    pub fn op_add(&self, rhs: &Value<'_>) -> Result<Value<'static>, ValueError> {
        self.arithmetic(rhs, ArithOp::Add)
    }

    /// `self - rhs` in the promoted kind.
    pub fn op_subtract(&self, rhs: &Value<'_>) -> Result<Value<'static>, ValueError> {
        self.arithmetic(rhs, ArithOp::Subtract)
    }

    /// `self * rhs` in the promoted kind.
    pub fn op_multiply(&self, rhs: &Value<'_>) -> Result<Value<'static>, ValueError> {
        self.arithmetic(rhs, ArithOp::Multiply)
    }

    /// `self / rhs` in the promoted kind. Integer division truncates.
    pub fn op_divide(&self, rhs: &Value<'_>) -> Result<Value<'static>, ValueError> {
        self.arithmetic(rhs, ArithOp::Divide)
    }

    fn arithmetic(&self, rhs: &Value<'_>, op: ArithOp) -> Result<Value<'static>, ValueError> {
        let promoted = promote_for_op(self.kind(), rhs.kind());
        if promoted == Kind::Invalid {
            return Err(ValueError::TypeMismatch {
                from: self.kind(),
                to: rhs.kind(),
            });
        }
        if self.is_null() || rhs.is_null() {
            return Ok(Value::null_of(promoted));
        }
        match promoted {
            Kind::BigInt => bigint_op(op, self.bigint_value()?, rhs.bigint_value()?),
            Kind::Double => double_op(op, self.double_value()?, rhs.double_value()?),
            Kind::Decimal => decimal_op(op, self.decimal_value()?, rhs.decimal_value()?),
            other => Err(ValueError::UnsupportedOperation(format!(
                "arithmetic is not defined in the {} domain",
                other
            ))),
        }
    }

    /// Adds one, staying in this value's kind. NULL increments to NULL.
    pub fn op_increment(&self) -> Result<Value<'static>, ValueError> {
        if self.is_null() {
            return Ok(Value::null_of(self.kind()));
        }
        match self {
            Value::TinyInt(v) if *v == i8::MAX => Err(step_out_of_range(self.kind(), "incrementing")),
            Value::TinyInt(v) => Ok(Value::TinyInt(v + 1)),
            Value::SmallInt(v) if *v == i16::MAX => {
                Err(step_out_of_range(self.kind(), "incrementing"))
            }
            Value::SmallInt(v) => Ok(Value::SmallInt(v + 1)),
            Value::Integer(v) if *v == i32::MAX => {
                Err(step_out_of_range(self.kind(), "incrementing"))
            }
            Value::Integer(v) => Ok(Value::Integer(v + 1)),
            Value::BigInt(v) if *v == i64::MAX => {
                Err(step_out_of_range(self.kind(), "incrementing"))
            }
            Value::BigInt(v) => Ok(Value::BigInt(v + 1)),
            Value::Timestamp(v) if *v == i64::MAX => {
                Err(step_out_of_range(self.kind(), "incrementing"))
            }
            Value::Timestamp(v) => Ok(Value::Timestamp(v + 1)),
            Value::Double(v) => Ok(Value::Double(v + 1.0)),
            other => Err(ValueError::UnsupportedOperation(format!(
                "{} is not incrementable",
                other.kind()
            ))),
        }
    }

    /// Subtracts one, staying in this value's kind. The step refuses to
    /// land on the kind's NULL sentinel.
    pub fn op_decrement(&self) -> Result<Value<'static>, ValueError> {
        if self.is_null() {
            return Ok(Value::null_of(self.kind()));
        }
        match self {
            Value::TinyInt(v) if *v == MIN_VALID_TINYINT => {
                Err(step_out_of_range(self.kind(), "decrementing"))
            }
            Value::TinyInt(v) => Ok(Value::TinyInt(v - 1)),
            Value::SmallInt(v) if *v == MIN_VALID_SMALLINT => {
                Err(step_out_of_range(self.kind(), "decrementing"))
            }
            Value::SmallInt(v) => Ok(Value::SmallInt(v - 1)),
            Value::Integer(v) if *v == MIN_VALID_INTEGER => {
                Err(step_out_of_range(self.kind(), "decrementing"))
            }
            Value::Integer(v) => Ok(Value::Integer(v - 1)),
            Value::BigInt(v) if *v == MIN_VALID_BIGINT => {
                Err(step_out_of_range(self.kind(), "decrementing"))
            }
            Value::BigInt(v) => Ok(Value::BigInt(v - 1)),
            Value::Timestamp(v) if *v == MIN_VALID_BIGINT => {
                Err(step_out_of_range(self.kind(), "decrementing"))
            }
            Value::Timestamp(v) => Ok(Value::Timestamp(v - 1)),
            Value::Double(v) => Ok(Value::Double(v - 1.0)),
            other => Err(ValueError::UnsupportedOperation(format!(
                "{} is not decrementable",
                other.kind()
            ))),
        }
    }

    /// Logical NOT with three-valued semantics: NOT NULL is NULL.
    pub fn op_negate(&self) -> Result<Value<'static>, ValueError> {
        match self.bool_state()? {
            None => Ok(Value::null_of(Kind::Boolean)),
            Some(b) => Ok(Value::boolean(!b)),
        }
    }

    /// Logical AND: FALSE dominates NULL.
    pub fn op_and(&self, rhs: &Value<'_>) -> Result<Value<'static>, ValueError> {
        let lhs = self.bool_state()?;
        let rhs = rhs.bool_state()?;
        Ok(match (lhs, rhs) {
            (Some(false), _) | (_, Some(false)) => Value::false_value(),
            (Some(true), Some(true)) => Value::true_value(),
            _ => Value::null_of(Kind::Boolean),
        })
    }

    /// Logical OR: TRUE dominates NULL.
    pub fn op_or(&self, rhs: &Value<'_>) -> Result<Value<'static>, ValueError> {
        let lhs = self.bool_state()?;
        let rhs = rhs.bool_state()?;
        Ok(match (lhs, rhs) {
            (Some(true), _) | (_, Some(true)) => Value::true_value(),
            (Some(false), Some(false)) => Value::false_value(),
            _ => Value::null_of(Kind::Boolean),
        })
    }
}

fn step_out_of_range(kind: Kind, action: &str) -> ValueError {
    ValueError::arithmetic_out_of_range(format!(
        "{} this {} results in a value out of range",
        action, kind
    ))
}

fn bigint_op(op: ArithOp, lhs: i64, rhs: i64) -> Result<Value<'static>, ValueError> {
    let overflow = |op: ArithOp| {
        ValueError::arithmetic_out_of_range(format!(
            "attempting to {} {} and {} overflows BigInt storage",
            op.verb(),
            lhs,
            rhs
        ))
    };
    match op {
        ArithOp::Add => lhs
            .checked_add(rhs)
            .map(Value::BigInt)
            .ok_or_else(|| overflow(op)),
        ArithOp::Subtract => lhs
            .checked_sub(rhs)
            .map(Value::BigInt)
            .ok_or_else(|| overflow(op)),
        ArithOp::Multiply => match lhs.checked_mul(rhs) {
            // A product equal to the NULL sentinel would silently null a
            // legitimate result, so it counts as overflow.
            Some(product) if product != i64::MIN => Ok(Value::BigInt(product)),
            _ => Err(overflow(op)),
        },
        ArithOp::Divide => {
            if rhs == 0 {
                return Err(ValueError::DivisionByZero);
            }
            Ok(Value::BigInt(lhs / rhs))
        }
    }
}

fn double_op(op: ArithOp, lhs: f64, rhs: f64) -> Result<Value<'static>, ValueError> {
    let result = match op {
        ArithOp::Add => lhs + rhs,
        ArithOp::Subtract => lhs - rhs,
        ArithOp::Multiply => lhs * rhs,
        ArithOp::Divide => lhs / rhs,
    };
    if result.is_nan() || result > f64::MAX || result < -f64::MAX {
        return Err(ValueError::arithmetic_out_of_range(format!(
            "invalid result value ({}) from floating point '{}' operator",
            result,
            op.symbol()
        )));
    }
    Ok(Value::Double(result))
}

fn decimal_op(op: ArithOp, lhs: i128, rhs: i128) -> Result<Value<'static>, ValueError> {
    let overflow = |suffix: &str| {
        ValueError::arithmetic_out_of_range(format!(
            "attempted to {} {} and {} causing overflow/underflow{}",
            op.verb(),
            decimal::format(lhs),
            decimal::format(rhs),
            suffix
        ))
    };
    let result = match op {
        ArithOp::Add => decimal::checked_add(lhs, rhs).ok_or_else(|| overflow(""))?,
        ArithOp::Subtract => decimal::checked_sub(lhs, rhs).ok_or_else(|| overflow(""))?,
        ArithOp::Multiply => decimal::checked_mul(lhs, rhs).ok_or_else(|| overflow(""))?,
        ArithOp::Divide => {
            decimal::checked_div(lhs, rhs).ok_or_else(|| overflow(" (or divide by zero)"))?
        }
    };
    Ok(Value::Decimal(result))
}
