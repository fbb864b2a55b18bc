//! Scalar kind descriptors and binary-operation promotion rules.
//!
//! [`Kind`] enumerates every scalar kind the engine can hold. It knows its
//! fixed tuple storage footprint, whether it is a variable-length object,
//! and how it promotes when paired with another kind in a binary operation.

use std::fmt;

/// The type discriminator of a [`Value`](crate::value::Value).
///
/// Discriminant values double as the kind byte of the wire format, so they
/// must never be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i8)]
pub enum Kind {
    /// Uninitialized value; unusable in any operation.
    Invalid = 0,
    /// Untyped SQL NULL.
    Null = 1,
    /// 1-byte signed integer.
    TinyInt = 3,
    /// 2-byte signed integer.
    SmallInt = 4,
    /// 4-byte signed integer.
    Integer = 5,
    /// 8-byte signed integer.
    BigInt = 6,
    /// IEEE-754 double precision.
    Double = 8,
    /// Variable-length UTF-8 text.
    Varchar = 9,
    /// Microseconds since the Unix epoch, signed 64-bit.
    Timestamp = 11,
    /// Fixed-point decimal: 128-bit signed integer scaled by 10^12.
    Decimal = 22,
    /// SQL boolean.
    Boolean = 23,
    /// Opaque 64-bit identifier used only by executor internals.
    Address = 24,
    /// Variable-length opaque bytes.
    Varbinary = 25,
    /// Homogeneous sequence of values, all of one element kind.
    Array = -99,
}

impl Kind {
    /// Returns the number of bytes a value of this kind occupies in a tuple
    /// slot, or `None` for kinds that cannot be stored in a tuple.
    ///
    /// Variable-length kinds report the footprint of their out-of-line
    /// handle; inlined columns are sized by the schema instead.
    pub const fn tuple_storage_size(self) -> Option<usize> {
        match self {
            Kind::TinyInt | Kind::Boolean => Some(1),
            Kind::SmallInt => Some(2),
            Kind::Integer => Some(4),
            Kind::BigInt | Kind::Timestamp | Kind::Double => Some(8),
            Kind::Varchar | Kind::Varbinary => Some(8),
            Kind::Decimal => Some(16),
            Kind::Invalid | Kind::Null | Kind::Address | Kind::Array => None,
        }
    }

    /// Returns true for variable-length kinds whose bytes live behind a
    /// length prefix.
    pub const fn is_object(self) -> bool {
        matches!(self, Kind::Varchar | Kind::Varbinary | Kind::Array)
    }

    /// Returns true for the integer family, which shares 64-bit arithmetic.
    pub const fn is_integer_family(self) -> bool {
        matches!(
            self,
            Kind::TinyInt | Kind::SmallInt | Kind::Integer | Kind::BigInt | Kind::Timestamp
        )
    }

    /// Returns the SQL display name for this kind.
    pub const fn name(self) -> &'static str {
        match self {
            Kind::Invalid => "INVALID",
            Kind::Null => "NULL",
            Kind::TinyInt => "TINYINT",
            Kind::SmallInt => "SMALLINT",
            Kind::Integer => "INTEGER",
            Kind::BigInt => "BIGINT",
            Kind::Double => "DOUBLE",
            Kind::Varchar => "VARCHAR",
            Kind::Timestamp => "TIMESTAMP",
            Kind::Decimal => "DECIMAL",
            Kind::Boolean => "BOOLEAN",
            Kind::Address => "ADDRESS",
            Kind::Varbinary => "VARBINARY",
            Kind::Array => "ARRAY",
        }
    }

    /// Converts a wire kind byte back into a [`Kind`].
    pub const fn from_wire(byte: i8) -> Option<Kind> {
        match byte {
            0 => Some(Kind::Invalid),
            1 => Some(Kind::Null),
            3 => Some(Kind::TinyInt),
            4 => Some(Kind::SmallInt),
            5 => Some(Kind::Integer),
            6 => Some(Kind::BigInt),
            8 => Some(Kind::Double),
            9 => Some(Kind::Varchar),
            11 => Some(Kind::Timestamp),
            22 => Some(Kind::Decimal),
            23 => Some(Kind::Boolean),
            24 => Some(Kind::Address),
            25 => Some(Kind::Varbinary),
            -99 => Some(Kind::Array),
            _ => None,
        }
    }

    /// Returns the wire kind byte.
    pub const fn to_wire(self) -> i8 {
        self as i8
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Resolves the kind both sides of a binary arithmetic operation are
/// promoted to before execution.
///
/// Decimal dominates double, which dominates the integer family (including
/// Timestamp, which promotes to BigInt). Any other pairing is
/// [`Kind::Invalid`], which operations report as a type mismatch.
pub fn promote_for_op(lhs: Kind, rhs: Kind) -> Kind {
    match lhs {
        k if k.is_integer_family() => integer_promotion(rhs),
        Kind::Decimal => decimal_promotion(rhs),
        Kind::Double => double_promotion(rhs),
        _ => Kind::Invalid,
    }
}

fn integer_promotion(rhs: Kind) -> Kind {
    match rhs {
        Kind::Decimal => Kind::Decimal,
        Kind::Double => Kind::Double,
        k if k.is_integer_family() => Kind::BigInt,
        _ => Kind::Invalid,
    }
}

fn decimal_promotion(rhs: Kind) -> Kind {
    match rhs {
        Kind::Decimal | Kind::Double => Kind::Decimal,
        k if k.is_integer_family() => Kind::Decimal,
        _ => Kind::Invalid,
    }
}

fn double_promotion(rhs: Kind) -> Kind {
    match rhs {
        Kind::Decimal => Kind::Decimal,
        Kind::Double => Kind::Double,
        k if k.is_integer_family() => Kind::Double,
        _ => Kind::Invalid,
    }
}
