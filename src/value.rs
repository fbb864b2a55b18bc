//! The uniform scalar value container.
//!
//! [`Value`] holds every SQL scalar the executor touches. Fixed-width kinds
//! carry their payload inline and encode NULL as a reserved sentinel so that
//! tuple round-trips are bit-exact. Variable-length kinds carry an
//! [`ObjectRef`]: either a borrow of tuple-inlined bytes (the value must not
//! outlive the tuple, which the `'a` lifetime enforces) or a shared
//! [`Varlen`] pool handle.
//!
//! Factory-made values are `Value<'static>`; only
//! [`init_from_tuple_storage`](Value::init_from_tuple_storage) produces
//! borrowed values. [`to_owned_in`](Value::to_owned_in) is the explicit
//! conversion from borrowed to pool-owned.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::codec;
use crate::error::ValueError;
use crate::types::Kind;
use crate::varlen::{temp_pool, Varlen, VarlenPool};

/// NULL sentinel for TinyInt (and the Boolean cell).
pub const NULL_TINYINT: i8 = i8::MIN;
/// NULL sentinel for SmallInt.
pub const NULL_SMALLINT: i16 = i16::MIN;
/// NULL sentinel for Integer.
pub const NULL_INTEGER: i32 = i32::MIN;
/// NULL sentinel for BigInt and Timestamp.
pub const NULL_BIGINT: i64 = i64::MIN;
/// NULL threshold for Double: any value at or below it reads as NULL.
pub const NULL_DOUBLE: f64 = -f64::MAX;
/// NULL sentinel for Decimal.
pub const NULL_DECIMAL: i128 = i128::MIN;

/// Smallest non-NULL TinyInt.
pub(crate) const MIN_VALID_TINYINT: i8 = i8::MIN + 1;
/// Smallest non-NULL SmallInt.
pub(crate) const MIN_VALID_SMALLINT: i16 = i16::MIN + 1;
/// Smallest non-NULL Integer.
pub(crate) const MIN_VALID_INTEGER: i32 = i32::MIN + 1;
/// Smallest non-NULL BigInt or Timestamp.
pub(crate) const MIN_VALID_BIGINT: i64 = i64::MIN + 1;

/// Storage reference of a variable-length value.
#[derive(Debug, Clone)]
pub enum ObjectRef<'a> {
    /// The NULL object.
    Null,
    /// Length prefix plus payload, borrowed from a tuple's inline slot.
    Inlined(&'a [u8]),
    /// Shared handle to a pool allocation.
    Owned(Varlen),
}

impl<'a> ObjectRef<'a> {
    pub fn is_null(&self) -> bool {
        matches!(self, ObjectRef::Null)
    }

    /// True when the bytes are borrowed from a tuple rather than owned.
    pub fn is_inlined(&self) -> bool {
        matches!(self, ObjectRef::Inlined(_))
    }

    /// Returns the object payload, or `None` for the NULL object.
    pub fn bytes(&self) -> Result<Option<&[u8]>, ValueError> {
        match self {
            ObjectRef::Null => Ok(None),
            ObjectRef::Inlined(raw) => {
                let (len, prefix) = codec::decode_length(raw)?;
                let len = len.ok_or_else(|| {
                    ValueError::InvalidFormat(
                        "inlined object carries a NULL length prefix".to_string(),
                    )
                })?;
                raw.get(prefix..prefix + len)
                    .map(Some)
                    .ok_or(ValueError::BufferTooSmall {
                        required: prefix + len,
                        available: raw.len(),
                    })
            }
            ObjectRef::Owned(varlen) => varlen.object_bytes().map(Some),
        }
    }

    /// Returns prefix plus payload for block copies, or `None` for NULL.
    pub fn raw(&self) -> Option<&[u8]> {
        match self {
            ObjectRef::Null => None,
            ObjectRef::Inlined(raw) => Some(raw),
            ObjectRef::Owned(varlen) => Some(varlen.raw()),
        }
    }

    fn to_owned_in(&self, pool: Option<&VarlenPool>) -> Result<ObjectRef<'static>, ValueError> {
        match self {
            ObjectRef::Null => Ok(ObjectRef::Null),
            ObjectRef::Owned(varlen) => Ok(ObjectRef::Owned(varlen.clone())),
            ObjectRef::Inlined(_) => {
                let bytes = self.bytes()?.unwrap_or(&[]);
                let pool = pool.unwrap_or(temp_pool());
                Ok(ObjectRef::Owned(pool.allocate(bytes)))
            }
        }
    }
}

/// A homogeneous, fixed-length sequence of values.
///
/// Element storage is shared between clones; the length is fixed when the
/// array is allocated and only element contents may be replaced.
#[derive(Debug, Clone)]
pub struct ArrayValue {
    element_kind: Kind,
    elements: Arc<Mutex<Vec<Value<'static>>>>,
}

impl ArrayValue {
    fn new(len: usize, element_kind: Kind) -> ArrayValue {
        let elements = (0..len).map(|_| Value::null_of(element_kind)).collect();
        ArrayValue {
            element_kind,
            elements: Arc::new(Mutex::new(elements)),
        }
    }

    pub fn element_kind(&self) -> Kind {
        self.element_kind
    }

    pub fn len(&self) -> usize {
        self.elements.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clones out the element at `index`, or `None` out of bounds.
    pub fn get(&self, index: usize) -> Option<Value<'static>> {
        self.elements.lock().get(index).cloned()
    }

    fn set_all(&self, values: Vec<Value<'static>>) -> Result<(), ValueError> {
        let mut elements = self.elements.lock();
        if values.len() != elements.len() {
            return Err(ValueError::UnsupportedOperation(format!(
                "array holds {} elements, cannot assign {}",
                elements.len(),
                values.len()
            )));
        }
        for value in &values {
            if value.kind() != self.element_kind {
                return Err(ValueError::TypeMismatch {
                    from: value.kind(),
                    to: self.element_kind,
                });
            }
        }
        *elements = values;
        Ok(())
    }

    pub(crate) fn for_each<R>(
        &self,
        mut f: impl FnMut(&Value<'static>) -> Result<Option<R>, ValueError>,
    ) -> Result<Option<R>, ValueError> {
        for value in self.elements.lock().iter() {
            if let Some(result) = f(value)? {
                return Ok(Some(result));
            }
        }
        Ok(None)
    }
}

/// A single SQL scalar with its kind.
///
/// The `'a` lifetime is the lifetime of the tuple a borrowed object value
/// was read from; values that own (or contain no) variable-length data are
/// `Value<'static>`.
#[derive(Debug, Clone, Default)]
pub enum Value<'a> {
    /// Uninitialized; rejected by every operation.
    #[default]
    Invalid,
    /// Untyped SQL NULL.
    Null,
    /// Boolean cell: 0 = false, 1 = true, [`NULL_TINYINT`] = NULL.
    Boolean(i8),
    TinyInt(i8),
    SmallInt(i16),
    Integer(i32),
    BigInt(i64),
    /// Microseconds since the Unix epoch.
    Timestamp(i64),
    Double(f64),
    /// Scaled by 10^12; see [`crate::decimal`].
    Decimal(i128),
    /// Executor-internal 64-bit identifier. No pointer semantics.
    Address(u64),
    Varchar(ObjectRef<'a>),
    Varbinary(ObjectRef<'a>),
    /// `None` is the NULL array.
    Array(Option<ArrayValue>),
}

impl Value<'static> {
    /// The untyped NULL value.
    pub fn null() -> Value<'static> {
        Value::Null
    }

    /// The NULL representation of `kind`.
    pub fn null_of(kind: Kind) -> Value<'static> {
        match kind {
            Kind::Invalid | Kind::Null => Value::Null,
            Kind::Boolean => Value::Boolean(NULL_TINYINT),
            Kind::TinyInt => Value::TinyInt(NULL_TINYINT),
            Kind::SmallInt => Value::SmallInt(NULL_SMALLINT),
            Kind::Integer => Value::Integer(NULL_INTEGER),
            Kind::BigInt => Value::BigInt(NULL_BIGINT),
            Kind::Timestamp => Value::Timestamp(NULL_BIGINT),
            Kind::Double => Value::Double(NULL_DOUBLE),
            Kind::Decimal => Value::Decimal(NULL_DECIMAL),
            Kind::Address => Value::Address(0),
            Kind::Varchar => Value::Varchar(ObjectRef::Null),
            Kind::Varbinary => Value::Varbinary(ObjectRef::Null),
            Kind::Array => Value::Array(None),
        }
    }

    pub fn true_value() -> Value<'static> {
        Value::Boolean(1)
    }

    pub fn false_value() -> Value<'static> {
        Value::Boolean(0)
    }

    pub fn boolean(value: bool) -> Value<'static> {
        Value::Boolean(value as i8)
    }

    /// Builds a TinyInt; the sentinel [`NULL_TINYINT`] builds NULL.
    pub fn tinyint(value: i8) -> Value<'static> {
        Value::TinyInt(value)
    }

    pub fn smallint(value: i16) -> Value<'static> {
        Value::SmallInt(value)
    }

    pub fn integer(value: i32) -> Value<'static> {
        Value::Integer(value)
    }

    pub fn bigint(value: i64) -> Value<'static> {
        Value::BigInt(value)
    }

    /// Builds a Timestamp from microseconds since the Unix epoch.
    pub fn timestamp(micros: i64) -> Value<'static> {
        Value::Timestamp(micros)
    }

    pub fn double(value: f64) -> Value<'static> {
        Value::Double(value)
    }

    /// Builds a Decimal from an already-scaled 128-bit integer.
    pub fn decimal_from_scaled(scaled: i128) -> Value<'static> {
        Value::Decimal(scaled)
    }

    /// Parses decimal text into a Decimal value.
    pub fn decimal_from_str(text: &str) -> Result<Value<'static>, ValueError> {
        Ok(Value::Decimal(crate::decimal::parse(text)?))
    }

    pub fn address(value: u64) -> Value<'static> {
        Value::Address(value)
    }

    /// Allocates a Varchar in `pool` (the temp pool when `None`).
    pub fn string_in(text: &str, pool: Option<&VarlenPool>) -> Value<'static> {
        let pool = pool.unwrap_or(temp_pool());
        Value::Varchar(ObjectRef::Owned(pool.allocate(text.as_bytes())))
    }

    /// Allocates a Varchar in the temp pool; invalidated at the next pool
    /// reset.
    pub fn temp_string(text: &str) -> Value<'static> {
        Value::string_in(text, None)
    }

    /// Allocates a Varbinary in `pool` (the temp pool when `None`).
    pub fn binary_in(bytes: &[u8], pool: Option<&VarlenPool>) -> Value<'static> {
        let pool = pool.unwrap_or(temp_pool());
        Value::Varbinary(ObjectRef::Owned(pool.allocate(bytes)))
    }

    /// Allocates a Varbinary in the temp pool.
    pub fn temp_binary(bytes: &[u8]) -> Value<'static> {
        Value::binary_in(bytes, None)
    }

    /// Allocates an array of `len` NULL elements of `element_kind`. The
    /// length is fixed for the array's lifetime.
    pub fn array_of(len: usize, element_kind: Kind) -> Result<Value<'static>, ValueError> {
        match element_kind {
            Kind::Invalid | Kind::Null | Kind::Array => Err(ValueError::UnsupportedOperation(
                format!("{} is not a valid array element kind", element_kind),
            )),
            _ => Ok(Value::Array(Some(ArrayValue::new(len, element_kind)))),
        }
    }
}

impl<'a> Value<'a> {
    /// Returns the kind tag of this value.
    pub fn kind(&self) -> Kind {
        match self {
            Value::Invalid => Kind::Invalid,
            Value::Null => Kind::Null,
            Value::Boolean(_) => Kind::Boolean,
            Value::TinyInt(_) => Kind::TinyInt,
            Value::SmallInt(_) => Kind::SmallInt,
            Value::Integer(_) => Kind::Integer,
            Value::BigInt(_) => Kind::BigInt,
            Value::Timestamp(_) => Kind::Timestamp,
            Value::Double(_) => Kind::Double,
            Value::Decimal(_) => Kind::Decimal,
            Value::Address(_) => Kind::Address,
            Value::Varchar(_) => Kind::Varchar,
            Value::Varbinary(_) => Kind::Varbinary,
            Value::Array(_) => Kind::Array,
        }
    }

    /// True when this value is SQL NULL.
    pub fn is_null(&self) -> bool {
        match self {
            Value::Invalid => false,
            Value::Null => true,
            Value::Boolean(v) | Value::TinyInt(v) => *v == NULL_TINYINT,
            Value::SmallInt(v) => *v == NULL_SMALLINT,
            Value::Integer(v) => *v == NULL_INTEGER,
            Value::BigInt(v) | Value::Timestamp(v) => *v == NULL_BIGINT,
            Value::Double(v) => *v <= NULL_DOUBLE,
            Value::Decimal(v) => *v == NULL_DECIMAL,
            Value::Address(v) => *v == 0,
            Value::Varchar(o) | Value::Varbinary(o) => o.is_null(),
            Value::Array(a) => a.is_none(),
        }
    }

    /// Overwrites this value with its kind's NULL representation.
    pub fn set_null(&mut self) {
        match self {
            Value::Invalid => *self = Value::Null,
            Value::Null => {}
            Value::Boolean(v) | Value::TinyInt(v) => *v = NULL_TINYINT,
            Value::SmallInt(v) => *v = NULL_SMALLINT,
            Value::Integer(v) => *v = NULL_INTEGER,
            Value::BigInt(v) | Value::Timestamp(v) => *v = NULL_BIGINT,
            Value::Double(v) => *v = NULL_DOUBLE,
            Value::Decimal(v) => *v = NULL_DECIMAL,
            Value::Address(v) => *v = 0,
            Value::Varchar(o) | Value::Varbinary(o) => *o = ObjectRef::Null,
            Value::Array(a) => *a = None,
        }
    }

    /// True when this value is a Double holding IEEE NaN.
    pub fn is_nan(&self) -> bool {
        matches!(self, Value::Double(v) if v.is_nan())
    }

    /// True when this value is boolean true. NULL and non-boolean values
    /// read as false.
    pub fn is_true(&self) -> bool {
        matches!(self, Value::Boolean(v) if *v != NULL_TINYINT && *v != 0)
    }

    /// True when this value is boolean false. NULL and non-boolean values
    /// read as false.
    pub fn is_false(&self) -> bool {
        matches!(self, Value::Boolean(0))
    }

    /// True when a non-NULL exact numeric value is zero.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedOperation` for kinds outside the integer family
    /// and Decimal.
    pub fn is_zero(&self) -> Result<bool, ValueError> {
        match self {
            Value::TinyInt(v) => Ok(*v == 0),
            Value::SmallInt(v) => Ok(*v == 0),
            Value::Integer(v) => Ok(*v == 0),
            Value::BigInt(v) | Value::Timestamp(v) => Ok(*v == 0),
            Value::Decimal(v) => Ok(*v == 0),
            other => Err(ValueError::UnsupportedOperation(format!(
                "{} is not a numeric kind that implements is_zero",
                other.kind()
            ))),
        }
    }

    /// True when this value borrows variable-length bytes from a tuple.
    pub fn source_inlined(&self) -> bool {
        match self {
            Value::Varchar(o) | Value::Varbinary(o) => o.is_inlined(),
            _ => false,
        }
    }

    /// Returns the object payload of a Varchar or Varbinary, `None` when
    /// NULL.
    pub fn object_bytes(&self) -> Result<Option<&[u8]>, ValueError> {
        match self {
            Value::Varchar(o) | Value::Varbinary(o) => o.bytes(),
            other => Err(ValueError::UnsupportedOperation(format!(
                "{} has no object bytes",
                other.kind()
            ))),
        }
    }

    /// Returns the cached byte length of a Varchar or Varbinary payload.
    pub fn object_len(&self) -> Result<Option<usize>, ValueError> {
        Ok(self.object_bytes()?.map(<[u8]>::len))
    }

    /// Releases this value's share of its pool handle, leaving it NULL.
    /// Borrowed (tuple-inlined) bytes are not this value's to release and
    /// are left untouched. Idempotent.
    pub fn free(&mut self) {
        match self {
            Value::Varchar(o) | Value::Varbinary(o) => {
                if !o.is_inlined() {
                    *o = ObjectRef::Null;
                }
            }
            Value::Array(a) => *a = None,
            _ => {}
        }
    }

    /// Copies this value out of any borrowed tuple storage, allocating from
    /// `pool` (the temp pool when `None`). Owned and fixed-width values are
    /// cloned as-is.
    pub fn to_owned_in(&self, pool: Option<&VarlenPool>) -> Result<Value<'static>, ValueError> {
        Ok(match self {
            Value::Invalid => Value::Invalid,
            Value::Null => Value::Null,
            Value::Boolean(v) => Value::Boolean(*v),
            Value::TinyInt(v) => Value::TinyInt(*v),
            Value::SmallInt(v) => Value::SmallInt(*v),
            Value::Integer(v) => Value::Integer(*v),
            Value::BigInt(v) => Value::BigInt(*v),
            Value::Timestamp(v) => Value::Timestamp(*v),
            Value::Double(v) => Value::Double(*v),
            Value::Decimal(v) => Value::Decimal(*v),
            Value::Address(v) => Value::Address(*v),
            Value::Varchar(o) => Value::Varchar(o.to_owned_in(pool)?),
            Value::Varbinary(o) => Value::Varbinary(o.to_owned_in(pool)?),
            Value::Array(a) => Value::Array(a.clone()),
        })
    }

    /// Replaces the contents of a non-NULL array. The element count must
    /// match the allocated length and every element must be of the array's
    /// element kind.
    pub fn set_array_elements(&self, values: Vec<Value<'static>>) -> Result<(), ValueError> {
        self.array()?.set_all(values)
    }

    /// Returns the element count of a non-NULL array.
    pub fn array_len(&self) -> Result<usize, ValueError> {
        Ok(self.array()?.len())
    }

    /// Clones out one element of a non-NULL array.
    pub fn item_at(&self, index: usize) -> Result<Value<'static>, ValueError> {
        let array = self.array()?;
        array.get(index).ok_or_else(|| {
            ValueError::UnsupportedOperation(format!(
                "array index {} out of bounds for {} elements",
                index,
                array.len()
            ))
        })
    }

    /// True when this value compares equal to some element of `list`.
    pub fn in_list(&self, list: &Value<'_>) -> Result<bool, ValueError> {
        let array = list.array()?;
        let found = array.for_each(|element| {
            if self.compare(element)? == std::cmp::Ordering::Equal {
                Ok(Some(()))
            } else {
                Ok(None)
            }
        })?;
        Ok(found.is_some())
    }

    fn array(&self) -> Result<&ArrayValue, ValueError> {
        match self {
            Value::Array(Some(array)) => Ok(array),
            Value::Array(None) => Err(ValueError::UnsupportedOperation(
                "operation on NULL array".to_string(),
            )),
            other => Err(ValueError::TypeMismatch {
                from: other.kind(),
                to: Kind::Array,
            }),
        }
    }

    /// Three-state reading of a Boolean: `None` for NULL.
    pub(crate) fn bool_state(&self) -> Result<Option<bool>, ValueError> {
        match self {
            Value::Boolean(v) if *v == NULL_TINYINT => Ok(None),
            Value::Boolean(v) => Ok(Some(*v != 0)),
            other => Err(ValueError::TypeMismatch {
                from: other.kind(),
                to: Kind::Boolean,
            }),
        }
    }

    /// Widens a non-NULL integer-family value to `i64`. Double and Decimal
    /// are deliberately excluded; they take their own comparison and
    /// arithmetic paths.
    pub(crate) fn bigint_value(&self) -> Result<i64, ValueError> {
        debug_assert!(!self.is_null());
        match self {
            Value::TinyInt(v) => Ok(*v as i64),
            Value::SmallInt(v) => Ok(*v as i64),
            Value::Integer(v) => Ok(*v as i64),
            Value::BigInt(v) | Value::Timestamp(v) => Ok(*v),
            other => Err(ValueError::TypeMismatch {
                from: other.kind(),
                to: Kind::BigInt,
            }),
        }
    }

    /// Converts a non-NULL numeric value to `f64`.
    pub(crate) fn double_value(&self) -> Result<f64, ValueError> {
        debug_assert!(!self.is_null());
        match self {
            Value::TinyInt(v) => Ok(*v as f64),
            Value::SmallInt(v) => Ok(*v as f64),
            Value::Integer(v) => Ok(*v as f64),
            Value::BigInt(v) | Value::Timestamp(v) => Ok(*v as f64),
            Value::Address(v) => Ok(*v as f64),
            Value::Double(v) => Ok(*v),
            Value::Decimal(v) => crate::cast::decimal_to_double(*v),
            other => Err(ValueError::TypeMismatch {
                from: other.kind(),
                to: Kind::Double,
            }),
        }
    }

    /// Converts a non-NULL numeric value to a scaled decimal integer.
    pub(crate) fn decimal_value(&self) -> Result<i128, ValueError> {
        debug_assert!(!self.is_null());
        match self {
            Value::TinyInt(_)
            | Value::SmallInt(_)
            | Value::Integer(_)
            | Value::BigInt(_)
            | Value::Timestamp(_) => {
                Ok(self.bigint_value()? as i128 * crate::decimal::SCALE_FACTOR)
            }
            Value::Decimal(v) => Ok(*v),
            Value::Double(v) => crate::decimal::from_double(*v),
            other => Err(ValueError::TypeMismatch {
                from: other.kind(),
                to: Kind::Decimal,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_kinds() {
        assert_eq!(Value::null().kind(), Kind::Null);
        assert_eq!(Value::true_value().kind(), Kind::Boolean);
        assert_eq!(Value::tinyint(1).kind(), Kind::TinyInt);
        assert_eq!(Value::smallint(1).kind(), Kind::SmallInt);
        assert_eq!(Value::integer(1).kind(), Kind::Integer);
        assert_eq!(Value::bigint(1).kind(), Kind::BigInt);
        assert_eq!(Value::timestamp(1).kind(), Kind::Timestamp);
        assert_eq!(Value::double(1.0).kind(), Kind::Double);
        assert_eq!(Value::decimal_from_str("1").unwrap().kind(), Kind::Decimal);
        assert_eq!(Value::address(7).kind(), Kind::Address);
        assert_eq!(Value::temp_string("x").kind(), Kind::Varchar);
        assert_eq!(Value::temp_binary(b"x").kind(), Kind::Varbinary);
        assert_eq!(
            Value::array_of(2, Kind::Integer).unwrap().kind(),
            Kind::Array
        );
    }

    #[test]
    fn test_set_null_every_kind() {
        let kinds = [
            Kind::Invalid,
            Kind::Null,
            Kind::Boolean,
            Kind::TinyInt,
            Kind::SmallInt,
            Kind::Integer,
            Kind::BigInt,
            Kind::Timestamp,
            Kind::Double,
            Kind::Decimal,
            Kind::Address,
            Kind::Varchar,
            Kind::Varbinary,
            Kind::Array,
        ];
        for kind in kinds {
            let mut value = Value::null_of(kind);
            value.set_null();
            assert!(value.is_null(), "set_null failed for {}", kind);
        }

        let mut value = Value::temp_string("abc");
        assert!(!value.is_null());
        value.set_null();
        assert!(value.is_null());

        // An uninitialized value reports non-NULL until it is nulled out.
        let mut value = Value::Invalid;
        assert!(!value.is_null());
        value.set_null();
        assert!(value.is_null());
    }

    #[test]
    fn test_sentinels_are_null() {
        assert!(Value::tinyint(NULL_TINYINT).is_null());
        assert!(Value::smallint(NULL_SMALLINT).is_null());
        assert!(Value::integer(NULL_INTEGER).is_null());
        assert!(Value::bigint(NULL_BIGINT).is_null());
        assert!(Value::timestamp(NULL_BIGINT).is_null());
        assert!(Value::double(NULL_DOUBLE).is_null());
        assert!(Value::decimal_from_scaled(NULL_DECIMAL).is_null());
        assert!(!Value::tinyint(0).is_null());
        assert!(!Value::double(0.0).is_null());
    }

    #[test]
    fn test_boolean_inspection() {
        assert!(Value::true_value().is_true());
        assert!(!Value::true_value().is_false());
        assert!(Value::false_value().is_false());
        assert!(!Value::false_value().is_true());

        let null_bool = Value::null_of(Kind::Boolean);
        assert!(!null_bool.is_true());
        assert!(!null_bool.is_false());

        // Non-booleans read as neither.
        assert!(!Value::integer(1).is_true());
        assert!(!Value::integer(0).is_false());
    }

    #[test]
    fn test_is_zero() {
        assert!(Value::integer(0).is_zero().unwrap());
        assert!(!Value::integer(3).is_zero().unwrap());
        assert!(Value::decimal_from_str("0").unwrap().is_zero().unwrap());
        assert!(!Value::decimal_from_str("0.1").unwrap().is_zero().unwrap());
        assert!(matches!(
            Value::double(0.0).is_zero(),
            Err(ValueError::UnsupportedOperation(_))
        ));
        assert!(matches!(
            Value::temp_string("0").is_zero(),
            Err(ValueError::UnsupportedOperation(_))
        ));
    }

    #[test]
    fn test_is_nan() {
        assert!(Value::double(f64::NAN).is_nan());
        assert!(!Value::double(1.0).is_nan());
        assert!(!Value::null_of(Kind::Double).is_nan());
        assert!(!Value::integer(1).is_nan());
    }

    #[test]
    fn test_object_bytes() {
        let value = Value::temp_string("hello");
        assert_eq!(value.object_bytes().unwrap().unwrap(), b"hello");
        assert_eq!(value.object_len().unwrap(), Some(5));
        assert!(!value.source_inlined());

        let null_string = Value::null_of(Kind::Varchar);
        assert_eq!(null_string.object_bytes().unwrap(), None);

        assert!(matches!(
            Value::integer(1).object_bytes(),
            Err(ValueError::UnsupportedOperation(_))
        ));
    }

    #[test]
    fn test_free_is_idempotent() {
        let mut value = Value::temp_string("hello");
        value.free();
        assert!(value.is_null());
        value.free();
        assert!(value.is_null());

        let mut n = Value::integer(5);
        n.free();
        assert!(!n.is_null());
    }

    #[test]
    fn test_to_owned_in_shares_owned_handles() {
        let pool = VarlenPool::new();
        let value = Value::string_in("shared", Some(&pool));
        let copied = value.to_owned_in(Some(&pool)).unwrap();
        assert_eq!(copied.object_bytes().unwrap().unwrap(), b"shared");
        // No second allocation: the handle is shared, not copied.
        assert_eq!(pool.live_count(), 1);
    }

    #[test]
    fn test_array_elements() {
        let array = Value::array_of(3, Kind::Integer).unwrap();
        assert_eq!(array.array_len().unwrap(), 3);
        assert!(array.item_at(0).unwrap().is_null());

        array
            .set_array_elements(vec![
                Value::integer(1),
                Value::integer(2),
                Value::integer(3),
            ])
            .unwrap();
        assert!(Value::integer(2).in_list(&array).unwrap());
        assert!(!Value::integer(9).in_list(&array).unwrap());

        // Wrong length and wrong element kind are rejected.
        assert!(array.set_array_elements(vec![Value::integer(1)]).is_err());
        assert!(array
            .set_array_elements(vec![
                Value::integer(1),
                Value::bigint(2),
                Value::integer(3),
            ])
            .is_err());
    }

    #[test]
    fn test_array_misuse() {
        assert!(matches!(
            Value::array_of(1, Kind::Array),
            Err(ValueError::UnsupportedOperation(_))
        ));
        assert!(matches!(
            Value::null_of(Kind::Array).array_len(),
            Err(ValueError::UnsupportedOperation(_))
        ));
        assert!(matches!(
            Value::integer(1).array_len(),
            Err(ValueError::TypeMismatch { .. })
        ));

        let array = Value::array_of(2, Kind::Integer).unwrap();
        assert!(matches!(
            array.item_at(5),
            Err(ValueError::UnsupportedOperation(_))
        ));
    }
}
