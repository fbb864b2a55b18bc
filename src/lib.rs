pub mod arith;
pub mod cast;
pub mod codec;
pub mod compare;
pub mod decimal;
pub mod error;
pub mod hash;
pub mod stream;
pub mod tuple;
pub mod types;
pub mod utf8;
pub mod value;
pub mod varlen;

pub use error::{RangeFlags, ValueError};
pub use types::{promote_for_op, Kind};
pub use value::{ArrayValue, ObjectRef, Value};
pub use varlen::{temp_pool, Varlen, VarlenPool};
