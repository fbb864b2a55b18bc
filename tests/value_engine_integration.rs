//! End-to-end tests for the value engine.
//!
//! These exercise whole flows the way an executor would: build values,
//! move them through tuple slots and streams, operate on them, and check
//! that every representation round-trips bit for bit.

use bytes::BytesMut;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use tessera::{Kind, Value, VarlenPool};

fn assert_same(lhs: &Value<'_>, rhs: &Value<'_>) {
    assert_eq!(lhs.kind(), rhs.kind());
    assert_eq!(lhs.is_null(), rhs.is_null());
    if !lhs.is_null() && lhs.kind() != Kind::Boolean {
        assert_eq!(lhs.compare(rhs).unwrap(), std::cmp::Ordering::Equal);
    }
}

fn wire_roundtrip(value: &Value<'static>) -> Value<'static> {
    let mut buf = BytesMut::new();
    value.serialize_parameter(&mut buf).unwrap();
    let first = buf.clone();
    let back = Value::deserialize_parameter(&mut buf, None).unwrap();

    // Re-serializing the deserialized value reproduces identical bytes.
    let mut again = BytesMut::new();
    back.serialize_parameter(&mut again).unwrap();
    assert_eq!(first, again);
    back
}

fn tuple_roundtrip_inline(value: &Value<'static>, kind: Kind, max_len: usize) -> Value<'static> {
    let pool = VarlenPool::new();
    let slot_size = kind.tuple_storage_size().unwrap().max(max_len + 4);
    let mut slot = vec![0u8; slot_size];
    value
        .serialize_to_tuple_storage(&mut slot, true, max_len, true, None)
        .unwrap();

    let borrowed = Value::init_from_tuple_storage(&slot, kind, true, &pool).unwrap();

    // Writing the read-back value into a second slot reproduces the bytes.
    let mut second = vec![0u8; slot_size];
    borrowed
        .serialize_to_tuple_storage(&mut second, true, max_len, true, None)
        .unwrap();
    assert_eq!(slot, second);

    borrowed.to_owned_in(None).unwrap()
}

#[test]
fn fixed_width_values_roundtrip_every_format() {
    let values: Vec<(Value<'static>, Kind)> = vec![
        (Value::tinyint(-42), Kind::TinyInt),
        (Value::null_of(Kind::TinyInt), Kind::TinyInt),
        (Value::smallint(12_345), Kind::SmallInt),
        (Value::integer(-1), Kind::Integer),
        (Value::null_of(Kind::Integer), Kind::Integer),
        (Value::bigint(i64::MAX), Kind::BigInt),
        (Value::timestamp(1_700_000_000_000_000), Kind::Timestamp),
        (Value::double(std::f64::consts::PI), Kind::Double),
        (Value::null_of(Kind::Double), Kind::Double),
        (
            Value::decimal_from_str("-1234567890.000000000001").unwrap(),
            Kind::Decimal,
        ),
        (Value::null_of(Kind::Decimal), Kind::Decimal),
    ];

    for (value, kind) in &values {
        let from_tuple = tuple_roundtrip_inline(value, *kind, 0);
        assert_same(value, &from_tuple);

        let from_wire = wire_roundtrip(value);
        assert_same(value, &from_wire);
    }
}

#[test]
fn strings_roundtrip_inline_outline_and_wire() {
    let pool = VarlenPool::new();
    let samples = ["", "a", "hello world", "héllo 日本語 🎉"];

    for text in samples {
        let value = Value::string_in(text, Some(&pool));

        // Inlined tuple slot.
        let inline = tuple_roundtrip_inline(&value, Kind::Varchar, 60);
        assert_eq!(
            inline.object_bytes().unwrap().unwrap(),
            text.as_bytes()
        );

        // Out-of-line tuple slot through the pool.
        let mut slot = [0u8; 8];
        value
            .serialize_to_tuple_storage(&mut slot, false, 60, true, Some(&pool))
            .unwrap();
        let outline = Value::init_from_tuple_storage(&slot, Kind::Varchar, false, &pool).unwrap();
        assert_eq!(
            outline.object_bytes().unwrap().unwrap(),
            text.as_bytes()
        );

        // Wire.
        let from_wire = wire_roundtrip(&value);
        assert_eq!(
            from_wire.object_bytes().unwrap().unwrap(),
            text.as_bytes()
        );
    }
}

#[test]
fn borrowed_tuple_string_feeds_like_and_compare() {
    let pool = VarlenPool::new();
    let mut slot = vec![0u8; 40];
    Value::temp_string("abcXdef")
        .serialize_to_tuple_storage(&mut slot, true, 32, true, None)
        .unwrap();

    let borrowed = Value::init_from_tuple_storage(&slot, Kind::Varchar, true, &pool).unwrap();
    assert!(borrowed.source_inlined());

    let pattern = Value::temp_string("a%c_def");
    assert!(borrowed.like(&pattern).unwrap());
    assert!(!borrowed.like(&Value::temp_string("ab")).unwrap());

    assert_eq!(
        borrowed.compare(&Value::temp_string("abcXdef")).unwrap(),
        std::cmp::Ordering::Equal
    );

    // Promote the borrow into pool ownership and drop the slot.
    let owned = borrowed.to_owned_in(Some(&pool)).unwrap();
    drop(slot);
    assert_eq!(owned.object_bytes().unwrap().unwrap(), b"abcXdef");
}

#[test]
fn decimal_precision_survives_arithmetic_and_storage() {
    let lhs = Value::decimal_from_str("1.234567890123").unwrap();
    let rhs = Value::decimal_from_str("2").unwrap();
    let product = lhs.op_multiply(&rhs).unwrap();

    let rendered = product.cast_as(Kind::Varchar).unwrap();
    assert_eq!(
        rendered.object_bytes().unwrap().unwrap(),
        b"2.469135780246"
    );

    // All 38 digits survive a tuple round-trip.
    let wide = Value::decimal_from_str(
        "99999999999999999999999999.999999999999",
    )
    .unwrap();
    let back = tuple_roundtrip_inline(&wide, Kind::Decimal, 0);
    assert_eq!(back.compare(&wide).unwrap(), std::cmp::Ordering::Equal);
}

#[test]
fn casts_compose_with_streams() {
    // A parameter arrives as text, is cast to a number, operated on, and
    // exported.
    let mut buf = BytesMut::new();
    Value::temp_string("41").serialize_parameter(&mut buf).unwrap();

    let param = Value::deserialize_parameter(&mut buf, None).unwrap();
    let n = param.cast_as(Kind::BigInt).unwrap();
    let next = n.op_add(&Value::integer(1)).unwrap();

    let mut export = BytesMut::new();
    next.serialize_to_export(&mut export).unwrap();
    assert_eq!(&export[..], &42i64.to_be_bytes());
}

#[test]
fn representable_casts_roundtrip() {
    let kinds = [Kind::TinyInt, Kind::SmallInt, Kind::Integer, Kind::BigInt];
    for n in [-127i64, -1, 0, 1, 99, 127] {
        for from in kinds {
            for to in kinds {
                let original = Value::bigint(n).cast_as(from).unwrap();
                let converted = original.cast_as(to).unwrap();
                let back = converted.cast_as(from).unwrap();
                assert_eq!(
                    back.compare(&original).unwrap(),
                    std::cmp::Ordering::Equal,
                    "{} -> {} -> {} broke {}",
                    from,
                    to,
                    from,
                    n
                );
            }
        }
    }
}

#[test]
fn randomized_roundtrips_are_bit_exact() {
    let mut rng = StdRng::seed_from_u64(0x5EED);

    for _ in 0..200 {
        let value: Value<'static> = match rng.gen_range(0..6) {
            0 => Value::tinyint(rng.gen()),
            1 => Value::smallint(rng.gen()),
            2 => Value::integer(rng.gen()),
            3 => Value::bigint(rng.gen()),
            4 => Value::timestamp(rng.gen()),
            _ => Value::double(f64::from_bits(rng.gen::<u64>() & !(1 << 63))),
        };
        let kind = value.kind();

        let from_tuple = tuple_roundtrip_inline(&value, kind, 0);
        assert_same(&value, &from_tuple);

        if !value.is_nan() {
            let from_wire = wire_roundtrip(&value);
            assert_same(&value, &from_wire);
        }
    }
}

#[test]
fn randomized_strings_roundtrip() {
    let mut rng = StdRng::seed_from_u64(0xC0FFEE);
    let pool = VarlenPool::new();

    for _ in 0..100 {
        let len = rng.gen_range(0..200);
        let text: String = (0..len)
            .map(|_| char::from(rng.gen_range(b'a'..=b'z')))
            .collect();
        let value = Value::string_in(&text, Some(&pool));

        let from_tuple = tuple_roundtrip_inline(&value, Kind::Varchar, 256);
        assert_eq!(
            from_tuple.object_bytes().unwrap().unwrap(),
            text.as_bytes()
        );

        let from_wire = wire_roundtrip(&value);
        assert_eq!(
            from_wire.object_bytes().unwrap().unwrap(),
            text.as_bytes()
        );
    }
}

#[test]
fn compare_and_hash_agree_across_widths() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..100 {
        let n = rng.gen_range(-127i64..=127);
        let narrow = Value::bigint(n).cast_as(Kind::TinyInt).unwrap();
        let wide = Value::bigint(n);
        assert_eq!(narrow.compare(&wide).unwrap(), std::cmp::Ordering::Equal);
        assert_eq!(narrow.hash_value().unwrap(), wide.hash_value().unwrap());
    }
}

#[test]
fn pool_reset_invalidates_stored_handles() {
    let pool = VarlenPool::new();
    let mut slot = [0u8; 8];
    Value::temp_string("scratch")
        .serialize_to_tuple_storage(&mut slot, false, 32, true, Some(&pool))
        .unwrap();

    assert!(Value::init_from_tuple_storage(&slot, Kind::Varchar, false, &pool).is_ok());
    pool.reset();
    assert!(Value::init_from_tuple_storage(&slot, Kind::Varchar, false, &pool).is_err());
}

#[test]
fn in_list_over_wire_array() {
    let array = Value::array_of(3, Kind::BigInt).unwrap();
    array
        .set_array_elements(vec![
            Value::bigint(1),
            Value::bigint(5),
            Value::bigint(9),
        ])
        .unwrap();

    let mut buf = BytesMut::new();
    array.serialize_parameter(&mut buf).unwrap();
    let list = Value::deserialize_parameter(&mut buf, None).unwrap();

    // Cross-width membership works through promotion.
    assert!(Value::integer(5).in_list(&list).unwrap());
    assert!(!Value::integer(6).in_list(&list).unwrap());
}
