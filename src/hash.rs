//! Value hashing.
//!
//! Two schemes serve two callers: [`Value::murmur_hash`] is the stable
//! 128-bit MurmurHash3 (x64 variant, seed 0) over the raw representation,
//! used for partitioning, and [`Value::hash_combine`] folds the logical
//! value into a running 64-bit seed for composite hash keys.

use crate::error::ValueError;
use crate::value::Value;

const C1: u64 = 0x87c3_7b91_1142_53d5;
const C2: u64 = 0x4cf5_ab62_e5a6_e2c1;

fn fmix64(mut k: u64) -> u64 {
    k ^= k >> 33;
    k = k.wrapping_mul(0xff51_afd7_ed55_8ccd);
    k ^= k >> 33;
    k = k.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    k ^= k >> 33;
    k
}

/// MurmurHash3 x64 128-bit over `data`, returned as `(h1 << 64) | h2`.
pub fn murmur3_x64_128(data: &[u8], seed: u64) -> u128 {
    let mut h1 = seed;
    let mut h2 = seed;

    let nblocks = data.len() / 16;
    for block in 0..nblocks {
        let base = block * 16;
        let mut k1 = u64::from_le_bytes(data[base..base + 8].try_into().unwrap());
        let mut k2 = u64::from_le_bytes(data[base + 8..base + 16].try_into().unwrap());

        k1 = k1.wrapping_mul(C1).rotate_left(31).wrapping_mul(C2);
        h1 ^= k1;
        h1 = h1
            .rotate_left(27)
            .wrapping_add(h2)
            .wrapping_mul(5)
            .wrapping_add(0x52dc_e729);

        k2 = k2.wrapping_mul(C2).rotate_left(33).wrapping_mul(C1);
        h2 ^= k2;
        h2 = h2
            .rotate_left(31)
            .wrapping_add(h1)
            .wrapping_mul(5)
            .wrapping_add(0x3849_5ab5);
    }

    let tail = &data[nblocks * 16..];
    if tail.len() > 8 {
        let mut k2 = 0u64;
        for (i, &byte) in tail[8..].iter().enumerate() {
            k2 ^= (byte as u64) << (i * 8);
        }
        k2 = k2.wrapping_mul(C2).rotate_left(33).wrapping_mul(C1);
        h2 ^= k2;
    }
    if !tail.is_empty() {
        let mut k1 = 0u64;
        for (i, &byte) in tail[..tail.len().min(8)].iter().enumerate() {
            k1 ^= (byte as u64) << (i * 8);
        }
        k1 = k1.wrapping_mul(C1).rotate_left(31).wrapping_mul(C2);
        h1 ^= k1;
    }

    h1 ^= data.len() as u64;
    h2 ^= data.len() as u64;
    h1 = h1.wrapping_add(h2);
    h2 = h2.wrapping_add(h1);
    h1 = fmix64(h1);
    h2 = fmix64(h2);
    h1 = h1.wrapping_add(h2);
    h2 = h2.wrapping_add(h1);

    ((h1 as u128) << 64) | h2 as u128
}

/// Folds one 64-bit quantity into a running seed.
fn combine(seed: &mut u64, value: u64) {
    *seed ^= value
        .wrapping_add(0x9e37_79b9)
        .wrapping_add(*seed << 6)
        .wrapping_add(*seed >> 2);
}

impl<'a> Value<'a> {
    /// Stable 128-bit hash of this value's raw representation, seed 0.
    ///
    /// Fixed-width kinds hash their 8-byte little-endian cell image (the
    /// value's bytes followed by zero padding), objects hash their payload.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedOperation` for NULL objects and kinds with no
    /// defined hash.
    pub fn murmur_hash(&self) -> Result<u128, ValueError> {
        let mut cell = [0u8; 8];
        match self {
            Value::TinyInt(v) => cell[0] = *v as u8,
            Value::SmallInt(v) => cell[..2].copy_from_slice(&v.to_le_bytes()),
            Value::Integer(v) => cell[..4].copy_from_slice(&v.to_le_bytes()),
            Value::BigInt(v) | Value::Timestamp(v) => cell.copy_from_slice(&v.to_le_bytes()),
            Value::Double(v) => cell.copy_from_slice(&v.to_le_bytes()),
            Value::Varchar(_) | Value::Varbinary(_) => {
                let bytes = self.object_bytes()?.ok_or_else(|| {
                    ValueError::UnsupportedOperation(
                        "cannot murmur-hash a NULL object value".to_string(),
                    )
                })?;
                return Ok(murmur3_x64_128(bytes, 0));
            }
            other => {
                return Err(ValueError::UnsupportedOperation(format!(
                    "{} has no murmur hash",
                    other.kind()
                )))
            }
        }
        Ok(murmur3_x64_128(&cell, 0))
    }

    /// Folds this value's logical content into `seed`.
    ///
    /// Integer-family values hash by their widened 64-bit value, so equal
    /// numbers of different widths hash equal. Doubles hash by bit pattern,
    /// objects by payload bytes (NULL hashes as the empty payload), and
    /// decimals by both limbs of the scaled integer.
    pub fn hash_combine(&self, seed: &mut u64) -> Result<(), ValueError> {
        match self {
            Value::TinyInt(_)
            | Value::SmallInt(_)
            | Value::Integer(_)
            | Value::BigInt(_)
            | Value::Timestamp(_) => combine(seed, self.bigint_value()? as u64),
            Value::Double(v) => combine(seed, v.to_bits()),
            Value::Varchar(_) | Value::Varbinary(_) => {
                let bytes = self.object_bytes()?.unwrap_or(&[]);
                combine(seed, murmur3_x64_128(bytes, 0) as u64);
            }
            Value::Decimal(v) => {
                combine(seed, *v as u64);
                combine(seed, (*v >> 64) as u64);
            }
            other => {
                return Err(ValueError::UnsupportedOperation(format!(
                    "{} has no combinable hash",
                    other.kind()
                )))
            }
        }
        Ok(())
    }

    /// One-shot [`hash_combine`](Value::hash_combine) from a zero seed.
    pub fn hash_value(&self) -> Result<u64, ValueError> {
        let mut seed = 0u64;
        self.hash_combine(&mut seed)?;
        Ok(seed)
    }
}
