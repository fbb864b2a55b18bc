//! Pool-allocated storage for variable-length object bytes.
//!
//! A [`Varlen`] is a shared handle to one length-prefixed byte run. Every
//! clone of the handle shares the same allocation; the pool that created it
//! keeps the allocation registered under a stable 8-byte id so that tuple
//! slots can refer to it. Id 0 is reserved for the NULL handle.
//!
//! Pools are not meant to be shared across executor contexts; the registry
//! lock only guards against accidental misuse, not for throughput.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

use crate::codec;
use crate::error::ValueError;

/// Shared handle to a pool allocation holding `length prefix + payload`.
#[derive(Debug, Clone)]
pub struct Varlen {
    id: u64,
    data: Arc<[u8]>,
}

impl Varlen {
    /// Returns the pool id of this allocation. Never 0.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Returns the raw allocation: length prefix followed by the payload.
    pub fn raw(&self) -> &[u8] {
        &self.data
    }

    /// Returns the object payload past the length prefix.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFormat` if the stored prefix does not describe the
    /// allocation, which indicates corruption.
    pub fn object_bytes(&self) -> Result<&[u8], ValueError> {
        let (len, prefix) = codec::decode_length(&self.data)?;
        let len = len.ok_or_else(|| {
            ValueError::InvalidFormat("varlen allocation carries a NULL prefix".to_string())
        })?;
        self.data
            .get(prefix..prefix + len)
            .ok_or(ValueError::BufferTooSmall {
                required: prefix + len,
                available: self.data.len(),
            })
    }

    /// Returns the decoded object length.
    pub fn object_len(&self) -> Result<usize, ValueError> {
        Ok(self.object_bytes()?.len())
    }
}

struct PoolInner {
    next_id: u64,
    live: HashMap<u64, Varlen>,
}

/// Allocator for variable-length object storage.
///
/// Allocations stay registered until [`free`](VarlenPool::free) or
/// [`reset`](VarlenPool::reset); outstanding handles keep their bytes alive
/// past a reset, but the pool will no longer resolve their ids.
pub struct VarlenPool {
    inner: Mutex<PoolInner>,
}

impl VarlenPool {
    /// Creates an empty pool.
    pub fn new() -> Self {
        VarlenPool {
            inner: Mutex::new(PoolInner {
                next_id: 1,
                live: HashMap::new(),
            }),
        }
    }

    /// Allocates storage holding a length-prefixed copy of `object` and
    /// registers it under a fresh id.
    ///
    /// # Panics
    ///
    /// Panics if `object` exceeds the 30-bit length prefix limit; column
    /// width checks keep real objects far below it.
    pub fn allocate(&self, object: &[u8]) -> Varlen {
        let prefix = codec::prefix_len(object.len());
        let mut data = vec![0u8; prefix + object.len()];
        codec::encode_length(Some(object.len()), &mut data)
            .expect("object length fits the 30-bit prefix");
        data[prefix..].copy_from_slice(object);

        let mut inner = self.inner.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        let varlen = Varlen {
            id,
            data: Arc::from(data),
        };
        inner.live.insert(id, varlen.clone());
        varlen
    }

    /// Resolves a tuple-stored handle id. Returns `None` for ids that were
    /// never allocated, already freed, or wiped by a reset.
    pub fn lookup(&self, id: u64) -> Option<Varlen> {
        self.inner.lock().live.get(&id).cloned()
    }

    /// Releases the registration of one allocation. Idempotent; id 0 (the
    /// NULL handle) is a no-op.
    pub fn free(&self, id: u64) {
        if id == 0 {
            return;
        }
        self.inner.lock().live.remove(&id);
    }

    /// Drops every registration, invalidating all outstanding ids.
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        let dropped = inner.live.len();
        inner.live.clear();
        tracing::debug!(dropped, "varlen pool reset");
    }

    /// Number of live allocations, for tests and accounting.
    pub fn live_count(&self) -> usize {
        self.inner.lock().live.len()
    }
}

impl Default for VarlenPool {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns the process-wide temp pool used for short-lived scratch
/// allocations. Values built from it are invalidated by the next
/// [`reset`](VarlenPool::reset), at query-scope boundaries.
pub fn temp_pool() -> &'static VarlenPool {
    static TEMP_POOL: OnceLock<VarlenPool> = OnceLock::new();
    TEMP_POOL.get_or_init(VarlenPool::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_and_read_back() {
        let pool = VarlenPool::new();
        let varlen = pool.allocate(b"hello");
        assert_eq!(varlen.object_bytes().unwrap(), b"hello");
        assert_eq!(varlen.object_len().unwrap(), 5);
        assert_eq!(varlen.raw()[0], 5);
    }

    #[test]
    fn test_long_prefix_allocation() {
        let pool = VarlenPool::new();
        let payload = vec![0xAB; 200];
        let varlen = pool.allocate(&payload);
        assert_eq!(varlen.raw().len(), 4 + 200);
        assert_eq!(varlen.object_bytes().unwrap(), payload.as_slice());
    }

    #[test]
    fn test_lookup_and_free() {
        let pool = VarlenPool::new();
        let varlen = pool.allocate(b"abc");
        let id = varlen.id();
        assert!(id != 0);
        assert!(pool.lookup(id).is_some());

        pool.free(id);
        assert!(pool.lookup(id).is_none());
        // Freeing again, or freeing the NULL handle, is a no-op.
        pool.free(id);
        pool.free(0);
    }

    #[test]
    fn test_reset_invalidates_ids_but_not_handles() {
        let pool = VarlenPool::new();
        let varlen = pool.allocate(b"persistent");
        assert_eq!(pool.live_count(), 1);

        pool.reset();
        assert_eq!(pool.live_count(), 0);
        assert!(pool.lookup(varlen.id()).is_none());
        // The outstanding handle still reads its bytes.
        assert_eq!(varlen.object_bytes().unwrap(), b"persistent");
    }

    #[test]
    fn test_ids_are_unique() {
        let pool = VarlenPool::new();
        let a = pool.allocate(b"a");
        let b = pool.allocate(b"b");
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_empty_object() {
        let pool = VarlenPool::new();
        let varlen = pool.allocate(b"");
        assert_eq!(varlen.object_bytes().unwrap(), b"");
        assert_eq!(varlen.raw(), &[0u8]);
    }
}
