// Mon Jan 19 2026 - Alex

use crate::utils::hash::fnv1a_64;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::fmt;

const POOL_SHARD_COUNT: usize = 23;
const SLAB_SIZE: usize = 16 * 1024 * 1024;

/// Prefix stored immediately before the interned bytes.
const LEN_PREFIX: usize = std::mem::size_of::<u32>();
const HASH_PREFIX: usize = std::mem::size_of::<u64>();
const PREFIX: usize = LEN_PREFIX + HASH_PREFIX;

/// Handle to an interned string.
///
/// Points into an immortal arena slot laid out as `(u32 length, u64 hash,
/// bytes, NUL)`; the handle addresses the bytes and unpacks the prefix with
/// unaligned loads. The default handle is null and views as `""`. Equality
/// and hashing use the stored 64-bit hash only.
#[derive(Copy, Clone)]
pub struct PoolString {
    data: *const u8,
}

// Handles point into slabs that are leaked for the life of the process and
// never written after publication.
unsafe impl Send for PoolString {}
unsafe impl Sync for PoolString {}

impl Default for PoolString {
    fn default() -> Self {
        Self {
            data: std::ptr::null(),
        }
    }
}

impl PoolString {
    fn from_raw(data: *const u8) -> Self {
        Self { data }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_null()
    }

    pub fn size(&self) -> usize {
        if self.data.is_null() {
            return 0;
        }
        let len = unsafe { std::ptr::read_unaligned(self.data.sub(PREFIX) as *const u32) };
        len as usize
    }

    pub fn hash(&self) -> u64 {
        if self.data.is_null() {
            return 0;
        }
        unsafe { std::ptr::read_unaligned(self.data.sub(HASH_PREFIX) as *const u64) }
    }

    pub fn as_bytes(&self) -> &'static [u8] {
        if self.data.is_null() {
            return &[];
        }
        unsafe { std::slice::from_raw_parts(self.data, self.size()) }
    }

    pub fn view(&self) -> &'static str {
        // Slots are only ever populated from `&str` input.
        unsafe { std::str::from_utf8_unchecked(self.as_bytes()) }
    }
}

impl PartialEq for PoolString {
    fn eq(&self, other: &Self) -> bool {
        self.hash() == other.hash()
    }
}

impl Eq for PoolString {}

impl std::hash::Hash for PoolString {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash());
    }
}

impl PartialOrd for PoolString {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PoolString {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.as_bytes().cmp(other.as_bytes())
    }
}

impl fmt::Display for PoolString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.view())
    }
}

impl fmt::Debug for PoolString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.view())
    }
}

/// Bump arena for one pool shard. Slabs are leaked on allocation; interned
/// handles must stay valid for the rest of the process.
struct Pond {
    cursor: *mut u8,
    remaining: usize,
}

unsafe impl Send for Pond {}

impl Pond {
    fn new() -> Self {
        Self {
            cursor: std::ptr::null_mut(),
            remaining: 0,
        }
    }

    fn empool(&mut self, bytes: &[u8], hash: u64) -> *const u8 {
        let len = bytes.len() as u32;
        let total = PREFIX + bytes.len() + 1;

        if self.remaining < total {
            let slab_len = SLAB_SIZE.max(total);
            let slab: &'static mut [u8] = Box::leak(vec![0u8; slab_len].into_boxed_slice());
            self.cursor = slab.as_mut_ptr();
            self.remaining = slab_len;
        }

        // The slab is unaligned storage; pack the prefix with byte copies.
        unsafe {
            std::ptr::copy_nonoverlapping(len.to_ne_bytes().as_ptr(), self.cursor, LEN_PREFIX);
            std::ptr::copy_nonoverlapping(
                hash.to_ne_bytes().as_ptr(),
                self.cursor.add(LEN_PREFIX),
                HASH_PREFIX,
            );
            std::ptr::copy_nonoverlapping(bytes.as_ptr(), self.cursor.add(PREFIX), bytes.len());
            *self.cursor.add(total - 1) = 0;
        }

        let result = unsafe { self.cursor.add(PREFIX) as *const u8 };
        self.cursor = unsafe { self.cursor.add(total) };
        self.remaining -= total;
        result
    }
}

/// Concurrent, idempotent string interner.
///
/// The key map is consulted lock-free first; on a miss the owning partition
/// is locked and the lookup retried before the arena allocates.
pub struct StringPool {
    keys: DashMap<u64, usize>,
    shards: Vec<Mutex<Pond>>,
}

impl StringPool {
    pub fn new() -> Self {
        Self {
            keys: DashMap::new(),
            shards: (0..POOL_SHARD_COUNT).map(|_| Mutex::new(Pond::new())).collect(),
        }
    }

    pub fn empool(&self, incoming: &str) -> PoolString {
        // The empty string is the null handle, not an arena slot.
        if incoming.is_empty() {
            return PoolString::default();
        }

        let hash = fnv1a_64(incoming.as_bytes());

        if let Some(existing) = self.keys.get(&hash) {
            return PoolString::from_raw(*existing as *const u8);
        }

        let shard = &self.shards[(hash % POOL_SHARD_COUNT as u64) as usize];
        let mut pond = shard.lock();

        // Another thread may have interned it while we waited for the lock.
        if let Some(existing) = self.keys.get(&hash) {
            return PoolString::from_raw(*existing as *const u8);
        }

        let data = pond.empool(incoming.as_bytes(), hash);
        self.keys.insert(hash, data as usize);
        PoolString::from_raw(data)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl Default for StringPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empool_roundtrip() {
        let pool = StringPool::new();
        let s = pool.empool("::[u]::Namespace::Type::member");
        assert_eq!(s.view(), "::[u]::Namespace::Type::member");
        assert_eq!(s.size(), "::[u]::Namespace::Type::member".len());
        assert_eq!(s.hash(), fnv1a_64(b"::[u]::Namespace::Type::member"));
    }

    #[test]
    fn test_empool_idempotent() {
        let pool = StringPool::new();
        let a = pool.empool("foo");
        let b = pool.empool("foo");
        assert_eq!(a, b);
        assert_eq!(a.hash(), b.hash());
        assert_eq!(a.as_bytes().as_ptr(), b.as_bytes().as_ptr());
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_empty_string_is_null_handle() {
        let pool = StringPool::new();
        let empty = pool.empool("");
        assert!(empty.is_empty());
        assert_eq!(empty.view(), "");
        assert_eq!(empty.size(), 0);
        assert_eq!(empty.hash(), 0);
        assert_eq!(empty, PoolString::default());
        assert_eq!(pool.len(), 0);
    }

    #[test]
    fn test_distinct_strings_distinct_handles() {
        let pool = StringPool::new();
        let a = pool.empool("alpha");
        let b = pool.empool("beta");
        assert_ne!(a, b);
        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn test_ordering_by_content() {
        let pool = StringPool::new();
        let a = pool.empool("a.o");
        let b = pool.empool("b.o");
        assert!(a < b);
        assert!(PoolString::default() < a);
    }

    #[test]
    fn test_concurrent_empool() {
        let pool = StringPool::new();
        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for i in 0..500 {
                        let s = format!("symbol_{}", i % 50);
                        let handle = pool.empool(&s);
                        assert_eq!(handle.view(), s);
                    }
                });
            }
        });
        assert_eq!(pool.len(), 50);
    }
}
