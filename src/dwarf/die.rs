// Tue Jan 20 2026 - Alex

use crate::dwarf::constants::{Arch, Tag};
use crate::strings::PoolString;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

pub const ANCESTRY_MAX: usize = 5;

/// How an object file was reached: outermost container first, e.g.
/// `universal.a -> libfoo.a -> foo.o`. Bounded, and ordered so chains of
/// duplicate DIEs can be sorted deterministically.
#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct ObjectAncestry {
    ancestors: [PoolString; ANCESTRY_MAX],
    count: usize,
}

impl ObjectAncestry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, ancestor: PoolString) {
        assert!(self.count < ANCESTRY_MAX, "object ancestry too deep");
        self.ancestors[self.count] = ancestor;
        self.count += 1;
    }

    pub fn with(&self, ancestor: PoolString) -> Self {
        let mut next = *self;
        next.push(ancestor);
        next
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &PoolString> {
        self.ancestors[..self.count].iter()
    }
}

impl PartialOrd for ObjectAncestry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ObjectAncestry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.count
            .cmp(&other.count)
            .then_with(|| self.ancestors[..self.count].cmp(&other.ancestors[..other.count]))
    }
}

impl fmt::Display for ObjectAncestry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, ancestor) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "{}", ancestor)?;
        }
        Ok(())
    }
}

impl fmt::Debug for ObjectAncestry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

/// Location of a DIE inside the registry's batch store.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct DieRef {
    pub batch: u32,
    pub index: u32,
}

const DIE_REF_NONE: u64 = u64::MAX;

impl DieRef {
    pub fn new(batch: u32, index: u32) -> Self {
        Self { batch, index }
    }

    pub fn pack(&self) -> u64 {
        ((self.batch as u64) << 32) | self.index as u64
    }

    pub fn unpack(raw: u64) -> Option<Self> {
        if raw == DIE_REF_NONE {
            return None;
        }
        Some(Self {
            batch: (raw >> 32) as u32,
            index: raw as u32,
        })
    }
}

/// One Debug Information Entry, reduced to what ODR enforcement needs.
///
/// A die is an abbreviation "stamping": the abbreviation supplies the shape,
/// the debug info data supplies the values. Millions of these exist at
/// runtime, so only hashes and flags are retained; full attributes are
/// re-fetched on demand when a report is rendered.
pub struct Die {
    pub path: PoolString,
    pub hash: u64,
    pub fatal_attribute_hash: u64,
    pub ofd_index: u32,
    /// Offset from the top of the owning image's `__debug_info` section.
    pub debug_info_offset: u32,
    pub tag: Tag,
    pub arch: Arch,
    pub has_children: bool,
    pub skippable: bool,
    pub conflict: AtomicBool,
    /// Next die in the same-identity chain, packed `DieRef`. Mutated only
    /// under the registry's striped chain lock.
    pub next: AtomicU64,
}

impl Die {
    pub fn new(tag: Tag, arch: Arch, debug_info_offset: u32) -> Self {
        Self {
            path: PoolString::default(),
            hash: 0,
            fatal_attribute_hash: 0,
            ofd_index: 0,
            debug_info_offset,
            tag,
            arch,
            has_children: false,
            skippable: false,
            conflict: AtomicBool::new(false),
            next: AtomicU64::new(DIE_REF_NONE),
        }
    }

    pub fn next_die(&self) -> Option<DieRef> {
        DieRef::unpack(self.next.load(Ordering::Acquire))
    }

    pub fn set_next(&self, next: Option<DieRef>) {
        let raw = next.map_or(DIE_REF_NONE, |r| r.pack());
        self.next.store(raw, Ordering::Release);
    }

    pub fn has_conflict(&self) -> bool {
        self.conflict.load(Ordering::Acquire)
    }

    pub fn mark_conflict(&self) {
        self.conflict.store(true, Ordering::Release);
    }
}

impl fmt::Debug for Die {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Die")
            .field("path", &self.path)
            .field("tag", &self.tag)
            .field("arch", &self.arch)
            .field("hash", &format_args!("{:#018x}", self.hash))
            .field(
                "fatal_attribute_hash",
                &format_args!("{:#018x}", self.fatal_attribute_hash),
            )
            .field("ofd_index", &self.ofd_index)
            .field(
                "debug_info_offset",
                &format_args!("{:#010x}", self.debug_info_offset),
            )
            .field("skippable", &self.skippable)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strings::StringPool;

    #[test]
    fn test_die_ref_packing() {
        let r = DieRef::new(3, 17);
        assert_eq!(DieRef::unpack(r.pack()), Some(r));
        assert_eq!(DieRef::unpack(DIE_REF_NONE), None);

        let r = DieRef::new(u32::MAX - 1, u32::MAX);
        assert_eq!(DieRef::unpack(r.pack()), Some(r));
    }

    #[test]
    fn test_die_next_chain() {
        let die = Die::new(Tag::Subprogram, Arch::Arm64, 0x10);
        assert_eq!(die.next_die(), None);
        die.set_next(Some(DieRef::new(1, 2)));
        assert_eq!(die.next_die(), Some(DieRef::new(1, 2)));
        die.set_next(None);
        assert_eq!(die.next_die(), None);
    }

    #[test]
    fn test_ancestry_ordering() {
        let pool = StringPool::new();
        let mut a = ObjectAncestry::new();
        a.push(pool.empool("a.o"));
        let mut b = ObjectAncestry::new();
        b.push(pool.empool("b.o"));
        assert!(a < b);

        // shorter ancestry sorts first
        let mut nested = a;
        nested.push(pool.empool("member.o"));
        assert!(a < nested);

        // deterministic and total
        assert_eq!(a.cmp(&a), std::cmp::Ordering::Equal);
    }

    #[test]
    fn test_ancestry_display() {
        let pool = StringPool::new();
        let mut ancestry = ObjectAncestry::new();
        ancestry.push(pool.empool("lib.a"));
        ancestry.push(pool.empool("foo.o"));
        assert_eq!(ancestry.to_string(), "lib.a -> foo.o");
    }

    #[test]
    #[should_panic(expected = "object ancestry too deep")]
    fn test_ancestry_bounded() {
        let pool = StringPool::new();
        let mut ancestry = ObjectAncestry::new();
        for i in 0..=ANCESTRY_MAX {
            ancestry.push(pool.empool(&format!("level{}", i)));
        }
    }
}
