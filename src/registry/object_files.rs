// Wed Jan 21 2026 - Alex

use crate::dwarf::{Arch, ObjectAncestry};
use parking_lot::RwLock;
use std::path::PathBuf;
use std::sync::Arc;

/// Everything needed to re-open the Mach-O image a DIE came from: the root
/// file on disk, the byte range of the image inside it (identity range for a
/// bare .o), and how it was reached.
#[derive(Debug, Clone)]
pub struct ObjectFileDescriptor {
    pub ancestry: ObjectAncestry,
    pub root_path: PathBuf,
    pub image_offset: u64,
    pub image_end: u64,
    pub arch: Arch,
}

/// Process-wide table of object files seen during the run; DIEs carry an
/// index into it instead of a path.
pub struct ObjectFileRegistry {
    files: RwLock<Vec<Arc<ObjectFileDescriptor>>>,
}

impl ObjectFileRegistry {
    pub fn new() -> Self {
        Self {
            files: RwLock::new(Vec::new()),
        }
    }

    pub fn insert(&self, descriptor: ObjectFileDescriptor) -> u32 {
        let mut files = self.files.write();
        let index = files.len() as u32;
        files.push(Arc::new(descriptor));
        index
    }

    pub fn get(&self, index: u32) -> Arc<ObjectFileDescriptor> {
        self.files.read()[index as usize].clone()
    }

    pub fn ancestry(&self, index: u32) -> ObjectAncestry {
        self.files.read()[index as usize].ancestry
    }

    pub fn len(&self) -> usize {
        self.files.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.read().is_empty()
    }

    pub fn clear(&self) {
        self.files.write().clear();
    }
}

impl Default for ObjectFileRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strings::StringPool;

    #[test]
    fn test_insert_and_lookup() {
        let pool = StringPool::new();
        let registry = ObjectFileRegistry::new();

        let mut ancestry = ObjectAncestry::new();
        ancestry.push(pool.empool("a.o"));

        let index = registry.insert(ObjectFileDescriptor {
            ancestry,
            root_path: PathBuf::from("/tmp/a.o"),
            image_offset: 0,
            image_end: 1024,
            arch: Arch::Arm64,
        });
        assert_eq!(index, 0);
        assert_eq!(registry.len(), 1);

        let descriptor = registry.get(0);
        assert_eq!(descriptor.root_path, PathBuf::from("/tmp/a.o"));
        assert_eq!(registry.ancestry(0), ancestry);
    }
}
