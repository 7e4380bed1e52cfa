// Thu Jan 22 2026 - Alex

pub mod archive;
pub mod detect;
pub mod fat;
pub mod macho;

pub use detect::{detect_file, FileDetails, FileFormat};
pub use macho::dwarf_from_object_file;

use crate::dwarf::{Die, DwarfError, ObjectAncestry};
use crate::memory::{MemoryError, Reader};
use crate::registry::DieRegistry;
use crate::strings::StringPool;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FormatError {
    #[error("unknown format: {0}")]
    UnknownFormat(String),
    #[error("memory error: {0}")]
    Memory(#[from] MemoryError),
    #[error("dwarf error: {0}")]
    Dwarf(#[from] DwarfError),
    #[error("mach-o parse error: {0}")]
    Goblin(#[from] goblin::error::Error),
    #[error("missing {0} section in {1}")]
    MissingSection(&'static str, String),
    #[error("malformed archive: {0}")]
    MalformedArchive(String),
}

type RegisterDies = dyn Fn(Vec<Die>) + Send + Sync;
type DoWork = dyn Fn(Box<dyn FnOnce() + Send + 'static>) + Send + Sync;

/// Hooks the envelope readers call back into: registration of finished DIE
/// batches, and task submission for nested members (archive objects, fat
/// slices).
pub struct Callbacks {
    pub register_dies: Arc<RegisterDies>,
    pub do_work: Arc<DoWork>,
}

impl Clone for Callbacks {
    fn clone(&self) -> Self {
        Self {
            register_dies: self.register_dies.clone(),
            do_work: self.do_work.clone(),
        }
    }
}

/// Shared state for one top-level input file and everything nested in it.
pub struct ParseContext {
    pub pool: Arc<StringPool>,
    pub registry: Arc<DieRegistry>,
    /// Filesystem path of the top-level input; nested images are windows
    /// into this file and are re-opened through it.
    pub root_path: PathBuf,
    pub callbacks: Callbacks,
}

impl Clone for ParseContext {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            registry: self.registry.clone(),
            root_path: self.root_path.clone(),
            callbacks: self.callbacks.clone(),
        }
    }
}

/// Detect the container at the reader's position, extend the ancestry with
/// `object_name`, and route to the matching envelope reader. Every route
/// eventually yields byte ranges holding a single Mach-O image for the
/// DWARF parser.
pub fn parse_file(
    object_name: &str,
    ancestry: &ObjectAncestry,
    mut reader: Reader,
    end_pos: usize,
    context: ParseContext,
) -> Result<(), FormatError> {
    let details = detect_file(&mut reader)?;
    let new_ancestry = ancestry.with(context.pool.empool(object_name));

    match details.format {
        FileFormat::Unknown => Err(FormatError::UnknownFormat(object_name.to_string())),
        FileFormat::MachO => macho::read_macho(&context, new_ancestry, reader, end_pos, details),
        FileFormat::Archive => {
            archive::read_archive(&context, new_ancestry, reader, end_pos, details)
        }
        FileFormat::Fat => fat::read_fat(&context, new_ancestry, reader, end_pos, details),
    }
}
