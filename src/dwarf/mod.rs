// Tue Jan 20 2026 - Alex

pub mod abbrev;
pub mod attributes;
pub mod constants;
pub mod die;
pub mod parser;

pub use abbrev::{AbbrevTable, Abbreviation};
pub use attributes::{Attribute, AttributeSequence, AttributeValue};
pub use constants::{nonfatal_attribute, Arch, At, Form, Tag};
pub use die::{Die, DieRef, ObjectAncestry};
pub use parser::{fatal_attribute_hash, identity_hash, DwarfParser, DwarfSections};

use crate::memory::MemoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DwarfError {
    #[error("memory error: {0}")]
    Memory(#[from] MemoryError),
    #[error("no abbreviation declared for code {code} (die at 0x{offset:08x})")]
    BadAbbrevCode { code: u32, offset: u32 },
    #[error("unknown form {form:#06x} at 0x{offset:08x}")]
    UnknownForm { form: u16, offset: u32 },
    #[error("no die found at offset 0x{0:08x}")]
    DieNotFound(u32),
}
