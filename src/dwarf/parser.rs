// Wed Jan 21 2026 - Alex

use crate::dwarf::abbrev::{Abbreviation, AbbrevTable};
use crate::dwarf::attributes::{Attribute, AttributeSequence, AttributeValue};
use crate::dwarf::constants::{nonfatal_attribute, Arch, At, Form, Tag};
use crate::dwarf::die::Die;
use crate::dwarf::DwarfError;
use crate::memory::{sleb128, uleb128, Reader, Whence};
use crate::strings::{PoolString, StringPool};
use crate::utils::hash::hash_combine;
use std::collections::HashMap;
use std::sync::Arc;

const DW_UT_COMPILE: u8 = 0x01;
const MAX_REFERENCE_DEPTH: usize = 8;

/// Attributes resolved eagerly to the referent's name so definitions stay
/// comparable across files.
const RESOLVED_REFERENCES: [At; 3] = [At::Type, At::Specification, At::AbstractOrigin];

/// DWARF section readers for one Mach-O image, each windowed to exactly its
/// section. Optional sections may be absent in the image.
pub struct DwarfSections {
    pub info: Reader,
    pub abbrev: Reader,
    pub strings: Option<Reader>,
    pub str_offsets: Option<Reader>,
}

#[derive(Clone, Copy)]
struct CuHeader {
    cu_offset: u32,
    die_offset: u32,
    unit_end: u32,
    version: u16,
    is_64: bool,
    unit_type: u8,
    address_size: u8,
    abbrev_offset: u64,
    str_offsets_base: u64,
}

struct Frame {
    component: String,
    in_function: bool,
    in_anonymous: bool,
}

/// Recursive-descent DWARF parser for one Mach-O image.
///
/// Walks every compilation unit of `__debug_info`, stamps DIEs out of the
/// (lazily cached) abbreviation tables, builds symbolic paths from a name
/// stack mirroring the DIE tree, and emits one flat batch of DIEs per unit.
/// The parser is lenient: unknown tags and skipped forms flag the DIE rather
/// than fail the file, and a malformed unit aborts only that unit.
pub struct DwarfParser {
    pool: Arc<StringPool>,
    info: Reader,
    abbrev: Reader,
    strings: Option<Reader>,
    str_offsets: Option<Reader>,
    arch: Arch,
    ofd_index: u32,
    abbrev_cache: HashMap<u64, Arc<AbbrevTable>>,
}

impl DwarfParser {
    pub fn new(pool: Arc<StringPool>, sections: DwarfSections, arch: Arch, ofd_index: u32) -> Self {
        Self {
            pool,
            info: sections.info,
            abbrev: sections.abbrev,
            strings: sections.strings,
            str_offsets: sections.str_offsets,
            arch,
            ofd_index,
            abbrev_cache: HashMap::new(),
        }
    }

    /// Walk every compilation unit, handing each unit's DIE batch to `emit`.
    pub fn process_all_dies(
        &mut self,
        emit: &mut dyn FnMut(Vec<Die>),
    ) -> Result<(), DwarfError> {
        self.info.seek(0, Whence::Start)?;

        while self.info.size() > 0 {
            if self.info.size() < 11 {
                log::warn!(
                    "{} trailing byte(s) at end of __debug_info",
                    self.info.size()
                );
                break;
            }

            let header = self.read_cu_header()?;

            if header.version < 2 || header.version > 5 {
                log::error!(
                    "unsupported DWARF version {} in unit at 0x{:08x}",
                    header.version,
                    header.cu_offset
                );
                self.info.seek(header.unit_end as i64, Whence::Start)?;
                continue;
            }

            if header.version >= 5 && header.unit_type != DW_UT_COMPILE {
                log::debug!(
                    "skipping unit of type {:#04x} at 0x{:08x}",
                    header.unit_type,
                    header.cu_offset
                );
                self.info.seek(header.unit_end as i64, Whence::Start)?;
                continue;
            }

            let abbrevs = self.abbrev_table(header.abbrev_offset)?;

            match self.walk_unit(header, &abbrevs) {
                Ok(dies) => emit(dies),
                Err(error) => {
                    // Malformed unit: drop it and move to the next one.
                    log::error!(
                        "aborting unit at 0x{:08x}: {}",
                        header.cu_offset,
                        error
                    );
                }
            }

            self.info.seek(header.unit_end as i64, Whence::Start)?;
        }

        Ok(())
    }

    /// Rematerialize one DIE and its full attribute sequence, given the
    /// offset recorded at registration time. Used when rendering reports.
    pub fn fetch_one_die(
        &mut self,
        debug_info_offset: u32,
    ) -> Result<(Die, AttributeSequence), DwarfError> {
        self.info.seek(0, Whence::Start)?;

        while self.info.size() > 0 {
            let header = self.read_cu_header()?;

            if debug_info_offset >= header.die_offset && debug_info_offset < header.unit_end {
                let abbrevs = self.abbrev_table(header.abbrev_offset)?;
                self.info.seek(debug_info_offset as i64, Whence::Start)?;

                let code = uleb128(&mut self.info)?;
                let abbrev = abbrevs.get(code).ok_or(DwarfError::BadAbbrevCode {
                    code,
                    offset: debug_info_offset,
                })?;

                let mut die = Die::new(abbrev.tag, self.arch, debug_info_offset);
                die.has_children = abbrev.has_children;
                die.ofd_index = self.ofd_index;

                let mut attributes = self.read_die_attributes(&header, abbrev, &mut die)?;
                self.resolve_reference_names(&header, &abbrevs, &mut attributes);
                return Ok((die, attributes));
            }

            self.info.seek(header.unit_end as i64, Whence::Start)?;
        }

        Err(DwarfError::DieNotFound(debug_info_offset))
    }

    fn abbrev_table(&mut self, offset: u64) -> Result<Arc<AbbrevTable>, DwarfError> {
        if let Some(table) = self.abbrev_cache.get(&offset) {
            return Ok(table.clone());
        }
        let table = Arc::new(AbbrevTable::read(&mut self.abbrev, offset)?);
        self.abbrev_cache.insert(offset, table.clone());
        Ok(table)
    }

    fn read_cu_header(&mut self) -> Result<CuHeader, DwarfError> {
        let cu_offset = self.info.tell() as u32;

        let mut length = self.info.read_u32()? as u64;
        let is_64 = length == 0xffff_ffff;
        if is_64 {
            length = self.info.read_u64()?;
        }
        let unit_end = (self.info.tell() as u64 + length) as u32;

        let version = self.info.read_u16()?;

        let (unit_type, address_size, abbrev_offset) = if version >= 5 {
            let unit_type = self.info.get()?;
            let address_size = self.info.get()?;
            let abbrev_offset = self.read_offset(is_64)?;
            (unit_type, address_size, abbrev_offset)
        } else {
            let abbrev_offset = self.read_offset(is_64)?;
            let address_size = self.info.get()?;
            (DW_UT_COMPILE, address_size, abbrev_offset)
        };

        Ok(CuHeader {
            cu_offset,
            die_offset: self.info.tell() as u32,
            unit_end,
            version,
            is_64,
            unit_type,
            address_size,
            abbrev_offset,
            str_offsets_base: if is_64 { 16 } else { 8 },
        })
    }

    fn walk_unit(
        &mut self,
        mut header: CuHeader,
        abbrevs: &AbbrevTable,
    ) -> Result<Vec<Die>, DwarfError> {
        let mut dies: Vec<Die> = Vec::new();
        let mut stack: Vec<Frame> = Vec::new();

        self.info.seek(header.die_offset as i64, Whence::Start)?;

        while (self.info.tell() as u32) < header.unit_end {
            let offset = self.info.tell() as u32;
            let code = uleb128(&mut self.info)?;

            if code == 0 {
                // end of the current sibling list
                stack.pop();
                continue;
            }

            let abbrev = match abbrevs.get(code) {
                Some(a) => a,
                None => return Err(DwarfError::BadAbbrevCode { code, offset }),
            };

            let mut die = Die::new(abbrev.tag, self.arch, offset);
            die.has_children = abbrev.has_children;
            die.ofd_index = self.ofd_index;

            let mut attributes = self.read_die_attributes(&header, abbrev, &mut die)?;
            self.resolve_reference_names(&header, abbrevs, &mut attributes);

            // The CU root carries the string offsets base for the rest of
            // the unit (DWARF 5).
            if dies.is_empty() {
                if let Some(base) = attributes.uint(At::StrOffsetsBase) {
                    header.str_offsets_base = base;
                }
            }

            let name = die_name(&attributes);
            let component = match (die.tag, name) {
                (Tag::CompileUnit, _) | (Tag::PartialUnit, _) => "[u]".to_string(),
                (_, Some(name)) => name.view().to_string(),
                (_, None) => "[u]".to_string(),
            };

            die.path = self.pool.empool(&build_path(&stack, &component));
            die.hash = identity_hash(die.arch, die.tag, die.path);
            die.fatal_attribute_hash = fatal_attribute_hash(&attributes);
            die.skippable = die.skippable || skip_die(&die, &attributes, &stack, name.is_none());

            if abbrev.has_children {
                let in_function = stack.last().map_or(false, |f| f.in_function)
                    || matches!(die.tag, Tag::Subprogram | Tag::InlinedSubroutine);
                let in_anonymous = stack.last().map_or(false, |f| f.in_anonymous)
                    || (name.is_none() && !matches!(die.tag, Tag::CompileUnit | Tag::PartialUnit));
                stack.push(Frame {
                    component,
                    in_function,
                    in_anonymous,
                });
            }

            dies.push(die);
        }

        if self.info.tell() as u32 != header.unit_end {
            log::warn!(
                "extra bytes at end of unit at 0x{:08x} (stopped at 0x{:08x}, unit ends 0x{:08x})",
                header.cu_offset,
                self.info.tell(),
                header.unit_end
            );
        }

        Ok(dies)
    }

    fn read_die_attributes(
        &mut self,
        header: &CuHeader,
        abbrev: &Abbreviation,
        die: &mut Die,
    ) -> Result<AttributeSequence, DwarfError> {
        let mut attributes = AttributeSequence::with_capacity(abbrev.attributes.len());

        for spec in &abbrev.attributes {
            let mut form = spec.form;
            while form == Form::Indirect {
                form = Form::from_u32(uleb128(&mut self.info)?);
            }

            let value = self.read_form_value(header, form, spec.implicit_const)?;

            // A name we had to pass over means the path cannot be built.
            if spec.at == At::Name && value.has_passover() {
                die.skippable = true;
            }

            attributes.push(Attribute::new(spec.at, spec.form, value));
        }

        if matches!(abbrev.tag, Tag::Unknown(_)) {
            die.skippable = true;
        }

        Ok(attributes)
    }

    fn read_form_value(
        &mut self,
        header: &CuHeader,
        form: Form,
        implicit_const: Option<i64>,
    ) -> Result<AttributeValue, DwarfError> {
        let mut value = AttributeValue::default();

        match form {
            Form::Addr => {
                let addr = if header.address_size == 8 {
                    self.info.read_u64()?
                } else {
                    self.info.read_u32()? as u64
                };
                value.set_uint(addr);
            }
            Form::Data1 => value.set_uint(self.info.get()? as u64),
            Form::Data2 => value.set_uint(self.info.read_u16()? as u64),
            Form::Data4 => value.set_uint(self.info.read_u32()? as u64),
            Form::Data8 => value.set_uint(self.info.read_u64()?),
            Form::Data16 => {
                self.info.read_bytes(16)?;
                value = AttributeValue::passover();
            }
            Form::Sdata => value.set_sint(sleb128(&mut self.info)? as i64),
            Form::Udata => value.set_uint(uleb128(&mut self.info)? as u64),
            Form::String => {
                let bytes = self.info.read_c_string()?.to_vec();
                let string = String::from_utf8_lossy(&bytes).into_owned();
                value.set_string(self.pool.empool(&string));
            }
            Form::Strp => {
                let offset = self.read_offset(header.is_64)?;
                match self.read_debug_str(offset)? {
                    Some(string) => value.set_string(string),
                    None => value = AttributeValue::passover(),
                }
            }
            Form::LineStrp | Form::StrpSup => {
                self.read_offset(header.is_64)?;
                value = AttributeValue::passover();
            }
            Form::Flag => value.set_uint(self.info.get()? as u64),
            Form::FlagPresent => value.set_uint(1),
            Form::Ref1 => {
                let offset = self.info.get()? as u32;
                value.set_reference(header.cu_offset + offset);
            }
            Form::Ref2 => {
                let offset = self.info.read_u16()? as u32;
                value.set_reference(header.cu_offset + offset);
            }
            Form::Ref4 => {
                let offset = self.info.read_u32()?;
                value.set_reference(header.cu_offset + offset);
            }
            Form::Ref8 => {
                let offset = self.info.read_u64()? as u32;
                value.set_reference(header.cu_offset + offset);
            }
            Form::RefUdata => {
                let offset = uleb128(&mut self.info)?;
                value.set_reference(header.cu_offset + offset);
            }
            Form::RefAddr => {
                let offset = self.read_offset(header.is_64)?;
                value.set_reference(offset as u32);
            }
            Form::RefSig8 => {
                self.info.read_bytes(8)?;
                value = AttributeValue::passover();
            }
            Form::RefSup4 => {
                self.info.read_bytes(4)?;
                value = AttributeValue::passover();
            }
            Form::RefSup8 => {
                self.info.read_bytes(8)?;
                value = AttributeValue::passover();
            }
            Form::SecOffset => value.set_uint(self.read_offset(header.is_64)?),
            Form::Exprloc | Form::Block => {
                let length = uleb128(&mut self.info)? as usize;
                self.info.read_bytes(length)?;
                value = AttributeValue::passover();
            }
            Form::Block1 => {
                let length = self.info.get()? as usize;
                self.info.read_bytes(length)?;
                value = AttributeValue::passover();
            }
            Form::Block2 => {
                let length = self.info.read_u16()? as usize;
                self.info.read_bytes(length)?;
                value = AttributeValue::passover();
            }
            Form::Block4 => {
                let length = self.info.read_u32()? as usize;
                self.info.read_bytes(length)?;
                value = AttributeValue::passover();
            }
            Form::ImplicitConst => value.set_sint(implicit_const.unwrap_or(0)),
            Form::Strx => {
                let index = uleb128(&mut self.info)? as u64;
                value = self.read_strx(header, index)?;
            }
            Form::Strx1 => {
                let index = self.info.get()? as u64;
                value = self.read_strx(header, index)?;
            }
            Form::Strx2 => {
                let index = self.info.read_u16()? as u64;
                value = self.read_strx(header, index)?;
            }
            Form::Strx3 => {
                let bytes = self.info.read_bytes(3)?;
                let index = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], 0]) as u64;
                value = self.read_strx(header, index)?;
            }
            Form::Strx4 => {
                let index = self.info.read_u32()? as u64;
                value = self.read_strx(header, index)?;
            }
            Form::Addrx | Form::Loclistx | Form::Rnglistx => {
                uleb128(&mut self.info)?;
                value = AttributeValue::passover();
            }
            Form::Addrx1 => {
                self.info.read_bytes(1)?;
                value = AttributeValue::passover();
            }
            Form::Addrx2 => {
                self.info.read_bytes(2)?;
                value = AttributeValue::passover();
            }
            Form::Addrx3 => {
                self.info.read_bytes(3)?;
                value = AttributeValue::passover();
            }
            Form::Addrx4 => {
                self.info.read_bytes(4)?;
                value = AttributeValue::passover();
            }
            Form::Indirect => unreachable!("indirect forms are unwrapped by the caller"),
            Form::Unknown(code) => {
                // No length contract to honor; the unit cannot be decoded
                // past this point.
                return Err(DwarfError::UnknownForm {
                    form: code,
                    offset: self.info.tell() as u32,
                });
            }
        }

        Ok(value)
    }

    fn read_offset(&mut self, is_64: bool) -> Result<u64, DwarfError> {
        Ok(if is_64 {
            self.info.read_u64()?
        } else {
            self.info.read_u32()? as u64
        })
    }

    fn read_debug_str(&mut self, offset: u64) -> Result<Option<PoolString>, DwarfError> {
        let strings = match self.strings.as_mut() {
            Some(strings) => strings,
            None => return Ok(None),
        };
        strings.seek(offset as i64, Whence::Start)?;
        let bytes = strings.read_c_string()?.to_vec();
        let string = String::from_utf8_lossy(&bytes).into_owned();
        Ok(Some(self.pool.empool(&string)))
    }

    fn read_strx(
        &mut self,
        header: &CuHeader,
        index: u64,
    ) -> Result<AttributeValue, DwarfError> {
        let entry_size: u64 = if header.is_64 { 8 } else { 4 };
        let entry_offset = header.str_offsets_base + index * entry_size;

        let str_offset = match self.str_offsets.as_mut() {
            Some(offsets) => {
                offsets.seek(entry_offset as i64, Whence::Start)?;
                if header.is_64 {
                    offsets.read_u64()?
                } else {
                    offsets.read_u32()? as u64
                }
            }
            None => return Ok(AttributeValue::passover()),
        };

        match self.read_debug_str(str_offset)? {
            Some(string) => {
                let mut value = AttributeValue::default();
                value.set_string(string);
                Ok(value)
            }
            None => Ok(AttributeValue::passover()),
        }
    }

    /// Attach referent names to reference attributes where the referent
    /// lives in the same unit. Cross-unit references are kept as bare
    /// offsets.
    fn resolve_reference_names(
        &mut self,
        header: &CuHeader,
        abbrevs: &AbbrevTable,
        attributes: &mut AttributeSequence,
    ) {
        let targets: Vec<(usize, u32)> = attributes
            .iter()
            .enumerate()
            .filter(|(_, a)| {
                RESOLVED_REFERENCES.contains(&a.at)
                    && a.value.has_reference()
                    && !a.value.has_string()
            })
            .map(|(i, a)| (i, a.value.reference()))
            .collect();

        for (index, target) in targets {
            if target < header.cu_offset || target >= header.unit_end {
                continue;
            }
            if let Some(name) = self.referent_name(header, abbrevs, target, 0) {
                if let Some(attribute) = attributes.get_mut(index) {
                    attribute.value.set_string(name);
                }
            }
        }
    }

    fn referent_name(
        &mut self,
        header: &CuHeader,
        abbrevs: &AbbrevTable,
        offset: u32,
        depth: usize,
    ) -> Option<PoolString> {
        if depth > MAX_REFERENCE_DEPTH {
            return None;
        }

        let saved = self.info.tell();
        let result = self.scan_referent(header, abbrevs, offset, depth);
        // Position is restored on every exit, including decode failure.
        let _ = self.info.seek(saved as i64, Whence::Start);
        result
    }

    fn scan_referent(
        &mut self,
        header: &CuHeader,
        abbrevs: &AbbrevTable,
        offset: u32,
        depth: usize,
    ) -> Option<PoolString> {
        self.info.seek(offset as i64, Whence::Start).ok()?;

        let code = uleb128(&mut self.info).ok()?;
        if code == 0 {
            return None;
        }
        let abbrev = abbrevs.get(code)?;

        let mut forwarded: Option<u32> = None;
        let mut name: Option<PoolString> = None;

        for spec in &abbrev.attributes {
            let mut form = spec.form;
            while form == Form::Indirect {
                form = Form::from_u32(uleb128(&mut self.info).ok()?);
            }
            let value = self.read_form_value(header, form, spec.implicit_const).ok()?;

            match spec.at {
                At::Name | At::LinkageName | At::MipsLinkageName => {
                    if value.has_string() && name.is_none() {
                        name = Some(value.string());
                    }
                }
                at if RESOLVED_REFERENCES.contains(&at) => {
                    if value.has_reference() && forwarded.is_none() {
                        forwarded = Some(value.reference());
                    }
                }
                _ => {}
            }
        }

        if name.is_some() {
            return name;
        }

        // Nameless intermediary (typedef chains, cv-qualified wrappers):
        // chase its own type reference.
        let target = forwarded?;
        if target < header.cu_offset || target >= header.unit_end {
            return None;
        }
        self.referent_name(header, abbrevs, target, depth + 1)
    }
}

fn die_name(attributes: &AttributeSequence) -> Option<PoolString> {
    attributes
        .string(At::Name)
        .or_else(|| attributes.string(At::LinkageName))
        .or_else(|| attributes.string(At::MipsLinkageName))
}

fn build_path(stack: &[Frame], component: &str) -> String {
    let mut path = String::with_capacity(
        2 + stack.iter().map(|f| f.component.len() + 2).sum::<usize>() + component.len(),
    );
    for frame in stack {
        path.push_str("::");
        path.push_str(&frame.component);
    }
    path.push_str("::");
    path.push_str(component);
    path
}

/// Identity hash: architecture, tag, and fully qualified symbolic path.
pub fn identity_hash(arch: Arch, tag: Tag, path: PoolString) -> u64 {
    let mut hash = hash_combine(0, arch.code());
    hash = hash_combine(hash, tag.code() as u64);
    hash_combine(hash, path.hash())
}

/// Content hash over the attributes whose disagreement is an ODR violation.
/// File-scoped offsets never enter the hash: references contribute their
/// resolved name hash or nothing at all.
pub fn fatal_attribute_hash(attributes: &AttributeSequence) -> u64 {
    let mut hash = 0u64;
    for attribute in attributes {
        if nonfatal_attribute(attribute.at) {
            continue;
        }
        hash = hash_combine(hash, attribute.at.code() as u64);
        if let Some(value_hash) = attribute.value.fatal_hash() {
            hash = hash_combine(hash, value_hash);
        }
    }
    hash
}

/// DIEs that never describe an external-linkage definition. These still
/// count as processed, but are not registered for ODR enforcement.
fn skip_die(die: &Die, attributes: &AttributeSequence, stack: &[Frame], anonymous: bool) -> bool {
    match die.tag {
        Tag::CompileUnit | Tag::PartialUnit | Tag::TypeUnit | Tag::SkeletonUnit => return true,
        Tag::FormalParameter
        | Tag::UnspecifiedParameters
        | Tag::TemplateTypeParameter
        | Tag::TemplateValueParameter
        | Tag::LexicalBlock
        | Tag::Label
        | Tag::InlinedSubroutine
        | Tag::CallSite
        | Tag::CallSiteParameter
        | Tag::GnuCallSite
        | Tag::GnuCallSiteParameter
        | Tag::Variant
        | Tag::VariantPart => return true,
        Tag::Unknown(_) => return true,
        _ => {}
    }

    // Entities inside a function body have no linkage.
    if stack.last().map_or(false, |f| f.in_function) {
        return true;
    }

    // Members of anonymous namespaces have internal linkage; the one
    // definition rule does not apply across translation units.
    if stack.last().map_or(false, |f| f.in_anonymous) {
        return true;
    }

    // A declaration is not a definition.
    if attributes.uint(At::Declaration).unwrap_or(0) != 0 {
        return true;
    }

    // Anonymous leaves carry no identity of their own.
    if anonymous && !die.has_children {
        return true;
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds one DWARF 4 compilation unit for `__debug_info`.
    struct UnitBuilder {
        bytes: Vec<u8>,
    }

    impl UnitBuilder {
        fn new() -> Self {
            let mut bytes = Vec::new();
            bytes.extend_from_slice(&[0, 0, 0, 0]); // length, patched in finish()
            bytes.extend_from_slice(&4u16.to_le_bytes()); // version
            bytes.extend_from_slice(&0u32.to_le_bytes()); // abbrev offset
            bytes.push(8); // address size
            Self { bytes }
        }

        fn pos(&self) -> u32 {
            self.bytes.len() as u32
        }

        fn uleb(&mut self, mut value: u32) -> &mut Self {
            loop {
                let mut byte = (value & 0x7f) as u8;
                value >>= 7;
                if value != 0 {
                    byte |= 0x80;
                }
                self.bytes.push(byte);
                if value == 0 {
                    return self;
                }
            }
        }

        fn u8(&mut self, value: u8) -> &mut Self {
            self.bytes.push(value);
            self
        }

        fn cstr(&mut self, value: &str) -> &mut Self {
            self.bytes.extend_from_slice(value.as_bytes());
            self.bytes.push(0);
            self
        }

        fn reserve_u32(&mut self) -> usize {
            let at = self.bytes.len();
            self.bytes.extend_from_slice(&[0, 0, 0, 0]);
            at
        }

        fn patch_u32(&mut self, at: usize, value: u32) {
            self.bytes[at..at + 4].copy_from_slice(&value.to_le_bytes());
        }

        fn finish(mut self) -> Vec<u8> {
            let length = (self.bytes.len() - 4) as u32;
            self.bytes[0..4].copy_from_slice(&length.to_le_bytes());
            self.bytes
        }
    }

    /// Abbrev table shared by the fixtures:
    ///   1 compile_unit (children): name=string
    ///   2 namespace (children): name=string
    ///   3 subprogram: name=string, external=flag_present, type=ref4,
    ///     decl_line=data1
    ///   4 base_type: name=string, byte_size=data1, encoding=data1
    ///   5 subprogram (children): name=string
    ///   6 formal_parameter: type=ref4
    ///   7 variable: name=string, declaration=flag
    fn test_abbrevs() -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&[0x01, 0x11, 0x01, 0x03, 0x08, 0x00, 0x00]);
        bytes.extend_from_slice(&[0x02, 0x39, 0x01, 0x03, 0x08, 0x00, 0x00]);
        bytes.extend_from_slice(&[
            0x03, 0x2e, 0x00, 0x03, 0x08, 0x3f, 0x19, 0x49, 0x13, 0x3b, 0x0b, 0x00, 0x00,
        ]);
        bytes.extend_from_slice(&[
            0x04, 0x24, 0x00, 0x03, 0x08, 0x0b, 0x0b, 0x3e, 0x0b, 0x00, 0x00,
        ]);
        bytes.extend_from_slice(&[0x05, 0x2e, 0x01, 0x03, 0x08, 0x00, 0x00]);
        bytes.extend_from_slice(&[0x06, 0x05, 0x00, 0x49, 0x13, 0x00, 0x00]);
        bytes.extend_from_slice(&[0x07, 0x34, 0x00, 0x03, 0x08, 0x3c, 0x0c, 0x00, 0x00]);
        bytes.push(0x00);
        bytes
    }

    /// `namespace N { int foo(int); }` style unit; the subprogram's type
    /// points at the trailing base type.
    fn unit_with_foo(type_name: &str, type_size: u8, decl_line: u8) -> Vec<u8> {
        let mut b = UnitBuilder::new();
        b.uleb(1).cstr("test.cpp");
        b.uleb(2).cstr("N");
        b.uleb(3).cstr("foo");
        let type_ref = b.reserve_u32();
        b.u8(decl_line);
        b.u8(0); // end of N's children
        let base_type = b.pos();
        b.uleb(4).cstr(type_name).u8(type_size).u8(5);
        b.u8(0); // end of the unit's children
        b.patch_u32(type_ref, base_type);
        b.finish()
    }

    fn parse(info: Vec<u8>, abbrev: Vec<u8>) -> Vec<Vec<Die>> {
        let pool = Arc::new(StringPool::new());
        let sections = DwarfSections {
            info: Reader::from_vec(info),
            abbrev: Reader::from_vec(abbrev),
            strings: None,
            str_offsets: None,
        };
        let mut parser = DwarfParser::new(pool, sections, Arch::Arm64, 0);
        let mut batches = Vec::new();
        parser
            .process_all_dies(&mut |dies| batches.push(dies))
            .unwrap();
        batches
    }

    fn find<'a>(dies: &'a [Die], path: &str) -> &'a Die {
        dies.iter()
            .find(|d| d.path.view() == path)
            .unwrap_or_else(|| panic!("no die at path {}", path))
    }

    #[test]
    fn test_paths_and_batching() {
        let batches = parse(unit_with_foo("int", 4, 7), test_abbrevs());
        assert_eq!(batches.len(), 1);
        let dies = &batches[0];
        assert_eq!(dies.len(), 4);

        assert_eq!(dies[0].path.view(), "::[u]");
        assert_eq!(dies[0].tag, Tag::CompileUnit);
        assert!(dies[0].skippable);

        let ns = find(dies, "::[u]::N");
        assert_eq!(ns.tag, Tag::Namespace);
        assert!(!ns.skippable);

        let foo = find(dies, "::[u]::N::foo");
        assert_eq!(foo.tag, Tag::Subprogram);
        assert!(!foo.skippable);
        assert!(foo.hash != 0);

        let int = find(dies, "::[u]::int");
        assert_eq!(int.tag, Tag::BaseType);
    }

    #[test]
    fn test_identity_hash_stable_across_parses() {
        let a = parse(unit_with_foo("int", 4, 7), test_abbrevs());
        let b = parse(unit_with_foo("int", 4, 7), test_abbrevs());
        let foo_a = find(&a[0], "::[u]::N::foo");
        let foo_b = find(&b[0], "::[u]::N::foo");
        assert_eq!(foo_a.hash, foo_b.hash);
        assert_eq!(foo_a.fatal_attribute_hash, foo_b.fatal_attribute_hash);
    }

    #[test]
    fn test_decl_line_is_nonfatal() {
        let a = parse(unit_with_foo("int", 4, 7), test_abbrevs());
        let b = parse(unit_with_foo("int", 4, 99), test_abbrevs());
        let foo_a = find(&a[0], "::[u]::N::foo");
        let foo_b = find(&b[0], "::[u]::N::foo");
        assert_eq!(foo_a.hash, foo_b.hash);
        assert_eq!(foo_a.fatal_attribute_hash, foo_b.fatal_attribute_hash);
    }

    #[test]
    fn test_return_type_drift_changes_fatal_hash() {
        let a = parse(unit_with_foo("int", 4, 7), test_abbrevs());
        let b = parse(unit_with_foo("long", 8, 7), test_abbrevs());
        let foo_a = find(&a[0], "::[u]::N::foo");
        let foo_b = find(&b[0], "::[u]::N::foo");
        assert_eq!(foo_a.hash, foo_b.hash);
        assert_ne!(foo_a.fatal_attribute_hash, foo_b.fatal_attribute_hash);
    }

    #[test]
    fn test_function_locals_are_skippable() {
        let mut b = UnitBuilder::new();
        b.uleb(1).cstr("test.cpp");
        b.uleb(5).cstr("foo"); // subprogram with children
        b.uleb(6); // formal_parameter
        let param_type = b.reserve_u32();
        b.u8(0); // end of foo's children
        let base_type = b.pos();
        b.uleb(4).cstr("int").u8(4).u8(5);
        b.u8(0); // end of unit
        b.patch_u32(param_type, base_type);

        let batches = parse(b.finish(), test_abbrevs());
        let dies = &batches[0];
        let param = dies
            .iter()
            .find(|d| d.tag == Tag::FormalParameter)
            .expect("parameter die present");
        assert!(param.skippable);
        // the subprogram itself is at namespace scope and registers
        let foo = find(dies, "::[u]::foo");
        assert!(!foo.skippable);
    }

    #[test]
    fn test_declarations_are_skippable() {
        let mut b = UnitBuilder::new();
        b.uleb(1).cstr("test.cpp");
        b.uleb(7).cstr("extern_var").u8(1); // declaration flag set
        b.uleb(7).cstr("defined_var").u8(0);
        b.u8(0); // end of unit
        let batches = parse(b.finish(), test_abbrevs());
        let dies = &batches[0];
        assert!(find(dies, "::[u]::extern_var").skippable);
        assert!(!find(dies, "::[u]::defined_var").skippable);
    }

    #[test]
    fn test_two_units_two_batches() {
        let mut info = unit_with_foo("int", 4, 7);
        info.extend(unit_with_foo("int", 4, 7));
        let batches = parse(info, test_abbrevs());
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].len(), 4);
        assert_eq!(batches[1].len(), 4);
    }

    #[test]
    fn test_unknown_form_aborts_unit_only() {
        // single abbrev using reserved form 0x7f
        let abbrev = vec![0x01, 0x11, 0x00, 0x03, 0x7f, 0x00, 0x00, 0x00];
        let mut b = UnitBuilder::new();
        b.uleb(1).u8(0xaa);
        let mut info = b.finish();
        info.extend(unit_with_foo("int", 4, 7));

        let pool = Arc::new(StringPool::new());
        let mut full_abbrev = abbrev;
        let shared_offset = full_abbrev.len() as u64;
        full_abbrev.extend(test_abbrevs());

        // second unit points at the shared table
        let len = info.len();
        let second_start = len - unit_with_foo("int", 4, 7).len();
        info[second_start + 6..second_start + 10]
            .copy_from_slice(&(shared_offset as u32).to_le_bytes());

        let sections = DwarfSections {
            info: Reader::from_vec(info),
            abbrev: Reader::from_vec(full_abbrev),
            strings: None,
            str_offsets: None,
        };
        let mut parser = DwarfParser::new(pool, sections, Arch::Arm64, 0);
        let mut batches = Vec::new();
        parser
            .process_all_dies(&mut |dies| batches.push(dies))
            .unwrap();

        // first unit dropped, second survives
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 4);
    }

    #[test]
    fn test_fetch_one_die_rematerializes_attributes() {
        let info = unit_with_foo("int", 4, 42);
        let pool = Arc::new(StringPool::new());
        let sections = DwarfSections {
            info: Reader::from_vec(info.clone()),
            abbrev: Reader::from_vec(test_abbrevs()),
            strings: None,
            str_offsets: None,
        };
        let mut parser = DwarfParser::new(pool.clone(), sections, Arch::Arm64, 0);
        let mut batches = Vec::new();
        parser
            .process_all_dies(&mut |dies| batches.push(dies))
            .unwrap();
        let foo = find(&batches[0], "::[u]::N::foo");

        let (die, attributes) = parser.fetch_one_die(foo.debug_info_offset).unwrap();
        assert_eq!(die.tag, foo.tag);
        assert_eq!(die.arch, foo.arch);
        assert_eq!(die.has_children, foo.has_children);
        assert_eq!(die.debug_info_offset, foo.debug_info_offset);

        assert_eq!(attributes.string(At::Name).unwrap().view(), "foo");
        assert_eq!(attributes.uint(At::DeclLine), Some(42));
        assert_eq!(attributes.uint(At::External), Some(1));
        let type_attr = attributes.find(At::Type).unwrap();
        assert!(type_attr.has_reference());
        assert_eq!(type_attr.string().view(), "int");
    }

    #[test]
    fn test_dwarf5_header_layout() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&[0, 0, 0, 0]); // length
        bytes.extend_from_slice(&5u16.to_le_bytes()); // version
        bytes.push(0x01); // DW_UT_compile
        bytes.push(8); // address size
        bytes.extend_from_slice(&0u32.to_le_bytes()); // abbrev offset
        bytes.push(0x01); // compile_unit
        bytes.extend_from_slice(b"v5.cpp\0");
        bytes.push(0x00); // terminator
        let length = (bytes.len() - 4) as u32;
        bytes[0..4].copy_from_slice(&length.to_le_bytes());

        let batches = parse(bytes, test_abbrevs());
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0][0].path.view(), "::[u]");
        assert_eq!(batches[0][0].tag, Tag::CompileUnit);
    }

    #[test]
    fn test_empty_unit_emits_empty_batch() {
        let b = UnitBuilder::new();
        let batches = parse(b.finish(), test_abbrevs());
        assert_eq!(batches.len(), 1);
        assert!(batches[0].is_empty());
    }
}
