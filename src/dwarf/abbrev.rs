// Tue Jan 20 2026 - Alex

use crate::dwarf::constants::{At, Form, Tag};
use crate::dwarf::DwarfError;
use crate::memory::{sleb128, uleb128, Reader, Whence};
use std::collections::HashMap;

/// One attribute specification inside an abbreviation declaration.
#[derive(Debug, Clone, Copy)]
pub struct AbbrevAttribute {
    pub at: At,
    pub form: Form,
    /// Only present for `DW_FORM_implicit_const`, whose value lives in the
    /// abbreviation itself rather than the debug info stream.
    pub implicit_const: Option<i64>,
}

/// Abbreviation declaration: the shape shared by every DIE stamped from it.
#[derive(Debug, Clone)]
pub struct Abbreviation {
    pub code: u32,
    pub tag: Tag,
    pub has_children: bool,
    pub attributes: Vec<AbbrevAttribute>,
}

/// All abbreviation declarations for one compilation unit, indexed by code.
#[derive(Debug, Default)]
pub struct AbbrevTable {
    entries: HashMap<u32, Abbreviation>,
}

impl AbbrevTable {
    /// Read the declaration series at `offset` of `__debug_abbrev`,
    /// terminated by a zero code.
    pub fn read(reader: &mut Reader, offset: u64) -> Result<Self, DwarfError> {
        reader.seek(offset as i64, Whence::Start)?;

        let mut table = AbbrevTable::default();

        loop {
            let code = uleb128(reader)?;
            if code == 0 {
                break;
            }

            let tag = Tag::from_u32(uleb128(reader)?);
            let has_children = reader.get()? != 0;
            let mut attributes = Vec::new();

            loop {
                let at = uleb128(reader)?;
                let form = uleb128(reader)?;
                if at == 0 && form == 0 {
                    break;
                }
                let form = Form::from_u32(form);
                let implicit_const = if form == Form::ImplicitConst {
                    Some(sleb128(reader)? as i64)
                } else {
                    None
                };
                attributes.push(AbbrevAttribute {
                    at: At::from_u32(at),
                    form,
                    implicit_const,
                });
            }

            table.entries.insert(
                code,
                Abbreviation {
                    code,
                    tag,
                    has_children,
                    attributes,
                },
            );
        }

        Ok(table)
    }

    pub fn get(&self, code: u32) -> Option<&Abbreviation> {
        self.entries.get(&code)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_abbrev_bytes() -> Vec<u8> {
        let mut bytes = Vec::new();
        // code 1: compile_unit, has children, name=string
        bytes.extend_from_slice(&[0x01, 0x11, 0x01, 0x03, 0x08, 0x00, 0x00]);
        // code 2: subprogram, no children, name=string, decl_line=data1
        bytes.extend_from_slice(&[0x02, 0x2e, 0x00, 0x03, 0x08, 0x3b, 0x0b, 0x00, 0x00]);
        // terminator
        bytes.push(0x00);
        bytes
    }

    #[test]
    fn test_read_abbrev_table() {
        let mut reader = Reader::from_vec(sample_abbrev_bytes());
        let table = AbbrevTable::read(&mut reader, 0).unwrap();
        assert_eq!(table.len(), 2);

        let cu = table.get(1).unwrap();
        assert_eq!(cu.tag, Tag::CompileUnit);
        assert!(cu.has_children);
        assert_eq!(cu.attributes.len(), 1);
        assert_eq!(cu.attributes[0].at, At::Name);
        assert_eq!(cu.attributes[0].form, Form::String);

        let sub = table.get(2).unwrap();
        assert_eq!(sub.tag, Tag::Subprogram);
        assert!(!sub.has_children);
        assert_eq!(sub.attributes.len(), 2);
        assert_eq!(sub.attributes[1].at, At::DeclLine);
        assert_eq!(sub.attributes[1].form, Form::Data1);

        assert!(table.get(3).is_none());
    }

    #[test]
    fn test_implicit_const_value_in_abbrev() {
        // code 1: base_type, no children, byte_size=implicit_const(-2)
        let bytes = vec![0x01, 0x24, 0x00, 0x0b, 0x21, 0x7e, 0x00, 0x00, 0x00];
        let mut reader = Reader::from_vec(bytes);
        let table = AbbrevTable::read(&mut reader, 0).unwrap();
        let entry = table.get(1).unwrap();
        assert_eq!(entry.attributes[0].form, Form::ImplicitConst);
        assert_eq!(entry.attributes[0].implicit_const, Some(-2));
    }

    #[test]
    fn test_empty_table() {
        let mut reader = Reader::from_vec(vec![0x00]);
        let table = AbbrevTable::read(&mut reader, 0).unwrap();
        assert!(table.is_empty());
    }
}
