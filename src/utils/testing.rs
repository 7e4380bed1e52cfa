// Fri Jan 23 2026 - Alex
//
// Fixture builders for tests: hand-assembled Mach-O objects, fat bundles,
// archives, and DWARF section payloads small enough to reason about byte by
// byte.

use std::path::PathBuf;

pub const CPU_TYPE_X86_64: u32 = 0x0100_0007;
pub const CPU_TYPE_ARM64: u32 = 0x0100_000c;

const MH_MAGIC_64: u32 = 0xfeedfacf;
const MH_OBJECT: u32 = 0x1;
const LC_SEGMENT_64: u32 = 0x19;

fn padded_name(name: &str) -> [u8; 16] {
    let mut out = [0u8; 16];
    out[..name.len()].copy_from_slice(name.as_bytes());
    out
}

fn section_64(sectname: &str, size: u64, offset: u32) -> Vec<u8> {
    let mut out = Vec::with_capacity(80);
    out.extend_from_slice(&padded_name(sectname));
    out.extend_from_slice(&padded_name("__DWARF"));
    out.extend_from_slice(&(offset as u64).to_le_bytes()); // addr
    out.extend_from_slice(&size.to_le_bytes());
    out.extend_from_slice(&offset.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes()); // align
    out.extend_from_slice(&0u32.to_le_bytes()); // reloff
    out.extend_from_slice(&0u32.to_le_bytes()); // nreloc
    out.extend_from_slice(&0u32.to_le_bytes()); // flags
    out.extend_from_slice(&[0u8; 12]); // reserved1..3
    out
}

/// A minimal 64-bit Mach-O object holding only a `__DWARF` segment with
/// `__debug_abbrev`, `__debug_info`, and `__debug_str`.
pub fn macho_object(cputype: u32, abbrev: &[u8], info: &[u8], strings: &[u8]) -> Vec<u8> {
    let sizeofcmds: u32 = 72 + 80 * 3;
    let data_start: u32 = 32 + sizeofcmds;
    let total_size = (abbrev.len() + info.len() + strings.len()) as u64;

    let mut out = Vec::new();

    // mach_header_64
    out.extend_from_slice(&MH_MAGIC_64.to_le_bytes());
    out.extend_from_slice(&cputype.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes()); // cpusubtype
    out.extend_from_slice(&MH_OBJECT.to_le_bytes());
    out.extend_from_slice(&1u32.to_le_bytes()); // ncmds
    out.extend_from_slice(&sizeofcmds.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes()); // flags
    out.extend_from_slice(&0u32.to_le_bytes()); // reserved

    // segment_command_64
    out.extend_from_slice(&LC_SEGMENT_64.to_le_bytes());
    out.extend_from_slice(&sizeofcmds.to_le_bytes()); // cmdsize
    out.extend_from_slice(&padded_name("__DWARF"));
    out.extend_from_slice(&0u64.to_le_bytes()); // vmaddr
    out.extend_from_slice(&total_size.to_le_bytes()); // vmsize
    out.extend_from_slice(&(data_start as u64).to_le_bytes()); // fileoff
    out.extend_from_slice(&total_size.to_le_bytes()); // filesize
    out.extend_from_slice(&7i32.to_le_bytes()); // maxprot
    out.extend_from_slice(&3i32.to_le_bytes()); // initprot
    out.extend_from_slice(&3u32.to_le_bytes()); // nsects
    out.extend_from_slice(&0u32.to_le_bytes()); // flags

    let abbrev_offset = data_start;
    let info_offset = abbrev_offset + abbrev.len() as u32;
    let str_offset = info_offset + info.len() as u32;
    out.extend_from_slice(&section_64("__debug_abbrev", abbrev.len() as u64, abbrev_offset));
    out.extend_from_slice(&section_64("__debug_info", info.len() as u64, info_offset));
    out.extend_from_slice(&section_64("__debug_str", strings.len() as u64, str_offset));

    out.extend_from_slice(abbrev);
    out.extend_from_slice(info);
    out.extend_from_slice(strings);
    out
}

/// A fat/universal bundle over complete image slices.
pub fn fat_bundle(slices: &[(u32, Vec<u8>)]) -> Vec<u8> {
    const FAT_MAGIC: u32 = 0xcafebabe;
    let header_len = 8 + 20 * slices.len();

    let mut out = Vec::new();
    out.extend_from_slice(&FAT_MAGIC.to_be_bytes());
    out.extend_from_slice(&(slices.len() as u32).to_be_bytes());

    let mut offset = header_len as u32;
    for (cputype, slice) in slices {
        out.extend_from_slice(&cputype.to_be_bytes());
        out.extend_from_slice(&0u32.to_be_bytes()); // cpusubtype
        out.extend_from_slice(&offset.to_be_bytes());
        out.extend_from_slice(&(slice.len() as u32).to_be_bytes());
        out.extend_from_slice(&0u32.to_be_bytes()); // align
        offset += slice.len() as u32;
    }
    for (_, slice) in slices {
        out.extend_from_slice(slice);
    }
    out
}

/// A Unix archive over named members.
pub fn archive(members: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(b"!<arch>\n");
    for (name, data) in members {
        let mut header = Vec::with_capacity(60);
        header.extend_from_slice(format!("{:<16}", name).as_bytes());
        header.extend_from_slice(format!("{:<12}", 0).as_bytes()); // mtime
        header.extend_from_slice(format!("{:<6}", 0).as_bytes()); // uid
        header.extend_from_slice(format!("{:<6}", 0).as_bytes()); // gid
        header.extend_from_slice(format!("{:<8}", "100644").as_bytes()); // mode
        header.extend_from_slice(format!("{:<10}", data.len()).as_bytes());
        header.extend_from_slice(b"`\n");
        assert_eq!(header.len(), 60);
        out.extend_from_slice(&header);
        out.extend_from_slice(data);
        if data.len() % 2 == 1 {
            out.push(b'\n');
        }
    }
    out
}

/// Shared abbreviation table for the DWARF fixtures:
///   1 compile_unit (children): name=string
///   2 namespace (children): name=string
///   3 subprogram: name=string, external=flag_present, type=ref4,
///     decl_line=data1
///   4 base_type: name=string, byte_size=data1, encoding=data1
pub fn fixture_abbrevs() -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&[0x01, 0x11, 0x01, 0x03, 0x08, 0x00, 0x00]);
    bytes.extend_from_slice(&[0x02, 0x39, 0x01, 0x03, 0x08, 0x00, 0x00]);
    bytes.extend_from_slice(&[
        0x03, 0x2e, 0x00, 0x03, 0x08, 0x3f, 0x19, 0x49, 0x13, 0x3b, 0x0b, 0x00, 0x00,
    ]);
    bytes.extend_from_slice(&[
        0x04, 0x24, 0x00, 0x03, 0x08, 0x0b, 0x0b, 0x3e, 0x0b, 0x00, 0x00,
    ]);
    bytes.push(0x00);
    bytes
}

/// A `namespace N { <ret> foo(); }` unit: the subprogram's return type
/// points at the trailing base type.
pub fn fixture_unit(return_type: &str, type_size: u8, decl_line: u8) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&[0, 0, 0, 0]); // length, patched below
    bytes.extend_from_slice(&4u16.to_le_bytes()); // version
    bytes.extend_from_slice(&0u32.to_le_bytes()); // abbrev offset
    bytes.push(8); // address size

    bytes.push(0x01); // compile_unit
    bytes.extend_from_slice(b"test.cpp\0");
    bytes.push(0x02); // namespace
    bytes.extend_from_slice(b"N\0");
    bytes.push(0x03); // subprogram
    bytes.extend_from_slice(b"foo\0");
    let type_ref_at = bytes.len();
    bytes.extend_from_slice(&[0, 0, 0, 0]); // type ref, patched below
    bytes.push(decl_line);
    bytes.push(0x00); // end of N
    let base_type_offset = bytes.len() as u32;
    bytes.push(0x04); // base_type
    bytes.extend_from_slice(return_type.as_bytes());
    bytes.push(0);
    bytes.push(type_size);
    bytes.push(5); // encoding: signed
    bytes.push(0x00); // end of unit

    bytes[type_ref_at..type_ref_at + 4].copy_from_slice(&base_type_offset.to_le_bytes());
    let length = (bytes.len() - 4) as u32;
    bytes[0..4].copy_from_slice(&length.to_le_bytes());
    bytes
}

/// An object file compiled from the fixture unit.
pub fn fixture_object(cputype: u32, return_type: &str, type_size: u8, decl_line: u8) -> Vec<u8> {
    macho_object(
        cputype,
        &fixture_abbrevs(),
        &fixture_unit(return_type, type_size, decl_line),
        &[],
    )
}

/// Abbrevs for the struct fixture:
///   1 compile_unit (children): name=string
///   2 structure_type (children): name=string, byte_size=data1
///   3 member: name=string, type=ref4, data_member_location=data1
///   4 base_type: name=string, byte_size=data1, encoding=data1
pub fn struct_abbrevs() -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&[0x01, 0x11, 0x01, 0x03, 0x08, 0x00, 0x00]);
    bytes.extend_from_slice(&[0x02, 0x13, 0x01, 0x03, 0x08, 0x0b, 0x0b, 0x00, 0x00]);
    bytes.extend_from_slice(&[
        0x03, 0x0d, 0x00, 0x03, 0x08, 0x49, 0x13, 0x38, 0x0b, 0x00, 0x00,
    ]);
    bytes.extend_from_slice(&[
        0x04, 0x24, 0x00, 0x03, 0x08, 0x0b, 0x0b, 0x3e, 0x0b, 0x00, 0x00,
    ]);
    bytes.push(0x00);
    bytes
}

/// A `struct S { int x; [int y;] }` unit with the given member names.
pub fn struct_unit(members: &[&str]) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&[0, 0, 0, 0]);
    bytes.extend_from_slice(&4u16.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.push(8);

    bytes.push(0x01); // compile_unit
    bytes.extend_from_slice(b"test.cpp\0");
    bytes.push(0x02); // structure_type S
    bytes.extend_from_slice(b"S\0");
    bytes.push(4 * members.len() as u8); // byte_size
    let mut type_refs = Vec::new();
    for (index, member) in members.iter().enumerate() {
        bytes.push(0x03); // member
        bytes.extend_from_slice(member.as_bytes());
        bytes.push(0);
        type_refs.push(bytes.len());
        bytes.extend_from_slice(&[0, 0, 0, 0]); // type ref, patched below
        bytes.push(4 * index as u8); // data_member_location
    }
    bytes.push(0x00); // end of S's children
    let base_type_offset = bytes.len() as u32;
    bytes.push(0x04); // base_type int
    bytes.extend_from_slice(b"int\0");
    bytes.push(4);
    bytes.push(5);
    bytes.push(0x00); // end of unit

    for at in type_refs {
        bytes[at..at + 4].copy_from_slice(&base_type_offset.to_le_bytes());
    }
    let length = (bytes.len() - 4) as u32;
    bytes[0..4].copy_from_slice(&length.to_le_bytes());
    bytes
}

/// An object file holding the struct fixture.
pub fn struct_object(cputype: u32, members: &[&str]) -> Vec<u8> {
    macho_object(cputype, &struct_abbrevs(), &struct_unit(members), &[])
}

/// Write fixture bytes under a per-test temp directory and return the path.
pub fn write_temp_file(test_tag: &str, name: &str, bytes: &[u8]) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("odr-checker-{}", test_tag));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    let path = dir.join(name);
    std::fs::write(&path, bytes).expect("write fixture");
    path
}
