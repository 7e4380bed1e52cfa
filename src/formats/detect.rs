// Thu Jan 22 2026 - Alex

use crate::dwarf::Arch;
use crate::memory::{temp_seek, MemoryError, Reader, Whence};

pub const MH_MAGIC: u32 = 0xfeedface;
pub const MH_CIGAM: u32 = 0xcefaedfe;
pub const MH_MAGIC_64: u32 = 0xfeedfacf;
pub const MH_CIGAM_64: u32 = 0xcffaedfe;

pub const FAT_MAGIC: u32 = 0xcafebabe;
pub const FAT_CIGAM: u32 = 0xbebafeca;
pub const FAT_MAGIC_64: u32 = 0xcafebabf;
pub const FAT_CIGAM_64: u32 = 0xbfbafeca;

pub const AR_MAGIC: &[u8; 4] = b"!<ar";
pub const AR_CIGAM: &[u8; 4] = b"ra<!";

const CPU_ARCH_ABI64: u32 = 0x0100_0000;
const CPU_ARCH_ABI64_32: u32 = 0x0200_0000;
const CPU_TYPE_X86: u32 = 7;
const CPU_TYPE_X86_64: u32 = CPU_TYPE_X86 | CPU_ARCH_ABI64;
const CPU_TYPE_ARM: u32 = 12;
const CPU_TYPE_ARM64: u32 = CPU_TYPE_ARM | CPU_ARCH_ABI64;
const CPU_TYPE_ARM64_32: u32 = CPU_TYPE_ARM | CPU_ARCH_ABI64_32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Unknown,
    MachO,
    Archive,
    Fat,
}

#[derive(Debug, Clone, Copy)]
pub struct FileDetails {
    pub offset: usize,
    pub format: FileFormat,
    pub arch: Arch,
    pub is_64_bit: bool,
    pub needs_byteswap: bool,
}

pub fn cputype_to_arch(cputype: u32) -> Arch {
    match cputype {
        CPU_TYPE_X86 => Arch::X86,
        CPU_TYPE_X86_64 => Arch::X86_64,
        CPU_TYPE_ARM => Arch::Arm,
        CPU_TYPE_ARM64 => Arch::Arm64,
        CPU_TYPE_ARM64_32 => {
            // arm64_32 deliberately reuses the arm64 tag so the two collide
            // on identity hash; see the object ancestry for the real slice.
            log::debug!("treating arm64_32 cputype as arm64");
            Arch::Arm64
        }
        other => {
            log::warn!("unknown Mach-O cputype {:#010x}", other);
            Arch::Unknown
        }
    }
}

/// Peek the leading magic (plus the cputype for Mach-O) and classify the
/// input without moving the read position.
pub fn detect_file(reader: &mut Reader) -> Result<FileDetails, MemoryError> {
    temp_seek(reader, 0, Whence::Current, |reader| {
        let offset = reader.tell();
        let bytes = reader.read_bytes(4)?;
        let raw: [u8; 4] = [bytes[0], bytes[1], bytes[2], bytes[3]];
        let magic = u32::from_le_bytes(raw);

        let mut details = FileDetails {
            offset,
            format: FileFormat::Unknown,
            arch: Arch::Unknown,
            is_64_bit: false,
            needs_byteswap: false,
        };

        details.format = match magic {
            MH_MAGIC | MH_CIGAM | MH_MAGIC_64 | MH_CIGAM_64 => FileFormat::MachO,
            FAT_MAGIC | FAT_CIGAM | FAT_MAGIC_64 | FAT_CIGAM_64 => FileFormat::Fat,
            _ if &raw == AR_MAGIC || &raw == AR_CIGAM => FileFormat::Archive,
            _ => FileFormat::Unknown,
        };

        details.is_64_bit = matches!(magic, MH_MAGIC_64 | MH_CIGAM_64 | FAT_MAGIC_64 | FAT_CIGAM_64);

        // CIGAM variants (and the fat magic, which is stored big-endian)
        // read back byteswapped on a little-endian host.
        details.needs_byteswap = matches!(magic, MH_CIGAM | MH_CIGAM_64 | FAT_CIGAM | FAT_CIGAM_64)
            || &raw == AR_CIGAM;

        if details.format == FileFormat::MachO {
            let mut cputype = reader.read_u32()?;
            if details.needs_byteswap {
                cputype = cputype.swap_bytes();
            }
            details.arch = cputype_to_arch(cputype);
        }

        Ok(details)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect(bytes: Vec<u8>) -> FileDetails {
        let mut reader = Reader::from_vec(bytes);
        detect_file(&mut reader).unwrap()
    }

    #[test]
    fn test_detect_macho_64() {
        let mut bytes = MH_MAGIC_64.to_le_bytes().to_vec();
        bytes.extend_from_slice(&CPU_TYPE_ARM64.to_le_bytes());
        let details = detect(bytes);
        assert_eq!(details.format, FileFormat::MachO);
        assert_eq!(details.arch, Arch::Arm64);
        assert!(details.is_64_bit);
        assert!(!details.needs_byteswap);
    }

    #[test]
    fn test_detect_macho_byteswapped() {
        let mut bytes = MH_CIGAM.to_le_bytes().to_vec();
        bytes.extend_from_slice(&CPU_TYPE_X86.swap_bytes().to_le_bytes());
        let details = detect(bytes);
        assert_eq!(details.format, FileFormat::MachO);
        assert_eq!(details.arch, Arch::X86);
        assert!(!details.is_64_bit);
        assert!(details.needs_byteswap);
    }

    #[test]
    fn test_detect_fat() {
        // fat headers are stored big-endian, so a little-endian read of the
        // magic comes back swapped
        let bytes = FAT_MAGIC.to_be_bytes().to_vec();
        let details = detect(bytes);
        assert_eq!(details.format, FileFormat::Fat);
        assert!(details.needs_byteswap);
    }

    #[test]
    fn test_detect_archive() {
        let details = detect(b"!<arch>\n".to_vec());
        assert_eq!(details.format, FileFormat::Archive);
        assert!(!details.needs_byteswap);
    }

    #[test]
    fn test_detect_unknown() {
        let details = detect(vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(details.format, FileFormat::Unknown);
        assert_eq!(details.arch, Arch::Unknown);
    }

    #[test]
    fn test_detect_preserves_position() {
        let mut bytes = MH_MAGIC_64.to_le_bytes().to_vec();
        bytes.extend_from_slice(&CPU_TYPE_X86_64.to_le_bytes());
        let mut reader = Reader::from_vec(bytes);
        let details = detect_file(&mut reader).unwrap();
        assert_eq!(details.arch, Arch::X86_64);
        assert_eq!(reader.tell(), 0);
    }

    #[test]
    fn test_unknown_cputype_continues() {
        let mut bytes = MH_MAGIC_64.to_le_bytes().to_vec();
        bytes.extend_from_slice(&0x99u32.to_le_bytes());
        let details = detect(bytes);
        assert_eq!(details.format, FileFormat::MachO);
        assert_eq!(details.arch, Arch::Unknown);
    }
}
