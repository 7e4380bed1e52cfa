// Thu Jan 22 2026 - Alex

use crate::dwarf::ObjectAncestry;
use crate::formats::detect::cputype_to_arch;
use crate::formats::{parse_file, FileDetails, FormatError, ParseContext};
use crate::memory::{Reader, Whence};

/// Walk a fat/universal bundle and feed each contained image back through
/// the dispatcher as its own parse task.
pub fn read_fat(
    context: &ParseContext,
    ancestry: ObjectAncestry,
    reader: Reader,
    end_pos: usize,
    details: FileDetails,
) -> Result<(), FormatError> {
    let mut fat = reader.subbuffer(end_pos)?;

    // fat headers are big-endian on disk
    let swap = details.needs_byteswap;
    let read_word = |fat: &mut Reader| -> Result<u32, FormatError> {
        let value = fat.read_u32()?;
        Ok(if swap { value.swap_bytes() } else { value })
    };

    let _magic = read_word(&mut fat)?;
    let arch_count = read_word(&mut fat)?;

    for _ in 0..arch_count {
        let cputype = read_word(&mut fat)?;
        let _cpusubtype = read_word(&mut fat)?;
        let (offset, size) = if details.is_64_bit {
            let offset = {
                let high = read_word(&mut fat)? as u64;
                let low = read_word(&mut fat)? as u64;
                (high << 32) | low
            };
            let size = {
                let high = read_word(&mut fat)? as u64;
                let low = read_word(&mut fat)? as u64;
                (high << 32) | low
            };
            let _align = read_word(&mut fat)?;
            let _reserved = read_word(&mut fat)?;
            (offset, size)
        } else {
            let offset = read_word(&mut fat)? as u64;
            let size = read_word(&mut fat)? as u64;
            let _align = read_word(&mut fat)?;
            (offset, size)
        };

        let slice_name = cputype_to_arch(cputype).to_string();

        let mut slice = fat.clone();
        slice.seek(offset as i64, Whence::Start)?;
        let member = slice.subbuffer((offset + size) as usize)?;
        let member_size = member.size();

        let child_context = context.clone();
        let child_ancestry = ancestry;
        (context.callbacks.do_work)(Box::new(move || {
            if let Err(error) = parse_file(
                &slice_name,
                &child_ancestry,
                member,
                member_size,
                child_context,
            ) {
                log::error!("{}: {}", slice_name, error);
            }
        }));
    }

    Ok(())
}
