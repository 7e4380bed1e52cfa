// Thu Jan 22 2026 - Alex

use crate::dwarf::ObjectAncestry;
use crate::formats::{parse_file, FileDetails, FormatError, ParseContext};
use crate::memory::{Reader, Whence};

const AR_HEADER_LEN: usize = 60;
const AR_GLOBAL_HEADER_LEN: usize = 8;
const BSD_EXTENDED_PREFIX: &str = "#1/";

fn is_symbol_table(name: &str) -> bool {
    name.starts_with("__.SYMDEF")
}

/// Walk a Unix archive and feed each object member back through the
/// dispatcher as its own parse task. Symbol-table members are skipped.
pub fn read_archive(
    context: &ParseContext,
    ancestry: ObjectAncestry,
    reader: Reader,
    end_pos: usize,
    _details: FileDetails,
) -> Result<(), FormatError> {
    let mut archive = reader.subbuffer(end_pos)?;
    archive.seek(AR_GLOBAL_HEADER_LEN as i64, Whence::Start)?;

    while archive.size() >= AR_HEADER_LEN {
        let header = archive.read_bytes(AR_HEADER_LEN)?.to_vec();

        if &header[58..60] != b"`\n" {
            log::warn!("malformed archive member header in {}", ancestry);
            break;
        }

        let mut name = String::from_utf8_lossy(&header[0..16]).trim_end().to_string();
        let member_size: usize = String::from_utf8_lossy(&header[48..58])
            .trim()
            .parse()
            .map_err(|_| FormatError::MalformedArchive(ancestry.to_string()))?;

        let data_offset = archive.tell();
        let mut object_offset = data_offset;
        let mut object_size = member_size;

        // BSD long names sit at the front of the member data.
        if let Some(length) = name.strip_prefix(BSD_EXTENDED_PREFIX) {
            let length: usize = length
                .trim_end_matches('/')
                .trim()
                .parse()
                .map_err(|_| FormatError::MalformedArchive(ancestry.to_string()))?;
            let bytes = archive.read_bytes(length)?;
            name = String::from_utf8_lossy(bytes)
                .trim_end_matches('\0')
                .to_string();
            object_offset += length;
            object_size = object_size.saturating_sub(length);
        } else {
            name = name.trim_end_matches('/').to_string();
        }

        if !is_symbol_table(&name) && object_size > 0 {
            let mut member = archive.clone();
            member.seek(object_offset as i64, Whence::Start)?;
            let object = member.subbuffer(object_offset + object_size)?;
            let object_end = object.size();

            let member_name = name.clone();
            let child_context = context.clone();
            let child_ancestry = ancestry;
            (context.callbacks.do_work)(Box::new(move || {
                if let Err(error) = parse_file(
                    &member_name,
                    &child_ancestry,
                    object,
                    object_end,
                    child_context,
                ) {
                    log::error!("{}: {}", member_name, error);
                }
            }));
        }

        // members are two-byte aligned
        let window_len = archive.tell() + archive.size();
        let mut next = data_offset + member_size;
        if next % 2 == 1 {
            next += 1;
        }
        if next > window_len || archive.seek(next as i64, Whence::Start).is_err() {
            break;
        }
    }

    Ok(())
}
