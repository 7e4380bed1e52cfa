// Thu Jan 22 2026 - Alex

use crate::dwarf::{DwarfParser, DwarfSections, ObjectAncestry};
use crate::formats::{FileDetails, FormatError, ParseContext};
use crate::memory::{MemoryError, Reader, Whence};
use crate::registry::{DieRegistry, ObjectFileDescriptor};
use crate::strings::StringPool;
use goblin::mach::MachO;
use std::sync::Arc;

const SECT_DEBUG_INFO: &str = "__debug_info";
const SECT_DEBUG_ABBREV: &str = "__debug_abbrev";
const SECT_DEBUG_STR: &str = "__debug_str";
const SECT_DEBUG_STR_OFFS: &str = "__debug_str_offs";

#[derive(Default)]
struct DwarfSectionRanges {
    info: Option<(u64, u64)>,
    abbrev: Option<(u64, u64)>,
    strings: Option<(u64, u64)>,
    str_offsets: Option<(u64, u64)>,
}

fn collect_ranges(macho: &MachO) -> Result<DwarfSectionRanges, FormatError> {
    let mut ranges = DwarfSectionRanges::default();
    for segment in &macho.segments {
        for (section, _data) in segment.sections()? {
            let range = (section.offset as u64, section.size);
            match section.name().unwrap_or("") {
                SECT_DEBUG_INFO => ranges.info = Some(range),
                SECT_DEBUG_ABBREV => ranges.abbrev = Some(range),
                SECT_DEBUG_STR => ranges.strings = Some(range),
                SECT_DEBUG_STR_OFFS => ranges.str_offsets = Some(range),
                _ => {}
            }
        }
    }
    Ok(ranges)
}

fn section_reader(image: &Reader, range: (u64, u64)) -> Result<Reader, MemoryError> {
    let (offset, size) = range;
    let mut reader = image.clone();
    reader.seek(offset as i64, Whence::Start)?;
    reader.subbuffer((offset + size) as usize)
}

/// None when the image carries no `__debug_info` at all.
fn build_sections(
    image: &Reader,
    ranges: DwarfSectionRanges,
    origin: &dyn std::fmt::Display,
) -> Result<Option<DwarfSections>, FormatError> {
    let info = match ranges.info {
        Some(range) => range,
        None => return Ok(None),
    };
    let abbrev = ranges
        .abbrev
        .ok_or_else(|| FormatError::MissingSection(SECT_DEBUG_ABBREV, origin.to_string()))?;

    Ok(Some(DwarfSections {
        info: section_reader(image, info)?,
        abbrev: section_reader(image, abbrev)?,
        strings: ranges
            .strings
            .map(|range| section_reader(image, range))
            .transpose()?,
        str_offsets: ranges
            .str_offsets
            .map(|range| section_reader(image, range))
            .transpose()?,
    }))
}

/// Drive the DWARF parser over one Mach-O image.
///
/// The image's section table is walked for the `__DWARF` debug sections; an
/// image without `__debug_info` contributes nothing. DIE batches are handed
/// to the registration callback as they are produced.
pub fn read_macho(
    context: &ParseContext,
    ancestry: ObjectAncestry,
    reader: Reader,
    end_pos: usize,
    details: FileDetails,
) -> Result<(), FormatError> {
    let image = reader.subbuffer(end_pos)?;
    let macho = MachO::parse(image.as_slice(), 0)?;
    let ranges = collect_ranges(&macho)?;

    let sections = match build_sections(&image, ranges, &ancestry)? {
        Some(sections) => sections,
        None => {
            log::debug!("no __debug_info in {}", ancestry);
            return Ok(());
        }
    };

    let ofd_index = context.registry.object_files.insert(ObjectFileDescriptor {
        ancestry,
        root_path: context.root_path.clone(),
        image_offset: image.window_start() as u64,
        image_end: image.window_end() as u64,
        arch: details.arch,
    });

    let mut parser = DwarfParser::new(context.pool.clone(), sections, details.arch, ofd_index);
    let register = context.callbacks.register_dies.clone();
    parser.process_all_dies(&mut |dies| register(dies))?;

    Ok(())
}

/// Re-open the image behind a registered object file and hand back a DWARF
/// parser over its debug sections. Used by the reporting pass to fetch full
/// attribute sequences on demand.
pub fn dwarf_from_object_file(
    pool: &Arc<StringPool>,
    registry: &DieRegistry,
    ofd_index: u32,
) -> Result<DwarfParser, FormatError> {
    let descriptor = registry.object_files.get(ofd_index);

    let mut reader = Reader::open(&descriptor.root_path)?;
    reader.seek(descriptor.image_offset as i64, Whence::Start)?;
    let image = reader.subbuffer(descriptor.image_end as usize)?;

    let macho = MachO::parse(image.as_slice(), 0)?;
    let ranges = collect_ranges(&macho)?;
    let sections = build_sections(&image, ranges, &descriptor.ancestry)?.ok_or_else(|| {
        FormatError::MissingSection(SECT_DEBUG_INFO, descriptor.ancestry.to_string())
    })?;

    Ok(DwarfParser::new(
        pool.clone(),
        sections,
        descriptor.arch,
        ofd_index,
    ))
}
