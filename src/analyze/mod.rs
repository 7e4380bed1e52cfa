// Thu Jan 22 2026 - Alex

use crate::dwarf::{
    nonfatal_attribute, Arch, At, Attribute, AttributeSequence, Die, DieRef, ObjectAncestry, Tag,
};
use crate::formats::FormatError;
use crate::registry::DieRegistry;
use crate::utils::sorted_has;
use parking_lot::Mutex;
use std::collections::BTreeMap;

/// Fetches the full attribute sequence for a registered DIE; supplied by
/// the scanner, which knows how to re-open object files.
pub type AttributeFetcher = dyn Fn(&Die) -> Result<AttributeSequence, FormatError>;

/// Strip the `::[u]::` compilation-unit prefix from a symbolic path. The
/// bare unit path `::[u]` has no symbol at all.
pub fn path_to_symbol(path: &str) -> &str {
    if path.len() < 7 {
        ""
    } else {
        &path[7..]
    }
}

/// Types are convoluted enough that their comparison is pulled out here.
/// Two type attributes agree when they reference the same offset (only
/// meaningful within one file) or when both resolved to the same name.
pub fn type_equivalent(x: &Attribute, y: &Attribute) -> bool {
    if x.has_reference() && y.has_reference() && x.reference() == y.reference() {
        return true;
    }

    if x.has_string() && y.has_string() && x.string_hash() == y.string_hash() {
        return true;
    }

    false
}

/// First fatal attribute on which the two sequences disagree, or `At::None`
/// when they are "the same". An attribute present on one side only counts
/// as a disagreement.
pub fn find_attribute_conflict(x: &AttributeSequence, y: &AttributeSequence) -> At {
    for xattr in x {
        let name = xattr.at;
        if nonfatal_attribute(name) {
            continue;
        }

        let yattr = match y.find(name) {
            Some(yattr) => yattr,
            None => return name,
        };

        if name == At::Type && type_equivalent(xattr, yattr) {
            continue;
        }
        if xattr == yattr {
            continue;
        }

        return name;
    }

    // fatal attributes that exist in y but not in x
    for yattr in y {
        let name = yattr.at;
        if nonfatal_attribute(name) {
            continue;
        }
        if x.find(name).is_none() {
            return name;
        }
    }

    At::None
}

/// One unique definition participating in a conflict.
#[derive(Debug)]
pub struct ConflictEntry {
    pub die: DieRef,
    pub ancestry: ObjectAncestry,
    pub arch: Arch,
    pub tag: Tag,
    pub debug_info_offset: u32,
    pub attributes: AttributeSequence,
}

/// An ODR violation: one symbol with more than one inequivalent definition.
#[derive(Debug)]
pub struct OdrvReport {
    pub symbol: String,
    pub list_head: DieRef,
    pub tag: Tag,
    /// The first fatal attribute the front and back definitions disagree on.
    pub name: At,
    /// Unique definitions keyed by fatal attribute hash.
    pub conflict_map: BTreeMap<u64, ConflictEntry>,
}

impl OdrvReport {
    pub fn new(
        symbol: &str,
        list_head: DieRef,
        registry: &DieRegistry,
        fetch: &AttributeFetcher,
    ) -> Result<Self, FormatError> {
        let mut conflict_map = BTreeMap::new();

        let mut current = Some(list_head);
        while let Some(die_ref) = current {
            let batch = registry.resolve(die_ref);
            let die = &batch[die_ref.index as usize];
            current = die.next_die();

            if conflict_map.contains_key(&die.fatal_attribute_hash) {
                continue;
            }
            let attributes = fetch(die)?;
            conflict_map.insert(
                die.fatal_attribute_hash,
                ConflictEntry {
                    die: die_ref,
                    ancestry: registry.object_files.ancestry(die.ofd_index),
                    arch: die.arch,
                    tag: die.tag,
                    debug_info_offset: die.debug_info_offset,
                    attributes,
                },
            );
        }

        debug_assert!(conflict_map.len() > 1);

        let front = conflict_map.values().next().expect("non-empty conflict map");
        let back = conflict_map.values().next_back().expect("non-empty conflict map");
        let name = find_attribute_conflict(&front.attributes, &back.attributes);
        let tag = front.tag;

        Ok(Self {
            symbol: symbol.to_string(),
            list_head,
            tag,
            name,
            conflict_map,
        })
    }

    /// Category string used for report filtering, e.g. `subprogram:type`.
    pub fn category(&self) -> String {
        format!("{}:{}", self.tag, self.name)
    }
}

/// Decide whether a report survives the configured category filters. A
/// non-empty ignore list wins over the report-only list.
pub fn filter_report(report: &OdrvReport, ignore: &[String], report_only: &[String]) -> bool {
    let category = report.category();

    if !ignore.is_empty() {
        // report everything except the ignore list
        !sorted_has(ignore, &category)
    } else if !report_only.is_empty() {
        // report nothing except the report list
        sorted_has(report_only, &category)
    } else {
        true
    }
}

/// Normalize one registry chain and detect fatal-hash divergence.
///
/// The chain is sorted by object-file ancestry (restoring determinism lost
/// to parallel registration), relinked in that order, and scanned for
/// adjacent fatal-hash disagreement. On divergence the head is flagged and
/// a report is appended. Returns the new chain head.
pub fn enforce_odrv_for_die_list(
    registry: &DieRegistry,
    head: DieRef,
    fetch: &AttributeFetcher,
    results: &Mutex<Vec<OdrvReport>>,
) -> DieRef {
    let refs = registry.collect_chain(head);
    assert!(!refs.is_empty());
    if refs.len() == 1 {
        return head;
    }

    // Theory: if multiple copies of the same source file were compiled, the
    // ancestry might not be unique. We assume that's an edge case.
    let mut keyed: Vec<(ObjectAncestry, DieRef)> = refs
        .into_iter()
        .map(|die_ref| {
            let batch = registry.resolve(die_ref);
            let die = &batch[die_ref.index as usize];
            (registry.object_files.ancestry(die.ofd_index), die_ref)
        })
        .collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0));

    let mut conflict = false;
    let mut previous_hash = 0u64;
    for (position, (_, die_ref)) in keyed.iter().enumerate() {
        let batch = registry.resolve(*die_ref);
        let die = &batch[die_ref.index as usize];

        let next = keyed.get(position + 1).map(|(_, next_ref)| *next_ref);
        die.set_next(next);

        if position > 0 && !conflict {
            conflict = die.fatal_attribute_hash != previous_hash;
        }
        previous_hash = die.fatal_attribute_hash;
    }

    let sorted_head = keyed[0].1;
    if !conflict {
        return sorted_head;
    }

    let head_batch = registry.resolve(sorted_head);
    let head_die = &head_batch[sorted_head.index as usize];
    head_die.mark_conflict();
    registry.counters.add_violation();

    match OdrvReport::new(
        path_to_symbol(head_die.path.view()),
        sorted_head,
        registry,
        fetch,
    ) {
        Ok(report) => results.lock().push(report),
        Err(error) => log::error!(
            "failed to build report for `{}`: {}",
            head_die.path,
            error
        ),
    }

    sorted_head
}
