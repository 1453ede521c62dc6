//! Transform merge: compose a tenant spec with an operator overlay
//!
//! A transform supplies two kinds of pair entries:
//!
//! - `Key=Value` — a default, applied only when the spec has not set the key
//!   itself (spec always wins);
//! - `+Key=Value` — a prepend directive, placed before the spec's own entries
//!   so overlay-injected preparatory steps run first within the section.

use crate::document::{Entry, Section, UnitDocument};

/// Marker prefix on a transform pair key denoting a prepend directive.
const PREPEND_PREFIX: char = '+';

/// Merge `transform` into `spec`, returning a new document.
///
/// Spec sections keep their original order. A spec section with no transform
/// counterpart is copied verbatim; otherwise the merged section is built as
/// prepends, then spec entries, then not-yet-present defaults. Transform
/// sections absent from spec are appended afterwards, in transform order,
/// with the prepend marker stripped. Neither input is modified.
pub fn merge(spec: &UnitDocument, transform: &UnitDocument) -> UnitDocument {
    let mut result = UnitDocument::default();
    let mut handled: Vec<&str> = Vec::new();

    for spec_section in &spec.sections {
        if spec_section.is_empty_preamble() {
            continue;
        }

        handled.push(&spec_section.name);
        match transform.section(&spec_section.name) {
            None => result.sections.push(spec_section.clone()),
            Some(overlay) => result.sections.push(merge_section(spec_section, overlay)),
        }
    }

    for overlay in &transform.sections {
        if overlay.is_empty_preamble() || handled.contains(&overlay.name.as_str()) {
            continue;
        }
        // No spec counterpart: emit as-is modulo prefix stripping.
        let mut section = Section::named(&overlay.name);
        section.entries = overlay.entries.iter().map(strip_prefix).collect();
        result.sections.push(section);
    }

    result
}

/// Merge one section that exists in both spec and transform.
fn merge_section(spec: &Section, overlay: &Section) -> Section {
    let mut merged = Section::named(&spec.name);

    // Prepend directives first, in their transform order.
    for entry in &overlay.entries {
        if let Some(key) = prepend_key(entry) {
            if let Entry::Pair { value, .. } = entry {
                merged.entries.push(Entry::pair(key, value.clone()));
            }
        }
    }

    // Then every spec entry, unmodified.
    merged.entries.extend(spec.entries.iter().cloned());

    // Then transform defaults not already present. Passthrough entries are
    // skipped here; the presence check runs against everything placed so
    // far, so an earlier prepend also suppresses a same-key default.
    for entry in &overlay.entries {
        if prepend_key(entry).is_some() {
            continue;
        }
        if let Entry::Pair { key, .. } = entry {
            if !merged.has_key(key) {
                merged.entries.push(entry.clone());
            }
        }
    }

    merged
}

/// The key behind the prepend marker, if this entry is a prepend directive.
fn prepend_key(entry: &Entry) -> Option<&str> {
    match entry {
        Entry::Pair { key, .. } => key.strip_prefix(PREPEND_PREFIX),
        Entry::Raw(_) => None,
    }
}

/// Strip the prepend marker from a pair key; passthrough entries are kept
/// verbatim.
fn strip_prefix(entry: &Entry) -> Entry {
    match prepend_key(entry) {
        Some(key) => match entry {
            Entry::Pair { value, .. } => Entry::pair(key, value.clone()),
            Entry::Raw(_) => unreachable!("prepend_key only matches pairs"),
        },
        None => entry.clone(),
    }
}
