//! Coarse draft-vs-live change indicator

use crate::Section;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDiff {
    pub changed_sections: usize,
    /// Sum of data key counts over changed sections (an upper bound)
    pub changed_field_groups: usize,
}

impl LayoutDiff {
    pub fn is_empty(&self) -> bool {
        self.changed_sections == 0
    }
}

/// Compare sections by id
///
/// Sections on only one side count as changed with all their data keys.
/// Shared sections count as changed when `enabled` or `data` differ.
pub fn diff_layouts(current: &[Section], live: &[Section]) -> LayoutDiff {
    let live_by_id: HashMap<&str, &Section> = live.iter().map(|s| (s.id.as_str(), s)).collect();
    let mut diff = LayoutDiff::default();

    for section in current {
        let changed = match live_by_id.get(section.id.as_str()) {
            Some(previous) => previous.enabled != section.enabled || previous.data != section.data,
            None => true,
        };
        if changed {
            diff.changed_sections += 1;
            diff.changed_field_groups += section.data.len();
        }
    }

    for section in live {
        if !current.iter().any(|s| s.id == section.id) {
            diff.changed_sections += 1;
            diff.changed_field_groups += section.data.len();
        }
    }

    diff
}
