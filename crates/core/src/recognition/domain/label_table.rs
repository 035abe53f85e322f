use std::collections::HashMap;

use crate::shared::constants::{LABEL_DELIMITER, UNKNOWN_LABEL_ID};

/// Bidirectional mapping between identity names and integer label ids.
///
/// "unknown" is pre-reserved at id -1 and never assigned to a training
/// image; every other name gets the next positive id in first-seen
/// order. Built once per training pass and read-only afterwards.
#[derive(Clone, Debug)]
pub struct LabelTable {
    ids_by_name: HashMap<String, i32>,
    names_by_id: HashMap<i32, String>,
    next_id: i32,
}

impl LabelTable {
    pub fn new() -> Self {
        let mut table = Self {
            ids_by_name: HashMap::new(),
            names_by_id: HashMap::new(),
            next_id: 1,
        };
        table.ids_by_name.insert("unknown".to_string(), UNKNOWN_LABEL_ID);
        table.names_by_id.insert(UNKNOWN_LABEL_ID, "unknown".to_string());
        table
    }

    /// Returns the id for `name`, assigning the next positive id on
    /// first sight.
    pub fn intern(&mut self, name: &str) -> i32 {
        if let Some(&id) = self.ids_by_name.get(name) {
            return id;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.ids_by_name.insert(name.to_string(), id);
        self.names_by_id.insert(id, name.to_string());
        id
    }

    pub fn id_of(&self, name: &str) -> Option<i32> {
        self.ids_by_name.get(name).copied()
    }

    pub fn name_of(&self, id: i32) -> Option<&str> {
        self.names_by_id.get(&id).map(String::as_str)
    }

    /// Number of entries, including the reserved "unknown".
    pub fn len(&self) -> usize {
        self.ids_by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        // The reserved entry is always present
        false
    }
}

impl Default for LabelTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Extracts the identity label from a training file name: the portion
/// before the first delimiter, e.g. `alice-3.jpg` → `alice`.
///
/// A name without a delimiter before its extension has no parsable
/// label and yields `None`.
pub fn label_from_filename(file_name: &str) -> Option<&str> {
    let stem = file_name.rsplit_once('.').map_or(file_name, |(s, _)| s);
    match stem.split_once(LABEL_DELIMITER) {
        Some((label, _)) if !label.is_empty() => Some(label),
        _ => None,
    }
}
