use std::collections::HashMap;

use serde::Serialize;

use crate::matcher;
use crate::scan::table::TableModel;

/// One labeled value extracted from a screen.
///
/// `source` indexes the snapshot's editable-field list when the value came
/// from an input field; display-only values have no source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SemanticField {
    pub label: String,
    pub value: String,
    pub read_only: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<usize>,
}

/// The semantic model of one screen, produced atomically by one scan.
///
/// Holds no reference back to the snapshot; the snapshot may be discarded
/// as soon as the scan returns. Scanning is a pure function of the
/// snapshot and config, so two scans of the same frame compare equal.
/// Duplicate labels are disambiguated with an `@N` suffix at insertion
/// time, so map keys are unique while the `SemanticField::label` keeps
/// the on-screen text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreenModel {
    pub title_lines: Vec<String>,
    pub text: String,
    pub display_fields: HashMap<String, String>,
    pub input_fields: HashMap<String, SemanticField>,
    pub table: Option<TableModel>,
}

impl ScreenModel {
    pub fn new() -> Self {
        Self {
            title_lines: Vec::new(),
            text: String::new(),
            display_fields: HashMap::new(),
            input_fields: HashMap::new(),
            table: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title_lines.is_empty()
            && self.text.is_empty()
            && self.display_fields.is_empty()
            && self.input_fields.is_empty()
            && self.table.is_none()
    }

    /// Look up an input field by label pattern (match modes honored).
    pub fn input_field(&self, label: &str) -> Option<&SemanticField> {
        if let Some(f) = self.input_fields.get(label) {
            return Some(f);
        }
        self.input_fields
            .iter()
            .filter(|(key, _)| matcher::matches(label, key))
            .min_by(|a, b| a.0.cmp(b.0))
            .map(|(_, f)| f)
    }

    pub fn input_value(&self, label: &str) -> Option<&str> {
        self.input_field(label).map(|f| f.value.as_str())
    }

    /// Look up a display (read-only) field by label pattern, returning the
    /// matched key alongside the value.
    pub fn display_entry(&self, label: &str) -> Option<(&str, &str)> {
        if let Some((k, v)) = self.display_fields.get_key_value(label) {
            return Some((k.as_str(), v.as_str()));
        }
        self.display_fields
            .iter()
            .filter(|(key, _)| matcher::matches(label, key))
            .min_by(|a, b| a.0.cmp(b.0))
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Look up a display (read-only) field value by label pattern.
    pub fn display_value(&self, label: &str) -> Option<&str> {
        self.display_entry(label).map(|(_, v)| v)
    }

    /// Whether the pattern matches any title line or free-text line.
    pub fn has_text(&self, pattern: &str) -> bool {
        self.title_lines.iter().any(|l| matcher::matches(pattern, l))
            || self.text.lines().any(|l| matcher::matches(pattern, l.trim()))
    }
}

impl Default for ScreenModel {
    fn default() -> Self {
        Self::new()
    }
}

/// Pick a map key for `label`, appending `@1`, `@2`, ... on collision.
pub(crate) fn unique_key<V>(map: &HashMap<String, V>, label: &str) -> String {
    if !map.contains_key(label) {
        return label.to_string();
    }
    let mut n = 1;
    loop {
        let key = format!("{label}@{n}");
        if !map.contains_key(&key) {
            return key;
        }
        n += 1;
    }
}
