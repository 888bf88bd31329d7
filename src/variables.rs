//! Environment variables exported at the top of AUTOEXEC.BAT

use std::collections::BTreeMap;

/// Name-to-value registry, iterated sorted by name
///
/// Names are stored upper-cased. An empty value is never stored: setting a
/// variable to an empty string removes it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableRegistry {
    variables: BTreeMap<String, String>,
}

impl VariableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert, overwrite or (for an empty value) remove a variable
    ///
    /// Returns the normalized name.
    pub fn set(&mut self, name: &str, value: &str) -> String {
        let name = normalize_name(name);
        if value.is_empty() {
            self.variables.remove(&name);
        } else {
            self.variables.insert(name.clone(), value.to_string());
        }
        name
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.variables.get(&normalize_name(name)).map(String::as_str)
    }

    /// Variables in sorted-name order
    pub fn snapshot(&self) -> impl Iterator<Item = (&str, &str)> {
        self.variables
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }
}

fn normalize_name(name: &str) -> String {
    name.to_ascii_uppercase()
}

/// True if every character is printable ASCII (space through tilde)
pub fn is_printable_ascii(text: &str) -> bool {
    text.bytes().all(|byte| (0x20..=0x7e).contains(&byte))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_sorted_by_name() {
        let mut registry = VariableRegistry::new();
        registry.set("B", "2");
        registry.set("A", "1");

        let names: Vec<&str> = registry.snapshot().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_name_is_upper_cased() {
        let mut registry = VariableRegistry::new();
        assert_eq!(registry.set("blaster", "A220 I7 D1"), "BLASTER");
        assert_eq!(registry.get("Blaster"), Some("A220 I7 D1"));
    }

    #[test]
    fn test_empty_value_removes() {
        let mut registry = VariableRegistry::new();
        registry.set("PATH", "C:\\");
        registry.set("path", "");

        assert!(registry.is_empty());
        assert_eq!(registry.get("PATH"), None);
    }

    #[test]
    fn test_empty_value_on_missing_is_noop() {
        let mut registry = VariableRegistry::new();
        registry.set("TEMP", "");
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_printable_ascii() {
        assert!(is_printable_ascii("C:\\DOS;Z:\\"));
        assert!(is_printable_ascii(""));
        assert!(!is_printable_ascii("tab\there"));
        assert!(!is_printable_ascii("caf\u{e9}"));
    }
}
