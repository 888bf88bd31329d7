//! Localized message table used for the generated header comments

use std::collections::HashMap;

pub const MSG_AUTOGENERATED: &str = "AUTOEXEC_BAT_AUTOGENERATED";
pub const MSG_CONFIG_SECTION: &str = "AUTOEXEC_BAT_CONFIG_SECTION";

/// Message lookup, keyed by message name
#[derive(Debug, Clone)]
pub struct Messages {
    entries: HashMap<String, String>,
}

impl Messages {
    /// Create a table holding the default (English) messages
    pub fn new() -> Self {
        let mut messages = Self {
            entries: HashMap::new(),
        };
        messages.add(MSG_AUTOGENERATED, "autogenerated");
        messages.add(MSG_CONFIG_SECTION, "from [autoexec] section");
        messages
    }

    /// Add or replace a message, e.g. with a translation
    pub fn add(&mut self, name: &str, text: &str) {
        self.entries.insert(name.to_string(), text.to_string());
    }

    /// Look up a message; unknown names yield a visible placeholder
    pub fn get(&self, name: &str) -> String {
        self.entries
            .get(name)
            .cloned()
            .unwrap_or_else(|| format!("Message not found: {name}"))
    }
}

impl Default for Messages {
    fn default() -> Self {
        Self::new()
    }
}
