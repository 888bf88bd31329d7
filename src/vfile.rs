//! Virtual files exposed on the emulated drive

use anyhow::{bail, Result};
use std::collections::BTreeMap;

/// Name of the generated script on the virtual drive
pub const AUTOEXEC_FILE_NAME: &str = "AUTOEXEC.BAT";

/// Register/update primitive of the virtual storage subsystem
pub trait VirtualFiles {
    /// Expose a new file
    fn register(&mut self, name: &str, data: Vec<u8>) -> Result<()>;
    /// Replace the content of an already exposed file
    fn update(&mut self, name: &str, data: Vec<u8>) -> Result<()>;
}

/// Virtual files kept in memory, names are case-insensitive
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryFiles {
    files: BTreeMap<String, Vec<u8>>,
}

impl MemoryFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.files.get(&name.to_ascii_uppercase()).map(Vec::as_slice)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }
}

impl VirtualFiles for MemoryFiles {
    fn register(&mut self, name: &str, data: Vec<u8>) -> Result<()> {
        let key = name.to_ascii_uppercase();
        if self.files.contains_key(&key) {
            bail!("Virtual file {} is already registered", key);
        }
        self.files.insert(key, data);
        Ok(())
    }

    fn update(&mut self, name: &str, data: Vec<u8>) -> Result<()> {
        match self.files.get_mut(&name.to_ascii_uppercase()) {
            Some(content) => {
                *content = data;
                Ok(())
            }
            None => bail!("Virtual file {} is not registered", name),
        }
    }
}
