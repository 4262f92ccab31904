//! INI file configuration adapter.
//!
//! Section and key names are case-insensitive.

use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let mut config = Ini::new();
        config.load(path).map_err(std::io::Error::other)?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    /// Keys come back lowercased and sorted; valueless keys are dropped.
    fn get_section(&self, section: &str) -> Option<Vec<(String, String)>> {
        let map = self.config.get_map_ref().get(&section.to_lowercase())?;
        let mut pairs: Vec<(String, String)> = map
            .iter()
            .filter_map(|(k, v)| v.as_ref().map(|v| (k.clone(), v.clone())))
            .collect();
        pairs.sort();
        Some(pairs)
    }
}
