use crate::error::Result;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Resolves a resource key to display text. Unknown keys should echo back
/// rather than fail; a missing translation is not an engine error.
pub trait Localizer: Send + Sync {
    fn resolve(&self, key: &str, args: &HashMap<String, String>) -> String;
}

/// Flat `key: text` catalog with `{{name}}` placeholders.
#[derive(Debug, Clone, Default)]
pub struct CatalogLocalizer {
    entries: BTreeMap<String, String>,
}

impl CatalogLocalizer {
    pub fn new(entries: BTreeMap<String, String>) -> Self {
        Self { entries }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::parse(&data)
    }

    /// Load `path` if it exists, otherwise an empty catalog that echoes keys.
    pub fn load_or_empty(path: &Path) -> Result<Self> {
        match crate::io::read_if_exists(path)? {
            Some(data) => Self::parse(&data),
            None => Ok(Self::default()),
        }
    }

    fn parse(data: &str) -> Result<Self> {
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        let entries: BTreeMap<String, String> = serde_yaml::from_str(data)?;
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Localizer for CatalogLocalizer {
    fn resolve(&self, key: &str, args: &HashMap<String, String>) -> String {
        let Some(template) = self.entries.get(key) else {
            return key.to_string();
        };
        let mut text = template.clone();
        for (name, value) in args {
            text = text.replace(&format!("{{{{{name}}}}}"), value);
        }
        text
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
