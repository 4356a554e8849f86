use crate::error::{Result, TourError};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const TOURS_DIR: &str = ".tours";

pub const CONFIG_FILE: &str = ".tours/config.yaml";
pub const STORE_FILE: &str = ".tours/store.yaml";
pub const DEFAULT_REGISTRY_FILE: &str = ".tours/registry.yaml";
pub const DEFAULT_LOCALE_FILE: &str = ".tours/locale.yaml";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn tours_dir(root: &Path) -> PathBuf {
    root.join(TOURS_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn store_path(root: &Path) -> PathBuf {
    root.join(STORE_FILE)
}

/// Resolve a configured path against the project root. Absolute paths pass through.
pub fn resolve(root: &Path, configured: &Path) -> PathBuf {
    if configured.is_absolute() {
        configured.to_path_buf()
    } else {
        root.join(configured)
    }
}

// ---------------------------------------------------------------------------
// Tour id validation
// ---------------------------------------------------------------------------

static TOUR_ID_RE: OnceLock<Regex> = OnceLock::new();

fn tour_id_re() -> &'static Regex {
    TOUR_ID_RE.get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9\-]*[a-z0-9]$|^[a-z0-9]$").unwrap())
}

pub fn validate_tour_id(id: &str) -> Result<()> {
    if id.is_empty() || id.len() > 64 || !tour_id_re().is_match(id) {
        return Err(TourError::InvalidTourId(id.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
