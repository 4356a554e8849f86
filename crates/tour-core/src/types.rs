use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Operations,
    Management,
    Administration,
}

impl Category {
    pub fn all() -> &'static [Category] {
        &[
            Category::Operations,
            Category::Management,
            Category::Administration,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Operations => "operations",
            Category::Management => "management",
            Category::Administration => "administration",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = crate::error::TourError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "operations" => Ok(Category::Operations),
            "management" => Ok(Category::Management),
            "administration" => Ok(Category::Administration),
            _ => Err(crate::error::TourError::InvalidCategory(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Placement
// ---------------------------------------------------------------------------

/// Where the widget should place the tooltip relative to the anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    #[default]
    Auto,
    Top,
    Bottom,
    Left,
    Right,
    Center,
}

impl Placement {
    pub fn as_str(self) -> &'static str {
        match self {
            Placement::Auto => "auto",
            Placement::Top => "top",
            Placement::Bottom => "bottom",
            Placement::Left => "left",
            Placement::Right => "right",
            Placement::Center => "center",
        }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Placement {
    type Err = crate::error::TourError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Placement::Auto),
            "top" => Ok(Placement::Top),
            "bottom" => Ok(Placement::Bottom),
            "left" => Ok(Placement::Left),
            "right" => Ok(Placement::Right),
            "center" => Ok(Placement::Center),
            _ => Err(crate::error::TourError::InvalidPlacement(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// StepTarget
// ---------------------------------------------------------------------------

/// Selector sentinel meaning "the whole page, no anchor".
pub const PAGE_TARGET: &str = "body";

/// What a step points at. The selector string is opaque to the engine; only
/// the spotlight widget interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StepTarget {
    Page,
    Anchor(String),
}

impl StepTarget {
    pub fn is_page(&self) -> bool {
        matches!(self, StepTarget::Page)
    }

    pub fn selector(&self) -> &str {
        match self {
            StepTarget::Page => PAGE_TARGET,
            StepTarget::Anchor(s) => s,
        }
    }
}

impl From<String> for StepTarget {
    fn from(s: String) -> Self {
        if s == PAGE_TARGET {
            StepTarget::Page
        } else {
            StepTarget::Anchor(s)
        }
    }
}

impl From<StepTarget> for String {
    fn from(t: StepTarget) -> Self {
        match t {
            StepTarget::Page => PAGE_TARGET.to_string(),
            StepTarget::Anchor(s) => s,
        }
    }
}

impl fmt::Display for StepTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.selector())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
