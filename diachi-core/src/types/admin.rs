//! Administrative division types.
//!
//! Vietnam nests wards inside districts inside provinces; each unit has a
//! stable code assigned by the division provider.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Level of an administrative division.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminLevel {
    /// Province or centrally-governed city
    Province,
    /// District, town or provincial city
    District,
    /// Ward, commune or township
    Ward,
}

impl AdminLevel {
    /// Parses a level name. Unknown names yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "province" => Some(AdminLevel::Province),
            "district" => Some(AdminLevel::District),
            "ward" => Some(AdminLevel::Ward),
            _ => None,
        }
    }

    /// Lowercase level name.
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminLevel::Province => "province",
            AdminLevel::District => "district",
            AdminLevel::Ward => "ward",
        }
    }

    /// Path segment the division provider uses for this level.
    pub fn path_segment(&self) -> &'static str {
        match self {
            AdminLevel::Province => "p",
            AdminLevel::District => "d",
            AdminLevel::Ward => "w",
        }
    }
}

impl fmt::Display for AdminLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved administrative unit. Immutable once fetched.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUnit {
    /// Provider code (e.g. "01" for Hà Nội)
    pub code: String,
    /// Human-readable name
    pub name: String,
    /// Division level
    #[serde(rename = "type")]
    pub level: AdminLevel,
}

impl AdminUnit {
    /// Creates a new administrative unit.
    pub fn new(code: impl Into<String>, name: impl Into<String>, level: AdminLevel) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            level,
        }
    }
}
