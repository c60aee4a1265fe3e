//! Access kind tags

use serde::{Deserialize, Serialize};
use std::fmt;

/// The data shape requested at an identifier
///
/// Built-in kinds have fixed names; any other name refers to a custom
/// accessor registered under that id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AccessKind {
    Directory,
    Nothing,
    Text,
    Binary,
    Json,
    /// Plugin-defined kind, named by its registered id
    Custom(String),
}

impl AccessKind {
    /// Returns the tag name
    pub fn as_str(&self) -> &str {
        match self {
            AccessKind::Directory => "directory",
            AccessKind::Nothing => "nothing",
            AccessKind::Text => "text",
            AccessKind::Binary => "binary",
            AccessKind::Json => "json",
            AccessKind::Custom(id) => id,
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, AccessKind::Directory)
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, AccessKind::Custom(_))
    }
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for AccessKind {
    fn from(s: &str) -> Self {
        match s {
            "directory" => AccessKind::Directory,
            "nothing" => AccessKind::Nothing,
            "text" => AccessKind::Text,
            "binary" => AccessKind::Binary,
            "json" => AccessKind::Json,
            other => AccessKind::Custom(other.to_string()),
        }
    }
}

impl From<String> for AccessKind {
    fn from(s: String) -> Self {
        AccessKind::from(s.as_str())
    }
}

impl From<&AccessKind> for AccessKind {
    fn from(kind: &AccessKind) -> Self {
        kind.clone()
    }
}

impl From<AccessKind> for String {
    fn from(kind: AccessKind) -> Self {
        kind.as_str().to_string()
    }
}
