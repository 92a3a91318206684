use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManifestKind {
    Entity,
    Aggregate,
}

/// Completion record written after all data files of a directory.
///
/// Holds no timestamps so an unchanged re-run rewrites identical bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub name: String,
    pub kind: ManifestKind,
    pub files: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<String>,
}

impl Manifest {
    pub fn entity(name: &str, files: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            kind: ManifestKind::Entity,
            files,
            children: Vec::new(),
        }
    }

    pub fn aggregate(name: &str, files: Vec<String>, children: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            kind: ManifestKind::Aggregate,
            files,
            children,
        }
    }
}
