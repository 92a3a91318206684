use serde::de::DeserializeOwned;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::error::{ProcessingError, Result};
use crate::models::{EntityRecord, Frequency, Manifest, ManifestKind};
use crate::utils::paths::{entity_dir, entity_file_path, manifest_path, parent_dir};

/// Reads back what `SeriesWriter` produced.
pub struct SeriesReader {
    root: PathBuf,
}

impl SeriesReader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Names of all parent directories under the root, sorted
    pub fn list_parents(&self) -> Result<Vec<String>> {
        list_subdirectories(&self.root)
    }

    /// Names of all child directories of a parent, sorted
    pub fn list_children(&self, parent_name: &str) -> Result<Vec<String>> {
        list_subdirectories(&parent_dir(&self.root, parent_name))
    }

    /// Read one child's series file. Any failure is wrapped with the offending path.
    pub fn read_entity(
        &self,
        parent_name: &str,
        entity_name: &str,
        frequency: Frequency,
    ) -> Result<EntityRecord> {
        let path = entity_file_path(&self.root, parent_name, entity_name, frequency);
        read_json(&path).map_err(|e| ProcessingError::ChildFile {
            path,
            source: Box::new(e),
        })
    }

    /// Whether the entity has a manifest and every file it lists is present
    pub fn is_entity_complete(&self, parent_name: &str, entity_name: &str) -> bool {
        let dir = entity_dir(&self.root, parent_name, entity_name);
        is_complete(&dir, ManifestKind::Entity)
    }

    /// Whether the parent aggregate exists and was built from exactly `children`
    pub fn is_parent_complete(&self, parent_name: &str, children: &[String]) -> bool {
        let dir = parent_dir(&self.root, parent_name);
        is_complete(&dir, ManifestKind::Aggregate)
            && matches!(self.read_manifest(&dir), Ok(Some(m)) if m.children == children)
    }

    pub fn read_manifest(&self, dir: &Path) -> Result<Option<Manifest>> {
        let path = manifest_path(dir);
        if !path.is_file() {
            return Ok(None);
        }
        read_json(&path).map(Some)
    }
}

fn is_complete(dir: &Path, kind: ManifestKind) -> bool {
    match read_json::<Manifest>(&manifest_path(dir)) {
        Ok(manifest) => {
            manifest.kind == kind && manifest.files.iter().all(|f| dir.join(f).is_file())
        }
        Err(_) => false,
    }
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

fn list_subdirectories(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(raw) => {
                return Err(ProcessingError::InvalidFormat(format!(
                    "Directory name is not valid UTF-8: {:?}",
                    raw
                )))
            }
        }
    }
    names.sort();
    Ok(names)
}
