use std::path::{Path, PathBuf};

use crate::models::Frequency;
use crate::utils::constants::{JSON_EXTENSION, MANIFEST_FILE};

/// `{name}_{Frequency}.json`
pub fn series_file_name(name: &str, frequency: Frequency) -> String {
    format!("{}_{}.{}", name, frequency.file_suffix(), JSON_EXTENSION)
}

/// `{root}/{parent}`
pub fn parent_dir(root: &Path, parent_name: &str) -> PathBuf {
    root.join(parent_name)
}

/// `{root}/{parent}/{entity}`
pub fn entity_dir(root: &Path, parent_name: &str, entity_name: &str) -> PathBuf {
    parent_dir(root, parent_name).join(entity_name)
}

/// `{root}/{parent}/{entity}/{entity}_{Frequency}.json`
pub fn entity_file_path(
    root: &Path,
    parent_name: &str,
    entity_name: &str,
    frequency: Frequency,
) -> PathBuf {
    entity_dir(root, parent_name, entity_name).join(series_file_name(entity_name, frequency))
}

/// `{root}/{parent}/{parent}_{Frequency}.json`
pub fn parent_file_path(root: &Path, parent_name: &str, frequency: Frequency) -> PathBuf {
    parent_dir(root, parent_name).join(series_file_name(parent_name, frequency))
}

pub fn manifest_path(dir: &Path) -> PathBuf {
    dir.join(MANIFEST_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_layout() {
        let root = Path::new("Provinsi");
        let path = entity_file_path(root, "BALI", "KABUPATEN BADUNG", Frequency::Monthly);

        assert_eq!(
            path,
            PathBuf::from("Provinsi/BALI/KABUPATEN BADUNG/KABUPATEN BADUNG_Monthly.json")
        );
    }

    #[test]
    fn test_parent_layout() {
        let root = Path::new("out");
        assert_eq!(
            parent_file_path(root, "BALI", Frequency::Yearly),
            PathBuf::from("out/BALI/BALI_Yearly.json")
        );
        assert_eq!(
            manifest_path(&parent_dir(root, "BALI")),
            PathBuf::from("out/BALI/_manifest.json")
        );
    }
}
