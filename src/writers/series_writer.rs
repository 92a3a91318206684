use serde::Serialize;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;
use validator::Validate;

use crate::error::{ProcessingError, Result};
use crate::models::{
    EntityMetadata, EntityRecord, Frequency, FrequencySeries, Manifest, ParentAggregateRecord,
};
use crate::utils::paths::{
    entity_dir, entity_file_path, manifest_path, parent_dir, parent_file_path, series_file_name,
};

/// Persists entity and parent series under `{root}/{parent}/...`.
pub struct SeriesWriter {
    root: PathBuf,
}

impl SeriesWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Write the three frequency files of one entity, then its manifest.
    ///
    /// Coordinates must already be resolved; an entity with out-of-range metadata is
    /// rejected before anything touches the disk.
    pub fn write_entity(
        &self,
        metadata: &EntityMetadata,
        series: &FrequencySeries,
    ) -> Result<Vec<PathBuf>> {
        metadata.validate()?;

        let dir = entity_dir(&self.root, &metadata.parent_name, &metadata.entity_name);
        fs::create_dir_all(&dir)?;

        let mut written = Vec::with_capacity(Frequency::ALL.len());
        for frequency in Frequency::ALL {
            let record = EntityRecord::new(metadata, series.get(frequency).clone());
            let path = entity_file_path(
                &self.root,
                &metadata.parent_name,
                &metadata.entity_name,
                frequency,
            );
            write_json_atomic(&path, &record)?;
            written.push(path);
        }

        let manifest = Manifest::entity(
            &metadata.entity_name,
            file_names(&metadata.entity_name),
        );
        write_json_atomic(&manifest_path(&dir), &manifest)?;

        debug!(
            entity = %metadata.entity_name,
            parent = %metadata.parent_name,
            "Wrote entity series"
        );
        Ok(written)
    }

    /// Write the three aggregate files of a parent, then its manifest listing the children.
    pub fn write_aggregate(
        &self,
        parent_name: &str,
        children: &[String],
        series: &FrequencySeries,
    ) -> Result<Vec<PathBuf>> {
        if parent_name.is_empty() {
            return Err(ProcessingError::InvalidFormat(
                "Parent name must not be empty".to_string(),
            ));
        }

        let dir = parent_dir(&self.root, parent_name);
        fs::create_dir_all(&dir)?;

        let mut written = Vec::with_capacity(Frequency::ALL.len());
        for frequency in Frequency::ALL {
            let record = ParentAggregateRecord::new(
                parent_name,
                children.len(),
                series.get(frequency).clone(),
            );
            let path = parent_file_path(&self.root, parent_name, frequency);
            write_json_atomic(&path, &record)?;
            written.push(path);
        }

        let manifest = Manifest::aggregate(parent_name, file_names(parent_name), children.to_vec());
        write_json_atomic(&manifest_path(&dir), &manifest)?;

        debug!(parent = %parent_name, children = children.len(), "Wrote aggregate series");
        Ok(written)
    }
}

fn file_names(name: &str) -> Vec<String> {
    Frequency::ALL
        .iter()
        .map(|f| series_file_name(name, *f))
        .collect()
}

/// Serialise as two-space indented JSON into a sibling temp file, then rename it over `path`.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let dir = path.parent().ok_or_else(|| {
        ProcessingError::InvalidFormat(format!("No parent directory for {}", path.display()))
    })?;

    let mut temp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.flush()?;
    }
    temp.persist(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MeasurementSeries, SeriesFile};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn badung() -> EntityMetadata {
        EntityMetadata::new(
            "KABUPATEN BADUNG".to_string(),
            "BALI".to_string(),
            -8.58,
            115.18,
        )
    }

    fn sample_series() -> FrequencySeries {
        FrequencySeries {
            daily: MeasurementSeries::new(vec!["2020-01-01".into(), "2020-01-02".into()])
                .with_parameter("shortwave_radiation", vec![Some(210.0), Some(190.5)]),
            monthly: MeasurementSeries::new(vec!["2020-01".into()])
                .with_parameter("shortwave_radiation", vec![Some(200.25)]),
            yearly: MeasurementSeries::new(vec!["2020".into()])
                .with_parameter("shortwave_radiation", vec![Some(200.25)]),
        }
    }

    #[test]
    fn test_entity_files_written() {
        let temp_dir = TempDir::new().unwrap();
        let writer = SeriesWriter::new(temp_dir.path());

        let written = writer.write_entity(&badung(), &sample_series()).unwrap();
        assert_eq!(written.len(), 3);

        let daily_path = temp_dir
            .path()
            .join("BALI/KABUPATEN BADUNG/KABUPATEN BADUNG_Daily.json");
        let record: EntityRecord =
            serde_json::from_str(&fs::read_to_string(&daily_path).unwrap()).unwrap();

        assert_eq!(record.entity_name, "KABUPATEN BADUNG");
        assert_eq!(record.parent_name, "BALI");
        assert_eq!(record.data, sample_series().daily);

        let manifest: Manifest = serde_json::from_str(
            &fs::read_to_string(temp_dir.path().join("BALI/KABUPATEN BADUNG/_manifest.json"))
                .unwrap(),
        )
        .unwrap();
        assert_eq!(
            manifest.files,
            vec![
                "KABUPATEN BADUNG_Daily.json",
                "KABUPATEN BADUNG_Monthly.json",
                "KABUPATEN BADUNG_Yearly.json"
            ]
        );
    }

    #[test]
    fn test_entity_json_key_order() {
        let temp_dir = TempDir::new().unwrap();
        let writer = SeriesWriter::new(temp_dir.path());
        writer.write_entity(&badung(), &sample_series()).unwrap();

        let text = fs::read_to_string(
            temp_dir
                .path()
                .join("BALI/KABUPATEN BADUNG/KABUPATEN BADUNG_Yearly.json"),
        )
        .unwrap();

        let positions: Vec<usize> = ["entity_name", "parent_name", "latitude", "longitude", "data", "time"]
            .iter()
            .map(|key| text.find(&format!("\"{}\"", key)).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(text.contains("\n  \"entity_name\""));
    }

    #[test]
    fn test_rewrite_is_byte_identical() {
        let temp_dir = TempDir::new().unwrap();
        let writer = SeriesWriter::new(temp_dir.path());
        let path = temp_dir
            .path()
            .join("BALI/KABUPATEN BADUNG/KABUPATEN BADUNG_Monthly.json");

        writer.write_entity(&badung(), &sample_series()).unwrap();
        let first = fs::read(&path).unwrap();
        writer.write_entity(&badung(), &sample_series()).unwrap();
        let second = fs::read(&path).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_unresolved_coordinates_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let writer = SeriesWriter::new(temp_dir.path());
        let mut metadata = badung();
        metadata.longitude = 200.0;

        assert!(writer.write_entity(&metadata, &sample_series()).is_err());
        assert!(!temp_dir.path().join("BALI").exists());
    }

    #[test]
    fn test_aggregate_files_written() {
        let temp_dir = TempDir::new().unwrap();
        let writer = SeriesWriter::new(temp_dir.path());
        let children = vec!["A".to_string(), "B".to_string()];

        writer
            .write_aggregate("BALI", &children, &sample_series())
            .unwrap();

        let text = fs::read_to_string(temp_dir.path().join("BALI/BALI_Monthly.json")).unwrap();
        match serde_json::from_str::<SeriesFile>(&text).unwrap() {
            SeriesFile::Aggregate(record) => {
                assert_eq!(record.parent_name, "BALI");
                assert_eq!(record.num_children, 2);
                assert!(record.aggregated);
            }
            other => panic!("expected aggregate record, got {:?}", other),
        }
    }
}
