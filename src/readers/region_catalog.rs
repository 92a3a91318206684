use serde::Deserialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::warn;

use crate::error::Result;
use crate::models::EntityMetadata;
use crate::utils::coordinates::{is_within_indonesia, validate_coordinates, CoordinateValue};

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    properties: FeatureProperties,
}

#[derive(Debug, Deserialize)]
struct FeatureProperties {
    name: String,

    #[serde(default)]
    prov_name: Option<String>,

    #[serde(default)]
    lat: Option<CoordinateValue>,

    #[serde(default, alias = "lon")]
    lng: Option<CoordinateValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntity {
    pub name: String,
    pub parent_name: String,
    /// `(latitude, longitude)`, or `None` when geocoding never resolved this entity
    pub coordinates: Option<(f64, f64)>,
}

impl CatalogEntity {
    pub fn metadata(&self) -> Option<EntityMetadata> {
        self.coordinates.map(|(lat, lng)| {
            EntityMetadata::new(self.name.clone(), self.parent_name.clone(), lat, lng)
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParentRegion {
    pub name: String,
    pub children: Vec<CatalogEntity>,
}

/// Parents (provinces) and their child entities (districts), in catalog order.
#[derive(Debug, Clone, Default)]
pub struct RegionCatalog {
    parents: Vec<ParentRegion>,
}

impl RegionCatalog {
    pub fn from_files(provinces_path: &Path, districts_path: &Path) -> Result<Self> {
        let provinces: FeatureCollection =
            serde_json::from_reader(BufReader::new(File::open(provinces_path)?))?;
        let districts: FeatureCollection =
            serde_json::from_reader(BufReader::new(File::open(districts_path)?))?;
        Ok(Self::build(provinces, districts))
    }

    pub fn from_json(provinces: &str, districts: &str) -> Result<Self> {
        Ok(Self::build(
            serde_json::from_str(provinces)?,
            serde_json::from_str(districts)?,
        ))
    }

    fn build(provinces: FeatureCollection, districts: FeatureCollection) -> Self {
        let mut parents: Vec<ParentRegion> = provinces
            .features
            .into_iter()
            .map(|f| ParentRegion {
                name: f.properties.name,
                children: Vec::new(),
            })
            .collect();
        let known: HashSet<String> = parents.iter().map(|p| p.name.clone()).collect();

        for feature in districts.features {
            let props = feature.properties;
            let Some(parent_name) = props.prov_name.filter(|p| known.contains(p)) else {
                warn!(entity = %props.name, "District has no known province, ignoring");
                continue;
            };

            let coordinates = resolve_coordinates(&props.name, props.lat, props.lng);
            if let Some(parent) = parents.iter_mut().find(|p| p.name == parent_name) {
                parent.children.push(CatalogEntity {
                    name: props.name,
                    parent_name,
                    coordinates,
                });
            }
        }

        Self { parents }
    }

    pub fn parents(&self) -> &[ParentRegion] {
        &self.parents
    }

    pub fn parent(&self, name: &str) -> Option<&ParentRegion> {
        self.parents.iter().find(|p| p.name == name)
    }

    pub fn entity_count(&self) -> usize {
        self.parents.iter().map(|p| p.children.len()).sum()
    }
}

fn resolve_coordinates(
    name: &str,
    lat: Option<CoordinateValue>,
    lng: Option<CoordinateValue>,
) -> Option<(f64, f64)> {
    let (lat, lng) = (lat?, lng?);
    let resolved = lat
        .resolve()
        .and_then(|lat| lng.resolve().map(|lng| (lat, lng)))
        .and_then(|(lat, lng)| validate_coordinates(lat, lng).map(|_| (lat, lng)));

    match resolved {
        Ok((lat, lng)) => {
            if !is_within_indonesia(lat, lng) {
                warn!(entity = %name, lat, lng, "Coordinates fall outside Indonesia");
            }
            Some((lat, lng))
        }
        Err(e) => {
            warn!(entity = %name, error = %e, "Unusable coordinates");
            None
        }
    }
}
