use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerId(Uuid);

impl LayerId {
    pub fn new() -> Self {
        LayerId(Uuid::new_v4())
    }
}

impl Default for LayerId {
    fn default() -> Self {
        Self::new()
    }
}

/// Where a layer's data lives on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LayerSource {
    Shapefile(PathBuf),
    GeoPackage { path: PathBuf, layer: String },
    Csv(PathBuf),
}

impl LayerSource {
    /// The host-application source string for this layer, in the
    /// `file.gpkg|layername=...` convention GIS hosts use.
    pub fn source_string(&self) -> String {
        match self {
            LayerSource::Shapefile(path) | LayerSource::Csv(path) => path.display().to_string(),
            LayerSource::GeoPackage { path, layer } => {
                format!("{}|layername={layer}", path.display())
            }
        }
    }
}

/// One entry in the active project's layer list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapLayer {
    pub name: String,
    pub source: LayerSource,
}

impl MapLayer {
    pub fn new(name: &str, source: LayerSource) -> Self {
        MapLayer {
            name: name.to_string(),
            source,
        }
    }
}
