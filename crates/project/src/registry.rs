use crate::{
    error::ProjectError,
    host::ProjectHost,
    layer::{LayerId, MapLayer},
};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

/// The active project's layer list, persisted as JSON next to the
/// exported artifacts. Insertion order is the display order.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct MapProject {
    layers: Vec<(LayerId, MapLayer)>,

    #[serde(skip)]
    path: Option<PathBuf>,
}

impl MapProject {
    pub fn in_memory() -> Self {
        MapProject::default()
    }

    /// Opens an existing project file, or starts an empty project bound
    /// to `path`.
    pub fn load_or_default(path: &Path) -> Result<Self, ProjectError> {
        let mut project = if path.exists() {
            serde_json::from_str::<MapProject>(&fs::read_to_string(path)?)?
        } else {
            MapProject::default()
        };
        project.path = Some(path.to_path_buf());
        Ok(project)
    }

    /// Writes the registry back to the file it was loaded from. A purely
    /// in-memory project saves nowhere and returns Ok.
    pub fn save(&self) -> Result<(), ProjectError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        debug!("Saved project with {} layers to {}", self.layers.len(), path.display());
        Ok(())
    }

    pub fn layers(&self) -> impl Iterator<Item = &MapLayer> {
        self.layers.iter().map(|(_, layer)| layer)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl ProjectHost for MapProject {
    fn find_layers_by_name(&self, name: &str) -> Vec<LayerId> {
        self.layers
            .iter()
            .filter(|(_, layer)| layer.name == name)
            .map(|(id, _)| id.clone())
            .collect()
    }

    fn remove_layer(&mut self, id: &LayerId) {
        self.layers.retain(|(layer_id, _)| layer_id != id);
    }

    fn add_layer(&mut self, layer: MapLayer) -> LayerId {
        let id = LayerId::new();
        self.layers.push((id.clone(), layer));
        id
    }
}
