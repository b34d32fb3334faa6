use crate::layer::{LayerId, MapLayer};

/// The host application's project surface, as the pipeline consumes it:
/// list layers by display name, remove one by id, add a new one. The real
/// GIS host is an opaque collaborator behind this trait; `MapProject` is
/// the registry this tool ships for CLI runs and tests.
pub trait ProjectHost {
    fn find_layers_by_name(&self, name: &str) -> Vec<LayerId>;

    fn remove_layer(&mut self, id: &LayerId);

    fn add_layer(&mut self, layer: MapLayer) -> LayerId;
}
