use crate::{report::RunReport, session::ExportOptions};
use exporters::artifact::ArtifactPaths;
use project::{
    host::ProjectHost,
    layer::{LayerSource, MapLayer},
    probe,
};
use tracing::{error, info, warn};

/// One layer the run intends to load: display name, source, and whether
/// the backing artifact is conditional (the null-subset outputs only
/// exist when there were null-coordinate rows).
#[derive(Debug, Clone)]
pub struct LayerPlan {
    pub name: String,
    pub source: LayerSource,
    pub optional: bool,
}

/// Every layer this run's format flags call for, spatial layers first,
/// in load order.
pub fn layer_plans(paths: &ArtifactPaths, options: &ExportOptions) -> Vec<LayerPlan> {
    let table = paths.table();
    let geometry_name = format!("{table} Geometry");
    let null_name = format!("{table} No Geometry");

    let mut plans = Vec::new();
    if options.shapefile {
        plans.push(LayerPlan {
            name: geometry_name.clone(),
            source: LayerSource::Shapefile(paths.shapefile()),
            optional: false,
        });
    }
    if options.geopackage {
        plans.push(LayerPlan {
            name: geometry_name,
            source: LayerSource::GeoPackage {
                path: paths.geopackage(),
                layer: paths.points_layer(),
            },
            optional: false,
        });
    }
    if options.shapefile {
        plans.push(LayerPlan {
            name: null_name.clone(),
            source: LayerSource::Csv(paths.null_csv()),
            optional: true,
        });
    }
    if options.geopackage {
        plans.push(LayerPlan {
            name: null_name,
            source: LayerSource::GeoPackage {
                path: paths.geopackage(),
                layer: paths.null_table(),
            },
            optional: true,
        });
    }
    plans
}

/// Loads each planned layer into the project: validate the source,
/// remove any same-named layer, add the new one. An invalid layer is
/// reported and the remaining loads continue.
pub fn load_layers(host: &mut dyn ProjectHost, plans: Vec<LayerPlan>, report: &mut RunReport) {
    for plan in plans {
        let source_string = plan.source.source_string();

        if plan.optional && !probe::artifact_present(&plan.source) {
            report.layer_skipped(&plan.name, &source_string, "artifact was not produced");
            continue;
        }

        match probe::validate(&plan.source) {
            Ok(()) => {
                let stale = host.find_layers_by_name(&plan.name);
                if !stale.is_empty() {
                    warn!("Replacing {} existing layer(s) named '{}'", stale.len(), plan.name);
                }
                for id in stale {
                    host.remove_layer(&id);
                }
                host.add_layer(MapLayer::new(&plan.name, plan.source.clone()));
                info!("Loaded layer '{}' from {source_string}", plan.name);
                report.layer_loaded(&plan.name, &source_string);
            }
            Err(err) => {
                error!("Failed to load layer '{}': {err}", plan.name);
                report.layer_failed(&plan.name, &source_string, &err);
            }
        }
    }
}
