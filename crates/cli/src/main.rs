use crate::{
    commands::{Commands, ConnectionArgs},
    error::CliError,
};
use clap::Parser;
use connectors::probe::{ConnectionPinger, MySqlConnectionPinger};
use engine::{
    pipeline,
    session::{ExportOptions, ExportSession},
};
use model::spec::{ConnectionConfig, TableSpec};
use project::registry::MapProject;
use tracing::Level;

mod commands;
mod error;
mod output;

#[derive(Parser)]
#[command(
    name = "geolift",
    version = "0.1.0",
    about = "Exports database tables as GIS layers"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    // Initialize logger
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Export {
            connection,
            table,
            x_column,
            y_column,
            output_dir,
            shapefile,
            geopackage,
            exported_by,
            project,
            json,
        } => {
            let session = ExportSession {
                connection: connection_config(connection),
                table: TableSpec::new(&table, &x_column, &y_column),
                options: ExportOptions {
                    output_dir: output_dir.clone(),
                    shapefile,
                    geopackage,
                    exported_by,
                },
            };

            let project_path = project.unwrap_or_else(|| output_dir.join("project.json"));
            let mut project = MapProject::load_or_default(&project_path)?;

            let report = pipeline::run(&session, &mut project).await?;
            project.save()?;

            output::print_report(&report, json)?;
        }
        Commands::TestConn { connection } => {
            let pinger = MySqlConnectionPinger {
                config: connection_config(connection),
            };
            pinger.ping().await?;
            println!("Connection OK");
        }
    }

    Ok(())
}

fn connection_config(args: ConnectionArgs) -> ConnectionConfig {
    ConnectionConfig {
        host: args.host,
        port: args.port,
        user: args.user,
        password: args.password,
        database: args.database,
    }
}
