use clap::{Args, Subcommand};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Export a table into GIS layers and load them into the project
    Export {
        #[command(flatten)]
        connection: ConnectionArgs,

        #[arg(long, help = "Table to export")]
        table: String,

        #[arg(long, help = "Column holding the x (longitude) coordinate")]
        x_column: String,

        #[arg(long, help = "Column holding the y (latitude) coordinate")]
        y_column: String,

        #[arg(long, help = "Directory the artifacts are written to")]
        output_dir: PathBuf,

        #[arg(long, help = "Write an ESRI shapefile plus a null-subset CSV")]
        shapefile: bool,

        #[arg(long, help = "Write a GeoPackage plus a null-subset table")]
        geopackage: bool,

        #[arg(
            long,
            help = "Exporter identity stamped into every record; defaults to the database user"
        )]
        exported_by: Option<String>,

        #[arg(
            long,
            help = "Project registry file; defaults to project.json in the output directory"
        )]
        project: Option<PathBuf>,

        #[arg(long, help = "If set, prints the run report as JSON instead of a table")]
        json: bool,
    },
    /// Test a connection against the configured database
    TestConn {
        #[command(flatten)]
        connection: ConnectionArgs,
    },
}

#[derive(Args)]
pub struct ConnectionArgs {
    #[arg(long, help = "Database host")]
    pub host: String,

    #[arg(long, default_value_t = 3306, help = "Database port")]
    pub port: u16,

    #[arg(long, help = "Database user")]
    pub user: String,

    #[arg(long, help = "Database password")]
    pub password: String,

    #[arg(long, help = "Database name")]
    pub database: String,
}
