use crate::demo::{run_demo, run_project_import, DemoArgs, ProjectImportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use labcollab::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Lab Collaboration Service",
    about = "Run the lab collaboration backend or exercise its evaluation workflow from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Work with the project catalog
    Projects {
        #[command(subcommand)]
        command: ProjectsCommand,
    },
    /// Walk through the final evaluation lock lifecycle against an in-memory store
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum ProjectsCommand {
    /// Validate a project catalog CSV export and print the parsed entries
    Import(ProjectImportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Seed the project catalog from a CSV export (Project ID,Name,Lab ID)
    #[arg(long)]
    pub(crate) projects_csv: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Projects {
            command: ProjectsCommand::Import(args),
        } => run_project_import(args),
        Command::Demo(args) => run_demo(args),
    }
}
