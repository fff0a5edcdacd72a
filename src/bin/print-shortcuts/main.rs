use std::{path::PathBuf, str::FromStr};

use anyhow::Result;
use clap::{Parser, Subcommand};
use print_shortcuts::{pipeline::Action, Config, ExportMode, LocalSlicer, PrintServerKind};
use tracing_subscriber::{fmt::format::FmtSpan, FmtSubscriber};

mod cmd_run;

/// Export, repair, slice and upload 3D models to a print server.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "print-shortcuts")]
struct Cli {
    /// verbosity of logging output [trace, debug, info, warn, error]
    #[arg(long, short, default_value = "info")]
    log_level: String,

    /// Config file to use. Defaults apply when it does not exist.
    #[arg(long, short, default_value = "print-shortcuts.toml")]
    config: PathBuf,

    /// Path of the document the scene belongs to, used to name batch
    /// and merge artifacts.
    #[arg(long, short)]
    document: Option<PathBuf>,

    /// Override the export mode [individual, batch, merge].
    #[arg(long, short)]
    mode: Option<ExportMode>,

    /// Print the resulting scene as JSON after the report.
    #[arg(long)]
    scene: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the given meshes through `slic3r --repair` and import the result.
    Repair {
        /// STL or OBJ files to load and select.
        #[arg(required = true)]
        meshes: Vec<PathBuf>,
    },

    /// Slice the given meshes locally.
    Slice {
        /// Slicer to use [slic3r, curaengine].
        #[arg(long, short)]
        slicer: Option<LocalSlicer>,

        /// STL or OBJ files to load and select.
        #[arg(required = true)]
        meshes: Vec<PathBuf>,
    },

    /// Upload the given meshes to the print server as STL.
    Upload {
        /// Print server to use [octoprint, repetier].
        #[arg(long, short)]
        server: Option<PrintServerKind>,

        /// STL or OBJ files to load and select.
        #[arg(required = true)]
        meshes: Vec<PathBuf>,
    },

    /// Create the configured folder on the print server.
    Mkdir {
        /// Print server to use [octoprint, repetier].
        #[arg(long, short)]
        server: Option<PrintServerKind>,
    },

    /// Download and print the print server's file listing.
    ListFiles {
        /// Print server to use [octoprint, repetier].
        #[arg(long, short)]
        server: Option<PrintServerKind>,
    },

    /// Show a webcam snapshot in the viewport.
    PreviewWebcam {
        /// Print server to use [octoprint, repetier].
        #[arg(long, short)]
        server: Option<PrintServerKind>,
    },

    /// Stream the webcam in the viewport.
    StreamWebcam {
        /// Print server to use [octoprint, repetier].
        #[arg(long, short)]
        server: Option<PrintServerKind>,
    },

    /// Run curl with the configured test arguments.
    CurlTest,
}

const NO_MESHES: &[PathBuf] = &[];

impl Commands {
    /// The action to run and the meshes to load first.
    fn action(&self, config: &Config) -> (Action, &[PathBuf]) {
        let server = |server: &Option<PrintServerKind>| server.unwrap_or(config.misc.preferred_print_server);
        match self {
            Commands::Repair { meshes } => (Action::Repair, meshes.as_slice()),
            Commands::Slice { slicer, meshes } => (
                Action::Slice(slicer.unwrap_or(config.misc.preferred_local_slicer)),
                meshes.as_slice(),
            ),
            Commands::Upload { server: kind, meshes } => (Action::UploadStl(server(kind)), meshes.as_slice()),
            Commands::Mkdir { server: kind } => (Action::MakeDirectory(server(kind)), NO_MESHES),
            Commands::ListFiles { server: kind } => (Action::ListFiles(server(kind)), NO_MESHES),
            Commands::PreviewWebcam { server: kind } => (Action::PreviewWebcam(server(kind)), NO_MESHES),
            Commands::StreamWebcam { server: kind } => (Action::StreamWebcam(server(kind)), NO_MESHES),
            Commands::CurlTest => (Action::CurlTest, NO_MESHES),
        }
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = if cli.config.exists() {
        Config::from_file(&cli.config)?
    } else {
        tracing::debug!(path = format!("{:?}", cli.config), "no config file, using defaults");
        Config::default()
    };
    if let Some(mode) = cli.mode {
        config.export.mode = mode;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_writer(std::io::stderr)
        .with_max_level(tracing::Level::from_str(&cli.log_level)?)
        .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config = load_config(&cli)?;
    let (action, meshes) = cli.command.action(&config);
    cmd_run::main(&cli, config, action, meshes).await
}
