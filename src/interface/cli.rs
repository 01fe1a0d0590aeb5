use crate::interface::config::{BindConfig, DEFAULT_CONFIG_FILE};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ui-autobind", version)]
#[command(about = "Bind UI nodes to generated fields by naming convention")]
pub struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long = "config", default_value = DEFAULT_CONFIG_FILE, global = true)]
    pub config_file: PathBuf,

    /// Verbose output
    #[arg(long, global = true, action = clap::ArgAction::SetTrue)]
    pub verbose: bool,

    /// Print results as JSON; log lines go to stderr only
    #[arg(long, global = true, action = clap::ArgAction::SetTrue)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone)]
pub struct SceneArgs {
    /// Scene document (JSON)
    #[arg(short = 's', long = "scene")]
    pub scene: PathBuf,

    /// Restrict the run to these containers (repeatable); all containers by default
    #[arg(long = "container")]
    pub containers: Vec<String>,
}

/// Overrides for the `generation` section of the configuration file
#[derive(Args, Debug, Clone, Default)]
pub struct GenerationArgs {
    /// Directory receiving one sub-directory per generated class
    #[arg(short = 'o', long = "base-path")]
    pub base_path: Option<String>,

    /// Namespace of generated classes
    #[arg(short = 'n', long = "namespace")]
    pub namespace: Option<String>,

    /// Emit one file per class with a manual region instead of partial classes
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub single_file: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a default configuration file
    Init {
        /// Overwrite an existing configuration
        #[arg(long, action = clap::ArgAction::SetTrue)]
        force: bool,
    },
    /// Add bindings for nodes whose names match the naming rules
    Resolve {
        #[command(flatten)]
        scene: SceneArgs,

        /// Report what would be added without saving the scene
        #[arg(long, action = clap::ArgAction::SetTrue)]
        dry_run: bool,
    },
    /// Write the generated source files for each container
    Generate {
        #[command(flatten)]
        scene: SceneArgs,

        #[command(flatten)]
        generation: GenerationArgs,
    },
    /// Attach compiled generated types and assign their fields
    Bind {
        #[command(flatten)]
        scene: SceneArgs,

        #[command(flatten)]
        generation: GenerationArgs,

        /// How long to wait for the generated types to appear, in milliseconds
        #[arg(long = "wait-ms", default_value_t = 0)]
        wait_ms: u64,

        /// Interval between checks while waiting, in milliseconds
        #[arg(long = "poll-ms", default_value_t = 250)]
        poll_ms: u64,
    },
    /// Check bound fields against the compiled generated types
    Validate {
        #[command(flatten)]
        scene: SceneArgs,

        #[command(flatten)]
        generation: GenerationArgs,
    },
    /// List or search the bindable capability types
    Types {
        /// Substring to search for
        query: Option<String>,

        /// Also offer the capability types used in this scene
        #[arg(short = 's', long = "scene")]
        scene: Option<PathBuf>,
    },
}

impl Commands {
    pub fn generation_args(&self) -> Option<&GenerationArgs> {
        match self {
            Commands::Generate { generation, .. }
            | Commands::Bind { generation, .. }
            | Commands::Validate { generation, .. } => Some(generation),
            _ => None,
        }
    }
}

impl From<&GenerationArgs> for BindConfig {
    fn from(args: &GenerationArgs) -> Self {
        let mut config = BindConfig::default();
        if let Some(base_path) = &args.base_path {
            config.generation.base_path = base_path.clone();
        }
        if let Some(namespace) = &args.namespace {
            config.generation.namespace = namespace.clone();
        }
        if args.single_file {
            config.generation.use_partial_class = false;
        }
        config
    }
}

impl From<&Cli> for BindConfig {
    /// Command line overrides, to be merged over the file configuration
    fn from(cli: &Cli) -> Self {
        let mut config = cli
            .command
            .generation_args()
            .map(BindConfig::from)
            .unwrap_or_default();
        if cli.verbose {
            config.verbose = Some(true);
        }
        config
    }
}
