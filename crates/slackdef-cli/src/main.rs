use clap::{Parser, Subcommand};
use slackdef::{
    commands::{
        build::{self, BuildCommand},
        config::{self, ConfigAction},
        init, types,
    },
    init_tracing, GlobalOpts,
};
use slackdef_logger as logger;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "slackdef")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Slack app manifest builder",
    long_about = "slackdef builds Slack app manifests from declarative JSON, TOML or YAML definitions."
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a manifest from a definition file
    Build(BuildCommand),
    /// List the custom types and functions a definition registers
    Types {
        /// Definition file; defaults to the configured `default-definition`
        definition: Option<PathBuf>,
    },
    /// Write a starter definition file
    Init {
        /// Optional filename for the definition (default: manifest.yaml)
        file: Option<String>,
    },
    /// Configure slackdef
    #[command(subcommand_required = false, arg_required_else_help = false)]
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logger::init_with_verbosity(cli.global.verbosity_level(), cli.global.quiet) {
        eprintln!("Warning: Failed to initialize logger: {}", e);
    }
    init_tracing();

    let result = match cli.command {
        Commands::Build(cmd) => build::handle_build(cmd, &cli.global),
        Commands::Types { definition } => types::handle_types(definition, &cli.global),
        Commands::Init { file } => init::handle_init(file, &cli.global),
        Commands::Config { action } => config::handle_config(action, &cli.global),
    };

    if let Err(e) = result {
        logger::error(&e.to_string());
        if cli.global.verbosity_level() > 0 {
            logger::show_log_path();
        }
        std::process::exit(1);
    }
}
