use crate::commands::resolve_definition_path;
use crate::errors::CommandError;
use crate::GlobalOpts;
use clap::Args;
use slackdef_config::Config;
use slackdef_logger as logger;
use slackdef_manifest::{build_manifest, load_definition, to_json_string, write_to_path};
use std::io::Write;
use std::path::PathBuf;

#[derive(Args, Debug, Clone)]
pub struct BuildCommand {
    /// Definition file (.json, .toml, .yaml); defaults to the configured `default-definition`
    pub definition: Option<PathBuf>,

    /// Write the manifest here instead of the configured `output-path` or stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Emit single-line JSON
    #[arg(long)]
    pub compact: bool,
}

pub fn handle_build(cmd: BuildCommand, _opts: &GlobalOpts) -> Result<(), CommandError> {
    let config = Config::load()?;
    let definition_path = resolve_definition_path(cmd.definition, &config)?;
    logger::debug(&format!("Building manifest from {}", definition_path.display()));

    let definition = load_definition(&definition_path)?;
    logger::step(&format!("Assembling manifest for '{}'", definition.name));
    let manifest = build_manifest(definition)?;
    let pretty = !cmd.compact && config.pretty_output();

    match cmd.output.or_else(|| config.output_path.as_ref().map(PathBuf::from)) {
        Some(output_path) => {
            write_to_path(&manifest, &output_path, pretty)?;
            logger::success(&format!(
                "Wrote manifest for '{}' to {}",
                manifest.display_information.name,
                output_path.display()
            ));
        }
        None => {
            let content = to_json_string(&manifest, pretty)?;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            stdout.flush()?;
        }
    }

    Ok(())
}
