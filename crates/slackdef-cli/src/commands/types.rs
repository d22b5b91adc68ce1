use crate::commands::resolve_definition_path;
use crate::errors::CommandError;
use crate::GlobalOpts;
use colored::Colorize;
use slackdef_config::Config;
use slackdef_logger as logger;
use slackdef_manifest::{load_definition, ManifestRegistry};
use std::path::PathBuf;

/// List the custom types and functions a definition registers, declared and discovered
pub fn handle_types(definition: Option<PathBuf>, opts: &GlobalOpts) -> Result<(), CommandError> {
    let config = Config::load()?;
    let definition_path = resolve_definition_path(definition, &config)?;
    logger::debug(&format!("Registering {}", definition_path.display()));

    let registry = ManifestRegistry::new(load_definition(&definition_path)?)?;

    println!("{}", "Types:".bold().green());
    if registry.types().is_empty() {
        println!("  {}", "(none)".yellow());
    }
    for custom_type in registry.types() {
        match custom_type.title() {
            Some(title) if opts.verbosity_level() > 0 => {
                println!("  {} {}", custom_type.id().cyan(), format!("({title})").dimmed());
            }
            _ => println!("  {}", custom_type.id().cyan()),
        }
    }

    println!("{}", "Functions:".bold().green());
    if registry.functions().is_empty() {
        println!("  {}", "(none)".yellow());
    }
    for function in registry.functions() {
        println!("  {}", function.id().cyan());
    }

    Ok(())
}
