use crate::errors::CommandError;
use crate::GlobalOpts;
use slackdef_logger as logger;
use std::fs;
use std::path::Path;

const DEFAULT_FILENAME: &str = "manifest.yaml";

const DEFINITION_TEMPLATE: &str = r##"# slackdef app definition
# Build the manifest with: slackdef build manifest.yaml -o manifest.json

name: My App
description: A short description of what the app does
icon: assets/icon.png
bot_scopes:
  - chat:write

# Omit or set to true for Slack hosted apps; false for remote apps
slack_hosted: true
outgoing_domains: []

features:
  app_home:
    home_tab_enabled: false

# Custom types are referenced from parameters as "#/types/<name or callback_id>"
types:
  - name: priority
    type: string
    enum: [low, medium, high]

functions:
  - callback_id: create_ticket
    title: Create ticket
    source_file: functions/create_ticket.ts
    input_parameters:
      properties:
        summary:
          type: string
        priority:
          type: "#/types/priority"
      required: [summary]
    output_parameters:
      properties:
        ticket_id:
          type: string

workflows:
  - callback_id: file_ticket
    title: File a ticket
    input_parameters:
      properties:
        summary:
          type: string
        channel:
          type: slack#/types/channel_id
    steps:
      - function_id: create_ticket
        inputs:
          summary: "{{inputs.summary}}"
      - function_id: slack#/functions/send_message
        inputs:
          channel_id: "{{inputs.channel}}"
          message: "Ticket {{steps.0.ticket_id}} created"
"##;

/// Write a starter definition file, refusing to overwrite an existing one
pub fn handle_init(filename: Option<String>, _opts: &GlobalOpts) -> Result<(), CommandError> {
    logger::debug("Handling init command");

    let target_filename = filename.unwrap_or_else(|| DEFAULT_FILENAME.to_string());
    let target_path = Path::new(&target_filename);

    if target_path.exists() {
        return Err(CommandError::FileExists(target_filename));
    }

    fs::write(target_path, DEFINITION_TEMPLATE)?;
    logger::success(&format!("Created {}", target_filename));
    Ok(())
}
