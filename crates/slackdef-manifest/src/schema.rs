//! Built-in schema: primitive type tags, Slack type tags, and Slack functions that
//! workflow steps can call without declaring them.

/// Primitive parameter types
pub mod schema_types {
    pub const STRING: &str = "string";
    pub const BOOLEAN: &str = "boolean";
    pub const INTEGER: &str = "integer";
    pub const NUMBER: &str = "number";
    pub const OBJECT: &str = "object";
    pub const ARRAY: &str = "array";
    pub const TIMESTAMP: &str = "timestamp";
}

pub mod slack {
    /// Slack-specific parameter types
    pub mod types {
        pub const USER_ID: &str = "slack#/types/user_id";
        pub const CHANNEL_ID: &str = "slack#/types/channel_id";
        pub const USERGROUP_ID: &str = "slack#/types/usergroup_id";
        pub const TIMESTAMP: &str = "slack#/types/timestamp";
        pub const DATE: &str = "slack#/types/date";
        pub const RICH_TEXT: &str = "slack#/types/rich_text";
        pub const BLOCKS: &str = "slack#/types/blocks";
        pub const MESSAGE_TS: &str = "slack#/types/message_ts";
        pub const INTERACTIVITY: &str = "slack#/types/interactivity";
    }

    pub mod functions {
        use crate::function::{ManifestFunction, SlackFunction};
        use crate::parameters::{ParameterDefinition, ParameterSetDefinition};
        use crate::schema::schema_types;
        use crate::schema::slack::types;
        use std::sync::Arc;

        pub const SEND_MESSAGE: &str = "slack#/functions/send_message";
        pub const REMOVE_USER_FROM_USERGROUP: &str = "slack#/functions/remove_user_from_usergroup";

        pub fn send_message() -> Arc<dyn ManifestFunction> {
            Arc::new(
                SlackFunction::new(SEND_MESSAGE, "")
                    .with_title("Send a message")
                    .with_description("Send a message to a channel")
                    .with_input_parameters(
                        ParameterSetDefinition::new()
                            .with_property(
                                "channel_id",
                                ParameterDefinition::new(types::CHANNEL_ID).with_description("Channel"),
                            )
                            .with_property(
                                "message",
                                ParameterDefinition::new(types::RICH_TEXT).with_description("Message"),
                            )
                            .with_required(["channel_id", "message"]),
                    )
                    .with_output_parameters(
                        ParameterSetDefinition::new().with_property(
                            "message_ts",
                            ParameterDefinition::new(types::MESSAGE_TS).with_description("Message time stamp"),
                        ),
                    ),
            )
        }

        pub fn remove_user_from_usergroup() -> Arc<dyn ManifestFunction> {
            Arc::new(
                SlackFunction::new(REMOVE_USER_FROM_USERGROUP, "")
                    .with_title("Remove user from user group")
                    .with_description("Remove someone from a Slack user group.")
                    .with_input_parameters(
                        ParameterSetDefinition::new()
                            .with_property(
                                "usergroup_id",
                                ParameterDefinition::new(types::USERGROUP_ID).with_description("User group"),
                            )
                            .with_property(
                                "user_ids",
                                ParameterDefinition::new(schema_types::ARRAY)
                                    .with_description("Users to be removed from user group")
                                    .with_items(ParameterDefinition::new(types::USER_ID)),
                            )
                            .with_required(["usergroup_id", "user_ids"]),
                    )
                    .with_output_parameters(
                        ParameterSetDefinition::new().with_property(
                            "usergroup_id",
                            ParameterDefinition::new(types::USERGROUP_ID).with_description("Updated usergroup"),
                        ),
                    ),
            )
        }

        /// Look up a Slack function by its full id
        pub fn lookup(id: &str) -> Option<Arc<dyn ManifestFunction>> {
            match id {
                SEND_MESSAGE => Some(send_message()),
                REMOVE_USER_FROM_USERGROUP => Some(remove_user_from_usergroup()),
                _ => None,
            }
        }
    }
}
