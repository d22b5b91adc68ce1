//! Projection of remote-only options onto an assembled manifest
//!
//! Every copy is conditional: an option that was not given leaves the output field
//! unset. `function_runtime` is the only setting that always carries a value.

use crate::definition::RemoteOptions;
use crate::types::{ManifestSchema, SettingsSchema};
use tracing::debug;

fn copy_if_defined<T: Clone>(target: &mut Option<T>, source: Option<&T>) {
    if let Some(value) = source {
        *target = Some(value.clone());
    }
}

pub(crate) fn assign_remote_properties(manifest: &mut ManifestSchema, options: &RemoteOptions) {
    let function_runtime = manifest.settings.function_runtime;
    let base = options.settings.clone().unwrap_or_default();

    manifest.settings = SettingsSchema {
        allowed_ip_address_ranges: base.allowed_ip_address_ranges,
        incoming_webhooks: base.incoming_webhooks,
        interactivity: base.interactivity,
        org_deploy_enabled: base.org_deploy_enabled,
        siws_links: base.siws_links,
        function_runtime,
        ..Default::default()
    };

    let settings = &mut manifest.settings;
    copy_if_defined(&mut settings.event_subscriptions, options.event_subscriptions.as_ref());
    copy_if_defined(&mut settings.socket_mode_enabled, options.socket_mode_enabled.as_ref());
    copy_if_defined(&mut settings.token_rotation_enabled, options.token_rotation_enabled.as_ref());

    copy_if_defined(&mut manifest.app_directory, options.app_directory.as_ref());

    let oauth = &mut manifest.oauth_config;
    copy_if_defined(&mut oauth.scopes.user, options.user_scopes.as_ref());
    copy_if_defined(&mut oauth.redirect_urls, options.redirect_urls.as_ref());
    copy_if_defined(&mut oauth.token_management_enabled, options.token_management_enabled.as_ref());

    if let Some(features) = &options.features {
        let target = &mut manifest.features;
        copy_if_defined(
            &mut target.bot_user.always_online,
            features.bot_user.as_ref().and_then(|bot| bot.always_online.as_ref()),
        );
        copy_if_defined(&mut target.shortcuts, features.shortcuts.as_ref());
        copy_if_defined(&mut target.slash_commands, features.slash_commands.as_ref());
        copy_if_defined(&mut target.unfurl_domains, features.unfurl_domains.as_ref());
        copy_if_defined(&mut target.workflow_steps, features.workflow_steps.as_ref());
    }

    debug!("Applied remote projection");
}
