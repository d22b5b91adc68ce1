//! slackdef command-line interface
//!
//! Commands live in [`commands`]; each returns a [`CommandError`] that `main`
//! reports before exiting with status 1.

pub mod commands;
pub mod common;
pub mod errors;

pub use common::GlobalOpts;
pub use errors::CommandError;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the tracing subscriber. `RUST_LOG` wins over the `-v` count.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| slackdef_logger::verbosity_to_filter().into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr),
        )
        .try_init();
}
