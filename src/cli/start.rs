use crate::cli::{
    actions::Action,
    commands::{self, logging},
    dispatch,
    globals::GlobalArgs,
    telemetry,
};
use anyhow::Result;

/// Parse the command line, set up logging, and resolve the action to run.
///
/// # Errors
///
/// Returns an error if telemetry cannot be initialized or the arguments do not map to an action
pub fn start() -> Result<(Action, GlobalArgs)> {
    let matches = commands::new().get_matches();

    telemetry::init(logging::level(&matches))?;

    dispatch::handler(&matches)
}
