pub mod feed;
pub mod notifications;
pub mod search;
pub mod social;

use tavsiyece::ServiceError;

use crate::output::OutputManager;

/// Prints the end-user message and keeps the detailed error for the exit status.
pub(crate) fn report(output: &OutputManager, err: ServiceError) -> anyhow::Error {
    output.error(&err.user_message());
    output.verbose(&format!("{err}"));
    err.into()
}
