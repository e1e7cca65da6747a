//! Command dispatch: bridges CLI args -> core operations -> output formatting.

pub mod categories;
pub mod config_cmd;
pub mod products;
pub mod util;

use storefront_core::ProductApi;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch an API-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, api: &ProductApi, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Products(args) => products::handle(api, args, global).await,
        // Handled before an API client is built
        Command::Categories | Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
