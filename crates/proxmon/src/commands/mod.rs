//! Command dispatch: bridges CLI args -> console calls -> output formatting.

pub mod config_cmd;
pub mod groups;
pub mod monitor;
pub mod proxies;
pub mod sessions;
pub mod util;

use proxmon_core::Console;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// What every backend-bound handler gets besides its own args.
pub struct Ctx {
    pub console: Console,
    /// Group (ID or name) from the active profile.
    pub default_group: Option<String>,
    /// Whether stdout gets ANSI colors.
    pub color: bool,
}

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, ctx: &Ctx, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Groups(args) => groups::handle(ctx, args, global).await,
        Command::Proxies(args) => proxies::handle(ctx, args, global).await,
        Command::Monitor(args) => monitor::handle(ctx, args, global).await,
        Command::Sessions(args) => sessions::handle(ctx, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
