//! Command dispatch: bridges CLI args -> core operations -> output formatting.

pub mod aliases;
pub mod arp;
pub mod config_cmd;
pub mod rules;
pub mod setup;
pub mod system;
pub mod util;
pub mod vpn;

use opnly_core::Controller;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a database-bound command to its handler.
///
/// Everything except `setup` passes the login gate first.
pub async fn dispatch(
    cmd: Command,
    controller: &Controller,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let cmd = match cmd {
        Command::Setup(args) => return setup::handle(controller, args, global).await,
        other => other,
    };

    let login = util::unlock(controller, global)?;

    match cmd {
        Command::Passwd(args) => setup::passwd(controller, args, login.as_ref(), global),
        Command::Probe => system::probe(controller, global).await,
        Command::Rules(args) => rules::handle(controller, args, global).await,
        Command::Vpn(args) => vpn::handle(controller, args, global).await,
        Command::Aliases(args) => aliases::handle(controller, args, global).await,
        Command::Arp(args) => arp::handle(controller, args, global).await,
        Command::Reboot => system::reboot(controller, global).await,
        Command::Setup(_) | Command::Config(_) | Command::Completions(_) => Err(
            CliError::Internal("command is handled before dispatch".into()),
        ),
    }
}
