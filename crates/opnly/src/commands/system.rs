//! Probe and reboot handlers.

use opnly_core::Controller;

use crate::cli::GlobalOpts;
use crate::error::CliError;

use super::util;

pub async fn probe(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    util::with_spinner("Contacting firewall", global.quiet, controller.probe()).await?;
    if !global.quiet {
        eprintln!("Firewall reachable");
    }
    Ok(())
}

pub async fn reboot(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    if !util::confirm("Reboot the firewall?", "reboot", global.yes)? {
        return Ok(());
    }
    let outcome = controller.reboot().await?;
    util::print_outcome(&outcome, global)
}
