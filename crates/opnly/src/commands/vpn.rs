//! WireGuard VPN handlers.

use std::time::Duration;

use opnly_core::{Controller, Notice, PollUpdate, StatusPoll};

use crate::cli::{GlobalOpts, VpnArgs, VpnCommand};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(
    controller: &Controller,
    args: VpnArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        VpnCommand::Status => {
            let state = controller.vpn_status().await?;
            let color = output::should_color(&global.color);
            let out = output::render_single(
                &global.output,
                &state,
                |s| format!("WireGuard: {}", output::state_label(*s, color)),
                |s| s.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        VpnCommand::On => set(controller, true, global).await,
        VpnCommand::Off => set(controller, false, global).await,

        VpnCommand::Toggle => {
            let outcome =
                util::with_spinner("Toggling VPN", global.quiet, controller.toggle_vpn()).await?;
            util::print_outcome(&outcome, global)
        }

        VpnCommand::Info => {
            let info = controller.vpn_info().await?;
            output::print_output(info.trim_end(), global.quiet);
            Ok(())
        }

        VpnCommand::Watch { count, interval_ms } => {
            let poll = match interval_ms {
                Some(ms) => StatusPoll::spawn(controller.client()?, Duration::from_millis(ms))?,
                None => controller.watch_vpn()?,
            };
            watch(poll, count, global).await
        }
    }
}

async fn set(controller: &Controller, enabled: bool, global: &GlobalOpts) -> Result<(), CliError> {
    let message = if enabled { "Enabling VPN" } else { "Disabling VPN" };
    let outcome = util::with_spinner(message, global.quiet, controller.set_vpn(enabled)).await?;
    util::print_outcome(&outcome, global)
}

/// Print each poll result until `count` updates were seen or Ctrl-C.
async fn watch(
    mut poll: StatusPoll,
    count: Option<usize>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let mut updates = poll.updates();
    let mut seen = 0usize;

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }

        let update = updates.borrow_and_update().clone();
        match update {
            PollUpdate::Pending => continue,
            PollUpdate::Info(info) => output::print_output(info.trim_end(), global.quiet),
            PollUpdate::Failed(e) => output::print_notice(&Notice::from(&e), global.quiet, color),
        }

        seen += 1;
        if count.is_some_and(|n| seen >= n) {
            break;
        }
    }

    poll.stop().await;
    Ok(())
}
