//! ARP table handlers.

use tabled::Tabled;

use opnly_core::{ArpEntry, Controller};

use crate::cli::{ArpArgs, ArpCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct ArpRow {
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Hostname")]
    hostname: String,
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Interface")]
    interface: String,
    #[tabled(rename = "Manufacturer")]
    manufacturer: String,
}

impl From<&ArpEntry> for ArpRow {
    fn from(e: &ArpEntry) -> Self {
        let interface = if e.intf_description.is_empty() {
            e.interface.clone()
        } else {
            format!("{} ({})", e.interface, e.intf_description)
        };
        Self {
            ip: e.ip.clone(),
            hostname: e.hostname.clone(),
            mac: e.mac.clone(),
            interface,
            manufacturer: e.manufacturer.clone(),
        }
    }
}

pub async fn handle(
    controller: &Controller,
    args: ArpArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ArpCommand::List => {
            let entries = controller.arp_table().await?;
            print_entries(&entries, global)
        }

        ArpCommand::Flush => {
            if !util::confirm("Flush the firewall's ARP table?", "arp flush", global.yes)? {
                return Ok(());
            }
            let report =
                util::with_spinner("Flushing ARP table", global.quiet, controller.flush_arp())
                    .await?;
            if !global.quiet {
                eprintln!("Flushed {} entries", report.flushed.len());
            }
            print_entries(&report.entries, global)
        }
    }
}

fn print_entries(entries: &[ArpEntry], global: &GlobalOpts) -> Result<(), CliError> {
    let out = output::render_list(&global.output, entries, |e| ArpRow::from(e), |e| e.ip.clone())?;
    output::print_output(&out, global.quiet);
    Ok(())
}
