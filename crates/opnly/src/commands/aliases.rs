//! Alias handlers.

use tabled::Tabled;

use opnly_core::{Alias, AliasSummary, Controller, NetworkAlias};

use crate::cli::{AliasesArgs, AliasesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct AliasRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    alias_type: String,
    #[tabled(rename = "Entries")]
    content: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "UUID")]
    uuid: String,
}

impl From<&AliasSummary> for AliasRow {
    fn from(a: &AliasSummary) -> Self {
        Self {
            name: a.name.clone(),
            alias_type: a.alias_type.clone(),
            content: truncate(&a.content.replace('\n', ", "), 48),
            description: a.description.clone(),
            uuid: a.uuid.clone(),
        }
    }
}

#[derive(Tabled)]
struct NetworkAliasRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Description")]
    description: String,
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_owned();
    }
    let cut: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{cut}\u{2026}")
}

fn alias_detail(a: &Alias) -> String {
    let mut lines = vec![
        format!("Name:        {}", a.name),
        format!("UUID:        {}", a.uuid),
        format!(
            "Type:        {}",
            a.metadata.get("type").and_then(|v| v.as_str()).unwrap_or("-")
        ),
        format!(
            "Description: {}",
            if a.description.is_empty() { "-" } else { &a.description }
        ),
        format!("Entries:     {}", a.content.len()),
    ];
    lines.extend(a.content.iter().map(|entry| format!("  {entry}")));
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: AliasesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        AliasesCommand::List => {
            let aliases = controller.aliases().await?;
            let out = output::render_list(
                &global.output,
                &aliases,
                |a| AliasRow::from(a),
                |a| a.uuid.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        AliasesCommand::Networks => {
            let aliases: Vec<NetworkAlias> = controller.network_aliases().await?;
            let out = output::render_list(
                &global.output,
                &aliases,
                |a| NetworkAliasRow {
                    name: a.name.clone(),
                    description: a.description.clone(),
                },
                |a| a.name.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        AliasesCommand::Show { alias } => {
            let uuid = util::resolve_alias(controller, &alias).await?;
            let alias = controller.alias(&uuid).await?;
            print_alias(&alias, global)
        }

        AliasesCommand::Add { alias, entry } => {
            let uuid = util::resolve_alias(controller, &alias).await?;
            let updated = util::with_spinner(
                "Updating alias",
                global.quiet,
                controller.add_alias_entry(&uuid, &entry),
            )
            .await?;
            print_alias(&updated, global)
        }

        AliasesCommand::Remove { alias, entry } => {
            let uuid = util::resolve_alias(controller, &alias).await?;
            let updated = util::with_spinner(
                "Updating alias",
                global.quiet,
                controller.remove_alias_entry(&uuid, &entry),
            )
            .await?;
            print_alias(&updated, global)
        }
    }
}

fn print_alias(alias: &Alias, global: &GlobalOpts) -> Result<(), CliError> {
    let out = output::render_single(&global.output, alias, alias_detail, |a| {
        a.content.join("\n")
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
