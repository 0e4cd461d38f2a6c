//! Rule bookmark handlers.

use tabled::Tabled;

use opnly_core::{Controller, Notice, RemoteRule, RuleView};

use crate::cli::{GlobalOpts, RulesArgs, RulesCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct RuleRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "UUID")]
    uuid: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Checked")]
    fetched_at: String,
}

fn rule_row(view: &RuleView, color: bool) -> RuleRow {
    RuleRow {
        name: view.bookmark.name.clone(),
        uuid: view.bookmark.uuid.clone(),
        state: output::state_label(view.state, color),
        fetched_at: view.fetched_at.format("%H:%M:%S").to_string(),
    }
}

#[derive(Tabled)]
struct RemoteRuleRow {
    #[tabled(rename = "UUID")]
    uuid: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "State")]
    state: String,
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: RulesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color);

    match args.command {
        RulesCommand::List => {
            let listing =
                util::with_spinner("Fetching rules", global.quiet, controller.list_rules())
                    .await?;
            let out = output::render_list(
                &global.output,
                &listing.rows,
                |v| rule_row(v, color),
                |v| format!("{}\t{}", v.bookmark.uuid, v.state),
            )?;
            output::print_output(&out, global.quiet);

            // Rows are still shown; the failure is reported once.
            if let Some(failure) = listing.failure {
                let mut notice = Notice::from(&failure.first);
                if failure.failed > 1 {
                    notice.text = format!(
                        "{} ({} of {} rules could not be checked)",
                        notice.text,
                        failure.failed,
                        listing.rows.len()
                    );
                }
                output::print_notice(&notice, global.quiet, color);
            }
            Ok(())
        }

        RulesCommand::Remote => {
            let rules: Vec<RemoteRule> = controller.remote_rules().await?;
            let out = output::render_list(
                &global.output,
                &rules,
                |r| RemoteRuleRow {
                    uuid: r.uuid.clone(),
                    description: r.description.clone(),
                    state: output::state_label(r.enabled, color),
                },
                |r| r.uuid.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        RulesCommand::Add { name, uuid } => {
            let bookmark = controller.bookmarks().upsert(&name, &uuid)?;
            let out = output::render_single(
                &global.output,
                &bookmark,
                |b| format!("Bookmarked '{}' ({})", b.name, b.uuid),
                |b| b.uuid.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        RulesCommand::Remove { rule } => {
            let uuid = util::resolve_rule(controller, &rule)?;
            if !controller.bookmarks().remove(&uuid)? {
                return Err(CliError::NotFound {
                    resource_type: "bookmark".into(),
                    identifier: rule,
                    list_command: "rules list".into(),
                });
            }
            if !global.quiet {
                eprintln!("Bookmark removed");
            }
            Ok(())
        }

        RulesCommand::Toggle { rule } => {
            let uuid = util::resolve_rule(controller, &rule)?;
            let outcome =
                util::with_spinner("Toggling rule", global.quiet, controller.toggle_rule(&uuid))
                    .await?;
            util::print_outcome(&outcome, global)
        }

        RulesCommand::Import { file } => {
            let entries = util::read_bookmark_file(&file)?;
            let written = controller
                .bookmarks()
                .import(entries.iter().map(|e| (e.name.as_str(), e.uuid.as_str())))?;
            if !global.quiet {
                eprintln!("Imported {written} of {} bookmarks", entries.len());
            }
            Ok(())
        }
    }
}
