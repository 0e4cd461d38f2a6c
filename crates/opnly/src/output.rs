//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one identifier per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use opnly_core::{Notice, NoticeLevel, RuleState};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// A rule or VPN state, colored when enabled.
pub fn state_label(state: RuleState, color: bool) -> String {
    let label = match state {
        RuleState::Enabled => "enabled",
        RuleState::Disabled => "disabled",
        RuleState::Unknown => "unknown",
    };
    if !color {
        return label.to_owned();
    }
    match state {
        RuleState::Enabled => label.green().to_string(),
        RuleState::Disabled => label.red().to_string(),
        RuleState::Unknown => label.yellow().to_string(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Ok(render_table(&rows))
        }
        OutputFormat::Json => Ok(serde_json::to_string_pretty(data)?),
        OutputFormat::JsonCompact => Ok(serde_json::to_string(data)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(data)?),
        OutputFormat::Plain => Ok(data.iter().map(&id_fn).collect::<Vec<_>>().join("\n")),
    }
}

/// Render a single item. Table mode uses the pre-formatted `detail_fn`.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table => Ok(detail_fn(data)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(data)?),
        OutputFormat::JsonCompact => Ok(serde_json::to_string(data)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(data)?),
        OutputFormat::Plain => Ok(id_fn(data)),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

/// Print a notice to stderr. Errors and warnings ignore quiet mode.
pub fn print_notice(notice: &Notice, quiet: bool, color: bool) {
    if quiet && notice.level == NoticeLevel::Info {
        return;
    }
    let title = if color {
        match notice.level {
            NoticeLevel::Info => notice.title.green().to_string(),
            NoticeLevel::Warning => notice.title.yellow().to_string(),
            NoticeLevel::Error => notice.title.red().to_string(),
        }
    } else {
        notice.title.clone()
    };
    let mut stderr = io::stderr().lock();
    let _ = writeln!(stderr, "{title}: {}", notice.text);
}

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(serde::Serialize, Tabled)]
    struct Row {
        name: String,
        uuid: String,
    }

    fn rows() -> Vec<Row> {
        vec![
            Row {
                name: "WAN-block".into(),
                uuid: "uuid-1".into(),
            },
            Row {
                name: "LAN-allow".into(),
                uuid: "uuid-2".into(),
            },
        ]
    }

    #[test]
    fn plain_emits_one_id_per_line() {
        let out = render_list(
            &OutputFormat::Plain,
            &rows(),
            |r| Row {
                name: r.name.clone(),
                uuid: r.uuid.clone(),
            },
            |r| r.uuid.clone(),
        )
        .unwrap();
        assert_eq!(out, "uuid-1\nuuid-2");
    }

    #[test]
    fn compact_json_is_one_line() {
        let out = render_list(
            &OutputFormat::JsonCompact,
            &rows(),
            |r| Row {
                name: r.name.clone(),
                uuid: r.uuid.clone(),
            },
            |r| r.uuid.clone(),
        )
        .unwrap();
        assert!(!out.contains('\n'));
        assert!(out.starts_with("[{\"name\":\"WAN-block\""));
    }

    #[test]
    fn state_label_without_color_is_plain() {
        assert_eq!(state_label(RuleState::Disabled, false), "disabled");
        assert_ne!(state_label(RuleState::Enabled, true), "enabled");
    }
}
