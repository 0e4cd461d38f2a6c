//! Clap derive structures for the `opnly` CLI.
//!
//! Defines the command tree, global flags, and shared value enums. Kept free
//! of crate-internal imports so `build.rs` can render man pages from it.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// opnly -- companion CLI for an OPNsense firewall
#[derive(Debug, Parser)]
#[command(
    name = "opnly",
    version,
    about = "Toggle bookmarked firewall rules, the WireGuard VPN, aliases and ARP on OPNsense",
    long_about = "A small companion for an OPNsense firewall.\n\n\
        Keeps a local list of bookmarked filter rules and shows their live\n\
        state, flips them (and the WireGuard VPN) on and off, edits alias\n\
        entries, and reads or flushes the ARP table.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Local database file (overrides the config file)
    #[arg(long, env = "OPNLY_DATABASE", global = true)]
    pub database: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "OPNLY_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Login password, when one is set (prompted otherwise)
    #[arg(long, env = "OPNLY_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the firewall address and API credentials
    Setup(SetupArgs),

    /// Set or change the local login password
    Passwd(PasswdArgs),

    /// Check that the firewall answers with the stored credentials
    Probe,

    /// Bookmarked filter rules
    #[command(alias = "r")]
    Rules(RulesArgs),

    /// WireGuard VPN
    Vpn(VpnArgs),

    /// Firewall aliases
    #[command(alias = "alias")]
    Aliases(AliasesArgs),

    /// ARP table
    Arp(ArpArgs),

    /// Reboot the firewall
    Reboot,

    /// Show configuration and file locations
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SETUP / PASSWD
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SetupArgs {
    /// Firewall host name or address (scheme optional, https assumed)
    #[arg(long)]
    pub host: Option<String>,

    /// HTTPS port of the web interface
    #[arg(long)]
    pub port: Option<u16>,

    /// API key
    #[arg(long)]
    pub key: Option<String>,

    /// API secret (prompted when omitted)
    #[arg(long, env = "OPNLY_API_SECRET", hide_env_values = true)]
    pub secret: Option<String>,

    /// Protect opnly with a login password
    #[arg(long, conflicts_with = "clear_password")]
    pub login_password: Option<String>,

    /// Remove the login password
    #[arg(long)]
    pub clear_password: bool,

    /// Do not contact the firewall after saving
    #[arg(long)]
    pub skip_probe: bool,
}

#[derive(Debug, Args)]
pub struct PasswdArgs {
    /// New password (prompted when omitted)
    #[arg(long, env = "OPNLY_NEW_PASSWORD", hide_env_values = true)]
    pub new_password: Option<String>,

    /// Repeat of the new password (prompted when omitted)
    #[arg(long, requires = "new_password")]
    pub confirm: Option<String>,

    /// Remove the login password instead
    #[arg(long, conflicts_with_all = ["new_password", "confirm"])]
    pub clear: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  RULES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct RulesArgs {
    #[command(subcommand)]
    pub command: RulesCommand,
}

#[derive(Debug, Subcommand)]
pub enum RulesCommand {
    /// Bookmarked rules with their live state
    #[command(alias = "ls")]
    List,

    /// Every filter rule on the firewall
    Remote,

    /// Bookmark a rule (renames it if the uuid is already bookmarked)
    Add {
        /// Display name
        name: String,
        /// Rule UUID on the firewall
        uuid: String,
    },

    /// Forget a bookmark (the rule on the firewall is untouched)
    #[command(alias = "rm")]
    Remove {
        /// Rule UUID or bookmark name
        rule: String,
    },

    /// Flip a rule and apply the filter
    Toggle {
        /// Rule UUID or bookmark name
        rule: String,
    },

    /// Bookmark rules from a JSON file of `{"name", "uuid"}` objects
    Import {
        /// Path to the JSON file
        file: PathBuf,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  VPN
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct VpnArgs {
    #[command(subcommand)]
    pub command: VpnCommand,
}

#[derive(Debug, Subcommand)]
pub enum VpnCommand {
    /// Whether WireGuard is enabled
    Status,
    /// Enable WireGuard and reconfigure the service
    On,
    /// Disable WireGuard and reconfigure the service
    Off,
    /// Flip WireGuard
    Toggle,
    /// Current tunnel and peer information
    Info,
    /// Follow the tunnel information until interrupted
    Watch {
        /// Stop after this many updates
        #[arg(long, short = 'n')]
        count: Option<usize>,

        /// Poll interval in milliseconds (overrides the config file)
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        interval_ms: Option<u64>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ALIASES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct AliasesArgs {
    #[command(subcommand)]
    pub command: AliasesCommand,
}

#[derive(Debug, Subcommand)]
pub enum AliasesCommand {
    /// All aliases
    #[command(alias = "ls")]
    List,

    /// Aliases usable as network sources or destinations
    Networks,

    /// One alias with its entries
    Show {
        /// Alias UUID or name
        alias: String,
    },

    /// Append an entry to an alias
    Add {
        /// Alias UUID or name
        alias: String,
        /// Address, network or host name
        entry: String,
    },

    /// Remove every occurrence of an entry from an alias
    #[command(alias = "rm")]
    Remove {
        /// Alias UUID or name
        alias: String,
        /// Entry to remove
        entry: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ARP
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ArpArgs {
    #[command(subcommand)]
    pub command: ArpCommand,
}

#[derive(Debug, Subcommand)]
pub enum ArpCommand {
    /// Current ARP table
    #[command(alias = "ls")]
    List,
    /// Flush the ARP table and show what is left
    Flush,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG / COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write the effective settings to the config file
    Init {
        /// Replace an existing config file
        #[arg(long)]
        force: bool,
    },
    /// Effective settings and stored connection (secrets masked)
    Show,
    /// Path of the config file
    Path,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
