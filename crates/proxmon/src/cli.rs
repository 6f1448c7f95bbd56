//! Clap derive structures for the `proxmon` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// proxmon -- console for proxy appliance inventory, resources and sessions
#[derive(Debug, Parser)]
#[command(
    name = "proxmon",
    version,
    about = "Monitor proxy appliances from the command line",
    long_about = "Manage proxy groups and inventory, watch SNMP resource usage,\n\
        and browse the sessions collected from each proxy through the\n\
        proxmon monitoring backend.",
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
    /// Backend profile to use
    #[arg(long, short = 'p', env = "PROXMON_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Backend URL (overrides profile)
    #[arg(long, short = 'S', env = "PROXMON_SERVER", global = true)]
    pub server: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "PROXMON_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, env = "PROXMON_COLOR", default_value = "auto", global = true)]
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

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "PROXMON_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "PROXMON_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
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
    /// Manage proxy groups
    #[command(alias = "g")]
    Groups(GroupsArgs),

    /// Manage the proxy inventory
    #[command(alias = "px")]
    Proxies(ProxiesArgs),

    /// Resource monitoring and thresholds
    #[command(alias = "mon")]
    Monitor(MonitorArgs),

    /// Collect and browse proxy sessions
    #[command(alias = "sess")]
    Sessions(SessionsArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  GROUPS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct GroupsArgs {
    #[command(subcommand)]
    pub command: GroupsCommand,
}

#[derive(Debug, Subcommand)]
pub enum GroupsCommand {
    /// List groups with their proxy counts
    #[command(alias = "ls")]
    List,

    /// Show one group
    Get {
        /// Group ID or name
        group: String,
    },

    /// Create a group
    Create {
        /// Group name
        name: String,

        /// Free-form description
        #[arg(long, short = 'd')]
        description: Option<String>,
    },

    /// Rename or re-describe a group
    Update {
        /// Group ID or name
        group: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New description (empty string clears it)
        #[arg(long, short = 'd')]
        description: Option<String>,
    },

    /// Delete an empty group
    #[command(alias = "rm")]
    Delete {
        /// Group ID or name
        group: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  PROXIES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ProxiesArgs {
    #[command(subcommand)]
    pub command: ProxiesCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProxiesCommand {
    /// List proxies
    #[command(alias = "ls")]
    List {
        /// Only proxies in this group (ID or name)
        #[arg(long, short = 'g')]
        group: Option<String>,

        /// Only main proxies
        #[arg(long)]
        main: bool,
    },

    /// Show one proxy
    Get {
        /// Proxy ID
        id: i64,
    },

    /// Register a proxy
    Create(ProxyCreateArgs),

    /// Change fields of a registered proxy
    Update {
        /// Proxy ID
        id: i64,

        #[command(flatten)]
        fields: ProxyUpdateArgs,
    },

    /// Remove a proxy
    #[command(alias = "rm")]
    Delete {
        /// Proxy ID
        id: i64,
    },

    /// Check SSH reachability (and SNMP with --deep)
    Test {
        /// Proxy ID
        id: i64,

        /// Also poll SNMP through the monitoring service
        #[arg(long)]
        deep: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SnmpVersionArg {
    V1,
    V2c,
    V3,
}

#[derive(Debug, Args)]
pub struct ProxyCreateArgs {
    /// Display name
    #[arg(long)]
    pub name: String,

    /// Management IP address
    #[arg(long)]
    pub host: String,

    /// SSH port
    #[arg(long, default_value = "22")]
    pub ssh_port: u16,

    /// SNMP port
    #[arg(long, default_value = "161")]
    pub snmp_port: u16,

    /// SNMP protocol version
    #[arg(long, default_value = "v2c")]
    pub snmp_version: SnmpVersionArg,

    /// SNMP community string
    #[arg(long, default_value = "public")]
    pub community: String,

    /// SSH username
    #[arg(long, short = 'u', default_value = "root")]
    pub username: String,

    /// Prompt for the SSH password
    #[arg(long)]
    pub ask_password: bool,

    /// Owning group (ID or name); falls back to the profile's default_group
    #[arg(long, short = 'g')]
    pub group: Option<String>,

    /// Mark as the group's main proxy
    #[arg(long)]
    pub main: bool,

    /// Register without enabling monitoring
    #[arg(long)]
    pub inactive: bool,

    /// Free-form description
    #[arg(long, short = 'd')]
    pub description: Option<String>,
}

#[derive(Debug, Args)]
pub struct ProxyUpdateArgs {
    /// New display name
    #[arg(long)]
    pub name: Option<String>,

    /// New management IP address
    #[arg(long)]
    pub host: Option<String>,

    /// SSH port
    #[arg(long)]
    pub ssh_port: Option<u16>,

    /// SNMP port
    #[arg(long)]
    pub snmp_port: Option<u16>,

    /// SNMP protocol version
    #[arg(long)]
    pub snmp_version: Option<SnmpVersionArg>,

    /// SNMP community string
    #[arg(long)]
    pub community: Option<String>,

    /// SSH username
    #[arg(long, short = 'u')]
    pub username: Option<String>,

    /// Prompt for a new SSH password (kept unchanged otherwise)
    #[arg(long)]
    pub ask_password: bool,

    /// Move to another group (ID or name)
    #[arg(long, short = 'g')]
    pub group: Option<String>,

    /// Main proxy flag
    #[arg(long)]
    pub main: Option<bool>,

    /// Monitoring enabled flag
    #[arg(long)]
    pub active: Option<bool>,

    /// New description (empty string clears it)
    #[arg(long, short = 'd')]
    pub description: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  MONITOR
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct MonitorArgs {
    #[command(subcommand)]
    pub command: MonitorCommand,
}

#[derive(Debug, Subcommand)]
pub enum MonitorCommand {
    /// Poll resource usage for active proxies
    #[command(alias = "res")]
    Resources {
        /// Only proxies in this group (ID or name)
        #[arg(long, short = 'g')]
        group: Option<String>,
    },

    /// Most recent stored sample for every proxy
    Latest,

    /// Poll one proxy
    Proxy {
        /// Proxy ID
        id: i64,
    },

    /// Full collector status for one proxy (SSH + SNMP, gathered live)
    Status {
        /// Proxy ID
        id: i64,
    },

    /// Proxy counts per group
    Summary,

    /// Show monitoring settings
    Config,

    /// Change monitoring settings
    SetConfig(SetConfigArgs),

    /// Live resource table, refreshed on a timer
    Watch {
        /// Seconds between refreshes (defaults to the profile's
        /// refresh_interval, re-read on SIGHUP)
        #[arg(long, short = 'n')]
        interval: Option<u64>,

        /// Only proxies in this group (ID or name)
        #[arg(long, short = 'g')]
        group: Option<String>,

        /// Exit after this many refreshes
        #[arg(long)]
        count: Option<u64>,
    },
}

#[derive(Debug, Args)]
pub struct SetConfigArgs {
    /// CPU usage alert threshold (percent)
    #[arg(long)]
    pub cpu_threshold: Option<u32>,

    /// Memory usage alert threshold (percent)
    #[arg(long)]
    pub memory_threshold: Option<u32>,

    /// Default polling interval in seconds
    #[arg(long)]
    pub interval: Option<u64>,

    /// Shell command used to collect sessions on the proxy
    #[arg(long)]
    pub session_cmd: Option<String>,

    /// SNMP OID mapping as NAME=OID (repeatable, replaces the whole map)
    #[arg(long = "oid", value_name = "NAME=OID")]
    pub oids: Vec<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SESSIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SessionsArgs {
    #[command(subcommand)]
    pub command: SessionsCommand,
}

#[derive(Debug, Subcommand)]
pub enum SessionsCommand {
    /// Latest collected sessions per proxy
    Overview,

    /// Search stored sessions
    Search {
        #[command(flatten)]
        filter: SessionFilterArgs,

        /// Page number (1-based)
        #[arg(long, default_value = "1")]
        page: u32,

        /// Rows per page
        #[arg(long, default_value = "50")]
        page_size: u32,
    },

    /// Page through stored sessions by offset
    Browse {
        /// First row offset
        #[arg(long, default_value = "0")]
        start: u32,

        /// Rows to fetch
        #[arg(long, short = 'l', default_value = "25")]
        length: u32,

        /// Free-text search
        #[arg(long)]
        search: Option<String>,

        /// Only sessions from this group (ID or name)
        #[arg(long, short = 'g')]
        group: Option<String>,

        /// Only sessions from this proxy
        #[arg(long)]
        proxy: Option<i64>,
    },

    /// Trigger collection on a group or a single proxy
    #[command(group(ArgGroup::new("target").required(true).args(["group", "proxy"])))]
    Collect {
        /// Group ID or name
        #[arg(long, short = 'g')]
        group: Option<String>,

        /// Proxy ID
        #[arg(long)]
        proxy: Option<i64>,
    },

    /// Show one stored session
    Get {
        /// Session ID
        id: i64,
    },

    /// Export matching sessions as CSV
    Export {
        #[command(flatten)]
        filter: SessionFilterArgs,

        /// Destination file ("-" for stdout)
        #[arg(long, short = 'O')]
        out: PathBuf,
    },
}

/// Filters shared by `sessions search` and `sessions export`.
#[derive(Debug, Args)]
pub struct SessionFilterArgs {
    /// Group ID or name
    #[arg(long, short = 'g')]
    pub group: Option<String>,

    /// Proxy ID
    #[arg(long)]
    pub proxy: Option<i64>,

    /// Match any text column
    #[arg(long)]
    pub keyword: Option<String>,

    #[arg(long)]
    pub protocol: Option<String>,

    #[arg(long)]
    pub status: Option<String>,

    #[arg(long)]
    pub client_ip: Option<String>,

    #[arg(long)]
    pub server_ip: Option<String>,

    #[arg(long)]
    pub user: Option<String>,

    /// URL substring
    #[arg(long)]
    pub url: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Print the config file location
    Path,

    /// Set a value on the active profile
    Set {
        /// Profile key (server, insecure, ca_cert, timeout, refresh_interval, default_group)
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
