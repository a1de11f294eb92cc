use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use kumactl_core::DesiredState;

#[derive(Parser)]
#[command(name = "kumactl")]
#[command(about = "kumactl: converge Uptime Kuma tags and monitor tags")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Uptime Kuma URL (overrides config and KUMA_URL env var)
    #[arg(short, long, global = true, env = "KUMA_URL")]
    pub url: Option<String>,

    /// Username to log in with
    #[arg(long, global = true, env = "KUMA_USERNAME")]
    pub username: Option<String>,

    /// Password to log in with
    #[arg(long, global = true, env = "KUMA_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Login token (takes precedence over username and password)
    #[arg(long, global = true, env = "KUMA_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Config profile name
    #[arg(short, long, global = true, env = "KUMA_PROFILE", default_value = "default")]
    pub profile: String,

    /// Output format
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,

    /// Seconds to wait for each reply from the server
    #[arg(long, global = true, default_value_t = 10)]
    pub timeout: u64,

    /// More log output (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Clone, Copy, ValueEnum, Default, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
    Table,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(s, true).ok()
    }
}

#[derive(Clone, Copy, ValueEnum, Default, Debug, PartialEq, Eq)]
pub enum StateArg {
    #[default]
    Present,
    Absent,
}

impl From<StateArg> for DesiredState {
    fn from(state: StateArg) -> Self {
        match state {
            StateArg::Present => DesiredState::Present,
            StateArg::Absent => DesiredState::Absent,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ensure a tag exists or not
    Tag(TagArgs),
    /// Ensure a tag is attached to a monitor with a value, or not
    MonitorTag(MonitorTagArgs),
    /// Inspect monitors
    Monitor(MonitorArgs),
    /// Create the admin account of a fresh instance
    Setup,
    /// Log in and store the session token
    Login,
    /// Remove the stored session token
    Logout,
    /// Show the stored login
    Whoami,
    /// Manage CLI configuration
    Config(ConfigArgs),
}

#[derive(clap::Args)]
pub struct TagArgs {
    /// Tag name
    #[arg(long)]
    pub name: String,
    /// Tag color, used when the tag is created (e.g. "#ff0000")
    #[arg(long)]
    pub color: Option<String>,
    /// Desired state
    #[arg(long, value_enum, default_value = "present")]
    pub state: StateArg,
}

#[derive(clap::Args)]
pub struct MonitorTagArgs {
    /// Name of the monitor
    #[arg(long)]
    pub monitor_name: String,
    /// Name of the tag
    #[arg(long)]
    pub tag_name: String,
    /// Value attached with the tag
    #[arg(long, default_value = "")]
    pub value: String,
    /// Desired state
    #[arg(long, value_enum, default_value = "present")]
    pub state: StateArg,
}

#[derive(clap::Args)]
pub struct MonitorArgs {
    #[command(subcommand)]
    pub command: MonitorCommands,
}

#[derive(Subcommand)]
pub enum MonitorCommands {
    /// List monitors, or one monitor by id or name
    List(MonitorListArgs),
}

#[derive(clap::Args)]
pub struct MonitorListArgs {
    /// Id of the monitor to show
    #[arg(long, conflicts_with = "name")]
    pub id: Option<i64>,
    /// Name of the monitor to show
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(clap::Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current config
    Show,
    /// Set config value
    Set(ConfigSetArgs),
}

#[derive(clap::Args)]
pub struct ConfigSetArgs {
    /// Key to set (url, username, format)
    pub key: String,
    /// Value
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_monitor_tag_args() {
        let cli = Cli::try_parse_from([
            "kumactl",
            "monitor-tag",
            "--monitor-name",
            "Peer 1",
            "--tag-name",
            "Tag 1",
            "--value",
            "Tag Value",
            "--state",
            "absent",
        ])
        .unwrap();

        let Commands::MonitorTag(args) = cli.command else {
            panic!("expected monitor-tag");
        };
        assert_eq!(args.monitor_name, "Peer 1");
        assert_eq!(DesiredState::from(args.state), DesiredState::Absent);
    }

    #[test]
    fn test_list_id_conflicts_with_name() {
        let result = Cli::try_parse_from([
            "kumactl", "monitor", "list", "--id", "1", "--name", "Peer 1",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!(OutputFormat::parse("TABLE"), Some(OutputFormat::Table));
        assert_eq!(OutputFormat::parse("xml"), None);
    }
}
