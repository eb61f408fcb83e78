use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(name = "runlet")]
#[clap(version, about = "Run code and shell commands on the host or in a Docker sandbox")]
#[clap(propagate_version = true)]
pub struct Cli {
    #[clap(flatten)]
    pub global_opts: GlobalOpts,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug)]
pub struct GlobalOpts {
    /// Configuration file path
    #[clap(short, long, global = true, env = "RUNLET_CONFIG")]
    pub config: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[clap(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Output format
    #[clap(long, global = true, default_value = "text", value_enum)]
    pub format: OutputFormat,

    /// Run inside the Docker sandbox regardless of configuration
    #[clap(long, global = true, conflicts_with = "host")]
    pub sandbox: bool,

    /// Run on the host regardless of configuration
    #[clap(long, global = true)]
    pub host: bool,

    /// User data directory (overrides configuration)
    #[clap(long, global = true, env = "RUNLET_DATA_DIR")]
    pub data_dir: Option<PathBuf>,
}

impl GlobalOpts {
    /// Sandbox override requested on the command line, if any.
    pub fn sandbox_override(&self) -> Option<bool> {
        if self.sandbox {
            Some(true)
        } else if self.host {
            Some(false)
        } else {
            None
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a code snippet (use "-" to read it from stdin)
    Code(CodeArgs),

    /// Run an existing code file
    File(FileArgs),

    /// Run a shell command verbatim
    Shell(ShellArgs),

    /// Initialize a new runlet configuration
    Init(InitArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

// ============================================================================
// Execution Commands
// ============================================================================

#[derive(Args, Debug)]
pub struct CodeArgs {
    /// Source code, or "-" for stdin
    pub source: String,

    /// Save the snippet under this path instead of the current-snippet file
    #[clap(long, short = 'p')]
    pub path: Option<String>,

    /// Run the whole accumulated transcript instead of this snippet alone
    #[clap(long, short = 'a')]
    pub all: bool,
}

#[derive(Args, Debug)]
pub struct FileArgs {
    /// Path to the file (relative paths resolve against the data directory)
    pub path: String,
}

#[derive(Args, Debug)]
pub struct ShellArgs {
    /// Command to execute
    pub command: String,
}

// ============================================================================
// Config Commands
// ============================================================================

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Force overwrite existing configuration
    #[clap(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[clap(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Show configuration file path
    Path,
}

#[derive(Debug, Clone, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
