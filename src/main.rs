use clap::Parser;

use runlet::cli::args::{Cli, Commands};
use runlet::cli::commands;
use runlet::config::loader::load_config;
use runlet::config::ConfigHandle;
use runlet::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.global_opts.verbose);

    // Load configuration (file + CLI overrides)
    let mut config = load_config(cli.global_opts.config.as_deref())?;
    if let Some(sandbox) = cli.global_opts.sandbox_override() {
        config.sandbox.enabled = sandbox;
    }
    if let Some(data_dir) = cli.global_opts.data_dir.clone() {
        config.runner.data_dir = Some(data_dir);
    }
    let format = cli.global_opts.format.clone();

    // Dispatch to subcommand handler
    match cli.command {
        Commands::Code(args) => {
            commands::code(args, ConfigHandle::new(config), format).await?;
        }
        Commands::File(args) => {
            commands::file(args, ConfigHandle::new(config), format).await?;
        }
        Commands::Shell(args) => {
            commands::shell(args, ConfigHandle::new(config), format).await?;
        }
        Commands::Init(args) => {
            commands::init(args).await?;
        }
        Commands::Config(args) => {
            commands::config(args, config).await?;
        }
    }

    Ok(())
}

fn init_logging(verbosity: u8) {
    use tracing_subscriber::EnvFilter;

    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
