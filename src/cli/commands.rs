use std::io::Read;
use std::sync::Arc;

use tracing::info;

use crate::cli::args::{
    CodeArgs, ConfigAction, ConfigArgs, FileArgs, InitArgs, OutputFormat, ShellArgs,
};
use crate::config::loader::get_config_path;
use crate::config::types::RunletConfig;
use crate::config::ConfigHandle;
use crate::error::{Result, RunletError};
use crate::events::TracingEvents;
use crate::runner::{CommandRequest, ExecutionResult, Runner};

// ============================================================================
// Execution Commands
// ============================================================================

/// Run a code snippet
pub async fn code(args: CodeArgs, config: ConfigHandle, format: OutputFormat) -> Result<()> {
    let source = if args.source == "-" {
        read_stdin()?
    } else {
        args.source
    };
    info!(bytes = source.len(), all = args.all, "Running code snippet");

    let request = CommandRequest::RunCode {
        code: source,
        path: args.path,
        all: args.all,
    };
    dispatch(request, config, format).await
}

/// Run an existing code file
pub async fn file(args: FileArgs, config: ConfigHandle, format: OutputFormat) -> Result<()> {
    info!(path = %args.path, "Running code file");
    dispatch(CommandRequest::RunFile { path: args.path }, config, format).await
}

/// Run a shell command verbatim
pub async fn shell(args: ShellArgs, config: ConfigHandle, format: OutputFormat) -> Result<()> {
    info!(command = %args.command, "Running shell command");
    dispatch(
        CommandRequest::RunShell {
            command: args.command,
        },
        config,
        format,
    )
    .await
}

// ============================================================================
// Config Commands
// ============================================================================

pub async fn init(args: InitArgs) -> Result<()> {
    let config_path = get_config_path();

    if config_path.exists() && !args.force {
        println!("Configuration already exists at: {}", config_path.display());
        println!("Use --force to overwrite");
        return Ok(());
    }

    // Create parent directories if needed
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let default_config = RunletConfig::default();
    let toml_str =
        toml::to_string_pretty(&default_config).map_err(|e| RunletError::Config(e.to_string()))?;

    std::fs::write(&config_path, toml_str)?;

    println!("Created configuration at: {}", config_path.display());
    println!("\nQuick start:");
    println!("  # Run a snippet on the host");
    println!("  runlet code \"print('hello')\"");
    println!();
    println!("  # Re-run everything submitted so far");
    println!("  runlet code --all \"print('again')\"");
    println!();
    println!("  # Run a file from the data directory inside Docker");
    println!("  runlet --sandbox file script.py");

    Ok(())
}

pub async fn config(args: ConfigArgs, config: RunletConfig) -> Result<()> {
    match args.action {
        ConfigAction::Show => {
            let toml_str =
                toml::to_string_pretty(&config).map_err(|e| RunletError::Config(e.to_string()))?;
            println!("{}", toml_str);
        }
        ConfigAction::Path => {
            println!("{}", get_config_path().display());
        }
    }
    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

async fn dispatch(request: CommandRequest, config: ConfigHandle, format: OutputFormat) -> Result<()> {
    let runner = Runner::new(config, Arc::new(TracingEvents));
    let result = runner.execute(request).await?;
    output_execution_result(&result, format)
}

fn output_execution_result(result: &ExecutionResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            println!("{}", result.result.trim_end_matches('\n'));
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(result)?);
        }
    }
    Ok(())
}

fn read_stdin() -> Result<String> {
    let mut source = String::new();
    std::io::stdin().read_to_string(&mut source)?;
    Ok(source)
}
