// crates/reagvis-cli/src/main.rs
// ============================================================================
// Module: Reagvis CLI Entry Point
// Description: Command dispatcher for the review desk server and offline runs.
// Purpose: Start the HTTP service, analyze single files, and manage config.
// Dependencies: clap, reagvis-core, reagvis-config, reagvis-server, tokio
// ============================================================================

//! ## Overview
//! `reagvis serve` runs the HTTP review desk. `reagvis analyze` derives one
//! result offline with the simulated rules and prints it as JSON; it never
//! contacts the remote backend. `reagvis config` validates a configuration
//! file or prints the canonical example.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use reagvis_config::CONFIG_ENV_VAR;
use reagvis_config::DEFAULT_CONFIG_NAME;
use reagvis_config::ReagvisConfig;
use reagvis_config::config_toml_example;
use reagvis_core::AnalysisPipeline;
use reagvis_core::AnalysisRequest;
use reagvis_core::Attachment;
use reagvis_core::Ledger;
use reagvis_core::ScoreSource;
use reagvis_core::SeededScores;
use reagvis_core::ToolType;
use reagvis_server::ReagvisServer;
use thiserror::Error;
use time::OffsetDateTime;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of a file passed to `analyze`.
const MAX_ANALYZE_FILE_BYTES: usize = 16 * 1024 * 1024;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "reagvis", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the review desk HTTP server.
    Serve(ServeCommand),
    /// Analyze one submission offline and print the result as JSON.
    Analyze(AnalyzeCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Configuration for the `serve` command.
#[derive(Args, Debug)]
struct ServeCommand {
    /// Optional config file path (defaults to reagvis.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Arguments for offline analysis.
#[derive(Args, Debug)]
struct AnalyzeCommand {
    /// Tool to run: document, fact-check, propaganda, or verification.
    #[arg(long, value_name = "TOOL", value_parser = parse_tool)]
    tool: ToolType,
    /// Filename to analyze (defaults to the `--file` name).
    #[arg(long, value_name = "NAME")]
    filename: Option<String>,
    /// Submitted text.
    #[arg(long, value_name = "TEXT")]
    content: Option<String>,
    /// File to attach.
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,
    /// MIME type of the attached file (inferred from the extension when omitted).
    #[arg(long, value_name = "MIME")]
    content_type: Option<String>,
    /// Claimed location (verification).
    #[arg(long, value_name = "TEXT")]
    claimed_location: Option<String>,
    /// Claimed event (verification).
    #[arg(long, value_name = "TEXT")]
    claimed_event: Option<String>,
    /// Seed for reproducible simulated scores.
    #[arg(long, value_name = "N")]
    seed: Option<u64>,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a configuration file.
    Validate(ConfigValidateCommand),
    /// Print the canonical example configuration.
    Example,
}

/// Arguments for config validation.
#[derive(Args, Debug)]
struct ConfigValidateCommand {
    /// Optional config file path (defaults to reagvis.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&format!("reagvis {version}"))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Serve(command) => command_serve(command).await,
        Commands::Analyze(command) => command_analyze(&command),
        Commands::Config {
            command,
        } => command_config(command),
    }
}

/// Prints top-level help.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

// ============================================================================
// SECTION: Serve Command
// ============================================================================

/// Executes the `serve` command.
async fn command_serve(command: ServeCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_deref())?;
    let addr = config
        .server
        .bind_addr()
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    if !addr.ip().is_loopback() {
        warn_network_exposure(addr)?;
    }

    let server = tokio::task::spawn_blocking(move || ReagvisServer::from_config(config))
        .await
        .map_err(|err| CliError::new(format!("server init failed: init join failed: {err}")))?
        .map_err(|err| CliError::new(format!("server init failed: {err}")))?;
    write_stderr_line(&format!("reagvis: serving on http://{addr}"))
        .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    server.serve().await.map_err(|err| CliError::new(format!("server failed: {err}")))?;

    Ok(ExitCode::SUCCESS)
}

/// Warns that the server is reachable beyond loopback.
fn warn_network_exposure(addr: SocketAddr) -> CliResult<()> {
    write_stderr_line(&format!(
        "warning: serving on non-loopback address {addr}; the review desk has no authentication"
    ))
    .map_err(|err| CliError::new(output_error("stderr", &err)))
}

// ============================================================================
// SECTION: Analyze Command
// ============================================================================

/// Executes the offline `analyze` command.
fn command_analyze(command: &AnalyzeCommand) -> CliResult<ExitCode> {
    let request = build_request(command)?;
    let scores: Arc<dyn ScoreSource> = Arc::new(
        command.seed.map_or_else(SeededScores::from_entropy, SeededScores::from_seed),
    );
    let now = OffsetDateTime::now_utc();
    let outcome = AnalysisPipeline::new(scores)
        .run(&request, now)
        .map_err(|err| CliError::new(format!("analysis failed: {err}")))?;
    let mut ledger = Ledger::default();
    let result = ledger
        .record(outcome.assessment, request.attachment.as_ref(), now)
        .map_err(|err| CliError::new(format!("analysis failed: {err}")))?;
    let json = serde_json::to_string_pretty(&result)
        .map_err(|err| CliError::new(format!("failed to render result: {err}")))?;
    write_stdout_line(&json).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Builds the core request from command-line arguments.
fn build_request(command: &AnalyzeCommand) -> CliResult<AnalysisRequest> {
    let mut request = AnalysisRequest::new(command.tool);
    let file_name = command
        .file
        .as_deref()
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned());
    if let Some(filename) = command.filename.clone().or(file_name) {
        request = request.with_filename(filename);
    }
    if let Some(content) = &command.content {
        request = request.with_content(content.clone());
    }
    if let Some(location) = &command.claimed_location {
        request = request.with_claimed_location(location.clone());
    }
    if let Some(event) = &command.claimed_event {
        request = request.with_claimed_event(event.clone());
    }
    if let Some(path) = &command.file {
        let bytes = read_bytes_with_limit(path, MAX_ANALYZE_FILE_BYTES)?;
        let content_type =
            command.content_type.clone().unwrap_or_else(|| guess_content_type(path).to_string());
        request = request.with_attachment(Attachment::new(content_type, bytes));
    }
    Ok(request)
}

/// Parses a tool name.
fn parse_tool(value: &str) -> Result<ToolType, String> {
    ToolType::parse(value.trim()).ok_or_else(|| {
        format!("unknown tool '{value}' (expected document, fact-check, propaganda, or verification)")
    })
}

/// Infers a MIME type from common image extensions.
fn guess_content_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        _ => "",
    }
}

/// Reads a file from disk while enforcing a hard size limit.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> CliResult<Vec<u8>> {
    let read_error =
        |err: std::io::Error| CliError::new(format!("failed to read {}: {err}", path.display()));
    let file = File::open(path).map_err(read_error)?;
    let size = file.metadata().map_err(read_error)?.len();
    let limit = u64::try_from(max_bytes).unwrap_or(u64::MAX);
    if size > limit {
        return Err(too_large(path, max_bytes));
    }
    let mut bytes = Vec::new();
    file.take(limit.saturating_add(1)).read_to_end(&mut bytes).map_err(read_error)?;
    if bytes.len() > max_bytes {
        return Err(too_large(path, max_bytes));
    }
    Ok(bytes)
}

/// Builds the oversized-input error.
fn too_large(path: &Path, max_bytes: usize) -> CliError {
    CliError::new(format!("{} exceeds the {max_bytes} byte limit", path.display()))
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(command: ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate(command) => command_config_validate(&command),
        ConfigCommand::Example => command_config_example(),
    }
}

/// Executes the config validation command.
fn command_config_validate(command: &ConfigValidateCommand) -> CliResult<ExitCode> {
    let _config = ReagvisConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    write_stdout_line("config valid").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Prints the canonical example configuration.
fn command_config_example() -> CliResult<ExitCode> {
    let example = config_toml_example();
    write_stdout_line(example.trim_end())
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Loads configuration, falling back to defaults when no file is named or present.
fn load_config(path: Option<&Path>) -> CliResult<ReagvisConfig> {
    let implicit = path.is_none() && std::env::var_os(CONFIG_ENV_VAR).is_none();
    if implicit && !Path::new(DEFAULT_CONFIG_NAME).exists() {
        return Ok(ReagvisConfig::default());
    }
    ReagvisConfig::load(path).map_err(|err| CliError::new(format!("failed to load config: {err}")))
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output stream failure.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_names_parse() {
        assert_eq!(parse_tool("fact-check"), Ok(ToolType::FactCheck));
        assert!(parse_tool("deepfake").is_err());
    }

    #[test]
    fn content_type_is_inferred_from_extension() {
        assert_eq!(guess_content_type(Path::new("scan.JPG")), "image/jpeg");
        assert_eq!(guess_content_type(Path::new("notes")), "");
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }
}
