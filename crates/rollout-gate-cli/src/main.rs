// crates/rollout-gate-cli/src/main.rs
// ============================================================================
// Module: Rollout Gate CLI Entry Point
// Description: Command dispatcher for the compliance and deployment-gate handlers.
// Purpose: Run one handler against one trigger event and print its response.
// Dependencies: clap, rollout-gate-aws, rollout-gate-config, rollout-gate-core, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Each invocation reads a single trigger event (a file or stdin), wires the
//! collaborators described by the configuration, runs one handler, and writes
//! the handler response as one JSON line on stdout. With `--dry-run` the AWS
//! collaborators are replaced by in-memory recorders and a simulated target,
//! so nothing leaves the process. Event input is untrusted and size-limited.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use rollout_gate_aws::AwsClients;
use rollout_gate_aws::CodeDeployHookReporter;
use rollout_gate_aws::ConfigServiceReporter;
use rollout_gate_aws::LambdaInvocationTarget;
use rollout_gate_config::AuditConfig;
use rollout_gate_config::MetricsConfig;
use rollout_gate_config::PostTrafficCheckKind;
use rollout_gate_config::RolloutGateConfig;
use rollout_gate_core::AuditSink;
use rollout_gate_core::ComplianceHandler;
use rollout_gate_core::ComplianceSink;
use rollout_gate_core::EmfMetrics;
use rollout_gate_core::FileAuditSink;
use rollout_gate_core::GateMetrics;
use rollout_gate_core::HandlerResponse;
use rollout_gate_core::HealthProbe;
use rollout_gate_core::HookHandler;
use rollout_gate_core::HookStage;
use rollout_gate_core::HookStatusSink;
use rollout_gate_core::InvocationTarget;
use rollout_gate_core::NoBlockingCheck;
use rollout_gate_core::NoopAuditSink;
use rollout_gate_core::NoopMetrics;
use rollout_gate_core::Observability;
use rollout_gate_core::PostTrafficCheck;
use rollout_gate_core::ProbeCheck;
use rollout_gate_core::RecordingComplianceSink;
use rollout_gate_core::RecordingHookStatusSink;
use rollout_gate_core::StaticInvocationTarget;
use rollout_gate_core::StderrAuditSink;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of a trigger event read from a file or stdin.
const MAX_EVENT_BYTES: usize = 1024 * 1024;
/// Status code returned by the simulated target when none is given.
const DEFAULT_SIMULATED_STATUS: u16 = 200;
/// Event path that selects stdin.
const STDIN_PATH: &str = "-";

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Rollout Gate command-line interface.
#[derive(Parser, Debug)]
#[command(
    name = "rollout-gate",
    version,
    about = "Tag compliance checks and deployment traffic-shift gates."
)]
struct Cli {
    /// Configuration file path (defaults to `ROLLOUT_GATE_CONFIG`, then `rollout-gate.toml`).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Replace AWS collaborators with in-memory recorders.
    #[arg(long, global = true)]
    dry_run: bool,
    /// Command to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate one config-change trigger for required tags.
    Compliance(EventArgs),
    /// Run a deployment lifecycle hook.
    Hook {
        /// Selected hook stage.
        #[command(subcommand)]
        command: HookCommand,
    },
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Lifecycle hook stages.
#[derive(Subcommand, Debug)]
enum HookCommand {
    /// Probe the new version before traffic shifts.
    PreTraffic(HookArgs),
    /// Validate the new version after traffic shifts.
    PostTraffic(HookArgs),
}

/// Configuration subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Load and validate the configuration.
    Validate,
}

/// Arguments shared by commands that consume one trigger event.
#[derive(Args, Debug)]
struct EventArgs {
    /// Trigger event JSON file, or `-` for stdin.
    #[arg(long, value_name = "PATH")]
    event: PathBuf,
}

/// Arguments for hook commands.
#[derive(Args, Debug)]
struct HookArgs {
    /// Trigger event source.
    #[command(flatten)]
    input: EventArgs,
    /// Status code returned by the simulated target (dry-run only).
    #[arg(long, value_name = "CODE")]
    simulated_status: Option<u16>,
}

/// Global options resolved once per invocation.
struct RunOptions {
    /// Loaded configuration.
    config: RolloutGateConfig,
    /// True when AWS collaborators are replaced by in-memory ones.
    dry_run: bool,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error carrying the single line written to stderr.
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
fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run(cli: Cli) -> CliResult<ExitCode> {
    let config = RolloutGateConfig::load(cli.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    let options = RunOptions {
        config,
        dry_run: cli.dry_run,
    };

    match cli.command {
        Commands::Compliance(args) => command_compliance(&options, &args),
        Commands::Hook {
            command,
        } => match command {
            HookCommand::PreTraffic(args) => command_hook(&options, HookStage::PreTraffic, &args),
            HookCommand::PostTraffic(args) => command_hook(&options, HookStage::PostTraffic, &args),
        },
        Commands::Config {
            command: ConfigCommand::Validate,
        } => command_config_validate(),
    }
}

// ============================================================================
// SECTION: Compliance Command
// ============================================================================

/// Executes the compliance command.
fn command_compliance(options: &RunOptions, args: &EventArgs) -> CliResult<ExitCode> {
    let event = read_event(&args.event)?;
    let audit = build_audit_sink(&options.config.audit)?;
    let metrics = build_metrics(&options.config.metrics);
    let observability = Observability::new(audit.as_ref(), metrics.as_ref());

    let response = if options.dry_run {
        let sink = RecordingComplianceSink::new();
        run_compliance(options, &sink, observability, &event)?
    } else {
        let clients = build_clients(options)?;
        let sink = ConfigServiceReporter::new(&clients);
        run_compliance(options, &sink, observability, &event)?
    };
    write_response(&response)?;
    Ok(ExitCode::SUCCESS)
}

/// Runs the compliance handler against the given policy collaborator.
fn run_compliance(
    options: &RunOptions,
    sink: &dyn ComplianceSink,
    observability: Observability<'_>,
    event: &Value,
) -> CliResult<HandlerResponse> {
    ComplianceHandler::new(options.config.compliance.requirement(), sink, observability)
        .handle(event)
        .map_err(|err| CliError::new(format!("compliance handler failed: {err}")))
}

// ============================================================================
// SECTION: Hook Commands
// ============================================================================

/// Executes a lifecycle hook command for `stage`.
fn command_hook(options: &RunOptions, stage: HookStage, args: &HookArgs) -> CliResult<ExitCode> {
    if args.simulated_status.is_some() && !options.dry_run {
        return Err(CliError::new("--simulated-status requires --dry-run".to_string()));
    }
    let event = read_event(&args.input.event)?;
    let audit = build_audit_sink(&options.config.audit)?;
    let metrics = build_metrics(&options.config.metrics);
    let observability = Observability::new(audit.as_ref(), metrics.as_ref());

    let response = if options.dry_run {
        let status = args.simulated_status.unwrap_or(DEFAULT_SIMULATED_STATUS);
        let target = StaticInvocationTarget::with_status(status);
        let reporter = RecordingHookStatusSink::new();
        run_hook(options, stage, &target, &reporter, observability, &event)?
    } else {
        let clients = build_clients(options)?;
        let target = LambdaInvocationTarget::new(&clients);
        let reporter = CodeDeployHookReporter::new(&clients);
        run_hook(options, stage, &target, &reporter, observability, &event)?
    };
    write_response(&response)?;
    Ok(ExitCode::SUCCESS)
}

/// Runs the hook handler against the given collaborators.
fn run_hook(
    options: &RunOptions,
    stage: HookStage,
    target: &dyn InvocationTarget,
    reporter: &dyn HookStatusSink,
    observability: Observability<'_>,
    event: &Value,
) -> CliResult<HandlerResponse> {
    let pre_traffic = &options.config.pre_traffic;
    let probe =
        HealthProbe::new(target, pre_traffic.default_function(), pre_traffic.health_request());
    let probe_check = ProbeCheck::new(probe.clone());
    let post_check: &dyn PostTrafficCheck = match options.config.post_traffic.check {
        PostTrafficCheckKind::None => &NoBlockingCheck,
        PostTrafficCheckKind::HealthProbe => &probe_check,
    };
    HookHandler::new(probe, post_check, reporter, observability)
        .handle(stage, event)
        .map_err(|err| CliError::new(format!("{stage} hook failed: {err}")))
}

// ============================================================================
// SECTION: Config Command
// ============================================================================

/// Executes the config validation command; loading already validated it.
fn command_config_validate() -> CliResult<ExitCode> {
    write_stdout_line("config ok")
        .map_err(|err| CliError::new(format!("failed to write stdout: {err}")))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Collaborators
// ============================================================================

/// Builds the AWS clients for a live run.
fn build_clients(options: &RunOptions) -> CliResult<AwsClients> {
    AwsClients::new(&options.config.aws)
        .map_err(|err| CliError::new(format!("failed to initialize aws clients: {err}")))
}

/// Builds the audit sink selected by configuration.
fn build_audit_sink(config: &AuditConfig) -> CliResult<Box<dyn AuditSink>> {
    if !config.enabled {
        return Ok(Box::new(NoopAuditSink));
    }
    match &config.path {
        Some(path) => FileAuditSink::new(Path::new(path))
            .map(|sink| Box::new(sink) as Box<dyn AuditSink>)
            .map_err(|err| CliError::new(format!("failed to open audit log {path}: {err}"))),
        None => Ok(Box::new(StderrAuditSink)),
    }
}

/// Builds the metrics sink selected by configuration.
fn build_metrics(config: &MetricsConfig) -> Box<dyn GateMetrics> {
    if config.enabled {
        Box::new(EmfMetrics::stderr(config.namespace.clone(), config.service.clone()))
    } else {
        Box::new(NoopMetrics)
    }
}

// ============================================================================
// SECTION: Input Helpers
// ============================================================================

/// Errors returned by bounded reads.
#[derive(Debug)]
enum ReadLimitError {
    /// I/O failure.
    Io(std::io::Error),
    /// Input size exceeds the configured limit.
    TooLarge {
        /// Actual size in bytes (at least `limit + 1` for streams).
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
}

/// Reads a file from disk while enforcing a hard size limit.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path).map_err(ReadLimitError::Io)?;
    let size = file.metadata().map_err(ReadLimitError::Io)?.len();
    let limit = u64::try_from(max_bytes).map_err(|_| ReadLimitError::TooLarge {
        size,
        limit: max_bytes,
    })?;
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }
    read_stream_with_limit(file, max_bytes)
}

/// Reads a stream while enforcing a hard size limit.
fn read_stream_with_limit<R: Read>(reader: R, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let read_limit = u64::try_from(max_bytes).unwrap_or(u64::MAX).saturating_add(1);
    let mut bytes = Vec::new();
    reader.take(read_limit).read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    if bytes.len() > max_bytes {
        return Err(ReadLimitError::TooLarge {
            size: u64::try_from(bytes.len()).unwrap_or(u64::MAX),
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

/// Reads and parses the trigger event from a file or stdin.
fn read_event(path: &Path) -> CliResult<Value> {
    let source = path.display();
    let read = if path.as_os_str() == STDIN_PATH {
        read_stream_with_limit(std::io::stdin().lock(), MAX_EVENT_BYTES)
    } else {
        read_bytes_with_limit(path, MAX_EVENT_BYTES)
    };
    let bytes = read.map_err(|err| match err {
        ReadLimitError::Io(err) => CliError::new(format!("failed to read event {source}: {err}")),
        ReadLimitError::TooLarge {
            size,
            limit,
        } => CliError::new(format!("event {source} exceeds size limit ({size} > {limit} bytes)")),
    })?;
    serde_json::from_slice(&bytes)
        .map_err(|err| CliError::new(format!("event {source} is not valid json: {err}")))
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes the handler response as one JSON line on stdout.
fn write_response(response: &HandlerResponse) -> CliResult<()> {
    let line = serde_json::to_string(response)
        .map_err(|err| CliError::new(format!("failed to serialize response: {err}")))?;
    write_stdout_line(&line).map_err(|err| CliError::new(format!("failed to write stdout: {err}")))
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
