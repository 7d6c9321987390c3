//! Exportar CLI
//!
//! Single-binary entry point for checkpoint-to-mobile export.
//!
//! # Usage
//!
//! ```bash
//! # Export a checkpoint (writes best_float32.mtb next to it)
//! exportar export best.safetensors
//!
//! # Int8 export into a chosen directory
//! exportar export best.safetensors --precision int8 --output-dir ./artifacts
//!
//! # Inspect a checkpoint or an exported artifact
//! exportar info best.safetensors
//! exportar info best_float32.mtb --format json
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use exportar::checkpoint::load_checkpoint;
use exportar::export::{read_artifact, ExportConfig, Precision};
use exportar::run_export;
use std::path::PathBuf;
use std::process::ExitCode;

/// Exportar: checkpoint loading and mobile-inference export
#[derive(Parser, Debug, Clone)]
#[command(name = "exportar")]
#[command(version)]
#[command(about = "Convert trained-model checkpoints to mobile tensor bundles")]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Export a checkpoint to a mobile artifact
    Export(ExportArgs),

    /// Display information about a checkpoint or artifact
    Info(InfoArgs),
}

/// Arguments for the export command
#[derive(Parser, Debug, Clone)]
struct ExportArgs {
    /// Path to the checkpoint file
    #[arg(value_name = "CHECKPOINT")]
    checkpoint: PathBuf,

    /// Weight precision of the artifact
    #[arg(short, long, default_value = "float32")]
    precision: Precision,

    /// Output directory (defaults to the checkpoint's directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

/// Arguments for the info command
#[derive(Parser, Debug, Clone)]
struct InfoArgs {
    /// Path to a checkpoint or .mtb artifact
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = if cli.quiet {
        LogLevel::Quiet
    } else if cli.verbose {
        LogLevel::Verbose
    } else {
        LogLevel::Normal
    };

    let result = match cli.command {
        Command::Export(args) => run_export_cmd(args, log_level),
        Command::Info(args) => run_info_cmd(args, log_level),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
enum LogLevel {
    Quiet,
    Normal,
    Verbose,
}

fn log(level: LogLevel, required: LogLevel, msg: &str) {
    if level != LogLevel::Quiet && (level == required || required == LogLevel::Normal) {
        println!("{msg}");
    }
}

fn run_export_cmd(args: ExportArgs, level: LogLevel) -> Result<(), String> {
    log(
        level,
        LogLevel::Verbose,
        &format!("Exporting {}", args.checkpoint.display()),
    );

    let mut config = ExportConfig::default().with_precision(args.precision);
    if let Some(dir) = args.output_dir {
        config = config.with_output_dir(dir);
    }

    let report = run_export(&args.checkpoint, &config).map_err(|e| e.to_string())?;

    log(
        level,
        LogLevel::Verbose,
        &format!(
            "  {} ops, {} tensors, {} bytes",
            report.ops, report.tensors, report.bytes
        ),
    );

    // The completion line is printed only when the export succeeded.
    log(
        level,
        LogLevel::Normal,
        &format!("Export complete: {}", report.artifact.display()),
    );
    Ok(())
}

fn run_info_cmd(args: InfoArgs, level: LogLevel) -> Result<(), String> {
    let is_artifact = args
        .file
        .extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("mtb"));

    if is_artifact {
        let artifact = read_artifact(&args.file).map_err(|e| e.to_string())?;

        match args.format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(&artifact.header)
                    .map_err(|e| format!("JSON serialization error: {e}"))?;
                println!("{json}");
            }
            OutputFormat::Text => {
                let header = &artifact.header;
                log(level, LogLevel::Normal, "Artifact Info:");
                log(
                    level,
                    LogLevel::Normal,
                    &format!("  Name: {}", header.metadata.name),
                );
                log(
                    level,
                    LogLevel::Normal,
                    &format!("  Architecture: {}", header.metadata.architecture),
                );
                log(
                    level,
                    LogLevel::Normal,
                    &format!("  Precision: {}", header.precision.suffix()),
                );
                log(level, LogLevel::Normal, &format!("  Ops: {}", header.ops.len()));
                log(
                    level,
                    LogLevel::Normal,
                    &format!("  Tensors: {}", header.tensors.len()),
                );
            }
        }
        return Ok(());
    }

    let model = load_checkpoint(&args.file).map_err(|e| e.to_string())?;

    match args.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&model.metadata)
                .map_err(|e| format!("JSON serialization error: {e}"))?;
            println!("{json}");
        }
        OutputFormat::Text => {
            log(level, LogLevel::Normal, "Checkpoint Info:");
            log(
                level,
                LogLevel::Normal,
                &format!("  Name: {}", model.metadata.name),
            );
            log(
                level,
                LogLevel::Normal,
                &format!("  Architecture: {}", model.metadata.architecture),
            );
            log(
                level,
                LogLevel::Normal,
                &format!("  Version: {}", model.metadata.version),
            );
            log(
                level,
                LogLevel::Normal,
                &format!("  Layers: {}", model.graph.len()),
            );
            log(
                level,
                LogLevel::Normal,
                &format!("  Parameters: {}", model.parameters.len()),
            );

            for layer in &model.graph {
                log(
                    level,
                    LogLevel::Verbose,
                    &format!("    {} ({})", layer.name, layer.op),
                );
            }
        }
    }

    Ok(())
}
