//! risk-analyzer: 房产风险分析命令行工具：上传文档、实时显示分析进度、导出报告
//!
//! Usage:
//!   risk-analyzer analyze <file> [--base-url URL] [--config PATH] [--export DIR] [--thinking]
//!   risk-analyzer check <file> [--config PATH]
//!   risk-analyzer version
//!   risk-analyzer help

use anyhow::{bail, Context, Result};
use property_risk_stream::{
    cancel_pair, AnalyzerClient, AnalyzerConfig, AnalyzerContext, ConsoleSink, Error,
    SessionOutcome, UploadFile,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const EXIT_OK: i32 = 0;
const EXIT_USAGE: i32 = 1;
const EXIT_FAILED: i32 = 2;
const EXIT_CANCELLED: i32 = 130;

#[tokio::main]
async fn main() {
    // Logs go to stderr; stdout carries the rendered report.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(EXIT_USAGE);
    }

    let result = match args[1].as_str() {
        "analyze" => cmd_analyze(&args[2..]).await,
        "check" => cmd_check(&args[2..]).await,
        "version" | "--version" | "-V" => {
            cmd_version();
            Ok(EXIT_OK)
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(EXIT_OK)
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            Ok(EXIT_USAGE)
        }
    };

    let code = result.unwrap_or_else(|e| {
        eprintln!("Error: {e:#}");
        EXIT_USAGE
    });
    std::process::exit(code);
}

fn print_usage() {
    println!(
        r#"risk-analyzer: property risk analysis client

USAGE:
    risk-analyzer <COMMAND> [OPTIONS]

COMMANDS:
    analyze <file>              Upload a PDF or text report and stream the analysis
        --base-url <url>        Analysis service base URL
        --config <path>         YAML configuration file
        --export <dir>          Save the exported report into <dir> on success
        --thinking              Print per-section analysis traces on success
    check <file>                Run the client-side upload checks only
    version                     Show version information
    help                        Show this help message

ENVIRONMENT:
    RISK_ANALYZER_CONFIG        YAML configuration file
    RISK_ANALYZER_BASE_URL      Analysis service base URL
    RUST_LOG                    Log filter (default: warn)"#
    );
}

fn cmd_version() {
    println!(
        "risk-analyzer {} (property-risk-stream {})",
        env!("CARGO_PKG_VERSION"),
        env!("CARGO_PKG_VERSION"),
    );
}

#[derive(Debug, Default)]
struct AnalyzeArgs {
    file: PathBuf,
    base_url: Option<String>,
    config: Option<PathBuf>,
    export: Option<PathBuf>,
    thinking: bool,
}

fn parse_args(args: &[String]) -> Result<AnalyzeArgs> {
    let mut parsed = AnalyzeArgs::default();
    let mut file = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--base-url" => parsed.base_url = Some(flag_value(&mut iter, arg)?),
            "--config" => parsed.config = Some(PathBuf::from(flag_value(&mut iter, arg)?)),
            "--export" => parsed.export = Some(PathBuf::from(flag_value(&mut iter, arg)?)),
            "--thinking" => parsed.thinking = true,
            flag if flag.starts_with("--") => bail!("unknown option: {flag}"),
            path if file.is_none() => file = Some(PathBuf::from(path)),
            extra => bail!("unexpected argument: {extra}"),
        }
    }
    parsed.file = file.context("missing <file> argument")?;
    Ok(parsed)
}

fn flag_value<'a>(iter: &mut impl Iterator<Item = &'a String>, flag: &str) -> Result<String> {
    iter.next()
        .cloned()
        .with_context(|| format!("{flag} requires a value"))
}

async fn build_client(args: &AnalyzeArgs) -> Result<AnalyzerClient> {
    let config = match &args.config {
        Some(path) => AnalyzerConfig::from_path(path).await?.with_env_overrides(),
        None => AnalyzerConfig::load().await?,
    };
    let mut builder = AnalyzerClient::builder().config(config);
    if let Some(url) = &args.base_url {
        builder = builder.base_url(url.clone());
    }
    Ok(builder.build()?)
}

async fn cmd_analyze(args: &[String]) -> Result<i32> {
    let args = parse_args(args)?;
    let client = build_client(&args).await?;
    let mut context = AnalyzerContext::new(client);
    let mut sink = ConsoleSink::stdout();

    let (cancel, worker_cancel) = cancel_pair();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let upload = UploadFile::from_path(&args.file)
        .await
        .with_context(|| format!("cannot read {}", args.file.display()))?;

    let outcome = match context.upload(&upload, &mut sink, &worker_cancel).await {
        Ok(outcome) => outcome,
        // Already shown as a notice.
        Err(Error::Validation { .. }) => return Ok(EXIT_USAGE),
        Err(e) => return Err(e.into()),
    };

    match outcome {
        SessionOutcome::Completed(_) => {
            if args.thinking {
                let traces = context.thinking_report();
                if traces.is_empty() {
                    println!("\n(no thinking traces recorded)");
                }
                for trace in traces {
                    println!("\n{trace}");
                }
            } else if !context.thinking_report().is_empty() {
                println!("(run with --thinking to print the analysis traces)");
            }
            let Some(dir) = &args.export else {
                println!("(run with --export <dir> to save the report)");
                return Ok(EXIT_OK);
            };
            // Ctrl-C stays wired to the same handle, so it also aborts the export.
            let saved = tokio::select! {
                biased;
                _ = worker_cancel.cancelled() => {
                    eprintln!("Export cancelled.");
                    return Ok(EXIT_CANCELLED);
                }
                saved = context.export_to(dir, &mut sink) => saved,
            };
            match saved {
                Ok(path) => println!("\nReport saved to {}", path.display()),
                Err(_) => return Ok(EXIT_FAILED),
            }
            Ok(EXIT_OK)
        }
        SessionOutcome::Failed { .. } => Ok(EXIT_FAILED),
        SessionOutcome::Cancelled => {
            eprintln!("Analysis cancelled.");
            Ok(EXIT_CANCELLED)
        }
    }
}

async fn cmd_check(args: &[String]) -> Result<i32> {
    let args = parse_args(args)?;
    let client = build_client(&args).await?;
    let mut sink = ConsoleSink::stdout();

    let upload = UploadFile::from_path(&args.file)
        .await
        .with_context(|| format!("cannot read {}", args.file.display()))?;

    match client.check_upload(&upload, &mut sink) {
        Ok(()) => {
            println!("{}: OK ({} bytes, {})", upload.filename, upload.len(), upload.mime());
            Ok(EXIT_OK)
        }
        Err(_) => Ok(EXIT_USAGE),
    }
}
