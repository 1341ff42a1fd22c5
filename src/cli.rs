//! Command-line interface.
//!
//! Without a subcommand the interactive TUI starts. The subcommands run a single
//! operation headless, drawing progress with indicatif on stderr.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::config::Config;
use crate::digest::{algorithm_info, AlgorithmId, AlgorithmMode, CompareEngine, Verdict};
use crate::task::{Executor, JobOutput, ProgressReporter, Sink, Update};

#[derive(Debug, Parser)]
#[command(name = "hashcheck")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compute and compare file digests")]
pub struct Cli {
    /// Config file (default: <config_dir>/hashcheck/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Hash algorithm, e.g. md5, sha256, blake3
    #[arg(short, long, global = true)]
    pub algorithm: Option<AlgorithmId>,

    /// Use MD5 only and require 32-character digests when verifying
    #[arg(long, global = true)]
    pub md5_only: bool,

    /// Log filter, e.g. "debug" or "hashcheck=trace"
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the digest of a file
    Digest { file: PathBuf },
    /// Compare the contents of two files
    Compare { first: PathBuf, second: PathBuf },
    /// Check a file against an expected digest (lowercase hex)
    Verify { file: PathBuf, expected: String },
    /// List supported algorithms
    Algorithms,
}

impl Cli {
    /// Merge flags over the config file
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(algorithm) = self.algorithm {
            config.default_algorithm = algorithm;
        }
        if self.md5_only {
            config.md5_only = true;
        }
        config
    }
}

type JobFn = Box<dyn FnOnce(&mut ProgressReporter<JobOutput>) -> JobOutput + Send>;

/// Run a headless subcommand. Exit codes: 0 success or match, 1 mismatch,
/// 2 aborted, invalid input or error.
pub async fn run(command: Command, config: &Config, json: bool) -> Result<ExitCode> {
    let mode = config.algorithm_mode();

    let (sink, label, job): (Sink, String, JobFn) = match command {
        Command::Algorithms => {
            print_algorithms(json)?;
            return Ok(ExitCode::SUCCESS);
        }
        Command::Digest { file } => (
            Sink::Digest,
            describe(&file),
            Box::new(move |reporter: &mut ProgressReporter<JobOutput>| {
                let mut report = |p: f64| reporter.report(p);
                JobOutput::Digest(CompareEngine::new().display_digest(Some(&file), mode, Some(&mut report)))
            }),
        ),
        Command::Compare { first, second } => (
            Sink::Compare,
            format!("{} ↔ {}", describe(&first), describe(&second)),
            Box::new(move |reporter: &mut ProgressReporter<JobOutput>| {
                let mut report = |p: f64| reporter.report(p);
                JobOutput::Verdict(CompareEngine::new().compare_files(
                    Some(&first),
                    Some(&second),
                    mode,
                    Some(&mut report),
                ))
            }),
        ),
        Command::Verify { file, expected } => (
            Sink::Compare,
            describe(&file),
            Box::new(move |reporter: &mut ProgressReporter<JobOutput>| {
                let mut report = |p: f64| reporter.report(p);
                JobOutput::Verdict(CompareEngine::new().compare_with_digest(
                    Some(&file),
                    Some(&expected),
                    mode,
                    Some(&mut report),
                ))
            }),
        ),
    };

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg}\n[{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>3}%")?
            .progress_chars("#>-"),
    );
    pb.set_message(format!("Hashing ({}): {}", algorithm_label(mode), label));

    let mut executor: Executor<JobOutput> = Executor::new();
    executor.spawn(sink, job);

    let output = loop {
        match executor.next().await {
            Some(delivery) => match delivery.update {
                Update::Progress(percent) => pb.set_position(percent.round() as u64),
                Update::Finished(job) => break job,
                Update::Failed(reason) => {
                    pb.finish_and_clear();
                    anyhow::bail!("worker failed: {}", reason);
                }
            },
            None => anyhow::bail!("worker channel closed unexpectedly"),
        }
    };
    pb.finish_and_clear();

    let code = exit_code(&output);
    if json {
        println!("{}", serde_json::to_string_pretty(&JsonReport::from(&output))?);
    } else {
        match &output {
            JobOutput::Digest(Ok(digest)) => println!("{}  {}", digest.hex, digest.path.display()),
            JobOutput::Digest(Err(e)) => eprintln!("{}", e),
            JobOutput::Verdict(verdict) => println!("{}", verdict),
        }
    }
    Ok(ExitCode::from(code))
}

fn exit_code(output: &JobOutput) -> u8 {
    match output {
        JobOutput::Digest(Ok(_)) | JobOutput::Verdict(Verdict::Match) => 0,
        JobOutput::Verdict(Verdict::Mismatch) => 1,
        _ => 2,
    }
}

/// Machine-readable form of a job result
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum JsonReport {
    Digest {
        algorithm: AlgorithmId,
        digest: String,
        path: PathBuf,
    },
    Error {
        kind: &'static str,
        message: String,
    },
    Match,
    Mismatch,
    Aborted {
        message: String,
    },
    InvalidInput {
        message: String,
    },
}

impl From<&JobOutput> for JsonReport {
    fn from(output: &JobOutput) -> Self {
        match output {
            JobOutput::Digest(Ok(d)) => JsonReport::Digest {
                algorithm: d.algorithm,
                digest: d.hex.clone(),
                path: d.path.clone(),
            },
            JobOutput::Digest(Err(e)) => JsonReport::Error {
                kind: e.kind_label(),
                message: e.headline(),
            },
            JobOutput::Verdict(Verdict::Match) => JsonReport::Match,
            JobOutput::Verdict(Verdict::Mismatch) => JsonReport::Mismatch,
            JobOutput::Verdict(v @ Verdict::Aborted(_)) => JsonReport::Aborted { message: v.to_string() },
            JobOutput::Verdict(v @ Verdict::InvalidInput(_)) => {
                JsonReport::InvalidInput { message: v.to_string() }
            }
        }
    }
}

fn print_algorithms(json: bool) -> Result<()> {
    let infos = algorithm_info();
    if json {
        println!("{}", serde_json::to_string_pretty(&infos)?);
        return Ok(());
    }
    for info in infos {
        let note = if info.recommended { "" } else { "  (legacy)" };
        println!("{:<10} {:<12} {:>4} bits{}", info.id, info.display_name, info.output_bits, note);
    }
    Ok(())
}

fn algorithm_label(mode: AlgorithmMode) -> String {
    mode.algorithm()
        .map(|a| a.to_string())
        .unwrap_or_else(|| "none".to_string())
}

fn describe(path: &Path) -> String {
    path.display().to_string()
}
