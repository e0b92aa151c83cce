use anyhow::{bail, Context, Result};
use chrono::NaiveDateTime;
use clap::Parser;
use glob::glob;
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};
use zipcsv::{
    artifact::Clock,
    report::{render_summary, render_table},
    table::DecodePolicy,
    Pipeline, ProcessOptions, ProcessedResult,
};

/// Extract the first CSV from each ZIP, rename the campaign headers and write
/// `processed_<timestamp>.csv`.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// ZIP files or glob patterns
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Directory for processed CSV files
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Rows to show in the preview
    #[arg(long, default_value_t = 5)]
    preview: usize,

    /// Stamp output names with UTC instead of local time
    #[arg(long)]
    utc: bool,

    /// Reject CSV content that is not valid UTF-8
    #[arg(long)]
    strict_utf8: bool,

    /// Write the processed CSV to stdout instead of a file
    #[arg(long)]
    stdout: bool,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

impl Args {
    fn options(&self) -> ProcessOptions {
        ProcessOptions {
            decode: if self.strict_utf8 {
                DecodePolicy::Strict
            } else {
                DecodePolicy::Lossy
            },
            clock: if self.utc { Clock::Utc } else { Clock::Local },
            preview_rows: self.preview,
        }
    }
}

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = Args::parse();
    let failed = run(&args)?;
    if failed > 0 {
        bail!("{} input(s) failed", failed);
    }
    Ok(())
}

/// Process every input independently. Returns the number that failed.
fn run(args: &Args) -> Result<usize> {
    let clock = args.options().clock;
    run_with_clock(args, || clock.now())
}

fn run_with_clock(args: &Args, mut now: impl FnMut() -> NaiveDateTime) -> Result<usize> {
    let paths = resolve_inputs(&args.inputs)?;
    if !args.stdout {
        fs::create_dir_all(&args.out_dir)
            .with_context(|| format!("creating output directory {}", args.out_dir.display()))?;
    }

    let pipeline = Pipeline::campaign(args.options());
    let mut failed = 0;
    for path in paths {
        info!(input = %path.display(), "processing");
        let bytes = match fs::read(&path) {
            Ok(b) => b,
            Err(e) => {
                error!(input = %path.display(), "read failed: {}", e);
                failed += 1;
                continue;
            }
        };

        let outcome = pipeline
            .run_at(&bytes, now())
            .map_err(anyhow::Error::from)
            .and_then(|result| emit(args, &result));
        if let Err(e) = outcome {
            error!(input = %path.display(), "{:#}", e);
            failed += 1;
        }
    }
    Ok(failed)
}

fn resolve_inputs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for pattern in patterns {
        let matched: Vec<PathBuf> = glob(pattern)
            .with_context(|| format!("Failed to read glob pattern '{}'", pattern))?
            .filter_map(|entry| entry.ok())
            .collect();
        if matched.is_empty() {
            bail!("No ZIP files found matching '{}'", pattern);
        }
        paths.extend(matched);
    }
    Ok(paths)
}

fn emit(args: &Args, result: &ProcessedResult) -> Result<()> {
    let mut report = String::new();
    report.push_str(&format!("Found CSV file: {}\n", result.source_entry));
    report.push_str(&format!("Original columns: {:?}\n", result.original_columns));
    report.push_str(&format!("Renamed columns: {:?}\n\n", result.table.columns()));
    report.push_str(&render_table(&result.preview()));
    report.push('\n');
    if args.json {
        report.push_str(&serde_json::to_string_pretty(&result.summary())?);
        report.push('\n');
    } else {
        report.push_str(&render_summary(&result.summary()));
    }

    if args.stdout {
        eprint!("{report}");
        std::io::stdout()
            .write_all(result.csv_bytes())
            .context("writing CSV to stdout")?;
    } else {
        let dest = write_artifact(&args.out_dir, result)?;
        print!("{report}");
        println!("Wrote {}", dest.display());
    }
    Ok(())
}

fn write_artifact(out_dir: &Path, result: &ProcessedResult) -> Result<PathBuf> {
    let dest = out_dir.join(&result.filename);
    if dest.exists() {
        warn!(dest = %dest.display(), "overwriting output from the same second");
    }
    fs::write(&dest, result.csv_bytes())
        .with_context(|| format!("writing {}", dest.display()))?;
    Ok(dest)
}
